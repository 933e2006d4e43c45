//! Opaque id codec.
//!
//! # Responsibility
//! - Translate raw integer primary keys to short opaque strings and back.
//! - Keep the scheme behind one injectable trait (`IdCodec`).
//!
//! # Invariants
//! - `decode(encode(id)) == Some(id)` for every non-negative id.
//! - Decoding only accepts canonical encodings: any string that does not
//!   re-encode to itself decodes to `None`.
//! - Outputs are at least `min_length` characters long.
//!
//! The encoding follows the Hashids scheme (salted alphabet shuffle, lottery
//! character, guard padding), restricted to one number per id.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Alphabet used when none is configured.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

const DEFAULT_SEPARATORS: &str = "cfhistuCFHISTU";
const MIN_ALPHABET_LENGTH: usize = 16;
const SEPARATOR_DIV: f64 = 3.5;
const GUARD_DIV: f64 = 12.0;

/// Encodes and decodes raw ids to their externally visible form.
pub trait IdCodec {
    /// Returns `None` for ids that cannot be represented (negative values).
    fn encode(&self, id: i64) -> Option<String>;
    /// Returns `None` when `value` is not a canonical encoding.
    fn decode(&self, value: &str) -> Option<i64>;
}

impl<C: IdCodec + ?Sized> IdCodec for &C {
    fn encode(&self, id: i64) -> Option<String> {
        (**self).encode(id)
    }

    fn decode(&self, value: &str) -> Option<i64> {
        (**self).decode(value)
    }
}

/// Codec configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    AlphabetTooShort { unique_chars: usize },
    AlphabetNotAscii,
    AlphabetContainsSpace,
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlphabetTooShort { unique_chars } => write!(
                f,
                "id alphabet needs at least {MIN_ALPHABET_LENGTH} unique characters, got {unique_chars}"
            ),
            Self::AlphabetNotAscii => write!(f, "id alphabet must be ASCII"),
            Self::AlphabetContainsSpace => write!(f, "id alphabet must not contain spaces"),
        }
    }
}

impl Error for CodecError {}

/// Salted Hashids-style codec.
#[derive(Debug, Clone)]
pub struct HashIdCodec {
    salt: Vec<u8>,
    min_length: usize,
    alphabet: Vec<u8>,
    separators: Vec<u8>,
    guards: Vec<u8>,
}

impl HashIdCodec {
    /// Creates a codec over the default alphabet.
    pub fn new(salt: &str, min_length: usize) -> Self {
        match Self::with_alphabet(salt, min_length, DEFAULT_ALPHABET) {
            Ok(codec) => codec,
            Err(err) => unreachable!("default alphabet is valid: {err}"),
        }
    }

    /// Creates a codec over a custom alphabet.
    ///
    /// # Errors
    /// - Alphabet with fewer than 16 unique characters, non-ASCII characters
    ///   or spaces.
    pub fn with_alphabet(
        salt: &str,
        min_length: usize,
        alphabet: &str,
    ) -> Result<Self, CodecError> {
        if !alphabet.is_ascii() || !salt.is_ascii() {
            return Err(CodecError::AlphabetNotAscii);
        }
        if alphabet.contains(' ') {
            return Err(CodecError::AlphabetContainsSpace);
        }

        let mut unique = Vec::with_capacity(alphabet.len());
        for byte in alphabet.bytes() {
            if !unique.contains(&byte) {
                unique.push(byte);
            }
        }
        if unique.len() < MIN_ALPHABET_LENGTH {
            return Err(CodecError::AlphabetTooShort {
                unique_chars: unique.len(),
            });
        }

        let salt = salt.as_bytes().to_vec();
        let mut separators: Vec<u8> = DEFAULT_SEPARATORS
            .bytes()
            .filter(|byte| unique.contains(byte))
            .collect();
        let mut alphabet: Vec<u8> = unique
            .into_iter()
            .filter(|byte| !separators.contains(byte))
            .collect();

        consistent_shuffle(&mut separators, &salt);

        if separators.is_empty()
            || (alphabet.len() as f64 / separators.len() as f64) > SEPARATOR_DIV
        {
            let wanted = ((alphabet.len() as f64 / SEPARATOR_DIV).ceil() as usize).max(2);
            if wanted > separators.len() {
                let diff = wanted - separators.len();
                separators.extend(alphabet.drain(..diff));
            } else {
                separators.truncate(wanted);
            }
        }

        consistent_shuffle(&mut alphabet, &salt);

        let guard_count = (alphabet.len() as f64 / GUARD_DIV).ceil() as usize;
        let guards: Vec<u8> = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(Self {
            salt,
            min_length,
            alphabet,
            separators,
            guards,
        })
    }

    fn encode_number(&self, number: u64) -> String {
        let mut alphabet = self.alphabet.clone();
        let number_hash = (number % 100) as usize;
        let lottery = alphabet[number_hash % alphabet.len()];

        let mut result = vec![lottery];
        reshuffle_for_lottery(&mut alphabet, lottery, &self.salt);
        result.extend(hash(number, &alphabet));

        if result.len() < self.min_length {
            let guard_index = (number_hash + usize::from(result[0])) % self.guards.len();
            result.insert(0, self.guards[guard_index]);

            if result.len() < self.min_length {
                let guard_index = (number_hash + usize::from(result[2])) % self.guards.len();
                result.push(self.guards[guard_index]);
            }
        }

        let half = alphabet.len() / 2;
        while result.len() < self.min_length {
            let key = alphabet.clone();
            consistent_shuffle(&mut alphabet, &key);

            let mut padded = alphabet[half..].to_vec();
            padded.extend_from_slice(&result);
            padded.extend_from_slice(&alphabet[..half]);
            result = padded;

            let excess = result.len().saturating_sub(self.min_length);
            if excess > 0 {
                let start = excess / 2;
                result = result[start..start + self.min_length].to_vec();
            }
        }

        result.into_iter().map(char::from).collect()
    }

    fn decode_number(&self, value: &str) -> Option<u64> {
        if value.is_empty() || !value.is_ascii() {
            return None;
        }

        let bytes = value.as_bytes();
        let segments: Vec<&[u8]> = bytes.split(|byte| self.guards.contains(byte)).collect();
        let core = match segments.len() {
            2 | 3 => segments[1],
            _ => segments[0],
        };
        let (&lottery, body) = core.split_first()?;
        if body.is_empty() || body.iter().any(|byte| self.separators.contains(byte)) {
            return None;
        }

        let mut alphabet = self.alphabet.clone();
        reshuffle_for_lottery(&mut alphabet, lottery, &self.salt);
        let number = unhash(body, &alphabet)?;

        (self.encode_number(number) == value).then_some(number)
    }
}

impl IdCodec for HashIdCodec {
    fn encode(&self, id: i64) -> Option<String> {
        u64::try_from(id).ok().map(|number| self.encode_number(number))
    }

    fn decode(&self, value: &str) -> Option<i64> {
        self.decode_number(value)
            .and_then(|number| i64::try_from(number).ok())
    }
}

fn reshuffle_for_lottery(alphabet: &mut [u8], lottery: u8, salt: &[u8]) {
    let mut buffer = Vec::with_capacity(1 + salt.len() + alphabet.len());
    buffer.push(lottery);
    buffer.extend_from_slice(salt);
    buffer.extend_from_slice(alphabet);
    buffer.truncate(alphabet.len());
    consistent_shuffle(alphabet, &buffer);
}

fn consistent_shuffle(alphabet: &mut [u8], salt: &[u8]) {
    if salt.is_empty() {
        return;
    }

    let mut v = 0usize;
    let mut p = 0usize;
    for i in (1..alphabet.len()).rev() {
        v %= salt.len();
        let integer = usize::from(salt[v]);
        p += integer;
        let j = (integer + v + p) % i;
        alphabet.swap(i, j);
        v += 1;
    }
}

fn hash(mut number: u64, alphabet: &[u8]) -> Vec<u8> {
    let base = alphabet.len() as u64;
    let mut digits = Vec::new();
    loop {
        digits.push(alphabet[(number % base) as usize]);
        number /= base;
        if number == 0 {
            break;
        }
    }
    digits.reverse();
    digits
}

fn unhash(input: &[u8], alphabet: &[u8]) -> Option<u64> {
    let base = alphabet.len() as u64;
    input.iter().try_fold(0u64, |number, byte| {
        let position = alphabet.iter().position(|candidate| candidate == byte)? as u64;
        number.checked_mul(base)?.checked_add(position)
    })
}
