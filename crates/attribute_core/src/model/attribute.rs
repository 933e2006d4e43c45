//! Attribute domain model.
//!
//! # Responsibility
//! - Define the canonical attribute record and its validation rules.
//! - Define create/update request payloads with default and partial-merge
//!   semantics.
//!
//! # Invariants
//! - `name`, `handle` and `kind` are never blank on a persisted attribute.
//! - `handle` is a machine key: ASCII alphanumerics, `_` and `-`, starting
//!   with an alphanumeric.
//! - `position` orders attributes inside their group; it is not unique at
//!   the storage level.

use crate::model::attributable::Attributable;
use crate::model::attribute_group::{AttributeGroup, GroupId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw storage id of an attribute.
pub type AttributeId = i64;

/// Type assigned when a create request omits `type`.
pub const DEFAULT_ATTRIBUTE_TYPE: &str = "text";

static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid handle regex"));

/// Validation failures for attribute fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValidationError {
    BlankName,
    BlankHandle,
    InvalidHandle(String),
    BlankType,
    /// The group's last position leaves no room to append.
    PositionOverflow,
}

impl Display for AttributeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "attribute name must not be blank"),
            Self::BlankHandle => write!(f, "attribute handle must not be blank"),
            Self::InvalidHandle(handle) => write!(
                f,
                "attribute handle `{handle}` may only contain letters, digits, `_` and `-`"
            ),
            Self::BlankType => write!(f, "attribute type must not be blank"),
            Self::PositionOverflow => write!(f, "attribute group has no position left to append"),
        }
    }
}

impl Error for AttributeValidationError {}

/// Product attribute definition as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub group_id: GroupId,
    /// Unique among attributes of the same group.
    pub name: String,
    pub handle: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: String,
    pub position: i64,
    pub variant: bool,
    pub searchable: bool,
    pub filterable: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Attribute {
    /// Checks field-level invariants.
    pub fn validate(&self) -> Result<(), AttributeValidationError> {
        validate_fields(&self.name, &self.handle, &self.kind)
    }
}

/// Fully resolved insert payload: group decoded, defaults applied, position
/// assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDraft {
    pub group_id: GroupId,
    pub name: String,
    pub handle: String,
    pub kind: String,
    pub position: i64,
    pub variant: bool,
    pub searchable: bool,
    pub filterable: bool,
}

impl AttributeDraft {
    pub fn validate(&self) -> Result<(), AttributeValidationError> {
        validate_fields(&self.name, &self.handle, &self.kind)
    }
}

/// Create request. `group_id` is the opaque group id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttribute {
    pub group_id: String,
    pub name: String,
    pub handle: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub variant: Option<bool>,
    #[serde(default)]
    pub searchable: Option<bool>,
    #[serde(default)]
    pub filterable: Option<bool>,
}

impl NewAttribute {
    pub fn new(
        group_id: impl Into<String>,
        name: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            name: name.into(),
            handle: handle.into(),
            ..Self::default()
        }
    }

    /// Builds the insert payload for a resolved group and position.
    pub fn into_draft(self, group_id: GroupId, position: i64) -> AttributeDraft {
        AttributeDraft {
            group_id,
            name: self.name,
            handle: self.handle,
            kind: self
                .kind
                .unwrap_or_else(|| DEFAULT_ATTRIBUTE_TYPE.to_string()),
            position,
            variant: self.variant.unwrap_or(false),
            searchable: self.searchable.unwrap_or(false),
            filterable: self.filterable.unwrap_or(false),
        }
    }
}

/// Partial update request. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChanges {
    /// Opaque id of the target group. Empty strings count as absent.
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub variant: Option<bool>,
    #[serde(default)]
    pub searchable: Option<bool>,
    #[serde(default)]
    pub filterable: Option<bool>,
}

impl AttributeChanges {
    /// Returns the requested group id, ignoring empty values.
    pub fn group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Overwrites the scalar fields present in this request.
    ///
    /// Group reassignment needs id resolution and is left to the caller.
    pub fn apply_to(&self, attribute: &mut Attribute) {
        if let Some(name) = &self.name {
            attribute.name = name.clone();
        }
        if let Some(handle) = &self.handle {
            attribute.handle = handle.clone();
        }
        if let Some(kind) = &self.kind {
            attribute.kind = kind.clone();
        }
        if let Some(variant) = self.variant {
            attribute.variant = variant;
        }
        if let Some(searchable) = self.searchable {
            attribute.searchable = searchable;
        }
        if let Some(filterable) = self.filterable {
            attribute.filterable = filterable;
        }
    }
}

/// Batch reposition request: opaque attribute id -> requested position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub attributes: BTreeMap<String, i64>,
}

impl<K: Into<String>> FromIterator<(K, i64)> for ReorderRequest {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(id, position)| (id.into(), position))
                .collect(),
        }
    }
}

/// Lightweight `(handle, id)` lookup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeHandle {
    pub handle: String,
    pub id: AttributeId,
}

/// Related data that can be eager-loaded with an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeInclude {
    Group,
    Attributables,
}

/// Attribute plus the relations requested through `AttributeInclude`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDetail {
    #[serde(flatten)]
    pub attribute: Attribute,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<AttributeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributables: Option<Vec<Attributable>>,
}

fn validate_fields(name: &str, handle: &str, kind: &str) -> Result<(), AttributeValidationError> {
    if name.trim().is_empty() {
        return Err(AttributeValidationError::BlankName);
    }
    if handle.trim().is_empty() {
        return Err(AttributeValidationError::BlankHandle);
    }
    if !HANDLE_RE.is_match(handle) {
        return Err(AttributeValidationError::InvalidHandle(handle.to_string()));
    }
    if kind.trim().is_empty() {
        return Err(AttributeValidationError::BlankType);
    }
    Ok(())
}
