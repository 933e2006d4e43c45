//! Keyed, localizable user-facing messages.
//!
//! Messages are looked up by dotted key and may carry `:name` placeholders
//! which are substituted from the supplied parameters.

use std::collections::HashMap;

/// Message key for a reorder request assigning one position twice.
pub const DUPE_POSITION: &str = "validation.attributes.groups.dupe_position";
/// Message key for an undecodable attribute id. Placeholder: `:id`.
pub const INVALID_ID: &str = "validation.attributes.groups.invalid_id";

/// Source of human-readable messages.
pub trait MessageCatalog {
    /// Returns the raw template for `key`, if known.
    fn template(&self, key: &str) -> Option<&str>;

    /// Resolves `key` and substitutes `:name` placeholders.
    ///
    /// Unknown keys resolve to the key itself.
    fn message(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut rendered = self.template(key).unwrap_or(key).to_string();
        // Longest names first so `:id` does not clobber `:identifier`.
        let mut params = params.to_vec();
        params.sort_by(|left, right| right.0.len().cmp(&left.0.len()));
        for (name, value) in params {
            rendered = rendered.replace(&format!(":{name}"), value);
        }
        rendered
    }
}

/// English catalog shipped with the core.
#[derive(Debug, Clone)]
pub struct DefaultMessages {
    templates: HashMap<&'static str, String>,
}

impl DefaultMessages {
    pub fn new() -> Self {
        let templates = HashMap::from([
            (
                DUPE_POSITION,
                "Each attribute must have a unique position.".to_string(),
            ),
            (INVALID_ID, "\":id\" is not a valid attribute id.".to_string()),
        ]);
        Self { templates }
    }

    /// Replaces or adds one template, e.g. for another locale.
    pub fn with_template(mut self, key: &'static str, template: impl Into<String>) -> Self {
        self.templates.insert(key, template.into());
        self
    }
}

impl Default for DefaultMessages {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCatalog for DefaultMessages {
    fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }
}
