//! Polymorphic links between attributes and the entities that carry them.
//!
//! An attributable ties one attribute to one owning entity (a product, a
//! category, ...) identified by `(attributable_type, attributable_id)`.
//! Each link owns zero or more per-locale value records.

use crate::model::attribute::{Attribute, AttributeId};
use serde::{Deserialize, Serialize};

/// Raw storage id of an attributable link.
pub type AttributableId = i64;

/// Link row between one attribute and one owning entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributable {
    pub id: AttributableId,
    pub attribute_id: AttributeId,
    /// Owning entity type, e.g. `product`.
    pub attributable_type: String,
    /// Raw id of the owning entity.
    pub attributable_id: i64,
    /// Value records, ordered by locale.
    pub records: Vec<AttributeValue>,
}

/// Localized value stored for one attributable link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: i64,
    pub attributable_id: AttributableId,
    pub locale: String,
    pub value: String,
}

/// Attribute together with its eager-loaded attributables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeWithAttributables {
    #[serde(flatten)]
    pub attribute: Attribute,
    pub attributables: Vec<Attributable>,
}
