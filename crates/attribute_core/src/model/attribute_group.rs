//! Attribute group model.

use serde::{Deserialize, Serialize};

/// Raw storage id of an attribute group.
pub type GroupId = i64;

/// Named bucket of attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGroup {
    pub id: GroupId,
    pub name: String,
    /// Stable machine key, unique across groups.
    pub handle: String,
    /// Display order among groups.
    pub position: i64,
}
