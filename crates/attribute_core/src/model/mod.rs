//! Attribute domain model.
//!
//! # Responsibility
//! - Define canonical records for attribute groups, attributes and their
//!   polymorphic attributable links.
//! - Define request payloads accepted by the attribute service.
//!
//! # Invariants
//! - Raw integer ids never leave the core unencoded, except through
//!   `AttributeHandle` lookup tables.
//! - Every attribute belongs to exactly one attribute group.

pub mod attributable;
pub mod attribute;
pub mod attribute_group;
