//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, group lookup and id codec calls into use-case
//!   level APIs.
//! - Keep API layers decoupled from storage details and raw ids.

pub mod attribute_service;
