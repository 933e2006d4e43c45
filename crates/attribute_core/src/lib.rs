//! Attribute management core.
//!
//! Product attribute definitions grouped into attribute groups: CRUD,
//! per-group ordering, uniqueness checks and lookup helpers over SQLite.
//! Ids leave the core only in opaque form through [`IdCodec`].

pub mod db;
pub mod events;
pub mod ids;
pub mod logging;
pub mod messages;
pub mod model;
pub mod repo;
pub mod service;

pub use events::AttributeObserver;
pub use ids::{CodecError, HashIdCodec, IdCodec};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use messages::{DefaultMessages, MessageCatalog};
pub use model::attributable::{Attributable, AttributeValue, AttributeWithAttributables};
pub use model::attribute::{
    Attribute, AttributeChanges, AttributeDetail, AttributeHandle, AttributeId, AttributeInclude,
    AttributeValidationError, NewAttribute, ReorderRequest, DEFAULT_ATTRIBUTE_TYPE,
};
pub use model::attribute_group::{AttributeGroup, GroupId};
pub use repo::attribute_repo::{
    AttributeListQuery, AttributeRepository, RepoError, RepoResult, SqliteAttributeRepository,
};
pub use repo::group_repo::{AttributeGroupLookup, SqliteAttributeGroupRepository};
pub use service::attribute_service::{AttributeService, AttributeServiceError, ServiceResult};
