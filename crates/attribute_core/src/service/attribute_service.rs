//! Attribute use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete/reorder entry points over opaque ids.
//! - Enforce group membership, per-group name uniqueness and position
//!   assignment above the repository layer.
//! - Provide lookup helpers for API and search callers.
//!
//! # Invariants
//! - Raw ids only enter through the injected `IdCodec`.
//! - New attributes are appended: `position = last position in group + 1`,
//!   or `1` for an empty group.
//! - A rejected reorder request persists nothing.
//!
//! # Known races
//! - Position assignment and the name uniqueness check are read-then-write
//!   against storage. Concurrent creates in one group may share a position
//!   or a name.

use crate::events::{AttributeObserver, AttributeObservers};
use crate::ids::IdCodec;
use crate::messages::{DefaultMessages, MessageCatalog, DUPE_POSITION, INVALID_ID};
use crate::model::attributable::AttributeWithAttributables;
use crate::model::attribute::{
    Attribute, AttributeChanges, AttributeDetail, AttributeHandle, AttributeId, AttributeInclude,
    AttributeValidationError, NewAttribute, ReorderRequest,
};
use crate::model::attribute_group::GroupId;
use crate::repo::attribute_repo::{AttributeListQuery, AttributeRepository, RepoError};
use crate::repo::group_repo::AttributeGroupLookup;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, AttributeServiceError>;

/// Errors from attribute service operations.
#[derive(Debug)]
pub enum AttributeServiceError {
    /// Opaque group id does not resolve to a group.
    GroupNotFound(String),
    /// Opaque attribute id is undecodable or does not resolve.
    AttributeNotFound(String),
    /// Reorder request assigns one position to several attributes.
    DuplicatePosition(String),
    /// Reorder request contains an undecodable attribute id.
    InvalidId { id: String, message: String },
    /// Another attribute in the group already uses this name.
    NameTaken { name: String, group_id: GroupId },
    Validation(AttributeValidationError),
    Repo(RepoError),
}

impl AttributeServiceError {
    /// HTTP-style status for API layers.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::GroupNotFound(_) => 400,
            Self::AttributeNotFound(_) => 404,
            Self::DuplicatePosition(_)
            | Self::InvalidId { .. }
            | Self::NameTaken { .. }
            | Self::Validation(_) => 422,
            Self::Repo(_) => 500,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::GroupNotFound(_) => "group_not_found",
            Self::AttributeNotFound(_) => "attribute_not_found",
            Self::DuplicatePosition(_) => "duplicate_position",
            Self::InvalidId { .. } => "invalid_id",
            Self::NameTaken { .. } => "name_taken",
            Self::Validation(_) => "validation_failed",
            Self::Repo(_) => "repo_failed",
        }
    }
}

impl Display for AttributeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupNotFound(id) => write!(f, "Attribute group with ID \"{id}\" doesn't exist"),
            Self::AttributeNotFound(id) => write!(f, "attribute not found: {id}"),
            Self::DuplicatePosition(message) => write!(f, "{message}"),
            Self::InvalidId { message, .. } => write!(f, "{message}"),
            Self::NameTaken { name, group_id } => {
                write!(f, "attribute name `{name}` already exists in group {group_id}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttributeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AttributeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Attribute service facade over repository, group lookup and id codec.
pub struct AttributeService<R, G, C>
where
    R: AttributeRepository,
    G: AttributeGroupLookup,
    C: IdCodec,
{
    repo: R,
    groups: G,
    codec: C,
    messages: Box<dyn MessageCatalog>,
    observers: AttributeObservers,
}

impl<R, G, C> AttributeService<R, G, C>
where
    R: AttributeRepository,
    G: AttributeGroupLookup,
    C: IdCodec,
{
    /// Creates a service with English messages and no observers.
    pub fn new(repo: R, groups: G, codec: C) -> Self {
        Self {
            repo,
            groups,
            codec,
            messages: Box::new(DefaultMessages::new()),
            observers: AttributeObservers::new(),
        }
    }

    /// Replaces the message catalog used for localized errors.
    pub fn with_messages(mut self, messages: impl MessageCatalog + 'static) -> Self {
        self.messages = Box::new(messages);
        self
    }

    /// Registers a "saved" observer.
    pub fn subscribe(&mut self, observer: impl AttributeObserver + 'static) {
        self.observers.subscribe(Box::new(observer));
    }

    /// Encodes a raw attribute id for external exposure.
    pub fn hashed_id(&self, id: AttributeId) -> Option<String> {
        self.codec.encode(id)
    }

    /// Creates an attribute at the end of its group.
    ///
    /// # Errors
    /// - `GroupNotFound` when `data.group_id` does not resolve.
    /// - `NameTaken` when the group already has an attribute with this name.
    pub fn create(&self, data: NewAttribute) -> ServiceResult<Attribute> {
        let group = self
            .groups
            .get_by_hashed_id(&data.group_id)?
            .ok_or_else(|| {
                self.reject(AttributeServiceError::GroupNotFound(data.group_id.clone()))
            })?;

        if self.repo.name_exists_in_group(&data.name, group.id, None)? {
            return Err(self.reject(AttributeServiceError::NameTaken {
                name: data.name,
                group_id: group.id,
            }));
        }

        let position = self.new_position_for_group(group.id)?;
        let attribute = self
            .repo
            .create_attribute(&data.into_draft(group.id, position))?;

        info!(
            "event=attribute_create module=service status=ok attribute_id={} group_id={} position={}",
            attribute.id, attribute.group_id, attribute.position
        );
        self.observers.saved(&attribute);
        Ok(attribute)
    }

    /// Applies a partial update to one attribute.
    ///
    /// Only fields present in `data` are overwritten. A present `group_id`
    /// moves the attribute to that group without changing its position.
    pub fn update(&self, hashed_id: &str, data: &AttributeChanges) -> ServiceResult<Attribute> {
        let mut attribute = self.find_by_hashed_id(hashed_id)?;
        let previous_name = attribute.name.clone();
        let previous_group = attribute.group_id;

        data.apply_to(&mut attribute);

        if let Some(group_hash) = data.group_id() {
            let group = self.groups.get_by_hashed_id(group_hash)?.ok_or_else(|| {
                self.reject(AttributeServiceError::GroupNotFound(group_hash.to_string()))
            })?;
            attribute.group_id = group.id;
        }

        let identity_changed =
            attribute.name != previous_name || attribute.group_id != previous_group;
        if identity_changed
            && self
                .repo
                .name_exists_in_group(&attribute.name, attribute.group_id, Some(attribute.id))?
        {
            return Err(self.reject(AttributeServiceError::NameTaken {
                name: attribute.name,
                group_id: attribute.group_id,
            }));
        }

        self.repo
            .update_attribute(&attribute)
            .map_err(|err| self.not_found_or(err, hashed_id))?;
        let attribute = self
            .repo
            .get_attribute(attribute.id)?
            .ok_or_else(|| AttributeServiceError::AttributeNotFound(hashed_id.to_string()))?;

        info!(
            "event=attribute_update module=service status=ok attribute_id={} group_id={}",
            attribute.id, attribute.group_id
        );
        self.observers.saved(&attribute);
        Ok(attribute)
    }

    /// Deletes one attribute together with its attributables.
    pub fn delete(&self, hashed_id: &str) -> ServiceResult<bool> {
        let attribute = self.find_by_hashed_id(hashed_id)?;
        self.repo
            .delete_attribute(attribute.id)
            .map_err(|err| self.not_found_or(err, hashed_id))?;

        info!(
            "event=attribute_delete module=service status=ok attribute_id={}",
            attribute.id
        );
        Ok(true)
    }

    /// Applies requested positions to a batch of attributes.
    ///
    /// Ids that decode but match no attribute are skipped. All writes happen
    /// in one transaction.
    ///
    /// # Errors
    /// - `DuplicatePosition` when two ids request the same position.
    /// - `InvalidId` when an id cannot be decoded.
    pub fn reorder(&self, request: &ReorderRequest) -> ServiceResult<bool> {
        let requested = &request.attributes;
        let distinct: HashSet<i64> = requested.values().copied().collect();
        if distinct.len() < requested.len() {
            let message = self.messages.message(DUPE_POSITION, &[]);
            return Err(self.reject(AttributeServiceError::DuplicatePosition(message)));
        }

        let mut parsed: HashMap<AttributeId, i64> = HashMap::with_capacity(requested.len());
        for (hashed_id, &position) in requested {
            let Some(id) = self.codec.decode(hashed_id) else {
                let message = self.messages.message(INVALID_ID, &[("id", hashed_id.as_str())]);
                return Err(self.reject(AttributeServiceError::InvalidId {
                    id: hashed_id.clone(),
                    message,
                }));
            };
            parsed.insert(id, position);
        }

        let ids: Vec<AttributeId> = parsed.keys().copied().collect();
        let attributes = self.repo.get_attributes(&ids)?;
        let positions: Vec<(AttributeId, i64)> = attributes
            .iter()
            .filter_map(|attribute| {
                parsed
                    .get(&attribute.id)
                    .map(|&position| (attribute.id, position))
            })
            .collect();

        if positions.len() < parsed.len() {
            debug!(
                "event=attribute_reorder module=service status=partial requested={} matched={}",
                parsed.len(),
                positions.len()
            );
        }

        self.repo.update_positions(&positions)?;

        info!(
            "event=attribute_reorder module=service status=ok updated={}",
            positions.len()
        );
        Ok(true)
    }

    /// Alias of [`Self::reorder`], kept for callers of the older entry point.
    pub fn update_attribute_positions(&self, request: &ReorderRequest) -> ServiceResult<bool> {
        self.reorder(request)
    }

    /// Loads one attribute by opaque id.
    pub fn get_by_hashed_id(&self, hashed_id: &str) -> ServiceResult<Attribute> {
        self.find_by_hashed_id(hashed_id)
    }

    /// Loads one attribute by opaque id with the requested relations.
    pub fn get_by_hashed_id_with(
        &self,
        hashed_id: &str,
        includes: &[AttributeInclude],
    ) -> ServiceResult<AttributeDetail> {
        let attribute = self.find_by_hashed_id(hashed_id)?;

        let group = if includes.contains(&AttributeInclude::Group) {
            self.groups.get_group(attribute.group_id)?
        } else {
            None
        };
        let attributables = if includes.contains(&AttributeInclude::Attributables) {
            Some(self.repo.list_attributables(&[attribute.id], None)?)
        } else {
            None
        };

        Ok(AttributeDetail {
            attribute,
            group,
            attributables,
        })
    }

    /// Lists attributes of one group (raw id) in display order.
    pub fn get_attributes_for_group(&self, group_id: GroupId) -> ServiceResult<Vec<Attribute>> {
        Ok(self
            .repo
            .list_attributes(&AttributeListQuery::for_group(group_id))?)
    }

    /// Returns the attribute with the highest position in a group.
    pub fn get_last_item(&self, group_id: GroupId) -> ServiceResult<Option<Attribute>> {
        Ok(self.repo.last_in_group(group_id)?)
    }

    /// Returns whether `value` is already used as a name in the group,
    /// ignoring `exclude` when given.
    pub fn name_exists_in_group(
        &self,
        value: &str,
        group_id: GroupId,
        exclude: Option<AttributeId>,
    ) -> ServiceResult<bool> {
        Ok(self.repo.name_exists_in_group(value, group_id, exclude)?)
    }

    pub fn get_by_handles(&self, handles: &[String]) -> ServiceResult<Vec<Attribute>> {
        Ok(self.repo.list_attributes(&AttributeListQuery {
            handles: Some(handles.to_vec()),
            ..AttributeListQuery::default()
        })?)
    }

    pub fn get_filterable(&self) -> ServiceResult<Vec<Attribute>> {
        Ok(self.repo.list_attributes(&AttributeListQuery {
            filterable: Some(true),
            ..AttributeListQuery::default()
        })?)
    }

    pub fn get_searchable(&self) -> ServiceResult<Vec<Attribute>> {
        Ok(self.repo.list_attributes(&AttributeListQuery {
            searchable: Some(true),
            ..AttributeListQuery::default()
        })?)
    }

    /// Loads attributes with their attributables and value records.
    ///
    /// Undecodable ids are skipped. `attributable_type` restricts the
    /// attributables, not the attributes.
    pub fn get_attributables<S: AsRef<str>>(
        &self,
        hashed_ids: &[S],
        attributable_type: Option<&str>,
    ) -> ServiceResult<Vec<AttributeWithAttributables>> {
        let ids: Vec<AttributeId> = hashed_ids
            .iter()
            .filter_map(|hashed_id| self.codec.decode(hashed_id.as_ref()))
            .collect();
        if ids.len() < hashed_ids.len() {
            debug!(
                "event=attributables_load module=service status=partial requested={} decoded={}",
                hashed_ids.len(),
                ids.len()
            );
        }

        let attributes = self.repo.get_attributes(&ids)?;
        let mut by_attribute: HashMap<AttributeId, Vec<_>> = HashMap::new();
        for attributable in self.repo.list_attributables(&ids, attributable_type)? {
            by_attribute
                .entry(attributable.attribute_id)
                .or_default()
                .push(attributable);
        }

        Ok(attributes
            .into_iter()
            .map(|attribute| AttributeWithAttributables {
                attributables: by_attribute.remove(&attribute.id).unwrap_or_default(),
                attribute,
            })
            .collect())
    }

    /// Returns all `(handle, id)` pairs with raw ids.
    pub fn get_handles(&self) -> ServiceResult<Vec<AttributeHandle>> {
        Ok(self.repo.list_handles()?)
    }

    fn find_by_hashed_id(&self, hashed_id: &str) -> ServiceResult<Attribute> {
        let not_found = || AttributeServiceError::AttributeNotFound(hashed_id.to_string());
        let id = self.codec.decode(hashed_id).ok_or_else(not_found)?;
        self.repo.get_attribute(id)?.ok_or_else(not_found)
    }

    fn new_position_for_group(&self, group_id: GroupId) -> ServiceResult<i64> {
        match self.repo.last_in_group(group_id)? {
            None => Ok(1),
            Some(last) => last.position.checked_add(1).ok_or_else(|| {
                self.reject(AttributeServiceError::Validation(
                    AttributeValidationError::PositionOverflow,
                ))
            }),
        }
    }

    fn not_found_or(&self, err: RepoError, hashed_id: &str) -> AttributeServiceError {
        match err {
            RepoError::NotFound(_) => {
                AttributeServiceError::AttributeNotFound(hashed_id.to_string())
            }
            other => other.into(),
        }
    }

    fn reject(&self, err: AttributeServiceError) -> AttributeServiceError {
        warn!(
            "event=attribute_request module=service status=rejected error_code={} status_code={}",
            err.code(),
            err.status_code()
        );
        err
    }
}
