//! Attribute group lookup contract and SQLite implementation.
//!
//! The attribute service only needs to resolve groups; group management
//! beyond creation and listing belongs to a separate service.

use crate::ids::IdCodec;
use crate::model::attribute_group::{AttributeGroup, GroupId};
use crate::repo::attribute_repo::{RepoError, RepoResult};
use crate::repo::ensure_table_ready;
use rusqlite::{params, Connection, Row};

const GROUP_SELECT_SQL: &str = "SELECT id, name, handle, position FROM attribute_groups";

/// Resolves opaque and raw group ids to attribute groups.
pub trait AttributeGroupLookup {
    /// Decodes `hashed_id` and loads the group. Undecodable ids yield `None`.
    fn get_by_hashed_id(&self, hashed_id: &str) -> RepoResult<Option<AttributeGroup>>;
    /// Decodes `hashed_id` without touching storage.
    fn get_decoded_id(&self, hashed_id: &str) -> Option<GroupId>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<AttributeGroup>>;
}

/// SQLite-backed attribute group repository.
pub struct SqliteAttributeGroupRepository<'conn, C: IdCodec> {
    conn: &'conn Connection,
    codec: C,
}

impl<'conn, C: IdCodec> SqliteAttributeGroupRepository<'conn, C> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection, codec: C) -> RepoResult<Self> {
        ensure_table_ready(conn, "attribute_groups", &["id", "name", "handle", "position"])?;
        Ok(Self { conn, codec })
    }

    /// Creates one group at the end of the group ordering.
    pub fn create_group(&self, name: &str, handle: &str) -> RepoResult<AttributeGroup> {
        if name.trim().is_empty() || handle.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "attribute group name and handle must not be blank".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO attribute_groups (name, handle, position)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(position), 0) + 1 FROM attribute_groups));",
            params![name, handle],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_group(id)?.ok_or(RepoError::GroupNotFound(id))
    }

    /// Lists groups in display order.
    pub fn list_groups(&self) -> RepoResult<Vec<AttributeGroup>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} ORDER BY position ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(parse_group_row(row)?);
        }
        Ok(groups)
    }

    /// Encodes a group id for external exposure.
    pub fn hashed_id(&self, group: &AttributeGroup) -> Option<String> {
        self.codec.encode(group.id)
    }
}

impl<C: IdCodec> AttributeGroupLookup for SqliteAttributeGroupRepository<'_, C> {
    fn get_by_hashed_id(&self, hashed_id: &str) -> RepoResult<Option<AttributeGroup>> {
        match self.get_decoded_id(hashed_id) {
            Some(id) => self.get_group(id),
            None => Ok(None),
        }
    }

    fn get_decoded_id(&self, hashed_id: &str) -> Option<GroupId> {
        self.codec.decode(hashed_id)
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<AttributeGroup>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GROUP_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_group_row(row)?));
        }
        Ok(None)
    }
}

fn parse_group_row(row: &Row<'_>) -> RepoResult<AttributeGroup> {
    Ok(AttributeGroup {
        id: row.get("id")?,
        name: row.get("name")?,
        handle: row.get("handle")?,
        position: row.get("position")?,
    })
}
