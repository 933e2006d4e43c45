//! Attribute repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed CRUD and query APIs over `attributes` storage.
//! - Own attributable link/value persistence used for eager loading.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listings are deterministic: `position ASC, id ASC`.
//! - Batch position updates are applied in one transaction.

use crate::db::DbError;
use crate::model::attributable::{Attributable, AttributableId, AttributeValue};
use crate::model::attribute::{
    Attribute, AttributeDraft, AttributeHandle, AttributeId, AttributeValidationError,
};
use crate::model::attribute_group::GroupId;
use crate::repo::{bool_to_int, ensure_table_ready};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ATTRIBUTE_SELECT_SQL: &str = "SELECT
    id,
    group_id,
    name,
    handle,
    type,
    position,
    variant,
    searchable,
    filterable,
    created_at,
    updated_at
FROM attributes";

const ATTRIBUTE_COLUMNS: &[&str] = &[
    "id",
    "group_id",
    "name",
    "handle",
    "type",
    "position",
    "variant",
    "searchable",
    "filterable",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for attribute and group persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(AttributeValidationError),
    Db(DbError),
    NotFound(AttributeId),
    GroupNotFound(GroupId),
    AttributableNotFound(AttributableId),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "attribute not found: {id}"),
            Self::GroupNotFound(id) => write!(f, "attribute group not found: {id}"),
            Self::AttributableNotFound(id) => write!(f, "attributable not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "attribute repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "attribute repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "attribute repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted attribute data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AttributeValidationError> for RepoError {
    fn from(value: AttributeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Typed predicates for attribute listings. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeListQuery {
    pub ids: Option<Vec<AttributeId>>,
    pub group_id: Option<GroupId>,
    pub handles: Option<Vec<String>>,
    pub filterable: Option<bool>,
    pub searchable: Option<bool>,
}

impl AttributeListQuery {
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn for_ids(ids: &[AttributeId]) -> Self {
        Self {
            ids: Some(ids.to_vec()),
            ..Self::default()
        }
    }
}

/// Repository interface for attribute persistence.
pub trait AttributeRepository {
    /// Inserts one attribute and returns the stored row.
    fn create_attribute(&self, draft: &AttributeDraft) -> RepoResult<Attribute>;
    /// Overwrites all mutable columns of an existing attribute.
    fn update_attribute(&self, attribute: &Attribute) -> RepoResult<()>;
    /// Hard-deletes one attribute; attributables cascade.
    fn delete_attribute(&self, id: AttributeId) -> RepoResult<()>;
    fn get_attribute(&self, id: AttributeId) -> RepoResult<Option<Attribute>>;
    /// Batch lookup. Missing ids are skipped.
    fn get_attributes(&self, ids: &[AttributeId]) -> RepoResult<Vec<Attribute>>;
    fn list_attributes(&self, query: &AttributeListQuery) -> RepoResult<Vec<Attribute>>;
    /// Attribute with the highest position in a group.
    fn last_in_group(&self, group_id: GroupId) -> RepoResult<Option<Attribute>>;
    /// Whether `name` is taken in a group, optionally ignoring one attribute.
    fn name_exists_in_group(
        &self,
        name: &str,
        group_id: GroupId,
        exclude: Option<AttributeId>,
    ) -> RepoResult<bool>;
    /// Writes `(id, position)` pairs atomically.
    fn update_positions(&self, positions: &[(AttributeId, i64)]) -> RepoResult<()>;
    fn list_handles(&self) -> RepoResult<Vec<AttributeHandle>>;
    /// Attributables of the given attributes with their value records.
    fn list_attributables(
        &self,
        attribute_ids: &[AttributeId],
        attributable_type: Option<&str>,
    ) -> RepoResult<Vec<Attributable>>;
    /// Links an attribute to an owning entity. Re-attaching returns the
    /// existing link.
    fn attach_attributable(
        &self,
        attribute_id: AttributeId,
        attributable_type: &str,
        attributable_id: i64,
    ) -> RepoResult<Attributable>;
    /// Inserts or replaces the value of one attributable for `locale`.
    fn set_attributable_value(
        &self,
        attributable_id: AttributableId,
        locale: &str,
        value: &str,
    ) -> RepoResult<AttributeValue>;
}

/// SQLite-backed attribute repository.
pub struct SqliteAttributeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttributeRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "attributes", ATTRIBUTE_COLUMNS)?;
        ensure_table_ready(
            conn,
            "attributables",
            &["id", "attribute_id", "attributable_type", "attributable_id"],
        )?;
        ensure_table_ready(
            conn,
            "attribute_values",
            &["id", "attributable_id", "locale", "value"],
        )?;
        Ok(Self { conn })
    }
}

impl AttributeRepository for SqliteAttributeRepository<'_> {
    fn create_attribute(&self, draft: &AttributeDraft) -> RepoResult<Attribute> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO attributes (
                group_id,
                name,
                handle,
                type,
                position,
                variant,
                searchable,
                filterable
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                draft.group_id,
                draft.name.as_str(),
                draft.handle.as_str(),
                draft.kind.as_str(),
                draft.position,
                bool_to_int(draft.variant),
                bool_to_int(draft.searchable),
                bool_to_int(draft.filterable),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_attribute(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted attribute {id} missing on read-back"))
        })
    }

    fn update_attribute(&self, attribute: &Attribute) -> RepoResult<()> {
        attribute.validate()?;

        let changed = self.conn.execute(
            "UPDATE attributes
             SET
                group_id = ?1,
                name = ?2,
                handle = ?3,
                type = ?4,
                position = ?5,
                variant = ?6,
                searchable = ?7,
                filterable = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?9;",
            params![
                attribute.group_id,
                attribute.name.as_str(),
                attribute.handle.as_str(),
                attribute.kind.as_str(),
                attribute.position,
                bool_to_int(attribute.variant),
                bool_to_int(attribute.searchable),
                bool_to_int(attribute.filterable),
                attribute.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(attribute.id));
        }

        Ok(())
    }

    fn delete_attribute(&self, id: AttributeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM attributes WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_attribute(&self, id: AttributeId) -> RepoResult<Option<Attribute>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ATTRIBUTE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attribute_row(row)?));
        }

        Ok(None)
    }

    fn get_attributes(&self, ids: &[AttributeId]) -> RepoResult<Vec<Attribute>> {
        self.list_attributes(&AttributeListQuery::for_ids(ids))
    }

    fn list_attributes(&self, query: &AttributeListQuery) -> RepoResult<Vec<Attribute>> {
        let mut sql = format!("{ATTRIBUTE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(ids) = query.ids.as_ref() {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            sql.push_str(&format!(" AND id IN ({})", placeholders(ids.len())));
            bind_values.extend(ids.iter().copied().map(Value::Integer));
        }

        if let Some(group_id) = query.group_id {
            sql.push_str(" AND group_id = ?");
            bind_values.push(Value::Integer(group_id));
        }

        if let Some(handles) = query.handles.as_ref() {
            if handles.is_empty() {
                return Ok(Vec::new());
            }
            sql.push_str(&format!(" AND handle IN ({})", placeholders(handles.len())));
            bind_values.extend(handles.iter().cloned().map(Value::Text));
        }

        if let Some(filterable) = query.filterable {
            sql.push_str(" AND filterable = ?");
            bind_values.push(Value::Integer(bool_to_int(filterable)));
        }

        if let Some(searchable) = query.searchable {
            sql.push_str(" AND searchable = ?");
            bind_values.push(Value::Integer(bool_to_int(searchable)));
        }

        sql.push_str(" ORDER BY position ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut attributes = Vec::new();

        while let Some(row) = rows.next()? {
            attributes.push(parse_attribute_row(row)?);
        }

        Ok(attributes)
    }

    fn last_in_group(&self, group_id: GroupId) -> RepoResult<Option<Attribute>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATTRIBUTE_SELECT_SQL}
             WHERE group_id = ?1
             ORDER BY position DESC, id DESC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query([group_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_attribute_row(row)?));
        }

        Ok(None)
    }

    fn name_exists_in_group(
        &self,
        name: &str,
        group_id: GroupId,
        exclude: Option<AttributeId>,
    ) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM attributes
                WHERE name = ?1 COLLATE NOCASE
                  AND group_id = ?2
                  AND (?3 IS NULL OR id != ?3)
            );",
            params![name, group_id, exclude],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn update_positions(&self, positions: &[(AttributeId, i64)]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        for &(id, position) in positions {
            let changed = tx.execute(
                "UPDATE attributes
                 SET position = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![id, position],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn list_handles(&self) -> RepoResult<Vec<AttributeHandle>> {
        let mut stmt = self
            .conn
            .prepare("SELECT handle, id FROM attributes ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut handles = Vec::new();
        while let Some(row) = rows.next()? {
            handles.push(AttributeHandle {
                handle: row.get("handle")?,
                id: row.get("id")?,
            });
        }
        Ok(handles)
    }

    fn list_attributables(
        &self,
        attribute_ids: &[AttributeId],
        attributable_type: Option<&str>,
    ) -> RepoResult<Vec<Attributable>> {
        if attribute_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            "SELECT id, attribute_id, attributable_type, attributable_id
             FROM attributables
             WHERE attribute_id IN ({})",
            placeholders(attribute_ids.len())
        );
        let mut bind_values: Vec<Value> = attribute_ids
            .iter()
            .copied()
            .map(Value::Integer)
            .collect();

        if let Some(attributable_type) = attributable_type {
            sql.push_str(" AND attributable_type = ?");
            bind_values.push(Value::Text(attributable_type.to_string()));
        }

        sql.push_str(" ORDER BY attribute_id ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut attributables = Vec::new();
        while let Some(row) = rows.next()? {
            let id: AttributableId = row.get("id")?;
            attributables.push(Attributable {
                id,
                attribute_id: row.get("attribute_id")?,
                attributable_type: row.get("attributable_type")?,
                attributable_id: row.get("attributable_id")?,
                records: load_values_for_attributable(self.conn, id)?,
            });
        }

        Ok(attributables)
    }

    fn attach_attributable(
        &self,
        attribute_id: AttributeId,
        attributable_type: &str,
        attributable_id: i64,
    ) -> RepoResult<Attributable> {
        if self.get_attribute(attribute_id)?.is_none() {
            return Err(RepoError::NotFound(attribute_id));
        }
        if attributable_type.trim().is_empty() {
            return Err(RepoError::InvalidData(
                "attributable type must not be blank".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO attributables (attribute_id, attributable_type, attributable_id)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (attribute_id, attributable_type, attributable_id) DO NOTHING;",
            params![attribute_id, attributable_type, attributable_id],
        )?;

        let id: AttributableId = self.conn.query_row(
            "SELECT id
             FROM attributables
             WHERE attribute_id = ?1
               AND attributable_type = ?2
               AND attributable_id = ?3;",
            params![attribute_id, attributable_type, attributable_id],
            |row| row.get(0),
        )?;

        Ok(Attributable {
            id,
            attribute_id,
            attributable_type: attributable_type.to_string(),
            attributable_id,
            records: load_values_for_attributable(self.conn, id)?,
        })
    }

    fn set_attributable_value(
        &self,
        attributable_id: AttributableId,
        locale: &str,
        value: &str,
    ) -> RepoResult<AttributeValue> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM attributables WHERE id = ?1;",
                [attributable_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(RepoError::AttributableNotFound(attributable_id));
        }

        self.conn.execute(
            "INSERT INTO attribute_values (attributable_id, locale, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (attributable_id, locale) DO UPDATE SET value = excluded.value;",
            params![attributable_id, locale, value],
        )?;

        let id: i64 = self.conn.query_row(
            "SELECT id FROM attribute_values WHERE attributable_id = ?1 AND locale = ?2;",
            params![attributable_id, locale],
            |row| row.get(0),
        )?;

        Ok(AttributeValue {
            id,
            attributable_id,
            locale: locale.to_string(),
            value: value.to_string(),
        })
    }
}

fn load_values_for_attributable(
    conn: &Connection,
    attributable_id: AttributableId,
) -> RepoResult<Vec<AttributeValue>> {
    let mut stmt = conn.prepare(
        "SELECT id, attributable_id, locale, value
         FROM attribute_values
         WHERE attributable_id = ?1
         ORDER BY locale ASC, id ASC;",
    )?;
    let mut rows = stmt.query([attributable_id])?;
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        values.push(AttributeValue {
            id: row.get("id")?,
            attributable_id: row.get("attributable_id")?,
            locale: row.get("locale")?,
            value: row.get("value")?,
        });
    }
    Ok(values)
}

fn parse_attribute_row(row: &Row<'_>) -> RepoResult<Attribute> {
    let attribute = Attribute {
        id: row.get("id")?,
        group_id: row.get("group_id")?,
        name: row.get("name")?,
        handle: row.get("handle")?,
        kind: row.get("type")?,
        position: row.get("position")?,
        variant: parse_flag(row, "variant")?,
        searchable: parse_flag(row, "searchable")?,
        filterable: parse_flag(row, "filterable")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    attribute.validate()?;
    Ok(attribute)
}

fn parse_flag(row: &Row<'_>, column: &'static str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in attributes.{column}"
        ))),
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
