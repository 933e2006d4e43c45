//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define typed data access contracts for attributes and attribute groups.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate attribute fields before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Repositories only accept connections migrated to the latest schema.

use crate::db::migrations::latest_version;
use crate::db::{schema_version, table_exists, table_has_column};
use rusqlite::Connection;

pub mod attribute_repo;
pub mod group_repo;

use attribute_repo::{RepoError, RepoResult};

/// Verifies schema version and the presence of `table` with `columns`.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
