//! Entity store repositories for venues, artists and shows.
//!
//! # Responsibility
//! - Define per-entity persistence contracts and their SQLite implementations.
//! - Isolate SQL, row decoding and constraint mapping from the service layer.
//!
//! # Invariants
//! - Write paths validate profiles before any SQL mutation.
//! - Missing rows surface as `NotFound`, never as empty/default records.
//! - Foreign-key and CHECK failures surface as `ConstraintViolation`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{fold_case, DbError};
use crate::model::validation::ValidationError;
use crate::model::EntityKind;
use rusqlite::{Connection, ErrorCode};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod artist_repo;
pub mod show_repo;
pub mod venue_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy for store reads and writes.
#[derive(Debug)]
pub enum RepoError {
    /// Inbound attributes failed field validation.
    Validation(ValidationError),
    /// Store failure: SQLite error, commit failure, unsupported schema.
    Db(DbError),
    /// Id does not resolve to a row.
    NotFound { entity: EntityKind, id: i64 },
    /// Referential integrity or another store constraint was violated.
    ConstraintViolation(String),
    /// Persisted row cannot be decoded into a record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl RepoError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Db(err) => err.code(),
            Self::NotFound { .. } => "not_found",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_required_table",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => {
                write!(f, "{} not found: {id}", entity.label().to_lowercase())
            }
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "booking store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "booking store requires table `{table}`")
            }
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

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
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
        match &value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(message.clone().unwrap_or_else(|| failure.to_string()))
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// One name-search hit with its upcoming show count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameMatch {
    pub id: i64,
    pub name: String,
    /// Shows starting strictly after the request's `now`.
    pub num_upcoming_shows: u32,
}

/// Verifies the connection is migrated and has the given tables.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

/// Builds a literal `LIKE` pattern for substring search over
/// `fold_case(column)`.
///
/// The term is case-folded with the same Unicode rules as the SQL side.
/// `%`, `_` and `\` in the term are escaped; pair with `ESCAPE '\'`.
pub(crate) fn substring_pattern(term: &str) -> String {
    let folded = fold_case(term);
    let mut pattern = String::with_capacity(folded.len() + 2);
    pattern.push('%');
    for ch in folded.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn encode_genres(genres: &[String]) -> RepoResult<String> {
    serde_json::to_string(genres)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode genres: {err}")))
}

pub(crate) fn decode_genres(table: &str, raw: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|_| {
        RepoError::InvalidData(format!("invalid genres value `{raw}` in {table}.genres"))
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(table: &str, column: &str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::substring_pattern;

    #[test]
    fn substring_pattern_escapes_like_wildcards() {
        assert_eq!(substring_pattern(""), "%%");
        assert_eq!(substring_pattern("Hall"), "%hall%");
        assert_eq!(substring_pattern("CAFÉ"), "%café%");
        assert_eq!(substring_pattern("100%_"), "%100\\%\\_%");
        assert_eq!(substring_pattern("a\\b"), "%a\\\\b%");
    }
}
