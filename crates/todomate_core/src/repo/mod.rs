//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contracts consumed by services and the dashboard.
//! - Isolate SQLite query details from orchestration code.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to DB
//!   transport errors.

pub mod area_repo;
pub mod goal_repo;
pub mod task_repo;

use crate::db::DbError;
use crate::model::life_area::{LifeAreaId, LifeAreaValidationError};
use crate::model::task::{TaskId, TaskValidationError};
use crate::model::weekly_goal::GoalValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for store persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    TaskValidation(TaskValidationError),
    LifeAreaValidation(LifeAreaValidationError),
    GoalValidation(GoalValidationError),
    Db(DbError),
    TaskNotFound(TaskId),
    LifeAreaNotFound(LifeAreaId),
    InvalidData(String),
    /// Connection was not migrated to a schema that has this table.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskValidation(err) => write!(f, "{err}"),
            Self::LifeAreaValidation(err) => write!(f, "{err}"),
            Self::GoalValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::LifeAreaNotFound(id) => write!(f, "life area not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TaskValidation(err) => Some(err),
            Self::LifeAreaValidation(err) => Some(err),
            Self::GoalValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::TaskNotFound(_)
            | Self::LifeAreaNotFound(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::TaskValidation(value)
    }
}

impl From<LifeAreaValidationError> for RepoError {
    fn from(value: LifeAreaValidationError) -> Self {
        Self::LifeAreaValidation(value)
    }
}

impl From<GoalValidationError> for RepoError {
    fn from(value: GoalValidationError) -> Self {
        Self::GoalValidation(value)
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

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
