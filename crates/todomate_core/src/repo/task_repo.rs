//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, sorted listing, and substring search over `tasks`.
//! - Provide per-area weekly count queries consumed by the stats engine.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Count queries exclude unassigned tasks and use inclusive bounds.
//! - Every listing has a deterministic tiebreak on `id`.

use super::{bool_to_int, ensure_tables, int_to_bool, RepoError, RepoResult};
use crate::model::life_area::LifeAreaId;
use crate::model::task::{Priority, Task, TaskId};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    is_completed,
    priority,
    category,
    life_area_id,
    created_at
FROM tasks";

/// Sort order for full task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskSort {
    /// Newest first.
    #[default]
    DateDesc,
    /// Oldest first.
    DateAsc,
    /// Highest priority first, newest first within one priority.
    Priority,
}

impl TaskSort {
    fn order_by(self) -> &'static str {
        match self {
            Self::DateDesc => "created_at DESC, id ASC",
            Self::DateAsc => "created_at ASC, id ASC",
            Self::Priority => "priority DESC, created_at DESC, id ASC",
        }
    }
}

/// Task count for one life area inside a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaCount {
    pub life_area_id: LifeAreaId,
    pub count: u32,
}

/// Store interface for tasks.
pub trait TaskRepository {
    fn insert(&self, task: &Task) -> RepoResult<TaskId>;
    fn update(&self, task: &Task) -> RepoResult<()>;
    fn delete(&self, id: TaskId) -> RepoResult<()>;
    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_all(&self, sort: TaskSort) -> RepoResult<Vec<Task>>;
    /// Case-insensitive substring match on title or description, newest first.
    fn search(&self, query: &str) -> RepoResult<Vec<Task>>;
    /// Per-area totals for tasks created within `[start_ms, end_ms]`.
    fn count_by_area(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<AreaCount>>;
    /// Per-area completed totals for tasks created within `[start_ms, end_ms]`.
    fn count_completed_by_area(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<AreaCount>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["tasks"])?;
        Ok(Self { conn })
    }

    fn query_tasks(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn query_counts(&self, sql: &str, start_ms: i64, end_ms: i64) -> RepoResult<Vec<AreaCount>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![start_ms, end_ms])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let count: i64 = row.get("count")?;
            counts.push(AreaCount {
                life_area_id: row.get("life_area_id")?,
                count: u32::try_from(count).map_err(|_| {
                    RepoError::InvalidData(format!("task count `{count}` out of range"))
                })?,
            });
        }
        Ok(counts)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                is_completed,
                priority,
                category,
                life_area_id,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                bool_to_int(task.is_completed),
                task.priority.as_code(),
                task.category.as_str(),
                task.life_area_id,
                task.created_at,
            ],
        )?;

        Ok(task.id)
    }

    fn update(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                is_completed = ?3,
                priority = ?4,
                category = ?5,
                life_area_id = ?6,
                created_at = ?7
             WHERE id = ?8;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                bool_to_int(task.is_completed),
                task.priority.as_code(),
                task.category.as_str(),
                task.life_area_id,
                task.created_at,
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::TaskNotFound(task.id));
        }
        Ok(())
    }

    fn delete(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::TaskNotFound(id));
        }
        Ok(())
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let tasks = self.query_tasks(
            &format!("{TASK_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
        )?;
        Ok(tasks.into_iter().next())
    }

    fn list_all(&self, sort: TaskSort) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} ORDER BY {};", sort.order_by()),
            [],
        )
    }

    fn search(&self, query: &str) -> RepoResult<Vec<Task>> {
        let pattern = format!("%{}%", escape_like(query));
        self.query_tasks(
            &format!(
                "{TASK_SELECT_SQL}
                 WHERE title LIKE ?1 ESCAPE '\\'
                    OR description LIKE ?1 ESCAPE '\\'
                 ORDER BY {};",
                TaskSort::DateDesc.order_by()
            ),
            [pattern],
        )
    }

    fn count_by_area(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<AreaCount>> {
        self.query_counts(
            "SELECT life_area_id, COUNT(*) AS count
             FROM tasks
             WHERE created_at BETWEEN ?1 AND ?2
               AND life_area_id IS NOT NULL
             GROUP BY life_area_id
             ORDER BY life_area_id ASC;",
            start_ms,
            end_ms,
        )
    }

    fn count_completed_by_area(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<AreaCount>> {
        self.query_counts(
            "SELECT life_area_id, COUNT(*) AS count
             FROM tasks
             WHERE created_at BETWEEN ?1 AND ?2
               AND is_completed = 1
               AND life_area_id IS NOT NULL
             GROUP BY life_area_id
             ORDER BY life_area_id ASC;",
            start_ms,
            end_ms,
        )
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{id_text}` in tasks.id")))?;

    let priority_code: i64 = row.get("priority")?;
    let priority = Priority::from_code(priority_code).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{priority_code}` in tasks.priority"))
    })?;

    let task = Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed: int_to_bool(row.get("is_completed")?, "tasks.is_completed")?,
        priority,
        category: row.get("category")?,
        life_area_id: row.get("life_area_id")?,
        created_at: row.get("created_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
