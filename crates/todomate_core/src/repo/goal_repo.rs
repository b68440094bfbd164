//! Weekly goal repository contract and SQLite implementation.
//!
//! # Invariants
//! - Writes are upserts keyed by `(life_area_id, week_start)`; re-saving a
//!   goal replaces its percentage instead of adding a row.
//! - Batch upserts are applied in one transaction, so concurrent saves for
//!   different areas of the same week never clobber each other.

use super::{ensure_tables, RepoError, RepoResult};
use crate::model::life_area::LifeAreaId;
use crate::model::weekly_goal::{GoalTarget, WeeklyGoal, WeeklyGoalId, MAX_TARGET_PERCENTAGE};
use rusqlite::{params, Connection, Row};

const GOAL_SELECT_SQL: &str = "SELECT
    id,
    life_area_id,
    week_start,
    target_percentage,
    created_at
FROM weekly_goals";

/// Store interface for weekly goals.
pub trait WeeklyGoalRepository {
    fn list_for_week(&self, week_start: i64) -> RepoResult<Vec<WeeklyGoal>>;
    fn get_for_week_and_area(
        &self,
        week_start: i64,
        life_area_id: LifeAreaId,
    ) -> RepoResult<Option<WeeklyGoal>>;
    /// Inserts or replaces the goal for `(area, week)` at `created_at`.
    fn upsert(&self, target: &GoalTarget, created_at: i64) -> RepoResult<WeeklyGoalId>;
    fn upsert_many(&self, targets: &[GoalTarget], created_at: i64) -> RepoResult<Vec<WeeklyGoalId>>;
    fn delete_for_week(&self, week_start: i64) -> RepoResult<usize>;
}

/// SQLite-backed weekly goal repository.
pub struct SqliteWeeklyGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWeeklyGoalRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["weekly_goals", "life_areas"])?;
        Ok(Self { conn })
    }
}

impl WeeklyGoalRepository for SqliteWeeklyGoalRepository<'_> {
    fn list_for_week(&self, week_start: i64) -> RepoResult<Vec<WeeklyGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL} WHERE week_start = ?1 ORDER BY life_area_id ASC;"
        ))?;
        let mut rows = stmt.query([week_start])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn get_for_week_and_area(
        &self,
        week_start: i64,
        life_area_id: LifeAreaId,
    ) -> RepoResult<Option<WeeklyGoal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL} WHERE week_start = ?1 AND life_area_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![week_start, life_area_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_goal_row(row)?)),
            None => Ok(None),
        }
    }

    fn upsert(&self, target: &GoalTarget, created_at: i64) -> RepoResult<WeeklyGoalId> {
        upsert_target(self.conn, target, created_at)
    }

    fn upsert_many(&self, targets: &[GoalTarget], created_at: i64) -> RepoResult<Vec<WeeklyGoalId>> {
        for target in targets {
            target.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let ids = targets
            .iter()
            .map(|target| upsert_target(&tx, target, created_at))
            .collect::<RepoResult<Vec<_>>>()?;
        tx.commit()?;
        Ok(ids)
    }

    fn delete_for_week(&self, week_start: i64) -> RepoResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM weekly_goals WHERE week_start = ?1;", [week_start])?)
    }
}

fn upsert_target(conn: &Connection, target: &GoalTarget, created_at: i64) -> RepoResult<WeeklyGoalId> {
    target.validate()?;

    let area_exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM life_areas WHERE id = ?1);",
        [target.life_area_id],
        |row| row.get(0),
    )?;
    if area_exists != 1 {
        return Err(RepoError::LifeAreaNotFound(target.life_area_id));
    }

    let id = conn.query_row(
        "INSERT INTO weekly_goals (life_area_id, week_start, target_percentage, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(life_area_id, week_start) DO UPDATE SET
            target_percentage = excluded.target_percentage,
            created_at = excluded.created_at
         RETURNING id;",
        params![
            target.life_area_id,
            target.week_start,
            i64::from(target.target_percentage),
            created_at,
        ],
        |row| row.get::<_, WeeklyGoalId>(0),
    )?;
    Ok(id)
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<WeeklyGoal> {
    let raw: i64 = row.get("target_percentage")?;
    let target_percentage = u8::try_from(raw)
        .ok()
        .filter(|value| *value <= MAX_TARGET_PERCENTAGE)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid target percentage `{raw}` in weekly_goals.target_percentage"
            ))
        })?;

    Ok(WeeklyGoal {
        id: row.get("id")?,
        life_area_id: row.get("life_area_id")?,
        week_start: row.get("week_start")?,
        target_percentage,
        created_at: row.get("created_at")?,
    })
}
