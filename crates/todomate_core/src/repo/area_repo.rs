//! Life area repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listings are ordered by `order_index ASC, id ASC`.
//! - Deleting an area never deletes tasks: the schema nullifies
//!   `tasks.life_area_id` and cascades the area's weekly goals.
//! - Batch inserts run in one transaction.

use super::{bool_to_int, ensure_tables, int_to_bool, RepoError, RepoResult};
use crate::model::life_area::{LifeArea, LifeAreaDraft, LifeAreaId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const AREA_SELECT_SQL: &str = "SELECT
    id,
    name,
    icon,
    color,
    is_default,
    order_index
FROM life_areas";

/// Conflict policy for inserts that carry an explicit id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnConflict {
    /// Keep the existing row.
    #[default]
    Ignore,
    /// Overwrite the existing row.
    Replace,
}

impl OnConflict {
    fn insert_verb(self) -> &'static str {
        match self {
            Self::Ignore => "INSERT OR IGNORE",
            Self::Replace => "INSERT OR REPLACE",
        }
    }
}

/// Store interface for life areas.
pub trait LifeAreaRepository {
    fn list_all(&self) -> RepoResult<Vec<LifeArea>>;
    fn get_by_id(&self, id: LifeAreaId) -> RepoResult<Option<LifeArea>>;
    /// Inserts one area, ignoring id conflicts. Returns `None` when ignored.
    fn insert(&self, draft: &LifeAreaDraft) -> RepoResult<Option<LifeAreaId>>;
    /// Inserts many areas atomically. Returns the number of rows written.
    fn insert_many(&self, drafts: &[LifeAreaDraft], on_conflict: OnConflict) -> RepoResult<usize>;
    fn update(&self, area: &LifeArea) -> RepoResult<()>;
    fn delete(&self, id: LifeAreaId) -> RepoResult<()>;
    fn delete_all(&self) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<u32>;
}

/// SQLite-backed life area repository.
pub struct SqliteLifeAreaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLifeAreaRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["life_areas"])?;
        Ok(Self { conn })
    }
}

impl LifeAreaRepository for SqliteLifeAreaRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<LifeArea>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AREA_SELECT_SQL} ORDER BY order_index ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut areas = Vec::new();
        while let Some(row) = rows.next()? {
            areas.push(parse_area_row(row)?);
        }
        Ok(areas)
    }

    fn get_by_id(&self, id: LifeAreaId) -> RepoResult<Option<LifeArea>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AREA_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_area_row(row)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, draft: &LifeAreaDraft) -> RepoResult<Option<LifeAreaId>> {
        insert_draft(self.conn, draft, OnConflict::Ignore)
    }

    fn insert_many(&self, drafts: &[LifeAreaDraft], on_conflict: OnConflict) -> RepoResult<usize> {
        for draft in drafts {
            draft.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut written = 0;
        for draft in drafts {
            if insert_draft(&tx, draft, on_conflict)?.is_some() {
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    fn update(&self, area: &LifeArea) -> RepoResult<()> {
        area.validate()?;

        let changed = self.conn.execute(
            "UPDATE life_areas
             SET
                name = ?1,
                icon = ?2,
                color = ?3,
                is_default = ?4,
                order_index = ?5
             WHERE id = ?6;",
            params![
                area.name.as_str(),
                area.icon.as_str(),
                i64::from(area.color),
                bool_to_int(area.is_default),
                area.order_index,
                area.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::LifeAreaNotFound(area.id));
        }
        Ok(())
    }

    fn delete(&self, id: LifeAreaId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM life_areas WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::LifeAreaNotFound(id));
        }
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM life_areas;", [])?)
    }

    fn count(&self) -> RepoResult<u32> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM life_areas;", [], |row| row.get(0))?;
        u32::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("life area count `{count}` out of range")))
    }
}

fn insert_draft(
    conn: &Connection,
    draft: &LifeAreaDraft,
    on_conflict: OnConflict,
) -> RepoResult<Option<LifeAreaId>> {
    draft.validate()?;

    let id = conn
        .query_row(
            &format!(
                "{} INTO life_areas (id, name, icon, color, is_default, order_index)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING id;",
                on_conflict.insert_verb()
            ),
            params![
                draft.id,
                draft.name.as_str(),
                draft.icon.as_str(),
                i64::from(draft.color),
                bool_to_int(draft.is_default),
                draft.order_index,
            ],
            |row| row.get::<_, LifeAreaId>(0),
        )
        .optional()?;
    Ok(id)
}

fn parse_area_row(row: &Row<'_>) -> RepoResult<LifeArea> {
    let color_raw: i64 = row.get("color")?;
    let color = u32::try_from(color_raw).map_err(|_| {
        RepoError::InvalidData(format!("invalid color `{color_raw}` in life_areas.color"))
    })?;

    let area = LifeArea {
        id: row.get("id")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color,
        is_default: int_to_bool(row.get("is_default")?, "life_areas.is_default")?,
        order_index: row.get("order_index")?,
    };
    area.validate()?;
    Ok(area)
}
