//! Life area and weekly goal use-case service.
//!
//! # Responsibility
//! - Manage user-defined areas (add, rename, delete, reset to defaults).
//! - Save per-week goal percentages keyed by canonical week start.
//! - Publish store changes so dashboards recompute.
//!
//! # Invariants
//! - Goal week starts are canonicalized before any read or write.
//! - Goals of weeks after the current one are never written.
//! - Custom areas are appended after the current highest `order_index`.
//! - Reset restores exactly the built-in areas with their fixed ids.

use crate::calendar::WeekCalendar;
use crate::clock::{Clock, SystemClock};
use crate::model::life_area::{default_areas, LifeArea, LifeAreaDraft, LifeAreaId};
use crate::model::weekly_goal::{GoalTarget, WeeklyGoal};
use crate::notify::{ChangeHub, StoreChange};
use crate::repo::area_repo::{LifeAreaRepository, OnConflict};
use crate::repo::goal_repo::WeeklyGoalRepository;
use crate::repo::RepoError;
use chrono::{Local, TimeZone};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Service error for area and goal use-cases.
#[derive(Debug)]
pub enum AreaServiceError {
    /// Area name is blank after trim.
    InvalidName,
    /// Target area does not exist.
    LifeAreaNotFound(LifeAreaId),
    /// Goal write aimed at a week after the current one.
    FutureWeek { week_start: i64 },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for AreaServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "life area name must not be blank"),
            Self::LifeAreaNotFound(id) => write!(f, "life area not found: {id}"),
            Self::FutureWeek { week_start } => {
                write!(f, "goals of future weeks cannot be edited: week_start={week_start}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent life area state: {details}")
            }
        }
    }
}

impl Error for AreaServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AreaServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::LifeAreaNotFound(id) => Self::LifeAreaNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type AreaServiceResult<T> = Result<T, AreaServiceError>;

/// Area/goal service facade over repository implementations.
pub struct AreaService<A, G, Tz = Local>
where
    A: LifeAreaRepository,
    G: WeeklyGoalRepository,
    Tz: TimeZone,
{
    areas: A,
    goals: G,
    calendar: WeekCalendar<Tz>,
    changes: ChangeHub,
    clock: Arc<dyn Clock>,
}

impl<A: LifeAreaRepository, G: WeeklyGoalRepository> AreaService<A, G, Local> {
    /// Creates a service that buckets weeks in the local timezone.
    pub fn new(areas: A, goals: G) -> Self {
        Self {
            areas,
            goals,
            calendar: WeekCalendar::local(),
            changes: ChangeHub::disconnected(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl<A, G, Tz> AreaService<A, G, Tz>
where
    A: LifeAreaRepository,
    G: WeeklyGoalRepository,
    Tz: TimeZone,
{
    /// Rebinds week arithmetic to another calendar.
    pub fn with_calendar<T: TimeZone>(self, calendar: WeekCalendar<T>) -> AreaService<A, G, T> {
        AreaService {
            areas: self.areas,
            goals: self.goals,
            calendar,
            changes: self.changes,
            clock: self.clock,
        }
    }

    pub fn with_change_hub(mut self, hub: ChangeHub) -> Self {
        self.changes = hub;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lists areas in display order.
    pub fn list_areas(&self) -> AreaServiceResult<Vec<LifeArea>> {
        Ok(self.areas.list_all()?)
    }

    pub fn get_area(&self, id: LifeAreaId) -> AreaServiceResult<Option<LifeArea>> {
        Ok(self.areas.get_by_id(id)?)
    }

    /// Appends a user-defined area after the last one.
    pub fn add_custom_area(&self, name: impl Into<String>) -> AreaServiceResult<LifeArea> {
        let name = normalize_name(name.into())?;
        let max_order = self
            .areas
            .list_all()?
            .iter()
            .map(|area| area.order_index)
            .max()
            .unwrap_or(0);

        let draft = LifeAreaDraft::custom(name, max_order + 1);
        let id = self
            .areas
            .insert(&draft)?
            .ok_or(AreaServiceError::InconsistentState(
                "custom area insert was ignored",
            ))?;
        let area = self
            .areas
            .get_by_id(id)?
            .ok_or(AreaServiceError::InconsistentState(
                "created area not found in read-back",
            ))?;

        info!(
            "event=area_create module=area status=ok area_id={} order_index={}",
            area.id, area.order_index
        );
        self.changes.publish(StoreChange::LifeAreas);
        Ok(area)
    }

    /// Renames one area, keeping its other fields.
    pub fn rename_area(
        &self,
        id: LifeAreaId,
        name: impl Into<String>,
    ) -> AreaServiceResult<LifeArea> {
        let name = normalize_name(name.into())?;
        let mut area = self
            .areas
            .get_by_id(id)?
            .ok_or(AreaServiceError::LifeAreaNotFound(id))?;
        area.name = name;
        self.areas.update(&area)?;
        self.changes.publish(StoreChange::LifeAreas);
        Ok(area)
    }

    /// Deletes one area. Its tasks become unassigned; its goals are removed.
    pub fn delete_area(&self, id: LifeAreaId) -> AreaServiceResult<()> {
        self.areas.delete(id)?;
        info!("event=area_delete module=area status=ok area_id={id}");
        self.changes.publish(StoreChange::LifeAreas);
        self.changes.publish(StoreChange::Tasks);
        Ok(())
    }

    /// Removes every area and re-seeds the built-in defaults.
    pub fn reset_areas(&self) -> AreaServiceResult<Vec<LifeArea>> {
        let removed = self.areas.delete_all()?;
        let restored = self.areas.insert_many(&default_areas(), OnConflict::Replace)?;
        info!(
            "event=area_reset module=area status=ok removed={removed} restored={restored}"
        );
        self.changes.publish(StoreChange::LifeAreas);
        self.changes.publish(StoreChange::Tasks);
        self.list_areas()
    }

    /// Canonical week start used for goals saved at `timestamp_ms`.
    pub fn week_start_for(&self, timestamp_ms: i64) -> i64 {
        self.calendar.week_start(timestamp_ms)
    }

    /// Returns the goals of the week containing `timestamp_ms`.
    pub fn goals_for_week(&self, timestamp_ms: i64) -> AreaServiceResult<Vec<WeeklyGoal>> {
        let week_start = self.calendar.week_start(timestamp_ms);
        Ok(self.goals.list_for_week(week_start)?)
    }

    pub fn goal_for(
        &self,
        timestamp_ms: i64,
        life_area_id: LifeAreaId,
    ) -> AreaServiceResult<Option<WeeklyGoal>> {
        let week_start = self.calendar.week_start(timestamp_ms);
        Ok(self.goals.get_for_week_and_area(week_start, life_area_id)?)
    }

    /// Upserts goal percentages for the week containing `timestamp_ms`.
    ///
    /// Areas not mentioned keep their existing goal for that week.
    pub fn save_weekly_goals(
        &self,
        timestamp_ms: i64,
        percentages: &[(LifeAreaId, u8)],
    ) -> AreaServiceResult<Vec<WeeklyGoal>> {
        let week_start = self.editable_week(timestamp_ms)?;
        let targets = percentages
            .iter()
            .map(|&(life_area_id, target_percentage)| GoalTarget {
                life_area_id,
                week_start,
                target_percentage,
            })
            .collect::<Vec<_>>();

        self.goals.upsert_many(&targets, self.clock.now_ms())?;
        info!(
            "event=goals_save module=goal status=ok week_start={week_start} count={}",
            targets.len()
        );
        self.changes.publish(StoreChange::WeeklyGoals { week_start });
        Ok(self.goals.list_for_week(week_start)?)
    }

    /// Deletes every goal of the week containing `timestamp_ms`.
    pub fn clear_weekly_goals(&self, timestamp_ms: i64) -> AreaServiceResult<usize> {
        let week_start = self.editable_week(timestamp_ms)?;
        let removed = self.goals.delete_for_week(week_start)?;
        self.changes.publish(StoreChange::WeeklyGoals { week_start });
        Ok(removed)
    }

    fn editable_week(&self, timestamp_ms: i64) -> AreaServiceResult<i64> {
        let week_start = self.calendar.week_start(timestamp_ms);
        if !self.calendar.is_navigable(week_start, self.clock.now_ms()) {
            warn!(
                "event=goals_save module=goal status=rejected week_start={week_start} reason=future_week"
            );
            return Err(AreaServiceError::FutureWeek { week_start });
        }
        Ok(week_start)
    }
}

fn normalize_name(name: String) -> AreaServiceResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AreaServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}
