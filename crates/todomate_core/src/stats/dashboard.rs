//! Weekly dashboard state.
//!
//! # Responsibility
//! - Own the selected week and the latest consistent input snapshot.
//! - Recompute the goal-vs-actual chart when the store reports changes.
//! - Deliver each recomputed chart to registered observers.
//!
//! # Invariants
//! - Every emission is computed from one [`WeekInputs`] snapshot read for a
//!   single week inside [`DashboardSource::snapshot`]. Switching weeks
//!   replaces the snapshot wholesale.
//! - Navigation never moves past the current week.
//! - A failed read leaves the previous snapshot and selected week in place.
//! - No areas means no emission and no `latest()` chart.

use crate::ai::fallback::weekly_fallback;
use crate::calendar::{WeekCalendar, WeekWindow};
use crate::clock::{Clock, SystemClock};
use crate::model::life_area::LifeArea;
use crate::model::weekly_goal::WeeklyGoal;
use crate::notify::{ChangeFeed, StoreChange};
use crate::repo::area_repo::{LifeAreaRepository, SqliteLifeAreaRepository};
use crate::repo::goal_repo::{SqliteWeeklyGoalRepository, WeeklyGoalRepository};
use crate::repo::task_repo::{AreaCount, SqliteTaskRepository, TaskRepository};
use crate::repo::RepoResult;
use crate::stats::aggregate::{aggregate_week, AggregatedWeek};
use crate::stats::summary::{area_week_stats, week_totals, AreaWeekStats};
use chrono::{Local, TimeZone};
use log::{error, info};
use rusqlite::Connection;
use std::sync::Arc;

/// Read side the dashboard pulls its inputs from.
pub trait DashboardSource {
    fn life_areas(&self) -> RepoResult<Vec<LifeArea>>;
    fn goals_for_week(&self, week_start: i64) -> RepoResult<Vec<WeeklyGoal>>;
    /// Per-area task counts created inside `window`.
    fn task_counts(&self, window: WeekWindow) -> RepoResult<Vec<AreaCount>>;
    /// Per-area completed task counts created inside `window`.
    fn completed_counts(&self, window: WeekWindow) -> RepoResult<Vec<AreaCount>>;

    /// Runs `read` against one consistent view of the store.
    ///
    /// Sources without transactional reads call `read` directly.
    fn snapshot<T, F>(&self, read: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        read(self)
    }
}

/// [`DashboardSource`] backed by the SQLite repositories.
pub struct SqliteDashboardSource<'conn> {
    conn: &'conn Connection,
    tasks: SqliteTaskRepository<'conn>,
    areas: SqliteLifeAreaRepository<'conn>,
    goals: SqliteWeeklyGoalRepository<'conn>,
}

impl<'conn> SqliteDashboardSource<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            conn,
            tasks: SqliteTaskRepository::try_new(conn)?,
            areas: SqliteLifeAreaRepository::try_new(conn)?,
            goals: SqliteWeeklyGoalRepository::try_new(conn)?,
        })
    }
}

impl DashboardSource for SqliteDashboardSource<'_> {
    fn life_areas(&self) -> RepoResult<Vec<LifeArea>> {
        self.areas.list_all()
    }

    fn goals_for_week(&self, week_start: i64) -> RepoResult<Vec<WeeklyGoal>> {
        self.goals.list_for_week(week_start)
    }

    fn task_counts(&self, window: WeekWindow) -> RepoResult<Vec<AreaCount>> {
        self.tasks.count_by_area(window.start_ms, window.end_ms)
    }

    fn completed_counts(&self, window: WeekWindow) -> RepoResult<Vec<AreaCount>> {
        self.tasks
            .count_completed_by_area(window.start_ms, window.end_ms)
    }

    /// Holds one read transaction so writes from other connections land
    /// either before or after the whole read.
    fn snapshot<T, F>(&self, read: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let value = read(self)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Everything one week's chart is computed from, read together.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekInputs {
    pub week_start: i64,
    pub areas: Vec<LifeArea>,
    pub goals: Vec<WeeklyGoal>,
    pub totals: Vec<AreaCount>,
    pub completed: Vec<AreaCount>,
}

/// Outcome of a week navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekNavigation {
    Moved { week_start: i64 },
    /// Target lies after the current week; nothing changed.
    Blocked,
}

/// Handle returned by [`WeeklyDashboard::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type WeekObserver = Box<dyn FnMut(&AggregatedWeek)>;

pub struct WeeklyDashboard<S, Tz = Local>
where
    S: DashboardSource,
    Tz: TimeZone,
{
    source: S,
    calendar: WeekCalendar<Tz>,
    clock: Arc<dyn Clock>,
    selected_week: i64,
    inputs: Option<WeekInputs>,
    latest: Option<AggregatedWeek>,
    observers: Vec<(SubscriptionId, WeekObserver)>,
    next_subscription: u64,
    dirty: bool,
}

impl<S: DashboardSource> WeeklyDashboard<S, Local> {
    /// Dashboard on the local calendar, starting at the current week.
    pub fn local(source: S) -> Self {
        Self::new(source, WeekCalendar::local(), Arc::new(SystemClock))
    }
}

impl<S, Tz> WeeklyDashboard<S, Tz>
where
    S: DashboardSource,
    Tz: TimeZone,
{
    /// Creates a dashboard positioned on the current week.
    ///
    /// Nothing is read until [`Self::refresh`] or a navigation call.
    pub fn new(source: S, calendar: WeekCalendar<Tz>, clock: Arc<dyn Clock>) -> Self {
        let selected_week = calendar.week_start(clock.now_ms());
        Self {
            source,
            calendar,
            clock,
            selected_week,
            inputs: None,
            latest: None,
            observers: Vec::new(),
            next_subscription: 0,
            dirty: true,
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&AggregatedWeek) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    pub fn selected_week(&self) -> i64 {
        self.selected_week
    }

    /// Chart of the last successful refresh, if any areas existed.
    pub fn latest(&self) -> Option<&AggregatedWeek> {
        self.latest.as_ref()
    }

    pub fn inputs(&self) -> Option<&WeekInputs> {
        self.inputs.as_ref()
    }

    /// Re-reads the selected week and emits the recomputed chart.
    pub fn refresh(&mut self) -> RepoResult<()> {
        let inputs = self.load(self.selected_week)?;
        self.apply(inputs);
        Ok(())
    }

    /// Marks the view stale when `change` can affect the selected week.
    pub fn notify(&mut self, change: StoreChange) {
        match change {
            StoreChange::Tasks | StoreChange::LifeAreas => self.dirty = true,
            StoreChange::WeeklyGoals { week_start } => {
                if week_start == self.selected_week {
                    self.dirty = true;
                }
            }
        }
    }

    /// Refreshes once if any relevant change arrived. Returns whether it did.
    pub fn flush(&mut self) -> RepoResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }

    /// Applies every queued change from `feed`, refreshing at most once.
    pub fn pump(&mut self, feed: &ChangeFeed) -> RepoResult<bool> {
        for change in feed.drain() {
            self.notify(change);
        }
        self.flush()
    }

    /// Moves to the week containing `timestamp_ms`.
    pub fn select_week(&mut self, timestamp_ms: i64) -> RepoResult<WeekNavigation> {
        let target = self.calendar.week_start(timestamp_ms);
        if !self.calendar.is_navigable(target, self.clock.now_ms()) {
            info!(
                "event=week_select module=dashboard status=blocked week_start={target}"
            );
            return Ok(WeekNavigation::Blocked);
        }

        let inputs = self.load(target)?;
        self.selected_week = target;
        self.apply(inputs);
        Ok(WeekNavigation::Moved { week_start: target })
    }

    pub fn previous_week(&mut self) -> RepoResult<WeekNavigation> {
        let target = self.calendar.previous_week_start(self.selected_week);
        self.select_week(target)
    }

    pub fn next_week(&mut self) -> RepoResult<WeekNavigation> {
        let target = self.calendar.next_week_start(self.selected_week);
        self.select_week(target)
    }

    /// Display text such as `1/29 ~ 2/4` for the selected week.
    pub fn week_range_text(&self) -> String {
        self.calendar.format_range(self.selected_week)
    }

    pub fn is_current_week(&self) -> bool {
        self.calendar
            .is_current_week(self.selected_week, self.clock.now_ms())
    }

    /// Per-area total/completed counts for encouragement requests.
    pub fn area_stats(&self) -> Vec<AreaWeekStats> {
        self.inputs.as_ref().map_or_else(Vec::new, |inputs| {
            area_week_stats(&inputs.areas, &inputs.goals, &inputs.totals, &inputs.completed)
        })
    }

    /// Rule-based message for the current snapshot.
    pub fn default_encouragement(&self) -> String {
        let (total, completed) = week_totals(&self.area_stats());
        weekly_fallback(total, completed).to_string()
    }

    fn load(&self, week_start: i64) -> RepoResult<WeekInputs> {
        let loaded = self.read_inputs(week_start);
        if let Err(err) = &loaded {
            error!(
                "event=dashboard_load module=dashboard status=error week_start={week_start} error={err}"
            );
        }
        loaded
    }

    fn read_inputs(&self, week_start: i64) -> RepoResult<WeekInputs> {
        let window = self.calendar.window(week_start);
        self.source.snapshot(|source| {
            Ok(WeekInputs {
                week_start,
                areas: source.life_areas()?,
                goals: source.goals_for_week(week_start)?,
                totals: source.task_counts(window)?,
                completed: source.completed_counts(window)?,
            })
        })
    }

    fn apply(&mut self, inputs: WeekInputs) {
        self.dirty = false;
        self.latest = aggregate_week(
            inputs.week_start,
            &inputs.areas,
            &inputs.goals,
            &inputs.totals,
        );
        info!(
            "event=dashboard_refresh module=dashboard status=ok week_start={} areas={} observers={}",
            inputs.week_start,
            inputs.areas.len(),
            self.observers.len()
        );
        self.inputs = Some(inputs);

        if let Some(week) = &self.latest {
            for (_, observer) in &mut self.observers {
                observer(week);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DashboardSource, WeekInputs, WeekNavigation, WeeklyDashboard};
    use crate::calendar::{WeekCalendar, WeekWindow};
    use crate::clock::FixedClock;
    use crate::model::life_area::LifeArea;
    use crate::model::weekly_goal::WeeklyGoal;
    use crate::notify::{ChangeHub, StoreChange};
    use crate::repo::task_repo::AreaCount;
    use crate::repo::{RepoError, RepoResult};
    use crate::stats::aggregate::AggregatedWeek;
    use chrono::{FixedOffset, TimeZone};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeSource {
        areas: RefCell<Vec<LifeArea>>,
        goals: RefCell<Vec<WeeklyGoal>>,
        totals: RefCell<Vec<AreaCount>>,
        fail: Cell<bool>,
        reads: Cell<u32>,
    }

    impl DashboardSource for Rc<FakeSource> {
        fn life_areas(&self) -> RepoResult<Vec<LifeArea>> {
            self.reads.set(self.reads.get() + 1);
            if self.fail.get() {
                return Err(RepoError::InvalidData("store offline".to_string()));
            }
            Ok(self.areas.borrow().clone())
        }

        fn goals_for_week(&self, week_start: i64) -> RepoResult<Vec<WeeklyGoal>> {
            Ok(self
                .goals
                .borrow()
                .iter()
                .filter(|goal| goal.week_start == week_start)
                .cloned()
                .collect())
        }

        fn task_counts(&self, _window: WeekWindow) -> RepoResult<Vec<AreaCount>> {
            Ok(self.totals.borrow().clone())
        }

        fn completed_counts(&self, _window: WeekWindow) -> RepoResult<Vec<AreaCount>> {
            Ok(Vec::new())
        }
    }

    fn tz() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).expect("valid offset")
    }

    fn ms(y: i32, m: u32, d: u32, h: u32) -> i64 {
        tz().with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .expect("valid instant")
            .timestamp_millis()
    }

    fn career() -> LifeArea {
        LifeArea {
            id: 1,
            name: "Career".to_string(),
            icon: "work".to_string(),
            color: 0,
            is_default: true,
            order_index: 0,
        }
    }

    fn dashboard(
        source: &Rc<FakeSource>,
        now: i64,
    ) -> WeeklyDashboard<Rc<FakeSource>, FixedOffset> {
        WeeklyDashboard::new(
            Rc::clone(source),
            WeekCalendar::new(tz()),
            Arc::new(FixedClock(now)),
        )
    }

    fn recorder(
        board: &mut WeeklyDashboard<Rc<FakeSource>, FixedOffset>,
    ) -> Rc<RefCell<Vec<AggregatedWeek>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        board.subscribe(move |week| sink.borrow_mut().push(week.clone()));
        seen
    }

    #[test]
    fn empty_areas_clear_latest_and_emit_nothing() {
        let source = Rc::new(FakeSource::default());
        let mut board = dashboard(&source, ms(2024, 1, 31, 12));
        let seen = recorder(&mut board);

        board.refresh().expect("refresh");
        assert!(board.latest().is_none());
        assert!(seen.borrow().is_empty());
        assert_eq!(
            board.inputs().map(|inputs: &WeekInputs| inputs.areas.len()),
            Some(0)
        );
    }

    #[test]
    fn next_week_is_blocked_on_current_week() {
        let source = Rc::new(FakeSource::default());
        source.areas.borrow_mut().push(career());
        let now = ms(2024, 1, 31, 12);
        let mut board = dashboard(&source, now);

        assert_eq!(board.next_week().expect("nav"), WeekNavigation::Blocked);
        assert_eq!(board.selected_week(), ms(2024, 1, 29, 0));
        assert!(board.is_current_week());

        let moved = board.previous_week().expect("nav");
        assert_eq!(
            moved,
            WeekNavigation::Moved {
                week_start: ms(2024, 1, 22, 0)
            }
        );
        assert!(!board.is_current_week());
        assert_eq!(board.week_range_text(), "1/22 ~ 1/28");
        assert_eq!(
            board.next_week().expect("nav"),
            WeekNavigation::Moved {
                week_start: ms(2024, 1, 29, 0)
            }
        );
    }

    #[test]
    fn goal_changes_for_other_weeks_do_not_mark_dirty() {
        let source = Rc::new(FakeSource::default());
        source.areas.borrow_mut().push(career());
        let mut board = dashboard(&source, ms(2024, 1, 31, 12));
        board.refresh().expect("refresh");

        board.notify(StoreChange::WeeklyGoals {
            week_start: ms(2024, 1, 22, 0),
        });
        assert!(!board.flush().expect("flush"));

        board.notify(StoreChange::WeeklyGoals {
            week_start: board.selected_week(),
        });
        assert!(board.flush().expect("flush"));
    }

    #[test]
    fn pump_coalesces_bursts_into_one_refresh() {
        let source = Rc::new(FakeSource::default());
        source.areas.borrow_mut().push(career());
        let mut board = dashboard(&source, ms(2024, 1, 31, 12));
        board.refresh().expect("refresh");
        let seen = recorder(&mut board);
        let reads_before = source.reads.get();

        let (hub, feed) = ChangeHub::channel();
        for _ in 0..5 {
            hub.publish(StoreChange::Tasks);
        }
        hub.publish(StoreChange::LifeAreas);

        assert!(board.pump(&feed).expect("pump"));
        assert_eq!(source.reads.get(), reads_before + 1);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!board.pump(&feed).expect("pump"));
    }

    #[test]
    fn failed_read_keeps_previous_snapshot_and_week() {
        let source = Rc::new(FakeSource::default());
        source.areas.borrow_mut().push(career());
        source.totals.borrow_mut().push(AreaCount {
            life_area_id: 1,
            count: 2,
        });
        let mut board = dashboard(&source, ms(2024, 1, 31, 12));
        board.refresh().expect("refresh");
        let before = board.latest().cloned();
        let week = board.selected_week();

        source.fail.set(true);
        assert!(board.previous_week().is_err());
        assert_eq!(board.selected_week(), week);
        assert_eq!(board.latest().cloned(), before);

        board.notify(StoreChange::Tasks);
        assert!(board.flush().is_err());
        source.fail.set(false);
        assert!(board.flush().expect("dirty survives failure"));
    }

    #[test]
    fn unsubscribed_observer_stops_receiving() {
        let source = Rc::new(FakeSource::default());
        source.areas.borrow_mut().push(career());
        let mut board = dashboard(&source, ms(2024, 1, 31, 12));
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let id = board.subscribe(move |_| counter.set(counter.get() + 1));

        board.refresh().expect("refresh");
        assert!(board.unsubscribe(id));
        board.refresh().expect("refresh");
        assert_eq!(seen.get(), 1);
        assert!(!board.unsubscribe(id));
    }

    #[test]
    fn default_encouragement_uses_snapshot_counts() {
        let source = Rc::new(FakeSource::default());
        source.areas.borrow_mut().push(career());
        let mut board = dashboard(&source, ms(2024, 1, 31, 12));
        board.refresh().expect("refresh");
        assert_eq!(
            board.default_encouragement(),
            crate::ai::fallback::weekly_fallback(0, 0)
        );
    }
}
