//! Core domain logic for TodoMate.
//! Tasks, life areas, weekly goals, and the weekly goal-vs-actual dashboard.

pub mod ai;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod stats;

pub use calendar::{WeekCalendar, WeekWindow};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::life_area::{LifeArea, LifeAreaId};
pub use model::task::{Priority, Task, TaskId};
pub use model::weekly_goal::{GoalTarget, WeeklyGoal};
pub use notify::{ChangeFeed, ChangeHub, StoreChange};
pub use repo::{RepoError, RepoResult};
pub use service::area_service::{AreaService, AreaServiceError};
pub use service::task_service::{CreateTaskRequest, TaskService};
pub use stats::aggregate::{aggregate_week, AggregatedWeek};
pub use stats::dashboard::{DashboardSource, SqliteDashboardSource, WeekNavigation, WeeklyDashboard};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
