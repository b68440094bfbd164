//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task, life area, weekly goal, and dashboard use-cases to Dart.
//! - Let Dart act as the text generator: it fetches prompts here, calls its
//!   model, and hands the raw reply back for parsing and fallback handling.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each call opens its own connection; the database path is resolved once
//!   per process from `AppConfig`.

use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use todomate_core::ai::encouragement::{EncouragementService, TagSuggestionResult};
use todomate_core::ai::fallback::{list_fallback, weekly_fallback};
use todomate_core::ai::generator::HostReply;
use todomate_core::ai::orchestrator::{
    list_outcome, no_areas_state, weekly_outcome, NO_AREAS_REASON,
};
use todomate_core::ai::prompt::{list_prompt, tag_prompt, weekly_prompt};
use todomate_core::ai::state::AiMessageState;
use todomate_core::repo::area_repo::SqliteLifeAreaRepository;
use todomate_core::repo::goal_repo::SqliteWeeklyGoalRepository;
use todomate_core::repo::task_repo::{SqliteTaskRepository, TaskSort};
use todomate_core::stats::summary::{week_totals, AreaWeekStats};
use todomate_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, AppConfig, AreaService, CreateTaskRequest, LifeArea, Priority,
    SqliteDashboardSource, Task, TaskService, WeekNavigation, WeeklyDashboard,
};
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task row as shown by the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    /// `0` low, `1` medium, `2` high.
    pub priority: u8,
    pub category: String,
    pub life_area_id: Option<i64>,
    pub created_at: i64,
}

/// Envelope for single-task writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub task: Option<TaskItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub completed: u32,
    pub urgent_pending: u32,
    /// Rule-based encouragement for this list.
    pub encouragement: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaItem {
    pub area_id: i64,
    pub name: String,
    pub icon: String,
    pub color: u32,
    pub is_default: bool,
    pub order_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaResponse {
    pub ok: bool,
    pub items: Vec<AreaItem>,
    pub message: String,
}

/// One area's goal for [`goals_save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalInput {
    pub area_id: i64,
    pub target_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalSaveResponse {
    pub ok: bool,
    pub week_start: Option<i64>,
    pub message: String,
}

/// Radar chart plus header data for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardResponse {
    pub ok: bool,
    pub week_start: i64,
    pub range_text: String,
    pub is_current_week: bool,
    pub labels: Vec<String>,
    pub goal_values: Vec<f64>,
    pub actual_values: Vec<f64>,
    pub encouragement: String,
    pub message: String,
}

/// Prompt Dart should send to its text model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiPromptResponse {
    pub ok: bool,
    pub prompt: String,
    /// Rule-based text to show while waiting or when the model fails.
    pub fallback: String,
    pub message: String,
}

/// Encouragement ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiMessageResponse {
    /// `success` or `error`.
    pub status: String,
    /// Message on success, fallback text on error.
    pub text: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagSuggestionResponse {
    /// `success`, `none`, or `error`.
    pub status: String,
    pub area_id: Option<i64>,
    pub area_name: String,
    pub confidence: f32,
    pub reason: String,
}

impl AiPromptResponse {
    fn failure(message: impl Into<String>, fallback: &str) -> Self {
        Self {
            ok: false,
            prompt: String::new(),
            fallback: fallback.to_string(),
            message: message.into(),
        }
    }
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<Task>) -> Self {
        Self {
            ok: true,
            task: task.map(to_task_item),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

impl AreaResponse {
    fn from_result(result: Result<Vec<LifeArea>, String>, ok_message: &str) -> Self {
        match result {
            Ok(areas) => Self {
                ok: true,
                items: areas.into_iter().map(to_area_item).collect(),
                message: ok_message.to_string(),
            },
            Err(message) => Self {
                ok: false,
                items: Vec::new(),
                message,
            },
        }
    }
}

/// Creates one task.
///
/// # FFI contract
/// - `priority` outside `0..=2` falls back to medium.
/// - Blank `category` uses the default category.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    description: String,
    priority: u8,
    category: String,
    life_area_id: Option<i64>,
) -> TaskActionResponse {
    let request = CreateTaskRequest {
        title,
        description,
        priority: Priority::from_code(i64::from(priority)).unwrap_or_default(),
        category,
        life_area_id,
        created_at: None,
    };
    match with_task_service(|service| service.create_task(&request).map_err(|e| e.to_string())) {
        Ok(task) => TaskActionResponse::success("Task created.", Some(task)),
        Err(err) => TaskActionResponse::failure(format!("task_create failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_complete(task_id: String) -> TaskActionResponse {
    let result = parse_task_id(&task_id).and_then(|id| {
        with_task_service(|service| service.toggle_complete(id).map_err(|e| e.to_string()))
    });
    match result {
        Ok(task) => TaskActionResponse::success("Task updated.", Some(task)),
        Err(err) => TaskActionResponse::failure(format!("task_toggle_complete failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    let result = parse_task_id(&task_id).and_then(|id| {
        with_task_service(|service| service.delete_task(id).map_err(|e| e.to_string()))
    });
    match result {
        Ok(()) => TaskActionResponse::success("Task deleted.", None),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Lists tasks; a non-blank `query` searches title and description.
///
/// `sort` is `date_desc` (default), `date_asc`, or `priority`.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list(query: String, sort: String) -> TaskListResponse {
    let sort = parse_sort(&sort);
    match with_task_service(|service| service.list_tasks(&query, sort).map_err(|e| e.to_string()))
    {
        Ok(tasks) => {
            let stats = todomate_core::stats::summary::ListStats::from_tasks(&tasks);
            TaskListResponse {
                ok: true,
                message: format!("{} task(s).", tasks.len()),
                items: tasks.into_iter().map(to_task_item).collect(),
                completed: stats.completed,
                urgent_pending: stats.urgent_pending,
                encouragement: list_fallback(stats.total, stats.completed).to_string(),
            }
        }
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            completed: 0,
            urgent_pending: 0,
            encouragement: list_fallback(0, 0).to_string(),
            message: format!("tasks_list failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn areas_list() -> AreaResponse {
    let result = with_connection(|conn| {
        let service = area_service(conn)?;
        service.list_areas().map_err(|e| e.to_string())
    });
    AreaResponse::from_result(result, "Areas loaded.")
}

/// Appends a custom area and returns the updated list.
#[flutter_rust_bridge::frb(sync)]
pub fn area_add(name: String) -> AreaResponse {
    let result = with_connection(|conn| {
        let service = area_service(conn)?;
        service.add_custom_area(name).map_err(|e| e.to_string())?;
        service.list_areas().map_err(|e| e.to_string())
    });
    AreaResponse::from_result(result, "Area added.")
}

/// Deletes an area. Its tasks become unassigned and its goals are removed.
#[flutter_rust_bridge::frb(sync)]
pub fn area_delete(area_id: i64) -> AreaResponse {
    let result = with_connection(|conn| {
        let service = area_service(conn)?;
        service.delete_area(area_id).map_err(|e| e.to_string())?;
        service.list_areas().map_err(|e| e.to_string())
    });
    AreaResponse::from_result(result, "Area deleted.")
}

/// Restores the built-in areas, dropping custom ones.
#[flutter_rust_bridge::frb(sync)]
pub fn areas_reset() -> AreaResponse {
    let result = with_connection(|conn| {
        let service = area_service(conn)?;
        service.reset_areas().map_err(|e| e.to_string())
    });
    AreaResponse::from_result(result, "Areas reset.")
}

/// Saves goals for the week containing `week_timestamp_ms`.
///
/// # FFI contract
/// - Weeks after the current one are refused with `ok=false`.
/// - `week_start` is the canonical week start even when `goals` is empty.
#[flutter_rust_bridge::frb(sync)]
pub fn goals_save(week_timestamp_ms: i64, goals: Vec<GoalInput>) -> GoalSaveResponse {
    let percentages = goals
        .iter()
        .map(|goal| (goal.area_id, goal.target_percentage))
        .collect::<Vec<_>>();
    let result = with_connection(|conn| {
        let service = area_service(conn)?;
        service
            .save_weekly_goals(week_timestamp_ms, &percentages)
            .map_err(|e| e.to_string())?;
        Ok(service.week_start_for(week_timestamp_ms))
    });
    match result {
        Ok(week_start) => GoalSaveResponse {
            ok: true,
            week_start: Some(week_start),
            message: format!("Saved {} goal(s).", percentages.len()),
        },
        Err(err) => GoalSaveResponse {
            ok: false,
            week_start: None,
            message: format!("goals_save failed: {err}"),
        },
    }
}

/// Computes the chart for the week containing `timestamp_ms`, or the current
/// week when `None`. Future weeks are refused.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_week(timestamp_ms: Option<i64>) -> DashboardResponse {
    let result = with_connection(|conn| {
        let dashboard = load_dashboard(conn, timestamp_ms)?;
        let chart = dashboard.latest().cloned();
        Ok(DashboardResponse {
            ok: true,
            week_start: dashboard.selected_week(),
            range_text: dashboard.week_range_text(),
            is_current_week: dashboard.is_current_week(),
            labels: chart.as_ref().map_or_else(Vec::new, |c| c.labels.clone()),
            goal_values: chart.as_ref().map_or_else(Vec::new, |c| c.goal_values.clone()),
            actual_values: chart.map_or_else(Vec::new, |c| c.actual_values),
            encouragement: dashboard.default_encouragement(),
            message: "Dashboard loaded.".to_string(),
        })
    });

    result.unwrap_or_else(|err| DashboardResponse {
        ok: false,
        week_start: 0,
        range_text: String::new(),
        is_current_week: false,
        labels: Vec::new(),
        goal_values: Vec::new(),
        actual_values: Vec::new(),
        encouragement: weekly_fallback(0, 0).to_string(),
        message: format!("dashboard_week failed: {err}"),
    })
}

/// Rule-based encouragement text for the weekly or list screen.
#[flutter_rust_bridge::frb(sync)]
pub fn encouragement_fallback(total: u32, completed: u32, weekly: bool) -> String {
    if weekly {
        weekly_fallback(total, completed).to_string()
    } else {
        list_fallback(total, completed).to_string()
    }
}

/// Prompt for the weekly coach message of the week containing
/// `timestamp_ms` (current week when `None`).
#[flutter_rust_bridge::frb(sync)]
pub fn ai_weekly_prompt(timestamp_ms: Option<i64>) -> AiPromptResponse {
    match with_connection(|conn| week_stats(conn, timestamp_ms)) {
        Ok(stats) if stats.is_empty() => {
            AiPromptResponse::failure(NO_AREAS_REASON, weekly_fallback(0, 0))
        }
        Ok(stats) => {
            let (total, completed) = week_totals(&stats);
            AiPromptResponse {
                ok: true,
                prompt: weekly_prompt(&stats),
                fallback: weekly_fallback(total, completed).to_string(),
                message: "Prompt ready.".to_string(),
            }
        }
        Err(err) => AiPromptResponse::failure(
            format!("ai_weekly_prompt failed: {err}"),
            weekly_fallback(0, 0),
        ),
    }
}

/// Turns the model reply for [`ai_weekly_prompt`] into a display state.
///
/// # FFI contract
/// - Pass the raw reply text, or a non-blank `error` when the model call
///   failed; errors yield `status=error` with fallback text.
#[flutter_rust_bridge::frb(sync)]
pub fn ai_weekly_resolve(
    timestamp_ms: Option<i64>,
    reply: String,
    error: String,
) -> AiMessageResponse {
    let state = match with_connection(|conn| week_stats(conn, timestamp_ms)) {
        Ok(stats) if stats.is_empty() => no_areas_state(),
        Ok(stats) => {
            let service = EncouragementService::new(HostReply::new(reply, &error));
            weekly_outcome(service.weekly_encouragement(&stats), &stats)
        }
        Err(err) => AiMessageState::Error {
            reason: err,
            fallback: weekly_fallback(0, 0).to_string(),
        },
    };
    to_ai_message(state)
}

/// Prompt for the list screen message over tasks matching `query`.
#[flutter_rust_bridge::frb(sync)]
pub fn ai_list_prompt(query: String) -> AiPromptResponse {
    let result = with_task_service(|service| {
        service
            .list_stats(&query, TaskSort::DateDesc)
            .map_err(|e| e.to_string())
    });
    match result {
        Ok(stats) => AiPromptResponse {
            ok: true,
            prompt: list_prompt(&stats),
            fallback: list_fallback(stats.total, stats.completed).to_string(),
            message: "Prompt ready.".to_string(),
        },
        Err(err) => {
            AiPromptResponse::failure(format!("ai_list_prompt failed: {err}"), list_fallback(0, 0))
        }
    }
}

/// Turns the model reply for [`ai_list_prompt`] into a display state.
/// Model failures show the fallback as a regular message.
#[flutter_rust_bridge::frb(sync)]
pub fn ai_list_resolve(query: String, reply: String, error: String) -> AiMessageResponse {
    let result = with_task_service(|service| {
        service
            .list_stats(&query, TaskSort::DateDesc)
            .map_err(|e| e.to_string())
    });
    let state = match result {
        Ok(stats) => {
            let service = EncouragementService::new(HostReply::new(reply, &error));
            list_outcome(service.list_encouragement(&stats), &stats)
        }
        Err(err) => {
            warn!("event=ai_list_resolve module=ffi status=error error={err}");
            AiMessageState::Success(list_fallback(0, 0).to_string())
        }
    };
    to_ai_message(state)
}

/// Prompt asking which existing life area a task belongs to.
#[flutter_rust_bridge::frb(sync)]
pub fn ai_tag_prompt(title: String, description: String) -> AiPromptResponse {
    match with_connection(area_names) {
        Ok(names) if names.is_empty() => AiPromptResponse::failure(NO_AREAS_REASON, ""),
        Ok(names) => AiPromptResponse {
            ok: true,
            prompt: tag_prompt(&title, &description, &names),
            fallback: String::new(),
            message: "Prompt ready.".to_string(),
        },
        Err(err) => AiPromptResponse::failure(format!("ai_tag_prompt failed: {err}"), ""),
    }
}

/// Maps the model reply for [`ai_tag_prompt`] onto a stored area.
#[flutter_rust_bridge::frb(sync)]
pub fn ai_tag_resolve(
    title: String,
    description: String,
    reply: String,
    error: String,
) -> TagSuggestionResponse {
    let areas = match with_connection(|conn| {
        let service = area_service(conn)?;
        service.list_areas().map_err(|e| e.to_string())
    }) {
        Ok(areas) => areas,
        Err(err) => return tag_response("error", None, String::new(), 0.0, err),
    };
    let names = areas
        .iter()
        .map(|area| area.name.clone())
        .collect::<Vec<_>>();
    let service = EncouragementService::new(HostReply::new(reply, &error));

    match service.suggest_life_area(&title, &description, &names) {
        TagSuggestionResult::Success {
            area_name,
            confidence,
            reason,
        } => {
            let area_id = areas
                .iter()
                .find(|area| area.name == area_name)
                .map(|area| area.id);
            tag_response("success", area_id, area_name, confidence, reason)
        }
        TagSuggestionResult::NoSuggestion => {
            tag_response("none", None, String::new(), 0.0, String::new())
        }
        TagSuggestionResult::Error(reason) => {
            tag_response("error", None, String::new(), 0.0, reason)
        }
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| AppConfig::from_env().db_path)
        .clone()
}

fn with_connection<T>(f: impl FnOnce(&Connection) -> Result<T, String>) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!("event=ffi_db_open module=ffi status=error error={err}");
        format!("DB open failed: {err}")
    })?;
    f(&conn)
}

fn with_task_service<T>(
    f: impl FnOnce(&TaskService<SqliteTaskRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_connection(|conn| {
        let repo = SqliteTaskRepository::try_new(conn)
            .map_err(|err| format!("task repo init failed: {err}"))?;
        f(&TaskService::new(repo))
    })
}

fn area_service(
    conn: &Connection,
) -> Result<AreaService<SqliteLifeAreaRepository<'_>, SqliteWeeklyGoalRepository<'_>>, String> {
    let areas = SqliteLifeAreaRepository::try_new(conn)
        .map_err(|err| format!("area repo init failed: {err}"))?;
    let goals = SqliteWeeklyGoalRepository::try_new(conn)
        .map_err(|err| format!("goal repo init failed: {err}"))?;
    Ok(AreaService::new(areas, goals))
}

fn load_dashboard(
    conn: &Connection,
    timestamp_ms: Option<i64>,
) -> Result<WeeklyDashboard<SqliteDashboardSource<'_>>, String> {
    let source = SqliteDashboardSource::try_new(conn).map_err(|e| e.to_string())?;
    let mut dashboard = WeeklyDashboard::local(source);
    match timestamp_ms {
        Some(ts) => {
            if dashboard.select_week(ts).map_err(|e| e.to_string())? == WeekNavigation::Blocked {
                return Err("future weeks cannot be viewed".to_string());
            }
        }
        None => dashboard.refresh().map_err(|e| e.to_string())?,
    }
    Ok(dashboard)
}

fn week_stats(conn: &Connection, timestamp_ms: Option<i64>) -> Result<Vec<AreaWeekStats>, String> {
    Ok(load_dashboard(conn, timestamp_ms)?.area_stats())
}

fn area_names(conn: &Connection) -> Result<Vec<String>, String> {
    let service = area_service(conn)?;
    let areas = service.list_areas().map_err(|e| e.to_string())?;
    Ok(areas.into_iter().map(|area| area.name).collect())
}

fn to_ai_message(state: AiMessageState) -> AiMessageResponse {
    let (status, text, reason) = match state {
        AiMessageState::Success(text) => ("success", text, String::new()),
        AiMessageState::Error { reason, fallback } => ("error", fallback, reason),
        AiMessageState::Idle => ("idle", String::new(), String::new()),
        AiMessageState::Loading => ("loading", String::new(), String::new()),
    };
    AiMessageResponse {
        status: status.to_string(),
        text,
        reason,
    }
}

fn tag_response(
    status: &str,
    area_id: Option<i64>,
    area_name: String,
    confidence: f32,
    reason: String,
) -> TagSuggestionResponse {
    TagSuggestionResponse {
        status: status.to_string(),
        area_id,
        area_name,
        confidence,
        reason,
    }
}

fn parse_task_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| format!("invalid task id `{raw}`: {err}"))
}

fn parse_sort(raw: &str) -> TaskSort {
    match raw.trim().to_ascii_lowercase().as_str() {
        "date_asc" => TaskSort::DateAsc,
        "priority" => TaskSort::Priority,
        _ => TaskSort::DateDesc,
    }
}

fn to_task_item(task: Task) -> TaskItem {
    TaskItem {
        task_id: task.id.to_string(),
        title: task.title,
        description: task.description,
        is_completed: task.is_completed,
        priority: task.priority.as_u8(),
        category: task.category,
        life_area_id: task.life_area_id,
        created_at: task.created_at,
    }
}

fn to_area_item(area: LifeArea) -> AreaItem {
    AreaItem {
        area_id: area.id,
        name: area.name,
        icon: area.icon,
        color: area.color,
        is_default: area.is_default,
        order_index: area.order_index,
    }
}
