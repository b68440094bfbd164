//! Task use-case service.
//!
//! # Responsibility
//! - Provide create/edit/toggle/delete/list entry points for task screens.
//! - Publish `StoreChange::Tasks` after every successful write.
//!
//! # Invariants
//! - Titles are trimmed; blank categories fall back to the default category.
//! - A blank search query lists all tasks in the requested sort order; a
//!   non-blank query searches and always orders newest first.

use crate::clock::{Clock, SystemClock};
use crate::model::life_area::LifeAreaId;
use crate::model::task::{Priority, Task, TaskId, DEFAULT_CATEGORY};
use crate::notify::{ChangeHub, StoreChange};
use crate::repo::task_repo::{TaskRepository, TaskSort};
use crate::repo::{RepoError, RepoResult};
use crate::stats::summary::ListStats;
use log::info;
use std::sync::Arc;

/// Request model for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Blank means [`DEFAULT_CATEGORY`].
    pub category: String,
    pub life_area_id: Option<LifeAreaId>,
    /// `None` stamps the service clock's current time.
    pub created_at: Option<i64>,
}

/// Editable task fields. Completion and creation time are not editable here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub life_area_id: Option<LifeAreaId>,
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
    changes: ChangeHub,
    clock: Arc<dyn Clock>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            changes: ChangeHub::disconnected(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Routes change notifications to `hub`.
    pub fn with_change_hub(mut self, hub: ChangeHub) -> Self {
        self.changes = hub;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates one task and returns the stored record.
    pub fn create_task(&self, request: &CreateTaskRequest) -> RepoResult<Task> {
        let created_at = request.created_at.unwrap_or_else(|| self.clock.now_ms());
        let mut task = Task::new(request.title.trim(), created_at)
            .with_priority(request.priority)
            .with_description(request.description.trim());
        task.category = normalize_category(&request.category);
        task.life_area_id = request.life_area_id;

        self.repo.insert(&task)?;
        info!(
            "event=task_create module=task status=ok priority={} has_area={}",
            task.priority.as_str(),
            task.life_area_id.is_some()
        );
        self.changes.publish(StoreChange::Tasks);
        Ok(task)
    }

    /// Replaces the editable fields of an existing task.
    pub fn edit_task(&self, id: TaskId, edit: &TaskEdit) -> RepoResult<Task> {
        let mut task = self.require_task(id)?;
        task.title = edit.title.trim().to_string();
        task.description = edit.description.trim().to_string();
        task.priority = edit.priority;
        task.category = normalize_category(&edit.category);
        task.life_area_id = edit.life_area_id;

        self.repo.update(&task)?;
        self.changes.publish(StoreChange::Tasks);
        Ok(task)
    }

    /// Flips completion and returns the updated record.
    pub fn toggle_complete(&self, id: TaskId) -> RepoResult<Task> {
        let mut task = self.require_task(id)?;
        task.toggle_complete();
        self.repo.update(&task)?;
        info!(
            "event=task_toggle module=task status=ok completed={}",
            task.is_completed
        );
        self.changes.publish(StoreChange::Tasks);
        Ok(task)
    }

    pub fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.repo.delete(id)?;
        info!("event=task_delete module=task status=ok");
        self.changes.publish(StoreChange::Tasks);
        Ok(())
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_by_id(id)
    }

    /// Lists tasks for the main screen.
    pub fn list_tasks(&self, query: &str, sort: TaskSort) -> RepoResult<Vec<Task>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.repo.list_all(sort)
        } else {
            self.repo.search(trimmed)
        }
    }

    /// Summarizes the same list `list_tasks` would return.
    pub fn list_stats(&self, query: &str, sort: TaskSort) -> RepoResult<ListStats> {
        Ok(ListStats::from_tasks(&self.list_tasks(query, sort)?))
    }

    fn require_task(&self, id: TaskId) -> RepoResult<Task> {
        self.repo.get_by_id(id)?.ok_or(RepoError::TaskNotFound(id))
    }
}

fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}
