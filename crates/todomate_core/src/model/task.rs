//! Task domain model.
//!
//! # Responsibility
//! - Define the task record owned by the task store.
//! - Provide completion toggling and validation helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is never blank after trim.
//! - `created_at` doubles as the week-bucketing timestamp.

use crate::model::life_area::LifeAreaId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Category assigned when the caller leaves it blank.
pub const DEFAULT_CATEGORY: &str = "Personal";

/// Ordered task priority. Derived ordering is `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Integer code persisted in `tasks.priority`.
    pub fn as_code(self) -> i64 {
        i64::from(self.as_u8())
    }

    /// Same code as [`Self::as_code`], narrowed for FFI payloads.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Parses a persisted integer code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    /// Stable lowercase label used by FFI and CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a label produced by [`Priority::as_str`], case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Empty string when the user gave no description.
    pub description: String,
    pub is_completed: bool,
    pub priority: Priority,
    /// Free-text label, independent of life areas.
    pub category: String,
    /// `None` for unassigned tasks, and after the owning area is deleted.
    pub life_area_id: Option<LifeAreaId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Field-level validation failures for tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
    NegativeCreatedAt(i64),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::NegativeCreatedAt(value) => {
                write!(f, "task created_at must be non-negative, got {value}")
            }
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates a new task with a generated id, created at `created_at`.
    ///
    /// Defaults: medium priority, default category, not completed, unassigned.
    pub fn new(title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            is_completed: false,
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
            life_area_id: None,
            created_at,
        }
    }

    /// Builder-style priority setter.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder-style life-area setter.
    pub fn in_area(mut self, life_area_id: LifeAreaId) -> Self {
        self.life_area_id = Some(life_area_id);
        self
    }

    /// Builder-style description setter.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Flips the completion flag.
    pub fn toggle_complete(&mut self) {
        self.is_completed = !self.is_completed;
    }

    /// Returns whether this task is incomplete and `High` priority.
    pub fn is_urgent_pending(&self) -> bool {
        !self.is_completed && self.priority == Priority::High
    }

    /// Validates fields before persistence.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.created_at < 0 {
            return Err(TaskValidationError::NegativeCreatedAt(self.created_at));
        }
        Ok(())
    }
}
