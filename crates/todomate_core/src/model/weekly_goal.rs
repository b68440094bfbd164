//! Weekly goal domain model.
//!
//! # Invariants
//! - At most one goal exists per `(life_area_id, week_start)`.
//! - `week_start` is a canonical Monday-midnight timestamp.
//! - `target_percentage` lies in `0..=100`.

use crate::model::life_area::LifeAreaId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type WeeklyGoalId = i64;

/// Upper bound for `target_percentage`.
pub const MAX_TARGET_PERCENTAGE: u8 = 100;

/// Persisted per-week, per-area attention target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub id: WeeklyGoalId,
    pub life_area_id: LifeAreaId,
    pub week_start: i64,
    pub target_percentage: u8,
    pub created_at: i64,
}

/// Upsert shape keyed by `(life_area_id, week_start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalTarget {
    pub life_area_id: LifeAreaId,
    pub week_start: i64,
    pub target_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    PercentageOutOfRange(u8),
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PercentageOutOfRange(value) => write!(
                f,
                "target percentage must be within 0..={MAX_TARGET_PERCENTAGE}, got {value}"
            ),
        }
    }
}

impl Error for GoalValidationError {}

impl GoalTarget {
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.target_percentage > MAX_TARGET_PERCENTAGE {
            return Err(GoalValidationError::PercentageOutOfRange(
                self.target_percentage,
            ));
        }
        Ok(())
    }
}
