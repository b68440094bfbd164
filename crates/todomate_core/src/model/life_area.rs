//! Life area domain model.
//!
//! # Responsibility
//! - Define the life-area record used to group tasks and set weekly goals.
//! - Provide the built-in default areas seeded on first initialization.
//!
//! # Invariants
//! - `order_index` defines display and aggregation ordering; ties break by id.
//! - Default areas carry fixed ids 1..=5 so resets restore the same identity.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// SQLite rowid of a life area.
pub type LifeAreaId = i64;

/// Persisted life area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeArea {
    pub id: LifeAreaId,
    pub name: String,
    pub icon: String,
    /// ARGB color, 0 means "use theme default".
    pub color: u32,
    /// Seeded built-in vs. user-added.
    pub is_default: bool,
    pub order_index: i64,
}

/// Insert shape for life areas.
///
/// `id = None` lets SQLite assign the rowid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeAreaDraft {
    pub id: Option<LifeAreaId>,
    pub name: String,
    pub icon: String,
    pub color: u32,
    pub is_default: bool,
    pub order_index: i64,
}

/// Field-level validation failures for life areas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifeAreaValidationError {
    BlankName,
}

impl Display for LifeAreaValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "life area name must not be blank"),
        }
    }
}

impl Error for LifeAreaValidationError {}

impl LifeAreaDraft {
    /// Creates a user-defined area draft at the given display position.
    pub fn custom(name: impl Into<String>, order_index: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            icon: String::new(),
            color: 0,
            is_default: false,
            order_index,
        }
    }

    pub fn validate(&self) -> Result<(), LifeAreaValidationError> {
        if self.name.trim().is_empty() {
            return Err(LifeAreaValidationError::BlankName);
        }
        Ok(())
    }
}

impl LifeArea {
    pub fn validate(&self) -> Result<(), LifeAreaValidationError> {
        if self.name.trim().is_empty() {
            return Err(LifeAreaValidationError::BlankName);
        }
        Ok(())
    }
}

impl From<&LifeArea> for LifeAreaDraft {
    fn from(area: &LifeArea) -> Self {
        Self {
            id: Some(area.id),
            name: area.name.clone(),
            icon: area.icon.clone(),
            color: area.color,
            is_default: area.is_default,
            order_index: area.order_index,
        }
    }
}

const DEFAULT_AREAS: &[(LifeAreaId, &str, &str)] = &[
    (1, "Career", "work"),
    (2, "Health", "health"),
    (3, "Learning", "study"),
    (4, "Relationships", "relationship"),
    (5, "Finance", "finance"),
];

/// Returns the built-in areas, matching the rows seeded by migration 2.
pub fn default_areas() -> Vec<LifeAreaDraft> {
    DEFAULT_AREAS
        .iter()
        .zip(0_i64..)
        .map(|(&(id, name, icon), order_index)| LifeAreaDraft {
            id: Some(id),
            name: name.to_string(),
            icon: icon.to_string(),
            color: 0,
            is_default: true,
            order_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{default_areas, LifeAreaDraft, LifeAreaValidationError};

    #[test]
    fn default_areas_are_ordered_and_flagged() {
        let areas = default_areas();
        assert_eq!(areas.len(), 5);
        assert!(areas.iter().all(|area| area.is_default));
        let orders = areas.iter().map(|area| area.order_index).collect::<Vec<_>>();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
        assert_eq!(areas[0].name, "Career");
        assert_eq!(areas[0].id, Some(1));
    }

    #[test]
    fn custom_draft_rejects_blank_name() {
        let draft = LifeAreaDraft::custom("  ", 9);
        assert_eq!(draft.validate(), Err(LifeAreaValidationError::BlankName));
        assert!(!draft.is_default);
    }
}
