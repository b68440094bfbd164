//! Goal-vs-actual aggregation for one week.
//!
//! # Responsibility
//! - Merge areas, weekly goals, and per-area task totals into three parallel
//!   chart series.
//!
//! # Invariants
//! - Output series have equal length, one entry per area, in
//!   `(order_index, id)` order.
//! - Actual values are each area's share of the week's assigned tasks, in
//!   `[0, 100]`; a week with no tasks yields all zeros.
//! - No areas means no output.

use crate::model::life_area::{LifeArea, LifeAreaId};
use crate::model::weekly_goal::WeeklyGoal;
use crate::repo::task_repo::AreaCount;
use serde::Serialize;

/// Radar-chart series for one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedWeek {
    pub week_start: i64,
    pub labels: Vec<String>,
    pub goal_values: Vec<f64>,
    pub actual_values: Vec<f64>,
}

impl AggregatedWeek {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Computes the goal-vs-actual series.
///
/// Returns `None` when `areas` is empty.
pub fn aggregate_week(
    week_start: i64,
    areas: &[LifeArea],
    goals: &[WeeklyGoal],
    totals: &[AreaCount],
) -> Option<AggregatedWeek> {
    if areas.is_empty() {
        return None;
    }

    let ordered = ordered_areas(areas);
    let week_total: u64 = totals.iter().map(|entry| u64::from(entry.count)).sum();

    let mut labels = Vec::with_capacity(ordered.len());
    let mut goal_values = Vec::with_capacity(ordered.len());
    let mut actual_values = Vec::with_capacity(ordered.len());
    for area in ordered {
        labels.push(area.name.clone());
        goal_values.push(f64::from(goal_percentage(goals, area.id)));
        actual_values.push(share_percentage(count_for(totals, area.id), week_total));
    }

    Some(AggregatedWeek {
        week_start,
        labels,
        goal_values,
        actual_values,
    })
}

/// Returns areas sorted by `(order_index, id)`.
pub fn ordered_areas(areas: &[LifeArea]) -> Vec<&LifeArea> {
    let mut ordered = areas.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|area| (area.order_index, area.id));
    ordered
}

/// First goal for `life_area_id`, or 0 when unset.
pub(crate) fn goal_percentage(goals: &[WeeklyGoal], life_area_id: LifeAreaId) -> u8 {
    goals
        .iter()
        .find(|goal| goal.life_area_id == life_area_id)
        .map_or(0, |goal| goal.target_percentage)
}

pub(crate) fn count_for(counts: &[AreaCount], life_area_id: LifeAreaId) -> u32 {
    counts
        .iter()
        .find(|entry| entry.life_area_id == life_area_id)
        .map_or(0, |entry| entry.count)
}

fn share_percentage(count: u32, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(count) / total as f64 * 100.0).clamp(0.0, 100.0)
}
