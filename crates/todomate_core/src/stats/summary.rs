//! Count summaries feeding encouragement prompts and fallback text.
//!
//! Per-area summaries carry total and completed counts separately; the chart
//! only uses each area's share of the total.

use crate::model::life_area::LifeArea;
use crate::model::task::Task;
use crate::model::weekly_goal::WeeklyGoal;
use crate::repo::task_repo::AreaCount;
use crate::stats::aggregate::{count_for, goal_percentage, ordered_areas};
use serde::Serialize;

/// One area's week at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaWeekStats {
    pub name: String,
    pub total: u32,
    pub completed: u32,
    pub goal_percentage: u8,
}

/// Counts for the plain task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListStats {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    /// Incomplete high-priority tasks.
    pub urgent_pending: u32,
}

/// Builds per-area stats in area display order.
pub fn area_week_stats(
    areas: &[LifeArea],
    goals: &[WeeklyGoal],
    totals: &[AreaCount],
    completed: &[AreaCount],
) -> Vec<AreaWeekStats> {
    ordered_areas(areas)
        .into_iter()
        .map(|area| AreaWeekStats {
            name: area.name.clone(),
            total: count_for(totals, area.id),
            completed: count_for(completed, area.id),
            goal_percentage: goal_percentage(goals, area.id),
        })
        .collect()
}

/// Sums `(total, completed)` across all areas.
pub fn week_totals(stats: &[AreaWeekStats]) -> (u32, u32) {
    stats.iter().fold((0, 0), |(total, completed), entry| {
        (
            total.saturating_add(entry.total),
            completed.saturating_add(entry.completed),
        )
    })
}

impl ListStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = Self::default();
        for task in tasks {
            stats.total += 1;
            if task.is_completed {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }
            if task.is_urgent_pending() {
                stats.urgent_pending += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::{area_week_stats, week_totals, ListStats};
    use crate::model::life_area::LifeArea;
    use crate::model::task::{Priority, Task};
    use crate::repo::task_repo::AreaCount;

    #[test]
    fn area_stats_keep_completed_separate_from_total() {
        let areas = vec![
            LifeArea {
                id: 2,
                name: "Health".to_string(),
                icon: String::new(),
                color: 0,
                is_default: true,
                order_index: 1,
            },
            LifeArea {
                id: 1,
                name: "Career".to_string(),
                icon: String::new(),
                color: 0,
                is_default: true,
                order_index: 0,
            },
        ];
        let totals = [
            AreaCount {
                life_area_id: 1,
                count: 3,
            },
            AreaCount {
                life_area_id: 2,
                count: 1,
            },
        ];
        let completed = [AreaCount {
            life_area_id: 1,
            count: 2,
        }];

        let stats = area_week_stats(&areas, &[], &totals, &completed);
        assert_eq!(stats[0].name, "Career");
        assert_eq!((stats[0].total, stats[0].completed), (3, 2));
        assert_eq!((stats[1].total, stats[1].completed), (1, 0));
        assert_eq!(week_totals(&stats), (4, 2));
    }

    #[test]
    fn list_stats_counts_urgent_pending() {
        let mut done = Task::new("done", 0).with_priority(Priority::High);
        done.toggle_complete();
        let tasks = vec![
            done,
            Task::new("urgent", 0).with_priority(Priority::High),
            Task::new("normal", 0),
        ];
        let stats = ListStats::from_tasks(&tasks);
        assert_eq!(
            stats,
            ListStats {
                total: 3,
                completed: 1,
                pending: 2,
                urgent_pending: 1
            }
        );
    }
}
