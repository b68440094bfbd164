//! Prompt builders.
//!
//! Every prompt asks for a single JSON object so replies can be parsed by
//! [`crate::ai::parse`].

use crate::stats::summary::{AreaWeekStats, ListStats};

/// Area name a tag-suggestion reply uses when no listed area fits.
pub const UNKNOWN_AREA: &str = "Unknown";

/// Coach prompt for one week of per-area progress.
pub fn weekly_prompt(stats: &[AreaWeekStats]) -> String {
    let mut lines = String::from("This week's progress:\n");
    for area in stats {
        lines.push_str(&format!(
            "- {}: {} tasks, {} completed, goal share {}%\n",
            area.name, area.total, area.completed, area.goal_percentage
        ));
    }

    format!(
        "You are a kind and warm life coach.\n\
         \n\
         {lines}\n\
         Write the user a motivating message based on the numbers above.\n\
         \n\
         Rules:\n\
         - 2-3 short sentences\n\
         - Mention what is going well first\n\
         - Suggest improvements gently\n\
         - Use 1-2 emoji\n\
         - Sincere, not exaggerated\n\
         \n\
         Reply only with JSON in exactly this shape:\n\
         {{\"message\": \"your message\"}}"
    )
}

/// Coach prompt for the plain task list.
pub fn list_prompt(stats: &ListStats) -> String {
    format!(
        "You are a kind and warm motivation coach.\n\
         \n\
         [Today's tasks]\n\
         - All tasks: {}\n\
         - Completed: {}\n\
         - Pending: {}\n\
         - Urgent (pending): {}\n\
         \n\
         Write the user a short encouraging message based on the numbers above.\n\
         \n\
         Rules:\n\
         - 1-2 very short sentences\n\
         - Fit the current situation\n\
         - Use exactly one emoji\n\
         - Vary the wording every time\n\
         \n\
         Reply only with JSON in exactly this shape:\n\
         {{\"message\": \"your message\"}}",
        stats.total, stats.completed, stats.pending, stats.urgent_pending
    )
}

/// Classification prompt mapping one task onto an allowed area name.
pub fn tag_prompt(title: &str, description: &str, allowed_areas: &[String]) -> String {
    let description = if description.trim().is_empty() {
        "(none)"
    } else {
        description
    };

    format!(
        "You classify to-do items.\n\
         \n\
         [Available life areas]\n\
         {areas}\n\
         \n\
         [Task]\n\
         Title: {title}\n\
         Description: {description}\n\
         \n\
         Decide which life area this task belongs to.\n\
         \n\
         Rules:\n\
         - Pick exactly one area from the list above\n\
         - If unsure, answer \"{UNKNOWN_AREA}\"\n\
         - Briefly explain the choice\n\
         \n\
         Reply only with JSON in exactly this shape:\n\
         {{\"areaName\": \"area name\", \"confidence\": 0.8, \"reason\": \"why\"}}",
        areas = allowed_areas.join(", "),
    )
}
