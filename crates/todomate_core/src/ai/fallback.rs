//! Rule-based encouragement used when generation is unavailable.
//!
//! "More than half" uses integer halving, so 2 of 3 qualifies and 1 of 3
//! does not.

/// Message for one week of tasks.
pub fn weekly_fallback(total: u32, completed: u32) -> &'static str {
    if total == 0 {
        "📝 Add this week's tasks and start moving toward your goals!"
    } else if completed == 0 {
        "💪 Your tasks are ready. Shall we finish them one at a time?"
    } else if completed >= total {
        "🎉 You finished every task this week! Amazing!"
    } else if completed > total / 2 {
        "👍 You're making great progress! Just a little more!"
    } else {
        "🌱 One step at a time is all it takes. You've got this!"
    }
}

/// Message for the plain task list.
pub fn list_fallback(total: u32, completed: u32) -> &'static str {
    if total == 0 {
        "📝 Add a task and get your day started!"
    } else if completed >= total {
        "🎉 Every task is done! Amazing!"
    } else if completed == 0 {
        "💪 You can do it today! One task at a time."
    } else if completed > total / 2 {
        "👍 Going well! Just a bit more!"
    } else {
        "🌱 Slowly, one by one. You can do it!"
    }
}

#[cfg(test)]
mod tests {
    use super::{list_fallback, weekly_fallback};

    #[test]
    fn weekly_branches() {
        assert!(weekly_fallback(0, 0).starts_with("📝"));
        assert!(weekly_fallback(4, 0).starts_with("💪"));
        assert!(weekly_fallback(4, 4).starts_with("🎉"));
        assert!(weekly_fallback(3, 2).starts_with("👍"));
        assert!(weekly_fallback(3, 1).starts_with("🌱"));
        assert!(weekly_fallback(4, 2).starts_with("🌱"));
    }

    #[test]
    fn list_branches() {
        assert!(list_fallback(0, 0).starts_with("📝"));
        assert!(list_fallback(2, 2).starts_with("🎉"));
        assert!(list_fallback(2, 0).starts_with("💪"));
        assert!(list_fallback(5, 3).starts_with("👍"));
        assert!(list_fallback(5, 2).starts_with("🌱"));
    }
}
