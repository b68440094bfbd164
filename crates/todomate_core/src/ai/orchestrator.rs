//! Background encouragement requests.
//!
//! # Responsibility
//! - Run generator calls on worker threads so callers never block.
//! - Translate outcomes into [`AiMessageState`] on the shared board, with
//!   rule-based fallback text for failures.
//!
//! # Invariants
//! - Weekly requests without areas fail immediately and never reach the
//!   generator.
//! - Weekly failures surface as `Error` carrying the fallback text; list
//!   failures are shown as a plain `Success` with the fallback text.

use crate::ai::encouragement::{EncouragementResult, EncouragementService};
use crate::ai::fallback::{list_fallback, weekly_fallback};
use crate::ai::generator::TextGenerator;
use crate::ai::state::{AiMessageState, MessageBoard};
use crate::stats::summary::{week_totals, AreaWeekStats, ListStats};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Reason shown when a weekly request is made before any area exists.
pub const NO_AREAS_REASON: &str = "Set up your life areas first";

/// State shown when a weekly request is made before any area exists.
pub fn no_areas_state() -> AiMessageState {
    AiMessageState::Error {
        reason: NO_AREAS_REASON.to_string(),
        fallback: weekly_fallback(0, 0).to_string(),
    }
}

/// Board state for a finished weekly request over `stats`.
pub fn weekly_outcome(result: EncouragementResult, stats: &[AreaWeekStats]) -> AiMessageState {
    match result {
        EncouragementResult::Success(message) => AiMessageState::Success(message),
        EncouragementResult::Error(reason) => {
            let (total, completed) = week_totals(stats);
            AiMessageState::Error {
                reason,
                fallback: weekly_fallback(total, completed).to_string(),
            }
        }
    }
}

/// Board state for a finished list request. Failures show the fallback as a
/// regular message.
pub fn list_outcome(result: EncouragementResult, stats: &ListStats) -> AiMessageState {
    match result {
        EncouragementResult::Success(message) => AiMessageState::Success(message),
        EncouragementResult::Error(_) => {
            AiMessageState::Success(list_fallback(stats.total, stats.completed).to_string())
        }
    }
}

pub struct EncouragementOrchestrator<G: TextGenerator + 'static> {
    service: Arc<EncouragementService<G>>,
    board: MessageBoard,
}

impl<G: TextGenerator + 'static> EncouragementOrchestrator<G> {
    pub fn new(generator: G, board: MessageBoard) -> Self {
        Self {
            service: Arc::new(EncouragementService::new(generator)),
            board,
        }
    }

    pub fn board(&self) -> &MessageBoard {
        &self.board
    }

    /// Requests a weekly message. Returns `None` when nothing was spawned.
    ///
    /// The handle yields the state computed for this request, whether or not
    /// the board still accepted it.
    pub fn request_weekly(&self, stats: Vec<AreaWeekStats>) -> Option<JoinHandle<AiMessageState>> {
        if stats.is_empty() {
            self.board.show(no_areas_state());
            return None;
        }

        let ticket = self.board.begin();
        let service = Arc::clone(&self.service);
        let board = self.board.clone();
        Some(thread::spawn(move || {
            let state = weekly_outcome(service.weekly_encouragement(&stats), &stats);
            board.complete(ticket, state.clone());
            state
        }))
    }

    /// Requests a list message.
    pub fn request_list(&self, stats: ListStats) -> JoinHandle<AiMessageState> {
        let ticket = self.board.begin();
        let service = Arc::clone(&self.service);
        let board = self.board.clone();
        thread::spawn(move || {
            let state = list_outcome(service.list_encouragement(&stats), &stats);
            board.complete(ticket, state.clone());
            state
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{list_outcome, weekly_outcome};
    use crate::ai::encouragement::EncouragementResult;
    use crate::ai::fallback::{list_fallback, weekly_fallback};
    use crate::ai::state::AiMessageState;
    use crate::stats::summary::{AreaWeekStats, ListStats};

    #[test]
    fn weekly_failure_falls_back_on_week_totals() {
        let stats = vec![
            AreaWeekStats {
                name: "Career".to_string(),
                total: 3,
                completed: 3,
                goal_percentage: 40,
            },
            AreaWeekStats {
                name: "Health".to_string(),
                total: 1,
                completed: 1,
                goal_percentage: 10,
            },
        ];
        assert_eq!(
            weekly_outcome(EncouragementResult::Error("down".to_string()), &stats),
            AiMessageState::Error {
                reason: "down".to_string(),
                fallback: weekly_fallback(4, 4).to_string(),
            }
        );
    }

    #[test]
    fn list_failure_is_shown_as_message() {
        let stats = ListStats {
            total: 2,
            completed: 0,
            pending: 2,
            urgent_pending: 0,
        };
        assert_eq!(
            list_outcome(EncouragementResult::Error("down".to_string()), &stats),
            AiMessageState::Success(list_fallback(2, 0).to_string())
        );
        assert_eq!(
            list_outcome(EncouragementResult::Success("go".to_string()), &stats),
            AiMessageState::Success("go".to_string())
        );
    }
}
