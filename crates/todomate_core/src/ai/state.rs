//! Shared display state for AI messages.
//!
//! # Invariants
//! - Each ticket reaches at most one terminal state.
//! - Results from cancelled tickets are dropped.
//! - Among live tickets, whichever completes last is what the board shows.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// What the message area currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AiMessageState {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error {
        reason: String,
        /// Rule-based text to show alongside the failure.
        fallback: String,
    },
}

impl AiMessageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error { .. })
    }
}

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

#[derive(Debug, Default)]
struct BoardInner {
    state: AiMessageState,
    next_ticket: u64,
    pending: HashSet<RequestTicket>,
}

/// Thread-safe holder of [`AiMessageState`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MessageBoard {
    inner: Arc<Mutex<BoardInner>>,
}

impl MessageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> AiMessageState {
        self.lock().state.clone()
    }

    /// Starts a request and shows `Loading`.
    pub fn begin(&self) -> RequestTicket {
        let mut inner = self.lock();
        let ticket = RequestTicket(inner.next_ticket);
        inner.next_ticket += 1;
        inner.pending.insert(ticket);
        inner.state = AiMessageState::Loading;
        ticket
    }

    /// Shows a terminal state without a request, e.g. a precondition failure.
    pub fn show(&self, state: AiMessageState) {
        self.lock().state = state;
    }

    /// Publishes `state` for `ticket`. Returns `false` when the ticket was
    /// cancelled or already completed.
    pub fn complete(&self, ticket: RequestTicket, state: AiMessageState) -> bool {
        let mut inner = self.lock();
        if !inner.pending.remove(&ticket) {
            return false;
        }
        inner.state = state;
        true
    }

    /// Drops interest in `ticket`. The board returns to `Idle` if it was only
    /// waiting on this request.
    pub fn cancel(&self, ticket: RequestTicket) -> bool {
        let mut inner = self.lock();
        let removed = inner.pending.remove(&ticket);
        if removed && inner.pending.is_empty() && inner.state == AiMessageState::Loading {
            inner.state = AiMessageState::Idle;
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, BoardInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
