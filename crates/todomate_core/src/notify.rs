//! Store-change notifications.
//!
//! # Responsibility
//! - Carry "something changed" messages from store writers to the thread that
//!   owns dashboard state.
//!
//! # Invariants
//! - Publishing never blocks and never fails the write that triggered it; a
//!   dropped feed just means nobody is listening.
//! - Messages carry no data snapshots. Receivers re-read current state.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// One logical table changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreChange {
    Tasks,
    LifeAreas,
    /// Goals for the week starting at `week_start` changed.
    WeeklyGoals { week_start: i64 },
}

/// Sending side, held by services. Cloning shares the same feed.
#[derive(Debug, Clone, Default)]
pub struct ChangeHub {
    sender: Option<Sender<StoreChange>>,
}

/// Receiving side, owned by the UI/state thread.
#[derive(Debug)]
pub struct ChangeFeed {
    receiver: Receiver<StoreChange>,
}

impl ChangeHub {
    /// Creates a connected hub/feed pair.
    pub fn channel() -> (Self, ChangeFeed) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender: Some(sender),
            },
            ChangeFeed { receiver },
        )
    }

    /// Hub that drops every message.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn publish(&self, change: StoreChange) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(change);
        }
    }
}

impl ChangeFeed {
    /// Drains every queued change without blocking.
    pub fn drain(&self) -> Vec<StoreChange> {
        let mut changes = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(change) => changes.push(change),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        changes
    }
}
