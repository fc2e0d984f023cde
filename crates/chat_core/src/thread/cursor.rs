//! Per-thread version cursors

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tree::Thread;
use crate::message::MessageId;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

/// Which version of each thread is on screen, keyed by the thread's original id.
///
/// Threads without a recorded position show version 0. Cursors only change
/// what is displayed; they never touch the store.
#[derive(Clone, Debug, Default)]
pub struct ThreadCursors {
    positions: HashMap<MessageId, usize>,
}

impl ThreadCursors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor of `thread`, clamped to its version range
    pub fn get(&self, thread: &Thread) -> usize {
        let raw = self.positions.get(&thread.id()).copied().unwrap_or(0);
        match thread.latest_index() {
            Some(last) => raw.min(last),
            None => 0,
        }
    }

    /// Move the cursor one step, staying inside `[0, k-1]`. Returns the new position.
    pub fn advance(&mut self, thread: &Thread, direction: Direction) -> usize {
        let Some(last) = thread.latest_index() else {
            return 0;
        };
        let current = self.get(thread);
        let next = match direction {
            Direction::Prev => current.saturating_sub(1),
            Direction::Next => (current + 1).min(last),
        };
        self.positions.insert(thread.id(), next);
        next
    }

    /// Jump to `index`, clamped to the version range
    pub fn set(&mut self, thread: &Thread, index: usize) -> usize {
        let clamped = thread.latest_index().map_or(0, |last| index.min(last));
        self.positions.insert(thread.id(), clamped);
        clamped
    }

    pub fn focus_latest(&mut self, thread: &Thread) -> usize {
        self.set(thread, usize::MAX)
    }

    /// Drop positions of threads that are no longer loaded
    pub fn retain(&mut self, threads: &[Thread]) {
        self.positions
            .retain(|id, _| threads.iter().any(|thread| thread.id() == *id));
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
