//! history.rs: bounded in-memory window of recent chat messages.
//!
//! One buffer belongs to one polling session; it is never shared.

use std::collections::VecDeque;

use crate::ingest::types::Message;

/// Default number of retained messages.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buf: VecDeque<Message>,
    cap: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// A zero capacity is bumped to 1 so the newest message is always kept.
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            buf: VecDeque::with_capacity(cap.min(10_000)),
            cap,
        }
    }

    /// Append and evict the oldest entries beyond capacity.
    pub fn push(&mut self, msg: Message) {
        self.buf.push_back(msg);
        while self.buf.len() > self.cap {
            self.buf.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.buf.iter()
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<Message> {
        let start = self.buf.len().saturating_sub(n);
        self.buf.iter().skip(start).cloned().collect()
    }
}
