// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, deduplicating, time-ordered buffer of collected messages.
//!
//! The collector is shared between the live event handler, the history
//! merge, and the runner's final snapshot, so every operation takes `&self`.
//! When the number of retained records first reaches the count target, a
//! one-shot completion signal fires. Later additions never fire it again.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use wabridge_core::MessageRecord;

/// Outcome of [`MessageCollector::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The key was seen before; nothing changed.
    Duplicate,
    /// The record was stored.
    Accepted,
    /// The record was stored and this addition reached the count target.
    Completed,
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Admission::Duplicate)
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Ascending by (timestamp, content).
    records: Vec<MessageRecord>,
    /// Every key ever admitted, including evicted ones.
    seen: HashSet<String>,
    completed: bool,
}

/// Thread-safe message buffer with a retention cap and a completion signal.
#[derive(Debug)]
pub struct MessageCollector {
    inner: Mutex<Inner>,
    capacity: usize,
    target: usize,
    done: CancellationToken,
}

impl MessageCollector {
    /// Creates a collector keeping at most `retention_cap` records.
    ///
    /// `target` is the count that fires the completion signal; `0` disables
    /// it. The cap is raised to `target` when smaller, otherwise the target
    /// could never be reached.
    pub fn new(retention_cap: usize, target: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: retention_cap.max(target).max(1),
            target,
            done: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `record` in time order unless its key was already seen.
    pub fn add(&self, record: MessageRecord) -> Admission {
        let mut inner = self.lock();
        if !inner.seen.insert(record.key.clone()) {
            return Admission::Duplicate;
        }

        let at = inner.records.partition_point(|r| {
            (r.timestamp, r.content.as_str()) <= (record.timestamp, record.content.as_str())
        });
        inner.records.insert(at, record);

        let excess = inner.records.len().saturating_sub(self.capacity);
        if excess > 0 {
            inner.records.drain(..excess);
        }

        if self.target > 0 && !inner.completed && inner.records.len() >= self.target {
            inner.completed = true;
            drop(inner);
            self.done.cancel();
            return Admission::Completed;
        }
        Admission::Accepted
    }

    /// Contents of the newest `limit` records, oldest first. `0` returns all.
    pub fn snapshot(&self, limit: usize) -> Vec<String> {
        let inner = self.lock();
        let skip = if limit == 0 {
            0
        } else {
            inner.records.len().saturating_sub(limit)
        };
        inner.records[skip..]
            .iter()
            .map(|r| r.content.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the count target has been reached.
    pub fn is_complete(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Resolves once the count target is reached. Never resolves when the
    /// collector has no target.
    pub async fn completed(&self) {
        self.done.cancelled().await;
    }
}
