//! Ordered batch execution.
//!
//! A queue drains its entries strictly in FIFO order with exactly one call
//! in flight. A failing entry (non-success status) skips everything behind
//! it unless the queue was built with `continue_on_failure`.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use common::response::ResultSet;

use crate::connection::{CallKind, Connection};

/// Seam between the queue and the transport, so batches are testable
/// without a live endpoint.
#[async_trait]
pub trait CallDispatcher: Send + Sync {
    async fn execute(&self, kind: &CallKind, update: bool) -> ResultSet;
}

#[async_trait]
impl CallDispatcher for Connection {
    async fn execute(&self, kind: &CallKind, update: bool) -> ResultSet {
        if update {
            self.call_execute_update(kind).await
        } else {
            self.call_execute(kind).await
        }
    }
}

type EntryCallback = Box<dyn FnOnce(&ResultSet) + Send>;

struct QueueEntry {
    kind: CallKind,
    update: bool,
    callback: Option<EntryCallback>,
}

pub struct CallQueue {
    dispatcher: Arc<dyn CallDispatcher>,
    entries: VecDeque<QueueEntry>,
    continue_on_failure: bool,
}

impl CallQueue {
    pub fn new(dispatcher: Arc<dyn CallDispatcher>) -> Self {
        Self {
            dispatcher,
            entries: VecDeque::new(),
            continue_on_failure: false,
        }
    }

    pub fn continue_on_failure(mut self) -> Self {
        self.continue_on_failure = true;
        self
    }

    /// Appends a GET-dispatched entry.
    pub fn enqueue<F>(&mut self, kind: CallKind, callback: F)
    where
        F: FnOnce(&ResultSet) + Send + 'static,
    {
        self.push(kind, false, Some(Box::new(callback)));
    }

    /// Appends a POST-dispatched (update) entry.
    pub fn enqueue_update<F>(&mut self, kind: CallKind, callback: F)
    where
        F: FnOnce(&ResultSet) + Send + 'static,
    {
        self.push(kind, true, Some(Box::new(callback)));
    }

    /// Appends an entry with no per-entry callback.
    pub fn enqueue_silent(&mut self, kind: CallKind) {
        self.push(kind, false, None);
    }

    fn push(&mut self, kind: CallKind, update: bool, callback: Option<EntryCallback>) {
        self.entries.push_back(QueueEntry {
            kind,
            update,
            callback,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drains the queue and returns the aggregate success flag. Consuming
    /// `self` makes re-entrant draining impossible by construction.
    pub async fn run(mut self) -> bool {
        let mut success = true;
        while let Some(entry) = self.entries.pop_front() {
            if !success && !self.continue_on_failure {
                debug!(remaining = self.entries.len() + 1, "halting batch after failure");
                break;
            }
            let result = self.dispatcher.execute(&entry.kind, entry.update).await;
            if !result.is_success() {
                success = false;
            }
            if let Some(callback) = entry.callback {
                callback(&result);
            }
        }
        success
    }
}
