//! Deferred task queue
//!
//! Node construction completes synchronously; anything that must happen
//! afterwards (notably the `node_created` hook) is queued here and drained by
//! the host once per frame, off the critical path of a repaint.

use crate::nodes::NodeId;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Work postponed until after the operation that scheduled it returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    /// Notify extensions that a node instance finished construction
    NodeCreated(NodeId),
}

/// FIFO of deferred tasks. Interior mutability lets construction sites push
/// through a shared context reference.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: Mutex<VecDeque<DeferredTask>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, task: DeferredTask) {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).push_back(task);
    }

    /// Take everything queued so far, in FIFO order
    pub fn drain(&self) -> Vec<DeferredTask> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    pub fn clear(&self) {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_fifo_order() {
        let queue = TaskQueue::new();
        queue.push(DeferredTask::NodeCreated(1));
        queue.push(DeferredTask::NodeCreated(2));

        assert_eq!(
            queue.drain(),
            vec![DeferredTask::NodeCreated(1), DeferredTask::NodeCreated(2)]
        );
        assert!(queue.is_empty());
    }
}
