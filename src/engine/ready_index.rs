// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Incremental index of dispatchable tasks.
//!
//! Rather than scanning every pending task on each poll, the index keeps a
//! count of unresolved dependencies per task plus a reverse map from each task
//! to the tasks waiting on it. Completing a task decrements its dependents'
//! counts; a dependent whose count reaches zero joins the FIFO ready queue.
//!
//! Claims remove a task from the ready set immediately. Stale queue entries
//! are dropped from the head as soon as they surface there, and the queue is
//! compacted once stale entries outnumber live ones, so claiming by id,
//! peeking and popping all stay O(1) amortized and the queue never holds
//! more than twice the number of ready tasks.
//!
//! ```rust
//! use the_abacus::engine::ReadyIndex;
//! use the_abacus::model::TaskId;
//!
//! let (left, right, root) = (TaskId::new(), TaskId::new(), TaskId::new());
//! let mut index = ReadyIndex::new();
//! index.register(&left, []);
//! index.register(&right, []);
//! index.register(&root, [&left, &right]);
//!
//! assert_eq!(index.pop(), Some(left.clone()));
//! assert_eq!(index.pop(), Some(right.clone()));
//! assert_eq!(index.pop(), None); // root still waits on both
//!
//! assert!(index.complete(&left).is_empty());
//! assert_eq!(index.complete(&right), vec![root.clone()]);
//! assert_eq!(index.pop(), Some(root));
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::TaskId;

#[derive(Debug, Default)]
pub struct ReadyIndex {
    /// Dispatch order. The head is always unclaimed; claimed ids further back
    /// are dropped lazily
    queue: VecDeque<TaskId>,
    /// Ids in `queue` that are still unclaimed
    ready: HashSet<TaskId>,
    /// Unresolved dependency count of every task not yet ready
    waiting: HashMap<TaskId, usize>,
    /// dependency -> tasks that reference its result
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl ReadyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task with the given dependencies. Returns `true` if the task is
    /// immediately dispatchable.
    ///
    /// Dependencies must be registered, and not yet completed, before the
    /// tasks that reference them.
    pub fn register<'a, I>(&mut self, task_id: &TaskId, dependencies: I) -> bool
    where
        I: IntoIterator<Item = &'a TaskId>,
    {
        let mut unresolved = 0;
        for dependency in dependencies {
            self.dependents
                .entry(dependency.clone())
                .or_default()
                .push(task_id.clone());
            unresolved += 1;
        }

        if unresolved == 0 {
            self.enqueue(task_id.clone());
            true
        } else {
            self.waiting.insert(task_id.clone(), unresolved);
            false
        }
    }

    /// Records that `task_id` completed and returns the dependents that just
    /// became dispatchable, in the order they were registered.
    pub fn complete(&mut self, task_id: &TaskId) -> Vec<TaskId> {
        self.settle(task_id);

        let mut unblocked = Vec::new();
        for dependent in self.dependents.remove(task_id).unwrap_or_default() {
            // Dependents that settled on their own are no longer tracked
            let Some(count) = self.waiting.get_mut(&dependent) else {
                continue;
            };
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.waiting.remove(&dependent);
                self.enqueue(dependent.clone());
                unblocked.push(dependent);
            }
        }
        unblocked
    }

    /// Stops tracking a task that reached a terminal status. Its dependents
    /// keep waiting.
    pub fn settle(&mut self, task_id: &TaskId) {
        self.waiting.remove(task_id);
        if self.ready.remove(task_id) {
            self.compact();
        }
    }

    /// Claims `task_id` if it is ready. Only one claim per task succeeds.
    pub fn claim(&mut self, task_id: &TaskId) -> bool {
        let claimed = self.ready.remove(task_id);
        if claimed {
            self.compact();
        }
        claimed
    }

    /// Claims the oldest ready task.
    pub fn pop(&mut self) -> Option<TaskId> {
        let task_id = self.queue.pop_front()?;
        self.ready.remove(&task_id);
        self.compact();
        Some(task_id)
    }

    /// The oldest ready task, without claiming it.
    pub fn peek(&self) -> Option<&TaskId> {
        self.queue.front()
    }

    pub fn is_ready(&self, task_id: &TaskId) -> bool {
        self.ready.contains(task_id)
    }

    /// Number of unclaimed ready tasks.
    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    /// Entries held by the dispatch queue, stale ones included.
    pub fn backlog(&self) -> usize {
        self.queue.len()
    }

    fn enqueue(&mut self, task_id: TaskId) {
        if self.ready.insert(task_id.clone()) {
            self.queue.push_back(task_id);
        }
    }

    /// Restores the queue invariants after an id left the ready set.
    fn compact(&mut self) {
        while let Some(head) = self.queue.front() {
            if self.ready.contains(head) {
                break;
            }
            self.queue.pop_front();
        }
        // Each full pass removes at least half the queue
        if self.queue.len() > 2 * self.ready.len() {
            let ready = &self.ready;
            self.queue.retain(|id| ready.contains(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_only_tasks_are_ready_in_fifo_order() {
        let ids: Vec<TaskId> = (0..3).map(|_| TaskId::new()).collect();
        let mut index = ReadyIndex::new();
        for id in &ids {
            assert!(index.register(id, []));
        }

        assert_eq!(index.len(), 3);
        assert_eq!(index.pop(), Some(ids[0].clone()));
        assert_eq!(index.pop(), Some(ids[1].clone()));
        assert_eq!(index.pop(), Some(ids[2].clone()));
        assert!(index.is_empty());
    }

    #[test]
    fn claim_succeeds_once() {
        let id = TaskId::new();
        let mut index = ReadyIndex::new();
        index.register(&id, []);

        assert!(index.claim(&id));
        assert!(!index.claim(&id));
        assert_eq!(index.pop(), None);
        assert_eq!(index.peek(), None);
    }

    #[test]
    fn claims_by_id_do_not_accumulate_in_the_queue() {
        let ids: Vec<TaskId> = (0..1000).map(|_| TaskId::new()).collect();
        let mut index = ReadyIndex::new();
        for id in &ids {
            index.register(id, []);
        }

        // Claim from the back so stale entries never surface at the head
        for (claimed, id) in ids.iter().rev().enumerate() {
            assert!(index.claim(id));
            assert!(index.backlog() <= 2 * index.len().max(1));
            assert_eq!(index.len(), ids.len() - claimed - 1);
        }
        assert_eq!(index.backlog(), 0);
        assert_eq!(index.peek(), None);
    }

    #[test]
    fn settled_ready_task_leaves_the_queue() {
        let (first, second) = (TaskId::new(), TaskId::new());
        let mut index = ReadyIndex::new();
        index.register(&first, []);
        index.register(&second, []);

        index.settle(&first);
        assert_eq!(index.peek(), Some(&second));
        assert_eq!(index.backlog(), 1);
    }

    #[test]
    fn peek_skips_claimed_entries() {
        let (first, second) = (TaskId::new(), TaskId::new());
        let mut index = ReadyIndex::new();
        index.register(&first, []);
        index.register(&second, []);

        index.claim(&first);
        assert_eq!(index.peek(), Some(&second));
        assert!(index.is_ready(&second));
    }

    #[test]
    fn same_dependency_on_both_sides_counts_twice() {
        let (dep, task) = (TaskId::new(), TaskId::new());
        let mut index = ReadyIndex::new();
        index.register(&dep, []);
        assert!(!index.register(&task, [&dep, &dep]));

        assert_eq!(index.complete(&dep), vec![task.clone()]);
        assert!(index.is_ready(&task));
    }

    #[test]
    fn failed_dependency_keeps_dependents_waiting() {
        let (dep, task) = (TaskId::new(), TaskId::new());
        let mut index = ReadyIndex::new();
        index.register(&dep, []);
        index.register(&task, [&dep]);

        index.pop();
        index.settle(&dep);

        assert!(!index.is_ready(&task));
        assert_eq!(index.pop(), None);
    }

    #[test]
    fn settled_dependent_is_not_requeued() {
        let (dep, task) = (TaskId::new(), TaskId::new());
        let mut index = ReadyIndex::new();
        index.register(&dep, []);
        index.register(&task, [&dep]);

        // Dependent resolved out of band before its dependency completed
        index.settle(&task);
        assert!(index.complete(&dep).is_empty());
        assert!(!index.is_ready(&task));
    }
}
