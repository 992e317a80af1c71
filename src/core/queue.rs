//! # Priority queue of not-yet-started work.
//!
//! Items are ordered by `(priority ascending, seq ascending)`: lower priority numbers
//! first, and submission order inside a priority band. The queue owns the `seq`
//! counter, so a requeued retry always lands behind everything already waiting in
//! its band.
//!
//! Backed by [`BinaryHeap`] (a max-heap), so the ordering key is reversed.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::tasks::{Priority, TaskRef};

/// Pool-assigned submission id, stable across retries.
pub type TaskId = u64;

/// A queued (or running) unit of work.
pub(crate) struct WorkItem<T> {
    pub id: TaskId,
    pub task: TaskRef<T>,
    pub priority: Priority,
    /// Attempts this item may still use, the upcoming one included.
    pub attempts_remaining: u32,
    /// 1-based number of the upcoming attempt.
    pub attempt: u32,
}

impl<T: 'static> WorkItem<T> {
    pub fn new(id: TaskId, task: TaskRef<T>, priority: Priority, attempts: u32) -> Self {
        Self {
            id,
            task,
            priority,
            attempts_remaining: attempts,
            attempt: 1,
        }
    }

    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// The same submission, one attempt further.
    pub fn retry(self, attempts_remaining: u32) -> Self {
        Self {
            attempts_remaining,
            attempt: self.attempt + 1,
            ..self
        }
    }
}

struct Entry<T> {
    key: Reverse<(Priority, u64)>,
    item: WorkItem<T>,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

/// Heap of waiting items keyed by `(priority, seq)`.
pub(crate) struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Inserts `item` at the back of its priority band.
    pub fn push(&mut self, item: WorkItem<T>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            key: Reverse((item.priority, seq)),
            item,
        });
    }

    /// Removes the item with the smallest `(priority, seq)`.
    pub fn pop(&mut self) -> Option<WorkItem<T>> {
        self.heap.pop().map(|e| e.item)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Empties the queue, returning items in dispatch order.
    pub fn drain(&mut self) -> Vec<WorkItem<T>> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(item) = self.pop() {
            out.push(item);
        }
        out
    }
}
