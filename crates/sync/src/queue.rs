//! Due-time ordered task queue.
//!
//! A min-heap keyed on due time only. Entries that share a due time come
//! out in no particular order. Cancelled tasks are left in place and
//! dropped when they reach the top.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::task::Runnable;

pub(crate) struct QueueEntry<I> {
    pub due: I,
    pub task: Arc<dyn Runnable>,
}

impl<I: Ord> PartialEq for QueueEntry<I> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due
    }
}

impl<I: Ord> Eq for QueueEntry<I> {}

impl<I: Ord> PartialOrd for QueueEntry<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: Ord> Ord for QueueEntry<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due)
    }
}

pub(crate) struct TaskQueue<I> {
    heap: BinaryHeap<Reverse<QueueEntry<I>>>,
}

impl<I: Ord + Copy> TaskQueue<I> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, due: I, task: Arc<dyn Runnable>) {
        self.heap.push(Reverse(QueueEntry { due, task }));
    }

    /// Pop the earliest entry if its due time is not after `now`.
    pub fn pop_due(&mut self, now: I) -> Option<QueueEntry<I>> {
        match self.heap.peek() {
            Some(Reverse(top)) if top.due <= now => self.heap.pop().map(|Reverse(e)| e),
            _ => None,
        }
    }

    pub fn next_due(&self) -> Option<I> {
        self.heap.peek().map(|Reverse(e)| e.due)
    }

    /// Swap the whole queue out for an empty one.
    pub fn take_all(&mut self) -> Vec<QueueEntry<I>> {
        std::mem::take(&mut self.heap)
            .into_iter()
            .map(|Reverse(e)| e)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::task::SyncTask;

    fn entry_task(tag: u32) -> Arc<dyn Runnable> {
        Arc::new(SyncTask::<u32, (), u64>::new(
            0,
            Some(format!("t{}", tag)),
            Box::new(move || Ok(tag)),
        ))
    }

    fn labels(entries: &[QueueEntry<u64>]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.task.label().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn pops_in_due_order() {
        let mut q = TaskQueue::new();
        q.push(30, entry_task(3));
        q.push(10, entry_task(1));
        q.push(20, entry_task(2));

        let mut popped = Vec::new();
        while let Some(e) = q.pop_due(100) {
            popped.push(e);
        }
        assert_eq!(labels(&popped), vec!["t1", "t2", "t3"]);
        assert!(q.is_empty());
    }

    #[test]
    fn does_not_pop_future_entries() {
        let mut q = TaskQueue::new();
        q.push(10, entry_task(1));
        q.push(50, entry_task(2));

        assert!(q.pop_due(9).is_none());
        assert_eq!(q.pop_due(10).map(|e| e.due), Some(10));
        assert!(q.pop_due(49).is_none());
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(50));
    }

    #[test]
    fn take_all_empties_queue() {
        let mut q = TaskQueue::new();
        for i in 0..5 {
            q.push(i, entry_task(i as u32));
        }
        let all = q.take_all();
        assert_eq!(all.len(), 5);
        assert!(q.is_empty());
        assert_eq!(q.next_due(), None);
    }

    #[test]
    fn equal_due_times_all_come_out() {
        let mut q = TaskQueue::new();
        for i in 0..4 {
            q.push(7, entry_task(i));
        }
        let mut count = 0;
        while q.pop_due(7).is_some() {
            count += 1;
        }
        assert_eq!(count, 4);
    }
}
