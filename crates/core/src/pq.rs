//! Binary min-heap priority queue.
//!
//! The tree builder uses this to repeatedly pull the two lightest subtrees.
//! Positions are 1-indexed in the usual textbook way (`parent(i) = i / 2`,
//! children `2i` and `2i + 1`); slot `i` is stored at `entries[i - 1]`.
//!
//! # Tie-break
//! Equal priorities come out in whatever order the sift operations leave
//! them. Sift-up stops on equality, and sift-down prefers the left child when
//! both children are equal and stops as soon as the moved entry is no greater
//! than the chosen child. The order is deterministic for a given sequence of
//! operations but neither stable nor insertion-ordered.

use crate::error::QueueError;

/// A payload paired with the priority it is ordered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapEntry<T> {
    pub priority: u64,
    pub value: T,
}

/// Min-heap keyed by a `u64` priority.
///
/// # Invariants
/// - for every position i > 1, `priority(i / 2) <= priority(i)`
/// - `len() <= capacity()`; capacity grows by doubling, starting at 1
#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    entries: Vec<HeapEntry<T>>,
    capacity: usize,
}

impl<T> PriorityQueue<T> {
    /// Create an empty queue with capacity 0. Nothing is allocated until the
    /// first `add`.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            capacity: 0,
        }
    }

    /// Insert `value` with the given priority.
    ///
    /// # Errors
    /// `QueueError::OutOfMemory` if the backing storage cannot be doubled.
    pub fn add(&mut self, value: T, priority: u64) -> Result<(), QueueError> {
        if self.entries.len() == self.capacity {
            self.grow()?;
        }

        self.entries.push(HeapEntry { priority, value });
        self.sift_up(self.entries.len());
        Ok(())
    }

    /// Remove and return the payload with the smallest priority.
    ///
    /// # Errors
    /// `QueueError::EmptyQueue` if there is nothing to remove.
    pub fn remove(&mut self) -> Result<T, QueueError> {
        if self.entries.is_empty() {
            return Err(QueueError::EmptyQueue);
        }

        // The last entry takes the root's place and then sinks.
        let root = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(1);
        }
        Ok(root.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn grow(&mut self) -> Result<(), QueueError> {
        let new_capacity = match self.capacity {
            0 => 1,
            n => n.checked_mul(2).ok_or(QueueError::OutOfMemory { capacity: n })?,
        };

        self.entries
            .try_reserve_exact(new_capacity - self.entries.len())
            .map_err(|_| QueueError::OutOfMemory {
                capacity: new_capacity,
            })?;
        self.capacity = new_capacity;
        Ok(())
    }

    fn priority(&self, pos: usize) -> u64 {
        self.entries[pos - 1].priority
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a - 1, b - 1);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 1 {
            let parent = pos / 2;
            if self.priority(parent) <= self.priority(pos) {
                break;
            }
            self.swap(parent, pos);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.entries.len();
        while pos * 2 <= len {
            let mut child = pos * 2;
            if child < len && self.priority(child + 1) < self.priority(child) {
                child += 1;
            }
            if self.priority(pos) <= self.priority(child) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }

    /// Check the heap order over every position.
    #[cfg(test)]
    fn is_heap(&self) -> bool {
        (2..=self.entries.len()).all(|pos| self.priority(pos / 2) <= self.priority(pos))
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
