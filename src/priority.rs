// Bucket priority queue for small integer priorities
//
// A sparse array of LIFO stacks indexed by priority plus an ordered set of the
// occupied priorities. Push is O(1), pop reads the lowest occupied bucket.

use std::collections::BTreeSet;

/// What happens when an item is pushed into a bucket that already holds it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Every push lands in the bucket
    Allow,
    /// A push of an item already waiting at the same priority is a no-op
    Suppress,
}

#[derive(Debug, Clone)]
pub struct PriorityQueue<T> {
    buckets: Vec<Vec<T>>,
    // Invariant: contains p iff buckets[p] is non-empty
    occupied: BTreeSet<usize>,
    policy: DuplicatePolicy,
    len: usize,
}

impl<T: PartialEq> PriorityQueue<T> {
    pub fn new(policy: DuplicatePolicy) -> Self {
        PriorityQueue {
            buckets: Vec::new(),
            occupied: BTreeSet::new(),
            policy,
            len: 0,
        }
    }

    /// Inserts `item` at `priority`. Returns false when suppressed as a duplicate.
    pub fn push(&mut self, priority: usize, item: T) -> bool {
        if priority >= self.buckets.len() {
            self.buckets.resize_with(priority + 1, Vec::new);
        }
        let bucket = &mut self.buckets[priority];
        if self.policy == DuplicatePolicy::Suppress && bucket.contains(&item) {
            return false;
        }
        bucket.push(item);
        self.occupied.insert(priority);
        self.len += 1;
        true
    }

    /// Removes the most recently pushed item of the lowest occupied priority
    pub fn pop(&mut self) -> Option<T> {
        self.pop_with_priority().map(|(_, item)| item)
    }

    pub fn pop_with_priority(&mut self) -> Option<(usize, T)> {
        let lowest = *self.occupied.iter().next()?;
        let bucket = &mut self.buckets[lowest];
        let item = bucket.pop()?;
        if bucket.is_empty() {
            self.occupied.remove(&lowest);
        }
        self.len -= 1;
        Some((lowest, item))
    }

    pub fn min_priority(&self) -> Option<usize> {
        self.occupied.iter().next().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}
