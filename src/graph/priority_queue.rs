//! Indexed binary min-heap.
//!
//! Positions are 1-based (`parent = pos / 2`, children `2 * pos` and
//! `2 * pos + 1`); position `p` lives at `heap[p - 1]`. A side map from data
//! to position makes `contains` O(1) and `update_priority` O(log n). Equal
//! priorities dequeue in insertion order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::RoutingError;

const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
struct HeapEntry<D, P> {
    data: D,
    priority: P,
    id: u64,
}

#[derive(Debug, Clone)]
pub struct IndexedPriorityQueue<D, P> {
    heap: Vec<HeapEntry<D, P>>,
    positions: HashMap<D, usize>,
    capacity: usize,
    next_id: u64,
}

impl<D, P> Default for IndexedPriorityQueue<D, P> {
    fn default() -> Self {
        Self {
            heap: Vec::with_capacity(DEFAULT_CAPACITY),
            positions: HashMap::new(),
            capacity: DEFAULT_CAPACITY,
            next_id: 0,
        }
    }
}

impl<D, P> IndexedPriorityQueue<D, P>
where
    D: Hash + Eq + Clone,
    P: PartialOrd,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Slots reserved for the heap. Doubles when full, halves once fewer than
    /// half are in use, never dropping below the initial size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn enqueue(&mut self, data: D, priority: P) -> Result<(), RoutingError> {
        if self.positions.contains_key(&data) {
            return Err(RoutingError::DuplicateQueueEntry);
        }
        if self.heap.len() >= self.capacity - 1 {
            self.capacity *= 2;
            self.heap.reserve_exact(self.capacity - self.heap.len());
        }

        let id = self.next_id;
        self.next_id += 1;
        self.heap.push(HeapEntry {
            data: data.clone(),
            priority,
            id,
        });
        let pos = self.heap.len();
        self.positions.insert(data, pos);
        self.sift_up(pos);
        Ok(())
    }

    /// Removes and returns the minimum, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<D> {
        if self.heap.is_empty() {
            return None;
        }
        if self.heap.len() < self.capacity / 2 && self.capacity / 2 >= DEFAULT_CAPACITY {
            self.capacity /= 2;
            self.heap.shrink_to(self.capacity);
        }

        let last = self.heap.len();
        self.swap(1, last);
        let entry = self.heap.pop()?;
        self.positions.remove(&entry.data);
        if !self.heap.is_empty() {
            self.sift_down(1);
        }
        Some(entry.data)
    }

    pub fn peek(&self) -> Option<&D> {
        self.heap.first().map(|entry| &entry.data)
    }

    pub fn priority(&self, data: &D) -> Option<&P> {
        self.positions
            .get(data)
            .map(|&pos| &self.heap[pos - 1].priority)
    }

    /// Moves `data` to match its new priority, up or down.
    pub fn update_priority(&mut self, data: &D, priority: P) -> Result<(), RoutingError> {
        let pos = *self
            .positions
            .get(data)
            .ok_or(RoutingError::UnknownQueueEntry)?;
        self.heap[pos - 1].priority = priority;
        if pos > 1 && self.outranks(pos, pos / 2) {
            self.sift_up(pos);
        } else {
            self.sift_down(pos);
        }
        Ok(())
    }

    pub fn contains(&self, data: &D) -> bool {
        self.positions.contains_key(data)
    }

    pub fn clear(&mut self) {
        self.heap = Vec::with_capacity(DEFAULT_CAPACITY);
        self.capacity = DEFAULT_CAPACITY;
        self.positions.clear();
    }

    /// Whether the entry at `a` dequeues before the entry at `b`.
    fn outranks(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.heap[a - 1], &self.heap[b - 1]);
        match a.priority.partial_cmp(&b.priority) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            Some(Ordering::Equal) | None => a.id < b.id,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a - 1, b - 1);
        for pos in [a, b] {
            if let Some(slot) = self.positions.get_mut(&self.heap[pos - 1].data) {
                *slot = pos;
            }
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 1 {
            let parent = pos / 2;
            if !self.outranks(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let count = self.heap.len();
        loop {
            let left = pos * 2;
            if left > count {
                break;
            }
            let right = left + 1;
            let child = if right <= count && self.outranks(right, left) {
                right
            } else {
                left
            };
            if !self.outranks(child, pos) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }
}
