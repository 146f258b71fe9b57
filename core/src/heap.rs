//! Indexed binary min-heap.
//!
//! Elements are dense `usize` ids. Next to the array-backed tree the heap
//! keeps an id → position table, rewritten on every move, so an element whose
//! score changed is located in O(1) and re-sifted in O(log n).
//!
//! Scores are not stored. Each reordering operation takes a `score` function
//! instead, which lets the caller own the data scores are derived from and
//! mutate it between heap calls (the search engine lowers `f` in its state
//! table, then calls [`IndexedMinHeap::rescore`]).

use std::cmp::Ordering;

/// Position-table marker for ids that are not currently queued.
const ABSENT: usize = usize::MAX;

#[derive(Debug, Clone, Default)]
pub struct IndexedMinHeap {
    /// Element ids in heap order; `items[0]` has the lowest score.
    items: Vec<usize>,
    /// `positions[id]` is the index of `id` in `items`, or `ABSENT`.
    positions: Vec<usize>,
}

impl IndexedMinHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for ids in `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.position(id).is_some()
    }

    /// Current index of `id` in the backing array.
    pub fn position(&self, id: usize) -> Option<usize> {
        self.positions.get(id).copied().filter(|&pos| pos != ABSENT)
    }

    /// The id with the lowest score, without removing it.
    pub fn peek(&self) -> Option<usize> {
        self.items.first().copied()
    }

    pub fn clear(&mut self) {
        for &id in &self.items {
            self.positions[id] = ABSENT;
        }
        self.items.clear();
    }

    /// Insert `id` and sift it up past every parent that scores strictly higher.
    ///
    /// Equal scores never swap, so among ties the earlier-inserted element
    /// stays closer to the root.
    pub fn push<K, F>(&mut self, id: usize, score: F)
    where
        K: PartialOrd,
        F: Fn(usize) -> K,
    {
        debug_assert!(!self.contains(id), "element {id} is already queued");
        if id >= self.positions.len() {
            self.positions.resize(id + 1, ABSENT);
        }
        let idx = self.items.len();
        self.items.push(id);
        self.positions[id] = idx;
        self.sift_up(idx, &score);
    }

    /// Remove and return the id with the lowest score.
    ///
    /// The last element takes the root's place and sinks toward the leaves,
    /// swapping with its smaller child while that child scores strictly lower.
    pub fn pop_min<K, F>(&mut self, score: F) -> Option<usize>
    where
        K: PartialOrd,
        F: Fn(usize) -> K,
    {
        let last = self.items.pop()?;
        self.positions[last] = ABSENT;
        if self.items.is_empty() {
            return Some(last);
        }

        let min = self.items[0];
        self.positions[min] = ABSENT;
        self.set(0, last);
        self.sift_down(0, &score);
        Some(min)
    }

    /// Restore heap order after the score of a queued `id` changed.
    ///
    /// Decreases move the element toward the root. If it did not move up, it
    /// is sifted down, which covers increases.
    ///
    /// `id` must be queued (see [`contains`](Self::contains)). Rescoring an id
    /// that is not queued panics in debug builds and is a no-op in release
    /// builds, leaving the heap unchanged.
    pub fn rescore<K, F>(&mut self, id: usize, score: F)
    where
        K: PartialOrd,
        F: Fn(usize) -> K,
    {
        debug_assert!(self.contains(id), "element {id} is not queued");
        let Some(idx) = self.position(id) else {
            return;
        };
        if self.sift_up(idx, &score) == idx {
            self.sift_down(idx, &score);
        }
    }

    /// Returns the index the element settled at.
    fn sift_up<K, F>(&mut self, mut idx: usize, score: &F) -> usize
    where
        K: PartialOrd,
        F: Fn(usize) -> K,
    {
        let id = self.items[idx];
        let key = score(id);

        while idx > 0 {
            let parent_idx = (idx - 1) / 2;
            let parent = self.items[parent_idx];
            if key.partial_cmp(&score(parent)) != Some(Ordering::Less) {
                break;
            }
            self.set(idx, parent);
            idx = parent_idx;
        }

        self.set(idx, id);
        idx
    }

    fn sift_down<K, F>(&mut self, mut idx: usize, score: &F)
    where
        K: PartialOrd,
        F: Fn(usize) -> K,
    {
        let len = self.items.len();
        let id = self.items[idx];
        let key = score(id);

        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;

            let mut child = left;
            let mut child_key = score(self.items[left]);
            if right < len {
                let right_key = score(self.items[right]);
                if right_key.partial_cmp(&child_key) == Some(Ordering::Less) {
                    child = right;
                    child_key = right_key;
                }
            }

            if child_key.partial_cmp(&key) != Some(Ordering::Less) {
                break;
            }
            self.set(idx, self.items[child]);
            idx = child;
        }

        self.set(idx, id);
    }

    #[inline]
    fn set(&mut self, idx: usize, id: usize) {
        self.items[idx] = id;
        self.positions[id] = idx;
    }
}
