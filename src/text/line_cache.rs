//! # Line Cache
//!
//! Bounded memo of decoded lines. Like the block cache, entries leave in the
//! order they arrived: a hit does not move a line back in the queue.
//!
//! Insertion can be suppressed for the duration of a bulk read so that
//! materializing every line of a large file does not churn the cache.

use std::collections::VecDeque;

use hashbrown::HashMap;

#[derive(Debug, Clone)]
pub struct LineCache {
    lines: HashMap<u64, String>,
    history: VecDeque<u64>,
    capacity: usize,
    suppressed: bool,
    hits: u64,
    misses: u64,
}

impl LineCache {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: HashMap::with_capacity(capacity),
            history: VecDeque::with_capacity(capacity),
            capacity,
            suppressed: false,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, line: u64) -> Option<&str> {
        match self.lines.get(&line) {
            Some(text) => {
                self.hits += 1;
                Some(text.as_str())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, line: u64) -> bool {
        self.lines.contains_key(&line)
    }

    /// Records a decoded line, evicting the oldest entry when full. Ignored
    /// while suppressed.
    pub fn insert(&mut self, line: u64, text: String) {
        if self.suppressed || self.capacity == 0 {
            return;
        }

        if let Some(existing) = self.lines.get_mut(&line) {
            *existing = text;
            return;
        }

        if self.history.len() >= self.capacity {
            if let Some(oldest) = self.history.pop_front() {
                self.lines.remove(&oldest);
            }
        }

        self.history.push_back(line);
        self.lines.insert(line, text);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Cached line numbers, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u64> + '_ {
        self.history.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_insert() {
        let mut cache = LineCache::new(4);

        cache.insert(3, "three".to_string());

        assert_eq!(cache.get(3), Some("three"));
        assert_eq!(cache.get(4), None);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn evicts_oldest_insert_not_oldest_access() {
        let mut cache = LineCache::new(2);

        cache.insert(0, "a".to_string());
        cache.insert(1, "b".to_string());
        cache.get(0);
        cache.insert(2, "c".to_string());

        assert!(!cache.contains(0));
        assert!(cache.contains(1));
        assert!(cache.contains(2));
        assert_eq!(cache.history().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn suppressed_insert_is_ignored() {
        let mut cache = LineCache::new(2);

        cache.set_suppressed(true);
        cache.insert(0, "a".to_string());
        cache.set_suppressed(false);

        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_never_stores() {
        let mut cache = LineCache::new(0);

        cache.insert(0, "a".to_string());

        assert!(cache.is_empty());
    }

    #[test]
    fn reinsert_does_not_duplicate_history() {
        let mut cache = LineCache::new(2);

        cache.insert(5, "x".to_string());
        cache.insert(5, "y".to_string());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.history().count(), 1);
        assert_eq!(cache.get(5), Some("y"));
    }

    #[test]
    fn clear_empties_history() {
        let mut cache = LineCache::new(3);
        cache.insert(0, "a".to_string());
        cache.insert(1, "b".to_string());

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.history().count(), 0);
    }
}
