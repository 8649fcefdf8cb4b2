//! Bounded memoization for cursor and camera smoothing.
//!
//! Entries are evicted in insertion order. Reading an entry does not refresh
//! it, and overwriting an existing key keeps its original position.
//!
//! Keys carry only a timestamp and the spring parameters, never the project
//! or recording they were computed for. Whoever owns a cache must call
//! [`SmoothingCache::invalidate_all`] when the active project or recording
//! changes; [`EditorSession`](crate::session::EditorSession) does.

use std::collections::{HashMap, VecDeque};

use fc_timeline::SmoothedPoint;

/// Insertion-ordered cache of smoothed positions.
#[derive(Debug)]
pub struct SmoothingCache {
    entries: HashMap<String, SmoothedPoint>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SmoothingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<SmoothedPoint> {
        self.entries.get(key).copied()
    }

    /// Store `value` under `key`, evicting the oldest entry when full.
    pub fn set(&mut self, key: impl Into<String>, value: SmoothedPoint) {
        let key = key.into();
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return;
        }
        if self.capacity == 0 {
            return;
        }

        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    /// Cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` returning `None` stores nothing.
    pub fn get_or_insert_with(
        &mut self,
        key: String,
        compute: impl FnOnce() -> Option<SmoothedPoint>,
    ) -> Option<SmoothedPoint> {
        if let Some(hit) = self.get(&key) {
            return Some(hit);
        }
        let value = compute()?;
        self.set(key, value);
        Some(value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// The two smoothing caches an editor session keeps.
#[derive(Debug)]
pub struct SmoothingCaches {
    pub cursor: SmoothingCache,
    pub camera: SmoothingCache,
}

impl SmoothingCaches {
    pub fn new(capacity: usize) -> Self {
        Self {
            cursor: SmoothingCache::new(capacity),
            camera: SmoothingCache::new(capacity),
        }
    }

    pub fn invalidate_all(&mut self) {
        let dropped = self.cursor.len() + self.camera.len();
        self.cursor.invalidate_all();
        self.camera.invalidate_all();
        tracing::debug!(dropped, "Smoothing caches invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(v: f64) -> SmoothedPoint {
        SmoothedPoint { x: v, y: v }
    }

    #[test]
    fn evicts_exactly_the_oldest() {
        let mut cache = SmoothingCache::new(300);
        for i in 0..301 {
            cache.set(format!("k{i}"), point(i as f64));
        }
        assert_eq!(cache.len(), 300);
        assert!(cache.get("k0").is_none());
        for i in 1..301 {
            assert_eq!(cache.get(&format!("k{i}")), Some(point(i as f64)), "k{i}");
        }
    }

    #[test]
    fn reads_do_not_refresh_and_overwrite_keeps_position() {
        let mut cache = SmoothingCache::new(2);
        cache.set("a", point(1.0));
        cache.set("b", point(2.0));
        assert!(cache.get("a").is_some());
        cache.set("a", point(10.0));
        cache.set("c", point(3.0));

        // "a" was inserted first, so it goes despite the read and overwrite
        assert!(!cache.contains("a"));
        assert_eq!(cache.get("b"), Some(point(2.0)));
        assert_eq!(cache.get("c"), Some(point(3.0)));
    }

    #[test]
    fn get_or_insert_computes_once() {
        let mut cache = SmoothingCache::new(4);
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache.get_or_insert_with("k".to_string(), || {
                calls += 1;
                Some(point(0.5))
            });
            assert_eq!(v, Some(point(0.5)));
        }
        assert_eq!(calls, 1);

        assert!(cache.get_or_insert_with("none".to_string(), || None).is_none());
        assert!(!cache.contains("none"));
    }

    #[test]
    fn invalidate_clears_both() {
        let mut caches = SmoothingCaches::new(8);
        caches.cursor.set("x", point(1.0));
        caches.camera.set("y", point(2.0));
        caches.invalidate_all();
        assert!(caches.cursor.is_empty());
        assert!(caches.camera.is_empty());
        assert_eq!(caches.cursor.capacity(), 8);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = SmoothingCache::new(0);
        cache.set("a", point(1.0));
        assert!(cache.is_empty());
    }
}
