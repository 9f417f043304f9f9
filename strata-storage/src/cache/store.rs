//! Cache store contract and the sharded in-memory implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use strata_core::CachedRow;

/// Cumulative cache counters. Reset together with the row map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of cache puts.
    pub puts: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// View of one key's row inside a critical section.
///
/// The closure passed to [`CacheStore::with_write_lock`] re-reads through
/// this handle (without touching the hit/miss counters) and stages at most
/// one replacement or removal; the store publishes the staged change after
/// the closure returns, still under the key's lock. If the closure panics
/// the staged change is discarded.
pub struct RowSlot {
    current: Option<Arc<CachedRow>>,
    staged: Option<StagedWrite>,
}

enum StagedWrite {
    Replace(CachedRow),
    Remove,
}

impl RowSlot {
    pub fn new(current: Option<Arc<CachedRow>>) -> Self {
        Self {
            current,
            staged: None,
        }
    }

    /// The row as the critical section currently sees it: the staged value
    /// if one was set, otherwise the snapshot taken under the lock.
    pub fn row(&self) -> Option<&CachedRow> {
        match &self.staged {
            Some(StagedWrite::Replace(row)) => Some(row),
            Some(StagedWrite::Remove) => None,
            None => self.current.as_deref(),
        }
    }

    /// Stage a full replacement for the row.
    pub fn replace(&mut self, row: CachedRow) {
        self.staged = Some(StagedWrite::Replace(row));
    }

    /// Stage removal of the row.
    pub fn remove(&mut self) {
        self.staged = Some(StagedWrite::Remove);
    }

    fn into_staged(self) -> Option<StagedWrite> {
        self.staged
    }
}

/// Capability contract for cache backends.
///
/// Locking is per-key, not global: operations on different keys never block
/// each other. Locks are not reentrant; a caller holding a key's lock must
/// not re-enter [`CacheStore::with_write_lock`] for the same key on the same
/// thread. Backends are swappable without touching the merge engine or the
/// coordinator.
pub trait CacheStore: Send + Sync + 'static {
    /// Lock-free snapshot of the row. Records a hit when present and a miss
    /// when absent.
    fn get(&self, key: &str) -> Option<Arc<CachedRow>>;

    /// Unconditionally replace the row under the key's exclusive lock.
    /// Records a put.
    fn put(&self, key: &str, row: CachedRow);

    /// Lock-free presence check. No counter side effects.
    fn contains(&self, key: &str) -> bool;

    /// Run `f` under the key's exclusive lock.
    ///
    /// The lock is released on every exit path, including a panicking `f`;
    /// no raw acquire/release pair is exposed across a component boundary.
    /// Blocks without timeout until the lock is free.
    fn with_write_lock<T, F>(&self, key: &str, f: F) -> T
    where
        F: FnOnce(&mut RowSlot) -> T;

    fn hits(&self) -> u64;

    fn misses(&self) -> u64;

    fn puts(&self) -> u64;

    /// Clear all rows and zero all counters together.
    fn reset_cache(&self);

    /// Snapshot of the cumulative counters.
    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits(),
            misses: self.misses(),
            puts: self.puts(),
        }
    }
}

/// In-process cache store: a sharded concurrent row map plus a per-key lock
/// registry and atomic counters.
///
/// Rows are stored behind `Arc` and replaced whole on every write, so
/// readers racing an in-flight update observe either the old or the new
/// snapshot. Size is unbounded; a bounding backend can implement
/// [`CacheStore`] without changing callers.
pub struct ShardedRowCache {
    rows: DashMap<String, Arc<CachedRow>>,
    // The registry outlives reset_cache on purpose: a lock held across a
    // reset must keep serializing later writers of the same key.
    key_locks: DashMap<String, Arc<Mutex<()>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
}

impl ShardedRowCache {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            key_locks: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            puts: AtomicU64::new(0),
        }
    }

    /// Number of rows currently cached.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        // Clone the Arc out so the map shard is not held while blocking on
        // the key lock.
        self.key_locks
            .entry(key.to_string())
            .or_default()
            .value()
            .clone()
    }
}

impl Default for ShardedRowCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for ShardedRowCache {
    fn get(&self, key: &str) -> Option<Arc<CachedRow>> {
        match self.rows.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: &str, row: CachedRow) {
        let lock = self.key_lock(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.rows.insert(key.to_string(), Arc::new(row));
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    fn with_write_lock<T, F>(&self, key: &str, f: F) -> T
    where
        F: FnOnce(&mut RowSlot) -> T,
    {
        let lock = self.key_lock(key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.rows.get(key).map(|entry| Arc::clone(entry.value()));
        let mut slot = RowSlot::new(current);
        let out = f(&mut slot);

        match slot.into_staged() {
            Some(StagedWrite::Replace(row)) => {
                self.rows.insert(key.to_string(), Arc::new(row));
            }
            Some(StagedWrite::Remove) => {
                self.rows.remove(key);
            }
            None => {}
        }
        out
    }

    fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn puts(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    fn reset_cache(&self) {
        self.rows.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.puts.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::CachedColumn;

    fn row(name: &str, value: &str, ts: i64) -> CachedRow {
        let mut row = CachedRow::new();
        row.insert(name.to_string(), CachedColumn::new(name, value, ts));
        row
    }

    #[test]
    fn test_get_records_hit_and_miss() {
        let cache = ShardedRowCache::new();
        assert!(cache.get("123").is_none());
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);

        cache.put("123", row("cached", "yes", 1));
        assert!(cache.get("123").is_some());
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.puts(), 1);
    }

    #[test]
    fn test_contains_has_no_counter_side_effects() {
        let cache = ShardedRowCache::new();
        assert!(!cache.contains("123"));
        cache.put("123", row("cached", "yes", 1));
        assert!(cache.contains("123"));
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 0);
    }

    #[test]
    fn test_put_overwrites_unconditionally() {
        let cache = ShardedRowCache::new();
        cache.put("123", row("cached", "yes", 10));
        // Older timestamp still wins on an explicit put.
        cache.put("123", row("cached", "no", 1));

        let current = cache.get("123").unwrap();
        assert_eq!(current["cached"].data, "no".into());
        assert_eq!(cache.puts(), 2);
    }

    #[test]
    fn test_reset_clears_rows_and_counters() {
        let cache = ShardedRowCache::new();
        cache.put("123", row("cached", "yes", 1));
        cache.get("123");
        cache.get("456");

        cache.reset_cache();
        assert!(cache.is_empty());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 0,
                misses: 0,
                puts: 0
            }
        );
    }

    #[test]
    fn test_with_write_lock_reads_do_not_count() {
        let cache = ShardedRowCache::new();
        cache.put("123", row("cached", "yes", 1));

        cache.with_write_lock("123", |slot| {
            assert!(slot.row().is_some());
        });
        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 0);
    }

    #[test]
    fn test_with_write_lock_stages_replace() {
        let cache = ShardedRowCache::new();
        cache.put("123", row("cached", "yes", 1));

        cache.with_write_lock("123", |slot| {
            let mut next = slot.row().unwrap().clone();
            next.insert("count".to_string(), CachedColumn::new("count", 2i64, 1));
            slot.replace(next);
            // The staged view is what subsequent reads in the section see.
            assert!(slot.row().unwrap().contains_key("count"));
        });

        let current = cache.get("123").unwrap();
        assert!(current.contains_key("count"));
        // Staged publication is not a put.
        assert_eq!(cache.puts(), 1);
    }

    #[test]
    fn test_with_write_lock_stages_remove() {
        let cache = ShardedRowCache::new();
        cache.put("123", row("cached", "yes", 1));

        cache.with_write_lock("123", |slot| slot.remove());
        assert!(!cache.contains("123"));
    }

    #[test]
    fn test_with_write_lock_absent_key() {
        let cache = ShardedRowCache::new();
        let seen = cache.with_write_lock("ghost", |slot| slot.row().cloned());
        assert!(seen.is_none());
        assert!(!cache.contains("ghost"));
    }

    #[test]
    fn test_lock_released_after_panic() {
        let cache = Arc::new(ShardedRowCache::new());
        cache.put("123", row("cached", "yes", 1));

        let panicking = Arc::clone(&cache);
        let result = std::thread::spawn(move || {
            panicking.with_write_lock("123", |_slot| panic!("boom"));
        })
        .join();
        assert!(result.is_err());

        // The key is still usable and the panicked section published nothing.
        cache.with_write_lock("123", |slot| {
            assert_eq!(slot.row().unwrap()["cached"].data, "yes".into());
        });
    }

    #[test]
    fn test_different_keys_do_not_block() {
        let cache = Arc::new(ShardedRowCache::new());
        cache.put("a", row("cached", "yes", 1));
        cache.put("b", row("cached", "yes", 1));

        // Hold a's lock while writing b from another thread.
        let other = Arc::clone(&cache);
        cache.with_write_lock("a", |_slot| {
            let handle = std::thread::spawn(move || {
                other.put("b", row("cached", "no", 2));
            });
            handle.join().unwrap();
        });

        assert_eq!(cache.get("b").unwrap()["cached"].data, "no".into());
    }

    // Interleaving puts and locked updates on one key must never publish a
    // torn row: both writers keep the two columns identical, so any snapshot
    // ever observed has x == y.
    #[test]
    fn test_per_key_critical_sections_serialize() {
        let cache = Arc::new(ShardedRowCache::new());

        let two_columns = |value: &str, ts: i64| {
            let mut row = CachedRow::new();
            row.insert("x".to_string(), CachedColumn::new("x", value, ts));
            row.insert("y".to_string(), CachedColumn::new("y", value, ts));
            row
        };
        cache.put("123", two_columns("seed", 0));

        std::thread::scope(|scope| {
            let putter = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..500i64 {
                    putter.put("123", two_columns(&format!("put-{}", i), i));
                }
            });

            let merger = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..500i64 {
                    merger.with_write_lock("123", |slot| {
                        let mut next = slot.row().unwrap().clone();
                        let value = format!("merge-{}", i);
                        for name in ["x", "y"] {
                            next.insert(
                                name.to_string(),
                                CachedColumn::new(name, value.as_str(), i),
                            );
                        }
                        slot.replace(next);
                    });
                }
            });

            let reader = Arc::clone(&cache);
            scope.spawn(move || {
                for _ in 0..2000 {
                    if let Some(snapshot) = reader.get("123") {
                        assert_eq!(snapshot["x"].data, snapshot["y"].data);
                    }
                }
            });
        });

        let last = cache.get("123").unwrap();
        assert_eq!(last["x"].data, last["y"].data);
    }
}
