use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Younger than `stale_time`; use as-is.
    Fresh(V),
    /// Still cached but due for a refetch.
    Stale(V),
    Miss,
}

impl<V> Lookup<V> {
    pub fn value(self) -> Option<V> {
        match self {
            Lookup::Fresh(v) | Lookup::Stale(v) => Some(v),
            Lookup::Miss => None,
        }
    }
}

struct Slot<V> {
    value: V,
    fetched_at: Instant,
    last_used: Instant,
}

/// Keyed results with two clocks: `stale_time` measured from the fetch, and
/// `gc_time` measured from the last read or write.
pub struct QueryCache<K, V> {
    stale_time: Duration,
    gc_time: Duration,
    entries: HashMap<K, Slot<V>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            stale_time,
            gc_time,
            entries: HashMap::new(),
        }
    }

    /// Look up `key`, counting the read as activity.
    pub fn get(&mut self, key: &K) -> Lookup<V> {
        let now = Instant::now();
        self.evict_expired_at(now);
        let Some(slot) = self.entries.get_mut(key) else {
            return Lookup::Miss;
        };
        slot.last_used = now;
        if now.saturating_duration_since(slot.fetched_at) < self.stale_time {
            Lookup::Fresh(slot.value.clone())
        } else {
            Lookup::Stale(slot.value.clone())
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|s| now.saturating_duration_since(s.last_used) < self.gc_time)
    }

    pub fn insert(&mut self, key: K, value: V) {
        let now = Instant::now();
        self.entries.insert(
            key,
            Slot {
                value,
                fetched_at: now,
                last_used: now,
            },
        );
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry unused for `gc_time`. Returns how many were dropped.
    pub fn evict_expired(&mut self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    fn evict_expired_at(&mut self, now: Instant) -> usize {
        let gc_time = self.gc_time;
        let before = self.entries.len();
        self.entries.retain(|key, slot| {
            let keep = now.saturating_duration_since(slot.last_used) < gc_time;
            if !keep {
                debug!(?key, "evicting cached query");
            }
            keep
        });
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> QueryCache<&'static str, u32> {
        QueryCache::new(Duration::from_secs(300), Duration::from_secs(600))
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_then_stale() {
        let mut c = cache();
        c.insert("k", 1);
        assert_eq!(c.get(&"k"), Lookup::Fresh(1));
        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(c.get(&"k"), Lookup::Stale(1));
    }

    #[tokio::test(start_paused = true)]
    async fn evicted_after_inactivity() {
        let mut c = cache();
        c.insert("k", 1);
        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(c.contains(&"k"));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(c.get(&"k"), Lookup::Miss);
        assert_eq!(c.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reads_keep_an_entry_alive() {
        let mut c = cache();
        c.insert("k", 1);
        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(500)).await;
            assert!(matches!(c.get(&"k"), Lookup::Stale(1)));
        }
        assert_eq!(c.evict_expired(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forgets_key() {
        let mut c = cache();
        c.insert("k", 1);
        c.invalidate(&"k");
        assert_eq!(c.get(&"k").value(), None);
    }
}
