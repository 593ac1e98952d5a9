//! TTL memoization for report aggregates.
//!
//! Keys carry the full parameter tuple of an operation; expiry is checked at
//! lookup rather than evicted in the background, and the only invalidation is
//! wholesale.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::RwLock;

use newsdesk_core::{DateWindow, ReportFilters};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub person: Option<String>,
    pub section: Option<String>,
    pub country: Option<String>,
}

impl CacheKey {
    pub fn new(operation: impl Into<String>, window: &DateWindow, filters: &ReportFilters) -> Self {
        Self {
            operation: operation.into(),
            window_start: window.start(),
            window_end: window.end(),
            person: filters.person.clone(),
            section: filters.section.clone(),
            country: filters.country.clone(),
        }
    }
}

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

pub struct ReportCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ReportCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    /// Pull-based expiry: a stale entry is dropped at lookup time.
    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        None
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry { value, stored_at: Instant::now() });
    }

    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use serde_json::json;

    use newsdesk_core::{DateWindow, ReportFilters};

    use super::{CacheKey, ReportCache};

    fn key(operation: &str) -> CacheKey {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).expect("date");
        let end = NaiveDate::from_ymd_opt(2026, 3, 7).expect("date");
        let window = DateWindow::new(start, end).expect("window");
        CacheKey::new(operation, &window, &ReportFilters::default())
    }

    #[tokio::test]
    async fn hit_within_ttl_returns_the_stored_value() {
        let cache = ReportCache::new(Duration::from_secs(60));
        cache.insert(key("kpis"), json!({"sessions": 10})).await;

        let hit = cache.get(&key("kpis")).await;
        assert_eq!(hit, Some(json!({"sessions": 10})));
    }

    #[tokio::test]
    async fn expired_entry_is_dropped_at_lookup() {
        let cache = ReportCache::new(Duration::ZERO);
        cache.insert(key("kpis"), json!(1)).await;

        assert_eq!(cache.get(&key("kpis")).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn keys_separate_operations_and_filters() {
        let cache = ReportCache::new(Duration::from_secs(60));
        cache.insert(key("kpis"), json!(1)).await;

        assert_eq!(cache.get(&key("leaderboard")).await, None);

        let mut scoped = key("kpis");
        scoped.person = Some("alice@x".to_string());
        assert_eq!(cache.get(&scoped).await, None);
    }

    #[tokio::test]
    async fn invalidate_all_empties_the_cache() {
        let cache = ReportCache::new(Duration::from_secs(60));
        cache.insert(key("kpis"), json!(1)).await;
        cache.insert(key("sections"), json!(2)).await;

        cache.invalidate_all().await;
        assert_eq!(cache.len().await, 0);
    }
}
