use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::models::rate_limit::CachedRateLimit;
use crate::cache::store::{CounterStore, StoreError};
use crate::infrastructure::clock::Clock;

/// 进程内计数器存储，过期时间按注入的时钟判断
#[derive(Clone)]
pub struct MemoryCounterStore {
    entries: Arc<Mutex<HashMap<String, (CachedRateLimit, DateTime<Utc>)>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCounterStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }
}

impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<CachedRateLimit>, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;

        let expired = match entries.get(key) {
            Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: &CachedRateLimit,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), (value.clone(), expires_at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::MockClock;
    use chrono::TimeZone;

    fn store() -> (MemoryCounterStore, MockClock) {
        let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        (MemoryCounterStore::new(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (store, _) = store();
        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let (store, clock) = store();
        let value = CachedRateLimit::first("k", 60);

        store.set("k", &value, Duration::from_secs(60)).await.unwrap();
        clock.advance(chrono::Duration::seconds(59));
        assert_eq!(store.get("k").await.unwrap(), Some(value));

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_value_and_ttl() {
        let (store, clock) = store();
        let first = CachedRateLimit::first("k", 60);
        store.set("k", &first, Duration::from_secs(10)).await.unwrap();

        let second = first.incremented();
        store.set("k", &second, Duration::from_secs(30)).await.unwrap();
        clock.advance(chrono::Duration::seconds(20));

        let stored = store.get("k").await.unwrap().unwrap();
        assert_eq!(stored.count, 2);
        assert_eq!(stored.reset_at, 60);
    }
}
