use std::future::Future;
use std::time::Duration;

use super::models::CachedRateLimit;
use super::operations::{MemoryCounterStore, RedisCounterStore};

/// 计数器存储错误
#[derive(Debug)]
pub enum StoreError {
    Redis(redis::RedisError),
    Serialization(serde_json::Error),
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Redis(e) => write!(f, "Redis error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::Poisoned => write!(f, "Counter store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Redis(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

/// 带过期时间的键值存储，只用于限流计数
///
/// 读写之间没有原子性保证，并发请求可能少计或多计。
pub trait CounterStore: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<CachedRateLimit>, StoreError>> + Send;

    fn set(
        &self,
        key: &str,
        value: &CachedRateLimit,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// 启动时根据配置选择的存储实现
#[derive(Clone)]
pub enum CounterBackend {
    Redis(RedisCounterStore),
    Memory(MemoryCounterStore),
}

impl CounterStore for CounterBackend {
    async fn get(&self, key: &str) -> Result<Option<CachedRateLimit>, StoreError> {
        match self {
            CounterBackend::Redis(store) => store.get(key).await,
            CounterBackend::Memory(store) => store.get(key).await,
        }
    }

    async fn set(
        &self,
        key: &str,
        value: &CachedRateLimit,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        match self {
            CounterBackend::Redis(store) => store.set(key, value, ttl).await,
            CounterBackend::Memory(store) => store.set(key, value, ttl).await,
        }
    }
}
