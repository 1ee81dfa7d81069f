use std::sync::Arc;
use std::time::Duration;

use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::rate_limit_key;
use crate::cache::models::rate_limit::CachedRateLimit;
use crate::cache::store::{CounterStore, StoreError};

/// 基于 Redis 的限流计数器存储
#[derive(Clone)]
pub struct RedisCounterStore {
    redis: Arc<RedisClient>,
}

impl RedisCounterStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

impl CounterStore for RedisCounterStore {
    /// 获取速率限制计数
    async fn get(&self, key: &str) -> Result<Option<CachedRateLimit>, StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(rate_limit_key(key)).await?;

        match result {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// 写入计数，过期时间由 Redis 负责
    async fn set(
        &self,
        key: &str,
        value: &CachedRateLimit,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(value)?;
        let _: () = conn
            .set_ex(rate_limit_key(key), json, ttl.as_secs().max(1))
            .await?;

        Ok(())
    }
}
