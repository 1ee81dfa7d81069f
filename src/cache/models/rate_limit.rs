use serde::{Deserialize, Serialize};

/// 速率限制缓存数据模型
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CachedRateLimit {
    pub key: String,
    pub count: u32,
    pub reset_at: i64, // Unix timestamp
}

impl CachedRateLimit {
    /// 窗口内的第一次请求
    pub fn first(key: &str, reset_at: i64) -> Self {
        Self {
            key: key.to_string(),
            count: 1,
            reset_at,
        }
    }

    /// 计数加一，窗口结束时间不变
    pub fn incremented(&self) -> Self {
        Self {
            key: self.key.clone(),
            count: self.count.saturating_add(1),
            reset_at: self.reset_at,
        }
    }
}
