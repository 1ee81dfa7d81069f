// 缓存模块
// 包含限流计数器的数据结构、存储接口及 Redis / 内存两种实现

pub mod keys;
pub mod models;
pub mod operations;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use models::CachedRateLimit;
pub use operations::{MemoryCounterStore, RedisCounterStore};
pub use store::{CounterBackend, CounterStore, StoreError};
