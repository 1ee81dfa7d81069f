/// 计数器存储的具体实现
pub mod memory;
pub mod rate_limit;

pub use memory::MemoryCounterStore;
pub use rate_limit::RedisCounterStore;
