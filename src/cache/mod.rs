// 缓存模块
// 包含键值缓存接口、Redis / 内存实现以及基于缓存的业务操作

pub mod keys;
pub mod memory;
pub mod operations;
pub mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryCache;
pub use operations::{BookCache, TokenCacheOperations};
pub use redis_cache::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache call timed out")]
    Timeout,
}

/// 键值缓存
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// 计数器自增，首次创建时设置过期时间，返回自增后的值
    async fn incr(&self, key: &str, window: Duration) -> Result<u64, CacheError>;
}
