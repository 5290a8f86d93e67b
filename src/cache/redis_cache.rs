use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::{CacheError, KeyValueCache};

/// Redis 缓存实现
#[derive(Clone)]
pub struct RedisCache {
    redis: Arc<RedisClient>,
}

impl RedisCache {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        // Redis 的 SETEX 不接受 0 秒
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn incr(&self, key: &str, window: Duration) -> Result<u64, CacheError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let (count,): (u64,) = counter_pipeline(key, window).query_async(&mut conn).await?;
        Ok(count)
    }
}

/// 固定窗口计数器：MULTI 中先 SET NX EX 建立带过期时间的键，再 INCR。
/// 两条命令原子执行，计数键不会丢失 TTL。
fn counter_pipeline(key: &str, window: Duration) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window.as_secs().max(1))
        .arg("NX")
        .ignore()
        .incr(key, 1);
    pipe
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(pipe: &redis::Pipeline) -> String {
        String::from_utf8_lossy(&pipe.get_packed_pipeline()).into_owned()
    }

    #[test]
    fn counter_sets_expiry_and_increments_in_one_transaction() {
        let wire = packed(&counter_pipeline("rate_limit:10.0.0.1", Duration::from_secs(60)));

        let multi = wire.find("MULTI").unwrap();
        let set = wire.find("SET").unwrap();
        let incr = wire.find("INCR").unwrap();
        let exec = wire.find("EXEC").unwrap();
        assert!(multi < set && set < incr && incr < exec);
        assert!(wire.contains("\r\nEX\r\n$2\r\n60\r\n$2\r\nNX\r\n"));
    }

    #[test]
    fn zero_window_still_expires() {
        let wire = packed(&counter_pipeline("rate_limit:ip", Duration::ZERO));
        assert!(wire.contains("\r\nEX\r\n$1\r\n1\r\n"));
    }
}
