use chrono::Utc;
use std::time::Duration;

use crate::cache::keys::revoked_token_key;
use crate::cache::{CacheError, KeyValueCache};

/// 令牌吊销名单操作
pub struct TokenCacheOperations;

impl TokenCacheOperations {
    /// 吊销令牌，条目过期时间与令牌一致
    pub async fn revoke(
        cache: &dyn KeyValueCache,
        jti: &str,
        expires_at: i64,
    ) -> Result<(), CacheError> {
        let ttl = expires_at - Utc::now().timestamp();
        if ttl <= 0 {
            // 已过期的令牌本身就无法通过验证
            return Ok(());
        }

        cache
            .set(&revoked_token_key(jti), b"1", Duration::from_secs(ttl as u64))
            .await?;
        tracing::info!(jti, "revoked token");
        Ok(())
    }

    /// 缓存不可用时视为未吊销
    pub async fn is_revoked(cache: &dyn KeyValueCache, jti: &str) -> bool {
        match cache.get(&revoked_token_key(jti)).await {
            Ok(entry) => entry.is_some(),
            Err(e) => {
                tracing::warn!(jti, error = %e, "revocation lookup failed, allowing token");
                false
            }
        }
    }
}
