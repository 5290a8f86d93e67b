// 图书单条查询的旁路缓存
// 先查缓存，未命中再查主存储并按固定 TTL 回写；缓存的任何故障都视为未命中。
// 同一键上的并发未命中合并为一次主存储查询

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tokio::time::timeout;

use crate::cache::KeyValueCache;
use crate::cache::keys::book_key;
use crate::database::models::Book;
use crate::database::{BookStore, StoreError};

type Gates = HashMap<String, Arc<AsyncMutex<()>>>;

pub struct BookCache {
    store: Arc<dyn BookStore>,
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
    io_timeout: Duration,
    inflight: Mutex<Gates>,
}

/// 持有某个键的闸门；最后一个持有者离开时从表中移除
struct Flight<'a> {
    inflight: &'a Mutex<Gates>,
    key: &'a str,
    gate: Option<Arc<AsyncMutex<()>>>,
}

impl Flight<'_> {
    async fn wait(&self) -> Option<AsyncMutexGuard<'_, ()>> {
        Some(self.gate.as_deref()?.lock().await)
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut gates = lock(self.inflight);
        // 计数检查与释放都在表锁内完成：一份在表中，一份在这里
        if let Some(gate) = self.gate.take() {
            if Arc::strong_count(&gate) <= 2 {
                gates.remove(self.key);
            }
            drop(gate);
        }
    }
}

fn lock(inflight: &Mutex<Gates>) -> MutexGuard<'_, Gates> {
    inflight
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BookCache {
    pub fn new(
        store: Arc<dyn BookStore>,
        cache: Arc<dyn KeyValueCache>,
        ttl: Duration,
        io_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            ttl,
            io_timeout,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn fetch(&self, id: i64) -> Result<Book, StoreError> {
        let key = book_key(id);
        if let Some(book) = self.lookup(&key).await {
            return Ok(book);
        }

        let flight = self.join(&key);
        let _turn = flight.wait().await;

        // 等待期间其他请求可能已经写入缓存
        if let Some(book) = self.lookup(&key).await {
            return Ok(book);
        }

        let book = self.load(id).await?;
        self.populate(&key, &book).await;
        Ok(book)
    }

    /// Drops the cached snapshot. Failures are logged; the entry then lives
    /// out its TTL.
    pub async fn invalidate(&self, id: i64) {
        let key = book_key(id);
        match timeout(self.io_timeout, self.cache.delete(&key)).await {
            Ok(Ok(())) => tracing::debug!(key, "invalidated cache entry"),
            Ok(Err(e)) => tracing::warn!(key, error = %e, "failed to invalidate cache entry"),
            Err(_) => tracing::warn!(key, "cache invalidation timed out"),
        }
    }

    fn join<'a>(&'a self, key: &'a str) -> Flight<'a> {
        let gate = lock(&self.inflight)
            .entry(key.to_string())
            .or_default()
            .clone();
        Flight {
            inflight: &self.inflight,
            key,
            gate: Some(gate),
        }
    }

    async fn lookup(&self, key: &str) -> Option<Book> {
        let bytes = match timeout(self.io_timeout, self.cache.get(key)).await {
            Ok(Ok(Some(bytes))) => bytes,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                tracing::warn!(key, error = %e, "cache read failed, falling back to store");
                return None;
            }
            Err(_) => {
                tracing::warn!(key, "cache read timed out, falling back to store");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(book) => {
                tracing::debug!(key, "cache hit");
                Some(book)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    async fn load(&self, id: i64) -> Result<Book, StoreError> {
        match timeout(self.io_timeout, self.store.find_by_id(id)).await {
            Ok(Ok(Some(book))) => Ok(book),
            Ok(Ok(None)) => Err(StoreError::NotFound),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    async fn populate(&self, key: &str, book: &Book) {
        let bytes = match serde_json::to_vec(book) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize book snapshot");
                return;
            }
        };

        match timeout(self.io_timeout, self.cache.set(key, &bytes, self.ttl)).await {
            Ok(Ok(())) => tracing::debug!(key, ttl_secs = self.ttl.as_secs(), "cached book"),
            Ok(Err(e)) => tracing::warn!(key, error = %e, "failed to cache book"),
            Err(_) => tracing::warn!(key, "cache write timed out"),
        }
    }
}
