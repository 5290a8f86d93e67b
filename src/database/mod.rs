// 数据库模块
// 包含实体定义、存储接口以及 Postgres / 内存两种实现

pub mod memory;
pub mod models;
pub mod repositories;

use async_trait::async_trait;
use thiserror::Error;

use models::{Book, BookChanges, NewBook, NewUser, User};

pub use memory::{MemoryBookStore, MemoryUserStore};
pub use repositories::{PgBookStore, PgUserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("store call timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 用户凭据存储
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// 用户名重复时返回 `StoreError::Conflict`
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

/// 图书主存储
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, StoreError>;

    async fn list(&self) -> Result<Vec<Book>, StoreError>;

    async fn insert(&self, book: NewBook) -> Result<Book, StoreError>;

    async fn update(&self, id: i64, changes: BookChanges) -> Result<Book, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
