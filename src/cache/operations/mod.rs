/// 缓存操作
/// 提供基于键值缓存的业务操作

// 图书读穿透缓存
pub mod book;

// 令牌吊销名单
pub mod token;

pub use book::BookCache;
pub use token::TokenCacheOperations;
