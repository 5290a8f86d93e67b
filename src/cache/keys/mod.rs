/// 缓存键模块
/// 提供各种缓存键生成函数

/// 图书快照缓存键前缀
const BOOK_PREFIX: &str = "book:";

/// 已吊销令牌键前缀
const REVOKED_TOKEN_PREFIX: &str = "revoked:";

/// 限流计数器键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

pub fn book_key(id: i64) -> String {
    format!("{}{}", BOOK_PREFIX, id)
}

pub fn revoked_token_key(jti: &str) -> String {
    format!("{}{}", REVOKED_TOKEN_PREFIX, jti)
}

pub fn rate_limit_key(client: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, client)
}
