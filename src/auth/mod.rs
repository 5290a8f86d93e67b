// 认证模块
// 密码哈希与令牌签发

pub mod password;
pub mod token;

pub use password::{BootstrapError, ensure_admin, hash_password, verify_password};
pub use token::{Claims, TokenError, TokenKind, TokenPair, TokenService};
