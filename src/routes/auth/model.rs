use serde::{Deserialize, Serialize};

use crate::database::models::{Role, User};

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    /// 用户名只允许字母、数字和下划线，密码不能超过 bcrypt 的 72 字节上限
    pub fn validate(&self) -> Result<(), String> {
        let len = self.username.chars().count();
        if !(3..=32).contains(&len) {
            return Err("Username must be between 3 and 32 characters".into());
        }
        if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err("Username may only contain letters, digits and underscores".into());
        }
        if self.password.is_empty() || self.password.len() > 72 {
            return Err("Password must be between 1 and 72 bytes".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn validates_username_and_password() {
        assert!(request("alice", "pw123").validate().is_ok());
        assert!(request("al", "pw123").validate().is_err());
        assert!(request("alice smith", "pw123").validate().is_err());
        assert!(request("alice", "").validate().is_err());
        assert!(request("alice", &"x".repeat(73)).validate().is_err());
    }
}
