use bcrypt::{hash, verify};
use thiserror::Error;

use crate::database::models::user::{NewUser, Role};
use crate::database::{StoreError, UserStore};

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to hash admin password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 启动时确保管理员账号存在，已存在时不做任何修改
pub async fn ensure_admin(
    users: &dyn UserStore,
    username: &str,
    password: &str,
    cost: u32,
) -> Result<(), BootstrapError> {
    let password_hash = hash_password(password, cost)?;

    match users
        .insert(NewUser {
            username: username.to_string(),
            password_hash,
            role: Role::Admin,
        })
        .await
    {
        Ok(user) => {
            tracing::info!(username = %user.username, "bootstrapped admin account");
            Ok(())
        }
        Err(StoreError::Conflict(_)) => {
            tracing::debug!(username, "admin account already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryUserStore;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let first = hash_password("pw123", 4).unwrap();
        let second = hash_password("pw123", 4).unwrap();

        assert_ne!(first, "pw123");
        assert_ne!(first, second);
        assert!(verify_password("pw123", &first).unwrap());
        assert!(!verify_password("pw124", &first).unwrap());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let users = MemoryUserStore::new();

        ensure_admin(&users, "root", "secret", 4).await.unwrap();
        ensure_admin(&users, "root", "other", 4).await.unwrap();

        let admin = users.find_by_username("root").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("secret", &admin.password_hash).unwrap());
    }
}
