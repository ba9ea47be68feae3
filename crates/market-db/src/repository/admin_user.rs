//! # Admin User Repository
//!
//! Credential storage for the admin surface. Passwords are stored as argon2
//! PHC strings and verified here, next to the queries they serve.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use market_core::AdminUser;

const ADMIN_COLUMNS: &str = "id, username, password_hash, is_active, created_at";

/// Repository for admin account operations.
#[derive(Debug, Clone)]
pub struct AdminUserRepository {
    pool: SqlitePool,
}

impl AdminUserRepository {
    /// Creates a new AdminUserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdminUserRepository { pool }
    }

    /// Finds an admin by username.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<AdminUser>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admin_users WHERE username = ?");
        let user = sqlx::query_as::<_, AdminUser>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Creates an admin account, hashing the password.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - username already taken
    pub async fn create(&self, username: &str, password: &str) -> DbResult<AdminUser> {
        debug!(username = %username, "Creating admin user");

        let password_hash = hash_password(password)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO admin_users (username, password_hash, is_active, created_at) \
             VALUES (?, ?, 1, ?)",
        )
        .bind(username)
        .bind(&password_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(username = %username, "Admin user created");

        Ok(AdminUser {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash,
            is_active: true,
            created_at: now,
        })
    }
}

// =============================================================================
// Password Hashing Helpers
// =============================================================================

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("hunter2").unwrap();

        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admins = db.admin_users();

        let created = admins.create("boss", "s3cret-password").await.unwrap();
        assert!(created.is_active);

        let found = admins.find_by_username("boss").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(verify_password("s3cret-password", &found.password_hash));

        assert!(admins.find_by_username("nobody").await.unwrap().is_none());

        // Duplicate username hits the UNIQUE constraint
        let err = admins.create("boss", "other").await.unwrap_err();
        assert!(err.is_unique_violation());
    }
}
