//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AdminUserEntity, UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

/// Fields for a new account.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub nickname: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub role: UserRoleDb,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, password_hash, name, nickname, email, phone, address, role,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by login name.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_username");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, password_hash, name, nickname, email, phone, address, role,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a new account. A duplicate username surfaces as a unique violation.
    pub async fn create(&self, user: &NewUser<'_>) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (username, password_hash, name, nickname, email, phone, address, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, username, password_hash, name, nickname, email, phone, address, role,
                      created_at, updated_at
            "#,
        )
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.name)
        .bind(user.nickname)
        .bind(user.email)
        .bind(user.phone)
        .bind(user.address)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates the bootstrap admin account unless the username is taken.
    ///
    /// Returns true when an account was created.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("ensure_admin_user");
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, name, role)
            VALUES ($1, $2, '관리자', 'admin')
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// List members for the admin screen, newest first.
    pub async fn list_for_admin(&self) -> Result<Vec<AdminUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users_for_admin");
        let result = sqlx::query_as::<_, AdminUserEntity>(
            r#"
            SELECT u.id, u.username, u.name, u.nickname, u.email, u.phone, u.role,
                   o.status AS organization_status, u.created_at
            FROM users u
            LEFT JOIN organizations o ON o.user_id = u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an account. Returns false when no such user exists.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
