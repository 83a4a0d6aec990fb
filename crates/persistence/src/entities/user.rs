//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{AdminUserItem, User, UserRole};
use sqlx::FromRow;
use uuid::Uuid;

use super::organization::JoinRequestStatusDb;

/// Database enum for account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Donor,
    Organization,
    Admin,
}

impl From<UserRoleDb> for UserRole {
    fn from(role: UserRoleDb) -> Self {
        match role {
            UserRoleDb::Donor => UserRole::Donor,
            UserRoleDb::Organization => UserRole::Organization,
            UserRoleDb::Admin => UserRole::Admin,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Donor => UserRoleDb::Donor,
            UserRole::Organization => UserRoleDb::Organization,
            UserRole::Admin => UserRoleDb::Admin,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRoleDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            password_hash: entity.password_hash,
            name: entity.name,
            nickname: entity.nickname,
            email: entity.email,
            phone: entity.phone,
            address: entity.address,
            role: entity.role.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// User row joined with the organization review state, for the member list.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUserEntity {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRoleDb,
    pub organization_status: Option<JoinRequestStatusDb>,
    pub created_at: DateTime<Utc>,
}

impl From<AdminUserEntity> for AdminUserItem {
    fn from(entity: AdminUserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            name: entity.name,
            nickname: entity.nickname,
            email: entity.email,
            phone: entity.phone,
            role: entity.role.into(),
            organization_status: entity.organization_status.map(Into::into),
            created_at: entity.created_at,
        }
    }
}
