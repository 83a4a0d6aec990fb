//! Member accounts and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::{validate_not_blank, validate_phone, validate_username};

use super::organization::JoinRequestStatus;

/// Account role, carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Donor,
    Organization,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Donor => "DONOR",
            UserRole::Organization => "ORGANIZATION",
            UserRole::Admin => "ADMIN",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DONOR" | "USER" => Ok(UserRole::Donor),
            "ORGANIZATION" | "ORGAN" => Ok(UserRole::Organization),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A member account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Donor signup form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    pub password: String,

    #[validate(length(min = 1, max = 50, message = "이름을 입력해주세요."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(length(max = 30, message = "닉네임은 30자 이하로 입력해주세요."))]
    pub nickname: Option<String>,

    #[validate(email(message = "올바른 이메일 형식이 아닙니다."))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(length(max = 255, message = "주소가 너무 깁니다."))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "아이디를 입력해주세요."))]
    pub username: String,
    #[validate(length(min = 1, message = "비밀번호를 입력해주세요."))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            nickname: user.nickname,
            email: user.email,
            phone: user.phone,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

/// Row in the admin member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserItem {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_status: Option<JoinRequestStatus>,
    pub created_at: DateTime<Utc>,
}

impl AdminUserItem {
    /// Organization accounts appear only once their join request is approved.
    pub fn is_listed(&self) -> bool {
        match self.role {
            UserRole::Organization => {
                self.organization_status == Some(JoinRequestStatus::Approved)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUsersResponse {
    pub users: Vec<AdminUserItem>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::raw::Name;
    use fake::locales::EN;
    use fake::Fake;

    fn admin_item(role: UserRole, org: Option<JoinRequestStatus>) -> AdminUserItem {
        AdminUserItem {
            id: Uuid::new_v4(),
            username: "member01".into(),
            name: Name(EN).fake(),
            nickname: None,
            email: None,
            phone: None,
            role,
            organization_status: org,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("USER".parse::<UserRole>().unwrap(), UserRole::Donor);
        assert!("guest".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Organization.to_string(), "ORGANIZATION");
    }

    #[test]
    fn test_signup_validation() {
        let request: SignupRequest = serde_json::from_value(serde_json::json!({
            "username": "donor_01",
            "password": "secret123",
            "name": "홍길동",
            "phone": "010-1234-5678"
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let bad: SignupRequest = serde_json::from_value(serde_json::json!({
            "username": "X",
            "password": "secret123",
            "name": " "
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "donor01".into(),
            password_hash: "$argon2id$...".into(),
            name: "홍길동".into(),
            nickname: None,
            email: None,
            phone: None,
            address: None,
            role: UserRole::Donor,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "DONOR");
    }

    #[test]
    fn test_unapproved_organizations_are_not_listed() {
        assert!(admin_item(UserRole::Donor, None).is_listed());
        assert!(admin_item(UserRole::Admin, None).is_listed());
        assert!(admin_item(UserRole::Organization, Some(JoinRequestStatus::Approved)).is_listed());
        assert!(!admin_item(UserRole::Organization, Some(JoinRequestStatus::Pending)).is_listed());
        assert!(!admin_item(UserRole::Organization, None).is_listed());
    }
}
