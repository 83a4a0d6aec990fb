//! Member signup, login and session token issuance.

use std::sync::Arc;

use domain::models::{
    JoinRequestStatus, LoginRequest, Organization, OrganizationJoinRequest, SignupRequest, User,
    UserRole,
};
use persistence::entities::UserRoleDb;
use persistence::repositories::{NewOrganization, NewUser, OrganizationRepository, UserRepository};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{check_password_policy, hash_password, verify_password, PasswordError};
use shared::validation::non_blank;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("이미 사용 중인 아이디입니다.")]
    UsernameTaken,

    #[error("{0}")]
    WeakPassword(String),

    #[error("아이디 또는 비밀번호가 올바르지 않습니다.")]
    InvalidCredentials,

    #[error("기관 가입 승인 대기 중입니다.")]
    OrganizationPending,

    #[error("기관 가입이 반려되었습니다.")]
    OrganizationRejected,

    #[error("회원 정보를 찾을 수 없습니다.")]
    UserNotFound,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken => ApiError::Conflict(err.to_string()),
            AuthError::WeakPassword(msg) => ApiError::Validation(msg),
            AuthError::InvalidCredentials | AuthError::UserNotFound => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::OrganizationPending | AuthError::OrganizationRejected => {
                ApiError::Forbidden(err.to_string())
            }
            AuthError::Token(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::Password(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::Database(e) => e.into(),
        }
    }
}

/// A successful login: the member and their new session token.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Normalize a PEM key read from the environment, where newlines often
/// arrive as literal `\n` sequences and the value may keep its quotes.
pub fn normalize_pem_key(key: &str) -> String {
    key.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

/// Builds the token signer from configuration.
pub fn create_session_keys(config: &SessionConfig) -> Result<JwtConfig, JwtError> {
    JwtConfig::with_leeway(
        &normalize_pem_key(&config.private_key),
        &normalize_pem_key(&config.public_key),
        config.expiry_secs,
        config.leeway_secs,
    )
}

/// Authentication service.
pub struct AuthService {
    pool: PgPool,
    sessions: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, sessions: Arc<JwtConfig>) -> Self {
        Self { pool, sessions }
    }

    /// Registers a donor account.
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, AuthError> {
        check_password_policy(&request.password)
            .map_err(|e| AuthError::WeakPassword(e.to_string()))?;

        let users = UserRepository::new(self.pool.clone());
        if users.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(&request.password)?;
        let nickname = non_blank(request.nickname.as_deref());
        let email = non_blank(request.email.as_deref());
        let phone = non_blank(request.phone.as_deref());
        let address = non_blank(request.address.as_deref());

        let user = users
            .create(&NewUser {
                username: &request.username,
                password_hash: &password_hash,
                name: request.name.trim(),
                nickname: nickname.as_deref(),
                email: email.as_deref(),
                phone: phone.as_deref(),
                address: address.as_deref(),
                role: UserRoleDb::Donor,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Donor registered");
        Ok(user.into())
    }

    /// Creates an organization account together with its pending join request.
    pub async fn register_organization(
        &self,
        request: &OrganizationJoinRequest,
    ) -> Result<Organization, AuthError> {
        check_password_policy(&request.password)
            .map_err(|e| AuthError::WeakPassword(e.to_string()))?;

        let users = UserRepository::new(self.pool.clone());
        if users.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(&request.password)?;
        let email = non_blank(request.email.as_deref());
        let address = non_blank(request.address.as_deref());
        let name = request.organization_name.trim();

        let organization = OrganizationRepository::new(self.pool.clone())
            .create_join_request(
                &NewUser {
                    username: &request.username,
                    password_hash: &password_hash,
                    name,
                    nickname: None,
                    email: email.as_deref(),
                    phone: Some(request.phone.trim()),
                    address: address.as_deref(),
                    role: UserRoleDb::Organization,
                },
                &NewOrganization {
                    name,
                    business_no: request.business_no.trim(),
                    contact_name: request.contact_name.trim(),
                    phone: request.phone.trim(),
                    email: email.as_deref(),
                    address: address.as_deref(),
                },
            )
            .await?;

        tracing::info!(
            organization_id = %organization.id,
            username = %request.username,
            "Organization join request submitted"
        );
        Ok(organization.into())
    }

    /// Checks credentials and issues a session token.
    ///
    /// Organization accounts may log in only once their join request is approved.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        let users = UserRepository::new(self.pool.clone());
        let user: User = users
            .find_by_username(request.username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(username = %user.username, "Login rejected, wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if user.role == UserRole::Organization {
            let organization = OrganizationRepository::new(self.pool.clone())
                .find_by_user_id(user.id)
                .await?;
            match organization.map(|o| Organization::from(o).status) {
                Some(JoinRequestStatus::Approved) => {}
                Some(JoinRequestStatus::Rejected) => return Err(AuthError::OrganizationRejected),
                _ => return Err(AuthError::OrganizationPending),
            }
        }

        let (token, jti) =
            self.sessions
                .issue_session_token(user.id, &user.username, user.role.as_str())?;
        tracing::info!(user_id = %user.id, role = %user.role, jti = %jti, "Session issued");

        Ok(LoginOutcome { user, token })
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        UserRepository::new(self.pool.clone())
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pem_key_unescapes_newlines() {
        let raw = "\"-----BEGIN PUBLIC KEY-----\\nABC\\n-----END PUBLIC KEY-----\"";
        assert_eq!(
            normalize_pem_key(raw),
            "-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----"
        );
    }

    #[test]
    fn test_normalize_pem_key_keeps_real_newlines() {
        let raw = "-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----\n";
        assert_eq!(
            normalize_pem_key(raw),
            "-----BEGIN PUBLIC KEY-----\nABC\n-----END PUBLIC KEY-----"
        );
    }

    #[test]
    fn test_auth_error_status_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::UsernameTaken),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::OrganizationPending),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::WeakPassword("짧음".into())),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn test_invalid_keys_are_reported() {
        let config = SessionConfig {
            private_key: "not a key".into(),
            public_key: "not a key".into(),
            expiry_secs: 60,
            leeway_secs: 0,
            cookie_name: "rewear_session".into(),
            cookie_secure: false,
            cookie_same_site: "Lax".into(),
            cookie_domain: String::new(),
        };
        assert!(matches!(
            create_session_keys(&config),
            Err(JwtError::InvalidKey(_))
        ));
    }
}
