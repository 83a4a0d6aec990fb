//! Session authentication middleware.
//!
//! The session token travels in the httpOnly session cookie. A Bearer token in
//! the Authorization header is accepted as well for non-browser clients.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::UserRole;
use shared::jwt::{extract_user_id, Claims, JwtConfig};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::SessionCookies;

/// Authenticated member taken from a validated session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    /// Token ID, logged for session tracing.
    pub jti: String,
}

impl SessionUser {
    /// Builds the session from validated claims.
    pub fn from_claims(claims: Claims) -> Result<Self, String> {
        let user_id = extract_user_id(&claims).map_err(|_| "Invalid user ID in token".to_string())?;
        let role = claims.role.parse::<UserRole>()?;
        Ok(Self {
            user_id,
            username: claims.username,
            role,
            jti: claims.jti,
        })
    }

    /// Validates a raw token.
    pub fn validate(sessions: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = sessions
            .validate_session_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;
        Self::from_claims(claims)
    }

    /// Authenticates a request from its headers.
    pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Self, ApiError> {
        let token = session_token(&state.cookies, headers)
            .ok_or_else(|| ApiError::Unauthorized("로그인이 필요합니다.".to_string()))?;

        let sessions = state.sessions.as_ref().ok_or_else(|| {
            ApiError::ServiceUnavailable("Authentication service unavailable".to_string())
        })?;

        Self::validate(sessions, token).map_err(|e| {
            tracing::debug!("Session validation failed: {}", e);
            ApiError::Unauthorized("세션이 만료되었습니다. 다시 로그인해 주세요.".to_string())
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn session_token<'a>(cookies: &SessionCookies, headers: &'a HeaderMap) -> Option<&'a str> {
    cookies.extract_token(headers).or_else(|| {
        headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    })
}

/// Middleware that requires any signed-in member.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match SessionUser::authenticate(&state, req.headers()) {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware that requires an administrator session.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session = match SessionUser::authenticate(&state, req.headers()) {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    if !session.is_admin() {
        tracing::warn!(user_id = %session.user_id, path = %req.uri().path(), "Non-admin access to admin route");
        return ApiError::Forbidden("관리자만 접근할 수 있습니다.".to_string()).into_response();
    }

    req.extensions_mut().insert(session);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use axum::http::HeaderValue;

    fn cookies() -> SessionCookies {
        SessionCookies::new(&SessionConfig {
            private_key: String::new(),
            public_key: String::new(),
            expiry_secs: 3600,
            leeway_secs: 0,
            cookie_name: "rewear_session".into(),
            cookie_secure: false,
            cookie_same_site: "Lax".into(),
            cookie_domain: String::new(),
        })
    }

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.into(),
            username: "donor01".into(),
            role: role.into(),
            exp: 0,
            iat: 0,
            jti: "jti-1".into(),
        }
    }

    #[test]
    fn test_from_claims() {
        let id = Uuid::new_v4();
        let session = SessionUser::from_claims(claims(&id.to_string(), "ADMIN")).unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(session.role, UserRole::Admin);
        assert!(session.is_admin());
    }

    #[test]
    fn test_from_claims_rejects_bad_subject_or_role() {
        assert!(SessionUser::from_claims(claims("not-a-uuid", "DONOR")).is_err());
        assert!(SessionUser::from_claims(claims(&Uuid::new_v4().to_string(), "GUEST")).is_err());
    }

    #[test]
    fn test_cookie_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("rewear_session=from-cookie"));
        headers.insert("authorization", HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&cookies(), &headers), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&cookies(), &headers), Some("from-header"));

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(session_token(&cookies(), &headers), None);
    }
}
