//! Session extractors.
//!
//! `SessionUser` accepts any signed-in member. The role wrappers additionally
//! reject members with the wrong role with 403.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::UserRole;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::SessionUser;

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Inserted by require_session / require_admin when the route is layered.
        if let Some(session) = parts.extensions.get::<SessionUser>() {
            return Ok(session.clone());
        }

        SessionUser::authenticate(state, &parts.headers)
    }
}

fn require_role(session: SessionUser, role: UserRole, message: &str) -> Result<SessionUser, ApiError> {
    if session.role == role {
        Ok(session)
    } else {
        Err(ApiError::Forbidden(message.to_string()))
    }
}

macro_rules! role_extractor {
    ($name:ident, $role:expr, $message:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub SessionUser);

        #[async_trait]
        impl FromRequestParts<AppState> for $name {
            type Rejection = ApiError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let session = SessionUser::from_request_parts(parts, state).await?;
                require_role(session, $role, $message).map($name)
            }
        }
    };
}

role_extractor!(DonorUser, UserRole::Donor, "기부자 계정만 이용할 수 있습니다.");
role_extractor!(
    OrganizationUser,
    UserRole::Organization,
    "기관 계정만 이용할 수 있습니다."
);
role_extractor!(AdminUser, UserRole::Admin, "관리자만 접근할 수 있습니다.");
