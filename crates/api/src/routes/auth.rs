//! Member signup, login and session routes.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::models::{
    ActionResponse, LoginRequest, LoginResponse, SignupRequest, UserResponse,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionUser;

/// Register a donor account.
///
/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    request.validate()?;

    let user = state.auth_service()?.signup(&request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in and receive the session cookie.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    request.validate()?;

    let outcome = state.auth_service()?.login(&request).await?;

    let mut headers = HeaderMap::new();
    state.cookies.add_session_cookie(&mut headers, &outcome.token);

    Ok((
        headers,
        Json(LoginResponse {
            success: true,
            message: "로그인되었습니다.".to_string(),
            user: outcome.user.into(),
        }),
    ))
}

/// Clear the session cookie. Succeeds without a session.
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<ActionResponse>) {
    let mut headers = HeaderMap::new();
    state.cookies.add_clear_cookie(&mut headers);
    (headers, Json(ActionResponse::ok("로그아웃되었습니다.")))
}

/// The signed-in member.
///
/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service()?.current_user(session.user_id).await?;
    Ok(Json(user.into()))
}
