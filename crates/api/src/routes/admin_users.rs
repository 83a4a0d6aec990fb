//! Member administration.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{ActionResponse, AdminUserItem, AdminUsersResponse};
use persistence::repositories::UserRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;

/// Members, hiding organization accounts whose join request is not approved.
///
/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<AdminUsersResponse>, ApiError> {
    let users: Vec<AdminUserItem> = UserRepository::new(state.pool.clone())
        .list_for_admin()
        .await?
        .into_iter()
        .map(AdminUserItem::from)
        .filter(AdminUserItem::is_listed)
        .collect();
    let count = users.len();
    Ok(Json(AdminUsersResponse { users, count }))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    if id == admin.user_id {
        return Err(ApiError::Conflict(
            "본인 계정은 삭제할 수 없습니다.".to_string(),
        ));
    }

    if !UserRepository::new(state.pool.clone()).delete(id).await? {
        return Err(ApiError::NotFound("회원을 찾을 수 없습니다.".to_string()));
    }

    tracing::info!(target_user_id = %id, user_id = %admin.user_id, "User deleted");
    Ok(Json(ActionResponse::ok("회원이 삭제되었습니다.")))
}
