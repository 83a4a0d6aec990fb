//! Organization signup and admin review of join requests.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    ActionResponse, JoinRequestListResponse, JoinRequestResponse, JoinRequestStatus,
    OrganSummary, Organization, OrganizationJoinRequest, OrgansResponse, ReviewJoinRequestBody,
};
use persistence::entities::JoinRequestStatusDb;
use persistence::repositories::OrganizationRepository;
use serde::Deserialize;
use shared::validation::non_blank;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;

#[derive(Debug, Default, Deserialize)]
pub struct JoinRequestQuery {
    pub status: Option<String>,
}

/// Submit an organization join request. Creates the login account as well.
///
/// POST /api/organizations/join-requests
pub async fn submit_join_request(
    State(state): State<AppState>,
    Json(request): Json<OrganizationJoinRequest>,
) -> Result<(StatusCode, Json<JoinRequestResponse>), ApiError> {
    request.validate()?;

    let organization = state
        .auth_service()?
        .register_organization(&request)
        .await?;
    Ok((StatusCode::CREATED, Json(organization.into())))
}

/// Approved organizations for the donation form.
///
/// GET /api/organs/approved
pub async fn list_approved(State(state): State<AppState>) -> Result<Json<OrgansResponse>, ApiError> {
    let organs: Vec<OrganSummary> = OrganizationRepository::new(state.pool.clone())
        .list_approved()
        .await?
        .into_iter()
        .map(Organization::from)
        .map(|o| OrganSummary::from(&o))
        .collect();
    let count = organs.len();
    Ok(Json(OrgansResponse { organs, count }))
}

/// Join requests, optionally filtered by `status`.
///
/// GET /api/admin/organizations/join-requests
pub async fn list_join_requests(
    State(state): State<AppState>,
    Query(query): Query<JoinRequestQuery>,
) -> Result<Json<JoinRequestListResponse>, ApiError> {
    let status = match non_blank(query.status.as_deref()) {
        Some(raw) => Some(JoinRequestStatusDb::from(
            raw.parse::<JoinRequestStatus>()
                .map_err(ApiError::Validation)?,
        )),
        None => None,
    };

    let requests: Vec<JoinRequestResponse> = OrganizationRepository::new(state.pool.clone())
        .list(status)
        .await?
        .into_iter()
        .map(|e| Organization::from(e).into())
        .collect();
    let count = requests.len();
    Ok(Json(JoinRequestListResponse { requests, count }))
}

async fn ensure_exists(repo: &OrganizationRepository, id: Uuid) -> Result<Organization, ApiError> {
    repo.find_by_id(id)
        .await?
        .map(Organization::from)
        .ok_or_else(|| ApiError::NotFound("가입 신청을 찾을 수 없습니다.".to_string()))
}

fn already_reviewed() -> ApiError {
    ApiError::Conflict("이미 처리된 가입 신청입니다.".to_string())
}

/// POST /api/admin/organizations/join-requests/:id/approve
pub async fn approve_join_request(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = OrganizationRepository::new(state.pool.clone());
    let organization = ensure_exists(&repo, id).await?;

    if !repo.approve(id).await? {
        return Err(already_reviewed());
    }

    tracing::info!(
        organization_id = %id,
        user_id = %admin.user_id,
        name = %organization.name,
        "Organization join request approved"
    );
    Ok(Json(ActionResponse::ok(format!(
        "{} 기관의 가입을 승인했습니다.",
        organization.name
    ))))
}

/// POST /api/admin/organizations/join-requests/:id/reject
pub async fn reject_join_request(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    body: Option<Json<ReviewJoinRequestBody>>,
) -> Result<Json<ActionResponse>, ApiError> {
    let reason = body
        .and_then(|Json(b)| non_blank(b.reason.as_deref()))
        .ok_or_else(|| ApiError::Validation("거절 사유를 입력해주세요.".to_string()))?;

    let repo = OrganizationRepository::new(state.pool.clone());
    let organization = ensure_exists(&repo, id).await?;

    if !repo.reject(id, &reason).await? {
        return Err(already_reviewed());
    }

    tracing::info!(
        organization_id = %id,
        user_id = %admin.user_id,
        name = %organization.name,
        "Organization join request rejected"
    );
    Ok(Json(ActionResponse::ok(format!(
        "{} 기관의 가입을 거절했습니다.",
        organization.name
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_request_validation() {
        let request: OrganizationJoinRequest = serde_json::from_value(serde_json::json!({
            "username": "school01",
            "password": "short",
            "organizationName": "임당초등학교",
            "businessNo": "123-45-67890",
            "contactName": "김담당",
            "phone": "053-123-4567"
        }))
        .unwrap();
        let err = ApiError::from(request.validate().unwrap_err());
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_already_reviewed_is_conflict() {
        assert!(matches!(already_reviewed(), ApiError::Conflict(_)));
    }
}
