//! Matching invites: organizations answer, admins overview.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{
    ActionResponse, InviteListResponse, InviteStatus, MatchingInvite, MatchingInviteResponse,
    Organization, Party, RespondInviteRequest, User,
};
use domain::services::{resolve_invite, InviteResolution, LifecycleError};
use persistence::entities::InviteStatusDb;
use persistence::repositories::{
    DonationRepository, MatchingInviteRepository, OrganizationRepository, UserRepository,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::OrganizationUser;
use crate::middleware::metrics::record_transition;

#[derive(Debug, Default, Deserialize)]
pub struct InviteListQuery {
    pub status: Option<String>,
}

fn parse_invite_status(raw: Option<&str>) -> Result<Option<InviteStatus>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.to_uppercase().as_str() {
        "PENDING" => Ok(Some(InviteStatus::Pending)),
        "ACCEPTED" => Ok(Some(InviteStatus::Accepted)),
        "REJECTED" => Ok(Some(InviteStatus::Rejected)),
        "WITHDRAWN" => Ok(Some(InviteStatus::Withdrawn)),
        _ => Err(ApiError::Validation(format!(
            "유효하지 않은 상태값입니다: {}",
            raw
        ))),
    }
}

/// The organization record behind an organization account.
async fn own_organization(state: &AppState, user_id: Uuid) -> Result<Organization, ApiError> {
    OrganizationRepository::new(state.pool.clone())
        .find_by_user_id(user_id)
        .await?
        .map(Organization::from)
        .ok_or_else(|| ApiError::NotFound("기관 정보를 찾을 수 없습니다.".to_string()))
}

/// Invites addressed to the signed-in organization.
///
/// GET /api/matching-invites
pub async fn list_my_invites(
    State(state): State<AppState>,
    OrganizationUser(session): OrganizationUser,
) -> Result<Json<InviteListResponse>, ApiError> {
    let organization = own_organization(&state, session.user_id).await?;
    let invites = MatchingInviteRepository::new(state.pool.clone())
        .list_for_organization(organization.id)
        .await?
        .into_iter()
        .map(|e| MatchingInviteResponse::from(MatchingInvite::from(e)))
        .collect();
    Ok(Json(InviteListResponse::new(invites)))
}

/// Builds the shipment parties for an accepted invite.
async fn shipment_parties(
    state: &AppState,
    donation_id: Uuid,
    organization: &Organization,
) -> Result<(Party, Party), ApiError> {
    let item = DonationRepository::new(state.pool.clone())
        .find_item(donation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("기부 내역을 찾을 수 없습니다.".to_string()))?;
    let donor: Option<User> = UserRepository::new(state.pool.clone())
        .find_by_id(item.owner_id)
        .await?
        .map(User::from);

    let sender = Party::with_fallbacks(
        Some(item.owner_name.as_str()),
        item.contact
            .as_deref()
            .or_else(|| donor.as_ref().and_then(|d| d.phone.as_deref())),
        donor.as_ref().and_then(|d| d.address.as_deref()),
    );
    let receiver = Party::with_fallbacks(
        Some(organization.name.as_str()),
        Some(organization.phone.as_str()),
        organization.address.as_deref(),
    );
    Ok((sender, receiver))
}

/// Accept or decline an invite.
///
/// POST /api/matching-invites/:id/respond
pub async fn respond_invite(
    State(state): State<AppState>,
    OrganizationUser(session): OrganizationUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RespondInviteRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let organization = own_organization(&state, session.user_id).await?;

    let repo = MatchingInviteRepository::new(state.pool.clone());
    let invite: MatchingInvite = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("매칭 요청을 찾을 수 없습니다.".to_string()))?
        .into();

    let resolution = resolve_invite(
        &invite,
        organization.id,
        request.decision,
        request.reason.as_deref(),
    )?;

    match resolution {
        InviteResolution::Accepted { organization: org } => {
            let (sender, receiver) =
                shipment_parties(&state, invite.donation_id, &organization).await?;
            let delivery_id = repo
                .accept(id, org.id, invite.donation_id, &sender, &receiver)
                .await?
                .ok_or(LifecycleError::InviteClosed)?;

            record_transition("accept");
            tracing::info!(
                invite_id = %id,
                donation_id = %invite.donation_id,
                organization_id = %org.id,
                delivery_id = %delivery_id,
                "Matching invite accepted"
            );
            Ok(Json(ActionResponse::ok("매칭 요청을 수락했습니다.")))
        }
        InviteResolution::Rejected { reason } => {
            if !repo
                .reject(id, organization.id, invite.donation_id, &reason)
                .await?
            {
                return Err(LifecycleError::InviteClosed.into());
            }

            record_transition("decline");
            tracing::info!(
                invite_id = %id,
                donation_id = %invite.donation_id,
                organization_id = %organization.id,
                "Matching invite declined"
            );
            Ok(Json(ActionResponse::ok("매칭 요청을 거절했습니다.")))
        }
    }
}

/// Every invite, optionally filtered by `status`.
///
/// GET /api/admin/matching-invites
pub async fn list_all_invites(
    State(state): State<AppState>,
    Query(query): Query<InviteListQuery>,
) -> Result<Json<InviteListResponse>, ApiError> {
    let status = parse_invite_status(query.status.as_deref())?.map(InviteStatusDb::from);
    let invites = MatchingInviteRepository::new(state.pool.clone())
        .list_all(status)
        .await?
        .into_iter()
        .map(|e| MatchingInviteResponse::from(MatchingInvite::from(e)))
        .collect();
    Ok(Json(InviteListResponse::new(invites)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invite_status() {
        assert_eq!(parse_invite_status(None).unwrap(), None);
        assert_eq!(parse_invite_status(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_invite_status(Some("pending")).unwrap(),
            Some(InviteStatus::Pending)
        );
        assert_eq!(
            parse_invite_status(Some("REJECTED")).unwrap(),
            Some(InviteStatus::Rejected)
        );
        assert_eq!(
            parse_invite_status(Some("withdrawn")).unwrap(),
            Some(InviteStatus::Withdrawn)
        );
        assert!(matches!(
            parse_invite_status(Some("maybe")),
            Err(ApiError::Validation(_))
        ));
    }
}
