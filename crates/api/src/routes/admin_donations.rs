//! Admin donation queues: review, rejection and organization assignment.
//!
//! Every transition is checked with the lifecycle rules first and then
//! applied as a conditional update, so a stale screen gets 409 instead of
//! overwriting a newer state.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{
    ActionResponse, AdminDonationResponse, AssignOrganizationRequest, DonationItem,
    DonationListResponse, Organization, OrganSummary, OrgansResponse, RejectDonationRequest,
};
use domain::services::{approve, check_proposal, ensure_assignable, reject, LifecycleError};
use persistence::entities::DonationStatusDb;
use persistence::repositories::{DonationRepository, OrganizationRepository};
use shared::validation::non_blank;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::middleware::metrics::record_transition;

fn donation_not_found() -> ApiError {
    ApiError::NotFound("기부 내역을 찾을 수 없습니다.".to_string())
}

fn organization_not_found() -> ApiError {
    ApiError::NotFound("기관을 찾을 수 없습니다.".to_string())
}

fn list_response(items: &[DonationItem]) -> DonationListResponse {
    DonationListResponse::new(items.iter().map(AdminDonationResponse::from).collect())
}

/// Donations waiting for review.
///
/// GET /api/admin/donations/pending
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<DonationListResponse>, ApiError> {
    let repo = DonationRepository::new(state.pool.clone());
    let items = repo
        .hydrate(repo.list_by_status(DonationStatusDb::PendingApproval).await?)
        .await?;
    Ok(Json(list_response(&items)))
}

/// Approve a donation.
///
/// Direct-match donations open an invite to the donor's chosen organization.
/// If that organization was deleted the donation is approved as auto-match.
///
/// POST /api/admin/donations/:id/approve
pub async fn approve_donation(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = DonationRepository::new(state.pool.clone());
    let item = repo.find_item(id).await?.ok_or_else(donation_not_found)?;

    let outcome = approve(&item)?;

    if let Some(target) = &outcome.pending_organization {
        let organization: Organization = OrganizationRepository::new(state.pool.clone())
            .find_by_id(target.id)
            .await?
            .ok_or_else(organization_not_found)?
            .into();
        ensure_assignable(&organization)?;
    }

    let invite_organization = outcome.pending_organization.as_ref().map(|o| o.id);
    if !repo
        .approve(id, outcome.donation_method.into(), invite_organization)
        .await?
    {
        return Err(LifecycleError::NotPendingApproval.into());
    }

    record_transition("approve");
    tracing::info!(
        donation_id = %id,
        user_id = %admin.user_id,
        status = outcome.status.as_str(),
        donation_method = ?outcome.donation_method,
        pending_organization = ?invite_organization,
        "Donation approved"
    );
    Ok(Json(ActionResponse::ok("기부가 승인되었습니다.")))
}

/// Reject a donation under review or awaiting a match.
///
/// POST /api/admin/donations/:id/reject
pub async fn reject_donation(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    body: Option<Json<RejectDonationRequest>>,
) -> Result<Json<ActionResponse>, ApiError> {
    let reason = body
        .and_then(|Json(b)| non_blank(b.reason.as_deref()))
        .ok_or(LifecycleError::ReasonRequired)?;

    let repo = DonationRepository::new(state.pool.clone());
    let item = repo.find_item(id).await?.ok_or_else(donation_not_found)?;

    let outcome = reject(&item, &reason)?;
    let expected = DonationStatusDb::from(item.status);
    if !repo.reject(id, &outcome.reason, expected).await? {
        return Err(LifecycleError::NotRejectable.into());
    }

    record_transition("reject");
    tracing::info!(
        donation_id = %id,
        user_id = %admin.user_id,
        previous_status = item.status.as_str(),
        "Donation rejected"
    );
    Ok(Json(ActionResponse::ok("기부가 반려되었습니다.")))
}

/// Approved auto-match donations with no organization proposed yet.
///
/// GET /api/admin/donations/auto-match
pub async fn list_auto_match(
    State(state): State<AppState>,
) -> Result<Json<DonationListResponse>, ApiError> {
    let repo = DonationRepository::new(state.pool.clone());
    let items = repo
        .hydrate(repo.list_auto_match_candidates().await?)
        .await?;
    Ok(Json(list_response(&items)))
}

/// Organizations an auto-match donation can be proposed to.
///
/// GET /api/admin/donations/organs
pub async fn list_organs(State(state): State<AppState>) -> Result<Json<OrgansResponse>, ApiError> {
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

/// Propose an organization for an auto-match donation.
///
/// POST /api/admin/donations/:id/assign
pub async fn assign_organization(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    body: Option<Json<AssignOrganizationRequest>>,
) -> Result<Json<ActionResponse>, ApiError> {
    let organ_id = body
        .and_then(|Json(b)| b.organ_id)
        .ok_or(LifecycleError::OrganizationRequired)?;

    let repo = DonationRepository::new(state.pool.clone());
    let item = repo.find_item(id).await?.ok_or_else(donation_not_found)?;
    let organ_id = check_proposal(&item, Some(organ_id))?;

    let organization: Organization = OrganizationRepository::new(state.pool.clone())
        .find_by_id(organ_id)
        .await?
        .ok_or_else(organization_not_found)?
        .into();
    let target = ensure_assignable(&organization)?;

    let invite_id = repo
        .propose(id, target.id)
        .await?
        .ok_or(LifecycleError::NotAutoMatchCandidate)?;

    record_transition("propose");
    tracing::info!(
        donation_id = %id,
        user_id = %admin.user_id,
        organization_id = %target.id,
        invite_id = %invite_id,
        "Organization proposed for donation"
    );
    Ok(Json(ActionResponse::ok(format!(
        "{} 기관에 매칭 요청을 보냈습니다.",
        target.name
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        match donation_not_found() {
            ApiError::NotFound(msg) => assert_eq!(msg, "기부 내역을 찾을 수 없습니다."),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(organization_not_found(), ApiError::NotFound(_)));
    }

    #[test]
    fn test_empty_list_response() {
        let response = list_response(&[]);
        assert_eq!(response.count, 0);
        assert!(response.donations.is_empty());
    }
}
