//! Donation lifecycle rules.
//!
//! The functions here decide whether a transition is allowed and what it
//! produces. They never touch storage; the API layer persists the outcome and
//! the client views use the same checks to block a request before sending it.

pub mod approval;
pub mod donor_status;
pub mod matching;
pub mod staging;

use uuid::Uuid;

use crate::models::{
    AdminDonationResponse, DonationItem, DonationMethod, DonationStatus, OrganizationRef,
};

pub use approval::{approve, reject, ApprovalOutcome, RejectionOutcome};
pub use donor_status::{
    build_status_response, completed_history, ensure_cancellable, status_counts, DonorIdentity,
    ShipmentRecord, StatusCounts,
};
pub use matching::{
    check_proposal, ensure_assignable, is_auto_match_candidate, resolve_invite, InviteResolution,
};
pub use staging::{PendingAction, PendingChange, PendingChanges};

/// Rejected lifecycle transitions. Messages are shown to the operator as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("승인 대기 중인 기부만 승인할 수 있습니다.")]
    NotPendingApproval,

    #[error("승인 대기 또는 매칭 대기 중인 기부만 반려할 수 있습니다.")]
    NotRejectable,

    #[error("반려 사유를 입력해주세요.")]
    ReasonRequired,

    #[error("취소할 수 없는 상태입니다.")]
    NotCancellable,

    #[error("기관 ID가 필요합니다.")]
    OrganizationRequired,

    #[error("자동 매칭 대기 중인 기부만 기관을 배정할 수 있습니다.")]
    NotAutoMatchCandidate,

    #[error("승인된 기관만 배정할 수 있습니다.")]
    OrganizationNotApproved,

    #[error("매칭 대기 상태가 아닌 기부입니다.")]
    NotAwaitingMatch,

    #[error("이미 응답한 매칭 요청입니다.")]
    InviteClosed,

    #[error("거절 사유를 입력해주세요.")]
    InviteReasonRequired,

    #[error("해당 매칭 요청에 응답할 권한이 없습니다.")]
    NotInviteRecipient,
}

/// Anything that carries enough lifecycle state to run the transition rules.
///
/// Implemented for the stored [`DonationItem`] and for the admin list entry
/// the client receives, so both sides apply the same checks.
pub trait LifecycleSubject {
    fn item_id(&self) -> Uuid;
    fn lifecycle_status(&self) -> DonationStatus;
    fn donation_method(&self) -> DonationMethod;
    fn target_organization(&self) -> Option<OrganizationRef>;
    fn pending_organization(&self) -> Option<OrganizationRef>;
}

impl LifecycleSubject for DonationItem {
    fn item_id(&self) -> Uuid {
        self.id
    }

    fn lifecycle_status(&self) -> DonationStatus {
        self.status
    }

    fn donation_method(&self) -> DonationMethod {
        self.donation_method
    }

    fn target_organization(&self) -> Option<OrganizationRef> {
        self.target_organization.clone()
    }

    fn pending_organization(&self) -> Option<OrganizationRef> {
        self.pending_organization.clone()
    }
}

fn org_ref(id: Option<Uuid>, name: Option<&str>) -> Option<OrganizationRef> {
    match (id, name) {
        (Some(id), Some(name)) if !name.trim().is_empty() => Some(OrganizationRef::new(id, name)),
        _ => None,
    }
}

impl LifecycleSubject for AdminDonationResponse {
    fn item_id(&self) -> Uuid {
        self.id
    }

    fn lifecycle_status(&self) -> DonationStatus {
        DonationStatus::project(&self.status)
    }

    fn donation_method(&self) -> DonationMethod {
        self.donation_method
    }

    fn target_organization(&self) -> Option<OrganizationRef> {
        org_ref(
            self.donation_organization_id,
            self.donation_organization.as_deref(),
        )
    }

    fn pending_organization(&self) -> Option<OrganizationRef> {
        org_ref(
            self.pending_organization_id,
            self.pending_organization.as_deref(),
        )
    }
}
