//! Admin approval and rejection of submitted donations.

use super::{LifecycleError, LifecycleSubject};
use crate::models::donation::{awaiting_confirmation_info, INFO_AWAITING_MATCH};
use crate::models::{DonationMethod, DonationStatus, OrganizationRef};

/// State an item takes when approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub status: DonationStatus,
    /// `AUTO_MATCH` for a direct-match item whose organization is gone.
    pub donation_method: DonationMethod,
    /// Set for direct-match items: the donor's chosen organization, which
    /// receives an invite right away.
    pub pending_organization: Option<OrganizationRef>,
    pub matching_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionOutcome {
    pub status: DonationStatus,
    pub reason: String,
}

/// Approves an item waiting for review.
pub fn approve<S: LifecycleSubject + ?Sized>(item: &S) -> Result<ApprovalOutcome, LifecycleError> {
    if item.lifecycle_status() != DonationStatus::PendingApproval {
        return Err(LifecycleError::NotPendingApproval);
    }

    let pending_organization = match item.donation_method() {
        DonationMethod::DirectMatch => item.target_organization(),
        DonationMethod::AutoMatch => None,
    };
    let donation_method = match pending_organization {
        Some(_) => DonationMethod::DirectMatch,
        None => DonationMethod::AutoMatch,
    };
    let matching_info = match &pending_organization {
        Some(org) => awaiting_confirmation_info(&org.name),
        None => INFO_AWAITING_MATCH.to_string(),
    };

    Ok(ApprovalOutcome {
        status: DonationStatus::PendingMatch,
        donation_method,
        pending_organization,
        matching_info,
    })
}

/// Rejects an item under review or awaiting a match.
///
/// The reason is trimmed and must not be empty; it is checked before the
/// status so a blank reason never reaches the backend.
pub fn reject<S: LifecycleSubject + ?Sized>(
    item: &S,
    reason: &str,
) -> Result<RejectionOutcome, LifecycleError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(LifecycleError::ReasonRequired);
    }
    match item.lifecycle_status() {
        DonationStatus::PendingApproval | DonationStatus::PendingMatch => Ok(RejectionOutcome {
            status: DonationStatus::Rejected,
            reason: reason.to_string(),
        }),
        _ => Err(LifecycleError::NotRejectable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::donation::fixtures::{direct_item, pending_item};

    #[test]
    fn test_approve_direct_match_prefills_target() {
        let outcome = approve(&direct_item()).unwrap();
        assert_eq!(outcome.status, DonationStatus::PendingMatch);
        assert_eq!(outcome.donation_method, DonationMethod::DirectMatch);
        assert_eq!(
            outcome.pending_organization.map(|o| o.name),
            Some("임당초등학교".to_string())
        );
        assert_eq!(outcome.matching_info, "임당초등학교 기관 확인 중입니다.");
    }

    #[test]
    fn test_approve_direct_match_without_target_becomes_auto_match() {
        let mut item = direct_item();
        item.target_organization = None;
        let outcome = approve(&item).unwrap();
        assert_eq!(outcome.donation_method, DonationMethod::AutoMatch);
        assert!(outcome.pending_organization.is_none());
        assert_eq!(outcome.matching_info, "기관 매칭을 기다리는 중입니다.");
    }

    #[test]
    fn test_approve_auto_match_waits_for_assignment() {
        let outcome = approve(&pending_item()).unwrap();
        assert_eq!(outcome.status, DonationStatus::PendingMatch);
        assert!(outcome.pending_organization.is_none());
        assert_eq!(outcome.matching_info, "기관 매칭을 기다리는 중입니다.");
    }

    #[test]
    fn test_approve_requires_pending_approval() {
        let mut item = pending_item();
        item.status = DonationStatus::PendingMatch;
        assert_eq!(approve(&item), Err(LifecycleError::NotPendingApproval));
    }

    #[test]
    fn test_reject_requires_reason() {
        let item = pending_item();
        assert_eq!(reject(&item, ""), Err(LifecycleError::ReasonRequired));
        assert_eq!(reject(&item, "   "), Err(LifecycleError::ReasonRequired));

        let outcome = reject(&item, "사유").unwrap();
        assert_eq!(outcome.status, DonationStatus::Rejected);
        assert_eq!(outcome.reason, "사유");
    }

    #[test]
    fn test_reject_allowed_while_awaiting_match() {
        let mut item = pending_item();
        item.status = DonationStatus::PendingMatch;
        assert_eq!(reject(&item, " 오염 ").unwrap().reason, "오염");

        item.status = DonationStatus::Matched;
        assert_eq!(reject(&item, "오염"), Err(LifecycleError::NotRejectable));
    }
}
