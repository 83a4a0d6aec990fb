//! Organization matching for approved donations.

use uuid::Uuid;

use super::{LifecycleError, LifecycleSubject};
use crate::models::{
    DonationMethod, DonationStatus, InviteDecision, MatchingInvite, Organization, OrganizationRef,
};

/// Auto-match items that are approved and have no organization proposed yet.
///
/// A direct-match item becomes auto-match when its organization declines, so
/// it shows up here too.
pub fn is_auto_match_candidate<S: LifecycleSubject + ?Sized>(item: &S) -> bool {
    item.donation_method() == DonationMethod::AutoMatch
        && item.lifecycle_status() == DonationStatus::PendingMatch
        && item.pending_organization().is_none()
}

/// Checks a proposal before any lookup. Returns the organization id to load.
pub fn check_proposal<S: LifecycleSubject + ?Sized>(
    item: &S,
    organ_id: Option<Uuid>,
) -> Result<Uuid, LifecycleError> {
    let organ_id = organ_id.ok_or(LifecycleError::OrganizationRequired)?;
    if !is_auto_match_candidate(item) {
        return Err(LifecycleError::NotAutoMatchCandidate);
    }
    Ok(organ_id)
}

/// Only approved organizations receive invites.
pub fn ensure_assignable(organization: &Organization) -> Result<OrganizationRef, LifecycleError> {
    if organization.is_approved() {
        Ok(organization.to_ref())
    } else {
        Err(LifecycleError::OrganizationNotApproved)
    }
}

/// What an invite response does to the invite and its donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteResolution {
    /// Donation becomes `MATCHED` with this organization and a shipment is opened.
    Accepted { organization: OrganizationRef },
    /// Donation stays `PENDING_MATCH`, switches to `AUTO_MATCH` and returns
    /// to the candidate queue.
    Rejected { reason: String },
}

/// Validates an organization's response to an invite.
pub fn resolve_invite(
    invite: &MatchingInvite,
    responder_organization_id: Uuid,
    decision: InviteDecision,
    reason: Option<&str>,
) -> Result<InviteResolution, LifecycleError> {
    if invite.organization.id != responder_organization_id {
        return Err(LifecycleError::NotInviteRecipient);
    }
    if !invite.status.is_open() {
        return Err(LifecycleError::InviteClosed);
    }
    match decision {
        InviteDecision::Accept => Ok(InviteResolution::Accepted {
            organization: invite.organization.clone(),
        }),
        InviteDecision::Reject => {
            let reason = reason.map(str::trim).unwrap_or_default();
            if reason.is_empty() {
                return Err(LifecycleError::InviteReasonRequired);
            }
            Ok(InviteResolution::Rejected {
                reason: reason.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::donation::fixtures::{direct_item, pending_item};
    use crate::models::{InviteStatus, JoinRequestStatus};
    use chrono::Utc;

    fn invite(org: &OrganizationRef) -> MatchingInvite {
        MatchingInvite {
            id: Uuid::new_v4(),
            donation_id: Uuid::new_v4(),
            reference_code: "RW-ABCDEF".into(),
            item_name: "맨투맨".into(),
            donor_name: "홍길동".into(),
            organization: org.clone(),
            organization_username: "imdang".into(),
            status: InviteStatus::Pending,
            response_reason: None,
            created_at: Utc::now(),
            responded_at: None,
        }
    }

    fn organization(status: JoinRequestStatus) -> Organization {
        Organization {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: "imdang".into(),
            name: "임당초등학교".into(),
            business_no: "123-45-67890".into(),
            contact_name: "김담당".into(),
            phone: "053-123-4567".into(),
            email: None,
            address: None,
            status,
            rejection_reason: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
        }
    }

    #[test]
    fn test_candidate_filter() {
        let mut item = pending_item();
        assert!(!is_auto_match_candidate(&item));

        item.status = DonationStatus::PendingMatch;
        assert!(is_auto_match_candidate(&item));

        item.pending_organization = Some(OrganizationRef::new(Uuid::new_v4(), "센터"));
        assert!(!is_auto_match_candidate(&item));

        let mut direct = direct_item();
        direct.status = DonationStatus::PendingMatch;
        assert!(!is_auto_match_candidate(&direct));
    }

    #[test]
    fn test_declined_direct_match_can_be_proposed_again() {
        let mut item = direct_item();
        item.status = DonationStatus::PendingMatch;
        item.pending_organization = item.target_organization.clone();
        assert!(!is_auto_match_candidate(&item));

        // What an invite decline leaves behind
        item.pending_organization = None;
        item.donation_method = DonationMethod::AutoMatch;
        assert!(is_auto_match_candidate(&item));
        let id = Uuid::new_v4();
        assert_eq!(check_proposal(&item, Some(id)), Ok(id));
    }

    #[test]
    fn test_proposal_requires_organization() {
        let mut item = pending_item();
        item.status = DonationStatus::PendingMatch;
        assert_eq!(
            check_proposal(&item, None),
            Err(LifecycleError::OrganizationRequired)
        );
        let id = Uuid::new_v4();
        assert_eq!(check_proposal(&item, Some(id)), Ok(id));
    }

    #[test]
    fn test_proposal_rejects_non_candidates() {
        let item = pending_item();
        assert_eq!(
            check_proposal(&item, Some(Uuid::new_v4())),
            Err(LifecycleError::NotAutoMatchCandidate)
        );
    }

    #[test]
    fn test_only_approved_organizations_are_assignable() {
        assert!(ensure_assignable(&organization(JoinRequestStatus::Approved)).is_ok());
        assert_eq!(
            ensure_assignable(&organization(JoinRequestStatus::Pending)),
            Err(LifecycleError::OrganizationNotApproved)
        );
    }

    #[test]
    fn test_reject_requires_reason() {
        let org = OrganizationRef::new(Uuid::new_v4(), "임당초등학교");
        let invite = invite(&org);
        assert_eq!(
            resolve_invite(&invite, org.id, InviteDecision::Reject, Some("")),
            Err(LifecycleError::InviteReasonRequired)
        );
        assert_eq!(
            resolve_invite(&invite, org.id, InviteDecision::Reject, None),
            Err(LifecycleError::InviteReasonRequired)
        );
        assert_eq!(
            resolve_invite(&invite, org.id, InviteDecision::Reject, Some("재고 없음")),
            Ok(InviteResolution::Rejected {
                reason: "재고 없음".into()
            })
        );
    }

    #[test]
    fn test_accept_matches_organization() {
        let org = OrganizationRef::new(Uuid::new_v4(), "임당초등학교");
        assert_eq!(
            resolve_invite(&invite(&org), org.id, InviteDecision::Accept, None),
            Ok(InviteResolution::Accepted { organization: org })
        );
    }

    #[test]
    fn test_only_recipient_may_respond_once() {
        let org = OrganizationRef::new(Uuid::new_v4(), "임당초등학교");
        let mut invite = invite(&org);
        assert_eq!(
            resolve_invite(&invite, Uuid::new_v4(), InviteDecision::Accept, None),
            Err(LifecycleError::NotInviteRecipient)
        );

        invite.status = InviteStatus::Accepted;
        assert_eq!(
            resolve_invite(&invite, org.id, InviteDecision::Accept, None),
            Err(LifecycleError::InviteClosed)
        );
    }

    #[test]
    fn test_withdrawn_invite_is_closed() {
        let org = OrganizationRef::new(Uuid::new_v4(), "임당초등학교");
        let mut invite = invite(&org);
        invite.status = InviteStatus::Withdrawn;
        assert_eq!(
            resolve_invite(&invite, org.id, InviteDecision::Reject, Some("재고 없음")),
            Err(LifecycleError::InviteClosed)
        );
    }
}
