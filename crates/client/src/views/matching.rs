//! Matching queue for admins and the invite inbox for organizations.

use domain::models::{
    AdminDonationResponse, InviteDecision, MatchingInviteResponse, OrganSummary,
};
use domain::services::{check_proposal, is_auto_match_candidate, LifecycleError};
use tracing::debug;
use uuid::Uuid;

use super::record_failure;
use crate::backend::DonationBackend;
use crate::error::ClientError;
use crate::notice::Notice;

const VIEW: &str = "matching";
const INBOX_VIEW: &str = "invite_inbox";

/// Auto-match candidates and the organizations they can be proposed to.
pub struct MatchingView<B> {
    backend: B,
    candidates: Vec<AdminDonationResponse>,
    organs: Vec<OrganSummary>,
    notice: Option<Notice>,
}

impl<B: DonationBackend> MatchingView<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            candidates: Vec::new(),
            organs: Vec::new(),
            notice: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn candidates(&self) -> &[AdminDonationResponse] {
        &self.candidates
    }

    pub fn organs(&self) -> &[OrganSummary] {
        &self.organs
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Reloads candidates. The organization list is optional and falls back
    /// to empty when it cannot be fetched.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let candidates = match self.backend.list_auto_match().await {
            Ok(items) => items,
            Err(e) => return record_failure(&mut self.notice, VIEW, e),
        };
        self.candidates = candidates
            .into_iter()
            .filter(|item| is_auto_match_candidate(item))
            .collect();

        self.organs = match self.backend.list_organs().await {
            Ok(organs) => organs,
            Err(e) => {
                debug!(error = %e, "Organization list unavailable");
                Vec::new()
            }
        };
        Ok(())
    }

    /// Matches `organ_ref` against the loaded organizations by id, name or
    /// username, then as a bare id.
    fn resolve_organ(&self, organ_ref: &str) -> Option<Uuid> {
        self.organs
            .iter()
            .find(|o| o.name == organ_ref || o.username == organ_ref || o.id.to_string() == organ_ref)
            .map(|o| o.id)
            .or_else(|| Uuid::parse_str(organ_ref).ok())
    }

    fn prepare(&self, item_id: Uuid, organ_ref: &str) -> Result<Uuid, ClientError> {
        let organ_ref = organ_ref.trim();
        if organ_ref.is_empty() {
            return Err(LifecycleError::OrganizationRequired.into());
        }
        let item = self
            .candidates
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ClientError::Validation("기부 항목을 찾을 수 없습니다.".to_string()))?;
        let organ_id = self
            .resolve_organ(organ_ref)
            .ok_or_else(|| ClientError::Validation("승인된 기관을 찾을 수 없습니다.".to_string()))?;
        Ok(check_proposal(item, Some(organ_id))?)
    }

    /// Proposes a candidate to an organization, then reloads the queue.
    pub async fn propose(&mut self, item_id: Uuid, organ_ref: &str) -> Result<(), ClientError> {
        let organ_id = match self.prepare(item_id, organ_ref) {
            Ok(id) => id,
            Err(e) => return record_failure(&mut self.notice, VIEW, e),
        };

        match self.backend.assign(item_id, organ_id).await {
            Ok(response) => {
                self.notice = Some(Notice::success(response.message));
                self.refresh().await
            }
            Err(e) => record_failure(&mut self.notice, VIEW, e),
        }
    }
}

/// Invites addressed to the signed-in organization.
pub struct InviteInboxView<B> {
    backend: B,
    invites: Vec<MatchingInviteResponse>,
    notice: Option<Notice>,
}

impl<B: DonationBackend> InviteInboxView<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            invites: Vec::new(),
            notice: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn invites(&self) -> &[MatchingInviteResponse] {
        &self.invites
    }

    /// Invites still awaiting an answer.
    pub fn open_invites(&self) -> impl Iterator<Item = &MatchingInviteResponse> {
        self.invites.iter().filter(|invite| invite.status.is_open())
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.backend.list_invites().await {
            Ok(invites) => {
                self.invites = invites;
                Ok(())
            }
            Err(e) => record_failure(&mut self.notice, INBOX_VIEW, e),
        }
    }

    fn prepare<'a>(
        &self,
        invite_id: Uuid,
        decision: InviteDecision,
        reason: Option<&'a str>,
    ) -> Result<Option<&'a str>, ClientError> {
        let invite = self
            .invites
            .iter()
            .find(|invite| invite.id == invite_id)
            .ok_or_else(|| ClientError::Validation("매칭 요청을 찾을 수 없습니다.".to_string()))?;
        if !invite.status.is_open() {
            return Err(LifecycleError::InviteClosed.into());
        }

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        if decision == InviteDecision::Reject && reason.is_none() {
            return Err(LifecycleError::InviteReasonRequired.into());
        }
        Ok(reason)
    }

    /// Accepts or declines an invite. Declining needs a reason.
    pub async fn respond(
        &mut self,
        invite_id: Uuid,
        decision: InviteDecision,
        reason: Option<&str>,
    ) -> Result<(), ClientError> {
        let reason = match self.prepare(invite_id, decision, reason) {
            Ok(reason) => reason,
            Err(e) => return record_failure(&mut self.notice, INBOX_VIEW, e),
        };

        match self.backend.respond_invite(invite_id, decision, reason).await {
            Ok(response) => {
                self.notice = Some(Notice::success(response.message));
                self.refresh().await
            }
            Err(e) => record_failure(&mut self.notice, INBOX_VIEW, e),
        }
    }
}
