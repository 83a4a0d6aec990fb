//! In-memory backend for view tests.

use std::sync::Mutex;

use chrono::Utc;
use domain::models::{
    ActionResponse, AdminDonationResponse, CanonicalStatus, DeliveryMethod, DonationMethod,
    InviteDecision, InviteStatus, MatchingInviteResponse, OrganSummary,
};
use domain::services::donor_status::{ApprovalItem, DonationStatusResponse};
use domain::services::status_counts;
use uuid::Uuid;

use crate::backend::DonationBackend;
use crate::error::ClientError;

#[derive(Default)]
struct FakeState {
    pending: Vec<AdminDonationResponse>,
    auto_match: Vec<AdminDonationResponse>,
    organs: Vec<OrganSummary>,
    organs_fail: bool,
    invites: Vec<MatchingInviteResponse>,
    status: Option<DonationStatusResponse>,
    fail_next: Option<(u16, String)>,
    calls: Vec<String>,
    mutations: usize,
}

/// Records every call and applies the happy-path effect of each mutation.
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn with_pending(items: Vec<AdminDonationResponse>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().pending = items;
        backend
    }

    pub fn with_auto_match(items: Vec<AdminDonationResponse>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().auto_match = items;
        backend
    }

    pub fn with_invites(invites: Vec<MatchingInviteResponse>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().invites = invites;
        backend
    }

    pub fn with_status(status: DonationStatusResponse) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().status = Some(status);
        backend
    }

    pub fn set_organs(&self, organs: Vec<OrganSummary>) {
        self.state.lock().unwrap().organs = organs;
    }

    pub fn fail_organs(&self) {
        self.state.lock().unwrap().organs_fail = true;
    }

    /// The next mutating call fails with this status and message.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_next = Some((status, message.to_string()));
    }

    pub fn clear_pending(&self) {
        self.state.lock().unwrap().pending.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.state.lock().unwrap().mutations
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    /// Counts a mutation and returns the scripted failure, if any.
    fn mutate(&self, call: String) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.mutations += 1;
        match state.fail_next.take() {
            Some((status, message)) => Err(ClientError::Server { status, message }),
            None => Ok(()),
        }
    }

    fn take_read_failure(&self) -> Result<(), ClientError> {
        match self.state.lock().unwrap().fail_next.take() {
            Some((status, message)) => Err(ClientError::Server { status, message }),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl DonationBackend for FakeBackend {
    async fn list_pending(&self) -> Result<Vec<AdminDonationResponse>, ClientError> {
        self.record("list_pending".into());
        Ok(self.state.lock().unwrap().pending.clone())
    }

    async fn approve(&self, item_id: Uuid) -> Result<ActionResponse, ClientError> {
        self.mutate(format!("approve {item_id}"))?;
        self.state.lock().unwrap().pending.retain(|i| i.id != item_id);
        Ok(ActionResponse::ok("기부가 승인되었습니다."))
    }

    async fn reject(&self, item_id: Uuid, reason: &str) -> Result<ActionResponse, ClientError> {
        self.mutate(format!("reject {item_id} {reason}"))?;
        self.state.lock().unwrap().pending.retain(|i| i.id != item_id);
        Ok(ActionResponse::ok("기부가 반려되었습니다."))
    }

    async fn list_auto_match(&self) -> Result<Vec<AdminDonationResponse>, ClientError> {
        self.record("list_auto_match".into());
        Ok(self.state.lock().unwrap().auto_match.clone())
    }

    async fn list_organs(&self) -> Result<Vec<OrganSummary>, ClientError> {
        self.record("list_organs".into());
        let state = self.state.lock().unwrap();
        if state.organs_fail {
            return Err(ClientError::Server {
                status: 503,
                message: String::new(),
            });
        }
        Ok(state.organs.clone())
    }

    async fn assign(&self, item_id: Uuid, organ_id: Uuid) -> Result<ActionResponse, ClientError> {
        self.mutate(format!("assign {item_id} {organ_id}"))?;
        self.state.lock().unwrap().auto_match.retain(|i| i.id != item_id);
        Ok(ActionResponse::ok("매칭 요청을 보냈습니다."))
    }

    async fn list_invites(&self) -> Result<Vec<MatchingInviteResponse>, ClientError> {
        self.record("list_invites".into());
        Ok(self.state.lock().unwrap().invites.clone())
    }

    async fn respond_invite(
        &self,
        invite_id: Uuid,
        decision: InviteDecision,
        reason: Option<&str>,
    ) -> Result<ActionResponse, ClientError> {
        self.mutate(format!("respond {invite_id} {decision:?}"))?;
        let mut state = self.state.lock().unwrap();
        if let Some(invite) = state.invites.iter_mut().find(|i| i.id == invite_id) {
            invite.status = match decision {
                InviteDecision::Accept => InviteStatus::Accepted,
                InviteDecision::Reject => InviteStatus::Rejected,
            };
            invite.response_reason = reason.map(str::to_string);
            invite.responded_at = Some(Utc::now());
        }
        Ok(ActionResponse::ok("응답이 저장되었습니다."))
    }

    async fn donation_status(&self) -> Result<DonationStatusResponse, ClientError> {
        self.record("donation_status".into());
        self.take_read_failure()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .status
            .clone()
            .unwrap_or_else(|| status_response(Vec::new())))
    }

    async fn cancel(&self, item_id: Uuid) -> Result<ActionResponse, ClientError> {
        self.mutate(format!("cancel {item_id}"))?;
        let mut state = self.state.lock().unwrap();
        if let Some(status) = state.status.as_mut() {
            if let Some(item) = status.approval_items.iter_mut().find(|i| i.id == item_id) {
                item.status = CanonicalStatus::Cancelled;
                item.cancellable = false;
            }
            status.status_counts =
                status_counts(status.approval_items.iter().map(|i| i.status.as_str()));
        }
        Ok(ActionResponse::ok("기부가 취소되었습니다."))
    }
}

pub(crate) fn auto_item(status: &str) -> AdminDonationResponse {
    AdminDonationResponse {
        id: Uuid::new_v4(),
        reference_code: "RW-20261019-0001".into(),
        owner: "donor01".into(),
        owner_name: "김기부".into(),
        name: "아동 겨울 외투".into(),
        items: "아동 / 상의 / 외투".into(),
        item_description: "두 번 입은 외투입니다.".into(),
        images: Vec::new(),
        donation_method: DonationMethod::AutoMatch,
        donation_method_label: DonationMethod::AutoMatch.label().into(),
        donation_organization_id: None,
        donation_organization: None,
        status: status.into(),
        status_label: String::new(),
        matching_info: String::new(),
        pending_organization_id: None,
        pending_organization: None,
        matched_organization_id: None,
        matched_organization: None,
        rejection_reason: None,
        is_anonymous: false,
        delivery_method: DeliveryMethod::Parcel,
        delivery_method_label: DeliveryMethod::Parcel.label().into(),
        memo: None,
        contact: None,
        desired_date: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn direct_item(status: &str, organization: &str) -> AdminDonationResponse {
    AdminDonationResponse {
        donation_method: DonationMethod::DirectMatch,
        donation_method_label: DonationMethod::DirectMatch.label().into(),
        donation_organization_id: Some(Uuid::new_v4()),
        donation_organization: Some(organization.into()),
        ..auto_item(status)
    }
}

pub(crate) fn organ(name: &str) -> OrganSummary {
    OrganSummary {
        id: Uuid::new_v4(),
        name: name.into(),
        username: format!("org_{}", &Uuid::new_v4().simple().to_string()[..6]),
    }
}

pub(crate) fn invite(status: InviteStatus) -> MatchingInviteResponse {
    MatchingInviteResponse {
        id: Uuid::new_v4(),
        donation_id: Uuid::new_v4(),
        reference_code: "RW-20261019-0002".into(),
        item_name: "성인 니트".into(),
        donor_name: "김기부".into(),
        organization_id: Uuid::new_v4(),
        organization_name: "임당초등학교".into(),
        organization_username: "school01".into(),
        status,
        response_reason: None,
        created_at: Utc::now(),
        responded_at: None,
    }
}

pub(crate) fn approval_item(status: CanonicalStatus) -> ApprovalItem {
    ApprovalItem {
        id: Uuid::new_v4(),
        reference_code: "RW-20261019-0003".into(),
        name: "아동 겨울 외투".into(),
        category: "아동 / 상의".into(),
        registered_at: "2026-10-19".into(),
        status,
        status_label: String::new(),
        matching_info: String::new(),
        matched_organization: None,
        cancellable: status.is_cancellable(),
    }
}

pub(crate) fn status_response(items: Vec<ApprovalItem>) -> DonationStatusResponse {
    DonationStatusResponse {
        status_counts: status_counts(items.iter().map(|i| i.status.as_str())),
        approval_items: items,
        completed_donations: Vec::new(),
    }
}
