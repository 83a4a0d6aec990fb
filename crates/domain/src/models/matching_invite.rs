//! Invitations asking an organization to take a donation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organization::OrganizationRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
    /// Closed because the donation was rejected or cancelled first.
    Withdrawn,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "PENDING",
            InviteStatus::Accepted => "ACCEPTED",
            InviteStatus::Rejected => "REJECTED",
            InviteStatus::Withdrawn => "WITHDRAWN",
        }
    }

    pub fn is_open(&self) -> bool {
        *self == InviteStatus::Pending
    }
}

/// An organization's answer to an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteDecision {
    #[serde(alias = "accept")]
    Accept,
    #[serde(alias = "reject")]
    Reject,
}

#[derive(Debug, Clone)]
pub struct MatchingInvite {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub reference_code: String,
    pub item_name: String,
    pub donor_name: String,
    pub organization: OrganizationRef,
    pub organization_username: String,
    pub status: InviteStatus,
    pub response_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondInviteRequest {
    pub decision: InviteDecision,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingInviteResponse {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub reference_code: String,
    pub item_name: String,
    pub donor_name: String,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub organization_username: String,
    pub status: InviteStatus,
    pub response_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<MatchingInvite> for MatchingInviteResponse {
    fn from(invite: MatchingInvite) -> Self {
        Self {
            id: invite.id,
            donation_id: invite.donation_id,
            reference_code: invite.reference_code,
            item_name: invite.item_name,
            donor_name: invite.donor_name,
            organization_id: invite.organization.id,
            organization_name: invite.organization.name,
            organization_username: invite.organization_username,
            status: invite.status,
            response_reason: invite.response_reason,
            created_at: invite.created_at,
            responded_at: invite.responded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteListResponse {
    pub invites: Vec<MatchingInviteResponse>,
    pub count: usize,
}

impl InviteListResponse {
    pub fn new(invites: Vec<MatchingInviteResponse>) -> Self {
        let count = invites.len();
        Self { invites, count }
    }
}
