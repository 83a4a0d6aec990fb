//! The calls the views make, independent of transport.

use domain::models::{
    ActionResponse, AdminDonationResponse, InviteDecision, MatchingInviteResponse, OrganSummary,
};
use domain::services::donor_status::DonationStatusResponse;
use uuid::Uuid;

use crate::error::ClientError;

/// Server operations used by the client views.
///
/// Mutating calls return the server's confirmation; views re-fetch their
/// snapshot afterwards instead of patching it locally.
#[async_trait::async_trait]
pub trait DonationBackend: Send + Sync {
    async fn list_pending(&self) -> Result<Vec<AdminDonationResponse>, ClientError>;

    async fn approve(&self, item_id: Uuid) -> Result<ActionResponse, ClientError>;

    async fn reject(&self, item_id: Uuid, reason: &str) -> Result<ActionResponse, ClientError>;

    async fn list_auto_match(&self) -> Result<Vec<AdminDonationResponse>, ClientError>;

    async fn list_organs(&self) -> Result<Vec<OrganSummary>, ClientError>;

    async fn assign(&self, item_id: Uuid, organ_id: Uuid) -> Result<ActionResponse, ClientError>;

    async fn list_invites(&self) -> Result<Vec<MatchingInviteResponse>, ClientError>;

    async fn respond_invite(
        &self,
        invite_id: Uuid,
        decision: InviteDecision,
        reason: Option<&str>,
    ) -> Result<ActionResponse, ClientError>;

    async fn donation_status(&self) -> Result<DonationStatusResponse, ClientError>;

    async fn cancel(&self, item_id: Uuid) -> Result<ActionResponse, ClientError>;
}
