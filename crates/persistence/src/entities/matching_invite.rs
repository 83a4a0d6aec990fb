//! Matching invite entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{InviteStatus, MatchingInvite, OrganizationRef};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invite_status", rename_all = "lowercase")]
pub enum InviteStatusDb {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl From<InviteStatusDb> for InviteStatus {
    fn from(status: InviteStatusDb) -> Self {
        match status {
            InviteStatusDb::Pending => InviteStatus::Pending,
            InviteStatusDb::Accepted => InviteStatus::Accepted,
            InviteStatusDb::Rejected => InviteStatus::Rejected,
            InviteStatusDb::Withdrawn => InviteStatus::Withdrawn,
        }
    }
}

impl From<InviteStatus> for InviteStatusDb {
    fn from(status: InviteStatus) -> Self {
        match status {
            InviteStatus::Pending => InviteStatusDb::Pending,
            InviteStatus::Accepted => InviteStatusDb::Accepted,
            InviteStatus::Rejected => InviteStatusDb::Rejected,
            InviteStatus::Withdrawn => InviteStatusDb::Withdrawn,
        }
    }
}

/// Invite row joined with donation and organization details.
#[derive(Debug, Clone, FromRow)]
pub struct MatchingInviteEntity {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub reference_code: String,
    pub item_name: String,
    pub donor_name: String,
    pub is_anonymous: bool,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub organization_username: String,
    pub status: InviteStatusDb,
    pub response_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<MatchingInviteEntity> for MatchingInvite {
    fn from(entity: MatchingInviteEntity) -> Self {
        Self {
            id: entity.id,
            donation_id: entity.donation_id,
            reference_code: entity.reference_code,
            item_name: entity.item_name,
            donor_name: if entity.is_anonymous {
                "익명".to_string()
            } else {
                entity.donor_name
            },
            organization: OrganizationRef::new(entity.organization_id, entity.organization_name),
            organization_username: entity.organization_username,
            status: entity.status.into(),
            response_reason: entity.response_reason,
            created_at: entity.created_at,
            responded_at: entity.responded_at,
        }
    }
}
