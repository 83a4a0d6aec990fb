//! Organization entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{JoinRequestStatus, Organization};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for join request review state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "join_request_status", rename_all = "lowercase")]
pub enum JoinRequestStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<JoinRequestStatusDb> for JoinRequestStatus {
    fn from(status: JoinRequestStatusDb) -> Self {
        match status {
            JoinRequestStatusDb::Pending => JoinRequestStatus::Pending,
            JoinRequestStatusDb::Approved => JoinRequestStatus::Approved,
            JoinRequestStatusDb::Rejected => JoinRequestStatus::Rejected,
        }
    }
}

impl From<JoinRequestStatus> for JoinRequestStatusDb {
    fn from(status: JoinRequestStatus) -> Self {
        match status {
            JoinRequestStatus::Pending => JoinRequestStatusDb::Pending,
            JoinRequestStatus::Approved => JoinRequestStatusDb::Approved,
            JoinRequestStatus::Rejected => JoinRequestStatusDb::Rejected,
        }
    }
}

/// Organization row joined with its login name.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub business_no: String,
    pub contact_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: JoinRequestStatusDb,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<OrganizationEntity> for Organization {
    fn from(entity: OrganizationEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            username: entity.username,
            name: entity.name,
            business_no: entity.business_no,
            contact_name: entity.contact_name,
            phone: entity.phone,
            email: entity.email,
            address: entity.address,
            status: entity.status.into(),
            rejection_reason: entity.rejection_reason,
            submitted_at: entity.submitted_at,
            reviewed_at: entity.reviewed_at,
        }
    }
}
