//! Donation entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{
    DeliveryMethod, DonationImage, DonationItem, DonationMethod, DonationStatus, MediaKind,
    OrganizationRef,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for the donation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "donation_status", rename_all = "snake_case")]
pub enum DonationStatusDb {
    PendingApproval,
    PendingMatch,
    Matched,
    Rejected,
    PendingDelivery,
    Cancelled,
    Completed,
}

impl From<DonationStatusDb> for DonationStatus {
    fn from(status: DonationStatusDb) -> Self {
        match status {
            DonationStatusDb::PendingApproval => DonationStatus::PendingApproval,
            DonationStatusDb::PendingMatch => DonationStatus::PendingMatch,
            DonationStatusDb::Matched => DonationStatus::Matched,
            DonationStatusDb::Rejected => DonationStatus::Rejected,
            DonationStatusDb::PendingDelivery => DonationStatus::PendingDelivery,
            DonationStatusDb::Cancelled => DonationStatus::Cancelled,
            DonationStatusDb::Completed => DonationStatus::Completed,
        }
    }
}

impl From<DonationStatus> for DonationStatusDb {
    fn from(status: DonationStatus) -> Self {
        match status {
            DonationStatus::PendingApproval => DonationStatusDb::PendingApproval,
            DonationStatus::PendingMatch => DonationStatusDb::PendingMatch,
            DonationStatus::Matched => DonationStatusDb::Matched,
            DonationStatus::Rejected => DonationStatusDb::Rejected,
            DonationStatus::PendingDelivery => DonationStatusDb::PendingDelivery,
            DonationStatus::Cancelled => DonationStatusDb::Cancelled,
            DonationStatus::Completed => DonationStatusDb::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "donation_method", rename_all = "snake_case")]
pub enum DonationMethodDb {
    AutoMatch,
    DirectMatch,
}

impl From<DonationMethodDb> for DonationMethod {
    fn from(method: DonationMethodDb) -> Self {
        match method {
            DonationMethodDb::AutoMatch => DonationMethod::AutoMatch,
            DonationMethodDb::DirectMatch => DonationMethod::DirectMatch,
        }
    }
}

impl From<DonationMethod> for DonationMethodDb {
    fn from(method: DonationMethod) -> Self {
        match method {
            DonationMethod::AutoMatch => DonationMethodDb::AutoMatch,
            DonationMethod::DirectMatch => DonationMethodDb::DirectMatch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_method", rename_all = "snake_case")]
pub enum DeliveryMethodDb {
    SelfDelivery,
    Parcel,
}

impl From<DeliveryMethodDb> for DeliveryMethod {
    fn from(method: DeliveryMethodDb) -> Self {
        match method {
            DeliveryMethodDb::SelfDelivery => DeliveryMethod::SelfDelivery,
            DeliveryMethodDb::Parcel => DeliveryMethod::Parcel,
        }
    }
}

impl From<DeliveryMethod> for DeliveryMethodDb {
    fn from(method: DeliveryMethod) -> Self {
        match method {
            DeliveryMethod::SelfDelivery => DeliveryMethodDb::SelfDelivery,
            DeliveryMethod::Parcel => DeliveryMethodDb::Parcel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
pub enum MediaKindDb {
    Image,
    Video,
}

impl From<MediaKindDb> for MediaKind {
    fn from(kind: MediaKindDb) -> Self {
        match kind {
            MediaKindDb::Image => MediaKind::Image,
            MediaKindDb::Video => MediaKind::Video,
        }
    }
}

impl From<MediaKind> for MediaKindDb {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => MediaKindDb::Image,
            MediaKind::Video => MediaKindDb::Video,
        }
    }
}

/// Donation row joined with owner and organization names.
#[derive(Debug, Clone, FromRow)]
pub struct DonationEntity {
    pub id: Uuid,
    pub reference_code: String,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub owner_name: String,
    pub gender_type: String,
    pub main_category: String,
    pub detail_category: Option<String>,
    pub size: String,
    pub condition: Option<String>,
    pub description: String,
    pub quantity: i32,
    pub donation_method: DonationMethodDb,
    pub target_organization_id: Option<Uuid>,
    pub target_organization_name: Option<String>,
    pub delivery_method: DeliveryMethodDb,
    pub contact: Option<String>,
    pub desired_date: Option<NaiveDate>,
    pub memo: Option<String>,
    pub is_anonymous: bool,
    pub status: DonationStatusDb,
    pub rejection_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub pending_organization_id: Option<Uuid>,
    pub pending_organization_name: Option<String>,
    pub matched_organization_id: Option<Uuid>,
    pub matched_organization_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn org_ref(id: Option<Uuid>, name: Option<String>) -> Option<OrganizationRef> {
    Some(OrganizationRef::new(id?, name?))
}

impl DonationEntity {
    /// Builds the domain item with its media attached.
    pub fn into_domain(self, images: Vec<DonationImage>) -> DonationItem {
        DonationItem {
            id: self.id,
            reference_code: self.reference_code,
            owner_id: self.owner_id,
            owner_username: self.owner_username,
            owner_name: self.owner_name,
            gender_type: self.gender_type,
            main_category: self.main_category,
            detail_category: self.detail_category,
            size: self.size,
            condition: self.condition,
            description: self.description,
            quantity: self.quantity,
            images,
            donation_method: self.donation_method.into(),
            target_organization: org_ref(self.target_organization_id, self.target_organization_name),
            delivery_method: self.delivery_method.into(),
            contact: self.contact,
            desired_date: self.desired_date,
            memo: self.memo,
            is_anonymous: self.is_anonymous,
            status: self.status.into(),
            rejection_reason: self.rejection_reason,
            cancel_reason: self.cancel_reason,
            pending_organization: org_ref(
                self.pending_organization_id,
                self.pending_organization_name,
            ),
            matched_organization: org_ref(
                self.matched_organization_id,
                self.matched_organization_name,
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row mapping for the donation_images table.
#[derive(Debug, Clone, FromRow)]
pub struct DonationImageEntity {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub kind: MediaKindDb,
    pub url: String,
    pub position: i32,
}

impl From<DonationImageEntity> for DonationImage {
    fn from(entity: DonationImageEntity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind.into(),
            url: entity.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_roundtrip() {
        for status in [
            DonationStatus::PendingApproval,
            DonationStatus::PendingMatch,
            DonationStatus::Matched,
            DonationStatus::Rejected,
            DonationStatus::PendingDelivery,
            DonationStatus::Cancelled,
            DonationStatus::Completed,
        ] {
            let db: DonationStatusDb = status.into();
            assert_eq!(DonationStatus::from(db), status);
        }
    }

    #[test]
    fn test_org_ref_needs_id_and_name() {
        let id = Uuid::new_v4();
        assert!(org_ref(Some(id), Some("센터".into())).is_some());
        assert!(org_ref(Some(id), None).is_none());
        assert!(org_ref(None, Some("센터".into())).is_none());
    }
}
