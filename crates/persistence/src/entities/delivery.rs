//! Delivery entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Delivery, DeliveryStatus, Party};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "lowercase")]
pub enum DeliveryStatusDb {
    Pending,
    Shipped,
    Delivered,
}

impl From<DeliveryStatusDb> for DeliveryStatus {
    fn from(status: DeliveryStatusDb) -> Self {
        match status {
            DeliveryStatusDb::Pending => DeliveryStatus::Pending,
            DeliveryStatusDb::Shipped => DeliveryStatus::Shipped,
            DeliveryStatusDb::Delivered => DeliveryStatus::Delivered,
        }
    }
}

impl From<DeliveryStatus> for DeliveryStatusDb {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Pending => DeliveryStatusDb::Pending,
            DeliveryStatus::Shipped => DeliveryStatusDb::Shipped,
            DeliveryStatus::Delivered => DeliveryStatusDb::Delivered,
        }
    }
}

/// Delivery row joined with its donation's owner and item name.
#[derive(Debug, Clone, FromRow)]
pub struct DeliveryEntity {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub donor_id: Uuid,
    pub item_name: String,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub sender_name: String,
    pub sender_phone: String,
    pub sender_address: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub status: DeliveryStatusDb,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeliveryEntity> for Delivery {
    fn from(entity: DeliveryEntity) -> Self {
        Self {
            id: entity.id,
            donation_id: entity.donation_id,
            donor_id: entity.donor_id,
            item_name: entity.item_name,
            carrier: entity.carrier,
            tracking_number: entity.tracking_number,
            sender: Party {
                name: entity.sender_name,
                phone: entity.sender_phone,
                address: entity.sender_address,
            },
            receiver: Party {
                name: entity.receiver_name,
                phone: entity.receiver_phone,
                address: entity.receiver_address,
            },
            status: entity.status.into(),
            shipped_at: entity.shipped_at,
            delivered_at: entity.delivered_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
