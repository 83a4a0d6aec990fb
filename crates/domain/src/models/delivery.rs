//! Shipment records for matched donations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::DonationStatus;

/// Placeholder used when a party has not provided contact details yet.
pub const UNKNOWN_NAME: &str = "미정";
pub const UNKNOWN_PHONE: &str = "010-0000-0000";
pub const UNKNOWN_ADDRESS: &str = "주소 미정";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Shipped,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Shipped => "SHIPPED",
            DeliveryStatus::Delivered => "DELIVERED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "배송준비",
            DeliveryStatus::Shipped => "배송중",
            DeliveryStatus::Delivered => "배송완료",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            DeliveryStatus::Pending => 0,
            DeliveryStatus::Shipped => 1,
            DeliveryStatus::Delivered => 2,
        }
    }

    /// Shipments only move forward. Re-sending the current status is allowed.
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        next.rank() >= self.rank()
    }

    /// Donation status implied by this shipment status, if it changes one.
    pub fn donation_status(&self) -> Option<DonationStatus> {
        match self {
            DeliveryStatus::Pending => None,
            DeliveryStatus::Shipped => Some(DonationStatus::PendingDelivery),
            DeliveryStatus::Delivered => Some(DonationStatus::Completed),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(DeliveryStatus::Pending),
            "SHIPPED" | "IN_TRANSIT" => Ok(DeliveryStatus::Shipped),
            "DELIVERED" | "COMPLETED" => Ok(DeliveryStatus::Delivered),
            _ => Err(format!("유효하지 않은 배송 상태입니다: {}", s)),
        }
    }
}

/// Contact details of one end of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl Party {
    /// Fills missing fields with the placeholders.
    pub fn with_fallbacks(name: Option<&str>, phone: Option<&str>, address: Option<&str>) -> Self {
        fn pick(value: Option<&str>, fallback: &str) -> String {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }
        Self {
            name: pick(name, UNKNOWN_NAME),
            phone: pick(phone, UNKNOWN_PHONE),
            address: pick(address, UNKNOWN_ADDRESS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub donor_id: Uuid,
    pub item_name: String,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub sender: Party,
    pub receiver: Party,
    pub status: DeliveryStatus,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shipment as returned to donors and admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub id: Uuid,
    pub donation_id: Uuid,
    pub item_name: String,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub sender_name: String,
    pub sender_phone: String,
    pub sender_address: String,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub status: DeliveryStatus,
    pub status_label: String,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Delivery> for DeliveryResponse {
    fn from(d: Delivery) -> Self {
        Self {
            id: d.id,
            donation_id: d.donation_id,
            item_name: d.item_name,
            tracking_number: d.tracking_number,
            carrier: d.carrier,
            sender_name: d.sender.name,
            sender_phone: d.sender.phone,
            sender_address: d.sender.address,
            receiver_name: d.receiver.name,
            receiver_phone: d.receiver.phone,
            receiver_address: d.receiver.address,
            status: d.status,
            status_label: d.status.label().to_string(),
            shipped_at: d.shipped_at,
            delivered_at: d.delivered_at,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryListResponse {
    pub deliveries: Vec<DeliveryResponse>,
    pub count: usize,
}

/// Admin shipment update. `status` arrives as free text and is parsed by the handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeliveryRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDeliveryResponse {
    pub success: bool,
    pub message: String,
    pub delivery: DeliveryResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only_transitions() {
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Shipped));
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Delivered));
        assert!(DeliveryStatus::Shipped.can_transition_to(DeliveryStatus::Shipped));
        assert!(!DeliveryStatus::Delivered.can_transition_to(DeliveryStatus::Shipped));
        assert!(!DeliveryStatus::Shipped.can_transition_to(DeliveryStatus::Pending));
    }

    #[test]
    fn test_donation_status_follows_shipment() {
        assert_eq!(DeliveryStatus::Pending.donation_status(), None);
        assert_eq!(
            DeliveryStatus::Shipped.donation_status(),
            Some(DonationStatus::PendingDelivery)
        );
        assert_eq!(
            DeliveryStatus::Delivered.donation_status(),
            Some(DonationStatus::Completed)
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("shipped".parse::<DeliveryStatus>().unwrap(), DeliveryStatus::Shipped);
        assert_eq!(" DELIVERED ".parse::<DeliveryStatus>().unwrap(), DeliveryStatus::Delivered);
        let err = "LOST".parse::<DeliveryStatus>().unwrap_err();
        assert_eq!(err, "유효하지 않은 배송 상태입니다: LOST");
    }

    #[test]
    fn test_party_fallbacks() {
        let party = Party::with_fallbacks(Some("홍길동"), None, Some("  "));
        assert_eq!(party.name, "홍길동");
        assert_eq!(party.phone, UNKNOWN_PHONE);
        assert_eq!(party.address, UNKNOWN_ADDRESS);
    }

    #[test]
    fn test_labels_are_completed_labels() {
        use crate::models::status::is_completed_label;
        assert!(is_completed_label(DeliveryStatus::Delivered.label()));
        assert!(!is_completed_label(DeliveryStatus::Shipped.label()));
    }
}
