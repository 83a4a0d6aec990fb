//! Donor-facing status page: in-progress items, counts and completed history.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LifecycleError, LifecycleSubject};
use crate::models::status::COMPLETED_LABEL;
use crate::models::{is_completed_label, CanonicalStatus, DonationItem, DonationStatus};

/// Number of items per canonical status, always holding all six keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCounts(BTreeMap<CanonicalStatus, usize>);

impl Default for StatusCounts {
    fn default() -> Self {
        Self(CanonicalStatus::ALL.into_iter().map(|s| (s, 0)).collect())
    }
}

impl StatusCounts {
    pub fn get(&self, status: CanonicalStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    fn add(&mut self, status: CanonicalStatus) {
        *self.0.entry(status).or_insert(0) += 1;
    }
}

/// Histogram of raw status strings over the canonical statuses.
///
/// Completed items are tracked in the history and are not counted.
pub fn status_counts<I, S>(raw_statuses: I) -> StatusCounts
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = StatusCounts::default();
    for raw in raw_statuses {
        if let Some(status) = DonationStatus::project(raw.as_ref()).canonical() {
            counts.add(status);
        }
    }
    counts
}

/// Names a donor may appear under as shipment sender.
#[derive(Debug, Clone)]
pub struct DonorIdentity {
    pub name: String,
    pub nickname: Option<String>,
    pub username: String,
}

impl DonorIdentity {
    /// Exact comparison after trimming; nickname is skipped when absent or blank.
    pub fn matches(&self, sender_name: &str) -> bool {
        let sender = sender_name.trim();
        if sender.is_empty() {
            return false;
        }
        [
            Some(self.name.as_str()),
            self.nickname.as_deref(),
            Some(self.username.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .any(|candidate| !candidate.is_empty() && candidate == sender)
    }
}

/// Shipment as seen by the status page.
#[derive(Debug, Clone)]
pub struct ShipmentRecord {
    pub donation_id: Uuid,
    pub sender_name: String,
    pub status_label: String,
    pub items: String,
    pub organization: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedDonation {
    pub id: Uuid,
    pub date: String,
    pub items: String,
    pub organization: String,
    pub status: String,
}

pub(crate) fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Completed shipments sent by this donor, one entry per donation.
pub fn completed_history(
    shipments: &[ShipmentRecord],
    donor: &DonorIdentity,
) -> Vec<CompletedDonation> {
    let mut seen = HashSet::new();
    shipments
        .iter()
        .filter(|s| is_completed_label(&s.status_label))
        .filter(|s| donor.matches(&s.sender_name))
        .filter(|s| seen.insert(s.donation_id))
        .map(|s| CompletedDonation {
            id: s.donation_id,
            date: format_date(s.date),
            items: s.items.clone(),
            organization: s.organization.clone(),
            status: COMPLETED_LABEL.to_string(),
        })
        .collect()
}

/// Donors may withdraw only before an organization is matched.
pub fn ensure_cancellable<S: LifecycleSubject + ?Sized>(item: &S) -> Result<(), LifecycleError> {
    match item.lifecycle_status().canonical() {
        Some(status) if status.is_cancellable() => Ok(()),
        _ => Err(LifecycleError::NotCancellable),
    }
}

/// In-progress item row on the status page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalItem {
    pub id: Uuid,
    pub reference_code: String,
    pub name: String,
    pub category: String,
    pub registered_at: String,
    pub status: CanonicalStatus,
    pub status_label: String,
    pub matching_info: String,
    pub matched_organization: Option<String>,
    pub cancellable: bool,
}

impl ApprovalItem {
    /// `None` for completed items, which belong to the history instead.
    pub fn from_item(item: &DonationItem) -> Option<Self> {
        let status = item.status.canonical()?;
        Some(Self {
            id: item.id,
            reference_code: item.reference_code.clone(),
            name: item.title(),
            category: item.main_category.clone(),
            registered_at: format_date(Some(item.created_at)),
            status,
            status_label: status.label().to_string(),
            matching_info: item.matching_info(),
            matched_organization: item
                .matched_organization
                .as_ref()
                .or(item.pending_organization.as_ref())
                .map(|o| o.name.clone()),
            cancellable: status.is_cancellable(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationStatusResponse {
    pub approval_items: Vec<ApprovalItem>,
    pub status_counts: StatusCounts,
    pub completed_donations: Vec<CompletedDonation>,
}

/// Assembles the status page for one donor.
pub fn build_status_response(
    items: &[DonationItem],
    shipments: &[ShipmentRecord],
    donor: &DonorIdentity,
) -> DonationStatusResponse {
    let approval_items: Vec<ApprovalItem> =
        items.iter().filter_map(ApprovalItem::from_item).collect();
    let status_counts = status_counts(approval_items.iter().map(|i| i.status.as_str()));
    DonationStatusResponse {
        approval_items,
        status_counts,
        completed_donations: completed_history(shipments, donor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::donation::fixtures::pending_item;
    use chrono::TimeZone;

    fn donor() -> DonorIdentity {
        DonorIdentity {
            name: "홍길동".into(),
            nickname: Some("길동이".into()),
            username: "donor01".into(),
        }
    }

    fn shipment(sender: &str, label: &str) -> ShipmentRecord {
        ShipmentRecord {
            donation_id: Uuid::new_v4(),
            sender_name: sender.into(),
            status_label: label.into(),
            items: "아동 의류 상의 (M)".into(),
            organization: "임당초등학교".into(),
            date: Some(Utc.with_ymd_and_hms(2024, 11, 3, 9, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_histogram_is_zero_filled() {
        let counts = status_counts(["PENDING_APPROVAL", "PENDING_APPROVAL", "MATCHED"]);
        assert_eq!(counts.get(CanonicalStatus::PendingApproval), 2);
        assert_eq!(counts.get(CanonicalStatus::Matched), 1);
        for status in [
            CanonicalStatus::PendingMatch,
            CanonicalStatus::Rejected,
            CanonicalStatus::PendingDelivery,
            CanonicalStatus::Cancelled,
        ] {
            assert_eq!(counts.get(status), 0);
        }
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_histogram_skips_completed() {
        let counts = status_counts(["COMPLETED", "배송완료", "거절됨"]);
        assert_eq!(counts.total(), 1);
        assert_eq!(counts.get(CanonicalStatus::Rejected), 1);
    }

    #[test]
    fn test_counts_serialize_with_every_key() {
        let json = serde_json::to_value(status_counts(Vec::<&str>::new())).unwrap();
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 6);
        assert_eq!(json["PENDING_DELIVERY"], 0);
    }

    #[test]
    fn test_history_matches_any_identity_exactly() {
        let shipments = vec![
            shipment(" 홍길동 ", "배송완료"),
            shipment("길동이", "완료"),
            shipment("donor01", "DELIVERED"),
            shipment("홍길", "배송완료"),
            shipment("DONOR01", "배송완료"),
            shipment("홍길동", "배송중"),
        ];
        let history = completed_history(&shipments, &donor());
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|h| h.status == "완료"));
        assert_eq!(history[0].date, "2024-11-03");
    }

    #[test]
    fn test_history_keeps_first_shipment_per_donation() {
        let first = shipment("홍길동", "배송완료");
        let mut second = shipment("홍길동", "배송완료");
        second.donation_id = first.donation_id;
        second.organization = "다른 기관".into();

        let history = completed_history(&[first, second], &donor());
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].organization, "임당초등학교");
    }

    #[test]
    fn test_blank_nickname_never_matches() {
        let identity = DonorIdentity {
            nickname: Some("  ".into()),
            ..donor()
        };
        assert!(!identity.matches(""));
        assert!(!identity.matches("   "));
        assert!(identity.matches("donor01"));
    }

    #[test]
    fn test_missing_date_formats_as_dash() {
        let mut record = shipment("홍길동", "완료");
        record.date = None;
        assert_eq!(completed_history(&[record], &donor())[0].date, "-");
    }

    #[test]
    fn test_cancel_only_before_match() {
        let mut item = pending_item();
        assert!(ensure_cancellable(&item).is_ok());
        item.status = DonationStatus::PendingMatch;
        assert!(ensure_cancellable(&item).is_ok());

        for status in [
            DonationStatus::Matched,
            DonationStatus::Rejected,
            DonationStatus::PendingDelivery,
            DonationStatus::Cancelled,
            DonationStatus::Completed,
        ] {
            item.status = status;
            assert_eq!(ensure_cancellable(&item), Err(LifecycleError::NotCancellable));
            assert_eq!(item.status, status);
        }
    }

    #[test]
    fn test_status_response_excludes_completed_items() {
        let waiting = pending_item();
        let mut done = pending_item();
        done.status = DonationStatus::Completed;
        let mut matched = pending_item();
        matched.status = DonationStatus::Matched;

        let response = build_status_response(
            &[waiting, done, matched],
            &[shipment("홍길동", "배송완료")],
            &donor(),
        );
        assert_eq!(response.approval_items.len(), 2);
        assert_eq!(response.status_counts.get(CanonicalStatus::PendingApproval), 1);
        assert_eq!(response.status_counts.get(CanonicalStatus::Matched), 1);
        assert_eq!(response.completed_donations.len(), 1);
        assert!(response.approval_items[0].cancellable);
        assert!(!response.approval_items[1].cancellable);
    }
}
