//! Donation lifecycle statuses and the projection of raw status strings.
//!
//! Status strings reach the system in several spellings: the stored codes
//! (`PENDING_MATCH`), lowercase database values, and the Korean labels the
//! web client shows (`매칭대기`). [`normalize`] maps any of them onto
//! [`CanonicalStatus`] and never fails.

use serde::{Deserialize, Serialize};

/// Stored lifecycle status of a donation item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    PendingApproval,
    PendingMatch,
    Matched,
    Rejected,
    PendingDelivery,
    Cancelled,
    Completed,
}

/// The six statuses a donor or admin sees while an item is in progress.
///
/// Completed shipments are tracked separately and are not part of this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalStatus {
    PendingApproval,
    PendingMatch,
    Matched,
    Rejected,
    PendingDelivery,
    Cancelled,
}

impl CanonicalStatus {
    /// Display order used by the donor status histogram.
    pub const ALL: [CanonicalStatus; 6] = [
        CanonicalStatus::PendingApproval,
        CanonicalStatus::PendingMatch,
        CanonicalStatus::Matched,
        CanonicalStatus::Rejected,
        CanonicalStatus::PendingDelivery,
        CanonicalStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalStatus::PendingApproval => "PENDING_APPROVAL",
            CanonicalStatus::PendingMatch => "PENDING_MATCH",
            CanonicalStatus::Matched => "MATCHED",
            CanonicalStatus::Rejected => "REJECTED",
            CanonicalStatus::PendingDelivery => "PENDING_DELIVERY",
            CanonicalStatus::Cancelled => "CANCELLED",
        }
    }

    /// Korean label shown in the web client.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalStatus::PendingApproval => "승인대기",
            CanonicalStatus::PendingMatch => "매칭대기",
            CanonicalStatus::Matched => "매칭됨",
            CanonicalStatus::Rejected => "거절됨",
            CanonicalStatus::PendingDelivery => "배송대기",
            CanonicalStatus::Cancelled => "취소됨",
        }
    }

    /// Donors may withdraw an item only before it is matched.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            CanonicalStatus::PendingApproval | CanonicalStatus::PendingMatch
        )
    }
}

impl std::fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Completed => "COMPLETED",
            other => other.canonical().map(|c| c.as_str()).unwrap_or_default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DonationStatus::Completed => COMPLETED_LABEL,
            other => other.canonical().map(|c| c.label()).unwrap_or_default(),
        }
    }

    /// The in-progress status this maps to, or `None` for `Completed`.
    pub fn canonical(&self) -> Option<CanonicalStatus> {
        match self {
            DonationStatus::PendingApproval => Some(CanonicalStatus::PendingApproval),
            DonationStatus::PendingMatch => Some(CanonicalStatus::PendingMatch),
            DonationStatus::Matched => Some(CanonicalStatus::Matched),
            DonationStatus::Rejected => Some(CanonicalStatus::Rejected),
            DonationStatus::PendingDelivery => Some(CanonicalStatus::PendingDelivery),
            DonationStatus::Cancelled => Some(CanonicalStatus::Cancelled),
            DonationStatus::Completed => None,
        }
    }

    /// Projects a raw status string onto the stored status set.
    ///
    /// Strings that match a canonical rule map to that status. Otherwise a
    /// completed-shipment label yields `Completed`, and anything else falls
    /// back to `PendingApproval`.
    pub fn project(raw: &str) -> Self {
        match try_normalize(raw) {
            Some(canonical) => canonical.into(),
            None if is_completed_label(raw) => DonationStatus::Completed,
            None => DonationStatus::PendingApproval,
        }
    }
}

impl From<CanonicalStatus> for DonationStatus {
    fn from(status: CanonicalStatus) -> Self {
        match status {
            CanonicalStatus::PendingApproval => DonationStatus::PendingApproval,
            CanonicalStatus::PendingMatch => DonationStatus::PendingMatch,
            CanonicalStatus::Matched => DonationStatus::Matched,
            CanonicalStatus::Rejected => DonationStatus::Rejected,
            CanonicalStatus::PendingDelivery => DonationStatus::PendingDelivery,
            CanonicalStatus::Cancelled => DonationStatus::Cancelled,
        }
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label used for finished donations and delivered shipments.
pub const COMPLETED_LABEL: &str = "완료";

/// Substring rules in priority order. The first rule with a matching token wins.
const RULES: &[(CanonicalStatus, &[&str])] = &[
    (CanonicalStatus::Cancelled, &["취소", "cancel"]),
    (
        CanonicalStatus::PendingDelivery,
        &["배송대기", "pending_delivery", "shipped"],
    ),
    (CanonicalStatus::Rejected, &["거절", "반려", "reject"]),
    (CanonicalStatus::Matched, &["매칭됨", "matched"]),
    (
        CanonicalStatus::PendingApproval,
        &["승인대기", "pending_approval"],
    ),
    (
        CanonicalStatus::PendingMatch,
        &["매칭대기", "approved", "pending_match"],
    ),
];

fn fold(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Applies the projection rules, returning `None` when no rule matches.
pub fn try_normalize(raw: &str) -> Option<CanonicalStatus> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }
    RULES
        .iter()
        .find(|(_, tokens)| tokens.iter().any(|t| folded.contains(t)))
        .map(|(status, _)| *status)
}

/// Maps any raw status string onto a canonical status.
///
/// Whitespace is removed and the string is case-folded before matching.
/// Unrecognized and empty input yields `PendingApproval`.
pub fn normalize(raw: &str) -> CanonicalStatus {
    try_normalize(raw).unwrap_or(CanonicalStatus::PendingApproval)
}

/// Recognizes completed-shipment labels such as `배송완료` or `완료`.
pub fn is_completed_label(raw: &str) -> bool {
    let folded = fold(raw);
    folded.ends_with(COMPLETED_LABEL) || folded == "completed" || folded == "delivered"
}
