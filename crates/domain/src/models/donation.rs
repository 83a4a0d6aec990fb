//! Donation item model and its request/response shapes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::organization::OrganizationRef;
use super::status::DonationStatus;

/// Shown while an admin has not reviewed the item yet.
pub const INFO_UNDER_REVIEW: &str = "관리자 검토 중입니다.";
/// Shown while an approved item waits for an organization.
pub const INFO_AWAITING_MATCH: &str = "기관 매칭을 기다리는 중입니다.";
pub const INFO_REJECTED_NO_REASON: &str = "사유 확인 후 다시 신청해주세요.";
pub const INFO_PENDING_DELIVERY: &str = "배송 준비 중입니다.";
pub const INFO_CANCELLED: &str = "기부자가 신청을 취소했습니다.";
pub const INFO_COMPLETED: &str = "기부가 완료되었습니다.";

/// Matching info while `organization` is confirming the item.
pub fn awaiting_confirmation_info(organization: &str) -> String {
    format!("{} 기관 확인 중입니다.", organization)
}

/// How the donor wants the item matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationMethod {
    AutoMatch,
    DirectMatch,
}

impl DonationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DonationMethod::AutoMatch => "자동 매칭",
            DonationMethod::DirectMatch => "직접 매칭",
        }
    }
}

impl std::str::FromStr for DonationMethod {
    type Err = DonationFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AUTO_MATCH" | "AUTO" | "INDIRECT" | "auto_match" | "자동 매칭" => {
                Ok(DonationMethod::AutoMatch)
            }
            "DIRECT_MATCH" | "DIRECT" | "direct_match" | "직접 매칭" => {
                Ok(DonationMethod::DirectMatch)
            }
            other => Err(DonationFormError::InvalidValue(format!(
                "알 수 없는 매칭 방식입니다: {}",
                other
            ))),
        }
    }
}

/// How the item travels to the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMethod {
    SelfDelivery,
    Parcel,
}

impl DeliveryMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMethod::SelfDelivery => "직접 배송",
            DeliveryMethod::Parcel => "택배 배송",
        }
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = DonationFormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SELF_DELIVERY" | "DIRECT" | "self_delivery" | "직접 배송" => {
                Ok(DeliveryMethod::SelfDelivery)
            }
            "PARCEL" | "parcel" | "택배 배송" => Ok(DeliveryMethod::Parcel),
            other => Err(DonationFormError::InvalidValue(format!(
                "알 수 없는 배송 방법입니다: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Uploaded photo or clip attached to a donation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationImage {
    pub id: Uuid,
    pub kind: MediaKind,
    pub url: String,
}

/// A donated item and its lifecycle state.
#[derive(Debug, Clone)]
pub struct DonationItem {
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
    pub images: Vec<DonationImage>,
    pub donation_method: DonationMethod,
    pub target_organization: Option<OrganizationRef>,
    pub delivery_method: DeliveryMethod,
    pub contact: Option<String>,
    pub desired_date: Option<NaiveDate>,
    pub memo: Option<String>,
    pub is_anonymous: bool,
    pub status: DonationStatus,
    pub rejection_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub pending_organization: Option<OrganizationRef>,
    pub matched_organization: Option<OrganizationRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationItem {
    /// Short item name: the detail category, else the main category.
    pub fn title(&self) -> String {
        self.detail_category
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.main_category)
            .to_string()
    }

    /// One-line description such as `아동 의류 상의 (M) x2`.
    pub fn items_summary(&self) -> String {
        let mut summary = format!("{} {}", self.gender_type, self.title());
        summary.push_str(&format!(" ({})", self.size));
        if self.quantity > 1 {
            summary.push_str(&format!(" x{}", self.quantity));
        }
        summary
    }

    /// Donor name as shown to organizations.
    pub fn public_donor_name(&self) -> String {
        if self.is_anonymous {
            "익명".to_string()
        } else {
            self.owner_name.clone()
        }
    }

    /// Human-readable progress note for the current status.
    pub fn matching_info(&self) -> String {
        match self.status {
            DonationStatus::PendingApproval => INFO_UNDER_REVIEW.to_string(),
            DonationStatus::PendingMatch => match &self.pending_organization {
                Some(org) => awaiting_confirmation_info(&org.name),
                None => INFO_AWAITING_MATCH.to_string(),
            },
            DonationStatus::Matched => match &self.matched_organization {
                Some(org) => format!("{}과 연결되었어요.", org.name),
                None => "기관과 연결되었어요.".to_string(),
            },
            DonationStatus::Rejected => match self.rejection_reason.as_deref() {
                Some(reason) if !reason.trim().is_empty() => format!("거절 사유: {}", reason),
                _ => INFO_REJECTED_NO_REASON.to_string(),
            },
            DonationStatus::PendingDelivery => INFO_PENDING_DELIVERY.to_string(),
            DonationStatus::Cancelled => INFO_CANCELLED.to_string(),
            DonationStatus::Completed => INFO_COMPLETED.to_string(),
        }
    }
}

/// Validation failures for a new donation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DonationFormError {
    #[error("성별을 선택해주세요.")]
    GenderRequired,
    #[error("메인 카테고리를 선택해주세요.")]
    CategoryRequired,
    #[error("사이즈를 선택해주세요.")]
    SizeRequired,
    #[error("매칭 방식을 선택해주세요.")]
    MatchTypeRequired,
    #[error("배송 방법을 선택해주세요.")]
    DeliveryMethodRequired,
    #[error("상세 카테고리는 최대 50자까지 입력 가능합니다.")]
    DetailTooLong,
    #[error("상세설명은 최대 500자까지 입력 가능합니다.")]
    DescriptionTooLong,
    #[error("수량은 1개 이상이어야 합니다.")]
    InvalidQuantity,
    #[error("기부 물품 이미지를 최소 1개 이상 업로드해주세요.")]
    ImageRequired,
    #[error("직접 매칭 시 희망 기관을 선택해주세요.")]
    TargetRequired,
    #[error("{0}")]
    InvalidValue(String),
}

pub const MAX_DETAIL_CATEGORY_CHARS: usize = 50;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Donation registration input, after the multipart form has been read.
#[derive(Debug, Clone, Default)]
pub struct NewDonation {
    pub gender_type: String,
    pub main_category: String,
    pub detail_category: Option<String>,
    pub size: String,
    pub condition: Option<String>,
    pub description: String,
    pub quantity: i32,
    pub donation_method: Option<DonationMethod>,
    pub target_organization_id: Option<Uuid>,
    pub delivery_method: Option<DeliveryMethod>,
    pub is_anonymous: bool,
    pub contact: Option<String>,
    pub desired_date: Option<NaiveDate>,
    pub memo: Option<String>,
}

impl NewDonation {
    /// Checks the form. `image_count` is the number of accepted uploads.
    pub fn check(&self, image_count: usize) -> Result<(), DonationFormError> {
        if self.gender_type.trim().is_empty() {
            return Err(DonationFormError::GenderRequired);
        }
        if self.main_category.trim().is_empty() {
            return Err(DonationFormError::CategoryRequired);
        }
        if self.size.trim().is_empty() {
            return Err(DonationFormError::SizeRequired);
        }
        if self
            .detail_category
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DETAIL_CATEGORY_CHARS)
        {
            return Err(DonationFormError::DetailTooLong);
        }
        if self.description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(DonationFormError::DescriptionTooLong);
        }
        if self.quantity < 1 {
            return Err(DonationFormError::InvalidQuantity);
        }
        let method = self
            .donation_method
            .ok_or(DonationFormError::MatchTypeRequired)?;
        if self.delivery_method.is_none() {
            return Err(DonationFormError::DeliveryMethodRequired);
        }
        if image_count == 0 {
            return Err(DonationFormError::ImageRequired);
        }
        if method == DonationMethod::DirectMatch && self.target_organization_id.is_none() {
            return Err(DonationFormError::TargetRequired);
        }
        Ok(())
    }
}

/// Generic outcome body for admin and donor actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectDonationRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOrganizationRequest {
    #[serde(default)]
    pub organ_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelDonationRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Donation as listed in the admin queues.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDonationResponse {
    pub id: Uuid,
    pub reference_code: String,
    pub owner: String,
    pub owner_name: String,
    pub name: String,
    pub items: String,
    pub item_description: String,
    pub images: Vec<DonationImage>,
    pub donation_method: DonationMethod,
    pub donation_method_label: String,
    pub donation_organization_id: Option<Uuid>,
    pub donation_organization: Option<String>,
    /// Raw status string; consumers project it with `normalize`.
    pub status: String,
    pub status_label: String,
    pub matching_info: String,
    pub pending_organization_id: Option<Uuid>,
    pub pending_organization: Option<String>,
    pub matched_organization_id: Option<Uuid>,
    pub matched_organization: Option<String>,
    pub rejection_reason: Option<String>,
    pub is_anonymous: bool,
    pub delivery_method: DeliveryMethod,
    pub delivery_method_label: String,
    pub memo: Option<String>,
    pub contact: Option<String>,
    pub desired_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&DonationItem> for AdminDonationResponse {
    fn from(item: &DonationItem) -> Self {
        Self {
            id: item.id,
            reference_code: item.reference_code.clone(),
            owner: item.owner_username.clone(),
            owner_name: item.owner_name.clone(),
            name: item.title(),
            items: item.items_summary(),
            item_description: item.description.clone(),
            images: item.images.clone(),
            donation_method: item.donation_method,
            donation_method_label: item.donation_method.label().to_string(),
            donation_organization_id: item.target_organization.as_ref().map(|o| o.id),
            donation_organization: item.target_organization.as_ref().map(|o| o.name.clone()),
            status: item.status.as_str().to_string(),
            status_label: item.status.label().to_string(),
            matching_info: item.matching_info(),
            pending_organization_id: item.pending_organization.as_ref().map(|o| o.id),
            pending_organization: item.pending_organization.as_ref().map(|o| o.name.clone()),
            matched_organization_id: item.matched_organization.as_ref().map(|o| o.id),
            matched_organization: item.matched_organization.as_ref().map(|o| o.name.clone()),
            rejection_reason: item.rejection_reason.clone(),
            is_anonymous: item.is_anonymous,
            delivery_method: item.delivery_method,
            delivery_method_label: item.delivery_method.label().to_string(),
            memo: item.memo.clone(),
            contact: item.contact.clone(),
            desired_date: item.desired_date,
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationListResponse {
    pub donations: Vec<AdminDonationResponse>,
    pub count: usize,
}

impl DonationListResponse {
    pub fn new(donations: Vec<AdminDonationResponse>) -> Self {
        let count = donations.len();
        Self { donations, count }
    }
}

/// Short summary returned after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSummary {
    pub id: Uuid,
    pub reference_code: String,
    pub status: DonationStatus,
    pub status_label: String,
    pub created_at: DateTime<Utc>,
}

impl From<&DonationItem> for DonationSummary {
    fn from(item: &DonationItem) -> Self {
        Self {
            id: item.id,
            reference_code: item.reference_code.clone(),
            status: item.status,
            status_label: item.status.label().to_string(),
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonationResponse {
    pub ok: bool,
    pub message: String,
    pub donation: DonationSummary,
}
