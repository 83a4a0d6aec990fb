//! Recipient organizations and their join requests.
//!
//! An organization signs up through a join request. It becomes selectable as
//! a donation target, and can receive matching invites, only after an admin
//! approves the request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::{
    validate_business_no, validate_not_blank, validate_phone, validate_username,
};

/// Lightweight reference to an organization by id and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub id: Uuid,
    pub name: String,
}

impl OrganizationRef {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Review state of an organization join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinRequestStatus::Pending => write!(f, "pending"),
            JoinRequestStatus::Approved => write!(f, "approved"),
            JoinRequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for JoinRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(JoinRequestStatus::Pending),
            "approved" => Ok(JoinRequestStatus::Approved),
            "rejected" => Ok(JoinRequestStatus::Rejected),
            other => Err(format!("Unknown join request status: {}", other)),
        }
    }
}

/// Organization record, which doubles as its join request.
#[derive(Debug, Clone)]
pub struct Organization {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub business_no: String,
    pub contact_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub status: JoinRequestStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Organization {
    pub fn is_approved(&self) -> bool {
        self.status == JoinRequestStatus::Approved
    }

    pub fn to_ref(&self) -> OrganizationRef {
        OrganizationRef::new(self.id, self.name.clone())
    }
}

/// Organization signup form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationJoinRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 8, max = 64, message = "비밀번호는 8자 이상이어야 합니다."))]
    pub password: String,

    #[validate(length(min = 2, max = 100, message = "기관명은 2~100자로 입력해주세요."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub organization_name: String,

    #[validate(custom(function = "validate_business_no"))]
    pub business_no: String,

    #[validate(length(min = 1, max = 50, message = "담당자 이름을 입력해주세요."))]
    pub contact_name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone: String,

    #[validate(email(message = "올바른 이메일 형식이 아닙니다."))]
    pub email: Option<String>,

    #[validate(length(max = 255, message = "주소가 너무 깁니다."))]
    pub address: Option<String>,
}

/// Admin decision payload for rejecting a join request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewJoinRequestBody {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Admin view of a join request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestResponse {
    pub id: Uuid,
    pub organization_name: String,
    pub business_no: String,
    pub contact_name: String,
    pub username: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: JoinRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<Organization> for JoinRequestResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            organization_name: org.name,
            business_no: org.business_no,
            contact_name: org.contact_name,
            username: org.username,
            phone: org.phone,
            email: org.email,
            address: org.address,
            status: org.status,
            rejection_reason: org.rejection_reason,
            submitted_at: org.submitted_at,
            reviewed_at: org.reviewed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestListResponse {
    pub requests: Vec<JoinRequestResponse>,
    pub count: usize,
}

/// Organization entry in selection lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

impl From<&Organization> for OrganSummary {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
            username: org.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgansResponse {
    pub organs: Vec<OrganSummary>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_join_request() -> serde_json::Value {
        json!({
            "username": "imdang_school",
            "password": "school2024",
            "organizationName": "임당초등학교",
            "businessNo": "123-45-67890",
            "contactName": "김담당",
            "phone": "053-123-4567",
            "email": "office@imdang.es.kr"
        })
    }

    #[test]
    fn test_join_request_valid() {
        let request: OrganizationJoinRequest =
            serde_json::from_value(valid_join_request()).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.organization_name, "임당초등학교");
    }

    #[test]
    fn test_join_request_rejects_bad_business_no() {
        let mut body = valid_join_request();
        body["businessNo"] = json!("12-345");
        let request: OrganizationJoinRequest = serde_json::from_value(body).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("business_no"));
    }

    #[test]
    fn test_join_request_rejects_blank_name() {
        let mut body = valid_join_request();
        body["organizationName"] = json!("     ");
        let request: OrganizationJoinRequest = serde_json::from_value(body).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_join_request_status_parse_and_display() {
        assert_eq!(
            "APPROVED".parse::<JoinRequestStatus>().unwrap(),
            JoinRequestStatus::Approved
        );
        assert!("unknown".parse::<JoinRequestStatus>().is_err());
        assert_eq!(JoinRequestStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_join_request_response_omits_empty_reason() {
        let org = Organization {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            username: "org01".into(),
            name: "행복나눔센터".into(),
            business_no: "123-45-67890".into(),
            contact_name: "박센터".into(),
            phone: "010-0000-0000".into(),
            email: None,
            address: None,
            status: JoinRequestStatus::Pending,
            rejection_reason: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
        };
        let json = serde_json::to_value(JoinRequestResponse::from(org)).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["organizationName"], "행복나눔센터");
        assert!(json.get("rejectionReason").is_none());
    }
}
