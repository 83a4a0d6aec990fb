//! [`DonationBackend`] over the ReWear HTTP API.
//!
//! The session cookie set by login is kept in the client's cookie store and
//! sent with every later call.

use std::time::Duration;

use domain::models::{
    ActionResponse, AdminDonationResponse, AssignOrganizationRequest, CancelDonationRequest,
    DonationListResponse, InviteDecision, InviteListResponse, LoginRequest, MatchingInviteResponse,
    OrganSummary, OrgansResponse, RejectDonationRequest, RespondInviteRequest,
};
use domain::services::donor_status::DonationStatusResponse;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::DonationBackend;
use crate::error::{ClientError, GENERIC_FAILURE};

#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Server origin, e.g. `http://localhost:8080`.
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Error body written by the server for every failed request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Opens a session; later calls carry its cookie.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, "/api/auth/login")
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        debug!(username = %username, "Logged in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.request(Method::POST, "/api/auth/logout").send().await?;
        check_status(response).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        debug!(path = %path, "GET");
        let response = self.request(Method::GET, path).send().await?;
        decode(check_status(response).await?).await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        debug!(method = %method, path = %path, "Sending");
        let response = self.request(method, path).json(body).send().await?;
        decode(check_status(response).await?).await
    }
}

/// Passes successful responses through; turns the rest into
/// [`ClientError::Server`] carrying the server's message.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());

    warn!(status = status.as_u16(), message = %message, "Request failed");
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl DonationBackend for HttpBackend {
    async fn list_pending(&self) -> Result<Vec<AdminDonationResponse>, ClientError> {
        let list: DonationListResponse = self.get_json("/api/admin/donations/pending").await?;
        Ok(list.donations)
    }

    async fn approve(&self, item_id: Uuid) -> Result<ActionResponse, ClientError> {
        self.send_json(
            Method::POST,
            &format!("/api/admin/donations/{item_id}/approve"),
            &serde_json::json!({}),
        )
        .await
    }

    async fn reject(&self, item_id: Uuid, reason: &str) -> Result<ActionResponse, ClientError> {
        let body = RejectDonationRequest {
            reason: Some(reason.to_string()),
        };
        self.send_json(
            Method::POST,
            &format!("/api/admin/donations/{item_id}/reject"),
            &body,
        )
        .await
    }

    async fn list_auto_match(&self) -> Result<Vec<AdminDonationResponse>, ClientError> {
        let list: DonationListResponse = self.get_json("/api/admin/donations/auto-match").await?;
        Ok(list.donations)
    }

    async fn list_organs(&self) -> Result<Vec<OrganSummary>, ClientError> {
        let list: OrgansResponse = self.get_json("/api/admin/donations/organs").await?;
        Ok(list.organs)
    }

    async fn assign(&self, item_id: Uuid, organ_id: Uuid) -> Result<ActionResponse, ClientError> {
        let body = AssignOrganizationRequest {
            organ_id: Some(organ_id),
        };
        self.send_json(
            Method::POST,
            &format!("/api/admin/donations/{item_id}/assign"),
            &body,
        )
        .await
    }

    async fn list_invites(&self) -> Result<Vec<MatchingInviteResponse>, ClientError> {
        let list: InviteListResponse = self.get_json("/api/matching-invites").await?;
        Ok(list.invites)
    }

    async fn respond_invite(
        &self,
        invite_id: Uuid,
        decision: InviteDecision,
        reason: Option<&str>,
    ) -> Result<ActionResponse, ClientError> {
        let body = RespondInviteRequest {
            decision,
            reason: reason.map(str::to_string),
        };
        self.send_json(
            Method::POST,
            &format!("/api/matching-invites/{invite_id}/respond"),
            &body,
        )
        .await
    }

    async fn donation_status(&self) -> Result<DonationStatusResponse, ClientError> {
        self.get_json("/api/donations/status").await
    }

    async fn cancel(&self, item_id: Uuid) -> Result<ActionResponse, ClientError> {
        self.send_json(
            Method::PUT,
            &format!("/api/donations/{item_id}/cancel"),
            &CancelDonationRequest::default(),
        )
        .await
    }
}
