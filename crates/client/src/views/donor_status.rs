//! Donor status page.

use domain::models::CanonicalStatus;
use domain::services::donor_status::{ApprovalItem, CompletedDonation, DonationStatusResponse};
use domain::services::{LifecycleError, StatusCounts};
use uuid::Uuid;

use super::record_failure;
use crate::backend::DonationBackend;
use crate::error::ClientError;
use crate::notice::Notice;

const VIEW: &str = "donor_status";

/// The signed-in donor's items, counts and completed history.
pub struct DonorStatusView<B> {
    backend: B,
    status: Option<DonationStatusResponse>,
    notice: Option<Notice>,
}

impl<B: DonationBackend> DonorStatusView<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            status: None,
            notice: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn approval_items(&self) -> &[ApprovalItem] {
        self.status
            .as_ref()
            .map(|s| s.approval_items.as_slice())
            .unwrap_or_default()
    }

    pub fn completed(&self) -> &[CompletedDonation] {
        self.status
            .as_ref()
            .map(|s| s.completed_donations.as_slice())
            .unwrap_or_default()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.status
            .as_ref()
            .map(|s| s.status_counts.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, status: CanonicalStatus) -> usize {
        self.status
            .as_ref()
            .map(|s| s.status_counts.get(status))
            .unwrap_or(0)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.backend.donation_status().await {
            Ok(status) => {
                self.status = Some(status);
                Ok(())
            }
            Err(e) => record_failure(&mut self.notice, VIEW, e),
        }
    }

    fn check_cancel(&self, item_id: Uuid) -> Result<(), ClientError> {
        let item = self
            .approval_items()
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ClientError::Validation("기부 항목을 찾을 수 없습니다.".to_string()))?;
        if !item.status.is_cancellable() {
            return Err(LifecycleError::NotCancellable.into());
        }
        Ok(())
    }

    /// Cancels an item still awaiting approval or matching.
    pub async fn cancel(&mut self, item_id: Uuid) -> Result<(), ClientError> {
        if let Err(e) = self.check_cancel(item_id) {
            return record_failure(&mut self.notice, VIEW, e);
        }

        match self.backend.cancel(item_id).await {
            Ok(response) => {
                self.notice = Some(Notice::success(response.message));
                self.refresh().await
            }
            Err(e) => record_failure(&mut self.notice, VIEW, e),
        }
    }
}
