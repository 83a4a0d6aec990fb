//! Admin approval queue with staged decisions.

use domain::models::AdminDonationResponse;
use domain::services::{PendingAction, PendingChange, PendingChanges};
use uuid::Uuid;

use super::record_failure;
use crate::backend::DonationBackend;
use crate::error::ClientError;
use crate::notice::Notice;

const VIEW: &str = "admin_approval";

/// Items awaiting review plus the decisions staged against them.
///
/// Staging and discarding never reach the server. Applying a staged change
/// sends exactly one request; on failure the change stays staged.
pub struct AdminApprovalView<B> {
    backend: B,
    items: Vec<AdminDonationResponse>,
    staged: PendingChanges,
    notice: Option<Notice>,
}

impl<B: DonationBackend> AdminApprovalView<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            items: Vec::new(),
            staged: PendingChanges::new(),
            notice: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn items(&self) -> &[AdminDonationResponse] {
        &self.items
    }

    pub fn staged(&self) -> &PendingChanges {
        &self.staged
    }

    pub fn pending_change(&self, item_id: Uuid) -> Option<&PendingChange> {
        self.staged.get(&item_id)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Reloads the queue. Staged changes for items that left it are dropped.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        match self.backend.list_pending().await {
            Ok(items) => {
                let live: Vec<Uuid> = items.iter().map(|item| item.id).collect();
                self.staged.retain_items(&live);
                self.items = items;
                Ok(())
            }
            Err(e) => record_failure(&mut self.notice, VIEW, e),
        }
    }

    fn find(&self, item_id: Uuid) -> Result<&AdminDonationResponse, ClientError> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| ClientError::Validation("기부 항목을 찾을 수 없습니다.".to_string()))
    }

    pub fn stage_approve(&mut self, item_id: Uuid) -> Result<(), ClientError> {
        let change = self
            .find(item_id)
            .and_then(|item| PendingChange::approve(item).map_err(ClientError::from));
        match change {
            Ok(change) => {
                self.staged.stage(change);
                self.notice = Some(Notice::success("승인 변경사항이 추가되었습니다."));
                Ok(())
            }
            Err(e) => record_failure(&mut self.notice, VIEW, e),
        }
    }

    /// A blank reason is refused before anything is staged.
    pub fn stage_reject(&mut self, item_id: Uuid, reason: &str) -> Result<(), ClientError> {
        let change = self
            .find(item_id)
            .and_then(|item| PendingChange::reject(item, reason).map_err(ClientError::from));
        match change {
            Ok(change) => {
                self.staged.stage(change);
                self.notice = Some(Notice::success("반려 변경사항이 추가되었습니다."));
                Ok(())
            }
            Err(e) => record_failure(&mut self.notice, VIEW, e),
        }
    }

    /// Drops the staged change for an item. Returns whether one existed.
    pub fn discard(&mut self, item_id: Uuid) -> bool {
        let discarded = self.staged.discard(&item_id).is_some();
        if discarded {
            self.notice = Some(Notice::success("변경사항이 취소되었습니다."));
        }
        discarded
    }

    /// Sends the staged change for an item, then reloads the queue.
    pub async fn apply(&mut self, item_id: Uuid) -> Result<(), ClientError> {
        let Some(change) = self.staged.take(&item_id) else {
            return record_failure(
                &mut self.notice,
                VIEW,
                ClientError::Validation("저장할 변경사항이 없습니다.".to_string()),
            );
        };

        let result = match &change.action {
            PendingAction::Approve => self.backend.approve(item_id).await,
            PendingAction::Reject { reason } => self.backend.reject(item_id, reason).await,
        };

        match result {
            Ok(response) => {
                tracing::debug!(item_id = %item_id, "Staged change applied");
                self.notice = Some(Notice::success(response.message));
                self.refresh().await
            }
            Err(e) => {
                self.staged.stage(change);
                record_failure(&mut self.notice, VIEW, e)
            }
        }
    }

    /// Approves without keeping the decision staged.
    pub async fn approve(&mut self, item_id: Uuid) -> Result<(), ClientError> {
        self.stage_approve(item_id)?;
        self.apply(item_id).await
    }

    pub async fn reject(&mut self, item_id: Uuid, reason: &str) -> Result<(), ClientError> {
        self.stage_reject(item_id, reason)?;
        self.apply(item_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use crate::views::fake::{auto_item, direct_item, FakeBackend};
    use domain::models::DonationStatus;

    async fn loaded(backend: FakeBackend) -> AdminApprovalView<FakeBackend> {
        let mut view = AdminApprovalView::new(backend);
        view.refresh().await.unwrap();
        view
    }

    #[tokio::test]
    async fn test_stage_then_discard_makes_no_call() {
        let item = auto_item("PENDING_APPROVAL");
        let mut view = loaded(FakeBackend::with_pending(vec![item.clone()])).await;

        view.stage_approve(item.id).unwrap();
        assert_eq!(
            view.pending_change(item.id).map(|c| c.preview_status),
            Some(DonationStatus::PendingMatch)
        );
        assert!(view.discard(item.id));

        assert!(view.staged().is_empty());
        assert_eq!(view.items()[0].status, "PENDING_APPROVAL");
        assert_eq!(view.backend().mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_reject_is_blocked_without_call() {
        let item = auto_item("PENDING_APPROVAL");
        let mut view = loaded(FakeBackend::with_pending(vec![item.clone()])).await;

        let err = view.reject(item.id, "   ").await.unwrap_err();
        assert!(err.is_local());
        assert!(view.staged().is_empty());
        assert_eq!(view.backend().mutation_count(), 0);

        let notice = view.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "반려 사유를 입력해주세요.");
    }

    #[tokio::test]
    async fn test_direct_match_preview_names_target() {
        let item = direct_item("PENDING_APPROVAL", "임당초등학교");
        let mut view = loaded(FakeBackend::with_pending(vec![item.clone()])).await;

        view.stage_approve(item.id).unwrap();
        let change = view.pending_change(item.id).unwrap();
        assert_eq!(change.preview_info, "임당초등학교 기관 확인 중입니다.");
        assert_eq!(
            change.preview_organization.as_ref().map(|o| o.name.as_str()),
            Some("임당초등학교")
        );
    }

    #[tokio::test]
    async fn test_apply_sends_once_and_refetches() {
        let item = auto_item("PENDING_APPROVAL");
        let mut view = loaded(FakeBackend::with_pending(vec![item.clone()])).await;

        view.stage_reject(item.id, " 사진 불량 ").unwrap();
        view.apply(item.id).await.unwrap();

        assert_eq!(view.backend().calls(), vec![
            "list_pending".to_string(),
            format!("reject {} 사진 불량", item.id),
            "list_pending".to_string(),
        ]);
        assert!(view.items().is_empty());
        assert!(view.staged().is_empty());
        assert_eq!(view.notice().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_failed_apply_keeps_change_staged() {
        let item = auto_item("PENDING_APPROVAL");
        let backend = FakeBackend::with_pending(vec![item.clone()]);
        backend.fail_next(409, "이미 처리된 기부입니다.");
        let mut view = loaded(backend).await;

        view.stage_approve(item.id).unwrap();
        let err = view.apply(item.id).await.unwrap_err();

        assert!(matches!(err, ClientError::Server { status: 409, .. }));
        assert!(view.pending_change(item.id).is_some());
        assert_eq!(view.items().len(), 1);
        assert_eq!(
            view.notice().map(|n| n.message.as_str()),
            Some("이미 처리된 기부입니다.")
        );
    }

    #[tokio::test]
    async fn test_approve_rejects_item_not_awaiting_review() {
        let item = auto_item("PENDING_MATCH");
        let mut view = loaded(FakeBackend::with_pending(vec![item.clone()])).await;

        let err = view.approve(item.id).await.unwrap_err();
        assert!(err.is_local());
        assert_eq!(view.backend().mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_drops_stale_staged_changes() {
        let item = auto_item("PENDING_APPROVAL");
        let mut view = loaded(FakeBackend::with_pending(vec![item.clone()])).await;
        view.stage_approve(item.id).unwrap();

        view.backend().clear_pending();
        view.refresh().await.unwrap();
        assert!(view.staged().is_empty());
    }
}
