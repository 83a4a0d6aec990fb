//! Locally staged admin decisions.
//!
//! An admin first stages an approve or reject for an item, reviews the
//! preview, and then either saves it (one backend call) or discards it.
//! At most one change is staged per item; staging again replaces it.

use std::collections::HashMap;

use uuid::Uuid;

use super::approval::{approve, reject};
use super::{LifecycleError, LifecycleSubject};
use crate::models::{DonationStatus, OrganizationRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Approve,
    Reject { reason: String },
}

/// A staged decision with the state the item would take once saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub item_id: Uuid,
    pub action: PendingAction,
    pub preview_status: DonationStatus,
    pub preview_organization: Option<OrganizationRef>,
    pub preview_info: String,
}

impl PendingChange {
    pub fn approve<S: LifecycleSubject + ?Sized>(item: &S) -> Result<Self, LifecycleError> {
        let outcome = approve(item)?;
        Ok(Self {
            item_id: item.item_id(),
            action: PendingAction::Approve,
            preview_status: outcome.status,
            preview_organization: outcome.pending_organization,
            preview_info: outcome.matching_info,
        })
    }

    pub fn reject<S: LifecycleSubject + ?Sized>(
        item: &S,
        reason: &str,
    ) -> Result<Self, LifecycleError> {
        let outcome = reject(item, reason)?;
        Ok(Self {
            item_id: item.item_id(),
            preview_info: format!("거절 사유: {}", outcome.reason),
            action: PendingAction::Reject {
                reason: outcome.reason,
            },
            preview_status: outcome.status,
            preview_organization: None,
        })
    }
}

/// Staged changes keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct PendingChanges {
    changes: HashMap<Uuid, PendingChange>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a change, returning the one it replaced.
    pub fn stage(&mut self, change: PendingChange) -> Option<PendingChange> {
        self.changes.insert(change.item_id, change)
    }

    pub fn discard(&mut self, item_id: &Uuid) -> Option<PendingChange> {
        self.changes.remove(item_id)
    }

    pub fn get(&self, item_id: &Uuid) -> Option<&PendingChange> {
        self.changes.get(item_id)
    }

    /// Removes the change so it can be applied. Put it back with
    /// [`PendingChanges::stage`] if applying fails.
    pub fn take(&mut self, item_id: &Uuid) -> Option<PendingChange> {
        self.changes.remove(item_id)
    }

    /// Drops staged changes for items no longer present in `live_ids`.
    pub fn retain_items(&mut self, live_ids: &[Uuid]) {
        self.changes.retain(|id, _| live_ids.contains(id));
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingChange> {
        self.changes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::donation::fixtures::{direct_item, pending_item};

    #[test]
    fn test_stage_then_discard_leaves_item_unchanged() {
        let item = pending_item();
        let mut staged = PendingChanges::new();

        staged.stage(PendingChange::approve(&item).unwrap());
        assert_eq!(staged.len(), 1);
        assert_eq!(
            staged.get(&item.id).map(|c| c.preview_status),
            Some(DonationStatus::PendingMatch)
        );

        let discarded = staged.discard(&item.id);
        assert!(discarded.is_some());
        assert!(staged.is_empty());
        assert_eq!(item.status, DonationStatus::PendingApproval);
    }

    #[test]
    fn test_restaging_replaces_previous_change() {
        let item = pending_item();
        let mut staged = PendingChanges::new();
        staged.stage(PendingChange::approve(&item).unwrap());
        let replaced = staged.stage(PendingChange::reject(&item, "사진 불량").unwrap());

        assert_eq!(replaced.map(|c| c.action), Some(PendingAction::Approve));
        assert_eq!(staged.len(), 1);
        let change = staged.get(&item.id).unwrap();
        assert_eq!(
            change.action,
            PendingAction::Reject {
                reason: "사진 불량".into()
            }
        );
        assert_eq!(change.preview_info, "거절 사유: 사진 불량");
    }

    #[test]
    fn test_blank_reject_cannot_be_staged() {
        let item = pending_item();
        assert_eq!(
            PendingChange::reject(&item, "  "),
            Err(LifecycleError::ReasonRequired)
        );
    }

    #[test]
    fn test_direct_match_preview() {
        let change = PendingChange::approve(&direct_item()).unwrap();
        assert_eq!(change.preview_info, "임당초등학교 기관 확인 중입니다.");
        assert_eq!(
            change.preview_organization.map(|o| o.name).as_deref(),
            Some("임당초등학교")
        );
    }

    #[test]
    fn test_retain_items_drops_stale_changes() {
        let first = pending_item();
        let second = pending_item();
        let mut staged = PendingChanges::new();
        staged.stage(PendingChange::approve(&first).unwrap());
        staged.stage(PendingChange::approve(&second).unwrap());

        staged.retain_items(&[second.id]);
        assert!(staged.get(&first.id).is_none());
        assert!(staged.get(&second.id).is_some());
    }

    #[test]
    fn test_take_removes_slot() {
        let item = pending_item();
        let mut staged = PendingChanges::new();
        staged.stage(PendingChange::approve(&item).unwrap());
        let change = staged.take(&item.id).unwrap();
        assert!(staged.is_empty());
        staged.stage(change);
        assert_eq!(staged.len(), 1);
    }
}
