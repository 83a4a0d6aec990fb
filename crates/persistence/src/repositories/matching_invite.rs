//! Matching invite repository for database operations.

use domain::models::Party;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{InviteStatusDb, MatchingInviteEntity};
use crate::metrics::QueryTimer;

const SELECT_INVITE: &str = r#"
    SELECT i.id, i.donation_id, d.reference_code,
           COALESCE(NULLIF(TRIM(d.detail_category), ''), d.main_category) AS item_name,
           u.name AS donor_name, d.is_anonymous,
           i.organization_id, o.name AS organization_name, ou.username AS organization_username,
           i.status, i.response_reason, i.created_at, i.responded_at
    FROM matching_invites i
    JOIN donations d ON d.id = i.donation_id
    JOIN users u ON u.id = d.owner_id
    JOIN organizations o ON o.id = i.organization_id
    JOIN users ou ON ou.id = o.user_id
"#;

/// Repository for matching invites.
#[derive(Clone)]
pub struct MatchingInviteRepository {
    pool: PgPool,
}

impl MatchingInviteRepository {
    /// Creates a new MatchingInviteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MatchingInviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_matching_invite_by_id");
        let result = sqlx::query_as::<_, MatchingInviteEntity>(&format!(
            "{} WHERE i.id = $1",
            SELECT_INVITE
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Invites addressed to one organization, open ones first.
    pub async fn list_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MatchingInviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_matching_invites_for_organization");
        let result = sqlx::query_as::<_, MatchingInviteEntity>(&format!(
            "{} WHERE i.organization_id = $1 ORDER BY (i.status = 'pending') DESC, i.created_at DESC",
            SELECT_INVITE
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All invites, optionally filtered by status, newest first.
    pub async fn list_all(
        &self,
        status: Option<InviteStatusDb>,
    ) -> Result<Vec<MatchingInviteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_matching_invites");
        let result = sqlx::query_as::<_, MatchingInviteEntity>(&format!(
            "{} WHERE ($1::invite_status IS NULL OR i.status = $1) ORDER BY i.created_at DESC",
            SELECT_INVITE
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Accepts an open invite: the donation is matched and a shipment opened.
    ///
    /// Returns the new delivery id, or `None` when the invite or donation
    /// changed since it was read.
    pub async fn accept(
        &self,
        invite_id: Uuid,
        organization_id: Uuid,
        donation_id: Uuid,
        sender: &Party,
        receiver: &Party,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("accept_matching_invite");
        let mut tx = self.pool.begin().await?;

        let invite_updated = sqlx::query(
            r#"
            UPDATE matching_invites
            SET status = 'accepted', responded_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(invite_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if invite_updated == 0 {
            timer.record();
            return Ok(None);
        }

        let donation_updated = sqlx::query(
            r#"
            UPDATE donations
            SET status = 'matched', matched_organization_id = $2,
                pending_organization_id = NULL, updated_at = NOW()
            WHERE id = $1 AND status = 'pending_match' AND pending_organization_id = $2
            "#,
        )
        .bind(donation_id)
        .bind(organization_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if donation_updated == 0 {
            timer.record();
            return Ok(None);
        }

        let delivery_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO deliveries (
                donation_id, sender_name, sender_phone, sender_address,
                receiver_name, receiver_phone, receiver_address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(donation_id)
        .bind(&sender.name)
        .bind(&sender.phone)
        .bind(&sender.address)
        .bind(&receiver.name)
        .bind(&receiver.phone)
        .bind(&receiver.address)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(delivery_id))
    }

    /// Rejects an open invite and returns the donation to the candidate queue.
    ///
    /// The donation becomes auto-match, so a declined direct match can be
    /// proposed to another organization.
    pub async fn reject(
        &self,
        invite_id: Uuid,
        organization_id: Uuid,
        donation_id: Uuid,
        reason: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("reject_matching_invite");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE matching_invites
            SET status = 'rejected', response_reason = $2, responded_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(invite_id)
        .bind(reason)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            timer.record();
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE donations
            SET pending_organization_id = NULL, donation_method = 'auto_match',
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending_match' AND pending_organization_id = $2
            "#,
        )
        .bind(donation_id)
        .bind(organization_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(true)
    }
}
