//! Donation repository for database operations.
//!
//! Status changes are conditional updates guarded by the status the caller
//! observed. A `false` return means the row moved on in the meantime.

use std::collections::HashMap;

use chrono::NaiveDate;
use domain::models::{DonationImage, DonationItem};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    DeliveryMethodDb, DonationEntity, DonationImageEntity, DonationMethodDb, DonationStatusDb,
    MediaKindDb,
};
use crate::metrics::QueryTimer;

/// Column values for a new donation.
#[derive(Debug, Clone)]
pub struct NewDonationRecord<'a> {
    pub reference_code: &'a str,
    pub owner_id: Uuid,
    pub gender_type: &'a str,
    pub main_category: &'a str,
    pub detail_category: Option<&'a str>,
    pub size: &'a str,
    pub condition: Option<&'a str>,
    pub description: &'a str,
    pub quantity: i32,
    pub donation_method: DonationMethodDb,
    pub target_organization_id: Option<Uuid>,
    pub delivery_method: DeliveryMethodDb,
    pub contact: Option<&'a str>,
    pub desired_date: Option<NaiveDate>,
    pub memo: Option<&'a str>,
    pub is_anonymous: bool,
}

/// A stored upload to attach to a donation.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub kind: MediaKindDb,
    pub url: String,
}

const SELECT_DONATION: &str = r#"
    SELECT d.id, d.reference_code, d.owner_id, u.username AS owner_username, u.name AS owner_name,
           d.gender_type, d.main_category, d.detail_category, d.size, d.condition, d.description,
           d.quantity, d.donation_method, d.target_organization_id,
           t.name AS target_organization_name, d.delivery_method, d.contact, d.desired_date,
           d.memo, d.is_anonymous, d.status, d.rejection_reason, d.cancel_reason,
           d.pending_organization_id, p.name AS pending_organization_name,
           d.matched_organization_id, m.name AS matched_organization_name,
           d.created_at, d.updated_at
    FROM donations d
    JOIN users u ON u.id = d.owner_id
    LEFT JOIN organizations t ON t.id = d.target_organization_id
    LEFT JOIN organizations p ON p.id = d.pending_organization_id
    LEFT JOIN organizations m ON m.id = d.matched_organization_id
"#;

/// Repository for donation items.
#[derive(Clone)]
pub struct DonationRepository {
    pool: PgPool,
}

impl DonationRepository {
    /// Creates a new DonationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a donation and its media in one transaction.
    pub async fn create(
        &self,
        record: &NewDonationRecord<'_>,
        media: &[NewMedia],
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("create_donation");
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO donations (
                reference_code, owner_id, gender_type, main_category, detail_category, size,
                condition, description, quantity, donation_method, target_organization_id,
                delivery_method, contact, desired_date, memo, is_anonymous
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(record.reference_code)
        .bind(record.owner_id)
        .bind(record.gender_type)
        .bind(record.main_category)
        .bind(record.detail_category)
        .bind(record.size)
        .bind(record.condition)
        .bind(record.description)
        .bind(record.quantity)
        .bind(record.donation_method)
        .bind(record.target_organization_id)
        .bind(record.delivery_method)
        .bind(record.contact)
        .bind(record.desired_date)
        .bind(record.memo)
        .bind(record.is_anonymous)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in media.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO donation_images (donation_id, kind, url, position)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(item.kind)
            .bind(&item.url)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(id)
    }

    /// Whether a reference code is already in use.
    pub async fn reference_code_taken(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("donation_reference_code_taken");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM donations WHERE reference_code = $1)",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DonationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_donation_by_id");
        let result = sqlx::query_as::<_, DonationEntity>(&format!(
            "{} WHERE d.id = $1",
            SELECT_DONATION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Donations in one status, oldest first.
    pub async fn list_by_status(
        &self,
        status: DonationStatusDb,
    ) -> Result<Vec<DonationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_donations_by_status");
        let result = sqlx::query_as::<_, DonationEntity>(&format!(
            "{} WHERE d.status = $1 ORDER BY d.created_at ASC",
            SELECT_DONATION
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approved auto-match donations with no organization proposed, oldest first.
    pub async fn list_auto_match_candidates(&self) -> Result<Vec<DonationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_auto_match_candidates");
        let result = sqlx::query_as::<_, DonationEntity>(&format!(
            r#"{}
            WHERE d.status = 'pending_match'
              AND d.donation_method = 'auto_match'
              AND d.pending_organization_id IS NULL
            ORDER BY d.created_at ASC"#,
            SELECT_DONATION
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A donor's donations, newest first.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<DonationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_donations_by_owner");
        let result = sqlx::query_as::<_, DonationEntity>(&format!(
            "{} WHERE d.owner_id = $1 ORDER BY d.created_at DESC",
            SELECT_DONATION
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Media for a set of donations, in upload order.
    pub async fn images_for(
        &self,
        donation_ids: &[Uuid],
    ) -> Result<Vec<DonationImageEntity>, sqlx::Error> {
        if donation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_donation_images");
        let result = sqlx::query_as::<_, DonationImageEntity>(
            r#"
            SELECT id, donation_id, kind, url, position
            FROM donation_images
            WHERE donation_id = ANY($1)
            ORDER BY donation_id, position
            "#,
        )
        .bind(donation_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Converts rows to domain items with their media attached.
    pub async fn hydrate(
        &self,
        entities: Vec<DonationEntity>,
    ) -> Result<Vec<DonationItem>, sqlx::Error> {
        let ids: Vec<Uuid> = entities.iter().map(|e| e.id).collect();
        let mut images: HashMap<Uuid, Vec<DonationImage>> = HashMap::new();
        for image in self.images_for(&ids).await? {
            images
                .entry(image.donation_id)
                .or_default()
                .push(image.into());
        }
        Ok(entities
            .into_iter()
            .map(|e| {
                let media = images.remove(&e.id).unwrap_or_default();
                e.into_domain(media)
            })
            .collect())
    }

    /// Loads one donation as a domain item.
    pub async fn find_item(&self, id: Uuid) -> Result<Option<DonationItem>, sqlx::Error> {
        match self.find_by_id(id).await? {
            Some(entity) => Ok(self.hydrate(vec![entity]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// Moves a donation from review to matching.
    ///
    /// With `invite_organization` set, the donation waits on that organization
    /// and an invite addressed to it is opened in the same transaction.
    /// `donation_method` is stored as given, so a direct match with no target
    /// left can be approved as auto-match.
    pub async fn approve(
        &self,
        id: Uuid,
        donation_method: DonationMethodDb,
        invite_organization: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("approve_donation");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE donations
            SET status = 'pending_match', pending_organization_id = $2,
                donation_method = $3, rejection_reason = NULL, updated_at = NOW()
            WHERE id = $1 AND status = 'pending_approval'
            "#,
        )
        .bind(id)
        .bind(invite_organization)
        .bind(donation_method)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            timer.record();
            tracing::debug!(donation_id = %id, "Approve skipped, donation no longer pending approval");
            return Ok(false);
        }

        if let Some(organization_id) = invite_organization {
            sqlx::query(
                r#"
                INSERT INTO matching_invites (donation_id, organization_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(id)
            .bind(organization_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(true)
    }

    /// Rejects a donation that is still in `expected` status.
    ///
    /// Organization links are cleared and any open invite is marked withdrawn.
    pub async fn reject(
        &self,
        id: Uuid,
        reason: &str,
        expected: DonationStatusDb,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("reject_donation");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE donations
            SET status = 'rejected', rejection_reason = $2,
                pending_organization_id = NULL, matched_organization_id = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(expected)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            timer.record();
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE matching_invites
            SET status = 'withdrawn', responded_at = NOW()
            WHERE donation_id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(true)
    }

    /// Donor cancellation, allowed only before a match. Any open invite is
    /// marked withdrawn.
    pub async fn cancel(
        &self,
        id: Uuid,
        owner_id: Uuid,
        reason: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("cancel_donation");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE donations
            SET status = 'cancelled', cancel_reason = $3,
                pending_organization_id = NULL, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
              AND status IN ('pending_approval', 'pending_match')
            "#,
        )
        .bind(id)
        .bind(owner_id)
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
            UPDATE matching_invites
            SET status = 'withdrawn', responded_at = NOW()
            WHERE donation_id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(true)
    }

    /// Records a proposed organization and opens an invite for it.
    ///
    /// Returns the invite id, or `None` if the donation is no longer an
    /// auto-match candidate.
    pub async fn propose(
        &self,
        id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("propose_donation_organization");
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE donations
            SET pending_organization_id = $2, updated_at = NOW()
            WHERE id = $1
              AND status = 'pending_match'
              AND donation_method = 'auto_match'
              AND pending_organization_id IS NULL
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            timer.record();
            tracing::debug!(donation_id = %id, "Proposal skipped, donation is not an open candidate");
            return Ok(None);
        }

        let invite_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO matching_invites (donation_id, organization_id)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(invite_id))
    }
}
