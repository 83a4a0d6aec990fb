//! Delivery repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{DeliveryEntity, DeliveryStatusDb, DonationStatusDb};
use crate::metrics::QueryTimer;

const SELECT_DELIVERY: &str = r#"
    SELECT dl.id, dl.donation_id, d.owner_id AS donor_id,
           COALESCE(NULLIF(TRIM(d.detail_category), ''), d.main_category) AS item_name,
           dl.carrier, dl.tracking_number,
           dl.sender_name, dl.sender_phone, dl.sender_address,
           dl.receiver_name, dl.receiver_phone, dl.receiver_address,
           dl.status, dl.shipped_at, dl.delivered_at, dl.created_at, dl.updated_at
    FROM deliveries dl
    JOIN donations d ON d.id = dl.donation_id
"#;

/// Requested change to a shipment.
#[derive(Debug, Clone)]
pub struct DeliveryUpdate<'a> {
    pub expected: DeliveryStatusDb,
    pub next: DeliveryStatusDb,
    pub carrier: Option<&'a str>,
    pub tracking_number: Option<&'a str>,
    /// Donation status to set alongside, if the shipment change implies one.
    pub donation_status: Option<DonationStatusDb>,
}

/// Repository for shipments.
#[derive(Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Creates a new DeliveryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_delivery_by_id");
        let result = sqlx::query_as::<_, DeliveryEntity>(&format!(
            "{} WHERE dl.id = $1",
            SELECT_DELIVERY
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Shipments of one donor's items, newest first.
    pub async fn list_for_donor(&self, donor_id: Uuid) -> Result<Vec<DeliveryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_deliveries_for_donor");
        let result = sqlx::query_as::<_, DeliveryEntity>(&format!(
            "{} WHERE d.owner_id = $1 ORDER BY dl.created_at DESC",
            SELECT_DELIVERY
        ))
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_all(&self) -> Result<Vec<DeliveryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_deliveries");
        let result = sqlx::query_as::<_, DeliveryEntity>(&format!(
            "{} ORDER BY dl.created_at DESC",
            SELECT_DELIVERY
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delivered shipments whose trimmed sender name is one of `names`.
    pub async fn list_delivered_by_senders(
        &self,
        names: &[String],
    ) -> Result<Vec<DeliveryEntity>, sqlx::Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_delivered_by_senders");
        let result = sqlx::query_as::<_, DeliveryEntity>(&format!(
            "{} WHERE dl.status = 'delivered' AND TRIM(dl.sender_name) = ANY($1) ORDER BY dl.delivered_at DESC",
            SELECT_DELIVERY
        ))
        .bind(names)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Applies a status change if the shipment is still in `expected`.
    ///
    /// Timestamps are set the first time a shipment reaches each stage.
    pub async fn update_status(
        &self,
        id: Uuid,
        update: &DeliveryUpdate<'_>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_delivery_status");
        let mut tx = self.pool.begin().await?;

        let donation_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE deliveries
            SET status = $3::delivery_status,
                carrier = COALESCE($4, carrier),
                tracking_number = COALESCE($5, tracking_number),
                shipped_at = CASE
                    WHEN $3::delivery_status IN ('shipped', 'delivered') THEN COALESCE(shipped_at, NOW())
                    ELSE shipped_at
                END,
                delivered_at = CASE
                    WHEN $3::delivery_status = 'delivered' THEN COALESCE(delivered_at, NOW())
                    ELSE delivered_at
                END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING donation_id
            "#,
        )
        .bind(id)
        .bind(update.expected)
        .bind(update.next)
        .bind(update.carrier)
        .bind(update.tracking_number)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(donation_id) = donation_id else {
            timer.record();
            return Ok(false);
        };

        if let Some(status) = update.donation_status {
            sqlx::query(
                r#"
                UPDATE donations
                SET status = $2, updated_at = NOW()
                WHERE id = $1 AND status IN ('matched', 'pending_delivery')
                "#,
            )
            .bind(donation_id)
            .bind(status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(true)
    }
}
