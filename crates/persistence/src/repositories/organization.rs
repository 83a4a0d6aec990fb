//! Organization repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{JoinRequestStatusDb, OrganizationEntity, UserRoleDb};
use crate::metrics::QueryTimer;
use crate::repositories::user::NewUser;

/// Organization details of a join request.
#[derive(Debug, Clone)]
pub struct NewOrganization<'a> {
    pub name: &'a str,
    pub business_no: &'a str,
    pub contact_name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
}

const SELECT_ORGANIZATION: &str = r#"
    SELECT o.id, o.user_id, u.username, o.name, o.business_no, o.contact_name, o.phone,
           o.email, o.address, o.status, o.rejection_reason, o.submitted_at, o.reviewed_at
    FROM organizations o
    JOIN users u ON u.id = o.user_id
"#;

/// Repository for organization accounts and their join requests.
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Creates a new OrganizationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the login account and the pending join request together.
    pub async fn create_join_request(
        &self,
        account: &NewUser<'_>,
        organization: &NewOrganization<'_>,
    ) -> Result<OrganizationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_join_request");
        let mut tx = self.pool.begin().await?;

        let user_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, name, email, phone, address, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(account.username)
        .bind(account.password_hash)
        .bind(account.name)
        .bind(account.email)
        .bind(account.phone)
        .bind(account.address)
        .bind(UserRoleDb::Organization)
        .fetch_one(&mut *tx)
        .await?;

        let organization_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO organizations (user_id, name, business_no, contact_name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(organization.name)
        .bind(organization.business_no)
        .bind(organization.contact_name)
        .bind(organization.phone)
        .bind(organization.email)
        .bind(organization.address)
        .fetch_one(&mut *tx)
        .await?;

        let entity = sqlx::query_as::<_, OrganizationEntity>(&format!(
            "{} WHERE o.id = $1",
            SELECT_ORGANIZATION
        ))
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(entity)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OrganizationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_organization_by_id");
        let result = sqlx::query_as::<_, OrganizationEntity>(&format!(
            "{} WHERE o.id = $1",
            SELECT_ORGANIZATION
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the organization owned by a login account.
    pub async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<OrganizationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_organization_by_user");
        let result = sqlx::query_as::<_, OrganizationEntity>(&format!(
            "{} WHERE o.user_id = $1",
            SELECT_ORGANIZATION
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List join requests, optionally filtered by review state. Oldest first.
    pub async fn list(
        &self,
        status: Option<JoinRequestStatusDb>,
    ) -> Result<Vec<OrganizationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_organizations");
        let result = sqlx::query_as::<_, OrganizationEntity>(&format!(
            "{} WHERE ($1::join_request_status IS NULL OR o.status = $1) ORDER BY o.submitted_at ASC",
            SELECT_ORGANIZATION
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approved organizations in name order, for selection lists.
    pub async fn list_approved(&self) -> Result<Vec<OrganizationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_approved_organizations");
        let result = sqlx::query_as::<_, OrganizationEntity>(&format!(
            "{} WHERE o.status = 'approved' ORDER BY o.name ASC",
            SELECT_ORGANIZATION
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approve a pending request. Returns false if it was already reviewed.
    pub async fn approve(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("approve_organization");
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET status = 'approved', rejection_reason = NULL, reviewed_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Reject a pending request with a reason. Returns false if it was already reviewed.
    pub async fn reject(&self, id: Uuid, reason: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("reject_organization");
        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET status = 'rejected', rejection_reason = $2, reviewed_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
