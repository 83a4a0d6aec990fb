//! FAQ repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::FaqEntity;
use crate::metrics::QueryTimer;

const SELECT_FAQ: &str = r#"
    SELECT f.id, f.question, f.answer, f.display_order, f.is_active,
           COALESCE(NULLIF(TRIM(u.nickname), ''), u.name) AS author_name,
           f.created_at, f.answered_at
    FROM faqs f
    LEFT JOIN users u ON u.id = f.author_id
"#;

/// Repository for FAQ entries and member questions.
#[derive(Clone)]
pub struct FaqRepository {
    pool: PgPool,
}

impl FaqRepository {
    /// Creates a new FaqRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<FaqEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_faqs");
        let result = sqlx::query_as::<_, FaqEntity>(SELECT_FAQ)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FaqEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_faq_by_id");
        let result = sqlx::query_as::<_, FaqEntity>(&format!("{} WHERE f.id = $1", SELECT_FAQ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Stores a member question, unanswered.
    pub async fn create_question(
        &self,
        author_id: Uuid,
        question: &str,
    ) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("create_faq_question");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO faqs (question, author_id, display_order)
            VALUES ($1, $2, (SELECT COALESCE(MAX(display_order), 0) + 1 FROM faqs))
            RETURNING id
            "#,
        )
        .bind(question)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Records the admin answer. Returns false when the entry does not exist.
    pub async fn answer(&self, id: Uuid, answer: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("answer_faq");
        let result = sqlx::query(
            "UPDATE faqs SET answer = $2, answered_at = NOW(), is_active = TRUE WHERE id = $1",
        )
        .bind(id)
        .bind(answer)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
