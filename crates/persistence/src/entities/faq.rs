//! FAQ entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Faq;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct FaqEntity {
    pub id: Uuid,
    pub question: String,
    pub answer: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<FaqEntity> for Faq {
    fn from(entity: FaqEntity) -> Self {
        Self {
            id: entity.id,
            question: entity.question,
            answer: entity.answer,
            display_order: entity.display_order,
            is_active: entity.is_active,
            author_name: entity.author_name,
            created_at: entity.created_at,
            answered_at: entity.answered_at,
        }
    }
}
