//! Board post entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Post, PostType};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "post_type", rename_all = "snake_case")]
pub enum PostTypeDb {
    DonationReview,
    OrganRequest,
}

impl From<PostTypeDb> for PostType {
    fn from(post_type: PostTypeDb) -> Self {
        match post_type {
            PostTypeDb::DonationReview => PostType::DonationReview,
            PostTypeDb::OrganRequest => PostType::OrganRequest,
        }
    }
}

impl From<PostType> for PostTypeDb {
    fn from(post_type: PostType) -> Self {
        match post_type {
            PostType::DonationReview => PostTypeDb::DonationReview,
            PostType::OrganRequest => PostTypeDb::OrganRequest,
        }
    }
}

/// Post row joined with the author's display name.
#[derive(Debug, Clone, FromRow)]
pub struct PostEntity {
    pub id: Uuid,
    pub post_type: PostTypeDb,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_id: Uuid,
    pub author_name: String,
    pub is_anonymous: bool,
    pub req_main_category: Option<String>,
    pub req_size: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostEntity> for Post {
    fn from(entity: PostEntity) -> Self {
        Self {
            id: entity.id,
            post_type: entity.post_type.into(),
            title: entity.title,
            content: entity.content,
            image_url: entity.image_url,
            author_id: entity.author_id,
            author_name: entity.author_name,
            is_anonymous: entity.is_anonymous,
            req_main_category: entity.req_main_category,
            req_size: entity.req_size,
            view_count: entity.view_count,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
