//! Board posts: donation reviews and organization requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

use super::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostType {
    DonationReview,
    OrganRequest,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::DonationReview => "DONATION_REVIEW",
            PostType::OrganRequest => "ORGAN_REQUEST",
        }
    }

    /// Reviews are written by donors, requests by organizations.
    pub fn allowed_author(&self) -> UserRole {
        match self {
            PostType::DonationReview => UserRole::Donor,
            PostType::OrganRequest => UserRole::Organization,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    pub post_type: PostType,
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

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub post_type: PostType,

    #[validate(length(min = 1, max = 50, message = "제목은 1~50자로 입력해주세요."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(length(min = 1, max = 1000, message = "내용은 1~1000자로 입력해주세요."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,

    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    #[serde(default)]
    pub is_anonymous: bool,

    #[validate(length(max = 50))]
    pub req_main_category: Option<String>,

    #[validate(length(max = 20))]
    pub req_size: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    #[serde(default)]
    pub post_type: Option<PostType>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_name: String,
    pub is_anonymous: bool,
    pub req_main_category: Option<String>,
    pub req_size: Option<String>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let author_name = if post.is_anonymous {
            "익명".to_string()
        } else {
            post.author_name
        };
        Self {
            id: post.id,
            post_type: post.post_type,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            author_name,
            is_anonymous: post.is_anonymous,
            req_main_category: post.req_main_category,
            req_size: post.req_size,
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
