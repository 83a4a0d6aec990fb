//! Board post repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PostEntity, PostTypeDb};
use crate::metrics::QueryTimer;

/// Column values for a new post.
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub post_type: PostTypeDb,
    pub title: &'a str,
    pub content: &'a str,
    pub image_url: Option<&'a str>,
    pub author_id: Uuid,
    pub is_anonymous: bool,
    pub req_main_category: Option<&'a str>,
    pub req_size: Option<&'a str>,
}

const SELECT_POST: &str = r#"
    SELECT p.id, p.post_type, p.title, p.content, p.image_url, p.author_id,
           COALESCE(o.name, COALESCE(NULLIF(TRIM(u.nickname), ''), u.name)) AS author_name,
           p.is_anonymous, p.req_main_category, p.req_size, p.view_count,
           p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN organizations o ON o.user_id = u.id
"#;

/// Repository for board posts.
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Creates a new PostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, post: &NewPost<'_>) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("create_post");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO posts (post_type, title, content, image_url, author_id, is_anonymous,
                               req_main_category, req_size)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(post.post_type)
        .bind(post.title)
        .bind(post.content)
        .bind(post.image_url)
        .bind(post.author_id)
        .bind(post.is_anonymous)
        .bind(post.req_main_category)
        .bind(post.req_size)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_post_by_id");
        let result = sqlx::query_as::<_, PostEntity>(&format!("{} WHERE p.id = $1", SELECT_POST))
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// One page of posts, newest first.
    pub async fn list(
        &self,
        post_type: Option<PostTypeDb>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_posts");
        let result = sqlx::query_as::<_, PostEntity>(&format!(
            "{} WHERE ($1::post_type IS NULL OR p.post_type = $1) ORDER BY p.created_at DESC LIMIT $2 OFFSET $3",
            SELECT_POST
        ))
        .bind(post_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self, post_type: Option<PostTypeDb>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_posts");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM posts WHERE ($1::post_type IS NULL OR post_type = $1)",
        )
        .bind(post_type)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Increments the view counter and returns the new value.
    pub async fn increment_views(&self, id: Uuid) -> Result<Option<i64>, sqlx::Error> {
        let timer = QueryTimer::new("increment_post_views");
        let result = sqlx::query_scalar::<_, i64>(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a post written by `author_id`. Returns false otherwise.
    pub async fn delete_by_author(&self, id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_post");
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
