//! Board posts: donation reviews and organization clothing requests.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    ActionResponse, CreatePostRequest, Post, PostListQuery, PostResponse, PostType,
};
use persistence::entities::PostTypeDb;
use persistence::repositories::{NewPost, PostRepository};
use shared::pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE};
use shared::validation::non_blank;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionUser;

fn post_not_found() -> ApiError {
    ApiError::NotFound("게시글을 찾을 수 없습니다.".to_string())
}

fn page_request(query: &PostListQuery) -> PageRequest {
    PageRequest::new(
        query.page.unwrap_or(0),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
}

fn ensure_author_role(session: &SessionUser, post_type: PostType) -> Result<(), ApiError> {
    if session.role != post_type.allowed_author() {
        let message = match post_type {
            PostType::DonationReview => "기부 후기는 기부자만 작성할 수 있습니다.",
            PostType::OrganRequest => "의류 요청 글은 기관만 작성할 수 있습니다.",
        };
        return Err(ApiError::Forbidden(message.to_string()));
    }
    Ok(())
}

/// Newest first, optionally restricted to one board.
///
/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Page<PostResponse>>, ApiError> {
    let request = page_request(&query);
    let post_type = query.post_type.map(PostTypeDb::from);

    let repo = PostRepository::new(state.pool.clone());
    let total = repo.count(post_type).await?;
    let posts: Vec<Post> = repo
        .list(post_type, request.limit(), request.offset())
        .await?
        .into_iter()
        .map(Post::from)
        .collect();

    Ok(Json(Page::new(posts, request, total).map(PostResponse::from)))
}

/// Reading a post bumps its view counter.
///
/// GET /api/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    let repo = PostRepository::new(state.pool.clone());
    let views = repo.increment_views(id).await?.ok_or_else(post_not_found)?;

    let mut post: Post = repo
        .find_by_id(id)
        .await?
        .ok_or_else(post_not_found)?
        .into();
    post.view_count = views;
    Ok(Json(post.into()))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    session: SessionUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    request.validate()?;
    ensure_author_role(&session, request.post_type)?;

    let image_url = non_blank(request.image_url.as_deref());
    let (req_main_category, req_size) = match request.post_type {
        PostType::OrganRequest => (
            non_blank(request.req_main_category.as_deref()),
            non_blank(request.req_size.as_deref()),
        ),
        PostType::DonationReview => (None, None),
    };

    let repo = PostRepository::new(state.pool.clone());
    let id = repo
        .create(&NewPost {
            post_type: request.post_type.into(),
            title: request.title.trim(),
            content: request.content.trim(),
            image_url: image_url.as_deref(),
            author_id: session.user_id,
            is_anonymous: request.is_anonymous,
            req_main_category: req_main_category.as_deref(),
            req_size: req_size.as_deref(),
        })
        .await?;

    let post: Post = repo
        .find_by_id(id)
        .await?
        .ok_or_else(post_not_found)?
        .into();

    tracing::info!(
        post_id = %id,
        user_id = %session.user_id,
        post_type = request.post_type.as_str(),
        "Post created"
    );
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Only the author may delete a post.
///
/// DELETE /api/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = PostRepository::new(state.pool.clone());
    let post: Post = repo
        .find_by_id(id)
        .await?
        .ok_or_else(post_not_found)?
        .into();

    if post.author_id != session.user_id {
        return Err(ApiError::Forbidden(
            "본인이 작성한 게시글만 삭제할 수 있습니다.".to_string(),
        ));
    }

    if !repo.delete_by_author(id, session.user_id).await? {
        return Err(ApiError::Conflict("이미 삭제된 게시글입니다.".to_string()));
    }

    tracing::info!(post_id = %id, user_id = %session.user_id, "Post deleted");
    Ok(Json(ActionResponse::ok("게시글이 삭제되었습니다.")))
}
