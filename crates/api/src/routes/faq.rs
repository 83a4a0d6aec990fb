//! FAQ board: public list, member questions, admin answers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::faq::public_order;
use domain::models::{
    ActionResponse, AnswerQuestionRequest, AskQuestionRequest, Faq, FaqListResponse, FaqResponse,
};
use persistence::repositories::FaqRepository;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::middleware::SessionUser;

/// GET /api/faq
pub async fn list_faqs(State(state): State<AppState>) -> Result<Json<FaqListResponse>, ApiError> {
    let faqs: Vec<Faq> = FaqRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(Faq::from)
        .collect();

    let faqs: Vec<FaqResponse> = public_order(faqs).into_iter().map(FaqResponse::from).collect();
    let count = faqs.len();
    Ok(Json(FaqListResponse { faqs, count }))
}

/// Post a question. It shows on the board unanswered until an admin replies.
///
/// POST /api/faq/question
pub async fn ask_question(
    State(state): State<AppState>,
    session: SessionUser,
    Json(request): Json<AskQuestionRequest>,
) -> Result<(StatusCode, Json<ActionResponse>), ApiError> {
    request.validate()?;

    let id = FaqRepository::new(state.pool.clone())
        .create_question(session.user_id, request.question.trim())
        .await?;

    tracing::info!(faq_id = %id, user_id = %session.user_id, "Question submitted");
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("질문이 등록되었습니다.")),
    ))
}

/// POST /api/admin/faq/:id/answer
pub async fn answer_question(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerQuestionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    request.validate()?;

    let answered = FaqRepository::new(state.pool.clone())
        .answer(id, request.answer.trim())
        .await?;
    if !answered {
        return Err(ApiError::NotFound("질문을 찾을 수 없습니다.".to_string()));
    }

    tracing::info!(faq_id = %id, user_id = %admin.user_id, "Question answered");
    Ok(Json(ActionResponse::ok("답변이 등록되었습니다.")))
}
