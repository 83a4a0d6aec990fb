//! Frequently asked questions and member-submitted questions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_not_blank;

#[derive(Debug, Clone)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl Faq {
    pub fn is_answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }

    /// Answered, active entries come first.
    fn is_published(&self) -> bool {
        self.is_active && self.is_answered()
    }
}

/// Orders the public list: published entries by display order, then
/// unanswered questions oldest first. Inactive answered entries are dropped.
pub fn public_order(mut faqs: Vec<Faq>) -> Vec<Faq> {
    faqs.retain(|f| f.is_published() || !f.is_answered());
    faqs.sort_by(|a, b| {
        b.is_published()
            .cmp(&a.is_published())
            .then_with(|| {
                if a.is_published() {
                    a.display_order.cmp(&b.display_order)
                } else {
                    a.created_at.cmp(&b.created_at)
                }
            })
    });
    faqs
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AskQuestionRequest {
    #[validate(length(min = 1, max = 500, message = "질문은 1~500자로 입력해주세요."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub question: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnswerQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "답변은 1~2000자로 입력해주세요."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqResponse {
    pub id: Uuid,
    pub question: String,
    pub answer: Option<String>,
    pub answered: bool,
    pub display_order: i32,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<Faq> for FaqResponse {
    fn from(faq: Faq) -> Self {
        Self {
            answered: faq.is_answered(),
            id: faq.id,
            question: faq.question,
            answer: faq.answer,
            display_order: faq.display_order,
            author_name: faq.author_name,
            created_at: faq.created_at,
            answered_at: faq.answered_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqListResponse {
    pub faqs: Vec<FaqResponse>,
    pub count: usize,
}
