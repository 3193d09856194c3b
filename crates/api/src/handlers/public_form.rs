//! Public, unauthenticated form endpoints (`/f/{slug}`).
//!
//! A form is open only while its entry is published and has at least one
//! question. Everything else (missing, draft, empty) looks the same to the
//! respondent.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use formdesk_core::error::CoreError;
use formdesk_core::submission::{SubmissionQuestion, SubmissionValidator};
use formdesk_core::types::DbId;
use formdesk_db::models::entry::{Entry, PublicEntry};
use formdesk_db::models::feedback::SubmitFeedback;
use formdesk_db::models::question::Question;
use formdesk_db::repositories::{EntryRepo, FeedbackRepo, QuestionRepo, SubmitOutcome};
use formdesk_db::DbPool;
use serde::Serialize;

use crate::error::{with_input, AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PublicForm {
    pub entry: PublicEntry,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub feedback_id: DbId,
    pub answer_count: usize,
    /// Where the respondent should be sent next.
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct ThankYou {
    pub entry: PublicEntry,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an entry that is accepting responses, with its questions in order.
async fn load_open_form(pool: &DbPool, slug: &str) -> AppResult<(Entry, Vec<Question>)> {
    let entry = EntryRepo::find_by_slug(pool, slug)
        .await?
        .filter(Entry::is_published)
        .ok_or(AppError::Core(CoreError::FormUnavailable))?;

    let questions = QuestionRepo::list_by_entry(pool, entry.id).await?;
    if questions.is_empty() {
        return Err(AppError::Core(CoreError::FormUnavailable));
    }
    Ok((entry, questions))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/f/{slug}
pub async fn show(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<DataResponse<PublicForm>>> {
    let (entry, questions) = load_open_form(&state.pool, &slug).await?;

    Ok(Json(DataResponse {
        data: PublicForm {
            entry: entry.into(),
            questions,
        },
    }))
}

/// POST /api/v1/f/{slug}
///
/// Validation rules are rebuilt from the current questions on every call.
/// The feedback and all of its answers are written in one transaction, which
/// fails with 409 if the questions changed after validation.
pub async fn submit(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
    AppJson(input): AppJson<SubmitFeedback>,
) -> AppResult<(StatusCode, Json<DataResponse<SubmissionReceipt>>)> {
    let (entry, questions) = load_open_form(&state.pool, &slug).await?;

    let rules: Vec<SubmissionQuestion> = questions
        .iter()
        .map(Question::to_submission_question)
        .collect::<Result<_, _>>()?;
    let accepted = SubmissionValidator::for_questions(&rules)
        .validate(&input.answers)
        .map_err(with_input(&input))?;

    let (feedback, answers) =
        match FeedbackRepo::create_with_answers(&state.pool, entry.id, &rules, &accepted).await? {
            SubmitOutcome::Stored { feedback, answers } => (feedback, answers),
            SubmitOutcome::Stale => {
                return Err(AppError::Core(CoreError::Conflict(
                    "This form changed while you were answering it, reload and try again".into(),
                )));
            }
        };

    tracing::info!(
        entry_id = entry.id,
        feedback_id = feedback.id,
        answers = answers.len(),
        "Feedback submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionReceipt {
                feedback_id: feedback.id,
                answer_count: answers.len(),
                redirect: format!("/api/v1/f/{}/thanks", entry.slug),
            },
        }),
    ))
}

/// GET /api/v1/f/{slug}/thanks
///
/// Works for any existing entry and changes nothing.
pub async fn thanks(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<DataResponse<ThankYou>>> {
    let entry = EntryRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Entry", &slug)))?;

    Ok(Json(DataResponse {
        data: ThankYou {
            entry: entry.into(),
            message: "Thank you for your feedback!",
        },
    }))
}
