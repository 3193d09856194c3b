//! Handlers for the owner's view of collected feedback
//! (`/entries/{slug}/feedback`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use formdesk_core::display::AnswerDisplay;
use formdesk_core::error::CoreError;
use formdesk_core::histogram::{fill_daily_counts, window_start, DailyCount, HISTOGRAM_DAYS};
use formdesk_core::pagination::{clamp_page, offset_for, Page, FEEDBACK_PER_PAGE};
use formdesk_core::question::QuestionType;
use formdesk_core::types::DbId;
use formdesk_db::models::answer::AnswerWithQuestion;
use formdesk_db::models::entry::Entry;
use formdesk_db::models::feedback::{Feedback, FeedbackSummary};
use formdesk_db::repositories::{AnswerRepo, FeedbackRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppPath, AppQuery};
use crate::handlers::entry::find_owned_entry;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct FeedbackList {
    pub entry: Entry,
    pub feedback: Page<FeedbackSummary>,
    /// One point per UTC day for the last [`HISTOGRAM_DAYS`] days.
    pub histogram: Vec<DailyCount>,
}

/// An answer with its question and a type-specific rendering.
#[derive(Debug, Serialize)]
pub struct RenderedAnswer {
    #[serde(flatten)]
    pub answer: AnswerWithQuestion,
    pub display: AnswerDisplay,
}

impl From<AnswerWithQuestion> for RenderedAnswer {
    fn from(answer: AnswerWithQuestion) -> Self {
        // Unknown types cannot pass the CHECK constraint; show them as text anyway.
        let kind = answer
            .question_type
            .parse()
            .unwrap_or(QuestionType::Text);
        let display = AnswerDisplay::render(kind, &answer.value);
        Self { answer, display }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackDetail {
    pub entry: Entry,
    pub feedback: Feedback,
    pub answers: Vec<RenderedAnswer>,
}

fn feedback_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found("Feedback", id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/entries/{slug}/feedback?page=
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<DataResponse<FeedbackList>>> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;
    let page = clamp_page(params.page);

    let items = FeedbackRepo::list_by_entry(
        &state.pool,
        entry.id,
        FEEDBACK_PER_PAGE,
        offset_for(page, FEEDBACK_PER_PAGE),
    )
    .await?;
    let total = FeedbackRepo::count_by_entry(&state.pool, entry.id).await?;

    let today = Utc::now().date_naive();
    let rows = FeedbackRepo::daily_counts(
        &state.pool,
        entry.id,
        window_start(today, HISTOGRAM_DAYS),
    )
    .await?;
    let rows: Vec<_> = rows.into_iter().map(|r| (r.day, r.count)).collect();
    let histogram = fill_daily_counts(today, HISTOGRAM_DAYS, &rows);

    tracing::debug!(entry_id = entry.id, page, total, "Listed feedback");

    Ok(Json(DataResponse {
        data: FeedbackList {
            entry,
            feedback: Page::new(items, page, FEEDBACK_PER_PAGE, total),
            histogram,
        },
    }))
}

/// GET /api/v1/entries/{slug}/feedback/{id}
pub async fn show(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((slug, id)): AppPath<(String, DbId)>,
) -> AppResult<Json<DataResponse<FeedbackDetail>>> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;
    let feedback = FeedbackRepo::find_for_entry(&state.pool, entry.id, id)
        .await?
        .ok_or_else(|| feedback_not_found(id))?;

    let answers = AnswerRepo::list_with_questions(&state.pool, feedback.id)
        .await?
        .into_iter()
        .map(RenderedAnswer::from)
        .collect();

    Ok(Json(DataResponse {
        data: FeedbackDetail {
            entry,
            feedback,
            answers,
        },
    }))
}

/// DELETE /api/v1/entries/{slug}/feedback/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((slug, id)): AppPath<(String, DbId)>,
) -> AppResult<StatusCode> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;

    if FeedbackRepo::delete_for_entry(&state.pool, entry.id, id).await? {
        tracing::info!(entry_id = entry.id, feedback_id = id, "Feedback deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(feedback_not_found(id))
    }
}
