//! Handlers for an entry's questions (`/entries/{slug}/questions`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use formdesk_core::error::CoreError;
use formdesk_core::question::{
    parse_question_ids, validate_question_fields, validate_reorder, QuestionFields, QuestionType,
    QUESTION_TYPES,
};
use formdesk_core::types::DbId;
use formdesk_db::models::entry::Entry;
use formdesk_db::models::question::{Question, QuestionInput, ReorderQuestions};
use formdesk_db::repositories::{EntryRepo, QuestionRepo, ReorderOutcome};
use serde::Serialize;

use crate::error::{with_input, AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::entry::find_owned_entry;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Everything the question editor needs in one response.
#[derive(Debug, Serialize)]
pub struct QuestionList {
    pub entry: Entry,
    pub questions: Vec<Question>,
    pub feedback_count: i64,
    pub question_types: &'static [QuestionType],
}

fn validate_input(input: &QuestionInput) -> Result<QuestionFields, CoreError> {
    validate_question_fields(
        input.label.as_deref(),
        input.question_type.as_deref(),
        input.is_required.as_ref(),
        input.options.as_deref(),
    )
}

fn question_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::not_found("Question", id))
}

/// GET /api/v1/entries/{slug}/questions
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<DataResponse<QuestionList>>> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;
    let questions = QuestionRepo::list_by_entry(&state.pool, entry.id).await?;
    let feedback_count = EntryRepo::feedback_count(&state.pool, entry.id).await?;

    Ok(Json(DataResponse {
        data: QuestionList {
            entry,
            questions,
            feedback_count,
            question_types: QUESTION_TYPES,
        },
    }))
}

/// POST /api/v1/entries/{slug}/questions
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
    AppJson(input): AppJson<QuestionInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Question>>)> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;
    let fields = validate_input(&input).map_err(with_input(&input))?;

    let (question, status) = QuestionRepo::create(&state.pool, entry.id, &fields).await?;

    tracing::info!(
        entry_id = entry.id,
        question_id = question.id,
        status = status.as_str(),
        "Question created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: question })))
}

/// PUT /api/v1/entries/{slug}/questions/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((slug, id)): AppPath<(String, DbId)>,
    AppJson(input): AppJson<QuestionInput>,
) -> AppResult<Json<DataResponse<Question>>> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;
    let fields = validate_input(&input).map_err(with_input(&input))?;

    let question = QuestionRepo::update(&state.pool, entry.id, id, &fields)
        .await?
        .ok_or_else(|| question_not_found(id))?;

    tracing::info!(entry_id = entry.id, question_id = id, "Question updated");
    Ok(Json(DataResponse { data: question }))
}

/// DELETE /api/v1/entries/{slug}/questions/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((slug, id)): AppPath<(String, DbId)>,
) -> AppResult<StatusCode> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;

    let status = QuestionRepo::delete(&state.pool, entry.id, id)
        .await?
        .ok_or_else(|| question_not_found(id))?;

    tracing::info!(
        entry_id = entry.id,
        question_id = id,
        status = status.as_str(),
        "Question deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/entries/{slug}/questions/order
///
/// The body must list every question of the entry exactly once; the
/// position in the list becomes the new order. Ids may be numbers or numeric
/// strings.
pub async fn reorder(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
    AppJson(input): AppJson<ReorderQuestions>,
) -> AppResult<Json<DataResponse<Vec<Question>>>> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;

    let ordered = parse_question_ids(&input.questions).map_err(with_input(&input))?;
    let current = QuestionRepo::list_ids(&state.pool, entry.id).await?;
    validate_reorder(&current, &ordered).map_err(with_input(&input))?;

    match QuestionRepo::reorder(&state.pool, entry.id, &ordered).await? {
        ReorderOutcome::Applied => {}
        ReorderOutcome::Stale => {
            return Err(AppError::Core(CoreError::Conflict(
                "Questions changed while reordering, reload and try again".into(),
            )));
        }
    }

    let questions = QuestionRepo::list_by_entry(&state.pool, entry.id).await?;
    tracing::info!(entry_id = entry.id, count = questions.len(), "Questions reordered");
    Ok(Json(DataResponse { data: questions }))
}
