//! Handlers for the owner's `/entries` resource.

use std::future::Future;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use formdesk_core::entry::{
    generate_slug, like_pattern, normalize_search, validate_entry_fields, EntrySort,
    ENTRIES_PER_PAGE, SLUG_MAX_ATTEMPTS,
};
use formdesk_core::error::CoreError;
use formdesk_core::pagination::{clamp_page, offset_for, Page};
use formdesk_core::types::DbId;
use formdesk_db::models::entry::{CreateEntry, Entry, EntryWithCount, UpdateEntry};
use formdesk_db::repositories::EntryRepo;
use formdesk_db::DbPool;
use serde::Serialize;

use crate::error::{with_input, AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::EntryListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Constraint guarding public slugs.
const SLUG_CONSTRAINT: &str = "uq_entries_slug";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// The filters that produced an entry list, echoed back for the client.
#[derive(Debug, Serialize)]
pub struct EntryFilters {
    pub search: Option<String>,
    pub sort: EntrySort,
}

#[derive(Debug, Serialize)]
pub struct EntryList {
    pub entries: Page<EntryWithCount>,
    pub filters: EntryFilters,
}

/// An entry as loaded for its edit screen.
#[derive(Debug, Serialize)]
pub struct EntryEdit {
    pub entry: Entry,
    pub question_count: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an entry by slug, scoped to its owner.
///
/// Entries of other owners are reported exactly like missing ones.
pub(crate) async fn find_owned_entry(
    pool: &DbPool,
    slug: &str,
    user_id: DbId,
) -> AppResult<Entry> {
    EntryRepo::find_by_slug_for_owner(pool, slug, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Entry", slug)))
}

/// Run `write` with freshly generated slugs until one does not collide.
async fn with_fresh_slug<T, F, Fut>(title: &str, mut write: F) -> AppResult<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    for attempt in 1..=SLUG_MAX_ATTEMPTS {
        let slug = generate_slug(title);
        match write(slug.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) if formdesk_db::is_unique_violation(&err, SLUG_CONSTRAINT) => {
                tracing::warn!(slug = %slug, attempt, "Slug collision, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::Core(CoreError::Conflict(
        "Could not generate a unique link for this entry, please try again".into(),
    )))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/entries?search=&sort=&page=
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<EntryListParams>,
) -> AppResult<Json<DataResponse<EntryList>>> {
    let search = normalize_search(params.search.as_deref());
    let sort = EntrySort::from_param(params.sort.as_deref());
    let page = clamp_page(params.page);
    let pattern = search.as_deref().map(like_pattern);

    let items = EntryRepo::list_for_owner(
        &state.pool,
        auth.user_id,
        pattern.as_deref(),
        sort,
        ENTRIES_PER_PAGE,
        offset_for(page, ENTRIES_PER_PAGE),
    )
    .await?;
    let total = EntryRepo::count_for_owner(&state.pool, auth.user_id, pattern.as_deref()).await?;

    tracing::debug!(user_id = auth.user_id, page, total, sort = sort.as_str(), "Listed entries");

    Ok(Json(DataResponse {
        data: EntryList {
            entries: Page::new(items, page, ENTRIES_PER_PAGE, total),
            filters: EntryFilters { search, sort },
        },
    }))
}

/// POST /api/v1/entries
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateEntry>,
) -> AppResult<(StatusCode, Json<DataResponse<Entry>>)> {
    let fields = validate_entry_fields(input.title.as_deref(), input.description.as_deref())
        .map_err(with_input(&input))?;

    let pool = &state.pool;
    let fields_ref = &fields;
    let user_id = auth.user_id;
    let entry = with_fresh_slug(&fields.title, |slug| async move {
        EntryRepo::create(pool, user_id, &slug, fields_ref).await
    })
    .await?;

    tracing::info!(entry_id = entry.id, slug = %entry.slug, "Entry created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/v1/entries/{slug}/edit
pub async fn edit(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<Json<DataResponse<EntryEdit>>> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;
    let question_count = EntryRepo::question_count(&state.pool, entry.id).await?;

    Ok(Json(DataResponse {
        data: EntryEdit {
            entry,
            question_count,
        },
    }))
}

/// PUT /api/v1/entries/{slug}
///
/// The slug is regenerated only when the title changes, so a description
/// edit keeps existing links working.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
    AppJson(input): AppJson<UpdateEntry>,
) -> AppResult<Json<DataResponse<Entry>>> {
    let existing = find_owned_entry(&state.pool, &slug, auth.user_id).await?;
    let fields = validate_entry_fields(input.title.as_deref(), input.description.as_deref())
        .map_err(with_input(&input))?;

    let updated = if fields.title == existing.title {
        EntryRepo::update(&state.pool, existing.id, &existing.slug, &fields).await?
    } else {
        let pool = &state.pool;
        let fields_ref = &fields;
        let id = existing.id;
        with_fresh_slug(&fields.title, |new_slug| async move {
            EntryRepo::update(pool, id, &new_slug, fields_ref).await
        })
        .await?
    };

    let entry = updated.ok_or_else(|| AppError::Core(CoreError::not_found("Entry", &slug)))?;

    tracing::info!(entry_id = entry.id, slug = %entry.slug, "Entry updated");
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/entries/{slug}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    let entry = find_owned_entry(&state.pool, &slug, auth.user_id).await?;

    if EntryRepo::delete(&state.pool, entry.id).await? {
        tracing::info!(entry_id = entry.id, slug = %entry.slug, "Entry deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Entry", &slug)))
    }
}
