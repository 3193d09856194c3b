//! Route definitions for the `/entries` resource and everything owned by an
//! entry.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{entry, feedback, question};
use crate::state::AppState;

/// Routes mounted at `/entries`. All require an owner token.
///
/// ```text
/// GET    /                            -> entry::list
/// POST   /                            -> entry::create
/// GET    /{slug}/edit                 -> entry::edit
/// PUT    /{slug}                      -> entry::update
/// DELETE /{slug}                      -> entry::delete
///
/// GET    /{slug}/questions            -> question::list
/// POST   /{slug}/questions            -> question::create
/// POST   /{slug}/questions/order      -> question::reorder
/// PUT    /{slug}/questions/{id}       -> question::update
/// DELETE /{slug}/questions/{id}       -> question::delete
///
/// GET    /{slug}/feedback             -> feedback::list
/// GET    /{slug}/feedback/{id}        -> feedback::show
/// DELETE /{slug}/feedback/{id}        -> feedback::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(entry::list).post(entry::create))
        .route("/{slug}", put(entry::update).delete(entry::delete))
        .route("/{slug}/edit", get(entry::edit))
        .route(
            "/{slug}/questions",
            get(question::list).post(question::create),
        )
        .route("/{slug}/questions/order", post(question::reorder))
        .route(
            "/{slug}/questions/{id}",
            put(question::update).delete(question::delete),
        )
        .route("/{slug}/feedback", get(feedback::list))
        .route(
            "/{slug}/feedback/{id}",
            get(feedback::show).delete(feedback::delete),
        )
}
