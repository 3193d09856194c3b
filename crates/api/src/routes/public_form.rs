//! Route definitions for public forms. No authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::public_form;
use crate::state::AppState;

/// Routes mounted at `/f`.
///
/// ```text
/// GET    /{slug}          -> show
/// POST   /{slug}          -> submit
/// GET    /{slug}/thanks   -> thanks
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}", get(public_form::show).post(public_form::submit))
        .route("/{slug}/thanks", get(public_form::thanks))
}
