pub mod entry;
pub mod health;
pub mod public_form;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /entries                                   list, create (owner)
/// /entries/{slug}                            update, delete (owner)
/// /entries/{slug}/edit                       edit view (owner)
/// /entries/{slug}/questions                  list, create (owner)
/// /entries/{slug}/questions/order            reorder (owner)
/// /entries/{slug}/questions/{id}             update, delete (owner)
/// /entries/{slug}/feedback                   list with histogram (owner)
/// /entries/{slug}/feedback/{id}              show, delete (owner)
///
/// /f/{slug}                                  public form, submit
/// /f/{slug}/thanks                           thank-you page
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/entries", entry::router())
        .nest("/f", public_form::router())
}
