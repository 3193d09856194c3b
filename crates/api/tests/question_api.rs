//! Integration tests for question management under
//! `/entries/{slug}/questions`.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_entry, create_question, delete_auth, get_auth, id_of, post_json_auth,
    put_json_auth, slug_of, token_for,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn entry_status(app: &axum::Router, token: &str, slug: &str) -> Value {
    let response = get_auth(app.clone(), &format!("/api/v1/entries/{slug}/edit"), token).await;
    body_json(response).await["data"]["entry"]["status_id"].clone()
}

async fn question_ids(app: &axum::Router, token: &str, slug: &str) -> Vec<i64> {
    let response = get_auth(app.clone(), &format!("/api/v1/entries/{slug}/questions"), token).await;
    let json = body_json(response).await;
    json["data"]["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(id_of)
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_includes_types_and_feedback_count(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let response = get_auth(app, &format!("/api/v1/entries/{slug}/questions"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["questions"], json!([]));
    assert_eq!(json["data"]["feedback_count"], 0);
    assert_eq!(
        json["data"]["question_types"],
        json!(["rating", "text", "multiple_choice", "name", "email"])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_question_publishes_and_last_delete_reverts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);
    assert_eq!(entry_status(&app, &token, &slug).await, 1);

    let q = create_question(
        &app,
        &token,
        &slug,
        json!({"label": "How did we do?", "type": "rating", "is_required": true}),
    )
    .await;
    assert_eq!(q["order"], 0);
    assert_eq!(q["type"], "rating");
    assert!(q["options"].is_null());
    assert_eq!(entry_status(&app, &token, &slug).await, 2);

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions/{}", id_of(&q)),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(entry_status(&app, &token, &slug).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn questions_are_appended_in_order(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    for (i, label) in ["One", "Two", "Three"].iter().enumerate() {
        let q = create_question(&app, &token, &slug, json!({"label": label, "type": "text"})).await;
        assert_eq!(q["order"], i as i64);
        assert_eq!(q["is_required"], false);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn multiple_choice_requires_options(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions"),
        &token,
        json!({"label": "Pick", "type": "multiple_choice"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["fields"]["options"].is_array());

    let q = create_question(
        &app,
        &token,
        &slug,
        json!({"label": "Pick", "type": "multiple_choice", "options": [" Red ", "Blue"]}),
    )
    .await;
    assert_eq!(q["options"], json!(["Red", "Blue"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_type_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions"),
        &token,
        json!({"label": "Slide", "type": "slider"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["fields"]["type"].is_array());

    assert_eq!(entry_status(&app, &token, &slug).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_changes_type_and_drops_options(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);
    let q = create_question(
        &app,
        &token,
        &slug,
        json!({"label": "Pick", "type": "multiple_choice", "options": ["A", "B"]}),
    )
    .await;

    let response = put_json_auth(
        app,
        &format!("/api/v1/entries/{slug}/questions/{}", id_of(&q)),
        &token,
        json!({"label": "Describe it", "type": "text", "is_required": true, "options": ["A"]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["label"], "Describe it");
    assert_eq!(updated["type"], "text");
    assert_eq!(updated["is_required"], true);
    assert!(updated["options"].is_null());
    assert_eq!(updated["order"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn question_of_another_entry_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let first = slug_of(&create_entry(&app, &token, "First").await);
    let second = slug_of(&create_entry(&app, &token, "Second").await);
    let q = create_question(&app, &token, &first, json!({"label": "Q", "type": "text"})).await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/entries/{second}/questions/{}", id_of(&q)),
        &token,
        json!({"label": "Moved?", "type": "text"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(
        app,
        &format!("/api/v1/entries/{second}/questions/{}", id_of(&q)),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_owner_cannot_manage_questions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let alice = token_for(1);
    let bob = token_for(2);
    let slug = slug_of(&create_entry(&app, &alice, "Survey").await);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions"),
        &bob,
        json!({"label": "Sneaky", "type": "text"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(entry_status(&app, &alice, &slug).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_renumbers_remaining_questions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let mut ids = Vec::new();
    for label in ["A", "B", "C"] {
        let q = create_question(&app, &token, &slug, json!({"label": label, "type": "text"})).await;
        ids.push(id_of(&q));
    }

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions/{}", ids[1]),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app, &format!("/api/v1/entries/{slug}/questions"), &token).await;
    let json = body_json(response).await;
    let orders: Vec<(i64, i64)> = json["data"]["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| (id_of(q), q["order"].as_i64().unwrap()))
        .collect();
    assert_eq!(orders, vec![(ids[0], 0), (ids[2], 1)]);
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reorder_applies_full_permutation(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let mut ids = Vec::new();
    for label in ["A", "B", "C"] {
        let q = create_question(&app, &token, &slug, json!({"label": label, "type": "text"})).await;
        ids.push(id_of(&q));
    }

    let wanted = vec![ids[2], ids[0], ids[1]];
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions/order"),
        &token,
        json!({"questions": wanted}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let returned: Vec<i64> = body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(id_of)
        .collect();
    assert_eq!(returned, wanted);
    assert_eq!(question_ids(&app, &token, &slug).await, wanted);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reorder_rejects_partial_or_foreign_lists(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);
    let other = slug_of(&create_entry(&app, &token, "Other").await);

    let a = id_of(&create_question(&app, &token, &slug, json!({"label": "A", "type": "text"})).await);
    let b = id_of(&create_question(&app, &token, &slug, json!({"label": "B", "type": "text"})).await);
    let foreign =
        id_of(&create_question(&app, &token, &other, json!({"label": "X", "type": "text"})).await);

    for body in [
        json!({"questions": [b]}),
        json!({"questions": [b, a, a]}),
        json!({"questions": [b, foreign]}),
        json!({"questions": []}),
    ] {
        let response = post_json_auth(
            app.clone(),
            &format!("/api/v1/entries/{slug}/questions/order"),
            &token,
            body.clone(),
        )
        .await;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "body {body} should be rejected"
        );
    }

    assert_eq!(question_ids(&app, &token, &slug).await, vec![a, b]);
}

// ---------------------------------------------------------------------------
// Body and path parsing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn required_flag_accepts_form_encodings(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    for (flag, expected) in [(json!("1"), true), (json!(1), true), (json!("0"), false)] {
        let q = create_question(
            &app,
            &token,
            &slug,
            json!({"label": "Q", "type": "text", "is_required": flag}),
        )
        .await;
        assert_eq!(q["is_required"], expected, "flag {flag}");
    }

    let response = post_json_auth(
        app,
        &format!("/api/v1/entries/{slug}/questions"),
        &token,
        json!({"label": "Q", "type": "text", "is_required": "maybe"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["fields"]["is_required"].is_array());
    assert_eq!(json["input"]["is_required"], "maybe");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrongly_typed_field_is_a_field_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let response = post_json_auth(
        app,
        &format!("/api/v1/entries/{slug}/questions"),
        &token,
        json!({"label": 5, "type": "text"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["body"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_numeric_question_id_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions/abc"),
        &token,
        json!({"label": "Q", "type": "text"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = delete_auth(app, &format!("/api/v1/entries/{slug}/questions/abc"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reorder_accepts_numeric_string_ids(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = token_for(1);
    let slug = slug_of(&create_entry(&app, &token, "Survey").await);

    let a = id_of(&create_question(&app, &token, &slug, json!({"label": "A", "type": "text"})).await);
    let b = id_of(&create_question(&app, &token, &slug, json!({"label": "B", "type": "text"})).await);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/entries/{slug}/questions/order"),
        &token,
        json!({"questions": [b.to_string(), a]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(question_ids(&app, &token, &slug).await, vec![b, a]);

    let response = post_json_auth(
        app,
        &format!("/api/v1/entries/{slug}/questions/order"),
        &token,
        json!({"questions": ["first", a]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["fields"]["questions.0"].is_array());
}
