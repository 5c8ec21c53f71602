//! HTTP-level tests for announcements and the contact form.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_identity, data, delete_auth, get, get_auth, post_json, post_json_auth,
    put_json_auth,
};
use kwiki_core::roles::{ROLE_ADMINISTRATOR, ROLE_COLLABORATOR};
use serde_json::json;
use sqlx::PgPool;

const ADMIN_ANNOUNCEMENTS: &str = "/api/site/admin/announcements";

async fn announce(app: axum::Router, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app, ADMIN_ANNOUNCEMENTS, token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    data(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn scheduled_announcements_stay_hidden(pool: PgPool) {
    let (_, admin) = create_identity(&pool, "admin", ROLE_ADMINISTRATOR).await;
    let app = common::build_test_app(pool);

    let live = announce(
        app.clone(),
        &admin,
        json!({ "language": "ko", "category": "news", "title": "Launch", "content": "Hello" }),
    )
    .await;
    let scheduled = announce(
        app.clone(),
        &admin,
        json!({
            "translation_set_identifier": live["translation_set_identifier"],
            "language": "ko",
            "category": "maintenance",
            "title": "Downtime",
            "content": "Tonight",
            "published_date": Utc::now() + Duration::days(3),
        }),
    )
    .await;
    announce(
        app.clone(),
        &admin,
        json!({
            "translation_set_identifier": live["translation_set_identifier"],
            "language": "en",
            "category": "news",
            "title": "Launch",
            "content": "Hello",
        }),
    )
    .await;

    let response = get(app.clone(), "/api/site/announcements?language=ko").await;
    assert_eq!(response.status(), StatusCode::OK);
    let public = data(response).await;
    assert_eq!(public.as_array().unwrap().len(), 1);
    assert_eq!(public[0]["id"], live["id"]);

    let response = get(
        app.clone(),
        &format!("/api/site/announcements/{}", scheduled["id"].as_str().unwrap()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app.clone(), &format!("{ADMIN_ANNOUNCEMENTS}?language=ko"), &admin).await;
    assert_eq!(data(response).await.as_array().unwrap().len(), 2);

    // Language is required to list.
    let response = get(app, "/api/site/announcements").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_updates_and_deletes_announcements(pool: PgPool) {
    let (_, admin) = create_identity(&pool, "admin", ROLE_ADMINISTRATOR).await;
    let app = common::build_test_app(pool);

    let created = announce(
        app.clone(),
        &admin,
        json!({ "language": "ja", "category": "event", "title": "Fan meeting", "content": "Soon" }),
    )
    .await;
    let uri = format!("{ADMIN_ANNOUNCEMENTS}/{}", created["id"].as_str().unwrap());

    let response = put_json_auth(app.clone(), &uri, &admin, json!({ "title": "Fan meeting 2" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = data(response).await;
    assert_eq!(updated["title"], "Fan meeting 2");
    assert_eq!(updated["content"], "Soon");

    let response = put_json_auth(app.clone(), &uri, &admin, json!({ "category": "gossip" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn announcement_management_requires_admin(pool: PgPool) {
    let (_, collaborator) = create_identity(&pool, "collab", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        ADMIN_ANNOUNCEMENTS,
        &collaborator,
        json!({ "language": "ko", "category": "news", "title": "Hi", "content": "There" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(
        app,
        ADMIN_ANNOUNCEMENTS,
        json!({ "language": "ko", "category": "news", "title": "Hi", "content": "There" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn announcement_content_is_validated(pool: PgPool) {
    let (_, admin) = create_identity(&pool, "admin", ROLE_ADMINISTRATOR).await;
    let app = common::build_test_app(pool);

    let long_title = "x".repeat(65);
    for body in [
        json!({ "language": "ko", "category": "gossip", "title": "Hi", "content": "There" }),
        json!({ "language": "ko", "category": "news", "title": "  ", "content": "There" }),
        json!({ "language": "ko", "category": "news", "title": long_title, "content": "There" }),
    ] {
        let response = post_json_auth(app.clone(), ADMIN_ANNOUNCEMENTS, &admin, body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn contact_returns_only_a_reference(pool: PgPool) {
    let (_, admin) = create_identity(&pool, "admin", ROLE_ADMINISTRATOR).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/site/contacts",
        json!({
            "category": "bug_report",
            "name": "Minji",
            "email": "minji@example.com",
            "content": "The search page is blank",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = data(response).await;
    assert_eq!(receipt["reference"].as_str().unwrap().len(), 26);
    assert!(receipt.get("email").is_none());

    post_json(
        app.clone(),
        "/api/site/contacts",
        json!({
            "category": "question",
            "name": "Yuna",
            "email": "yuna@example.com",
            "content": "How do I become a collaborator?",
        }),
    )
    .await;

    let response = get_auth(app.clone(), "/api/site/admin/contacts?category=bug_report", &admin).await;
    let contacts = data(response).await;
    assert_eq!(contacts.as_array().unwrap().len(), 1);
    assert_eq!(contacts[0]["reference"], receipt["reference"]);

    let response = get_auth(
        app,
        &format!("/api/site/admin/contacts/{}", contacts[0]["id"].as_str().unwrap()),
        &admin,
    )
    .await;
    assert_eq!(data(response).await["email"], "minji@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn contact_input_is_validated(pool: PgPool) {
    let (_, collaborator) = create_identity(&pool, "collab", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    for body in [
        json!({ "category": "spam", "name": "A", "email": "a@example.com", "content": "Hi" }),
        json!({ "category": "other", "name": "A", "email": "not-an-email", "content": "Hi" }),
        json!({ "category": "other", "name": "A", "email": "a@example.com", "content": "" }),
    ] {
        let response = post_json(app.clone(), "/api/site/contacts", body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    let response = get_auth(app, "/api/site/admin/contacts", &collaborator).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
