//! HTTP-level tests for accounts, membership and affiliations.

mod common;

use axum::http::StatusCode;
use common::{create_identity, data, delete_auth, get_auth, post_auth, post_json_auth, put_json_auth};
use kwiki_core::roles::ROLE_COLLABORATOR;
use serde_json::json;
use sqlx::PgPool;

async fn create_account(app: axum::Router, token: &str, name: &str, account_type: &str) -> String {
    let response = post_json_auth(
        app,
        "/api/accounts",
        token,
        json!({
            "name": name,
            "account_type": account_type,
            "email": "contact@example.com",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    data(response).await["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn creator_becomes_owner(pool: PgPool) {
    let (owner_id, owner) = create_identity(&pool, "owner", ROLE_COLLABORATOR).await;
    let (_, stranger) = create_identity(&pool, "stranger", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    let account_id = create_account(app.clone(), &owner, "BigHit Music", "agency").await;

    let response = get_auth(app.clone(), &format!("/api/accounts/{account_id}/members"), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let members = data(response).await;
    assert_eq!(members[0]["identity_id"], owner_id.to_string());
    assert_eq!(members[0]["role"], "owner");

    let response = get_auth(app.clone(), "/api/accounts", &owner).await;
    assert_eq!(data(response).await.as_array().unwrap().len(), 1);

    let response = get_auth(app, &format!("/api/accounts/{account_id}"), &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_account_type_is_rejected(pool: PgPool) {
    let (_, owner) = create_identity(&pool, "owner", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/accounts",
        &owner,
        json!({ "name": "Label", "account_type": "label", "email": "a@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn last_owner_cannot_leave_or_be_demoted(pool: PgPool) {
    let (owner_id, owner) = create_identity(&pool, "owner", ROLE_COLLABORATOR).await;
    let (member_id, member) = create_identity(&pool, "member", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    let account_id = create_account(app.clone(), &owner, "Solo Artist", "talent").await;
    let members_uri = format!("/api/accounts/{account_id}/members");
    let owner_uri = format!("{members_uri}/{owner_id}");

    let response = delete_auth(app.clone(), &owner_uri, &owner).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(app.clone(), &owner_uri, &owner, json!({ "role": "member" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        app.clone(),
        &members_uri,
        &owner,
        json!({ "identity_id": member_id, "role": "member" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Plain members cannot manage membership.
    let response = delete_auth(app.clone(), &owner_uri, &member).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Adding the same identity twice hits the unique constraint.
    let response = post_json_auth(
        app.clone(),
        &members_uri,
        &owner,
        json!({ "identity_id": member_id, "role": "member" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // With a second owner the first may leave.
    let member_uri = format!("{members_uri}/{member_id}");
    let response = put_json_auth(app.clone(), &member_uri, &owner, json!({ "role": "owner" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(app, &owner_uri, &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn affiliation_is_answered_by_the_counter_party(pool: PgPool) {
    let (_, agency_owner) = create_identity(&pool, "agency", ROLE_COLLABORATOR).await;
    let (_, talent_owner) = create_identity(&pool, "talent", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    let agency_id = create_account(app.clone(), &agency_owner, "Agency", "agency").await;
    let talent_id = create_account(app.clone(), &talent_owner, "Talent", "talent").await;

    let request = json!({
        "agency_account_id": agency_id,
        "talent_account_id": talent_id,
        "agency_share_percent": 30,
    });
    let response =
        post_json_auth(app.clone(), "/api/accounts/affiliations", &agency_owner, request.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let affiliation = data(response).await;
    assert_eq!(affiliation["requested_by"], "agency");
    assert_eq!(affiliation["status_id"], 1);
    let id = affiliation["id"].as_str().unwrap().to_string();

    // A pending request blocks another one for the pair.
    let response =
        post_json_auth(app.clone(), "/api/accounts/affiliations", &talent_owner, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The requester cannot answer its own request.
    let approve_uri = format!("/api/accounts/affiliations/{id}/approve");
    let response = post_auth(app.clone(), &approve_uri, &agency_owner).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(app.clone(), &approve_uri, &talent_owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let active = data(response).await;
    assert_eq!(active["status_id"], 2);
    assert!(active["activated_at"].is_string());

    // Approving again is a disallowed operation.
    let response = post_auth(app.clone(), &approve_uri, &talent_owner).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(
        app.clone(),
        &format!("/api/accounts/{talent_id}/affiliations"),
        &talent_owner,
    )
    .await;
    assert_eq!(data(response).await.as_array().unwrap().len(), 1);

    let response = post_auth(
        app,
        &format!("/api/accounts/affiliations/{id}/terminate"),
        &agency_owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(data(response).await["status_id"], 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn affiliation_sides_must_match_account_types(pool: PgPool) {
    let (_, owner) = create_identity(&pool, "owner", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    let general_id = create_account(app.clone(), &owner, "Fan Club", "general").await;
    let talent_id = create_account(app.clone(), &owner, "Talent", "talent").await;

    let response = post_json_auth(
        app,
        "/api/accounts/affiliations",
        &owner,
        json!({
            "agency_account_id": general_id,
            "talent_account_id": talent_id,
            "agency_share_percent": 10,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn outsiders_cannot_request_affiliations(pool: PgPool) {
    let (_, agency_owner) = create_identity(&pool, "agency", ROLE_COLLABORATOR).await;
    let (_, talent_owner) = create_identity(&pool, "talent", ROLE_COLLABORATOR).await;
    let (_, outsider) = create_identity(&pool, "outsider", ROLE_COLLABORATOR).await;
    let app = common::build_test_app(pool);

    let agency_id = create_account(app.clone(), &agency_owner, "Agency", "agency").await;
    let talent_id = create_account(app.clone(), &talent_owner, "Talent", "talent").await;

    let response = post_json_auth(
        app,
        "/api/accounts/affiliations",
        &outsider,
        json!({
            "agency_account_id": agency_id,
            "talent_account_id": talent_id,
            "agency_share_percent": 10,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
