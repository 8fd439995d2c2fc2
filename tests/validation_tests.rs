// SPDX-License-Identifier: MIT

//! Input validation and auth-guard tests.
//!
//! These run fully offline: every request here is rejected before any
//! database operation would happen.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_register_rejects_blank_fields() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::json_post(
            "/auth/register",
            json!({
                "fullname": "   ",
                "email": "ann@x.com",
                "username": "annl",
                "password": "secret1",
                "avatar": "f1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_register_rejects_missing_avatar() {
    let (app, _) = common::create_test_app();

    // Everything else valid: only the avatar reference is missing.
    let response = app
        .oneshot(common::json_post(
            "/auth/register",
            json!({
                "fullname": "Ann Lee",
                "email": "ann@x.com",
                "username": "annl",
                "password": "secret1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::read_json(response).await;
    assert_eq!(body["message"], "Avatar file is required");
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::json_post(
            "/auth/register",
            json!({
                "fullname": "Ann Lee",
                "email": "not-an-email",
                "username": "annl",
                "password": "secret1",
                "avatar": "f1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::read_json(response).await;
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e.as_str().unwrap().contains("email")));
}

#[tokio::test]
async fn test_login_requires_email_or_username() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::json_post(
            "/auth/login",
            json!({"password": "secret1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::read_json(response).await;
    assert_eq!(body["message"], "email or username is required");
}

#[tokio::test]
async fn test_refresh_without_token_is_unauthorized() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::json_post("/auth/refresh", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_garbage_token_is_unauthorized() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(common::json_post(
            "/auth/refresh",
            json!({"refreshToken": "not.a.jwt"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::read_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_access_token_is_not_a_valid_refresh_token() {
    // Independently signed kinds: an access token must never pass refresh
    // verification even though it is a well-formed JWT.
    let (app, state) = common::create_test_app();

    let access = state
        .tokens
        .sign("annl", vidshare::services::TokenKind::Access)
        .unwrap();

    let response = app
        .oneshot(common::json_post(
            "/auth/refresh",
            json!({"refreshToken": access}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_bad_bearer() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/history")
                .header(header::AUTHORIZATION, "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::read_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
