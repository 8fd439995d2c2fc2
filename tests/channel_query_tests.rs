// SPDX-License-Identifier: MIT

//! Social graph query tests: channel aggregates and watch history.
//!
//! These tests require the Firestore emulator (FIRESTORE_EMULATOR_HOST);
//! they are skipped otherwise. Subscription edges and videos are seeded
//! directly since their mutation endpoints live outside this service.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use vidshare::models::{Subscription, Video};

mod common;

fn edge(subscriber: &str, channel: &str) -> Subscription {
    Subscription {
        subscriber: subscriber.to_string(),
        channel: channel.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn video(id: &str, owner: &str, title: &str) -> Video {
    Video {
        video_id: id.to_string(),
        owner: owner.to_string(),
        title: title.to_string(),
        thumbnail: format!("https://media.mock/thumbs/{id}.jpg"),
        duration_secs: 120,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

async fn register_and_login(app: &axum::Router, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(common::json_post(
            "/auth/register",
            json!({
                "fullname": "Ann Lee",
                "email": format!("{name}@x.com"),
                "username": name,
                "password": "secret1",
                "avatar": "staging/f1.png"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let login = app
        .clone()
        .oneshot(common::json_post(
            "/auth/login",
            json!({"username": name, "password": "secret1"}),
        ))
        .await
        .unwrap();
    let body = common::read_json(login).await;
    body["data"]["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_channel_profile_counts_edges() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;

    let channel = common::unique_username("chan");
    let caller = common::unique_username("caller");
    let access = register_and_login(&app, &caller).await;
    register_and_login(&app, &channel).await;

    // Three subscribers, one of them the caller; the channel itself
    // subscribes to one other channel.
    state.db.upsert_subscription(&edge(&caller, &channel)).await.unwrap();
    state.db.upsert_subscription(&edge("someone-else", &channel)).await.unwrap();
    state.db.upsert_subscription(&edge("third-user", &channel)).await.unwrap();
    state.db.upsert_subscription(&edge(&channel, "other-channel")).await.unwrap();

    let response = app
        .clone()
        .oneshot(common::get_authed(&format!("/api/channels/{channel}"), &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    assert_eq!(body["data"]["subscribers_count"], 3);
    assert_eq!(body["data"]["channels_subscribed_to_count"], 1);
    assert_eq!(body["data"]["is_subscribed"], true);
    assert_eq!(body["data"]["username"], channel);
    // Public projection only.
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("refresh_token").is_none());
}

#[tokio::test]
async fn test_channel_profile_not_subscribed() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;

    let channel = common::unique_username("chanb");
    let caller = common::unique_username("callerb");
    let access = register_and_login(&app, &caller).await;
    register_and_login(&app, &channel).await;

    state.db.upsert_subscription(&edge("someone-else", &channel)).await.unwrap();

    let response = app
        .clone()
        .oneshot(common::get_authed(&format!("/api/channels/{channel}"), &access))
        .await
        .unwrap();

    let body = common::read_json(response).await;
    assert_eq!(body["data"]["subscribers_count"], 1);
    assert_eq!(body["data"]["is_subscribed"], false);
}

#[tokio::test]
async fn test_channel_profile_unknown_username_is_404() {
    require_emulator!();
    let (app, _) = common::create_emulator_app().await;

    let caller = common::unique_username("callerc");
    let access = register_and_login(&app, &caller).await;

    let response = app
        .clone()
        .oneshot(common::get_authed("/api/channels/no-such-channel", &access))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = common::read_json(response).await;
    assert_eq!(body["message"], "Channel not found");
}

#[tokio::test]
async fn test_watch_history_preserves_order_and_duplicates() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;

    let viewer = common::unique_username("viewer");
    let owner = common::unique_username("owner");
    let access = register_and_login(&app, &viewer).await;
    register_and_login(&app, &owner).await;

    let v1 = format!("{viewer}-v1");
    let v2 = format!("{viewer}-v2");
    state.db.upsert_video(&video(&v1, &owner, "First")).await.unwrap();
    state.db.upsert_video(&video(&v2, &owner, "Second")).await.unwrap();

    // Watched v2, then v1, then v2 again.
    let mut user = state.db.get_user(&viewer).await.unwrap().unwrap();
    user.watch_history = vec![v2.clone(), v1.clone(), v2.clone()];
    state.db.upsert_user(&user).await.unwrap();

    let response = app
        .clone()
        .oneshot(common::get_authed("/api/history", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["video_id"], v2);
    assert_eq!(items[1]["video_id"], v1);
    assert_eq!(items[2]["video_id"], v2);

    // Owner is a single object, not a list.
    assert!(items[0]["owner"].is_object());
    assert_eq!(items[0]["owner"]["username"], owner);
    assert_eq!(items[0]["owner"]["fullname"], "Ann Lee");
}

#[tokio::test]
async fn test_watch_history_omits_missing_owner() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;

    let viewer = common::unique_username("viewerb");
    let access = register_and_login(&app, &viewer).await;

    // Video whose owner account no longer exists.
    let v1 = format!("{viewer}-orphan");
    state.db.upsert_video(&video(&v1, "deleted-user", "Orphan")).await.unwrap();

    let mut user = state.db.get_user(&viewer).await.unwrap().unwrap();
    user.watch_history = vec![v1.clone()];
    state.db.upsert_user(&user).await.unwrap();

    let response = app
        .clone()
        .oneshot(common::get_authed("/api/history", &access))
        .await
        .unwrap();

    let body = common::read_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["video_id"], v1);
    // Owner omitted entirely rather than null or an empty list.
    assert!(items[0].get("owner").is_none());
}

#[tokio::test]
async fn test_watch_history_empty_for_new_user() {
    require_emulator!();
    let (app, _) = common::create_emulator_app().await;

    let viewer = common::unique_username("viewerc");
    let access = register_and_login(&app, &viewer).await;

    let response = app
        .clone()
        .oneshot(common::get_authed("/api/history", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
