// SPDX-License-Identifier: MIT

//! API routes for authenticated users: profile mutations and channel reads.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ChannelProfile, UserView, WatchHistoryItem};
use crate::response::ApiResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// API routes (require authentication via access token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/profile", patch(update_profile))
        .route("/api/avatar", patch(update_avatar))
        .route("/api/cover-image", patch(update_cover_image))
        .route("/api/channels/{username}", get(get_channel_profile))
        .route("/api/history", get(get_watch_history))
}

// ─── Current User ────────────────────────────────────────────

/// Get the calling user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<UserView>> {
    let view = state.sessions.current_user(&user.username).await?;
    Ok(ApiResponse::ok(view, "User fetched successfully"))
}

// ─── Profile Mutations ───────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update of identity fields (fullname and/or email).
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<UserView>> {
    let view = state
        .profiles
        .update_profile(&user.username, body.fullname.as_deref(), body.email.as_deref())
        .await?;
    Ok(ApiResponse::ok(view, "Account details updated successfully"))
}

#[derive(Deserialize)]
pub struct MediaUpdateRequest {
    /// Local staging reference of the uploaded file
    #[serde(default)]
    pub file: String,
}

async fn update_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<MediaUpdateRequest>,
) -> Result<ApiResponse<UserView>> {
    let view = state.profiles.update_avatar(&user.username, &body.file).await?;
    Ok(ApiResponse::ok(view, "Avatar updated successfully"))
}

async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<MediaUpdateRequest>,
) -> Result<ApiResponse<UserView>> {
    let view = state
        .profiles
        .update_cover_image(&user.username, &body.file)
        .await?;
    Ok(ApiResponse::ok(view, "Cover image updated successfully"))
}

// ─── Channel Queries ─────────────────────────────────────────

/// Get a channel's profile with subscriber aggregates.
async fn get_channel_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<ApiResponse<ChannelProfile>> {
    let profile = state
        .channels
        .channel_profile(&username, Some(&user.username))
        .await?;
    Ok(ApiResponse::ok(profile, "Channel profile fetched successfully"))
}

/// Get the calling user's watch history, in viewing order.
async fn get_watch_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<Vec<WatchHistoryItem>>> {
    let history = state.channels.watch_history(&user.username).await?;
    Ok(ApiResponse::ok(history, "Watch history fetched successfully"))
}
