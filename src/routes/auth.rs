// SPDX-License-Identifier: MIT

//! Session routes: register, login, logout, refresh, change password.
//!
//! Tokens travel two ways at once: as HttpOnly/Secure cookies (the session
//! artifacts) and in the JSON body for non-browser clients.

use axum::{extract::State, routing::post, Extension, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::middleware::auth::{AuthUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::models::UserView;
use crate::response::ApiResponse;
use crate::services::session::Registration;
use crate::services::tokens::TokenPair;
use crate::AppState;

/// Public session routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Session routes that require an authenticated caller.
/// The auth middleware is applied in routes/mod.rs.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/change-password", post(change_password))
}

// ─── Cookies ─────────────────────────────────────────────────

fn session_cookie(name: &'static str, value: String, max_age_secs: u64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs as i64))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

fn with_session_cookies(jar: CookieJar, state: &AppState, pair: &TokenPair) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        pair.access_token.clone(),
        state.tokens.access_ttl_secs(),
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        pair.refresh_token.clone(),
        state.tokens.refresh_ttl_secs(),
    ))
}

// ─── Register ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "fullname is required"))]
    pub fullname: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    /// Local staging reference of the uploaded avatar file
    #[serde(default)]
    pub avatar: String,
    /// Local staging reference of the uploaded cover image file
    #[serde(default)]
    pub cover_image: Option<String>,
}

async fn register(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<RegisterRequest>,
) -> Result<ApiResponse<UserView>> {
    body.validate()?;

    let user = state
        .sessions
        .register(Registration {
            fullname: body.fullname,
            email: body.email,
            username: body.username,
            password: body.password,
            avatar_file: body.avatar,
            cover_image_file: body.cover_image,
        })
        .await?;

    Ok(ApiResponse::created(user, "User registered successfully"))
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserView,
    pub access_token: String,
    pub refresh_token: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Json(body): axum::Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>)> {
    let (user, pair) = state
        .sessions
        .login(body.email.as_deref(), body.username.as_deref(), &body.password)
        .await?;

    let jar = with_session_cookies(jar, &state, &pair);

    Ok((
        jar,
        ApiResponse::ok(
            LoginResponse {
                user,
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

// ─── Logout ──────────────────────────────────────────────────

async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<serde_json::Value>)> {
    state.sessions.logout(&user.username).await?;

    let jar = jar
        .remove(removal_cookie(ACCESS_TOKEN_COOKIE))
        .remove(removal_cookie(REFRESH_TOKEN_COOKIE));

    Ok((
        jar,
        ApiResponse::ok(serde_json::json!({}), "User logged out successfully"),
    ))
}

// ─── Refresh ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Option<axum::Json<RefreshRequest>>,
) -> Result<(CookieJar, ApiResponse<RefreshResponse>)> {
    // Cookie first, JSON body as fallback for non-browser clients.
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|b| b.0.refresh_token));

    let (_, pair) = state.sessions.refresh(presented.as_deref()).await?;

    let jar = with_session_cookies(jar, &state, &pair);

    Ok((
        jar,
        ApiResponse::ok(
            RefreshResponse {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "Access token refreshed successfully",
        ),
    ))
}

// ─── Change Password ─────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    axum::Json(body): axum::Json<ChangePasswordRequest>,
) -> Result<ApiResponse<serde_json::Value>> {
    state
        .sessions
        .change_password(&user.username, &body.old_password, &body.new_password)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "tok".to_string(), 900);
        let rendered = cookie.to_string();
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=900"));
    }
}
