// SPDX-License-Identifier: MIT

//! Session flows: register, login, logout, refresh, change password.
//!
//! A client moves Anonymous -> Authenticated -> Anonymous. Login and refresh
//! hand out a token pair; refresh only succeeds while the presented refresh
//! token matches the one stored on the user document.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{User, UserView};
use crate::services::credentials;
use crate::services::media_host::MediaHost;
use crate::services::tokens::{TokenKind, TokenPair, TokenService};
use subtle::ConstantTimeEq;

/// Registration input, already parsed from the request body. Media fields
/// are local staging references, not URLs.
#[derive(Debug, Clone)]
pub struct Registration {
    pub fullname: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar_file: String,
    pub cover_image_file: Option<String>,
}

/// Orchestrates the credential and token services for session operations.
#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
    tokens: TokenService,
    media: MediaHost,
    bcrypt_cost: u32,
}

impl SessionService {
    const LOGIN_FAILED: &'static str = "Invalid email/username or password";

    pub fn new(db: FirestoreDb, tokens: TokenService, media: MediaHost, bcrypt_cost: u32) -> Self {
        Self {
            db,
            tokens,
            media,
            bcrypt_cost,
        }
    }

    /// Create a new account.
    ///
    /// Usernames are stored lowercased and are case-insensitively unique;
    /// the returned view never contains the password hash or refresh token.
    pub async fn register(&self, input: Registration) -> Result<UserView> {
        let fullname = input.fullname.trim();
        let email = input.email.trim();
        let username = input.username.trim().to_lowercase();
        let password = input.password.trim();

        if [fullname, email, username.as_str(), password]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        let avatar_file = input.avatar_file.trim();
        if avatar_file.is_empty() {
            return Err(AppError::Validation("Avatar file is required".to_string()));
        }

        if self.db.get_user(&username).await?.is_some()
            || self.db.find_user_by_email(email).await?.is_some()
        {
            return Err(AppError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        let avatar = self.media.upload(avatar_file).await.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to upload avatar file"))
        })?;

        // Cover image stays optional: a failed upload degrades to no cover.
        let cover_image = match &input.cover_image_file {
            Some(path) if !path.trim().is_empty() => {
                self.media.upload(path.trim()).await.map(|m| m.url)
            }
            _ => None,
        };

        let now = chrono::Utc::now().to_rfc3339();
        let user = User {
            username: username.clone(),
            email: email.to_string(),
            fullname: fullname.to_string(),
            password_hash: credentials::hash_password(password, self.bcrypt_cost)?,
            avatar: avatar.url,
            cover_image,
            watch_history: vec![],
            refresh_token: None,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.create_user(&user).await?;

        // Confirm the write by reading the record back before returning it.
        let created = self.db.get_user(&username).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Something went wrong while registering the user"
            ))
        })?;

        tracing::info!(username = %username, "User registered");

        Ok(created.into())
    }

    /// Authenticate by email or username and issue a token pair.
    ///
    /// Unknown identifier and wrong password fail identically so that login
    /// responses cannot be used to enumerate usernames.
    pub async fn login(
        &self,
        email: Option<&str>,
        username: Option<&str>,
        password: &str,
    ) -> Result<(UserView, TokenPair)> {
        let email = email.map(str::trim).filter(|v| !v.is_empty());
        let username = username.map(str::trim).filter(|v| !v.is_empty());

        if email.is_none() && username.is_none() {
            return Err(AppError::Validation(
                "email or username is required".to_string(),
            ));
        }

        let mut user = match username {
            Some(name) => self.db.get_user(&name.to_lowercase()).await?,
            None => None,
        };
        if user.is_none() {
            if let Some(email) = email {
                user = self.db.find_user_by_email(email).await?;
            }
        }

        let Some(user) = user else {
            return Err(AppError::Unauthorized(Self::LOGIN_FAILED.to_string()));
        };

        if !credentials::verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized(Self::LOGIN_FAILED.to_string()));
        }

        let pair = self.tokens.issue(&user.username).await?;

        tracing::info!(username = %user.username, "User logged in");

        Ok((user.into(), pair))
    }

    /// Invalidate the stored refresh token.
    ///
    /// Unsets the field on the user document so the pre-logout refresh token
    /// can never be exchanged again. Idempotent when no session exists.
    pub async fn logout(&self, username: &str) -> Result<()> {
        if let Some(mut user) = self.db.get_user(username).await? {
            user.refresh_token = None;
            user.updated_at = chrono::Utc::now().to_rfc3339();
            self.db.upsert_user(&user).await?;
        }

        tracing::info!(username = %username, "User logged out");
        Ok(())
    }

    /// Exchange a refresh token for a fresh pair, rotating the stored value.
    pub async fn refresh(&self, presented: Option<&str>) -> Result<(String, TokenPair)> {
        let presented = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Unauthorized request".to_string()))?;

        let claims = self.tokens.verify(presented, TokenKind::Refresh)?;

        let user = self
            .db
            .get_user(&claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        // The signature alone is not enough: the token must also be the one
        // currently stored, otherwise it has been rotated away already.
        let stored = user.refresh_token.as_deref().unwrap_or("");
        if stored.as_bytes().ct_eq(presented.as_bytes()).unwrap_u8() != 1 {
            return Err(AppError::Unauthorized(
                "Refresh token is expired or used".to_string(),
            ));
        }

        // issue_rotating re-checks under a transaction, closing the race
        // between two concurrent refresh calls presenting the same token.
        let pair = self.tokens.issue_rotating(&user.username, presented).await?;

        Ok((user.username, pair))
    }

    /// Change the password after verifying the current one.
    pub async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        if new_password.trim().is_empty() {
            return Err(AppError::Validation("New password is required".to_string()));
        }

        let mut user = self
            .db
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;

        if !credentials::verify_password(old_password, &user.password_hash) {
            return Err(AppError::Unauthorized(
                "Old password is incorrect".to_string(),
            ));
        }

        user.password_hash = credentials::hash_password(new_password.trim(), self.bcrypt_cost)?;
        user.updated_at = chrono::Utc::now().to_rfc3339();
        self.db.upsert_user(&user).await?;

        tracing::info!(username = %username, "Password changed");
        Ok(())
    }

    /// Fetch the calling user's own record.
    pub async fn current_user(&self, username: &str) -> Result<UserView> {
        let user = self
            .db
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;
        Ok(user.into())
    }
}
