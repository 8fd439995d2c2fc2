// SPDX-License-Identifier: MIT

//! Profile mutations: identity fields, avatar and cover image.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::UserView;
use crate::services::media_host::MediaHost;

/// Applies validated partial updates to a user's profile.
#[derive(Clone)]
pub struct ProfileService {
    db: FirestoreDb,
    media: MediaHost,
}

impl ProfileService {
    pub fn new(db: FirestoreDb, media: MediaHost) -> Self {
        Self { db, media }
    }

    /// Update fullname and/or email; at least one must be given.
    pub async fn update_profile(
        &self,
        username: &str,
        fullname: Option<&str>,
        email: Option<&str>,
    ) -> Result<UserView> {
        let fullname = fullname.map(str::trim).filter(|v| !v.is_empty());
        let email = email.map(str::trim).filter(|v| !v.is_empty());

        if fullname.is_none() && email.is_none() {
            return Err(AppError::Validation(
                "Please provide at least one field to update".to_string(),
            ));
        }

        let mut user = self
            .db
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;

        if let Some(fullname) = fullname {
            user.fullname = fullname.to_string();
        }
        if let Some(email) = email {
            user.email = email.to_string();
        }
        user.updated_at = chrono::Utc::now().to_rfc3339();

        self.db.upsert_user(&user).await?;
        Ok(user.into())
    }

    /// Replace the avatar with a newly uploaded file.
    pub async fn update_avatar(&self, username: &str, avatar_file: &str) -> Result<UserView> {
        let avatar_file = avatar_file.trim();
        if avatar_file.is_empty() {
            return Err(AppError::Validation(
                "Please provide an avatar".to_string(),
            ));
        }

        let uploaded = self
            .media
            .upload(avatar_file)
            .await
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Unable to upload avatar")))?;

        self.set_media_field(username, |user| user.avatar = uploaded.url.clone())
            .await
    }

    /// Replace the cover image with a newly uploaded file.
    pub async fn update_cover_image(&self, username: &str, cover_file: &str) -> Result<UserView> {
        let cover_file = cover_file.trim();
        if cover_file.is_empty() {
            return Err(AppError::Validation(
                "Please provide a cover image".to_string(),
            ));
        }

        let uploaded = self
            .media
            .upload(cover_file)
            .await
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Unable to upload cover image")))?;

        self.set_media_field(username, |user| user.cover_image = Some(uploaded.url.clone()))
            .await
    }

    async fn set_media_field<F>(&self, username: &str, apply: F) -> Result<UserView>
    where
        F: FnOnce(&mut crate::models::User),
    {
        let mut user = self
            .db
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;

        apply(&mut user);
        user.updated_at = chrono::Utc::now().to_rfc3339();

        self.db.upsert_user(&user).await?;
        Ok(user.into())
    }
}
