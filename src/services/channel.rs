// SPDX-License-Identifier: MIT

//! Read-side social graph queries.
//!
//! Channel profiles aggregate subscription edges; watch history is a
//! two-collection join resolved application-side with the owner projection
//! stitched onto each video.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ChannelProfile, VideoOwner, WatchHistoryItem};
use std::collections::HashMap;

#[derive(Clone)]
pub struct ChannelService {
    db: FirestoreDb,
}

impl ChannelService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Build a channel's public profile with subscriber aggregates.
    ///
    /// `caller` drives `is_subscribed`; `None` (anonymous caller) always
    /// reports false.
    pub async fn channel_profile(
        &self,
        username: &str,
        caller: Option<&str>,
    ) -> Result<ChannelProfile> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(AppError::Validation(
                "Please provide a username".to_string(),
            ));
        }

        let user = self
            .db
            .get_user(&username)
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;

        let subscribers_count = self.db.count_subscribers(&username).await?;
        let channels_subscribed_to_count = self.db.count_subscribed_to(&username).await?;

        let is_subscribed = match caller {
            Some(caller) => self.db.subscription_exists(caller, &username).await?,
            None => false,
        };

        Ok(ChannelProfile {
            username: user.username,
            fullname: user.fullname,
            email: user.email,
            avatar: user.avatar,
            cover_image: user.cover_image,
            subscribers_count,
            channels_subscribed_to_count,
            is_subscribed,
        })
    }

    /// Resolve a user's watch history to denormalized video items.
    ///
    /// Viewing order and duplicates are preserved. Each item carries a single
    /// owner projection (omitted when the owner record is gone); ids whose
    /// video no longer exists are dropped.
    pub async fn watch_history(&self, username: &str) -> Result<Vec<WatchHistoryItem>> {
        let user = self
            .db
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))?;

        let videos = self.db.get_videos_ordered(&user.watch_history).await?;

        // One fetch per distinct owner, then stitch.
        let mut owner_names: Vec<String> = videos.iter().map(|v| v.owner.clone()).collect();
        owner_names.sort();
        owner_names.dedup();

        let owners: HashMap<String, VideoOwner> = self
            .db
            .get_users_by_usernames(&owner_names)
            .await?
            .into_iter()
            .map(|owner| {
                (
                    owner.username.clone(),
                    VideoOwner {
                        fullname: owner.fullname,
                        username: owner.username,
                        avatar: owner.avatar,
                    },
                )
            })
            .collect();

        Ok(videos
            .into_iter()
            .map(|video| {
                let owner = owners.get(&video.owner).cloned();
                WatchHistoryItem::new(video, owner)
            })
            .collect())
    }
}
