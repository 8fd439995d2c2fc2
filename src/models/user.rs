// SPDX-License-Identifier: MIT

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User account stored in Firestore.
///
/// The lowercase-normalized username doubles as the document ID, which makes
/// usernames case-insensitively unique at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique username, lowercase (also the document ID)
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Display name
    pub fullname: String,
    /// bcrypt digest of the password
    pub password_hash: String,
    /// Avatar URL on the media host (required)
    pub avatar: String,
    /// Cover image URL (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Watched video IDs, in viewing order, duplicates allowed
    #[serde(default)]
    pub watch_history: Vec<String>,
    /// Currently valid refresh token. Absent field means no valid session;
    /// at most one value is valid at a time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the account was created (ISO 8601)
    pub created_at: String,
    /// Last modification timestamp (ISO 8601)
    pub updated_at: String,
}

/// Public projection of a user, with credentials stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub created_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            fullname: user.fullname,
            avatar: user.avatar,
            cover_image: user.cover_image,
            created_at: user.created_at,
        }
    }
}

/// Channel profile with social-graph aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Number of subscription edges pointing at this channel
    pub subscribers_count: usize,
    /// Number of channels this user subscribes to
    pub channels_subscribed_to_count: usize,
    /// Whether the calling user subscribes to this channel
    pub is_subscribed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            username: "annl".to_string(),
            email: "ann@x.com".to_string(),
            fullname: "Ann Lee".to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
            avatar: "https://media.example/f1".to_string(),
            cover_image: None,
            watch_history: vec![],
            refresh_token: Some("tok".to_string()),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_view_strips_credentials() {
        let view = UserView::from(sample_user());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["username"], "annl");
    }

    #[test]
    fn test_unset_refresh_token_omitted_from_document() {
        let mut user = sample_user();
        user.refresh_token = None;
        let json = serde_json::to_value(&user).unwrap();
        // The field must disappear from the stored document, not become null.
        assert!(json.get("refresh_token").is_none());
    }
}
