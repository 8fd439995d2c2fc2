// SPDX-License-Identifier: MIT

//! Video metadata, read here only to resolve watch history.

use serde::{Deserialize, Serialize};

/// Video document stored in Firestore (written by the upload pipeline,
/// which is out of scope for this service).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    /// Video ID (also the document ID)
    pub video_id: String,
    /// Username of the uploading user
    pub owner: String,
    pub title: String,
    /// Thumbnail URL on the media host
    pub thumbnail: String,
    pub duration_secs: u32,
    /// When the video was published (ISO 8601)
    pub created_at: String,
}

/// Minimal owner projection denormalized onto watch-history items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoOwner {
    pub fullname: String,
    pub username: String,
    pub avatar: String,
}

/// A watch-history entry: the video plus its owner, flattened for the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchHistoryItem {
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub duration_secs: u32,
    pub created_at: String,
    /// Single owner object; omitted when the owner record no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<VideoOwner>,
}

impl WatchHistoryItem {
    pub fn new(video: Video, owner: Option<VideoOwner>) -> Self {
        Self {
            video_id: video.video_id,
            title: video.title,
            thumbnail: video.thumbnail,
            duration_secs: video.duration_secs,
            created_at: video.created_at,
            owner,
        }
    }
}
