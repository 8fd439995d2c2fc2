// SPDX-License-Identifier: MIT

//! Media host collaborator.
//!
//! The platform stores avatars, covers and thumbnails on an external media
//! host. This service pushes a locally staged file to the host and returns
//! the public URL. Any failure is reported as "no usable result" rather than
//! a typed error, matching the collaborator's contract.

use serde::Deserialize;

/// A successfully uploaded media asset.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    /// Public URL of the asset on the media host
    pub url: String,
}

/// Client for the external media host.
#[derive(Clone)]
pub struct MediaHost {
    base_url: String,

    /// HTTP client; `None` means mock mode
    client: Option<reqwest::Client>,
}

impl MediaHost {
    /// Create a new media host client.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Some(reqwest::Client::new()),
        }
    }

    /// Create a mock media host for testing (offline mode).
    /// Only available in debug/test builds.
    #[cfg(debug_assertions)]
    pub fn new_mock() -> Self {
        Self {
            base_url: "https://media.mock".to_string(),
            client: None,
        }
    }

    /// Upload a locally staged file to the media host.
    ///
    /// Returns `None` when the file cannot be read, the host rejects the
    /// upload, or the response carries no URL. Callers map `None` to an
    /// internal failure.
    pub async fn upload(&self, local_path: &str) -> Option<UploadedMedia> {
        // Mock mode (Debug builds only)
        #[cfg(debug_assertions)]
        {
            if self.client.is_none() {
                return Some(UploadedMedia {
                    url: format!("{}/{}", self.base_url, local_path),
                });
            }
        }

        let client = self.client.as_ref()?;

        let bytes = match tokio::fs::read(local_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = local_path, error = %e, "Failed to read staged media file");
                return None;
            }
        };

        let response = match client
            .post(format!("{}/upload", self.base_url))
            .body(bytes)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Media host upload request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Media host rejected upload");
            return None;
        }

        match response.json::<UploadedMedia>().await {
            Ok(media) if !media.url.trim().is_empty() => Some(media),
            Ok(_) => {
                tracing::warn!("Media host returned an empty URL");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Media host returned an unreadable response");
                None
            }
        }
    }
}
