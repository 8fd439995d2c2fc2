// SPDX-License-Identifier: MIT

//! Subscription edge: "subscriber watches channel".

use serde::{Deserialize, Serialize};

/// Directed subscriber -> channel edge stored in Firestore.
///
/// Document ID is `{subscriber}_{channel}`, so membership checks are a
/// single document get. Edges are written by the subscription endpoints
/// (out of scope here) and read by the channel queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Username of the subscribing user
    pub subscriber: String,
    /// Username of the channel being subscribed to
    pub channel: String,
    /// When the edge was created (ISO 8601)
    pub created_at: String,
}

impl Subscription {
    /// Document ID for an edge.
    pub fn doc_id(subscriber: &str, channel: &str) -> String {
        format!("{subscriber}_{channel}")
    }
}
