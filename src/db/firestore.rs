// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (account documents, refresh-token rotation)
//! - Subscriptions (subscriber -> channel edges, read-side only)
//! - Videos (watch-history resolution)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Subscription, User, Video};
use futures_util::{stream, StreamExt};
use subtle::ConstantTimeEq;

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their (lowercase) username, which is the document ID.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(username)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email address.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let matches: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.into_iter().next())
    }

    /// Create a user document, failing if the username is already taken.
    ///
    /// Uses Firestore's create semantics (insert-if-absent), so a racing
    /// duplicate registration loses at the storage layer rather than
    /// overwriting the earlier account.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let result = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.username)
            .object(user)
            .execute::<User>()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => Err(
                AppError::Conflict("User with email or username already exists".to_string()),
            ),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Replace a user document.
    ///
    /// Firestore replaces the full document here, so fields that serialize
    /// as absent (e.g. an unset `refresh_token`) are removed from storage.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.username)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomically rotate a user's stored refresh token.
    ///
    /// Runs a transaction that re-reads the user and writes `new_token` only
    /// if the stored token still equals `expected` (compare-and-swap). Two
    /// concurrent refresh calls presenting the same token cannot both win.
    ///
    /// Returns `false` if the stored token no longer matches.
    pub async fn rotate_refresh_token(
        &self,
        username: &str,
        expected: &str,
        new_token: &str,
    ) -> Result<bool, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // The read must carry the transaction id: only documents in the
        // transaction's read set are conflict-checked at commit, so a plain
        // read here would let two concurrent rotations both commit.
        let tx_client = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let user: Option<User> = tx_client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(username)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read user in transaction: {}", e)))?;

        let Some(mut user) = user else {
            let _ = transaction.rollback().await;
            return Ok(false);
        };

        let stored = user.refresh_token.as_deref().unwrap_or("");
        if stored.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        user.refresh_token = Some(new_token.to_string());
        user.updated_at = chrono::Utc::now().to_rfc3339();

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(username)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(true)
    }

    /// Batch-fetch users by username, preserving input order; missing
    /// usernames are skipped.
    pub async fn get_users_by_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<User>, AppError> {
        let client = self.get_client()?;

        let results: Vec<Result<Option<User>, AppError>> = stream::iter(usernames.to_vec())
            .map(|username| async move {
                client
                    .fluent()
                    .select()
                    .by_id_in(collections::USERS)
                    .obj()
                    .one(&username)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect()
            .await;

        let mut users = Vec::with_capacity(usernames.len());
        for result in results {
            if let Some(user) = result? {
                users.push(user);
            }
        }
        Ok(users)
    }

    // ─── Subscription Operations ─────────────────────────────────

    /// Count subscription edges pointing at a channel.
    pub async fn count_subscribers(&self, channel: &str) -> Result<usize, AppError> {
        let channel = channel.to_string();
        let edges: Vec<Subscription> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SUBSCRIPTIONS)
            .filter(move |q| q.for_all([q.field("channel").eq(channel.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(edges.len())
    }

    /// Count channels a user subscribes to.
    pub async fn count_subscribed_to(&self, subscriber: &str) -> Result<usize, AppError> {
        let subscriber = subscriber.to_string();
        let edges: Vec<Subscription> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SUBSCRIPTIONS)
            .filter(move |q| q.for_all([q.field("subscriber").eq(subscriber.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(edges.len())
    }

    /// Check whether a subscriber -> channel edge exists.
    ///
    /// Edges are keyed `{subscriber}_{channel}`, so this is a single get.
    pub async fn subscription_exists(
        &self,
        subscriber: &str,
        channel: &str,
    ) -> Result<bool, AppError> {
        let edge: Option<Subscription> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SUBSCRIPTIONS)
            .obj()
            .one(&Subscription::doc_id(subscriber, channel))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(edge.is_some())
    }

    /// Store a subscription edge (used by the edge-mutation endpoints and by
    /// integration tests to seed graph fixtures).
    pub async fn upsert_subscription(&self, edge: &Subscription) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SUBSCRIPTIONS)
            .document_id(Subscription::doc_id(&edge.subscriber, &edge.channel))
            .object(edge)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Video Operations ────────────────────────────────────────

    /// Batch-fetch videos by ID with bounded concurrency.
    ///
    /// Output order matches input order, duplicates included; IDs that no
    /// longer resolve to a video are dropped.
    pub async fn get_videos_ordered(&self, video_ids: &[String]) -> Result<Vec<Video>, AppError> {
        let client = self.get_client()?;

        let results: Vec<Result<Option<Video>, AppError>> = stream::iter(video_ids.to_vec())
            .map(|video_id| async move {
                client
                    .fluent()
                    .select()
                    .by_id_in(collections::VIDEOS)
                    .obj()
                    .one(&video_id)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect()
            .await;

        let mut videos = Vec::with_capacity(video_ids.len());
        for result in results {
            if let Some(video) = result? {
                videos.push(video);
            }
        }
        Ok(videos)
    }

    /// Store a video document (upload pipeline and test fixtures).
    pub async fn upsert_video(&self, video: &Video) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::VIDEOS)
            .document_id(&video.video_id)
            .object(video)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
