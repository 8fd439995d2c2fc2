// SPDX-License-Identifier: MIT

//! Access/refresh token issuing and verification.
//!
//! Each token kind is signed with its own secret and expiry, so a leaked
//! access secret cannot mint refresh tokens. The refresh token is also
//! persisted on the user document; the stored value is the source of truth
//! for validity, which gives revocation-by-rotation without a revocation
//! list.

use crate::config::Config;
use crate::db::FirestoreDb;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Which class of token to sign or verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs, verifies and persists session tokens.
#[derive(Clone)]
pub struct TokenService {
    db: FirestoreDb,
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl TokenService {
    pub fn new(config: &Config, db: FirestoreDb) -> Self {
        Self {
            db,
            access_secret: config.access_token_secret.clone(),
            refresh_secret: config.refresh_token_secret.clone(),
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> u64 {
        self.refresh_ttl_secs
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    fn ttl_secs(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        }
    }

    /// Sign a token of the given kind for a user.
    pub fn sign(&self, username: &str, kind: TokenKind) -> anyhow::Result<String> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs(kind) as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )?)
    }

    /// Verify a token's signature and expiry against the given kind's secret.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, AppError> {
        let key = DecodingKey::from_secret(self.secret(kind));
        let validation = Validation::new(Algorithm::HS256);

        let token_data =
            decode::<Claims>(token, &key, &validation).map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Issue a new token pair and persist the refresh token, overwriting any
    /// prior value. Any prior refresh token is invalidated by the overwrite.
    ///
    /// Every failure surfaces uniformly as an internal error: the caller must
    /// never hold tokens the store disagrees with.
    pub async fn issue(&self, username: &str) -> Result<TokenPair, AppError> {
        let pair = self.sign_pair(username)?;

        let mut user = self
            .db
            .get_user(username)
            .await
            .map_err(Self::generation_failure)?
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("Token issue for unknown user {username}"))
            })?;

        user.refresh_token = Some(pair.refresh_token.clone());
        user.updated_at = chrono::Utc::now().to_rfc3339();
        self.db
            .upsert_user(&user)
            .await
            .map_err(Self::generation_failure)?;

        Ok(pair)
    }

    /// Issue a new token pair, persisting the refresh token only if the
    /// stored value still equals `presented` (compare-and-swap rotation).
    ///
    /// Fails `Unauthorized` when the presented token has already been
    /// rotated away, which is what makes a replayed stale token detectable.
    pub async fn issue_rotating(
        &self,
        username: &str,
        presented: &str,
    ) -> Result<TokenPair, AppError> {
        let pair = self.sign_pair(username)?;

        let rotated = self
            .db
            .rotate_refresh_token(username, presented, &pair.refresh_token)
            .await
            .map_err(Self::generation_failure)?;

        if !rotated {
            return Err(AppError::Unauthorized(
                "Refresh token is expired or used".to_string(),
            ));
        }

        Ok(pair)
    }

    fn sign_pair(&self, username: &str) -> Result<TokenPair, AppError> {
        let access_token = self
            .sign(username, TokenKind::Access)
            .map_err(AppError::Internal)?;
        let refresh_token = self
            .sign(username, TokenKind::Refresh)
            .map_err(AppError::Internal)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Collapse store-side failures during issuing into one opaque kind so
    /// callers cannot tell a signing failure from a persistence failure.
    fn generation_failure(err: AppError) -> AppError {
        tracing::error!(error = %err, "Token generation failed");
        AppError::Internal(anyhow::anyhow!(
            "Something went wrong while generating refresh and access tokens"
        ))
    }
}
