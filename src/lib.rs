// SPDX-License-Identifier: MIT

//! Vidshare: user-account backend for a media-sharing platform
//!
//! This crate provides registration, credential login, refresh-token
//! rotation, profile mutations and read-side channel/watch-history queries
//! over Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{ChannelService, ProfileService, SessionService, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub tokens: TokenService,
    pub sessions: SessionService,
    pub profiles: ProfileService,
    pub channels: ChannelService,
}
