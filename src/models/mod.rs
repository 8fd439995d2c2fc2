// SPDX-License-Identifier: MIT

//! Data models shared between storage and the API layer.

pub mod subscription;
pub mod user;
pub mod video;

pub use subscription::Subscription;
pub use user::{ChannelProfile, User, UserView};
pub use video::{Video, VideoOwner, WatchHistoryItem};
