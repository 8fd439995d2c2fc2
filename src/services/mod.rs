// SPDX-License-Identifier: MIT

//! Business logic services.

pub mod channel;
pub mod credentials;
pub mod media_host;
pub mod profile;
pub mod session;
pub mod tokens;

pub use channel::ChannelService;
pub use media_host::MediaHost;
pub use profile::ProfileService;
pub use session::SessionService;
pub use tokens::{TokenKind, TokenPair, TokenService};
