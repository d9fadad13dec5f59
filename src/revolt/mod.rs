//! Revolt transport module.
//!
//! REST calls, the WebSocket gateway, and the [`Platform`] trait that the
//! rest of the bot talks to.

mod client;
mod events;
mod gateway;
mod models;
mod platform;
mod rate_limiter;

pub use client::{RestClient, RevoltError, new_nonce};
pub use events::{ClientEvent, ServerEvent};
pub use gateway::{Gateway, GatewayConfig};
pub use models::{
    FileRef, MessageEvent, OutgoingMessage, Presence, SendableEmbed, User, UserPatch, UserProfile,
    UserStatus,
};
pub use platform::{Platform, RevoltPlatform};
pub use rate_limiter::RateLimiter;
