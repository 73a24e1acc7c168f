//! # gamemaster-client
//!
//! The portal runtime: local accounts and sessions, per-user progress,
//! the event bus front ends listen on, and the tracker embedded games use.

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod state;
pub mod tracker;

pub use auth::{AuthSystem, ProfileSummary, PublicUser};
pub use config::{PortalConfig, TrackerConfig};
pub use error::{AuthError, Result};
pub use events::{EventBus, NotificationKind, PortalEvent};
pub use state::SharedAuth;
pub use tracker::GameProgressTracker;
