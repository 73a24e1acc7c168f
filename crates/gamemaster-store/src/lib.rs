//! # gamemaster-store
//!
//! Local storage for The Game Master, backed by SQLite.
//!
//! The database holds a single key/value table standing in for the browser
//! storage partition.  The crate exposes a synchronous `Database` handle that
//! wraps a `rusqlite::Connection` and provides typed helpers for every JSON
//! document the portal keeps: users, session, progress, favorites, recently
//! played and the login prompt timestamp.

pub mod database;
pub mod favorites;
pub mod migrations;
pub mod models;
pub mod progress;
pub mod prompt;
pub mod sessions;
pub mod storage;
pub mod users;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
