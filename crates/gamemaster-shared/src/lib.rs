//! # gamemaster-shared
//!
//! Types and helpers shared by every Game Master crate: storage key names,
//! id newtypes, the password digest, federated identity token decoding and
//! the game catalog.

pub mod catalog;
pub mod constants;
pub mod error;
pub mod hash;
pub mod identity;
pub mod types;
