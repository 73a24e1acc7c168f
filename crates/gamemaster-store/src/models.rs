//! Domain model structs persisted as JSON documents in the storage partition.
//!
//! Field names are camelCase on disk.  Missing fields fall back to their
//! defaults so older or hand-edited documents still load.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gamemaster_shared::catalog::GameEntry;
use gamemaster_shared::types::{AccountKind, SessionId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub games_played: u64,
    /// Seconds.
    pub total_play_time: u64,
    /// Titles.
    pub favorite_games: Vec<String>,
}

/// A locally known account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Display name, original case.
    pub username: String,
    /// Lowercased username used for lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Password digest.  Federated accounts have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub account_type: AccountKind,
    #[serde(default)]
    pub linked_federated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub federated_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub join_date: DateTime<Utc>,
    #[serde(default)]
    pub stats: UserStats,
}

impl UserRecord {
    /// Lookup key, falling back to the lowercased display name for records
    /// written without one.
    pub fn lookup_key(&self) -> String {
        self.username_key
            .clone()
            .unwrap_or_else(|| self.username.to_lowercase())
    }

    pub fn email_key(&self) -> Option<String> {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(str::to_lowercase)
    }
}

pub type UserMap = BTreeMap<UserId, UserRecord>;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: UserId,
    pub login_time: DateTime<Utc>,
    pub session_id: SessionId,
}

impl SessionRecord {
    pub fn start(user_id: UserId) -> Self {
        Self {
            user_id,
            login_time: Utc::now(),
            session_id: SessionId::generate(),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// What a running game reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressSnapshot {
    pub score: i64,
    pub level: u32,
    /// Seconds, cumulative across sessions.
    pub play_time: u64,
    pub custom_data: Map<String, Value>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            play_time: 0,
            custom_data: Map::new(),
        }
    }
}

/// A snapshot as stored, stamped with when it was saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameProgress {
    #[serde(flatten)]
    pub snapshot: ProgressSnapshot,
    pub last_played: DateTime<Utc>,
}

impl GameProgress {
    pub fn new(snapshot: ProgressSnapshot, last_played: DateTime<Utc>) -> Self {
        Self {
            snapshot,
            last_played,
        }
    }
}

/// game name -> progress
pub type UserProgress = BTreeMap<String, GameProgress>;

/// user id -> per-game progress
pub type ProgressMap = BTreeMap<UserId, UserProgress>;

// ---------------------------------------------------------------------------
// Favorites / recently played
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteGame {
    pub title: String,
    pub url: String,
    pub image: String,
    #[serde(default)]
    pub category: String,
}

impl From<&GameEntry> for FavoriteGame {
    fn from(game: &GameEntry) -> Self {
        Self {
            title: game.title.clone(),
            url: game.url.clone(),
            image: game.image.clone(),
            category: game.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentGame {
    pub title: String,
    pub url: String,
    pub image: String,
}

impl From<&GameEntry> for RecentGame {
    fn from(game: &GameEntry) -> Self {
        Self {
            title: game.title.clone(),
            url: game.url.clone(),
            image: game.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_tolerates_missing_fields() {
        let json = r#"{
            "username": "Alice",
            "accountType": "local",
            "joinDate": "2024-01-31T12:00:00Z"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.lookup_key(), "alice");
        assert_eq!(user.email_key(), None);
        assert_eq!(user.stats, UserStats::default());
        assert!(!user.linked_federated);
    }

    #[test]
    fn test_empty_email_has_no_key() {
        let json = r#"{
            "username": "Bob",
            "email": "",
            "accountType": "local",
            "joinDate": "2024-01-31T12:00:00Z"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.email_key(), None);
    }

    #[test]
    fn test_game_progress_is_flat_on_disk() {
        let mut snapshot = ProgressSnapshot {
            score: 1200,
            level: 4,
            play_time: 90,
            ..Default::default()
        };
        snapshot
            .custom_data
            .insert("coins".into(), serde_json::json!(7));

        let progress = GameProgress::new(snapshot, Utc::now());
        let value = serde_json::to_value(&progress).unwrap();

        assert_eq!(value["score"], 1200);
        assert_eq!(value["level"], 4);
        assert_eq!(value["playTime"], 90);
        assert_eq!(value["customData"]["coins"], 7);
        assert!(value["lastPlayed"].is_string());
    }

    #[test]
    fn test_snapshot_defaults_to_level_one() {
        let snapshot: ProgressSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.score, 0);
    }

    #[test]
    fn test_session_requires_user() {
        assert!(serde_json::from_str::<SessionRecord>("{}").is_err());
    }
}
