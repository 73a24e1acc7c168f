//! The users document: user id -> [`UserRecord`].

use gamemaster_shared::constants::USERS_KEY;

use crate::database::Database;
use crate::error::Result;
use crate::models::UserMap;

impl Database {
    pub fn load_users(&self) -> Result<UserMap> {
        self.read_document_or_default(USERS_KEY)
    }

    pub fn save_users(&self, users: &UserMap) -> Result<()> {
        self.write_document(USERS_KEY, users)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use gamemaster_shared::types::{AccountKind, UserId};

    use super::*;
    use crate::models::{UserRecord, UserStats};

    #[test]
    fn test_users_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_users().unwrap().is_empty());

        let mut users = UserMap::new();
        users.insert(
            UserId::from("user_abc"),
            UserRecord {
                username: "Alice".into(),
                username_key: Some("alice".into()),
                email: None,
                password: Some("99162322".into()),
                account_type: AccountKind::Local,
                linked_federated: false,
                federated_subject: None,
                profile_picture: None,
                join_date: Utc::now(),
                stats: UserStats::default(),
            },
        );

        db.save_users(&users).unwrap();
        assert_eq!(db.load_users().unwrap(), users);
    }
}
