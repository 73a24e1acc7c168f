//! The session document.  Absent means nobody is logged in.

use gamemaster_shared::constants::SESSION_KEY;

use crate::database::Database;
use crate::error::Result;
use crate::models::SessionRecord;

impl Database {
    pub fn load_session(&self) -> Result<Option<SessionRecord>> {
        self.read_document(SESSION_KEY)
    }

    pub fn save_session(&self, session: &SessionRecord) -> Result<()> {
        self.write_document(SESSION_KEY, session)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.remove_item(SESSION_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gamemaster_shared::types::UserId;

    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_session().unwrap().is_none());

        let session = SessionRecord::start(UserId::from("user_1"));
        db.save_session(&session).unwrap();
        assert_eq!(db.load_session().unwrap(), Some(session));

        db.clear_session().unwrap();
        assert!(db.load_session().unwrap().is_none());
    }

    #[test]
    fn test_empty_object_session_is_logged_out() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(SESSION_KEY, "{}").unwrap();
        assert!(db.load_session().unwrap().is_none());
    }
}
