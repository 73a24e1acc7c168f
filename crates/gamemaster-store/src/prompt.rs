//! When the "sign in to save" prompt was last dismissed.

use chrono::{DateTime, TimeZone, Utc};
use gamemaster_shared::constants::LOGIN_PROMPT_KEY;

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Stored as unix milliseconds.  Garbage reads as "never".
    pub fn last_prompt_dismissal(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.get_item(LOGIN_PROMPT_KEY)? else {
            return Ok(None);
        };
        Ok(raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }

    pub fn record_prompt_dismissal(&self, at: DateTime<Utc>) -> Result<()> {
        self.set_item(LOGIN_PROMPT_KEY, &at.timestamp_millis().to_string())
    }
}
