//! Raw key/value access plus typed JSON documents on top of it.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;

impl Database {
    // ------------------------------------------------------------------
    // Raw items
    // ------------------------------------------------------------------

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// Wipe the whole partition.
    pub fn clear(&self) -> Result<()> {
        self.conn().execute("DELETE FROM local_storage", [])?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Read and parse a document.  Missing and unparsable documents both come
    /// back as `None`; the latter is logged.
    pub fn read_document<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt document in storage, using default");
                Ok(None)
            }
        }
    }

    /// Read a document, falling back to `T::default()`.
    pub fn read_document_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        Ok(self.read_document(key)?.unwrap_or_default())
    }

    /// Serialize and overwrite a whole document.
    pub fn write_document<T: Serialize + ?Sized>(&self, key: &str, doc: &T) -> Result<()> {
        let json = serde_json::to_string(doc)?;
        self.set_item(key, &json)
    }
}
