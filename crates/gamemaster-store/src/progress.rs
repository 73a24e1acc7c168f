//! The progress document: user id -> game name -> [`GameProgress`].

use gamemaster_shared::constants::PROGRESS_KEY;

use crate::database::Database;
use crate::error::Result;
use crate::models::ProgressMap;

impl Database {
    pub fn load_progress(&self) -> Result<ProgressMap> {
        self.read_document_or_default(PROGRESS_KEY)
    }

    pub fn save_progress(&self, progress: &ProgressMap) -> Result<()> {
        self.write_document(PROGRESS_KEY, progress)
    }
}
