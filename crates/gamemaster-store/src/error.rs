use thiserror::Error;

/// Failures reading or writing the storage partition.
///
/// A document that exists but does not parse is not an error: readers treat
/// it as absent and log a warning.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Creating the data directory or reading a file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be serialized for writing.
    #[error("Document encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    /// The file was written by a newer build.
    #[error("Storage schema v{found} is newer than supported v{supported}")]
    SchemaTooNew { found: u32, supported: u32 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
