use thiserror::Error;

#[derive(Error, Debug)]
pub enum PocketError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("No database found at {0}\nRun `pocketbook init` to set up.")]
    NotInitialized(String),

    #[error("Stored data under {key} is unreadable: {reason}")]
    CorruptData { key: String, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PocketError>;
