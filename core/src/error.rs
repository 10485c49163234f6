use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No usable quiz questions provisioned for week {week}")]
    MissingContent { week: u8 },

    #[error("Invalid literacy week: {week} (valid range 1-15)")]
    InvalidWeek { week: u8 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
