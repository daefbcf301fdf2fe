use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Error, Debug)]
pub enum StatsError {
    /// Message reported by the stats provider, kept verbatim for display.
    #[error("{0}")]
    Provider(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Settings store error: {0}")]
    Persist(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StatsError {
    /// Whether this error came from the provider rather than from local state.
    pub fn is_provider(&self) -> bool {
        matches!(self, StatsError::Provider(_))
    }
}
