use thiserror::Error;

#[derive(Error, Debug)]
pub enum RandexError {
    #[error("invalid provider ID: {0}")]
    InvalidProviderId(String),

    #[error("invalid context ID: {0}")]
    InvalidContextId(String),

    #[error("invalid multihash: {0}")]
    InvalidMultihash(String),

    #[error("beacon must be at least 1 and at most 32 bytes, got length: {0}")]
    InvalidBeacon(usize),

    #[error("max sample count must be between 1 and {max}, got: {got}")]
    InvalidSampleCount { got: usize, max: usize },

    #[error("store is closed")]
    Closed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("batch file error: {0}")]
    Batch(#[from] parquet::errors::ParquetError),

    #[error("index updated but manifest append failed: {0}")]
    ManifestAppend(#[source] Box<RandexError>),

    /// Failure reported by an external [`Indexer`](crate::Indexer)
    /// implementation the store decorates. The in-memory delegate never
    /// produces it; persistent delegates return it for their own storage
    /// failures.
    #[error("delegate indexer error: {0}")]
    Delegate(String),

    #[error("background task failed: {0}")]
    Task(String),
}

impl RandexError {
    /// Whether the error was caused by malformed caller input, as opposed to
    /// a storage or engine failure. Callers use this to pick a status code
    /// without matching on every variant.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidProviderId(_)
                | Self::InvalidContextId(_)
                | Self::InvalidMultihash(_)
                | Self::InvalidBeacon(_)
                | Self::InvalidSampleCount { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RandexError>;
