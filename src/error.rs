//! Error types for index building and clustering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClusterError>;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// Zoom level was negative, NaN or infinite.
    #[error("Invalid zoom level: {0}")]
    InvalidZoom(f64),

    /// The clustering grid cannot be scanned in bounded time.
    #[error("Degenerate clustering grid: {0}")]
    DegenerateGrid(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The pass was superseded before it could finish.
    #[error("Cluster pass was cancelled")]
    Cancelled,

    #[error("Cluster worker thread panicked")]
    WorkerPanicked,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ClusterError {
    /// True for errors that only mean a newer pass took over.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClusterError::Cancelled)
    }
}
