use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to parse document: {0}")]
    Parse(#[from] roxmltree::Error),

    /// A label was found but the slot it points at does not exist.
    #[error(
        "Structural mismatch: label '{label}' expects a value slot at index {index}, but the node only has {available} slot(s)"
    )]
    StructuralMismatch {
        label: &'static str,
        index: usize,
        available: usize,
    },

    #[error("GitHub API returned {status} for {url}")]
    Http { url: String, status: i32 },

    #[error("Transport error: {0}")]
    Transport(#[from] minreq::Error),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
