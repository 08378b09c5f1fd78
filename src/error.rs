use thiserror::Error;

/// Errors raised while talking to the recognition backend.
///
/// `Display` is the bare message; callers add their own prefix
/// (`Network error: `, `Error: `) when showing it to the operator.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with `success: false`.
    #[error("{0}")]
    Backend(String),
    #[error("invalid capture filename: {0:?}")]
    InvalidFilename(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
