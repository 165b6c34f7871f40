use thiserror::Error;

/// Errors that can occur while resolving platform locations.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("path error: {0}")]
    Path(String),
}
