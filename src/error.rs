//! Error types for the card rendering service

use thiserror::Error;

/// Result type alias for card operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching or rendering a card
#[derive(Error, Debug)]
pub enum Error {
    /// The requested GitHub user does not exist (upstream 404)
    #[error("GitHub user not found: {0}")]
    UserNotFound(String),

    /// Any other non-OK upstream response on a fatal fetch
    #[error("GitHub API request failed: {0}")]
    Upstream(String),

    /// Transport-level failure talking to an external service
    #[error("Network error: {0}")]
    Network(String),

    /// Layout or SVG rasterization failure
    #[error("Rendering failed: {0}")]
    Render(String),

    /// The required base font could not be provisioned
    #[error("Font provisioning failed: {0}")]
    FontProvisioning(String),

    /// A section id outside the known set was requested
    #[error("Unknown section: {0}")]
    UnknownSection(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
