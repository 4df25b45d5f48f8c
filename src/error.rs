//! Error types for the SERIEE client core.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SERIEE client core.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    #[error("No TMDB hosts configured")]
    NoUpstreamHosts,

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Fetch errors
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Request rejected with status {status}: {url}")]
    FetchRejected { url: String, status: u16 },

    #[error("Malformed response: {0}")]
    Decode(String),

    // Account errors
    #[error("No user logged in")]
    Unauthenticated,

    #[error("Security check: please log out and log in again, then retry deleting your account")]
    RequiresRecentLogin,

    #[error("Store operation failed on {target}: {message}")]
    Store { target: String, message: String },

    #[error("Identity operation failed: {0}")]
    Identity(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create a store error for the given table or collection.
    pub fn store<T: Into<String>, M: Into<String>>(target: T, message: M) -> Self {
        Error::Store {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(json)?)
    }

    #[test]
    fn test_error_messages() {
        let err = Error::store("likes", "permission denied");
        assert_eq!(err.to_string(), "Store operation failed on likes: permission denied");
        assert!(Error::RequiresRecentLogin.to_string().contains("log in again"));
        assert!(matches!(parse("{"), Err(Error::Json(_))));
    }
}
