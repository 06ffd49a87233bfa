//! Error types and handling for `skywatch`

use thiserror::Error;

/// Main error type for the `skywatch` application
#[derive(Error, Debug)]
pub enum Error {
    /// Geocoding returned no results for the requested place
    #[error("location \"{place}\" not found")]
    LocationNotFound { place: String },

    /// All attempts of a network call failed
    #[error("all {attempts} attempts failed: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    /// A requested forecast hour fell outside the provider's returned window
    #[error("hour '{target}' not found in forecast times (available range: {first} to {last})")]
    TimeOutOfRange {
        target: String,
        first: String,
        last: String,
    },

    /// The provider's JSON lacked the expected top-level structure
    #[error("unexpected API response structure: missing '{what}'")]
    MalformedResponse { what: &'static str },

    /// Configuration-related errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("invalid input: {message}")]
    InvalidArgument { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new input validation error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a malformed-response error naming the missing top-level key
    pub fn malformed(what: &'static str) -> Self {
        Self::MalformedResponse { what }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Error::LocationNotFound { place } => {
                format!("Location \"{place}\" not found. Try a more specific name.")
            }
            Error::RetryExhausted { attempts, .. } => {
                format!("All {attempts} attempts failed. Check your internet connection.")
            }
            Error::TimeOutOfRange { target, first, last } => {
                format!(
                    "No forecast available for {target}. The provider covers {first} to {last}."
                )
            }
            Error::MalformedResponse { .. } => {
                "The weather service returned data in an unexpected shape.".to_string()
            }
            Error::Config { message } => {
                format!("Configuration error: {message}")
            }
            Error::InvalidArgument { message } => {
                format!("Invalid input: {message}")
            }
            Error::Io { .. } => "File operation failed. Check file permissions.".to_string(),
        }
    }
}
