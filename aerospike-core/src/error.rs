//! Error types for Aerospike client operations.

use std::io;
use thiserror::Error;

/// Maximum number of response bytes kept in a [`AerospikeError::Parse`] error.
pub const MAX_PARSE_RESPONSE_LEN: usize = 200;

/// The main error type for Aerospike client operations.
#[derive(Debug, Error)]
pub enum AerospikeError {
    /// A value or key of an unsupported type (or integer width) was offered to the codec.
    #[error("type not supported: {0}")]
    TypeNotSupported(String),

    /// Structurally invalid use of an API.
    #[error("parameter error: {0}")]
    Parameter(String),

    /// A malformed server response (partition table, build version, ...).
    #[error("parse error: {message}. Response={response}")]
    Parse {
        /// What went wrong.
        message: String,
        /// The offending response, truncated for diagnostics.
        response: String,
    },

    /// Connection-related errors, including missing info-response values.
    #[error("connection error: {0}")]
    Connection(String),

    /// Malformed bytes while decoding, or a failure while packing.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Operation timeout errors.
    #[error("timeout error: {0}")]
    Timeout(String),

    /// Configuration errors (invalid settings).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// I/O errors from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AerospikeError {
    /// Creates a parse error, keeping at most [`MAX_PARSE_RESPONSE_LEN`] bytes of the response.
    pub fn parse(message: impl Into<String>, response: &str) -> Self {
        Self::Parse {
            message: message.into(),
            response: truncate_response(response).to_string(),
        }
    }

    /// Creates a type-not-supported error.
    pub fn type_not_supported(message: impl Into<String>) -> Self {
        Self::TypeNotSupported(message.into())
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

impl From<rmp::encode::ValueWriteError<io::Error>> for AerospikeError {
    fn from(err: rmp::encode::ValueWriteError<io::Error>) -> Self {
        Self::Serialization(format!("failed to pack value: {}", err))
    }
}

fn truncate_response(response: &str) -> &str {
    if response.len() <= MAX_PARSE_RESPONSE_LEN {
        return response;
    }
    let mut end = MAX_PARSE_RESPONSE_LEN;
    while !response.is_char_boundary(end) {
        end -= 1;
    }
    &response[..end]
}

/// A specialized `Result` type for Aerospike client operations.
pub type Result<T> = std::result::Result<T, AerospikeError>;
