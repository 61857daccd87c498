//! Canonical error type for the rewriting pipeline.
//!
//! Unmapped addresses and upstream parse failures are not errors; see the
//! rewriter module for how those are handled.

use std::io;

use crate::protocol::api_key;

/// Errors raised while flushing queued responses.
#[derive(Debug)]
pub enum RewriteError {
    /// The encoder could not serialize a queued response.
    Encode(io::Error),
    /// An opaque payload claimed an API key reserved for a structured
    /// variant. This is a decoder/dispatcher pairing bug, never a
    /// client-triggerable condition, and aborts the batch.
    ApiKeyMismatch {
        /// The API key the payload claimed.
        api_key: i16,
    },
}

impl std::fmt::Display for RewriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(error) => write!(f, "failed to encode response: {error}"),
            Self::ApiKeyMismatch { api_key: key } => write!(
                f,
                "opaque payload claims structured api key {key} (expected one of {}, {})",
                api_key::METADATA,
                api_key::FIND_COORDINATOR,
            ),
        }
    }
}

impl std::error::Error for RewriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(error) => Some(error),
            Self::ApiKeyMismatch { .. } => None,
        }
    }
}

impl From<io::Error> for RewriteError {
    fn from(error: io::Error) -> Self { Self::Encode(error) }
}
