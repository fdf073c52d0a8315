//! Error types for inbound command parsing

use thiserror::Error;

/// Errors that can occur while parsing an inbound command
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command carried no payload between the marker and the terminator
    #[error("empty command payload")]
    EmptyPayload,

    /// Payload was not a decimal number
    #[error("non-numeric payload: {0:?}")]
    NonNumericPayload(String),
}
