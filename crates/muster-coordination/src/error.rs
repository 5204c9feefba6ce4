//! Coordination client errors.

use std::io;

use thiserror::Error;

/// Errors from the coordination client and its transport.
///
/// By contract these are fatal to the host: the session is one-shot and has
/// no re-attach path, so an error from `advance` should terminate the
/// consuming process with a meaningful code.
#[derive(Debug, Error)]
pub enum CoordinationError {
    /// Socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Request could not be encoded.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Datagram from the coordinator could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),
}
