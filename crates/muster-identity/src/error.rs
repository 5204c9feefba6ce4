//! Identity client errors.

use std::io;

use thiserror::Error;

/// Errors from the identity client and its transport.
///
/// None of these are fatal to a host application: login keeps retrying on
/// its resend cadence and the session logs and continues.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Payload could not be encoded.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Datagram could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// Secret file was present but unreadable.
    #[error("malformed secret file: {0}")]
    MalformedSecret(String),
}
