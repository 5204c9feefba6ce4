//! CBOR-encoded login messages.
//!
//! Payloads are CBOR for the same reasons the rest of the stack uses it:
//! self-describing, compact, no code generation. One datagram carries one
//! payload.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Client → server login messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientPayload {
    /// Login attempt. `nonce` ties the eventual ack to this attempt.
    Login {
        /// Stable account identifier.
        account: u64,
        /// Hash of the account secret.
        passhash: u64,
        /// Attempt nonce echoed by the server.
        nonce: u64,
    },
}

/// Server → client login messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerPayload {
    /// Login succeeded; a session token was issued.
    LoginAck {
        /// Nonce of the attempt being acknowledged.
        nonce: u64,
        /// Issued session token value.
        session: u64,
    },
    /// Login rejected.
    LoginDenied {
        /// Nonce of the attempt being rejected.
        nonce: u64,
        /// Human-readable reason.
        reason: String,
    },
}

/// Encode a client payload into one datagram.
pub fn encode(payload: &ClientPayload) -> Result<Vec<u8>, IdentityError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(payload, &mut bytes)
        .map_err(|e| IdentityError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Decode one datagram into a server payload.
pub fn decode(bytes: &[u8]) -> Result<ServerPayload, IdentityError> {
    ciborium::de::from_reader(bytes).map_err(|e| IdentityError::Decode(e.to_string()))
}
