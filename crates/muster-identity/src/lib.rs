//! Identity service client.
//!
//! Performs login against the identity service and exposes a coarse,
//! pollable state: logging in or logged in, plus the issued session token
//! once login completes. The caller drives the client forward with explicit
//! `advance(now)` calls; nothing here blocks or spawns.
//!
//! [`IdentityClient`] is the sans-io state machine; [`IdentitySession`]
//! pairs it with a non-blocking UDP socket.

mod client;
mod error;
mod secret;
mod session;
pub mod wire;

pub use client::{IdentityClient, IdentityState};
pub use error::IdentityError;
pub use secret::Credentials;
pub use session::IdentitySession;

/// Opaque session credential issued by the identity service on login.
///
/// Consumed by the coordination layer to authenticate its own session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(pub u64);
