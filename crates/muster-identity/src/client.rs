//! Login state machine.
//!
//! Sans-io: the caller feeds inbound datagrams in, drains outbound payloads
//! out, and drives time forward with `advance(now)`. The observable surface
//! is deliberately coarse (logging in or logged in) so hosts poll state
//! instead of subscribing to events.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::{
    SessionToken,
    error::IdentityError,
    secret::Credentials,
    wire::{ClientPayload, ServerPayload},
};

/// Resend cadence for unanswered login attempts.
const LOGIN_RESEND_INTERVAL: Duration = Duration::from_millis(500);

/// Coarse login state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityState {
    /// Login attempts are in flight (or about to be).
    LoggingIn,
    /// The service acknowledged the login and issued a session token.
    LoggedIn,
}

/// Sans-io login client.
#[derive(Debug)]
pub struct IdentityClient {
    credentials: Credentials,
    state: IdentityState,
    attempt_nonce: u64,
    session: Option<SessionToken>,
    last_sent: Option<Instant>,
    outgoing: Vec<ClientPayload>,
}

impl IdentityClient {
    /// Create a client that will log in with the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            state: IdentityState::LoggingIn,
            attempt_nonce: rand::rng().random(),
            session: None,
            last_sent: None,
            outgoing: Vec::new(),
        }
    }

    /// Current coarse state.
    pub fn state(&self) -> IdentityState {
        self.state
    }

    /// Whether the service has acknowledged the login.
    pub fn is_logged_in(&self) -> bool {
        self.state == IdentityState::LoggedIn
    }

    /// Issued session token. `None` until logged in.
    pub fn session_token(&self) -> Option<SessionToken> {
        self.session
    }

    /// Drive time forward: queue a login attempt when one is due.
    pub fn advance(&mut self, now: Instant) {
        if self.state == IdentityState::LoggedIn {
            return;
        }
        let due = self
            .last_sent
            .is_none_or(|sent| now.saturating_duration_since(sent) >= LOGIN_RESEND_INTERVAL);
        if due {
            self.outgoing.push(ClientPayload::Login {
                account: self.credentials.account,
                passhash: self.credentials.passhash,
                nonce: self.attempt_nonce,
            });
            self.last_sent = Some(now);
        }
    }

    /// Apply one inbound datagram.
    pub fn handle_datagram(&mut self, bytes: &[u8]) -> Result<(), IdentityError> {
        match crate::wire::decode(bytes)? {
            ServerPayload::LoginAck { nonce, session } => {
                if nonce != self.attempt_nonce {
                    tracing::debug!(nonce, "ignoring ack for a stale login attempt");
                    return Ok(());
                }
                if self.state != IdentityState::LoggedIn {
                    tracing::info!(account = self.credentials.account, "logged in");
                }
                self.state = IdentityState::LoggedIn;
                self.session = Some(SessionToken(session));
            },
            ServerPayload::LoginDenied { nonce, reason } => {
                if nonce != self.attempt_nonce {
                    return Ok(());
                }
                // Keep retrying on the resend cadence with a fresh nonce;
                // a transient denial must not wedge the client.
                tracing::warn!(%reason, "login denied");
                self.attempt_nonce = rand::rng().random();
            },
        }
        Ok(())
    }

    /// Drain payloads queued for the server.
    pub fn take_outgoing(&mut self) -> Vec<ClientPayload> {
        std::mem::take(&mut self.outgoing)
    }
}
