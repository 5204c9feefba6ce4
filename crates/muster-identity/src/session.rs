//! Identity session: login client plus its UDP transport.
//!
//! The socket is non-blocking; `advance` drains whatever has arrived,
//! drives the state machine, and flushes queued payloads. Transport and
//! decode problems are logged and absorbed; login simply keeps retrying on
//! its cadence, so none of them are fatal to the host.

use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
    time::Instant,
};

use crate::{
    SessionToken, client::IdentityClient, error::IdentityError, secret::Credentials, wire,
};

/// Largest datagram the session will accept.
const MAX_DATAGRAM: usize = 1500;

/// Pollable login session against the identity service.
#[derive(Debug)]
pub struct IdentitySession {
    client: IdentityClient,
    socket: UdpSocket,
}

impl IdentitySession {
    /// Bind a local socket and aim it at the identity server.
    ///
    /// No traffic is sent until the first `advance`.
    pub fn connect(server: SocketAddr, credentials: Credentials) -> Result<Self, IdentityError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(server)?;
        socket.set_nonblocking(true)?;
        Ok(Self { client: IdentityClient::new(credentials), socket })
    }

    /// Advance the session: drain inbound datagrams, drive the login state
    /// machine, flush outbound payloads. Never blocks.
    pub fn advance(&mut self, now: Instant) {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            match self.socket.recv(&mut buf) {
                Ok(len) => {
                    if let Err(e) = self.client.handle_datagram(&buf[..len]) {
                        tracing::warn!("identity datagram dropped: {e}");
                    }
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    tracing::warn!("identity socket recv failed: {e}");
                    break;
                },
            }
        }

        self.client.advance(now);

        for payload in self.client.take_outgoing() {
            match wire::encode(&payload) {
                Ok(bytes) => {
                    if let Err(e) = self.socket.send(&bytes) {
                        tracing::warn!("identity socket send failed: {e}");
                    }
                },
                Err(e) => tracing::warn!("identity payload not encodable: {e}"),
            }
        }
    }

    /// Whether the service has acknowledged the login.
    pub fn is_logged_in(&self) -> bool {
        self.client.is_logged_in()
    }

    /// Issued session token. `None` until logged in.
    pub fn session_token(&self) -> Option<SessionToken> {
        self.client.session_token()
    }
}
