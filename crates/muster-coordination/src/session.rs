//! Coordination session: client state machine plus its UDP transport.
//!
//! `advance` is fallible here, unlike the identity side: an undecodable
//! datagram or a socket failure means the one-shot session is broken, and
//! the host is expected to treat the error as fatal.

use std::{
    io::ErrorKind,
    net::{SocketAddr, UdpSocket},
    time::Instant,
};

use muster_identity::SessionToken;

use crate::{
    client::{CoordinationClient, Phase, RoomCreateOptions, RoomListOptions},
    error::CoordinationError,
    observed::Observed,
    wire::{self, RoomId, RoomInfo, RoomList, RoomResult},
};

/// Largest datagram the session will accept.
const MAX_DATAGRAM: usize = 1500;

/// Pollable session against the room coordination service.
#[derive(Debug)]
pub struct CoordinationSession {
    client: CoordinationClient,
    socket: UdpSocket,
}

impl CoordinationSession {
    /// Bind a local socket, aim it at the coordinator and queue the attach
    /// handshake for the given session token.
    pub fn connect(server: SocketAddr, token: SessionToken) -> Result<Self, CoordinationError> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(server)?;
        socket.set_nonblocking(true)?;
        Ok(Self { client: CoordinationClient::new(token), socket })
    }

    /// Advance the session: drain inbound datagrams, drive the state
    /// machine, flush outbound requests. Never blocks.
    pub fn advance(&mut self, now: Instant) -> Result<(), CoordinationError> {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            match self.socket.recv(&mut buf) {
                Ok(len) => self.client.handle_datagram(&buf[..len])?,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(CoordinationError::Io(e)),
            }
        }

        self.client.advance(now);

        for request in self.client.take_outgoing() {
            let bytes = wire::encode(&request)?;
            match self.socket.send(&bytes) {
                Ok(_) => {},
                // UDP send rarely blocks; when it does the datagram is
                // simply lost, same as on the wire.
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    tracing::warn!("coordination send dropped: {e}");
                },
                Err(e) => return Err(CoordinationError::Io(e)),
            }
        }
        Ok(())
    }

    /// Current connection phase.
    pub fn phase(&self) -> Phase {
        self.client.phase()
    }

    /// Phase the session is driving toward.
    pub fn target_phase(&self) -> Phase {
        self.client.target_phase()
    }

    /// Request creation of a room.
    pub fn create_room(&mut self, options: &RoomCreateOptions) {
        self.client.create_room(options);
    }

    /// Request joining a room.
    pub fn join_room(&mut self, room_id: RoomId) {
        self.client.join_room(room_id);
    }

    /// Request a room listing.
    pub fn list_rooms(&mut self, options: &RoomListOptions) {
        self.client.list_rooms(options);
    }

    /// Ping the coordinator with a knowledge value.
    pub fn ping(&mut self, knowledge: u64) {
        self.client.ping(knowledge);
    }

    /// Latest room membership snapshot.
    pub fn room_info(&self) -> &Observed<RoomInfo> {
        self.client.room_info()
    }

    /// Latest create/join outcome snapshot.
    pub fn room_result(&self) -> &Observed<RoomResult> {
        self.client.room_result()
    }

    /// Latest room listing snapshot.
    pub fn room_list(&self) -> &Observed<RoomList> {
        self.client.room_list()
    }
}
