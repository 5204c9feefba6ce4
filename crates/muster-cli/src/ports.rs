//! Consumed collaborator interfaces.
//!
//! The orchestrator never touches the collaborator crates directly; it goes
//! through these narrow port traits. The real implementations live in the
//! collaborator crates and are adapted here, and the same orchestration code
//! runs against fakes in tests.

use std::{io, net::SocketAddr, time::Instant};

use muster_console::{ConsolePoll, TerminalConsole};
use muster_coordination::{
    CoordinationError, CoordinationSession, Observed, Phase, RoomCreateOptions, RoomId,
    RoomInfo, RoomList, RoomListOptions, RoomResult,
};
use muster_identity::{IdentitySession, SessionToken};

/// The interactive line console.
///
/// One editable input line plus the erase/restore discipline that lets
/// asynchronous output be written above it.
pub trait LineConsole {
    /// Set the prompt text drawn before the input line.
    fn set_prompt(&mut self, text: &str);

    /// Poll pending input without blocking.
    fn poll(&mut self) -> io::Result<ConsolePoll>;

    /// The line as the user has typed it so far.
    fn current_line(&self) -> &str;

    /// Discard the buffered line.
    fn clear_editing(&mut self);

    /// Draw a fresh prompt for the next line of input.
    fn reset_for_next_line(&mut self) -> io::Result<()>;

    /// Erase the displayed input line, preserving its buffered contents.
    fn erase_displayed_line(&mut self) -> io::Result<()>;

    /// Restore the previously erased line exactly as the user left it.
    fn restore_displayed_line(&mut self) -> io::Result<()>;

    /// Write a block of output above the prompt area.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Release the terminal.
    fn close(&mut self);
}

/// The identity (login) session.
pub trait IdentityPort {
    /// Drive the login state machine forward. Never blocks, never fails;
    /// login keeps retrying internally.
    fn advance(&mut self, now: Instant);

    /// Whether the identity service has acknowledged the login.
    fn is_logged_in(&self) -> bool;

    /// Issued session token. `None` until logged in.
    fn session_token(&self) -> Option<SessionToken>;
}

/// The room coordination session.
///
/// Requests are fire-and-forget; responses surface later through the
/// version-counted snapshots.
pub trait CoordinationPort {
    /// Drive the session forward. An error here is fatal by contract.
    fn advance(&mut self, now: Instant) -> Result<(), CoordinationError>;

    /// Request creation of a room.
    fn create_room(&mut self, options: &RoomCreateOptions);

    /// Request joining a room.
    fn join_room(&mut self, room_id: RoomId);

    /// Request a room listing.
    fn list_rooms(&mut self, options: &RoomListOptions);

    /// Ping the coordinator with a knowledge value.
    fn ping(&mut self, knowledge: u64);

    /// Latest room membership snapshot.
    fn room_info(&self) -> &Observed<RoomInfo>;

    /// Latest create/join outcome snapshot.
    fn room_result(&self) -> &Observed<RoomResult>;

    /// Latest room listing snapshot.
    fn room_list(&self) -> &Observed<RoomList>;

    /// Current connection phase.
    fn phase(&self) -> Phase;

    /// Phase the session is driving toward.
    fn target_phase(&self) -> Phase;
}

/// One-shot construction seam for the coordination session.
///
/// The orchestrator calls this exactly once, on the tick where identity
/// first reports a session token.
pub trait Connector {
    /// Session type produced by this connector.
    type Session: CoordinationPort;

    /// Construct the coordination session for a logged-in identity.
    fn connect(&mut self, token: SessionToken) -> Result<Self::Session, CoordinationError>;
}

impl LineConsole for TerminalConsole {
    fn set_prompt(&mut self, text: &str) {
        TerminalConsole::set_prompt(self, text);
    }

    fn poll(&mut self) -> io::Result<ConsolePoll> {
        TerminalConsole::poll(self)
    }

    fn current_line(&self) -> &str {
        TerminalConsole::current_line(self)
    }

    fn clear_editing(&mut self) {
        TerminalConsole::clear_editing(self);
    }

    fn reset_for_next_line(&mut self) -> io::Result<()> {
        TerminalConsole::reset_for_next_line(self)
    }

    fn erase_displayed_line(&mut self) -> io::Result<()> {
        TerminalConsole::erase_displayed_line(self)
    }

    fn restore_displayed_line(&mut self) -> io::Result<()> {
        TerminalConsole::restore_displayed_line(self)
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        TerminalConsole::print(self, text)
    }

    fn close(&mut self) {
        TerminalConsole::close(self);
    }
}

impl IdentityPort for IdentitySession {
    fn advance(&mut self, now: Instant) {
        IdentitySession::advance(self, now);
    }

    fn is_logged_in(&self) -> bool {
        IdentitySession::is_logged_in(self)
    }

    fn session_token(&self) -> Option<SessionToken> {
        IdentitySession::session_token(self)
    }
}

impl CoordinationPort for CoordinationSession {
    fn advance(&mut self, now: Instant) -> Result<(), CoordinationError> {
        CoordinationSession::advance(self, now)
    }

    fn create_room(&mut self, options: &RoomCreateOptions) {
        CoordinationSession::create_room(self, options);
    }

    fn join_room(&mut self, room_id: RoomId) {
        CoordinationSession::join_room(self, room_id);
    }

    fn list_rooms(&mut self, options: &RoomListOptions) {
        CoordinationSession::list_rooms(self, options);
    }

    fn ping(&mut self, knowledge: u64) {
        CoordinationSession::ping(self, knowledge);
    }

    fn room_info(&self) -> &Observed<RoomInfo> {
        CoordinationSession::room_info(self)
    }

    fn room_result(&self) -> &Observed<RoomResult> {
        CoordinationSession::room_result(self)
    }

    fn room_list(&self) -> &Observed<RoomList> {
        CoordinationSession::room_list(self)
    }

    fn phase(&self) -> Phase {
        CoordinationSession::phase(self)
    }

    fn target_phase(&self) -> Phase {
        CoordinationSession::target_phase(self)
    }
}

/// Connector that opens a UDP coordination session against a fixed server.
#[derive(Debug, Clone, Copy)]
pub struct UdpConnector {
    server: SocketAddr,
}

impl UdpConnector {
    /// Connector aimed at the given coordination server.
    pub fn new(server: SocketAddr) -> Self {
        Self { server }
    }
}

impl Connector for UdpConnector {
    type Session = CoordinationSession;

    fn connect(&mut self, token: SessionToken) -> Result<Self::Session, CoordinationError> {
        CoordinationSession::connect(self.server, token)
    }
}
