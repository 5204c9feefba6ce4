//! Coordination state machine.
//!
//! Sans-io: inbound datagrams in, outbound requests out, time driven by
//! `advance(now)`. The machine attaches to the coordinator with the session
//! token it was created with, then keeps the connection warm with periodic
//! pings; ping replies carry room info, which is how membership changes
//! reach a client that never subscribed to anything.

use std::{
    fmt,
    time::{Duration, Instant},
};

use muster_identity::SessionToken;

use crate::{
    error::CoordinationError,
    observed::Observed,
    wire::{Request, Response, RoomId, RoomInfo, RoomList, RoomResult},
};

/// Resend cadence for unanswered attach requests.
const ATTACH_RESEND_INTERVAL: Duration = Duration::from_millis(500);

/// Keepalive ping cadence once attached.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(2);

/// Default application rooms are created under.
pub const DEFAULT_APPLICATION_ID: u64 = 1;

/// Default member capacity for created rooms.
pub const DEFAULT_MAX_MEMBERS: u32 = 8;

/// Connection phase toward the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Attach request in flight; not yet acknowledged.
    Greeting,
    /// Attach acknowledged; requests are honored.
    Ready,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Greeting => f.write_str("greeting"),
            Phase::Ready => f.write_str("ready"),
        }
    }
}

/// Options for creating a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCreateOptions {
    /// Application the room belongs to.
    pub application_id: u64,
    /// Display name.
    pub name: String,
    /// Member capacity.
    pub max_members: u32,
}

impl Default for RoomCreateOptions {
    fn default() -> Self {
        Self {
            application_id: DEFAULT_APPLICATION_ID,
            name: String::new(),
            max_members: DEFAULT_MAX_MEMBERS,
        }
    }
}

/// Options for listing rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListOptions {
    /// Restrict the listing to one application.
    pub application_id: Option<u64>,
    /// Upper bound on returned entries.
    pub maximum_count: u32,
}

impl Default for RoomListOptions {
    fn default() -> Self {
        Self { application_id: None, maximum_count: 16 }
    }
}

/// Sans-io coordination client.
#[derive(Debug)]
pub struct CoordinationClient {
    session: SessionToken,
    phase: Phase,
    last_attach: Option<Instant>,
    last_keepalive: Option<Instant>,
    knowledge: u64,
    outgoing: Vec<Request>,
    room_info: Observed<RoomInfo>,
    room_result: Observed<RoomResult>,
    room_list: Observed<RoomList>,
}

impl CoordinationClient {
    /// Create a client that will attach with the given session token.
    pub fn new(session: SessionToken) -> Self {
        Self {
            session,
            phase: Phase::Greeting,
            last_attach: None,
            last_keepalive: None,
            knowledge: 0,
            outgoing: Vec::new(),
            room_info: Observed::default(),
            room_result: Observed::default(),
            room_list: Observed::default(),
        }
    }

    /// Current connection phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Phase the client is driving toward. Always [`Phase::Ready`]; the
    /// session is one-shot and never detaches on purpose.
    pub fn target_phase(&self) -> Phase {
        Phase::Ready
    }

    /// Drive time forward: resend the attach while greeting, ping on the
    /// keepalive cadence once ready.
    pub fn advance(&mut self, now: Instant) {
        match self.phase {
            Phase::Greeting => {
                let due = self.last_attach.is_none_or(|sent| {
                    now.saturating_duration_since(sent) >= ATTACH_RESEND_INTERVAL
                });
                if due {
                    self.outgoing.push(Request::Attach { session: self.session.0 });
                    self.last_attach = Some(now);
                }
            },
            Phase::Ready => {
                let due = self.last_keepalive.is_none_or(|sent| {
                    now.saturating_duration_since(sent) >= KEEPALIVE_INTERVAL
                });
                if due {
                    self.outgoing.push(Request::Ping { knowledge: self.knowledge });
                    self.last_keepalive = Some(now);
                }
            },
        }
    }

    /// Apply one inbound datagram.
    pub fn handle_datagram(&mut self, bytes: &[u8]) -> Result<(), CoordinationError> {
        self.handle_response(crate::wire::decode(bytes)?);
        Ok(())
    }

    /// Apply one decoded response.
    pub fn handle_response(&mut self, response: Response) {
        match response {
            Response::Attached => {
                if self.phase != Phase::Ready {
                    tracing::info!("attached to coordinator");
                }
                self.phase = Phase::Ready;
            },
            Response::RoomResult(result) => {
                tracing::debug!(room_id = result.room_id, "room entry confirmed");
                self.room_result.replace(result);
            },
            Response::RoomInfo(info) => self.room_info.replace(info),
            Response::RoomList(list) => self.room_list.replace(list),
        }
    }

    /// Request creation of a room. Fire-and-forget; the outcome arrives in
    /// [`Self::room_result`].
    pub fn create_room(&mut self, options: &RoomCreateOptions) {
        self.outgoing.push(Request::CreateRoom {
            application_id: options.application_id,
            name: options.name.clone(),
            max_members: options.max_members,
        });
    }

    /// Request joining a room. Fire-and-forget; the outcome arrives in
    /// [`Self::room_result`].
    pub fn join_room(&mut self, room_id: RoomId) {
        self.outgoing.push(Request::JoinRoom { room_id });
    }

    /// Request a room listing. Fire-and-forget; the outcome arrives in
    /// [`Self::room_list`].
    pub fn list_rooms(&mut self, options: &RoomListOptions) {
        self.outgoing.push(Request::ListRooms {
            application_id: options.application_id,
            maximum_count: options.maximum_count,
        });
    }

    /// Ping the coordinator with a knowledge value. The value is also
    /// adopted for subsequent keepalive pings. The reply arrives in
    /// [`Self::room_info`].
    pub fn ping(&mut self, knowledge: u64) {
        self.knowledge = knowledge;
        self.outgoing.push(Request::Ping { knowledge });
    }

    /// Latest room membership snapshot.
    pub fn room_info(&self) -> &Observed<RoomInfo> {
        &self.room_info
    }

    /// Latest create/join outcome snapshot.
    pub fn room_result(&self) -> &Observed<RoomResult> {
        &self.room_result
    }

    /// Latest room listing snapshot.
    pub fn room_list(&self) -> &Observed<RoomList> {
        &self.room_list
    }

    /// Drain requests queued for the coordinator.
    pub fn take_outgoing(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outgoing)
    }
}
