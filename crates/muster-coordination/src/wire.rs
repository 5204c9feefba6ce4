//! CBOR-encoded coordination messages.
//!
//! One datagram carries one payload. Response payload structs double as the
//! snapshot payloads held in [`crate::Observed`], so the wire shape and the
//! observable shape cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::error::CoordinationError;

/// Room identifier assigned by the coordinator.
pub type RoomId = u64;

/// Client → server requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Bind this connection to a logged-in identity session.
    Attach {
        /// Session token issued by the identity service.
        session: u64,
    },
    /// Create a room.
    CreateRoom {
        /// Application the room belongs to.
        application_id: u64,
        /// Display name.
        name: String,
        /// Member capacity.
        max_members: u32,
    },
    /// Join an existing room.
    JoinRoom {
        /// Room to join.
        room_id: RoomId,
    },
    /// List rooms, optionally scoped to one application.
    ListRooms {
        /// Restrict the listing to one application.
        application_id: Option<u64>,
        /// Upper bound on returned entries.
        maximum_count: u32,
    },
    /// Ping carrying the client's knowledge (latest simulation tick id it
    /// has seen). The reply carries current room info.
    Ping {
        /// Knowledge value to report.
        knowledge: u64,
    },
}

/// Server → client responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// Attach acknowledged; requests will now be honored.
    Attached,
    /// Create or join completed.
    RoomResult(RoomResult),
    /// Current room membership, in reply to a ping.
    RoomInfo(RoomInfo),
    /// Room listing.
    RoomList(RoomList),
}

/// Outcome of a create or join request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomResult {
    /// Room entered.
    pub room_id: RoomId,
    /// Index of this client's connection within the room.
    pub connection_index: u8,
}

/// Membership of the room this client is in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    /// Member user ids, in join order.
    pub members: Vec<u64>,
    /// Index into `members` of the room owner.
    pub owner_index: u32,
}

/// Room listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomList {
    /// Listed rooms.
    pub entries: Vec<RoomListEntry>,
}

/// One room in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    /// Room identifier.
    pub room_id: RoomId,
    /// Display name.
    pub name: String,
    /// Current member count.
    pub member_count: u32,
}

/// Encode a request into one datagram.
pub fn encode(request: &Request) -> Result<Vec<u8>, CoordinationError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(request, &mut bytes)
        .map_err(|e| CoordinationError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Decode one datagram into a response.
pub fn decode(bytes: &[u8]) -> Result<Response, CoordinationError> {
    ciborium::de::from_reader(bytes).map_err(|e| CoordinationError::Decode(e.to_string()))
}
