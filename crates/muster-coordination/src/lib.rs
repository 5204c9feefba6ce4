//! Room coordination client.
//!
//! Talks to the room coordination service on behalf of a logged-in user:
//! room creation, joining, listing and ping. Requests are fire-and-forget;
//! responses surface asynchronously as [`Observed`] snapshots whose version
//! counters increment on every update, so a polling host can detect change
//! without callbacks.
//!
//! [`CoordinationClient`] is the sans-io state machine; [`CoordinationSession`]
//! pairs it with a non-blocking UDP socket. Unlike the identity side, a
//! failing `advance` here is fatal to the host by contract; recovery, if
//! any, belongs below this interface.

mod client;
mod error;
mod observed;
mod session;
pub mod wire;

pub use client::{CoordinationClient, Phase, RoomCreateOptions, RoomListOptions};
pub use error::CoordinationError;
pub use observed::Observed;
pub use session::CoordinationSession;
pub use wire::{RoomId, RoomInfo, RoomList, RoomListEntry, RoomResult};
