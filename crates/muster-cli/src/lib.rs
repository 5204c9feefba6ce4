//! Interactive console client for the muster room coordinator.
//!
//! The binary logs in against the identity service, bootstraps a
//! coordination session once identity is established, and runs an
//! interactive prompt. The core of the crate is the session orchestrator in
//! [`app`]: a single-threaded tick loop that advances both collaborator
//! clients, surfaces their asynchronous responses through the version-diff
//! renderer in [`render`], and dispatches completed input lines through the
//! command registry in [`commands`].
//!
//! Collaborators are consumed through the narrow port traits in [`ports`],
//! which is also what makes the orchestrator testable against fakes.

pub mod app;
pub mod commands;
pub mod ports;
pub mod render;

pub use app::{App, FatalError};
