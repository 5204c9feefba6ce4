//! Session orchestrator.
//!
//! Single-threaded, poll-driven: one fixed-cadence tick advances the
//! identity client, constructs the coordination session exactly once when
//! identity comes up, advances coordination (fatally on error), surfaces
//! version-counter deltas, and polls the console for a completed line to
//! dispatch. The only suspension point is the inter-tick sleep; nothing in
//! a tick blocks.
//!
//! Within a tick the order is fixed (identity, coordination, renderer,
//! console) so a state transition in one tick is visible to the renderer
//! in the same tick rather than one cycle late.

use std::{
    fmt::Write as _,
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use muster_console::ConsolePoll;
use muster_coordination::{CoordinationError, RoomCreateOptions, RoomListOptions};
use muster_identity::IdentityError;
use thiserror::Error;

use crate::{
    commands::{self, Command},
    ports::{Connector, CoordinationPort, IdentityPort, LineConsole},
    render::{self, SeenVersions},
};

/// Tick cadence. Short enough to stay responsive to keystrokes without
/// busy-spinning.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

const PROMPT: &str = "muster> ";

/// Errors that terminate the process.
#[derive(Debug, Error)]
pub enum FatalError {
    /// The coordination session failed; by contract there is no recovery at
    /// this layer.
    #[error("coordination session failed: {0}")]
    Coordination(#[from] CoordinationError),

    /// Identity setup failed before the loop could start.
    #[error("identity setup failed: {0}")]
    Identity(#[from] IdentityError),

    /// The console could not be driven.
    #[error("console failed: {0}")]
    Console(#[from] io::Error),
}

impl FatalError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> std::process::ExitCode {
        match self {
            FatalError::Coordination(_) => std::process::ExitCode::from(2),
            FatalError::Identity(_) => std::process::ExitCode::from(3),
            FatalError::Console(_) => std::process::ExitCode::from(4),
        }
    }
}

/// The interactive session orchestrator.
///
/// Owns the console, the identity session, and once identity is
/// established, the coordination session. Generic over the port traits so
/// tests drive the same orchestration against fakes.
pub struct App<C, I, N>
where
    C: LineConsole,
    I: IdentityPort,
    N: Connector,
{
    console: C,
    identity: I,
    connector: N,
    coordination: Option<N::Session>,
    seen: SeenVersions,
    shutdown: Arc<AtomicBool>,
}

impl<C, I, N> App<C, I, N>
where
    C: LineConsole,
    I: IdentityPort,
    N: Connector,
{
    /// Create an orchestrator. `shutdown` is the cancellation flag shared
    /// with the signal handler; it is only read at tick boundaries.
    pub fn new(console: C, identity: I, connector: N, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            console,
            identity,
            connector,
            coordination: None,
            seen: SeenVersions::default(),
            shutdown,
        }
    }

    /// The coordination session, once constructed.
    pub fn coordination(&self) -> Option<&N::Session> {
        self.coordination.as_ref()
    }

    /// The console.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Whether shutdown has been requested (quit, Ctrl-C or SIGINT).
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Run the tick loop until shutdown or a fatal error.
    ///
    /// The console is closed on every exit path so the terminal is restored.
    pub async fn run(mut self) -> Result<(), FatalError> {
        self.console.set_prompt(PROMPT);
        let result = self.run_ticks().await;
        self.console.close();
        result
    }

    async fn run_ticks(&mut self) -> Result<(), FatalError> {
        self.console.reset_for_next_line()?;

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.shutdown_requested() {
                return Ok(());
            }
            self.tick(Instant::now())?;
        }
    }

    /// One iteration of the polling loop.
    pub fn tick(&mut self, now: Instant) -> Result<(), FatalError> {
        self.identity.advance(now);

        // One-way transition: the coordination session is constructed on the
        // tick identity first reports a token, and never again.
        if self.coordination.is_none()
            && let Some(token) = self.identity.session_token()
        {
            tracing::info!("identity ready, starting coordination session");
            self.coordination = Some(self.connector.connect(token)?);
        }

        if let Some(coordination) = &mut self.coordination {
            coordination.advance(now)?;
            render::surface_updates(coordination, &mut self.console, &mut self.seen)?;
        }

        match self.console.poll() {
            Ok(ConsolePoll::LineReady) => self.finish_line()?,
            Ok(ConsolePoll::Interrupted) => {
                tracing::debug!("interrupt from console");
                self.shutdown.store(true, Ordering::Relaxed);
            },
            Ok(ConsolePoll::Pending) => {},
            // Transient input noise; the next tick polls again.
            Err(e) => tracing::warn!("console poll failed: {e}"),
        }

        Ok(())
    }

    /// Dispatch the completed line and redraw the prompt.
    fn finish_line(&mut self) -> Result<(), FatalError> {
        let line = self.console.current_line().trim().to_string();
        self.console.clear_editing();

        if !line.is_empty() {
            let mut out = String::new();
            self.dispatch(&line, &mut out);
            if !out.is_empty() {
                self.console.print(&out)?;
            }
        }

        self.console.reset_for_next_line()?;
        Ok(())
    }

    /// Turn one completed line into exactly one handler invocation or one
    /// diagnostic: never both, never neither.
    pub fn dispatch(&mut self, line: &str, out: &mut String) {
        match line {
            "quit" => self.shutdown.store(true, Ordering::Relaxed),
            "help" => commands::render_help(out),
            _ => match commands::resolve(line) {
                Ok(command) => self.execute(command, out),
                Err(e) => {
                    let _ = writeln!(out, "{e} ({})", e.code());
                },
            },
        }
    }

    fn execute(&mut self, command: Command, out: &mut String) {
        match command {
            Command::State => self.write_state(out),
            Command::RoomCreate(opts) => {
                let Some(coordination) = self.coordination_or_notice(out) else { return };
                let options =
                    RoomCreateOptions { name: opts.name.clone(), ..RoomCreateOptions::default() };
                if opts.verbose {
                    let _ = writeln!(
                        out,
                        "room create: '{}' (application {}, max members {})",
                        options.name, options.application_id, options.max_members
                    );
                } else {
                    let _ = writeln!(out, "room create: '{}'", options.name);
                }
                coordination.create_room(&options);
            },
            Command::RoomJoin(opts) => {
                let Some(coordination) = self.coordination_or_notice(out) else { return };
                let _ = writeln!(out, "room join: {}", opts.id);
                coordination.join_room(opts.id);
            },
            Command::RoomList(opts) => {
                let Some(coordination) = self.coordination_or_notice(out) else { return };
                coordination.list_rooms(&RoomListOptions {
                    application_id: opts.application_id,
                    maximum_count: opts.maximum_count,
                });
            },
            Command::Ping(opts) => {
                let Some(coordination) = self.coordination_or_notice(out) else { return };
                if opts.verbose {
                    let _ = writeln!(out, "ping: knowledge {}", opts.knowledge);
                }
                coordination.ping(opts.knowledge);
            },
        }
    }

    /// The coordination session, or a notice when it has not started yet.
    /// Premature use is a normal condition, not an error.
    fn coordination_or_notice(&mut self, out: &mut String) -> Option<&mut N::Session> {
        if self.coordination.is_none() {
            let _ = writeln!(out, "coordination not started yet");
        }
        self.coordination.as_mut()
    }

    fn write_state(&self, out: &mut String) {
        let identity = if self.identity.is_logged_in() { "logged in" } else { "logging in" };
        let _ = writeln!(out, "identity: {identity}");
        match &self.coordination {
            Some(coordination) => {
                let _ = writeln!(
                    out,
                    "coordination: {} (target: {})",
                    coordination.phase(),
                    coordination.target_phase()
                );
            },
            None => {
                let _ = writeln!(out, "coordination: not started yet");
            },
        }
    }
}
