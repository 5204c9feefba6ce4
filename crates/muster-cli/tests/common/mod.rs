//! Shared fakes for orchestrator tests.
//!
//! Each fake implements one of the port traits and records every observable
//! call, so tests drive the real orchestration code and assert on the
//! recorded interactions.

use std::{
    cell::Cell,
    collections::VecDeque,
    io,
    rc::Rc,
    time::Instant,
};

use muster_cli::ports::{Connector, CoordinationPort, IdentityPort, LineConsole};
use muster_console::ConsolePoll;
use muster_coordination::{
    CoordinationError, Observed, Phase, RoomCreateOptions, RoomId, RoomInfo, RoomList,
    RoomListOptions, RoomResult,
};
use muster_identity::SessionToken;

/// One scripted console step, consumed per poll.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Append text to the in-progress line; no line is ready.
    Partial(&'static str),
    /// Append text and complete the line.
    Complete(&'static str),
    /// Nothing typed this tick.
    Idle,
    /// Ctrl-C.
    Interrupt,
}

/// Ordered log of observable console calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCall {
    Erase,
    Print(String),
    Restore,
}

/// Scriptable console fake.
#[derive(Debug, Default)]
pub struct FakeConsole {
    pub script: VecDeque<Step>,
    pub line: String,
    pub line_ready: bool,
    pub prompt: String,
    pub calls: Vec<ConsoleCall>,
    pub closed: bool,
}

impl FakeConsole {
    pub fn scripted(steps: impl IntoIterator<Item = Step>) -> Self {
        Self { script: steps.into_iter().collect(), ..Self::default() }
    }

    pub fn erase_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, ConsoleCall::Erase)).count()
    }

    pub fn restore_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, ConsoleCall::Restore)).count()
    }

    /// Everything printed above the prompt, concatenated.
    pub fn printed(&self) -> String {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ConsoleCall::Print(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl LineConsole for FakeConsole {
    fn set_prompt(&mut self, text: &str) {
        self.prompt = text.to_string();
    }

    fn poll(&mut self) -> io::Result<ConsolePoll> {
        if self.line_ready {
            return Ok(ConsolePoll::LineReady);
        }
        match self.script.pop_front() {
            Some(Step::Partial(text)) => {
                self.line.push_str(text);
                Ok(ConsolePoll::Pending)
            },
            Some(Step::Complete(text)) => {
                self.line.push_str(text);
                self.line_ready = true;
                Ok(ConsolePoll::LineReady)
            },
            Some(Step::Interrupt) => Ok(ConsolePoll::Interrupted),
            Some(Step::Idle) | None => Ok(ConsolePoll::Pending),
        }
    }

    fn current_line(&self) -> &str {
        &self.line
    }

    fn clear_editing(&mut self) {
        self.line.clear();
        self.line_ready = false;
    }

    fn reset_for_next_line(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn erase_displayed_line(&mut self) -> io::Result<()> {
        self.calls.push(ConsoleCall::Erase);
        Ok(())
    }

    fn restore_displayed_line(&mut self) -> io::Result<()> {
        self.calls.push(ConsoleCall::Restore);
        Ok(())
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.calls.push(ConsoleCall::Print(text.to_string()));
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Identity fake with a scriptable login tick.
#[derive(Debug)]
pub struct FakeIdentity {
    pub advances: usize,
    pub login_after_advances: usize,
    pub token: u64,
}

impl FakeIdentity {
    /// Logged in from the first advance onward.
    pub fn logged_in(token: u64) -> Self {
        Self { advances: 0, login_after_advances: 0, token }
    }

    /// Never logs in.
    pub fn never() -> Self {
        Self { advances: 0, login_after_advances: usize::MAX, token: 0 }
    }
}

impl IdentityPort for FakeIdentity {
    fn advance(&mut self, _now: Instant) {
        self.advances = self.advances.saturating_add(1);
    }

    fn is_logged_in(&self) -> bool {
        self.advances > self.login_after_advances
    }

    fn session_token(&self) -> Option<SessionToken> {
        self.is_logged_in().then(|| SessionToken(self.token))
    }
}

/// A request the orchestrator issued on the coordination port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentRequest {
    Create { name: String, application_id: u64, max_members: u32 },
    Join(RoomId),
    List { application_id: Option<u64>, maximum_count: u32 },
    Ping(u64),
}

/// Coordination fake with scriptable failures and snapshot bumps.
#[derive(Debug, Default)]
pub struct FakeCoordination {
    pub advances: usize,
    /// Advance call (1-based) that returns an error.
    pub fail_on_advance: Option<usize>,
    /// Advance calls (1-based) that replace the room info snapshot.
    pub bump_info_on_advance: Vec<usize>,
    pub requests: Vec<SentRequest>,
    pub room_info: Observed<RoomInfo>,
    pub room_result: Observed<RoomResult>,
    pub room_list: Observed<RoomList>,
}

impl CoordinationPort for FakeCoordination {
    fn advance(&mut self, _now: Instant) -> Result<(), CoordinationError> {
        self.advances = self.advances.saturating_add(1);
        if self.fail_on_advance == Some(self.advances) {
            return Err(CoordinationError::Decode("injected failure".into()));
        }
        if self.bump_info_on_advance.contains(&self.advances) {
            self.room_info.replace(RoomInfo { members: vec![7], owner_index: 0 });
        }
        Ok(())
    }

    fn create_room(&mut self, options: &RoomCreateOptions) {
        self.requests.push(SentRequest::Create {
            name: options.name.clone(),
            application_id: options.application_id,
            max_members: options.max_members,
        });
    }

    fn join_room(&mut self, room_id: RoomId) {
        self.requests.push(SentRequest::Join(room_id));
    }

    fn list_rooms(&mut self, options: &RoomListOptions) {
        self.requests.push(SentRequest::List {
            application_id: options.application_id,
            maximum_count: options.maximum_count,
        });
    }

    fn ping(&mut self, knowledge: u64) {
        self.requests.push(SentRequest::Ping(knowledge));
    }

    fn room_info(&self) -> &Observed<RoomInfo> {
        &self.room_info
    }

    fn room_result(&self) -> &Observed<RoomResult> {
        &self.room_result
    }

    fn room_list(&self) -> &Observed<RoomList> {
        &self.room_list
    }

    fn phase(&self) -> Phase {
        Phase::Ready
    }

    fn target_phase(&self) -> Phase {
        Phase::Ready
    }
}

/// Connector fake that counts constructions through a shared cell.
#[derive(Debug)]
pub struct FakeConnector {
    pub connects: Rc<Cell<usize>>,
    /// Forwarded to every constructed session.
    pub fail_on_advance: Option<usize>,
    /// Forwarded to every constructed session.
    pub bump_info_on_advance: Vec<usize>,
}

impl FakeConnector {
    /// Connector plus the shared construction counter.
    pub fn counted() -> (Self, Rc<Cell<usize>>) {
        let connects = Rc::new(Cell::new(0));
        let connector = Self {
            connects: Rc::clone(&connects),
            fail_on_advance: None,
            bump_info_on_advance: Vec::new(),
        };
        (connector, connects)
    }
}

impl Connector for FakeConnector {
    type Session = FakeCoordination;

    fn connect(&mut self, _token: SessionToken) -> Result<Self::Session, CoordinationError> {
        self.connects.set(self.connects.get().saturating_add(1));
        Ok(FakeCoordination {
            fail_on_advance: self.fail_on_advance,
            bump_info_on_advance: self.bump_info_on_advance.clone(),
            ..FakeCoordination::default()
        })
    }
}
