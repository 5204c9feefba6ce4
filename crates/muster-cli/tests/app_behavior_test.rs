//! Behavior tests for the session orchestrator.
//!
//! # Test Strategy
//!
//! Each test scripts what the user types (through the console fake), drives
//! the orchestrator tick by tick, and checks the oracle: requests recorded
//! on the coordination port, text printed above the prompt, and the
//! shutdown flag.

#[allow(dead_code)]
mod common;

use std::{
    sync::{Arc, atomic::AtomicBool},
    time::Instant,
};

use common::{FakeConnector, FakeConsole, FakeIdentity, SentRequest, Step};
use muster_cli::{App, FatalError};

type TestApp = App<FakeConsole, FakeIdentity, FakeConnector>;

fn make_app(
    console: FakeConsole,
    identity: FakeIdentity,
    connector: FakeConnector,
) -> (TestApp, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    (App::new(console, identity, connector, Arc::clone(&shutdown)), shutdown)
}

fn run_ticks(app: &mut TestApp, count: usize) -> Result<(), FatalError> {
    let now = Instant::now();
    for _ in 0..count {
        app.tick(now)?;
    }
    Ok(())
}

fn recorded_requests(app: &TestApp) -> Vec<SentRequest> {
    app.coordination().map(|c| c.requests.clone()).unwrap_or_default()
}

#[test]
fn coordination_is_constructed_exactly_once() -> Result<(), FatalError> {
    let (connector, connects) = FakeConnector::counted();
    let (mut app, _) = make_app(FakeConsole::default(), FakeIdentity::logged_in(5), connector);

    run_ticks(&mut app, 150)?;

    assert_eq!(connects.get(), 1);
    assert!(app.coordination().is_some());
    Ok(())
}

#[test]
fn nothing_is_constructed_while_identity_is_down() -> Result<(), FatalError> {
    let (connector, connects) = FakeConnector::counted();
    let (mut app, _) = make_app(FakeConsole::default(), FakeIdentity::never(), connector);

    run_ticks(&mut app, 50)?;

    assert_eq!(connects.get(), 0);
    assert!(app.coordination().is_none());
    Ok(())
}

#[test]
fn premature_commands_notice_and_send_nothing() -> Result<(), FatalError> {
    let (connector, connects) = FakeConnector::counted();
    let console = FakeConsole::scripted([
        Step::Complete("room create --name Foo"),
        Step::Complete("room join --id 4"),
        Step::Complete("room list"),
        Step::Complete("ping"),
    ]);
    let (mut app, _) = make_app(console, FakeIdentity::never(), connector);

    run_ticks(&mut app, 4)?;

    assert_eq!(connects.get(), 0);
    assert!(app.coordination().is_none());
    let printed = app.console().printed();
    assert_eq!(printed.matches("coordination not started yet").count(), 4);
    Ok(())
}

#[test]
fn room_create_issues_exactly_one_request() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Complete("room create --name Foo")]);
    let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 1)?;

    assert_eq!(
        recorded_requests(&app),
        vec![SentRequest::Create { name: "Foo".into(), application_id: 1, max_members: 8 }]
    );
    assert!(app.console().printed().contains("room create: 'Foo'"));
    Ok(())
}

#[test]
fn each_verb_maps_to_one_outbound_request() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([
        Step::Complete("room join --id 9"),
        Step::Complete("room list --maximumCount 3"),
        Step::Complete("ping --knowledge 12"),
    ]);
    let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 3)?;

    assert_eq!(
        recorded_requests(&app),
        vec![
            SentRequest::Join(9),
            SentRequest::List { application_id: None, maximum_count: 3 },
            SentRequest::Ping(12),
        ]
    );
    Ok(())
}

#[test]
fn unknown_command_prints_a_diagnostic_and_calls_nothing() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Complete("bogus verb")]);
    let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 1)?;

    assert!(recorded_requests(&app).is_empty());
    assert!(app.console().printed().contains("unknown command 'bogus' (-1)"));
    Ok(())
}

#[test]
fn malformed_options_print_a_diagnostic_and_call_nothing() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Complete("room join --id twelve")]);
    let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 1)?;

    assert!(recorded_requests(&app).is_empty());
    assert!(app.console().printed().contains("(-3)"));
    Ok(())
}

#[test]
fn empty_line_dispatches_nothing() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Complete("   ")]);
    let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 1)?;

    assert!(recorded_requests(&app).is_empty());
    assert!(app.console().printed().is_empty());
    Ok(())
}

#[test]
fn quit_sets_the_shutdown_flag() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Complete("quit")]);
    let (mut app, shutdown) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 1)?;

    assert!(shutdown.load(std::sync::atomic::Ordering::Relaxed));
    assert!(app.shutdown_requested());
    Ok(())
}

#[test]
fn console_interrupt_sets_the_shutdown_flag() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Interrupt]);
    let (mut app, shutdown) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 1)?;

    assert!(shutdown.load(std::sync::atomic::Ordering::Relaxed));
    Ok(())
}

#[test]
fn help_renders_the_command_tree_without_calling_handlers() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Complete("help")]);
    let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);

    run_ticks(&mut app, 1)?;

    assert!(recorded_requests(&app).is_empty());
    let printed = app.console().printed();
    assert!(printed.contains("room create"));
    assert!(printed.contains("--name"));
    assert!(printed.contains("quit"));
    Ok(())
}

#[test]
fn state_reports_both_lifecycle_stages() -> Result<(), FatalError> {
    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Complete("state")]);
    let (mut app, _) = make_app(console, FakeIdentity::never(), connector);
    run_ticks(&mut app, 1)?;
    let printed = app.console().printed();
    assert!(printed.contains("identity: logging in"));
    assert!(printed.contains("coordination: not started yet"));

    let (connector, _) = FakeConnector::counted();
    let console = FakeConsole::scripted([Step::Idle, Step::Complete("state")]);
    let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);
    run_ticks(&mut app, 2)?;
    let printed = app.console().printed();
    assert!(printed.contains("identity: logged in"));
    assert!(printed.contains("coordination: ready (target: ready)"));
    Ok(())
}

#[test]
fn fatal_coordination_failure_propagates_from_tick() {
    let (mut connector, _) = FakeConnector::counted();
    connector.fail_on_advance = Some(1);
    let (mut app, _) = make_app(FakeConsole::default(), FakeIdentity::logged_in(1), connector);

    let result = app.tick(Instant::now());

    assert!(matches!(result, Err(FatalError::Coordination(_))));
}

#[test]
fn render_is_transparent_to_the_eventual_dispatch() -> Result<(), FatalError> {
    // Type "roo", let an asynchronous room-info render land, finish typing
    // "m list" and press return. The dispatch must be identical to the run
    // with no intervening render.
    fn run_scenario(bump_on: Vec<usize>) -> Result<(Vec<SentRequest>, String), FatalError> {
        let (mut connector, _) = FakeConnector::counted();
        connector.bump_info_on_advance = bump_on;
        let console = FakeConsole::scripted([Step::Partial("roo"), Step::Complete("m list")]);
        let (mut app, _) = make_app(console, FakeIdentity::logged_in(1), connector);
        run_ticks(&mut app, 2)?;
        Ok((recorded_requests(&app), app.console().printed()))
    }

    let (control_requests, control_printed) = run_scenario(vec![])?;
    let (render_requests, render_printed) = run_scenario(vec![2])?;

    assert_eq!(control_requests, render_requests);
    assert_eq!(
        control_requests,
        vec![SentRequest::List { application_id: None, maximum_count: 16 }]
    );
    assert!(render_printed.contains("room info updated"));
    assert!(!control_printed.contains("room info updated"));
    assert!(!render_printed.contains("unknown command"));
    Ok(())
}
