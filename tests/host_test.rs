//! Tests for the Host lifecycle

mod common;

use std::sync::atomic::Ordering;

use cmdhost::application::{ApplicationError, Host, HostState, SourceStatus};
use cmdhost::config::Settings;
use cmdhost::domain::DomainError;
use cmdhost::util::testing::init_test_setup;
use cmdhost::CommandResult;

use common::{args, TestApp};

fn started(app: TestApp) -> Host<TestApp> {
    let mut host = Host::new(app, Settings::default());
    host.start().expect("start host");
    host
}

#[test]
fn given_new_host_when_started_then_ready_with_seeded_context() {
    // Arrange
    init_test_setup();
    let mut host = Host::new(TestApp::default(), Settings::default());
    assert_eq!(host.state(), HostState::Uninitialized);

    // Act
    host.start().unwrap();

    // Assert
    assert_eq!(host.state(), HostState::Ready);
    let ctx = host.context().unwrap();
    assert_eq!(ctx.get_int("timeout"), 30);
    assert_eq!(ctx.host().name, "test-app");
    assert_eq!(ctx.host().version, "1.2.3");
    assert_eq!(ctx.host().command_namespace, common::NAMESPACE);
    assert_eq!(
        host.seed_report().unwrap().embedded,
        SourceStatus::Loaded { keys: 3 }
    );
    assert_eq!(host.seed_report().unwrap().external, SourceStatus::Skipped);
}

#[test]
fn given_login_with_user_when_invoked_then_context_holds_user() {
    // Arrange
    init_test_setup();
    let mut host = started(TestApp::default());

    // Act
    let result = host.invoke("login", &args(&["-u", "alice"])).unwrap();

    // Assert
    assert_eq!(result, CommandResult::Ok);
    assert_eq!(host.state(), HostState::Completed);
    assert_eq!(host.context().unwrap().get_string("loggedInUser"), Some("alice"));
}

#[test]
fn given_long_option_when_invoked_then_parsed_like_short_one() {
    let mut host = started(TestApp::default());

    host.invoke("login", &args(&["--user", "bob"])).unwrap();

    assert_eq!(host.context().unwrap().get_string("loggedInUser"), Some("bob"));
}

#[test]
fn given_unknown_command_when_invoked_then_error_and_context_unchanged() {
    // Arrange
    init_test_setup();
    let mut host = started(TestApp::default());
    let keys_before: Vec<String> = host
        .context()
        .unwrap()
        .keys()
        .into_iter()
        .map(String::from)
        .collect();

    // Act
    let err = host.invoke("logoff", &[]).unwrap_err();

    // Assert
    match err {
        ApplicationError::UnknownCommand { name, known } => {
            assert_eq!(name, "logoff");
            assert!(known.contains(&"login".to_string()));
        }
        other => panic!("expected UnknownCommand, got {other:?}"),
    }
    assert_eq!(host.state(), HostState::Ready);
    let keys_after: Vec<String> = host
        .context()
        .unwrap()
        .keys()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(keys_before, keys_after);
}

#[test]
fn given_wrong_case_when_invoked_then_unknown_command() {
    let mut host = started(TestApp::default());

    let err = host.invoke("LOGIN", &args(&["-u", "alice"])).unwrap_err();

    assert!(matches!(err, ApplicationError::UnknownCommand { .. }));
}

#[test]
fn given_missing_required_option_when_invoked_then_argument_error_and_still_ready() {
    // Arrange
    let mut host = started(TestApp::default());

    // Act
    let err = host.invoke("login", &[]).unwrap_err();

    // Assert
    match err {
        ApplicationError::Arguments(e) => assert!(e.use_stderr()),
        other => panic!("expected Arguments, got {other:?}"),
    }
    assert_eq!(host.state(), HostState::Ready);
    assert!(!host.context().unwrap().contains_key("loggedInUser"));
}

#[test]
fn given_command_failure_when_invoked_then_result_carries_message_and_code() {
    let mut host = started(TestApp::default());

    let result = host.invoke("deny", &args(&["--code", "3"])).unwrap();

    assert_eq!(result.message(), Some("access denied"));
    assert_eq!(result.exit_code(), 3);
    assert_eq!(host.state(), HostState::Completed);
}

#[test]
fn given_command_error_when_invoked_then_host_failed() {
    // Arrange
    init_test_setup();
    let mut host = started(TestApp::default());

    // Act
    let err = host.invoke("broken", &[]).unwrap_err();

    // Assert
    match err {
        ApplicationError::CommandAborted { command, message } => {
            assert_eq!(command, "broken");
            assert_eq!(message, "backend unreachable");
        }
        other => panic!("expected CommandAborted, got {other:?}"),
    }
    assert_eq!(host.state(), HostState::Failed);
    // side effects before the error are kept
    assert!(host.context().unwrap().get_bool("touched"));
}

#[test]
fn given_panicking_command_when_invoked_then_host_failed_and_shutdown_still_runs() {
    // Arrange
    init_test_setup();
    let (app, calls) = TestApp::counted();
    let mut host = started(app);

    // Act
    let err = host.invoke("crash", &[]).unwrap_err();
    host.shutdown();

    // Assert
    match err {
        ApplicationError::CommandAborted { message, .. } => {
            assert_eq!(message, "crash requested")
        }
        other => panic!("expected CommandAborted, got {other:?}"),
    }
    assert_eq!(host.state(), HostState::Failed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn given_type_mismatch_in_command_when_invoked_then_aborted() {
    let mut host = started(TestApp::default());

    let err = host.invoke("misread", &[]).unwrap_err();

    match err {
        ApplicationError::CommandAborted { message, .. } => {
            assert!(message.contains("client.name"), "message: {message}")
        }
        other => panic!("expected CommandAborted, got {other:?}"),
    }
}

#[test]
fn given_completed_host_when_invoked_again_then_invalid_state() {
    let mut host = started(TestApp::default());
    host.invoke("login", &args(&["-u", "alice"])).unwrap();

    let err = host.invoke("login", &args(&["-u", "bob"])).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::InvalidState {
            expected: "ready",
            actual: "completed"
        }
    ));
    assert_eq!(host.context().unwrap().get_string("loggedInUser"), Some("alice"));
}

#[test]
fn given_unstarted_host_when_invoked_then_invalid_state() {
    let mut host = Host::new(TestApp::default(), Settings::default());

    let err = host.invoke("login", &args(&["-u", "alice"])).unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidState { .. }));
}

#[test]
fn given_started_host_when_started_again_then_invalid_state() {
    let mut host = started(TestApp::default());

    let err = host.start().unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidState { .. }));
    assert_eq!(host.state(), HostState::Ready);
}

#[test]
fn given_context_factory_failure_when_started_then_error_and_never_ready() {
    // Arrange
    init_test_setup();
    let (mut app, calls) = TestApp::counted();
    app.fail_context = true;
    let mut host = Host::new(app, Settings::default());

    // Act
    let err = host.start().unwrap_err();
    host.shutdown();

    // Assert
    assert!(matches!(err, ApplicationError::Startup { .. }));
    assert_eq!(host.state(), HostState::Uninitialized);
    assert!(host.context().is_none());
    assert!(host.registry().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn given_duplicate_command_names_when_started_then_startup_error() {
    // Arrange
    let mut app = TestApp::default();
    app.declare = common::duplicate_commands;
    let mut host = Host::new(app, Settings::default());

    // Act
    let err = host.start().unwrap_err();

    // Assert
    match err {
        ApplicationError::Domain(DomainError::DuplicateCommand { name, .. }) => {
            assert_eq!(name, "login")
        }
        other => panic!("expected DuplicateCommand, got {other:?}"),
    }
    assert_eq!(host.state(), HostState::ContextBuilt);
    assert!(host.registry().is_none());
}

#[test]
fn given_host_when_shutdown_twice_then_hook_runs_once() {
    let (app, calls) = TestApp::counted();
    let mut host = started(app);

    host.shutdown();
    host.shutdown();

    assert!(host.is_shut_down());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn given_failing_shutdown_hook_when_shutdown_then_swallowed() {
    let (mut app, calls) = TestApp::counted();
    app.fail_shutdown = true;
    let mut host = started(app);

    host.shutdown();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(host.is_shut_down());
}
