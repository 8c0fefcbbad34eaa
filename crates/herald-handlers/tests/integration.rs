//! Integration tests for the herald-handlers crate.
//!
//! These drive the canonical handler chain end to end through the
//! dispatcher, with a scripted backend standing in for osascript.

use std::sync::Arc;

use herald_handlers::{HandlerConfig, ScriptBackend, ScriptedBackend, standard_handlers};
use herald_kernel::{Dispatcher, Outcome};

fn dispatcher() -> (Arc<ScriptedBackend>, Dispatcher) {
    let backend = Arc::new(ScriptedBackend::new());
    let handlers = standard_handlers(
        &HandlerConfig::default(),
        Arc::clone(&backend) as Arc<dyn ScriptBackend>,
    );
    (backend, Dispatcher::new(handlers))
}

#[tokio::test]
async fn chain_has_five_handlers() {
    let (_backend, dispatcher) = dispatcher();
    assert_eq!(dispatcher.handler_count(), 5);
}

#[tokio::test]
async fn raw_script_round_trips_the_payload() {
    let (backend, dispatcher) = dispatcher();
    backend.push_reply(Outcome::ok("42"));

    let outcome = dispatcher.dispatch("applescript:return 6 * 7").await;
    assert!(!outcome.is_error);
    assert_eq!(outcome.message, "42");
    assert_eq!(backend.scripts(), vec!["return 6 * 7"]);
}

#[tokio::test]
async fn message_beats_the_browser_catch_all() {
    let (backend, dispatcher) = dispatcher();

    // "say ..." would also be a perfectly fine search query; the message
    // handler must win on priority.
    let outcome = dispatcher.dispatch("say hello there to alvin").await;
    assert!(!outcome.is_error);

    let scripts = backend.scripts();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contains("iMessage"));
    assert!(!scripts[0].contains("open location"));
}

#[tokio::test]
async fn missing_recipient_surfaces_the_fixed_diagnostic() {
    let (backend, dispatcher) = dispatcher();

    let outcome = dispatcher.dispatch("say nothing useful").await;
    assert!(outcome.is_error);
    assert_eq!(outcome.message, "No valid recipient specified");
    assert!(backend.scripts().is_empty());
}

#[tokio::test]
async fn recipient_memory_spans_commands() {
    let (backend, dispatcher) = dispatcher();

    assert!(!dispatcher.dispatch("say hi to alvin").await.is_error);
    assert!(!dispatcher.dispatch("say second thought").await.is_error);

    let scripts = backend.scripts();
    assert_eq!(scripts.len(), 2);
    assert!(scripts[1].contains("starts with \"alvin\""));
    assert!(scripts[1].contains("send \"second thought\""));
}

#[tokio::test]
async fn add_event_creates_in_the_configured_calendar() {
    let (backend, dispatcher) = dispatcher();

    let outcome = dispatcher
        .dispatch("add event Coffee at Blue Bottle on 4/20 9-9:30")
        .await;
    assert!(!outcome.is_error);

    let scripts = backend.scripts();
    assert_eq!(scripts.len(), 1);
    let script = &scripts[0];
    assert!(script.contains("tell calendar \"Home\""));
    assert!(script.contains("summary:\"Coffee\""));
    assert!(script.contains("location:\"Blue Bottle\""));
    // The 9-9:30 range collapses to its start and infers half an hour.
    assert!(script.contains("9:00"));
    assert!(script.contains("(0.5 * hours)"));
}

#[tokio::test]
async fn availabilities_reports_backend_output() {
    let (backend, dispatcher) = dispatcher();
    backend.push_reply(Outcome::ok(" 9:00 - 10:30\n13:00 - 14:00"));

    let outcome = dispatcher.dispatch("availabilities").await;
    assert!(!outcome.is_error);
    assert_eq!(outcome.message, " 9:00 - 10:30\n13:00 - 14:00");
}

#[tokio::test]
async fn everything_else_goes_to_the_browser() {
    let (backend, dispatcher) = dispatcher();

    dispatcher.dispatch("google.com").await;
    dispatcher.dispatch("define bear").await;

    let scripts = backend.scripts();
    assert_eq!(scripts[0], "open location \"http://google.com\"");
    assert_eq!(
        scripts[1],
        "open location \"https://www.google.com/search?q=define+bear\""
    );
}

#[tokio::test]
async fn backend_errors_pass_through_unmodified() {
    let (backend, dispatcher) = dispatcher();
    backend.push_reply(Outcome::error(
        "Calendar got an error: calendar \"Home\" doesn't exist",
    ));

    let outcome = dispatcher.dispatch("add event Demo on 4/20 3 PM").await;
    assert!(outcome.is_error);
    assert_eq!(
        outcome.message,
        "Calendar got an error: calendar \"Home\" doesn't exist"
    );
}
