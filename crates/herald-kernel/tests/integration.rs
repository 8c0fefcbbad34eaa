//! Integration tests for the herald-kernel crate.
//!
//! These exercise the dispatcher, the invocation traits, and the field map
//! as integrated pieces: handlers built from real invocation lists, driven
//! through `Dispatcher::dispatch`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use herald_kernel::{
    Dispatcher, FieldMap, Handler, Invocation, Outcome, PrefixInvocation, Result,
};

/// A handler assembled from an ordered invocation list, echoing the parsed
/// field back as its outcome.  Counts how often `handle` runs so tests can
/// assert the single-dispatch property.
struct EchoHandler {
    name: &'static str,
    field: &'static str,
    invocations: Vec<Box<dyn Invocation>>,
    handled: AtomicUsize,
}

impl EchoHandler {
    fn new(name: &'static str, field: &'static str, invocations: Vec<Box<dyn Invocation>>) -> Self {
        Self {
            name,
            field,
            invocations,
            handled: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Handler for EchoHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn recognize(&self, command: &str) -> Option<usize> {
        self.invocations.iter().position(|inv| inv.recognize(command))
    }

    async fn handle(&self, command: &str, invocation: usize) -> Outcome {
        self.handled.fetch_add(1, Ordering::SeqCst);
        let Some(inv) = self.invocations.get(invocation) else {
            return Outcome::error(format!("no invocation {invocation}"));
        };
        match inv.parse(command).await {
            Ok(fields) => match fields.require(self.field) {
                Ok(value) => Outcome::ok(value),
                Err(e) => Outcome::error(e.to_string()),
            },
            Err(e) => Outcome::error(e.to_string()),
        }
    }
}

/// An invocation that recognizes everything and captures the whole command.
struct AnyInvocation;

#[async_trait]
impl Invocation for AnyInvocation {
    fn recognize(&self, _command: &str) -> bool {
        true
    }

    async fn parse(&self, command: &str) -> Result<FieldMap> {
        let mut fields = FieldMap::new();
        fields.set("query", command);
        Ok(fields)
    }
}

fn chain() -> (Arc<EchoHandler>, Arc<EchoHandler>, Dispatcher) {
    let script = Arc::new(EchoHandler::new(
        "raw-script",
        "script",
        vec![Box::new(PrefixInvocation::new("applescript:", "script"))],
    ));
    let browser = Arc::new(EchoHandler::new(
        "browser",
        "query",
        vec![Box::new(AnyInvocation)],
    ));

    let dispatcher = Dispatcher::new(vec![
        Arc::clone(&script) as Arc<dyn Handler>,
        Arc::clone(&browser) as Arc<dyn Handler>,
    ]);
    (script, browser, dispatcher)
}

#[tokio::test]
async fn specific_handler_beats_catch_all() {
    let (script, browser, dispatcher) = chain();

    let outcome = dispatcher.dispatch("applescript:beep 2").await;
    assert!(!outcome.is_error);
    assert_eq!(outcome.message, "beep 2");
    assert_eq!(script.handled.load(Ordering::SeqCst), 1);
    assert_eq!(browser.handled.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn catch_all_takes_the_rest() {
    let (script, browser, dispatcher) = chain();

    let outcome = dispatcher.dispatch("define bear").await;
    assert!(!outcome.is_error);
    assert_eq!(outcome.message, "define bear");
    assert_eq!(script.handled.load(Ordering::SeqCst), 0);
    assert_eq!(browser.handled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exactly_one_handler_runs_per_command() {
    let (script, browser, dispatcher) = chain();

    for command in ["applescript:beep", "google.com", "applescript:say hi", "x"] {
        dispatcher.dispatch(command).await;
    }

    assert_eq!(
        script.handled.load(Ordering::SeqCst) + browser.handled.load(Ordering::SeqCst),
        4
    );
}

#[test]
fn outcome_serializes_for_hosts() {
    // Hosts consume outcomes as JSON; the shape is part of the contract.
    let outcome = Outcome::error("No valid recipient specified");
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["is_error"], true);
    assert_eq!(json["message"], "No valid recipient specified");
}
