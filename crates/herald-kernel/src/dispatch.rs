//! Ordered handler dispatch.
//!
//! The dispatcher holds a fixed, ordered list of handlers and tries each in
//! turn; the first handler whose recognition succeeds is asked to handle the
//! command, and its outcome is returned immediately.  The ordering is a
//! compatibility contract: more specific intents must be registered before
//! any catch-all, and reordering changes which intent wins for ambiguous
//! input.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::KernelError;
use crate::handler::{Handler, Outcome};

/// First-match-wins dispatcher over an ordered handler chain.
pub struct Dispatcher {
    handlers: Vec<Arc<dyn Handler>>,
}

impl Dispatcher {
    /// Create a dispatcher over the given handler chain, tried in order.
    #[must_use]
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// Number of handlers in the chain.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatch one command through the chain.
    ///
    /// The first handler to recognize the command handles it; no further
    /// handlers are tried.  If no handler recognizes the command (possible
    /// only without a catch-all in the chain), an error outcome is returned.
    pub async fn dispatch(&self, command: &str) -> Outcome {
        for handler in &self.handlers {
            match handler.recognize(command) {
                Some(invocation) => {
                    debug!(
                        handler = handler.name(),
                        invocation = invocation,
                        "command recognized"
                    );
                    return handler.handle(command, invocation).await;
                }
                None => {
                    debug!(handler = handler.name(), "not recognized, trying next");
                }
            }
        }

        warn!(command = command, "no handler recognized the command");
        Outcome::error(
            KernelError::NoHandlerMatched {
                command: command.to_string(),
            }
            .to_string(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    /// Recognizes commands starting with a fixed prefix and answers with its
    /// own name, so tests can observe which handler won.
    struct StubHandler {
        name: &'static str,
        prefix: &'static str,
    }

    #[async_trait]
    impl Handler for StubHandler {
        fn name(&self) -> &'static str {
            self.name
        }

        fn recognize(&self, command: &str) -> Option<usize> {
            command.starts_with(self.prefix).then_some(0)
        }

        async fn handle(&self, _command: &str, _invocation: usize) -> Outcome {
            Outcome::ok(self.name)
        }
    }

    /// Recognizes everything.
    struct CatchAll;

    #[async_trait]
    impl Handler for CatchAll {
        fn name(&self) -> &'static str {
            "catch-all"
        }

        fn recognize(&self, _command: &str) -> Option<usize> {
            Some(0)
        }

        async fn handle(&self, _command: &str, _invocation: usize) -> Outcome {
            Outcome::ok("catch-all")
        }
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let dispatcher = Dispatcher::new(Vec::new());
        let outcome = dispatcher.dispatch("anything").await;
        assert!(outcome.is_error);
        assert_eq!(
            outcome.message,
            "no handler recognized the command: anything"
        );
    }

    #[tokio::test]
    async fn first_match_wins() {
        let dispatcher = Dispatcher::new(vec![
            Arc::new(StubHandler {
                name: "specific",
                prefix: "tell ",
            }),
            Arc::new(CatchAll),
        ]);

        // Both handlers would accept this; the earlier one must win.
        let outcome = dispatcher.dispatch("tell alice hi").await;
        assert_eq!(outcome.message, "specific");

        // Anything else falls through to the catch-all.
        let outcome = dispatcher.dispatch("weather in oslo").await;
        assert_eq!(outcome.message, "catch-all");
    }

    #[tokio::test]
    async fn unmatched_without_catch_all() {
        let dispatcher = Dispatcher::new(vec![Arc::new(StubHandler {
            name: "specific",
            prefix: "tell ",
        })]);

        let outcome = dispatcher.dispatch("say hi").await;
        assert!(outcome.is_error);
    }
}
