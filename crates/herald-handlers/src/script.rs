//! Raw script handler -- pass-through execution of user-supplied scripts.
//!
//! Anything after the `applescript:` prefix is sent to the backend verbatim;
//! the backend's outcome is returned unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use herald_kernel::{Handler, Invocation, Outcome, PrefixInvocation};

use crate::backend::ScriptBackend;

/// The surface prefix.  Matching is case-insensitive, like every other
/// handler prefix.
const PREFIX: &str = "applescript:";

/// Handler for the raw-script escape hatch.
pub struct RawScriptHandler {
    invocations: Vec<Box<dyn Invocation>>,
    backend: Arc<dyn ScriptBackend>,
}

impl RawScriptHandler {
    pub fn new(backend: Arc<dyn ScriptBackend>) -> Self {
        Self {
            invocations: vec![Box::new(PrefixInvocation::new(PREFIX, "script"))],
            backend,
        }
    }
}

#[async_trait]
impl Handler for RawScriptHandler {
    fn name(&self) -> &'static str {
        "raw-script"
    }

    fn recognize(&self, command: &str) -> Option<usize> {
        self.invocations.iter().position(|inv| inv.recognize(command))
    }

    async fn handle(&self, command: &str, invocation: usize) -> Outcome {
        let Some(inv) = self.invocations.get(invocation) else {
            return Outcome::error(format!("raw-script has no invocation {invocation}"));
        };

        let fields = match inv.parse(command).await {
            Ok(fields) => fields,
            Err(e) => return Outcome::error(e.to_string()),
        };
        let script = match fields.require("script") {
            Ok(script) => script,
            Err(e) => return Outcome::error(e.to_string()),
        };

        debug!(bytes = script.len(), "forwarding raw script");
        self.backend.execute(script).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;

    fn handler() -> (Arc<ScriptedBackend>, RawScriptHandler) {
        let backend = Arc::new(ScriptedBackend::new());
        let handler = RawScriptHandler::new(Arc::clone(&backend) as Arc<dyn ScriptBackend>);
        (backend, handler)
    }

    #[tokio::test]
    async fn payload_reaches_backend_unmodified() {
        let (backend, handler) = handler();

        let command = r#"applescript:tell application "Finder" to activate"#;
        let idx = handler.recognize(command).expect("should recognize");
        handler.handle(command, idx).await;

        // Everything after the first colon, byte for byte.
        assert_eq!(
            backend.scripts(),
            vec![r#"tell application "Finder" to activate"#]
        );
    }

    #[tokio::test]
    async fn backend_outcome_is_returned_unchanged() {
        let (backend, handler) = handler();
        backend.push_reply(Outcome::error("syntax error near line 1"));

        let outcome = handler.handle("applescript:not a script", 0).await;
        assert!(outcome.is_error);
        assert_eq!(outcome.message, "syntax error near line 1");
    }

    #[test]
    fn only_the_prefix_is_recognized() {
        let (_backend, handler) = handler();
        assert!(handler.recognize("applescript:beep").is_some());
        assert!(handler.recognize("APPLESCRIPT:beep").is_some());
        assert!(handler.recognize("run applescript:beep").is_none());
        assert!(handler.recognize("beep").is_none());
    }

    #[tokio::test]
    async fn embedded_colons_stay_in_the_payload() {
        let (backend, handler) = handler();
        handler.handle("applescript:a:b:c", 0).await;
        assert_eq!(backend.scripts(), vec!["a:b:c"]);
    }
}
