//! Script backend adapter -- executes generated AppleScript blocks.
//!
//! The handlers only *generate* instruction blocks; execution is delegated
//! to a [`ScriptBackend`].  The production backend shells out to
//! `osascript`, feeding the script over stdin and applying a timeout.  The
//! [`ScriptedBackend`] records every script and answers from a queue of
//! canned outcomes -- it backs the test suites and the CLI's dry-run mode.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use herald_kernel::Outcome;

/// Default time limit for one script execution in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Executes one instruction block and reports `(is_error, output)`.
///
/// The call suspends the caller until the automation completes or errors;
/// the core defines no cancellation beyond the backend's own timeout.
#[async_trait]
pub trait ScriptBackend: Send + Sync {
    async fn execute(&self, script: &str) -> Outcome;
}

/// Escape user text for inclusion inside an AppleScript string literal.
///
/// Only what is needed to keep the generated block syntactically valid:
/// backslashes, double quotes, and line breaks.
pub fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

// ---------------------------------------------------------------------------
// OsaBackend
// ---------------------------------------------------------------------------

/// Production backend: runs scripts through the `osascript` interpreter.
pub struct OsaBackend {
    timeout_secs: u64,
}

impl OsaBackend {
    /// Create a backend with the default 30 s timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the execution time limit.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for OsaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptBackend for OsaBackend {
    async fn execute(&self, script: &str) -> Outcome {
        debug!(bytes = script.len(), "executing script via osascript");

        // `osascript -` reads the whole script from stdin, which avoids any
        // argv length limit on long generated blocks.
        let mut child = match tokio::process::Command::new("osascript")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return Outcome::error(format!("failed to spawn osascript: {e}")),
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(script.as_bytes()).await {
                return Outcome::error(format!("failed to write script to osascript: {e}"));
            }
        }

        let result = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    debug!("script completed");
                    Outcome::ok(stdout)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    debug!(code = output.status.code(), "script failed");
                    Outcome::error(stderr)
                }
            }
            Ok(Err(e)) => Outcome::error(format!("osascript process error: {e}")),
            Err(_) => {
                // Timeout -- the child is killed on drop via kill_on_drop.
                warn!(timeout_secs = self.timeout_secs, "script timed out");
                Outcome::error(format!(
                    "script timed out after {}s",
                    self.timeout_secs
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// A backend that never touches the OS: records every script it receives
/// and answers from a queue of canned outcomes (falling back to an empty
/// success).  Used by tests and by dry runs.
#[derive(Default)]
pub struct ScriptedBackend {
    scripts: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Outcome>>,
}

impl ScriptedBackend {
    /// A backend that answers every script with `Outcome::ok("")`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome returned for the next unanswered script.
    pub fn push_reply(&self, outcome: Outcome) {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Every script received so far, in execution order.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ScriptBackend for ScriptedBackend {
    async fn execute(&self, script: &str) -> Outcome {
        self.scripts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(script.to_string());
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Outcome::ok(""))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_quotes_and_backslashes() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"C:\path"), r"C:\\path");
        assert_eq!(escape("two\nlines"), "two\\nlines");
    }

    #[tokio::test]
    async fn scripted_backend_records_and_replies_in_order() {
        let backend = ScriptedBackend::new();
        backend.push_reply(Outcome::ok("first"));
        backend.push_reply(Outcome::error("second"));

        assert_eq!(backend.execute("script one").await, Outcome::ok("first"));
        assert_eq!(backend.execute("script two").await, Outcome::error("second"));
        // Queue exhausted: defaults to empty success.
        assert_eq!(backend.execute("script three").await, Outcome::ok(""));

        assert_eq!(
            backend.scripts(),
            vec!["script one", "script two", "script three"]
        );
    }
}
