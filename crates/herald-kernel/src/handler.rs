//! Core handler and invocation traits and supporting types.
//!
//! A **handler** is a named intent (send a message, run a script, add a
//! calendar event, ...) that owns an ordered list of **invocations** -- one
//! recognizer+extractor per surface syntax the intent accepts.  Recognition
//! returns the index of the matching invocation, and that index is threaded
//! explicitly back into [`Handler::handle`]; there is no hidden "last
//! matched" slot, so a handler instance can serve concurrent commands
//! without races.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};
use crate::text;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The `(is_error, message)` pair returned by every handler and by the
/// dispatcher.
///
/// On success `message` is the raw backend output (possibly empty); on
/// failure it is a human-readable diagnostic.  The host decides whether to
/// display, log, or ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Whether the command failed.
    pub is_error: bool,
    /// Backend output on success, diagnostic text on failure.
    pub message: String,
}

impl Outcome {
    /// A successful outcome carrying the backend's output.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            is_error: false,
            message: message.into(),
        }
    }

    /// A failed outcome carrying a diagnostic message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldMap
// ---------------------------------------------------------------------------

/// Named fields extracted from a command by an invocation.
///
/// A field can be in three states, and callers must be able to tell them
/// apart: absent entirely, present but null, or present with a value (which
/// may be the empty string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    fields: HashMap<String, Option<String>>,
}

impl FieldMap {
    /// Create an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a concrete value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), Some(value.into()));
    }

    /// Mark a field as present but without a value.
    pub fn set_missing(&mut self, name: impl Into<String>) {
        self.fields.insert(name.into(), None);
    }

    /// Look up a field.  `None` means the key is absent; `Some(None)` means
    /// the key exists but carries no value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.fields.get(name).map(|v| v.as_deref())
    }

    /// The field's value, treating "absent" and "null" alike.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    /// The field's value, or a [`KernelError::MissingField`] if it is absent
    /// or null.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.value(name).ok_or_else(|| KernelError::MissingField {
            field: name.to_string(),
        })
    }

    /// Number of keys present (valued or null).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the map holds no keys at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A single recognize+extract rule for one surface syntax of a command.
///
/// Invocations are stateless apart from static configuration (a fixed
/// prefix, a backend handle for validation round-trips).  `parse` is only
/// called after `recognize` returned `true` for the same command text.
#[async_trait]
pub trait Invocation: Send + Sync {
    /// Whether this surface syntax matches the raw command.
    fn recognize(&self, command: &str) -> bool;

    /// Extract named fields from the command.
    ///
    /// Extraction may consult external services (e.g. a contact lookup) and
    /// is therefore async.  Any failure is a [`KernelError::MalformedInput`]
    /// class error, never a panic.
    async fn parse(&self, command: &str) -> Result<FieldMap>;
}

/// A named intent owning an ordered list of invocations.
///
/// Invocation priority is list order; [`Handler::recognize`] returns the
/// index of the first invocation that matches, and the dispatcher threads
/// that index into [`Handler::handle`].
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Index of the first invocation recognizing the command, if any.
    fn recognize(&self, command: &str) -> Option<usize>;

    /// Parse the command with the given invocation and perform the intent.
    ///
    /// Must only be called with an index previously returned by
    /// [`Handler::recognize`] for the same command text.
    async fn handle(&self, command: &str, invocation: usize) -> Outcome;
}

// ---------------------------------------------------------------------------
// PrefixInvocation
// ---------------------------------------------------------------------------

/// The workhorse invocation: a case-insensitive literal prefix, with the
/// rest of the command captured verbatim into a single named field.
pub struct PrefixInvocation {
    prefix: &'static str,
    field: &'static str,
}

impl PrefixInvocation {
    /// A rule matching `prefix` and capturing the remainder as `field`.
    #[must_use]
    pub fn new(prefix: &'static str, field: &'static str) -> Self {
        Self { prefix, field }
    }

    /// The literal prefix this rule matches.
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }
}

#[async_trait]
impl Invocation for PrefixInvocation {
    fn recognize(&self, command: &str) -> bool {
        text::strip_prefix_ignore_case(command, self.prefix).is_some()
    }

    async fn parse(&self, command: &str) -> Result<FieldMap> {
        let rest = text::strip_prefix_ignore_case(command, self.prefix).ok_or_else(|| {
            KernelError::MalformedInput {
                reason: format!("command does not start with `{}`", self.prefix),
            }
        })?;

        let mut fields = FieldMap::new();
        fields.set(self.field, rest);
        Ok(fields)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_constructors() {
        let ok = Outcome::ok("done");
        assert!(!ok.is_error);
        assert_eq!(ok.message, "done");

        let err = Outcome::error("boom");
        assert!(err.is_error);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn field_map_distinguishes_absent_null_and_empty() {
        let mut fields = FieldMap::new();
        fields.set("message", "");
        fields.set_missing("recipient");

        // Present with an empty value.
        assert_eq!(fields.get("message"), Some(Some("")));
        // Present but null.
        assert_eq!(fields.get("recipient"), Some(None));
        // Absent entirely.
        assert_eq!(fields.get("subject"), None);

        // `value` folds null and absent together.
        assert_eq!(fields.value("message"), Some(""));
        assert_eq!(fields.value("recipient"), None);
        assert_eq!(fields.value("subject"), None);
    }

    #[test]
    fn field_map_require_reports_missing() {
        let mut fields = FieldMap::new();
        fields.set_missing("recipient");

        let err = fields.require("recipient").unwrap_err();
        assert!(matches!(err, KernelError::MissingField { field } if field == "recipient"));
    }

    #[tokio::test]
    async fn prefix_invocation_is_case_insensitive() {
        let inv = PrefixInvocation::new("applescript:", "script");

        assert!(inv.recognize("applescript:beep"));
        assert!(inv.recognize("AppleScript:beep"));
        assert!(!inv.recognize("apple script: beep"));

        let fields = inv.parse("APPLESCRIPT:display dialog \"hi\"").await.unwrap();
        assert_eq!(fields.value("script"), Some("display dialog \"hi\""));
    }

    #[tokio::test]
    async fn prefix_invocation_keeps_remainder_verbatim() {
        let inv = PrefixInvocation::new("tell ", "rest");
        let fields = inv.parse("tell  alice   hi").await.unwrap();
        // No trimming: leading whitespace after the prefix is preserved.
        assert_eq!(fields.value("rest"), Some(" alice   hi"));
    }
}
