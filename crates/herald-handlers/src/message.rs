//! Send-message handler.
//!
//! Three surface syntaxes, tried in order:
//!
//! 1. `tell <recipient> <message>` -- the recipient is found by trying the
//!    first three words, longest candidate first, against a Contacts lookup
//!    round-trip.
//! 2. `message <recipient> <message>` -- same extraction, alternate verb.
//! 3. `say <message> to <recipient>` -- split on the last whole-word ` to `;
//!    without one the whole remainder is the message.
//!
//! A successfully used recipient is remembered for the lifetime of the
//! handler instance, so a follow-up `say thanks` goes to the same person.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use herald_kernel::text;
use herald_kernel::{FieldMap, Handler, Invocation, KernelError, Outcome};

use crate::backend::{self, ScriptBackend};
use crate::error::HandlerError;

/// Contacts lookup used to validate a recipient candidate.  A successful
/// run returns the contact's normalized full name on stdout.
fn lookup_script(candidate: &str) -> String {
    format!(
        "tell application \"Contacts\"\n\
         \tget name of person 1 whose name starts with \"{}\"\n\
         end tell",
        backend::escape(candidate)
    )
}

/// Phone lookup (label preference mobile/iPhone/home/work), iMessage send,
/// then a cmd-tab keystroke to restore the previously foregrounded app.
fn send_script(recipient: &str, message: &str) -> String {
    let recipient = backend::escape(recipient);
    let message = backend::escape(message);
    format!(
        "-- grab the recipient's phone number\n\
         tell application \"Contacts\"\n\
         \tset buddyPhone to value of phone 1 of (person 1 whose name starts with \"{recipient}\") \
         whose (label = \"mobile\" or label = \"iPhone\" or label = \"home\" or label = \"work\")\n\
         end tell\n\
         \n\
         -- send the message over iMessage\n\
         tell application \"Messages\"\n\
         \tset targetService to 1st service whose service type = iMessage\n\
         \tset targetBuddy to buddy buddyPhone of targetService\n\
         \tsend \"{message}\" to targetBuddy\n\
         end tell\n\
         \n\
         tell application \"System Events\" to keystroke tab using command down"
    )
}

// ---------------------------------------------------------------------------
// Invocations
// ---------------------------------------------------------------------------

/// `tell <recipient> <message>` / `message <recipient> <message>`.
///
/// The recipient is not delimited, so extraction is iterative: of the first
/// three words, the longest prefix that passes a Contacts lookup becomes the
/// recipient and the rest of the words become the message.
struct TellInvocation {
    prefix: &'static str,
    backend: Arc<dyn ScriptBackend>,
}

impl TellInvocation {
    fn new(prefix: &'static str, backend: Arc<dyn ScriptBackend>) -> Self {
        Self { prefix, backend }
    }
}

#[async_trait]
impl Invocation for TellInvocation {
    fn recognize(&self, command: &str) -> bool {
        text::strip_prefix_ignore_case(command, self.prefix).is_some()
    }

    async fn parse(&self, command: &str) -> herald_kernel::Result<FieldMap> {
        let rest = text::strip_prefix_ignore_case(command, self.prefix).ok_or_else(|| {
            KernelError::MalformedInput {
                reason: format!("command does not start with `{}`", self.prefix),
            }
        })?;

        let words: Vec<&str> = rest.split_whitespace().collect();
        if words.is_empty() {
            return Err(KernelError::MalformedInput {
                reason: format!("no text after `{}`", self.prefix.trim_end()),
            });
        }

        let mut fields = FieldMap::new();

        // Longest candidate first; at least one word must remain for the
        // message itself.
        let max_take = words.len().saturating_sub(1).min(3);
        for take in (1..=max_take).rev() {
            let candidate = words[..take].join(" ");
            let reply = self.backend.execute(&lookup_script(&candidate)).await;
            if !reply.is_error && !reply.message.trim().is_empty() {
                debug!(
                    candidate = %candidate,
                    resolved = %reply.message.trim(),
                    "recipient validated"
                );
                fields.set("recipient", candidate);
                fields.set("message", words[take..].join(" "));
                return Ok(fields);
            }
            debug!(candidate = %candidate, "candidate did not validate");
        }

        // No candidate validated: the whole remainder is the message and the
        // handler falls back to its remembered recipient.
        fields.set_missing("recipient");
        fields.set("message", words.join(" "));
        Ok(fields)
    }
}

/// `say <message> to <recipient>`.
struct SayToInvocation;

#[async_trait]
impl Invocation for SayToInvocation {
    fn recognize(&self, command: &str) -> bool {
        text::strip_prefix_ignore_case(command, "say ").is_some()
    }

    async fn parse(&self, command: &str) -> herald_kernel::Result<FieldMap> {
        let rest = text::strip_prefix_ignore_case(command, "say ")
            .ok_or_else(|| KernelError::MalformedInput {
                reason: "command does not start with `say `".to_string(),
            })?
            .trim();

        let mut fields = FieldMap::new();

        if text::contains_word(rest, "to")
            && let Some((message, recipient)) = text::split_at_last(rest, " to ")
        {
            fields.set("message", message.trim());
            fields.set("recipient", recipient.trim());
        } else {
            fields.set("message", rest);
            fields.set_missing("recipient");
        }
        Ok(fields)
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Handler for the send-message intent.
pub struct SendMessageHandler {
    invocations: Vec<Box<dyn Invocation>>,
    backend: Arc<dyn ScriptBackend>,
    /// The last recipient a message was successfully sent to.  Cleared only
    /// by dropping the handler; shared across in-flight commands, hence the
    /// lock.
    last_recipient: tokio::sync::Mutex<Option<String>>,
}

impl SendMessageHandler {
    pub fn new(backend: Arc<dyn ScriptBackend>) -> Self {
        Self {
            invocations: vec![
                Box::new(TellInvocation::new("tell ", Arc::clone(&backend))),
                Box::new(TellInvocation::new("message ", Arc::clone(&backend))),
                Box::new(SayToInvocation),
            ],
            backend,
            last_recipient: tokio::sync::Mutex::new(None),
        }
    }

    async fn run(&self, command: &str, invocation: usize) -> Result<Outcome, HandlerError> {
        let inv = self
            .invocations
            .get(invocation)
            .ok_or_else(|| KernelError::UnknownInvocation {
                handler: "send-message".to_string(),
                index: invocation,
            })?;

        let fields = inv.parse(command).await?;
        let message = fields.require("message")?.to_string();

        // Extracted recipient, else the remembered one, else a hard error
        // before any backend call.
        let recipient = match fields.value("recipient") {
            Some(recipient) => Some(recipient.to_string()),
            None => self.last_recipient.lock().await.clone(),
        };
        let Some(recipient) = recipient else {
            return Err(HandlerError::NoRecipient);
        };
        let recipient = recipient.trim().to_string();
        if recipient.is_empty() {
            return Err(HandlerError::NoRecipient);
        }

        let outcome = self
            .backend
            .execute(&send_script(&recipient, &message))
            .await;

        // Only a delivered message updates the memory.
        if !outcome.is_error {
            *self.last_recipient.lock().await = Some(recipient);
        }
        Ok(outcome)
    }
}

#[async_trait]
impl Handler for SendMessageHandler {
    fn name(&self) -> &'static str {
        "send-message"
    }

    fn recognize(&self, command: &str) -> Option<usize> {
        self.invocations.iter().position(|inv| inv.recognize(command))
    }

    async fn handle(&self, command: &str, invocation: usize) -> Outcome {
        match self.run(command, invocation).await {
            Ok(outcome) => outcome,
            Err(e) => e.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
