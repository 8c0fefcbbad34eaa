//! Concrete command handlers for Herald.
//!
//! This crate supplies the intents behind the `herald-kernel` dispatch
//! framework:
//!
//! - **[`message`]** -- send an iMessage (`tell`/`message`/`say ... to`),
//!   with recipient validation round-trips and a remembered last recipient.
//! - **[`script`]** -- raw AppleScript pass-through (`applescript:`).
//! - **[`event`]** -- the calendar-event tokenizer and date/time
//!   normalizer.
//! - **[`calendar`]** -- event creation (`add event ...`) and today's
//!   free/busy listing (`availabilities`).
//! - **[`browser`]** -- the catch-all: open a URL or run a web search.
//! - **[`backend`]** -- the [`ScriptBackend`] adapter executing generated
//!   instruction blocks via `osascript`, plus a scripted double for tests
//!   and dry runs.
//! - **[`config`]** -- static configuration handed to handlers at
//!   construction.
//!
//! Handler order is part of the contract: [`standard_handlers`] builds the
//! canonical chain with the specific intents ahead of the browser
//! catch-all.  Reordering changes which intent wins ambiguous input.

use std::sync::Arc;

use herald_kernel::Handler;

pub mod backend;
pub mod browser;
pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod script;

// Re-export the most commonly used types at the crate root for convenience.
pub use backend::{OsaBackend, ScriptBackend, ScriptedBackend};
pub use browser::BrowserHandler;
pub use calendar::{AddEventHandler, AvailabilitiesHandler};
pub use config::HandlerConfig;
pub use error::{HandlerError, Result};
pub use event::EventDetails;
pub use message::SendMessageHandler;
pub use script::RawScriptHandler;

/// The canonical ordered handler chain:
/// send-message, raw-script, add-event, availabilities, browser.
pub fn standard_handlers(
    config: &HandlerConfig,
    backend: Arc<dyn ScriptBackend>,
) -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(SendMessageHandler::new(Arc::clone(&backend))),
        Arc::new(RawScriptHandler::new(Arc::clone(&backend))),
        Arc::new(AddEventHandler::new(config.clone(), Arc::clone(&backend))),
        Arc::new(AvailabilitiesHandler::new(
            config.clone(),
            Arc::clone(&backend),
        )),
        Arc::new(BrowserHandler::new(backend)),
    ]
}
