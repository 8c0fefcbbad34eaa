//! Herald dispatch kernel.
//!
//! This crate provides the framework half of the Herald command
//! interpreter:
//!
//! - **[`handler`]** -- The [`Invocation`] and [`Handler`] traits, the
//!   [`FieldMap`] of extracted fields, and the [`Outcome`] pair returned by
//!   every handler.
//! - **[`dispatch`]** -- The [`Dispatcher`], which tries an ordered handler
//!   chain and returns the first match's outcome (first match wins).
//! - **[`text`]** -- Pure string helpers (word-boundary search, last-
//!   occurrence splitting, case-insensitive prefixes, delimiter counting)
//!   used by every concrete handler.
//! - **[`error`]** -- Unified kernel error types via [`thiserror`].
//!
//! Concrete handlers (messaging, calendar, browser, raw script) live in the
//! `herald-handlers` crate; this crate knows nothing about what a command
//! *does*, only how recognition and dispatch are sequenced.

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod text;

// Re-export the most commonly used types at the crate root for convenience.
pub use dispatch::Dispatcher;
pub use error::{KernelError, Result};
pub use handler::{FieldMap, Handler, Invocation, Outcome, PrefixInvocation};
