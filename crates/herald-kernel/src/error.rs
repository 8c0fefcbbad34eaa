//! Kernel error types.
//!
//! All parsing and dispatch failures surface through [`KernelError`].  Each
//! variant carries enough context for callers to decide how to handle the
//! failure without inspecting opaque strings.  Handlers convert these into
//! error [`Outcome`](crate::Outcome)s at their boundary; nothing in the
//! kernel panics on user input.

/// Unified error type for the Herald dispatch kernel.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// A required field was absent (or explicitly null) in a parsed
    /// [`FieldMap`](crate::FieldMap).
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    /// The command text could not be parsed by the invocation that
    /// recognized it (numeric parse failure, unterminated quote, missing
    /// tokens).
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    /// No handler in the chain recognized the command.  With the standard
    /// chain this is unreachable (the browser handler is a catch-all), but
    /// the dispatcher must still define behavior for it.
    #[error("no handler recognized the command: {command}")]
    NoHandlerMatched { command: String },

    /// A handler was asked to execute an invocation index it does not own.
    #[error("handler `{handler}` has no invocation {index}")]
    UnknownInvocation { handler: String, index: usize },

    /// Catch-all for unexpected internal errors.  Prefer a typed variant
    /// whenever possible.
    #[error("internal kernel error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the kernel crate.
pub type Result<T> = std::result::Result<T, KernelError>;
