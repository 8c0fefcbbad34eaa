//! Handler error types.
//!
//! Handlers never return `Err` to the dispatcher -- their contract is an
//! [`Outcome`](herald_kernel::Outcome) -- but internally every fallible step
//! produces a [`HandlerError`] which is converted to an error outcome at the
//! handler boundary.

use herald_kernel::{KernelError, Outcome};

/// Unified error type for the concrete Herald handlers.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// No recipient was extracted and no remembered recipient is available.
    /// The message text is fixed: hosts display it verbatim.
    #[error("No valid recipient specified")]
    NoRecipient,

    /// A required field was absent from the parsed command.
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    /// An error propagated from the kernel (malformed input, missing field).
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl From<HandlerError> for Outcome {
    fn from(err: HandlerError) -> Self {
        Outcome::error(err.to_string())
    }
}

/// Convenience alias used throughout the handlers crate.
pub type Result<T> = std::result::Result<T, HandlerError>;
