//! Error types for the Tally event core.

use thiserror::Error;

/// Errors raised by sinks while tracking test structure.
///
/// Counting events never produce these; only structural end events can,
/// and only when the caller breaks the start/end pairing contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("test stack underflow: {event}({name}) has no matching start")]
    StackUnderflow { event: &'static str, name: String },
}

/// Failures escaping a test body during invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Runtime-level error raised by the body (reported as an error event).
    #[error("error: {0}")]
    Error(String),

    /// Uncaught exception propagating out of the body.
    #[error("uncaught exception: {0}")]
    Exception(#[from] anyhow::Error),

    #[error("no such test method: {0}")]
    UnknownMethod(String),
}

/// Result type alias using [`SinkError`].
pub type Result<T> = std::result::Result<T, SinkError>;
