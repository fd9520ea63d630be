//! Payloads carried by failure and signal events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of failure escaped a test body.
///
/// Errors are treated as a subtype of exceptions: both land in the
/// exception counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Runtime-level error, e.g. a fatal warning.
    Error,
    /// Uncaught exception.
    Exception,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Error => write!(f, "error"),
            FailureKind::Exception => write!(f, "exception"),
        }
    }
}

/// Description of an error or exception raised by a test body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub kind: FailureKind,
    pub message: String,
    /// Name of the raised type, when the boundary knows it (e.g. `"panic"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ExceptionInfo {
    /// Creates an error-kind payload from a formatted message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Error,
            message: message.into(),
            type_name: None,
        }
    }

    /// Creates an exception-kind payload.
    pub fn exception(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Exception,
            message: message.into(),
            type_name: None,
        }
    }

    /// Builds an exception payload from an uncaught error, keeping its cause chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::exception(format!("{err:#}"))
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_name {
            Some(type_name) => write!(f, "{} [{}]: {}", self.kind, type_name, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Answer a sink gives to a user-defined signal.
///
/// Decorators return whatever their target returned. The core never
/// changes a run's status because of a verdict; interpreting
/// [`SignalVerdict::FailsSuite`] is left to whoever sent the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalVerdict {
    /// No sink in the chain understood the signal type.
    #[default]
    Ignored,
    /// The signal was handled and is benign.
    Accepted,
    /// The sink considers this signal type fatal to the suite.
    FailsSuite,
}

impl SignalVerdict {
    pub fn fails_suite(self) -> bool {
        matches!(self, SignalVerdict::FailsSuite)
    }
}
