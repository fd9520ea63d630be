//! # tally-proto
//!
//! Shared types, error definitions, and traits for the Tally test core.
//!
//! This crate provides the vocabulary every reporter, decorator and test case
//! speaks, including:
//! - The [`EventSink`] event contract and the [`TestCase`] collaborator trait
//! - Failure payloads ([`ExceptionInfo`]) and signal verdicts
//! - Common error types
//! - The [`Environment`] capability used instead of a static process query

mod environment;
mod error;
mod event;
mod sink;

pub use environment::{Environment, FixedEnvironment, GATEWAY_ENV_VAR, ProcessEnvironment};
pub use error::{InvokeError, Result, SinkError};
pub use event::{ExceptionInfo, FailureKind, SignalVerdict};
pub use sink::{EventSink, TestCase};
