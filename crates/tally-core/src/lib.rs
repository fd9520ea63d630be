//! # tally-core
//!
//! Event handling core of the Tally test framework.
//!
//! Test cases report assertion outcomes as events; this crate counts them,
//! tracks test nesting for page-style displays, and lets behaviour be layered
//! onto any sink through decorators.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │ CaseRunner  │────▶│ RepeatDecorator  │────▶│  Reporter   │
//! └─────────────┘     │ TracingDecorator │     └─────────────┘
//!        │            └──────────────────┘            │
//!        ▼                                            ▼
//! ┌─────────────┐                              ┌─────────────┐
//! │  TestCase   │                              │ ReportHooks │
//! └─────────────┘                              └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - `runner`: base sink owning the pass/fail/exception counters
//! - `reporter`: name stack, header/footer hooks, size and progress
//! - `decorator`: forwarding and repeating decorators
//! - `trace`: decorator logging every event through `tracing`
//! - `selector`: which methods of a case are tests
//! - `case_runner`: drives cases through a sink and reports escaped failures
//! - `config`: YAML run configuration with environment overrides
//! - `logging`: subscriber setup

mod case_runner;
mod config;
mod decorator;
mod logging;
mod reporter;
mod runner;
mod selector;
mod trace;

pub mod testing;

pub use case_runner::{CaseRunner, PANIC_TYPE_NAME, RunSummary};
pub use config::{ConfigError, DRY_RUN_ENV_VAR, TEST_PREFIX_ENV_VAR, TallyConfig};
pub use decorator::{Decorator, RepeatDecorator};
pub use logging::{LOG_ENV_VAR, init_tracing};
pub use reporter::{NoHooks, ReportHooks, Reporter};
pub use runner::Runner;
pub use selector::{DEFAULT_TEST_PREFIX, TestSelector};
pub use trace::TracingDecorator;

// Re-export the event vocabulary so most users need only this crate.
pub use tally_proto::{
    Environment, EventSink, ExceptionInfo, FailureKind, FixedEnvironment, InvokeError,
    ProcessEnvironment, SignalVerdict, SinkError, TestCase,
};
