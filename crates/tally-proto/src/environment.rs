//! Process environment capability.
//!
//! Reporters ask an injected [`Environment`] whether they run on a command
//! line instead of querying the process directly, so they stay testable.

/// Queries about the host the test run executes in.
pub trait Environment {
    /// Returns true when output goes to a command-line context.
    fn in_cli(&self) -> bool;
}

/// Environment backed by the real process.
///
/// A process counts as command-line unless it was launched through a CGI
/// gateway, which always exports `GATEWAY_INTERFACE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

/// Variable every CGI gateway exports to the processes it launches.
pub const GATEWAY_ENV_VAR: &str = "GATEWAY_INTERFACE";

impl ProcessEnvironment {
    /// Decides CLI context from variables read through `lookup`.
    pub fn in_cli_from<F>(lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(GATEWAY_ENV_VAR).is_none()
    }
}

impl Environment for ProcessEnvironment {
    fn in_cli(&self) -> bool {
        Self::in_cli_from(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }
}

/// Environment with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEnvironment(pub bool);

impl Environment for FixedEnvironment {
    fn in_cli(&self) -> bool {
        self.0
    }
}
