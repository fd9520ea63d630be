//! Base event sink.
//!
//! [`Runner`] owns the pass/fail/exception counters and the dry-run flag.
//! Every richer sink embeds one so counting happens in exactly one place,
//! however far up a decorator chain the event started.

use serde_json::Value;
use tally_proto::{EventSink, ExceptionInfo, InvokeError, SignalVerdict, TestCase};

/// Counts test outcomes and gates method invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Runner {
    passes: usize,
    fails: usize,
    exceptions: usize,
    is_dry_run: bool,
}

impl Runner {
    /// Starts a run with no results.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for Runner {
    fn set_dry_run(&mut self, is_dry: bool) {
        self.is_dry_run = is_dry;
    }

    fn is_dry_run(&self) -> bool {
        self.is_dry_run
    }

    fn invoke(&mut self, test_case: &mut dyn TestCase, method: &str) -> Result<(), InvokeError> {
        if self.is_dry_run {
            return Ok(());
        }
        test_case.invoke(method, self)
    }

    fn paint_pass(&mut self, _message: &str) {
        self.passes += 1;
    }

    fn paint_fail(&mut self, _message: &str) {
        self.fails += 1;
    }

    fn paint_exception(&mut self, _exception: &ExceptionInfo) {
        self.exceptions += 1;
    }

    fn paint_signal(&mut self, _kind: &str, _payload: &Value) -> SignalVerdict {
        SignalVerdict::Ignored
    }

    fn pass_count(&self) -> usize {
        self.passes
    }

    fn fail_count(&self) -> usize {
        self.fails
    }

    fn exception_count(&self) -> usize {
        self.exceptions
    }
}
