//! Drives test cases through an event sink.
//!
//! The [`CaseRunner`] is the invocation boundary: it announces the case and
//! each selected method, asks the sink to invoke the method, and turns
//! anything escaping the body (an error, an exception or a panic) into the
//! matching failure event. Sinks therefore never see a raw failure.
//!
//! ```text
//! run_group ─▶ paint_group_start(name, cases.len())
//!   run_case ─▶ paint_case_start
//!     for method in selector.select(case.methods()):
//!       paint_method_start ─▶ sink.invoke ─▶ paint_method_end
//!   run_case ─▶ paint_case_end
//! run_group ─▶ paint_group_end
//! ```

use crate::config::TallyConfig;
use crate::selector::TestSelector;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tally_proto::{EventSink, ExceptionInfo, InvokeError, SinkError, TestCase};
use tracing::{debug, info, warn};

/// Type name attached to exceptions raised by a panicking test body.
pub const PANIC_TYPE_NAME: &str = "panic";

/// Outcome of a run, read back from the sink once the run has finished.
///
/// Counts are the sink's totals, so they include anything it had already
/// counted before this run started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passes: usize,
    pub fails: usize,
    pub exceptions: usize,

    /// Number of test methods handed to the sink for invocation.
    pub methods_invoked: usize,

    /// Wall-clock time spent in the run.
    pub duration: Duration,
}

impl RunSummary {
    /// True if the sink saw no failures or exceptions.
    pub fn status(&self) -> bool {
        self.fails + self.exceptions == 0
    }

    fn read(sink: &dyn EventSink, methods_invoked: usize, duration: Duration) -> Self {
        Self {
            passes: sink.pass_count(),
            fails: sink.fail_count(),
            exceptions: sink.exception_count(),
            methods_invoked,
            duration,
        }
    }
}

/// Runs test cases, selecting their test methods with a [`TestSelector`].
#[derive(Debug, Clone, Default)]
pub struct CaseRunner {
    selector: TestSelector,
}

impl CaseRunner {
    pub fn new(selector: TestSelector) -> Self {
        Self { selector }
    }

    /// Builds a runner using the configured test prefix.
    pub fn from_config(config: &TallyConfig) -> Self {
        Self::new(config.selector())
    }

    pub fn selector(&self) -> &TestSelector {
        &self.selector
    }

    /// Runs every test method of a single case.
    ///
    /// # Errors
    ///
    /// Returns the first [`SinkError`] raised by a structural event. Failures
    /// inside test bodies are reported to the sink, never returned.
    pub fn run_case(
        &self,
        sink: &mut dyn EventSink,
        test_case: &mut dyn TestCase,
    ) -> Result<RunSummary, SinkError> {
        let start = Instant::now();
        let methods_invoked = self.drive_case(sink, test_case)?;
        Ok(RunSummary::read(sink, methods_invoked, start.elapsed()))
    }

    /// Runs several cases inside one group; the group size is the number of
    /// cases.
    ///
    /// # Errors
    ///
    /// Same as [`CaseRunner::run_case`]. The run stops at the first error.
    pub fn run_group(
        &self,
        sink: &mut dyn EventSink,
        name: &str,
        cases: &mut [Box<dyn TestCase>],
    ) -> Result<RunSummary, SinkError> {
        let start = Instant::now();
        info!(group = name, cases = cases.len(), "running group");

        sink.paint_group_start(name, cases.len())?;
        let mut methods_invoked = 0;
        for test_case in cases.iter_mut() {
            methods_invoked += self.drive_case(sink, test_case.as_mut())?;
        }
        sink.paint_group_end(name)?;

        let summary = RunSummary::read(sink, methods_invoked, start.elapsed());
        info!(
            group = name,
            passes = summary.passes,
            fails = summary.fails,
            exceptions = summary.exceptions,
            duration = ?summary.duration,
            "group finished"
        );
        Ok(summary)
    }

    fn drive_case(
        &self,
        sink: &mut dyn EventSink,
        test_case: &mut dyn TestCase,
    ) -> Result<usize, SinkError> {
        let case_name = test_case.name().to_string();
        let methods = test_case.methods();
        let selected = self.selector.select(&methods);
        debug!(
            case = %case_name,
            selected = selected.len(),
            total = methods.len(),
            "running case"
        );

        sink.paint_case_start(&case_name)?;
        for method in &selected {
            sink.paint_method_start(method)?;
            invoke_guarded(sink, test_case, method);
            sink.paint_method_end(method)?;
        }
        sink.paint_case_end(&case_name)?;

        Ok(selected.len())
    }
}

/// Invokes `method`, reporting whatever escapes the body to `sink`.
fn invoke_guarded(sink: &mut dyn EventSink, test_case: &mut dyn TestCase, method: &str) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.invoke(test_case, method)));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(InvokeError::Exception(err))) => {
            sink.paint_exception(&ExceptionInfo::from_error(&err));
        }
        Ok(Err(InvokeError::Error(message))) => sink.paint_error(&message),
        Ok(Err(err @ InvokeError::UnknownMethod(_))) => sink.paint_error(&err.to_string()),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(method, %message, "test body panicked");
            sink.paint_exception(
                &ExceptionInfo::exception(message).with_type_name(PANIC_TYPE_NAME),
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::Reporter;
    use crate::runner::Runner;
    use crate::testing::{RecordingHooks, RecordingSink, ScriptedCase, SinkEvent};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tally_proto::FailureKind;

    fn arithmetic_case() -> ScriptedCase {
        ScriptedCase::new("ArithmeticTest")
            .with_noop("setUp")
            .with_method("testAdd", |sink| {
                sink.paint_pass("1 + 1 == 2");
                Ok(())
            })
            .with_method("testSub", |sink| {
                sink.paint_fail("2 - 1 != 0");
                Ok(())
            })
    }

    #[test]
    fn test_run_case_emits_structure_in_order() {
        let mut sink = RecordingSink::new();
        let mut case = arithmetic_case();

        let summary = CaseRunner::default().run_case(&mut sink, &mut case).unwrap();

        assert_eq!(
            sink.events(),
            [
                SinkEvent::CaseStart("ArithmeticTest".to_string()),
                SinkEvent::MethodStart("testAdd".to_string()),
                SinkEvent::Invoke("testAdd".to_string()),
                SinkEvent::Pass("1 + 1 == 2".to_string()),
                SinkEvent::MethodEnd("testAdd".to_string()),
                SinkEvent::MethodStart("testSub".to_string()),
                SinkEvent::Invoke("testSub".to_string()),
                SinkEvent::Fail("2 - 1 != 0".to_string()),
                SinkEvent::MethodEnd("testSub".to_string()),
                SinkEvent::CaseEnd("ArithmeticTest".to_string()),
            ]
        );
        assert_eq!(summary.passes, 1);
        assert_eq!(summary.fails, 1);
        assert_eq!(summary.methods_invoked, 2);
        assert!(!summary.status());
        assert_eq!(case.invocations(), ["testAdd", "testSub"]);
    }

    #[test]
    fn test_error_becomes_error_event() {
        let mut sink = RecordingSink::new();
        let mut case = ScriptedCase::new("Broken").with_method("testBroken", |_| {
            Err(InvokeError::Error("undefined variable".to_string()))
        });

        let summary = CaseRunner::default().run_case(&mut sink, &mut case).unwrap();

        assert!(
            sink.events()
                .contains(&SinkEvent::Error("undefined variable".to_string()))
        );
        assert_eq!(summary.exceptions, 1);
        assert_eq!(summary.fails, 0);
    }

    #[test]
    fn test_exception_becomes_exception_event() {
        let mut sink = RecordingSink::new();
        let mut case = ScriptedCase::new("Throws").with_method("testThrows", |_| {
            Err(anyhow::anyhow!("connection refused").into())
        });

        CaseRunner::default().run_case(&mut sink, &mut case).unwrap();

        let exception = sink
            .events()
            .iter()
            .find_map(|event| match event {
                SinkEvent::Exception(info) => Some(info.clone()),
                _ => None,
            })
            .expect("exception event");
        assert_eq!(exception.kind, FailureKind::Exception);
        assert!(exception.message.contains("connection refused"));
    }

    #[test]
    fn test_panic_is_caught_and_reported() {
        let mut reporter = Reporter::new(RecordingHooks::default());
        let mut case = ScriptedCase::new("Panics")
            .with_method("testPanics", |_| panic!("index out of bounds"))
            .with_method("testAfter", |sink| {
                sink.paint_pass("still runs");
                Ok(())
            });

        let summary = CaseRunner::default()
            .run_case(&mut reporter, &mut case)
            .unwrap();

        assert_eq!(summary.exceptions, 1);
        assert_eq!(summary.passes, 1);
        assert_eq!(reporter.test_case_progress(), 1);
        assert_eq!(reporter.hooks().footers(), ["Panics"]);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42_u8), "panic with a non-string payload");
    }

    #[test]
    fn test_run_group_uses_case_count_as_size() {
        let mut reporter = Reporter::new(RecordingHooks::default());
        let mut cases: Vec<Box<dyn TestCase>> = vec![
            Box::new(arithmetic_case()),
            Box::new(ScriptedCase::new("Empty").with_noop("helper")),
        ];

        let summary = CaseRunner::default()
            .run_group(&mut reporter, "Suite", &mut cases)
            .unwrap();

        assert_eq!(reporter.test_case_count(), Some(2));
        assert_eq!(reporter.test_case_progress(), 2);
        assert_eq!(reporter.hooks().headers(), ["Suite"]);
        assert_eq!(reporter.hooks().footers(), ["Suite"]);
        assert_eq!(summary.methods_invoked, 2);
        assert!(!summary.status());
    }

    #[test]
    fn test_dry_run_keeps_structure_without_bodies() {
        let mut sink = RecordingSink::new();
        sink.set_dry_run(true);
        let mut case = arithmetic_case();

        let summary = CaseRunner::default().run_case(&mut sink, &mut case).unwrap();

        assert!(case.invocations().is_empty());
        assert_eq!(sink.events().len(), 6);
        assert_eq!(summary.methods_invoked, 2);
        assert!(summary.status());
    }

    #[test]
    fn test_body_may_read_shared_sink() {
        let shared = Rc::new(RefCell::new(Runner::new()));
        let peek = Rc::clone(&shared);
        let mut handle = Rc::clone(&shared);
        let mut case = ScriptedCase::new("Peeks").with_method("testPeek", move |sink| {
            sink.paint_pass("ok");
            assert_eq!(peek.borrow().pass_count(), 1);
            Ok(())
        });

        let summary = CaseRunner::default().run_case(&mut handle, &mut case).unwrap();

        assert_eq!(summary.exceptions, 0);
        assert_eq!(summary.passes, 1);
        assert!(summary.status());
    }

    #[test]
    fn test_selector_decides_which_methods_run() {
        let mut runner = Runner::new();
        let mut case = ScriptedCase::new("Behaviour")
            .with_method("shouldPass", |sink| {
                sink.paint_pass("ok");
                Ok(())
            })
            .with_noop("testIgnored");

        let summary = CaseRunner::new(TestSelector::prefix("should"))
            .run_case(&mut runner, &mut case)
            .unwrap();

        assert_eq!(case.invocations(), ["shouldPass"]);
        assert_eq!(summary.passes, 1);
    }
}
