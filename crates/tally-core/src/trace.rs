//! Structured event logging.
//!
//! [`TracingDecorator`] emits a `tracing` event for every sink event before
//! forwarding it, so a run can be followed in the log without touching the
//! reporter that renders it.

use serde_json::Value;
use tally_proto::{EventSink, ExceptionInfo, InvokeError, SignalVerdict, SinkError, TestCase};
use tracing::{debug, error, info, trace, warn};

/// Decorator logging every event through `tracing`.
///
/// Structure and passes log at `debug`, fails at `warn`, errors and
/// exceptions at `error`. `invoke` runs the body with this decorator as its
/// sink, skipping it when the wrapped sink is in dry-run mode.
#[derive(Debug, Clone, Default)]
pub struct TracingDecorator<S> {
    target: S,
}

impl<S: EventSink> TracingDecorator<S> {
    pub fn new(target: S) -> Self {
        Self { target }
    }

    pub fn inner(&self) -> &S {
        &self.target
    }

    pub fn into_inner(self) -> S {
        self.target
    }
}

impl<S: EventSink> EventSink for TracingDecorator<S> {
    fn set_dry_run(&mut self, is_dry: bool) {
        debug!(is_dry, "dry run toggled");
        self.target.set_dry_run(is_dry);
    }

    fn is_dry_run(&self) -> bool {
        self.target.is_dry_run()
    }

    fn invoke(&mut self, test_case: &mut dyn TestCase, method: &str) -> Result<(), InvokeError> {
        if self.target.is_dry_run() {
            trace!(case = test_case.name(), method, "dry run, skipping invocation");
            return Ok(());
        }
        trace!(case = test_case.name(), method, "invoking");
        let result = test_case.invoke(method, self);
        if let Err(e) = &result {
            debug!(method, error = %e, "invocation returned an error");
        }
        result
    }

    fn status(&self) -> bool {
        self.target.status()
    }

    fn paint_method_start(&mut self, name: &str) -> Result<(), SinkError> {
        debug!(method = name, "method started");
        self.target.paint_method_start(name)
    }

    fn paint_method_end(&mut self, name: &str) -> Result<(), SinkError> {
        debug!(method = name, "method ended");
        self.target.paint_method_end(name)
    }

    fn paint_case_start(&mut self, name: &str) -> Result<(), SinkError> {
        debug!(case = name, "case started");
        self.target.paint_case_start(name)
    }

    fn paint_case_end(&mut self, name: &str) -> Result<(), SinkError> {
        debug!(case = name, "case ended");
        self.target.paint_case_end(name)
    }

    fn paint_group_start(&mut self, name: &str, size: usize) -> Result<(), SinkError> {
        info!(group = name, size, "group started");
        self.target.paint_group_start(name, size)
    }

    fn paint_group_end(&mut self, name: &str) -> Result<(), SinkError> {
        info!(
            group = name,
            passes = self.target.pass_count(),
            fails = self.target.fail_count(),
            exceptions = self.target.exception_count(),
            "group ended"
        );
        self.target.paint_group_end(name)
    }

    fn paint_pass(&mut self, message: &str) {
        debug!(detail = message, "pass");
        self.target.paint_pass(message);
    }

    fn paint_fail(&mut self, message: &str) {
        warn!(detail = message, "fail");
        self.target.paint_fail(message);
    }

    fn paint_error(&mut self, message: &str) {
        error!(detail = message, "error");
        self.target.paint_error(message);
    }

    fn paint_exception(&mut self, exception: &ExceptionInfo) {
        error!(
            kind = %exception.kind,
            type_name = exception.type_name.as_deref().unwrap_or("unknown"),
            detail = %exception.message,
            "exception"
        );
        self.target.paint_exception(exception);
    }

    fn paint_message(&mut self, message: &str) {
        trace!(detail = message, "message");
        self.target.paint_message(message);
    }

    fn paint_formatted_message(&mut self, message: &str) {
        trace!(detail = message, "formatted message");
        self.target.paint_formatted_message(message);
    }

    fn paint_signal(&mut self, kind: &str, payload: &Value) -> SignalVerdict {
        let verdict = self.target.paint_signal(kind, payload);
        debug!(kind, %payload, ?verdict, "signal");
        verdict
    }

    fn pass_count(&self) -> usize {
        self.target.pass_count()
    }

    fn fail_count(&self) -> usize {
        self.target.fail_count()
    }

    fn exception_count(&self) -> usize {
        self.target.exception_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::Reporter;
    use crate::testing::ScriptedCase;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture<F: FnOnce()>(f: F) -> String {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        buffer.contents()
    }

    #[test]
    fn test_tracing_decorator_forwards_counts() {
        let mut decorator = TracingDecorator::new(Reporter::default());

        decorator.paint_case_start("Case").unwrap();
        decorator.paint_pass("ok");
        decorator.paint_fail("bad");
        decorator.paint_error("broken");
        decorator.paint_case_end("Case").unwrap();

        assert_eq!(decorator.pass_count(), 1);
        assert_eq!(decorator.fail_count(), 1);
        assert_eq!(decorator.exception_count(), 1);
        assert_eq!(decorator.inner().test_case_progress(), 1);
    }

    #[test]
    fn test_tracing_decorator_logs_events() {
        let output = capture(|| {
            let mut decorator = TracingDecorator::new(Reporter::default());
            decorator.paint_group_start("Suite", 1).unwrap();
            decorator.paint_fail("expected 2, got 3");
            decorator.paint_exception(&ExceptionInfo::exception("boom").with_type_name("panic"));
            decorator.paint_group_end("Suite").unwrap();
        });

        assert!(output.contains("group started"), "output: {output}");
        assert!(output.contains("expected 2, got 3"), "output: {output}");
        assert!(output.contains("WARN"), "output: {output}");
        assert!(output.contains("panic"), "output: {output}");
        assert!(output.contains("fails=1"), "output: {output}");
    }

    #[test]
    fn test_tracing_decorator_routes_body_events_through_itself() {
        let mut decorator = TracingDecorator::new(Reporter::default());
        let mut case = ScriptedCase::new("Case").with_method("test_ok", |sink| {
            sink.paint_pass("ok");
            Ok(())
        });

        let output = capture(|| {
            decorator.invoke(&mut case, "test_ok").unwrap();
        });

        assert_eq!(decorator.pass_count(), 1);
        assert!(output.contains("pass"), "output: {output}");
    }

    #[test]
    fn test_tracing_decorator_skips_bodies_in_dry_run() {
        let mut decorator = TracingDecorator::new(Reporter::default());
        decorator.set_dry_run(true);
        let mut case = ScriptedCase::new("Case").with_method("test_ok", |sink| {
            sink.paint_pass("ok");
            Ok(())
        });

        decorator.invoke(&mut case, "test_ok").unwrap();

        assert!(case.invocations().is_empty());
        assert_eq!(decorator.pass_count(), 0);
    }
}
