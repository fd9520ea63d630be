//! The event contract shared by runners, reporters and decorators.
//!
//! A test run is a depth-first walk of groups, cases and methods. Every step
//! of that walk is announced to an [`EventSink`] as a `paint_*` call, and
//! assertion outcomes raised by test bodies arrive the same way:
//!
//! ```text
//! paint_group_start ─┐
//!   paint_case_start ─┐
//!     paint_method_start
//!       invoke ──▶ TestCase::invoke ──▶ paint_pass / paint_fail
//!     paint_method_end
//!   paint_case_end ───┘
//! paint_group_end ───┘
//! ```

use crate::error::{InvokeError, SinkError};
use crate::event::{ExceptionInfo, SignalVerdict};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// A test-case object whose methods can be invoked by name.
///
/// Bodies report assertion outcomes through the sink they are handed, which
/// is the outermost sink of the active chain.
pub trait TestCase {
    /// Name announced in case start/end events.
    fn name(&self) -> &str;

    /// Names of every method on the case, in declaration order.
    ///
    /// Whether a method counts as a test is decided by the caller's
    /// selection policy, not by the case.
    fn methods(&self) -> Vec<String>;

    /// Runs a single method, reporting outcomes to `sink`.
    fn invoke(&mut self, method: &str, sink: &mut dyn EventSink) -> Result<(), InvokeError>;
}

/// Receiver of test lifecycle events.
///
/// Structural events return [`SinkError`] only for contract violations such
/// as an end without a matching start. Counting events are infallible.
pub trait EventSink {
    /// Switches dry-run mode: structure events still fire, bodies do not run.
    fn set_dry_run(&mut self, is_dry: bool);

    fn is_dry_run(&self) -> bool;

    /// Invokes a single test method on the test case.
    ///
    /// Failures escaping the body are returned untouched; converting them
    /// into error or exception events is the caller's job.
    fn invoke(&mut self, test_case: &mut dyn TestCase, method: &str) -> Result<(), InvokeError>;

    /// True if there have been no failures or exceptions.
    fn status(&self) -> bool {
        self.fail_count() + self.exception_count() == 0
    }

    fn paint_method_start(&mut self, _name: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn paint_method_end(&mut self, _name: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn paint_case_start(&mut self, _name: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn paint_case_end(&mut self, _name: &str) -> Result<(), SinkError> {
        Ok(())
    }

    /// Start of a group; `size` is the number of cases it declares.
    fn paint_group_start(&mut self, _name: &str, _size: usize) -> Result<(), SinkError> {
        Ok(())
    }

    fn paint_group_end(&mut self, _name: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn paint_pass(&mut self, message: &str);

    fn paint_fail(&mut self, message: &str);

    /// Runtime-level error in a test body. Counted as an exception.
    fn paint_error(&mut self, message: &str) {
        self.paint_exception(&ExceptionInfo::error(message));
    }

    fn paint_exception(&mut self, exception: &ExceptionInfo);

    /// Supplementary message, e.g. a skip notice.
    fn paint_message(&mut self, _message: &str) {}

    /// Preformatted message such as a variable dump.
    fn paint_formatted_message(&mut self, _message: &str) {}

    /// User-defined event with an arbitrary payload.
    fn paint_signal(&mut self, _kind: &str, _payload: &Value) -> SignalVerdict {
        SignalVerdict::Ignored
    }

    fn pass_count(&self) -> usize;

    fn fail_count(&self) -> usize;

    fn exception_count(&self) -> usize;
}

/// Forwards every [`EventSink`] method through a deref to the inner sink.
macro_rules! forward_through_deref {
    () => {
        fn set_dry_run(&mut self, is_dry: bool) {
            (**self).set_dry_run(is_dry);
        }

        fn is_dry_run(&self) -> bool {
            (**self).is_dry_run()
        }

        fn invoke(
            &mut self,
            test_case: &mut dyn TestCase,
            method: &str,
        ) -> Result<(), InvokeError> {
            (**self).invoke(test_case, method)
        }

        fn status(&self) -> bool {
            (**self).status()
        }

        fn paint_method_start(&mut self, name: &str) -> Result<(), SinkError> {
            (**self).paint_method_start(name)
        }

        fn paint_method_end(&mut self, name: &str) -> Result<(), SinkError> {
            (**self).paint_method_end(name)
        }

        fn paint_case_start(&mut self, name: &str) -> Result<(), SinkError> {
            (**self).paint_case_start(name)
        }

        fn paint_case_end(&mut self, name: &str) -> Result<(), SinkError> {
            (**self).paint_case_end(name)
        }

        fn paint_group_start(&mut self, name: &str, size: usize) -> Result<(), SinkError> {
            (**self).paint_group_start(name, size)
        }

        fn paint_group_end(&mut self, name: &str) -> Result<(), SinkError> {
            (**self).paint_group_end(name)
        }

        fn paint_pass(&mut self, message: &str) {
            (**self).paint_pass(message);
        }

        fn paint_fail(&mut self, message: &str) {
            (**self).paint_fail(message);
        }

        fn paint_error(&mut self, message: &str) {
            (**self).paint_error(message);
        }

        fn paint_exception(&mut self, exception: &ExceptionInfo) {
            (**self).paint_exception(exception);
        }

        fn paint_message(&mut self, message: &str) {
            (**self).paint_message(message);
        }

        fn paint_formatted_message(&mut self, message: &str) {
            (**self).paint_formatted_message(message);
        }

        fn paint_signal(&mut self, kind: &str, payload: &Value) -> SignalVerdict {
            (**self).paint_signal(kind, payload)
        }

        fn pass_count(&self) -> usize {
            (**self).pass_count()
        }

        fn fail_count(&self) -> usize {
            (**self).fail_count()
        }

        fn exception_count(&self) -> usize {
            (**self).exception_count()
        }
    };
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    forward_through_deref!();
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    forward_through_deref!();
}

/// Shared target: the chain and the caller both keep a handle.
///
/// Each call borrows the cell for its own duration only, so the caller must
/// not hold a borrow across event calls. `invoke` checks the dry-run flag and
/// releases the borrow before the body runs; the body then reports through
/// this handle and may read the shared sink itself.
impl<S: EventSink + ?Sized> EventSink for Rc<RefCell<S>> {
    fn set_dry_run(&mut self, is_dry: bool) {
        self.borrow_mut().set_dry_run(is_dry);
    }

    fn is_dry_run(&self) -> bool {
        self.borrow().is_dry_run()
    }

    fn invoke(&mut self, test_case: &mut dyn TestCase, method: &str) -> Result<(), InvokeError> {
        if self.borrow().is_dry_run() {
            return Ok(());
        }
        test_case.invoke(method, self)
    }

    fn status(&self) -> bool {
        self.borrow().status()
    }

    fn paint_method_start(&mut self, name: &str) -> Result<(), SinkError> {
        self.borrow_mut().paint_method_start(name)
    }

    fn paint_method_end(&mut self, name: &str) -> Result<(), SinkError> {
        self.borrow_mut().paint_method_end(name)
    }

    fn paint_case_start(&mut self, name: &str) -> Result<(), SinkError> {
        self.borrow_mut().paint_case_start(name)
    }

    fn paint_case_end(&mut self, name: &str) -> Result<(), SinkError> {
        self.borrow_mut().paint_case_end(name)
    }

    fn paint_group_start(&mut self, name: &str, size: usize) -> Result<(), SinkError> {
        self.borrow_mut().paint_group_start(name, size)
    }

    fn paint_group_end(&mut self, name: &str) -> Result<(), SinkError> {
        self.borrow_mut().paint_group_end(name)
    }

    fn paint_pass(&mut self, message: &str) {
        self.borrow_mut().paint_pass(message);
    }

    fn paint_fail(&mut self, message: &str) {
        self.borrow_mut().paint_fail(message);
    }

    fn paint_error(&mut self, message: &str) {
        self.borrow_mut().paint_error(message);
    }

    fn paint_exception(&mut self, exception: &ExceptionInfo) {
        self.borrow_mut().paint_exception(exception);
    }

    fn paint_message(&mut self, message: &str) {
        self.borrow_mut().paint_message(message);
    }

    fn paint_formatted_message(&mut self, message: &str) {
        self.borrow_mut().paint_formatted_message(message);
    }

    fn paint_signal(&mut self, kind: &str, payload: &Value) -> SignalVerdict {
        self.borrow_mut().paint_signal(kind, payload)
    }

    fn pass_count(&self) -> usize {
        self.borrow().pass_count()
    }

    fn fail_count(&self) -> usize {
        self.borrow().fail_count()
    }

    fn exception_count(&self) -> usize {
        self.borrow().exception_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FailureKind;

    /// Sink relying on every default method.
    #[derive(Default)]
    struct CountingSink {
        passes: usize,
        fails: usize,
        exceptions: Vec<ExceptionInfo>,
        dry: bool,
    }

    impl EventSink for CountingSink {
        fn set_dry_run(&mut self, is_dry: bool) {
            self.dry = is_dry;
        }

        fn is_dry_run(&self) -> bool {
            self.dry
        }

        fn invoke(
            &mut self,
            test_case: &mut dyn TestCase,
            method: &str,
        ) -> Result<(), InvokeError> {
            test_case.invoke(method, self)
        }

        fn paint_pass(&mut self, _message: &str) {
            self.passes += 1;
        }

        fn paint_fail(&mut self, _message: &str) {
            self.fails += 1;
        }

        fn paint_exception(&mut self, exception: &ExceptionInfo) {
            self.exceptions.push(exception.clone());
        }

        fn pass_count(&self) -> usize {
            self.passes
        }

        fn fail_count(&self) -> usize {
            self.fails
        }

        fn exception_count(&self) -> usize {
            self.exceptions.len()
        }
    }

    struct PassingCase;

    impl TestCase for PassingCase {
        fn name(&self) -> &str {
            "PassingCase"
        }

        fn methods(&self) -> Vec<String> {
            vec!["test_ok".to_string()]
        }

        fn invoke(&mut self, _method: &str, sink: &mut dyn EventSink) -> Result<(), InvokeError> {
            sink.paint_pass("ok");
            Ok(())
        }
    }

    #[test]
    fn test_default_paint_error_routes_to_exception() {
        let mut sink = CountingSink::default();
        sink.paint_error("fatal warning");

        assert_eq!(sink.exception_count(), 1);
        assert_eq!(sink.exceptions[0].kind, FailureKind::Error);
        assert_eq!(sink.exceptions[0].message, "fatal warning");
        assert_eq!(sink.fail_count(), 0);
    }

    #[test]
    fn test_default_status_tracks_fails_and_exceptions() {
        let mut sink = CountingSink::default();
        assert!(sink.status());

        sink.paint_pass("fine");
        assert!(sink.status());

        sink.paint_fail("nope");
        assert!(!sink.status());
    }

    #[test]
    fn test_default_structure_events_are_noops() {
        let mut sink = CountingSink::default();
        assert!(sink.paint_group_end("never started").is_ok());
        assert!(sink.paint_method_end("never started").is_ok());
        assert_eq!(
            sink.paint_signal("custom", &serde_json::json!({"a": 1})),
            SignalVerdict::Ignored
        );
    }

    #[test]
    fn test_mut_ref_forwards_to_inner() {
        fn drive<S: EventSink>(mut sink: S) {
            sink.paint_pass("x");
            sink.set_dry_run(true);
        }

        let mut inner = CountingSink::default();
        drive(&mut inner);
        assert_eq!(inner.pass_count(), 1);
        assert!(inner.is_dry_run());
    }

    #[test]
    fn test_boxed_dyn_sink_forwards() {
        let mut boxed: Box<dyn EventSink> = Box::new(CountingSink::default());
        boxed.paint_error("e");
        boxed.paint_fail("f");
        assert_eq!(boxed.exception_count(), 1);
        assert_eq!(boxed.fail_count(), 1);
        assert!(!boxed.status());
    }

    #[test]
    fn test_shared_sink_sees_events_from_every_handle() {
        let shared = Rc::new(RefCell::new(CountingSink::default()));
        let mut handle = Rc::clone(&shared);

        handle.invoke(&mut PassingCase, "test_ok").unwrap();
        handle.paint_fail("f");

        assert_eq!(shared.borrow().pass_count(), 1);
        assert_eq!(shared.borrow().fail_count(), 1);
    }

    /// Reads the shared sink from inside its own body.
    struct PeekingCase {
        peek: Rc<RefCell<CountingSink>>,
        seen: Option<usize>,
    }

    impl TestCase for PeekingCase {
        fn name(&self) -> &str {
            "PeekingCase"
        }

        fn methods(&self) -> Vec<String> {
            vec!["test_peek".to_string()]
        }

        fn invoke(&mut self, _method: &str, sink: &mut dyn EventSink) -> Result<(), InvokeError> {
            sink.paint_pass("ok");
            self.seen = Some(self.peek.borrow().pass_count());
            Ok(())
        }
    }

    #[test]
    fn test_shared_sink_is_readable_from_body() {
        let shared = Rc::new(RefCell::new(CountingSink::default()));
        let mut handle = Rc::clone(&shared);
        let mut case = PeekingCase {
            peek: Rc::clone(&shared),
            seen: None,
        };

        handle.invoke(&mut case, "test_peek").unwrap();

        assert_eq!(case.seen, Some(1));
        assert_eq!(shared.borrow().exception_count(), 0);
    }

    #[test]
    fn test_shared_sink_honours_dry_run() {
        let shared = Rc::new(RefCell::new(CountingSink::default()));
        let mut handle = Rc::clone(&shared);
        handle.set_dry_run(true);
        let mut case = PeekingCase {
            peek: Rc::clone(&shared),
            seen: None,
        };

        handle.invoke(&mut case, "test_peek").unwrap();

        assert_eq!(case.seen, None);
        assert_eq!(shared.borrow().pass_count(), 0);
    }
}
