//! Sink decorators.
//!
//! A decorator wraps another sink and forwards every event to it unchanged,
//! so behaviour such as soak testing can be layered onto any reporter
//! without touching it. Decorators hold no counters of their own: accessors
//! read straight through to the wrapped sink, which keeps chained
//! decorators from double counting.
//!
//! ```text
//! TestCase ──▶ RepeatDecorator ──▶ Decorator ──▶ Reporter
//!                 (invoke ×N)       (forward)     (counts)
//! ```
//!
//! The target may be owned, borrowed (`&mut S`) or shared
//! (`Rc<RefCell<S>>`); the decorator never manages its lifecycle.

use serde_json::Value;
use tally_proto::{EventSink, ExceptionInfo, InvokeError, SignalVerdict, SinkError, TestCase};

/// Implements every [`EventSink`] method except `invoke` by forwarding to
/// `self.$target`.
macro_rules! forward_to_target {
    ($target:ident) => {
        fn set_dry_run(&mut self, is_dry: bool) {
            self.$target.set_dry_run(is_dry);
        }

        fn is_dry_run(&self) -> bool {
            self.$target.is_dry_run()
        }

        fn status(&self) -> bool {
            self.$target.status()
        }

        fn paint_method_start(&mut self, name: &str) -> Result<(), SinkError> {
            self.$target.paint_method_start(name)
        }

        fn paint_method_end(&mut self, name: &str) -> Result<(), SinkError> {
            self.$target.paint_method_end(name)
        }

        fn paint_case_start(&mut self, name: &str) -> Result<(), SinkError> {
            self.$target.paint_case_start(name)
        }

        fn paint_case_end(&mut self, name: &str) -> Result<(), SinkError> {
            self.$target.paint_case_end(name)
        }

        fn paint_group_start(&mut self, name: &str, size: usize) -> Result<(), SinkError> {
            self.$target.paint_group_start(name, size)
        }

        fn paint_group_end(&mut self, name: &str) -> Result<(), SinkError> {
            self.$target.paint_group_end(name)
        }

        fn paint_pass(&mut self, message: &str) {
            self.$target.paint_pass(message);
        }

        fn paint_fail(&mut self, message: &str) {
            self.$target.paint_fail(message);
        }

        fn paint_error(&mut self, message: &str) {
            self.$target.paint_error(message);
        }

        fn paint_exception(&mut self, exception: &ExceptionInfo) {
            self.$target.paint_exception(exception);
        }

        fn paint_message(&mut self, message: &str) {
            self.$target.paint_message(message);
        }

        fn paint_formatted_message(&mut self, message: &str) {
            self.$target.paint_formatted_message(message);
        }

        fn paint_signal(&mut self, kind: &str, payload: &Value) -> SignalVerdict {
            self.$target.paint_signal(kind, payload)
        }

        fn pass_count(&self) -> usize {
            self.$target.pass_count()
        }

        fn fail_count(&self) -> usize {
            self.$target.fail_count()
        }

        fn exception_count(&self) -> usize {
            self.$target.exception_count()
        }
    };
}

/// Do-nothing decorator: forwards everything to the wrapped sink.
///
/// `invoke` runs the method once on the test case directly, with this
/// decorator as the sink for the body's events. It does not consult the
/// wrapped sink's dry-run flag.
#[derive(Debug, Clone, Default)]
pub struct Decorator<S> {
    target: S,
}

impl<S: EventSink> Decorator<S> {
    /// Takes in the sink to wrap.
    pub fn new(target: S) -> Self {
        Self { target }
    }

    pub fn inner(&self) -> &S {
        &self.target
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.target
    }

    pub fn into_inner(self) -> S {
        self.target
    }
}

impl<S: EventSink> EventSink for Decorator<S> {
    forward_to_target!(target);

    fn invoke(&mut self, test_case: &mut dyn TestCase, method: &str) -> Result<(), InvokeError> {
        test_case.invoke(method, self)
    }
}

/// Soak-testing decorator: invokes every test method `count` times.
///
/// Stops at the first invocation that fails, returning its error. Unlike
/// the plain [`Decorator`], it honours the wrapped sink's dry-run flag.
#[derive(Debug, Clone)]
pub struct RepeatDecorator<S> {
    target: S,
    count: u32,
}

impl<S: EventSink> RepeatDecorator<S> {
    /// Wraps `target`, repeating each invocation `count` times (at least once).
    pub fn new(target: S, count: u32) -> Self {
        Self {
            target,
            count: count.max(1),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn inner(&self) -> &S {
        &self.target
    }

    pub fn into_inner(self) -> S {
        self.target
    }
}

impl<S: EventSink> EventSink for RepeatDecorator<S> {
    forward_to_target!(target);

    fn invoke(&mut self, test_case: &mut dyn TestCase, method: &str) -> Result<(), InvokeError> {
        if self.target.is_dry_run() {
            return Ok(());
        }
        for _ in 0..self.count {
            test_case.invoke(method, self)?;
        }
        Ok(())
    }
}
