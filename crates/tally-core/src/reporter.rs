//! Hierarchical reporter.
//!
//! [`Reporter`] tracks test nesting on a name stack and fires document-level
//! header and footer hooks when the stack leaves and returns to empty. It is
//! the base on which page-style displays are built: renderers implement
//! [`ReportHooks`] and the reporter decides when those hooks fire.
//!
//! # Nesting
//!
//! ```text
//! depth 0 ──group/case start──▶ depth 1   paint_header(name)
//! depth 1 ──group/case end────▶ depth 0   paint_footer(name)
//! method start/end             push/pop   never header/footer
//! ```

use crate::runner::Runner;
use serde_json::Value;
use tally_proto::{
    Environment, EventSink, ExceptionInfo, InvokeError, ProcessEnvironment, SignalVerdict,
    SinkError, TestCase,
};
use tracing::{debug, warn};

/// Rendering hooks driven by a [`Reporter`].
///
/// All hooks default to no-ops. Concrete displays (HTML, plain text, ...)
/// override the ones they need.
pub trait ReportHooks {
    /// Document header, fired once when the first top-level test starts.
    fn paint_header(&mut self, _test_name: &str) {}

    /// Document footer, fired once the top-level test has unwound.
    fn paint_footer(&mut self, _test_name: &str) {}

    fn paint_message(&mut self, _message: &str) {}

    fn paint_formatted_message(&mut self, _message: &str) {}
}

/// Hooks that render nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ReportHooks for NoHooks {}

/// Event sink with nesting, size and progress tracking.
pub struct Reporter<H: ReportHooks = NoHooks> {
    runner: Runner,
    test_stack: Vec<String>,
    size: Option<usize>,
    progress: usize,
    hooks: H,
    environment: Box<dyn Environment>,
}

impl Default for Reporter<NoHooks> {
    fn default() -> Self {
        Self::new(NoHooks)
    }
}

impl<H: ReportHooks> Reporter<H> {
    /// Starts the display with no results in.
    pub fn new(hooks: H) -> Self {
        Self {
            runner: Runner::new(),
            test_stack: Vec::new(),
            size: None,
            progress: 0,
            hooks,
            environment: Box::new(ProcessEnvironment),
        }
    }

    /// Replaces the environment queried by [`Reporter::in_cli`].
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    /// Names of the tests currently open, outermost first.
    pub fn test_list(&self) -> &[String] {
        &self.test_stack
    }

    /// Total size in test cases, `None` until the first test starts.
    pub fn test_case_count(&self) -> Option<usize> {
        self.size
    }

    /// Number of test cases completed so far.
    pub fn test_case_progress(&self) -> usize {
        self.progress
    }

    /// Whether output goes to a command line.
    pub fn in_cli(&self) -> bool {
        self.environment.in_cli()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }

    /// Pushes a group or case, painting the header at top level.
    fn open(&mut self, test_name: &str) {
        if self.test_stack.is_empty() {
            debug!(test = test_name, "painting header");
            self.hooks.paint_header(test_name);
        }
        self.test_stack.push(test_name.to_string());
    }

    /// Pops a group or case, painting the footer once the stack unwinds.
    fn close(&mut self, event: &'static str, test_name: &str) -> Result<(), SinkError> {
        self.pop(event, test_name)?;
        if self.test_stack.is_empty() {
            debug!(test = test_name, "painting footer");
            self.hooks.paint_footer(test_name);
        }
        Ok(())
    }

    fn pop(&mut self, event: &'static str, test_name: &str) -> Result<(), SinkError> {
        if self.test_stack.pop().is_none() {
            warn!(event, test = test_name, "end event without matching start");
            return Err(SinkError::StackUnderflow {
                event,
                name: test_name.to_string(),
            });
        }
        Ok(())
    }
}

impl<H: ReportHooks> EventSink for Reporter<H> {
    fn set_dry_run(&mut self, is_dry: bool) {
        self.runner.set_dry_run(is_dry);
    }

    fn is_dry_run(&self) -> bool {
        self.runner.is_dry_run()
    }

    fn invoke(&mut self, test_case: &mut dyn TestCase, method: &str) -> Result<(), InvokeError> {
        if self.runner.is_dry_run() {
            return Ok(());
        }
        test_case.invoke(method, self)
    }

    fn paint_method_start(&mut self, test_name: &str) -> Result<(), SinkError> {
        self.test_stack.push(test_name.to_string());
        Ok(())
    }

    fn paint_method_end(&mut self, test_name: &str) -> Result<(), SinkError> {
        self.pop("paint_method_end", test_name)
    }

    /// Stashes a size of one if this is the first test to start.
    fn paint_case_start(&mut self, test_name: &str) -> Result<(), SinkError> {
        if self.size.is_none() {
            self.size = Some(1);
        }
        self.open(test_name);
        Ok(())
    }

    fn paint_case_end(&mut self, test_name: &str) -> Result<(), SinkError> {
        self.close("paint_case_end", test_name)?;
        self.progress += 1;
        Ok(())
    }

    /// Stashes `size` if this is the first test to start.
    fn paint_group_start(&mut self, test_name: &str, size: usize) -> Result<(), SinkError> {
        if self.size.is_none() {
            self.size = Some(size);
        }
        self.open(test_name);
        Ok(())
    }

    fn paint_group_end(&mut self, test_name: &str) -> Result<(), SinkError> {
        self.close("paint_group_end", test_name)
    }

    fn paint_pass(&mut self, message: &str) {
        self.runner.paint_pass(message);
    }

    fn paint_fail(&mut self, message: &str) {
        self.runner.paint_fail(message);
    }

    fn paint_exception(&mut self, exception: &ExceptionInfo) {
        self.runner.paint_exception(exception);
    }

    fn paint_message(&mut self, message: &str) {
        self.hooks.paint_message(message);
    }

    fn paint_formatted_message(&mut self, message: &str) {
        self.hooks.paint_formatted_message(message);
    }

    fn paint_signal(&mut self, kind: &str, payload: &Value) -> SignalVerdict {
        self.runner.paint_signal(kind, payload)
    }

    fn pass_count(&self) -> usize {
        self.runner.pass_count()
    }

    fn fail_count(&self) -> usize {
        self.runner.fail_count()
    }

    fn exception_count(&self) -> usize {
        self.runner.exception_count()
    }
}
