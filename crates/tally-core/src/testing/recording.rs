//! Recording sink and hooks.

use crate::reporter::ReportHooks;
use crate::runner::Runner;
use serde::Serialize;
use serde_json::Value;
use tally_proto::{EventSink, ExceptionInfo, InvokeError, SignalVerdict, SinkError, TestCase};

/// A rendering hook call captured by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "hook", content = "text", rename_all = "snake_case")]
pub enum HookCall {
    Header(String),
    Footer(String),
    Message(String),
    FormattedMessage(String),
}

/// Hooks that remember every call instead of rendering.
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    calls: Vec<HookCall>,
}

impl RecordingHooks {
    pub fn calls(&self) -> &[HookCall] {
        &self.calls
    }

    /// Test names passed to `paint_header`, in order.
    pub fn headers(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HookCall::Header(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Test names passed to `paint_footer`, in order.
    pub fn footers(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HookCall::Footer(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ReportHooks for RecordingHooks {
    fn paint_header(&mut self, test_name: &str) {
        self.calls.push(HookCall::Header(test_name.to_string()));
    }

    fn paint_footer(&mut self, test_name: &str) {
        self.calls.push(HookCall::Footer(test_name.to_string()));
    }

    fn paint_message(&mut self, message: &str) {
        self.calls.push(HookCall::Message(message.to_string()));
    }

    fn paint_formatted_message(&mut self, message: &str) {
        self.calls.push(HookCall::FormattedMessage(message.to_string()));
    }
}

/// An event received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SinkEvent {
    GroupStart { name: String, size: usize },
    GroupEnd(String),
    CaseStart(String),
    CaseEnd(String),
    MethodStart(String),
    MethodEnd(String),
    /// A test body actually ran.
    Invoke(String),
    Pass(String),
    Fail(String),
    Error(String),
    Exception(ExceptionInfo),
    Message(String),
    FormattedMessage(String),
    Signal { kind: String, payload: Value },
}

/// Sink that records every event in arrival order.
///
/// Counting is delegated to an embedded [`Runner`], so `paint_error` is
/// recorded as an error but counted as an exception.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    runner: Runner,
    events: Vec<SinkEvent>,
    signal_verdict: SignalVerdict,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every signal with `verdict`.
    pub fn with_signal_verdict(mut self, verdict: SignalVerdict) -> Self {
        self.signal_verdict = verdict;
        self
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Serializes the recorded events as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.events)
    }
}

impl EventSink for RecordingSink {
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
        self.events.push(SinkEvent::Invoke(method.to_string()));
        test_case.invoke(method, self)
    }

    fn paint_method_start(&mut self, name: &str) -> Result<(), SinkError> {
        self.events.push(SinkEvent::MethodStart(name.to_string()));
        Ok(())
    }

    fn paint_method_end(&mut self, name: &str) -> Result<(), SinkError> {
        self.events.push(SinkEvent::MethodEnd(name.to_string()));
        Ok(())
    }

    fn paint_case_start(&mut self, name: &str) -> Result<(), SinkError> {
        self.events.push(SinkEvent::CaseStart(name.to_string()));
        Ok(())
    }

    fn paint_case_end(&mut self, name: &str) -> Result<(), SinkError> {
        self.events.push(SinkEvent::CaseEnd(name.to_string()));
        Ok(())
    }

    fn paint_group_start(&mut self, name: &str, size: usize) -> Result<(), SinkError> {
        self.events.push(SinkEvent::GroupStart {
            name: name.to_string(),
            size,
        });
        Ok(())
    }

    fn paint_group_end(&mut self, name: &str) -> Result<(), SinkError> {
        self.events.push(SinkEvent::GroupEnd(name.to_string()));
        Ok(())
    }

    fn paint_pass(&mut self, message: &str) {
        self.events.push(SinkEvent::Pass(message.to_string()));
        self.runner.paint_pass(message);
    }

    fn paint_fail(&mut self, message: &str) {
        self.events.push(SinkEvent::Fail(message.to_string()));
        self.runner.paint_fail(message);
    }

    fn paint_error(&mut self, message: &str) {
        self.events.push(SinkEvent::Error(message.to_string()));
        self.runner.paint_error(message);
    }

    fn paint_exception(&mut self, exception: &ExceptionInfo) {
        self.events.push(SinkEvent::Exception(exception.clone()));
        self.runner.paint_exception(exception);
    }

    fn paint_message(&mut self, message: &str) {
        self.events.push(SinkEvent::Message(message.to_string()));
    }

    fn paint_formatted_message(&mut self, message: &str) {
        self.events
            .push(SinkEvent::FormattedMessage(message.to_string()));
    }

    fn paint_signal(&mut self, kind: &str, payload: &Value) -> SignalVerdict {
        self.events.push(SinkEvent::Signal {
            kind: kind.to_string(),
            payload: payload.clone(),
        });
        self.signal_verdict
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
