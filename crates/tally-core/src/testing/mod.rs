//! Test doubles for exercising sinks and decorator chains.

mod recording;
mod scripted;

pub use recording::{HookCall, RecordingHooks, RecordingSink, SinkEvent};
pub use scripted::ScriptedCase;
