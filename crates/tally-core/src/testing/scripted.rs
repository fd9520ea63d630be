//! Closure-backed test case.

use std::fmt;
use tally_proto::{EventSink, InvokeError, TestCase};

type Body = Box<dyn FnMut(&mut dyn EventSink) -> Result<(), InvokeError>>;

/// Test case whose methods are closures registered by name.
///
/// Keeps a log of every method it actually ran, which lets tests tell a
/// dry run apart from a real one.
pub struct ScriptedCase {
    name: String,
    methods: Vec<(String, Body)>,
    invocations: Vec<String>,
}

impl ScriptedCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            invocations: Vec::new(),
        }
    }

    /// Registers a method body under `name`.
    pub fn with_method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: FnMut(&mut dyn EventSink) -> Result<(), InvokeError> + 'static,
    {
        self.methods.push((name.into(), Box::new(body)));
        self
    }

    /// Registers a method that does nothing, e.g. a fixture helper.
    pub fn with_noop(self, name: impl Into<String>) -> Self {
        self.with_method(name, |_| Ok(()))
    }

    /// Names of the methods run so far, in order.
    pub fn invocations(&self) -> &[String] {
        &self.invocations
    }
}

impl fmt::Debug for ScriptedCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedCase")
            .field("name", &self.name)
            .field("methods", &self.methods())
            .field("invocations", &self.invocations)
            .finish()
    }
}

impl TestCase for ScriptedCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> Vec<String> {
        self.methods.iter().map(|(name, _)| name.clone()).collect()
    }

    fn invoke(&mut self, method: &str, sink: &mut dyn EventSink) -> Result<(), InvokeError> {
        let Some((_, body)) = self.methods.iter_mut().find(|(name, _)| name == method) else {
            return Err(InvokeError::UnknownMethod(method.to_string()));
        };
        self.invocations.push(method.to_string());
        body(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Runner;

    #[test]
    fn test_methods_in_registration_order() {
        let case = ScriptedCase::new("Case")
            .with_noop("setUp")
            .with_noop("testB")
            .with_noop("testA");

        assert_eq!(case.name(), "Case");
        assert_eq!(case.methods(), ["setUp", "testB", "testA"]);
    }

    #[test]
    fn test_unknown_method() {
        let mut case = ScriptedCase::new("Case");
        let mut runner = Runner::new();

        let result = case.invoke("testMissing", &mut runner);

        assert!(matches!(result, Err(InvokeError::UnknownMethod(name)) if name == "testMissing"));
        assert!(case.invocations().is_empty());
    }
}
