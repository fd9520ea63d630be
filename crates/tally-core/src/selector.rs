//! Test method selection policy.
//!
//! Decides which methods of a test case count as tests. The policy is a pure
//! predicate over the method name, injected per run, so a suite can adopt a
//! different naming convention (e.g. behaviour-style `should...` methods)
//! without touching the event handling.

use std::fmt;
use std::sync::Arc;

/// Default prefix marking a method as a test.
pub const DEFAULT_TEST_PREFIX: &str = "test";

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Predicate deciding whether a method name is a test.
#[derive(Clone)]
pub struct TestSelector {
    predicate: Predicate,
    description: String,
}

impl TestSelector {
    /// Matches methods whose name starts with `prefix`, ignoring ASCII case.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let description = format!("prefix {prefix:?}");
        Self {
            predicate: Arc::new(move |name: &str| has_prefix_ignore_case(name, &prefix)),
            description,
        }
    }

    /// Uses an arbitrary predicate.
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: "custom predicate".to_string(),
        }
    }

    pub fn is_test(&self, method: &str) -> bool {
        (self.predicate)(method)
    }

    /// Filters `methods` down to tests, keeping their order.
    pub fn select<'a, I>(&self, methods: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a String>,
    {
        methods
            .into_iter()
            .map(String::as_str)
            .filter(|method| self.is_test(method))
            .collect()
    }
}

impl Default for TestSelector {
    fn default() -> Self {
        Self::prefix(DEFAULT_TEST_PREFIX)
    }
}

impl fmt::Debug for TestSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSelector")
            .field("policy", &self.description)
            .finish()
    }
}

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_default_selects_test_prefix() {
        let selector = TestSelector::default();
        assert!(selector.is_test("testAddition"));
        assert!(selector.is_test("test_addition"));
        assert!(selector.is_test("TestUpper"));
        assert!(!selector.is_test("setUp"));
        assert!(!selector.is_test("tes"));
        assert!(!selector.is_test("helper_test"));
    }

    #[test]
    fn test_behaviour_style_prefix() {
        let selector = TestSelector::prefix("should");
        assert!(selector.is_test("shouldBeRun"));
        assert!(selector.is_test("SHOULD_handle_empty"));
        assert!(!selector.is_test("testFail"));
    }

    #[test]
    fn test_select_keeps_order() {
        let methods = names(&["setUp", "testB", "helper", "testA", "tearDown"]);
        let selected = TestSelector::default().select(&methods);
        assert_eq!(selected, ["testB", "testA"]);
    }

    #[test]
    fn test_custom_predicate() {
        let selector = TestSelector::from_fn(|name| name.ends_with("_spec"));
        let methods = names(&["parses_spec", "test_other", "renders_spec"]);
        assert_eq!(selector.select(&methods), ["parses_spec", "renders_spec"]);
    }

    #[test]
    fn test_prefix_on_multibyte_boundary() {
        let selector = TestSelector::prefix("te");
        assert!(!selector.is_test("tésting"));
        assert!(!selector.is_test("é"));
    }

    #[test]
    fn test_debug_names_policy() {
        let rendered = format!("{:?}", TestSelector::prefix("should"));
        assert!(rendered.contains("prefix \\\"should\\\""), "{rendered}");
    }
}
