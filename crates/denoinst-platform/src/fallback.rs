use std::fmt::Display;

use log::debug;

/// Ordered list of strategies for resolving one value.
///
/// Each strategy runs only if every earlier one failed. Failures are logged
/// and swallowed; callers only ever see the first success or `None`.
pub struct FallbackChain<T> {
    what: &'static str,
    resolved: Option<T>,
}

impl<T> FallbackChain<T> {
    #[must_use]
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            resolved: None,
        }
    }

    #[must_use]
    pub fn attempt<E: Display>(
        mut self,
        strategy: &str,
        resolve: impl FnOnce() -> Result<T, E>,
    ) -> Self {
        if self.resolved.is_none() {
            match resolve() {
                Ok(value) => self.resolved = Some(value),
                Err(error) => debug!("{} via {strategy} failed: {error}", self.what),
            }
        }
        self
    }

    #[must_use]
    pub fn attempt_option(self, strategy: &str, resolve: impl FnOnce() -> Option<T>) -> Self {
        self.attempt(strategy, || resolve().ok_or("no value"))
    }

    #[must_use]
    pub fn resolve(self) -> Option<T> {
        self.resolved
    }
}
