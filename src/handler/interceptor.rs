//! Interceptor hooks and the per-request state they mutate.

use crate::outcome::descriptor::Outcome;
use crate::outcome::failure::Failure;
use crate::routing::rule::Rule;

/// Accumulator threaded through one request's handler pipeline.
///
/// Owned by the invoker and lent out by unique reference; it never outlives the request.
#[derive(Debug, Default)]
pub struct ResultHolder {
    value: Option<Outcome>,
    failure: Option<Failure>,
    halted: bool,
}

impl ResultHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&Outcome> {
        self.value.as_ref()
    }

    /// Record a produced outcome.
    ///
    /// `Failed` is recorded as the pending failure and `Empty` leaves the current value alone.
    pub fn set_value(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Failed(failure) => self.failure = Some(failure),
            Outcome::Empty => {}
            other => self.value = Some(other),
        }
    }

    pub fn take_value(&mut self) -> Option<Outcome> {
        self.value.take()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn set_failure(&mut self, failure: Failure) {
        self.failure = Some(failure);
    }

    pub fn take_failure(&mut self) -> Option<Failure> {
        self.failure.take()
    }

    /// Set the value and skip every handler method that has not run yet.
    pub fn halt(&mut self, outcome: Outcome) {
        self.set_value(outcome);
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether the pipeline must stop before the next handler method.
    pub fn should_stop(&self) -> bool {
        self.halted || self.failure.is_some()
    }

    /// Collapse the holder into the pipeline's outcome. A pending failure wins.
    pub fn into_outcome(self) -> Outcome {
        match (self.failure, self.value) {
            (Some(failure), _) => Outcome::Failed(failure),
            (None, Some(value)) => value,
            (None, None) => Outcome::Empty,
        }
    }
}

/// The failure currently propagating out of a pipeline step.
#[derive(Debug, Default)]
pub struct FailureHandler {
    failure: Option<Failure>,
}

impl FailureHandler {
    pub fn new(failure: Option<Failure>) -> Self {
        Self { failure }
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.failure.is_some()
    }

    /// Suppress the propagating failure, returning it.
    pub fn cancel(&mut self) -> Option<Failure> {
        self.failure.take()
    }

    pub fn replace(&mut self, failure: Failure) -> Option<Failure> {
        self.failure.replace(failure)
    }

    pub fn into_failure(self) -> Option<Failure> {
        self.failure
    }
}

/// Hooks run around each handler of a rule.
///
/// `pre_handle` runs in declaration order and may stop the handler from running with
/// [`ResultHolder::halt`]. `post_handle` runs in reverse order for every interceptor
/// whose `pre_handle` ran, even when the handler failed; the pending failure is held
/// by the [`FailureHandler`] during that phase, not by the holder.
pub trait Interceptor: Send + Sync {
    fn pre_handle(&self, rule: &Rule, holder: &mut ResultHolder) {
        let _ = (rule, holder);
    }

    fn post_handle(&self, rule: &Rule, holder: &mut ResultHolder, failures: &mut FailureHandler) {
        let _ = (rule, holder, failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_does_not_overwrite_value() {
        let mut holder = ResultHolder::new();
        holder.set_value(Outcome::Forward("/a".into()));
        holder.set_value(Outcome::Empty);
        assert!(matches!(holder.value(), Some(Outcome::Forward(path)) if path == "/a"));

        holder.set_value(Outcome::Forward("/b".into()));
        assert!(matches!(holder.into_outcome(), Outcome::Forward(path) if path == "/b"));
    }

    #[test]
    fn test_failed_value_becomes_pending_failure() {
        let mut holder = ResultHolder::new();
        holder.set_value(Outcome::Forward("/a".into()));
        holder.set_value(Outcome::Failed(Failure::new("runtime", "boom")));
        assert!(holder.should_stop());
        assert!(matches!(holder.into_outcome(), Outcome::Failed(f) if f.kind().as_str() == "runtime"));
    }

    #[test]
    fn test_failure_handler_cancel_and_replace() {
        let mut handler = FailureHandler::new(Some(Failure::new("a", "")));
        let previous = handler.replace(Failure::new("b", ""));
        assert_eq!(previous.unwrap().kind().as_str(), "a");
        assert_eq!(handler.cancel().unwrap().kind().as_str(), "b");
        assert!(!handler.is_pending());
    }
}
