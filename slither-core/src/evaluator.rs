//! Evaluate [`Policy`](crate::Policy).
mod default_evaluator;
use crate::{Env, Policy};
use anyhow::Result;
pub use default_evaluator::DefaultEvaluator;

/// Evaluates a policy and returns a performance measure.
pub trait Evaluator<E: Env, P: Policy<E>> {
    /// Evaluate the policy.
    ///
    /// The caller is expected to have switched the policy to evaluation
    /// mode beforehand, where that distinction exists.
    fn evaluate(&mut self, policy: &mut P) -> Result<f32>;
}
