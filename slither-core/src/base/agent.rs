//! Agent.
use super::{Env, StochasticPolicy};
use crate::{record::Record, Episode};
use anyhow::Result;

/// A trainable policy.
///
/// An agent is in either training or evaluation mode. In training mode the
/// policy is stochastic and the agent accepts optimization steps; in
/// evaluation mode the policy is greedy.
pub trait Agent<E: Env>: StochasticPolicy<E> {
    /// Set the agent to training mode.
    fn train(&mut self);

    /// Set the agent to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization on a collected episode.
    ///
    /// `returns` are the discounted returns of the episode's steps, parallel
    /// to the episode's arrays. The episode carries the statistics frozen at
    /// collection time (log-probabilities, value estimates); implementations
    /// must not recompute those against the updated parameters.
    ///
    /// Returns a [`Record`] with losses and other training diagnostics.
    fn opt(&mut self, episode: &Episode<E>, returns: &[f32]) -> Result<Record>;
}
