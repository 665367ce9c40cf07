//! Environment interface.
use super::step::Step;
use crate::record::Record;
use anyhow::Result;
use std::fmt::Debug;

/// Observation of an environment.
pub trait Obs: Clone + Debug {
    /// Number of scalar elements in the flattened observation.
    ///
    /// Agents use this to validate the observation shape against their model
    /// input instead of silently reshaping.
    fn dim(&self) -> usize;
}

/// Action of an environment.
pub trait Act: Clone + Debug {}

/// Environment.
///
/// An environment owns its state and random number generator. Given a seed,
/// episodes are reproducible.
pub trait Env {
    /// Configuration of the environment, from which it is constructed.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in a [`Step`] object.
    type Info: super::step::Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: u64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment to an initial state and returns the first
    /// observation of the new episode.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Reseeds the internal random number generator, then resets.
    ///
    /// Evaluation runs use this to get a deterministic set of episodes.
    fn reset_with_seed(&mut self, seed: u64) -> Result<Self::Obs>;

    /// Applies an action and performs one state transition.
    ///
    /// Fails on an invalid action, on a step after the episode has ended,
    /// and when the environment cannot uphold its own invariants (for
    /// example, respawning a target on a grid with no free cell left).
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;
}
