//! Environment step.
use super::Env;
use std::fmt::Debug;

/// Additional information passed to an agent.
///
/// The environment decides what to put here. [`Info`] for `()` is provided
/// for environments that have nothing to report.
pub trait Info: Debug {}

impl Info for () {}

/// All the outcomes of a single environment step.
#[derive(Debug)]
pub struct Step<E: Env> {
    /// Action applied at this step.
    pub act: E::Act,

    /// Observation after the state transition.
    pub obs: E::Obs,

    /// Reward of this step.
    pub reward: f32,

    /// Flag denoting if the episode ended inside the environment
    /// (crash, stagnation or another terminal rule).
    pub is_terminated: bool,

    /// Flag denoting if the episode was cut from outside the environment.
    ///
    /// Environments leave this `false`; the step-budget cut is owned by the
    /// collector driving the episode.
    pub is_truncated: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    /// Returns `true` if the episode ends at this step for any reason.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}
