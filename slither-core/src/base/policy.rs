//! Policy.
use super::Env;
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::{fs::File, io::BufReader, path::Path};

/// A mapping from an observation to an action.
///
/// The mapping can be either of deterministic or stochastic.
pub trait Policy<E: Env> {
    /// Sample an action given an observation.
    fn sample(&mut self, obs: &E::Obs) -> E::Act;
}

/// An action drawn from a stochastic policy, together with the statistics
/// of the draw at sampling time.
///
/// These statistics are frozen by the collector: on-policy updates compare
/// the current policy against the one that produced the actions, so the
/// log-probability must come from collection time, not be recomputed later.
#[derive(Debug)]
pub struct SampledAction<E: Env> {
    /// The sampled action.
    pub act: E::Act,

    /// Log-probability of the sampled action under the policy.
    pub logp: f32,

    /// Entropy of the action distribution at this observation.
    pub entropy: f32,
}

/// A stochastic policy with a value estimate.
///
/// On-policy methods need more than an action from the policy at collection
/// time: the probability of the action and a state-value baseline, both
/// taken under the parameters that produced the action.
pub trait StochasticPolicy<E: Env>: Policy<E> {
    /// Draws an action and reports the statistics of the draw.
    fn sample_with_stats(&mut self, obs: &E::Obs) -> Result<SampledAction<E>>;

    /// Estimates the state value of the given observation.
    fn estimate_value(&mut self, obs: &E::Obs) -> Result<f32>;
}

/// An object that can be constructed from a configuration.
pub trait Configurable {
    /// Configuration from which the object is built.
    type Config: Clone;

    /// Builds the object.
    fn build(config: Self::Config) -> Self;

    /// Builds the object from a YAML configuration file.
    fn build_from_path(path: impl AsRef<Path>) -> Result<Self>
    where
        Self: Sized,
        Self::Config: DeserializeOwned,
    {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(Self::build(config))
    }
}
