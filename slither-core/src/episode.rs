//! Storage of one collected episode.
use crate::Env;

/// One episode of experience, stored as parallel per-field arrays.
///
/// All vectors have the same length. Index `t` holds the observation seen at
/// step `t`, the action taken on it, the statistics of the policy at the
/// time the action was drawn, the reward received, and the non-terminal mask
/// (`1.0` while the episode continues past step `t`, `0.0` on an
/// environment terminal).
///
/// A budget-truncated episode ends with mask `1.0`: the environment did not
/// terminate, so return bootstrapping continues through the cut.
pub struct Episode<E: Env> {
    /// Observations before each step.
    pub obss: Vec<E::Obs>,

    /// Actions applied.
    pub acts: Vec<E::Act>,

    /// Log-probabilities of the actions at collection time.
    pub logps: Vec<f32>,

    /// Entropies of the action distributions at collection time.
    pub entropies: Vec<f32>,

    /// State-value estimates at collection time.
    pub values: Vec<f32>,

    /// Rewards received.
    pub rewards: Vec<f32>,

    /// Non-terminal masks.
    pub not_dones: Vec<f32>,
}

impl<E: Env> Episode<E> {
    /// Creates an empty episode.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty episode with room for `capacity` steps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            obss: Vec::with_capacity(capacity),
            acts: Vec::with_capacity(capacity),
            logps: Vec::with_capacity(capacity),
            entropies: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity),
            not_dones: Vec::with_capacity(capacity),
        }
    }

    /// Appends one step.
    #[allow(clippy::too_many_arguments)]
    pub fn push(
        &mut self,
        obs: E::Obs,
        act: E::Act,
        logp: f32,
        entropy: f32,
        value: f32,
        reward: f32,
        not_done: f32,
    ) {
        self.obss.push(obs);
        self.acts.push(act);
        self.logps.push(logp);
        self.entropies.push(entropy);
        self.values.push(value);
        self.rewards.push(reward);
        self.not_dones.push(not_done);
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if the episode holds no steps.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Undiscounted sum of rewards of the episode.
    pub fn ret(&self) -> f32 {
        self.rewards.iter().sum()
    }
}

impl<E: Env> Default for Episode<E> {
    fn default() -> Self {
        Self::new()
    }
}
