use super::Evaluator;
use crate::{Env, Policy};
use anyhow::Result;

/// A default implementation of [`Evaluator`].
///
/// This evaluator runs a fixed number of episodes, reseeding the environment
/// with the episode index so every evaluation sees the same set of initial
/// states, and returns the mean of the episode returns. Each episode is
/// capped at `max_steps`: unlike environments that end on their own, a
/// policy circling an empty lane would otherwise never terminate.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    max_steps: usize,
    env: E,
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs [`DefaultEvaluator`].
    ///
    /// `n_episodes` is the number of episodes an evaluation averages over
    /// and `max_steps` the step cap of each of them.
    pub fn new(config: &E::Config, seed: u64, n_episodes: usize, max_steps: usize) -> Result<Self> {
        assert!(n_episodes > 0, "evaluation needs at least one episode");
        assert!(max_steps > 0, "the evaluation step cap must be positive");
        Ok(Self {
            n_episodes,
            max_steps,
            env: E::build(config, seed)?,
        })
    }
}

impl<E, P> Evaluator<E, P> for DefaultEvaluator<E>
where
    E: Env,
    P: Policy<E>,
{
    fn evaluate(&mut self, policy: &mut P) -> Result<f32> {
        let mut r_total = 0f32;

        for ix in 0..self.n_episodes {
            let mut obs = self.env.reset_with_seed(ix as u64)?;

            for _ in 0..self.max_steps {
                let act = policy.sample(&obs);
                let (step, _) = self.env.step(&act)?;
                r_total += step.reward;
                if step.is_done() {
                    break;
                }
                obs = step.obs;
            }
        }

        Ok(r_total / self.n_episodes as f32)
    }
}
