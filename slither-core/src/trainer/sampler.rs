//! Episode collection.
use crate::{Env, Episode, StochasticPolicy};
use anyhow::Result;
use std::time::{Duration, SystemTime};

/// Collects whole episodes from an environment.
///
/// The sampler owns the environment and drives it with a policy, one episode
/// per call, freezing the per-step statistics of the policy into an
/// [`Episode`]. Episodes end when the environment terminates or when the
/// step budget runs out; a budget cut leaves the final non-terminal mask at
/// `1.0`, since the environment itself did not end the episode.
///
/// It also tracks the number of environment steps per second, which the
/// trainer reports periodically.
pub struct Sampler<E: Env> {
    env: E,
    max_steps: usize,

    /// Environment steps taken since the counter was reset.
    n_frames: usize,

    /// Time spent collecting since the counter was reset.
    time: Duration,
}

impl<E: Env> Sampler<E> {
    /// Creates a sampler with a per-episode step budget.
    ///
    /// # Panics
    ///
    /// Panics if `max_steps` is zero; an episode must contain at least one
    /// step.
    pub fn new(env: E, max_steps: usize) -> Self {
        assert!(max_steps > 0, "the step budget must be positive");
        Self {
            env,
            max_steps,
            n_frames: 0,
            time: Duration::new(0, 0),
        }
    }

    /// Runs one episode with the given policy.
    ///
    /// Each iteration freezes the value estimate and the sampling statistics
    /// of the observation before stepping, so the episode carries the
    /// quantities of the policy that actually produced the actions.
    pub fn sample_episode<P>(&mut self, policy: &mut P) -> Result<Episode<E>>
    where
        P: StochasticPolicy<E>,
    {
        let timer = SystemTime::now();
        let mut episode = Episode::with_capacity(self.max_steps);
        let mut obs = self.env.reset()?;

        for _ in 0..self.max_steps {
            let value = policy.estimate_value(&obs)?;
            let sampled = policy.sample_with_stats(&obs)?;
            let (step, _) = self.env.step(&sampled.act)?;

            let not_done = if step.is_terminated { 0.0 } else { 1.0 };
            episode.push(
                obs,
                sampled.act,
                sampled.logp,
                sampled.entropy,
                value,
                step.reward,
                not_done,
            );

            if step.is_terminated {
                break;
            }
            obs = step.obs;
        }

        self.n_frames += episode.len();
        self.time += timer.elapsed()?;
        Ok(episode)
    }

    /// Returns frames (environment steps) per second, then resets the
    /// internal counters.
    pub fn fps(&mut self) -> f32 {
        let fps = 1000. * self.n_frames as f32 / self.time.as_millis() as f32;
        self.reset_fps_counter();
        fps
    }

    /// Resets the frame counter and the timer used for [`Sampler::fps`].
    pub fn reset_fps_counter(&mut self) {
        self.n_frames = 0;
        self.time = Duration::new(0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::{Act, Episode, Obs, Policy, SampledAction, Step};

    /// Terminates after a fixed number of steps, rewarding 1 per step.
    struct CountdownEnv {
        steps_left: usize,
        horizon: usize,
    }

    #[derive(Clone, Debug)]
    struct UnitObs;

    impl Obs for UnitObs {
        fn dim(&self) -> usize {
            1
        }
    }

    #[derive(Clone, Debug)]
    struct UnitAct;

    impl Act for UnitAct {}

    impl Env for CountdownEnv {
        type Config = usize;
        type Obs = UnitObs;
        type Act = UnitAct;
        type Info = ();

        fn build(config: &usize, _seed: u64) -> Result<Self> {
            Ok(Self {
                steps_left: *config,
                horizon: *config,
            })
        }

        fn reset(&mut self) -> Result<UnitObs> {
            self.steps_left = self.horizon;
            Ok(UnitObs)
        }

        fn reset_with_seed(&mut self, _seed: u64) -> Result<UnitObs> {
            self.reset()
        }

        fn step(&mut self, a: &UnitAct) -> Result<(Step<Self>, Record)> {
            self.steps_left -= 1;
            let done = self.steps_left == 0;
            let step = Step::new(UnitObs, a.clone(), 1.0, done, false, ());
            Ok((step, Record::empty()))
        }
    }

    struct FixedPolicy;

    impl Policy<CountdownEnv> for FixedPolicy {
        fn sample(&mut self, _: &UnitObs) -> UnitAct {
            UnitAct
        }
    }

    impl StochasticPolicy<CountdownEnv> for FixedPolicy {
        fn sample_with_stats(&mut self, _: &UnitObs) -> Result<SampledAction<CountdownEnv>> {
            Ok(SampledAction {
                act: UnitAct,
                logp: -0.5,
                entropy: 0.5,
            })
        }

        fn estimate_value(&mut self, _: &UnitObs) -> Result<f32> {
            Ok(0.25)
        }
    }

    fn collect(horizon: usize, budget: usize) -> Episode<CountdownEnv> {
        let env = CountdownEnv::build(&horizon, 0).unwrap();
        let mut sampler = Sampler::new(env, budget);
        sampler.sample_episode(&mut FixedPolicy).unwrap()
    }

    #[test]
    fn test_terminated_episode() {
        let episode = collect(3, 10);
        assert_eq!(episode.len(), 3);
        assert_eq!(episode.not_dones, vec![1.0, 1.0, 0.0]);
        assert_eq!(episode.ret(), 3.0);
        assert_eq!(episode.values, vec![0.25; 3]);
        assert_eq!(episode.logps, vec![-0.5; 3]);
    }

    #[test]
    fn test_budget_truncation_keeps_mask() {
        let episode = collect(10, 4);
        assert_eq!(episode.len(), 4);
        // The cut is not an environment terminal.
        assert_eq!(episode.not_dones, vec![1.0; 4]);
    }
}
