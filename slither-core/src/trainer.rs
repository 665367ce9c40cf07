//! Train [`Agent`].
mod config;
mod sampler;
use std::time::{Duration, SystemTime};

use crate::{
    error::SlitherError,
    record::{Record, RecordValue, RecordValue::Scalar, Recorder},
    returns::discounted_returns,
    Agent, Env, Evaluator,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
pub use sampler::Sampler;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop and related objects.
///
/// # Training loop
///
/// Training loop looks like following:
///
/// 0. Given an agent implementing [`Agent`] and a recorder implementing
///    [`Recorder`].
/// 1. Build an instance of [`Env`] from the environment configuration and
///    wrap it in a [`Sampler`] carrying the per-episode step budget.
/// 2. For each episode until `max_episodes`:
///     1. Collect one episode with the agent's stochastic policy. The
///        sampler freezes the log-probability and value estimate of every
///        step at collection time.
///     2. Compute the discounted returns of the episode with
///        [`discounted_returns`] and fail with
///        [`SlitherError::NonFiniteValue`] if any of them is NaN or
///        infinite.
///     3. Do an optimization step for the agent on the frozen episode and
///        check the reported losses for finiteness the same way.
///     4. If `episode % eval_interval == 0`, run the evaluator with the
///        agent switched to evaluation mode and add the mean return to the
///        record as `"eval_return"`. The best value seen so far is logged.
///     5. If `episode % record_compute_cost_interval == 0`, add `"fps"` and
///        `"opt_episodes_per_sec"` to the record. As with `eval_interval`,
///        an interval of zero disables the step.
///     6. Write the record of this episode to the recorder.
///
/// # Interaction of objects
///
/// In [`Trainer::train()`] method, objects interact as shown below:
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|A
///     B -->|"Step&lt;E: Env&gt;"|C[Sampler]
///     C -->|"Episode&lt;E: Env&gt;"|A
/// ```
///
/// * First, [`Agent`] emits an [`Env::Act`] `a_t` based on [`Env::Obs`]
///   `o_t` received from [`Env`], together with the statistics of the draw.
///   Given `a_t`, [`Env`] changes its state and creates the observation at
///   the next step, `o_t+1`.
/// * The [`Sampler`] accumulates these transitions into an
///   [`Episode`](crate::Episode) until the environment terminates or the
///   step budget runs out.
/// * The completed episode, with its discounted returns, is consumed by a
///   single [`Agent::opt`] call. Nothing is replayed across episodes; the
///   buffer lives exactly as long as the episode it holds.
pub struct Trainer<E: Env> {
    /// Configuration of the training environment.
    env_config: E::Config,

    /// The number of episodes to train for.
    max_episodes: usize,

    /// Step budget of a single episode.
    max_steps_per_episode: usize,

    /// Discount factor.
    gamma: f32,

    /// Interval of evaluation in episodes.
    eval_interval: usize,

    /// Interval of recording computational cost in episodes.
    record_compute_cost_interval: usize,

    /// Seed of the training environment.
    seed: u64,

    /// Optimization steps for computing optimization steps per second.
    opts_for_ops: usize,

    /// Timer for computing optimization steps per second.
    timer_for_ops: Duration,

    /// The best mean evaluation return seen so far.
    max_eval_return: f32,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    ///
    /// Fails with [`SlitherError::InvalidConfig`] if the discount factor is
    /// outside `[0, 1]` or the step budget is zero.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.gamma) {
            return Err(SlitherError::InvalidConfig(format!(
                "gamma must be in [0, 1], got {}",
                config.gamma
            ))
            .into());
        }
        if config.max_steps_per_episode == 0 {
            return Err(
                SlitherError::InvalidConfig("max_steps_per_episode must be positive".into())
                    .into(),
            );
        }

        Ok(Self {
            env_config,
            max_episodes: config.max_episodes,
            max_steps_per_episode: config.max_steps_per_episode,
            gamma: config.gamma,
            eval_interval: config.eval_interval,
            record_compute_cost_interval: config.record_compute_cost_interval,
            seed: config.seed,
            opts_for_ops: 0,
            timer_for_ops: Duration::new(0, 0),
            max_eval_return: f32::MIN,
        })
    }

    /// Returns optimization steps per second, then resets the internal counter.
    fn opt_episodes_per_sec(&mut self) -> f32 {
        let osps = 1000. * self.opts_for_ops as f32 / (self.timer_for_ops.as_millis() as f32);
        self.opts_for_ops = 0;
        self.timer_for_ops = Duration::new(0, 0);
        osps
    }

    fn check_finite(values: &[f32], what: &str, episode: usize) -> Result<()> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SlitherError::NonFiniteValue {
                what: what.to_string(),
                episode,
            }
            .into());
        }
        Ok(())
    }

    fn check_finite_record(record: &Record, episode: usize) -> Result<()> {
        for (k, v) in record.iter() {
            if let RecordValue::Scalar(x) = v {
                if !x.is_finite() {
                    return Err(SlitherError::NonFiniteValue {
                        what: k.clone(),
                        episode,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Train the agent.
    pub fn train<A, R, D>(
        &mut self,
        agent: &mut A,
        recorder: &mut R,
        evaluator: &mut D,
    ) -> Result<()>
    where
        A: Agent<E>,
        R: Recorder,
        D: Evaluator<E, A>,
    {
        let env = E::build(&self.env_config, self.seed)?;
        let mut sampler = Sampler::new(env, self.max_steps_per_episode);
        sampler.reset_fps_counter();
        agent.train();

        for episode in 1..=self.max_episodes {
            let ep = sampler.sample_episode(agent)?;
            let returns = discounted_returns(&ep.rewards, &ep.not_dones, self.gamma);
            Self::check_finite(&returns, "return", episode)?;

            let timer = SystemTime::now();
            let record_agent = agent.opt(&ep, &returns)?;
            self.timer_for_ops += timer.elapsed()?;
            self.opts_for_ops += 1;
            Self::check_finite_record(&record_agent, episode)?;

            info!(
                "Episode {}, return {:.2}, length {}",
                episode,
                ep.ret(),
                ep.len()
            );

            let mut record = Record::from_slice(&[
                ("episode", Scalar(episode as f32)),
                ("episode_return", Scalar(ep.ret())),
                ("episode_length", Scalar(ep.len() as f32)),
            ]);
            record = record.merge(record_agent);

            // Add stats wrt computation cost
            if self.record_compute_cost_interval > 0
                && episode % self.record_compute_cost_interval == 0
            {
                record.insert("fps", Scalar(sampler.fps()));
                record.insert("opt_episodes_per_sec", Scalar(self.opt_episodes_per_sec()));
            }

            // Evaluation
            if self.eval_interval > 0 && episode % self.eval_interval == 0 {
                info!("Starts evaluation of the trained policy");
                agent.eval();
                let eval_return = evaluator.evaluate(agent)?;
                agent.train();
                record.insert("eval_return", Scalar(eval_return));

                if eval_return > self.max_eval_return {
                    self.max_eval_return = eval_return;
                    info!("Best evaluation return updated to {:.2}", eval_return);
                }
            }

            recorder.write(record);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BufferedRecorder;
    use crate::{Act, Episode, Obs, Policy, SampledAction, Step, StochasticPolicy};

    /// Walks a fixed number of steps, rewarding 1 per step, then terminates.
    struct WalkEnv {
        steps_left: usize,
        horizon: usize,
    }

    #[derive(Clone, Debug)]
    struct WalkObs;

    impl Obs for WalkObs {
        fn dim(&self) -> usize {
            1
        }
    }

    #[derive(Clone, Debug)]
    struct WalkAct;

    impl Act for WalkAct {}

    impl Env for WalkEnv {
        type Config = usize;
        type Obs = WalkObs;
        type Act = WalkAct;
        type Info = ();

        fn build(config: &usize, _seed: u64) -> Result<Self> {
            Ok(Self {
                steps_left: *config,
                horizon: *config,
            })
        }

        fn reset(&mut self) -> Result<WalkObs> {
            self.steps_left = self.horizon;
            Ok(WalkObs)
        }

        fn reset_with_seed(&mut self, _seed: u64) -> Result<WalkObs> {
            self.reset()
        }

        fn step(&mut self, a: &WalkAct) -> Result<(Step<Self>, Record)> {
            self.steps_left -= 1;
            let done = self.steps_left == 0;
            Ok((Step::new(WalkObs, a.clone(), 1.0, done, false, ()), Record::empty()))
        }
    }

    /// A non-learning agent that records what the trainer feeds it.
    struct ScriptedAgent {
        train_mode: bool,
        n_opts: usize,
        last_returns: Vec<f32>,
        loss: f32,
    }

    impl ScriptedAgent {
        fn new(loss: f32) -> Self {
            Self {
                train_mode: false,
                n_opts: 0,
                last_returns: vec![],
                loss,
            }
        }
    }

    impl Policy<WalkEnv> for ScriptedAgent {
        fn sample(&mut self, _: &WalkObs) -> WalkAct {
            WalkAct
        }
    }

    impl StochasticPolicy<WalkEnv> for ScriptedAgent {
        fn sample_with_stats(&mut self, _: &WalkObs) -> Result<SampledAction<WalkEnv>> {
            Ok(SampledAction {
                act: WalkAct,
                logp: -0.7,
                entropy: 1.0,
            })
        }

        fn estimate_value(&mut self, _: &WalkObs) -> Result<f32> {
            Ok(0.0)
        }
    }

    impl Agent<WalkEnv> for ScriptedAgent {
        fn train(&mut self) {
            self.train_mode = true;
        }

        fn eval(&mut self) {
            self.train_mode = false;
        }

        fn is_train(&self) -> bool {
            self.train_mode
        }

        fn opt(&mut self, episode: &Episode<WalkEnv>, returns: &[f32]) -> Result<Record> {
            assert_eq!(returns.len(), episode.len());
            self.n_opts += 1;
            self.last_returns = returns.to_vec();
            Ok(Record::from_scalar("loss", self.loss))
        }
    }

    struct CountingEvaluator {
        n_evals: usize,
    }

    impl<E: Env, P: Policy<E>> Evaluator<E, P> for CountingEvaluator {
        fn evaluate(&mut self, _policy: &mut P) -> Result<f32> {
            self.n_evals += 1;
            Ok(1.0)
        }
    }

    fn trainer(max_episodes: usize, horizon: usize, eval_interval: usize) -> Trainer<WalkEnv> {
        let config = TrainerConfig::default()
            .max_episodes(max_episodes)
            .max_steps_per_episode(10)
            .gamma(0.5)
            .eval_interval(eval_interval);
        Trainer::build(config, horizon).unwrap()
    }

    #[test]
    fn test_episode_loop_and_returns() -> Result<()> {
        let mut trainer = trainer(4, 3, 2);
        let mut agent = ScriptedAgent::new(0.1);
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = CountingEvaluator { n_evals: 0 };

        trainer.train(&mut agent, &mut recorder, &mut evaluator)?;

        assert_eq!(agent.n_opts, 4);
        // Rewards [1, 1, 1] and masks [1, 1, 0] at gamma 0.5.
        assert_eq!(agent.last_returns, vec![1.75, 1.5, 1.0]);
        assert_eq!(evaluator.n_evals, 2);
        assert_eq!(recorder.len(), 4);
        for record in recorder.iter() {
            assert_eq!(record.get_scalar("episode_return")?, 3.0);
            assert_eq!(record.get_scalar("episode_length")?, 3.0);
            assert_eq!(record.get_scalar("loss")?, 0.1);
        }
        // The trainer leaves the agent in training mode.
        assert!(agent.is_train());
        Ok(())
    }

    #[test]
    fn test_halts_on_non_finite_loss() {
        let mut trainer = trainer(4, 3, 0);
        let mut agent = ScriptedAgent::new(f32::NAN);
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = CountingEvaluator { n_evals: 0 };

        let err = trainer
            .train(&mut agent, &mut recorder, &mut evaluator)
            .unwrap_err();
        match err.downcast_ref::<SlitherError>() {
            Some(SlitherError::NonFiniteValue { what, episode }) => {
                assert_eq!(what, "loss");
                assert_eq!(*episode, 1);
            }
            _ => panic!("expected NonFiniteValue, got {:?}", err),
        }
    }

    #[test]
    fn test_zero_intervals_disable_recording() -> Result<()> {
        let config = TrainerConfig::default()
            .max_episodes(2)
            .max_steps_per_episode(10)
            .gamma(0.5)
            .eval_interval(0)
            .record_compute_cost_interval(0);
        let mut trainer: Trainer<WalkEnv> = Trainer::build(config, 3)?;
        let mut agent = ScriptedAgent::new(0.1);
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = CountingEvaluator { n_evals: 0 };

        trainer.train(&mut agent, &mut recorder, &mut evaluator)?;

        assert_eq!(evaluator.n_evals, 0);
        assert_eq!(recorder.len(), 2);
        for record in recorder.iter() {
            assert!(record.get_scalar("fps").is_err());
            assert!(record.get_scalar("eval_return").is_err());
        }
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_gamma() {
        let config = TrainerConfig::default().gamma(1.5);
        assert!(Trainer::<WalkEnv>::build(config, 3).is_err());
    }
}
