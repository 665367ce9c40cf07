use super::{PpoConfig, PpoModel};
use crate::{
    error::CandleAgentError,
    model::SubModel1,
    util::{InDim, OutDim},
};
use anyhow::{ensure, Result};
use candle_core::{Device, Tensor, D};
use candle_nn::{loss::mse, ops::log_softmax};
use log::trace;
use rand::{distributions::WeightedIndex, rngs::SmallRng, Rng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use slither_core::{
    record::{Record, RecordValue},
    Agent, Configurable, Env, Episode, Policy, SampledAction, StochasticPolicy,
};
use std::marker::PhantomData;

/// Proximal policy optimization (PPO) agent with a clipped surrogate
/// objective.
///
/// The agent is an actor-critic over a shared [`PpoModel`]: the actor head
/// outputs logits of a categorical distribution over the actions, the
/// critic head a scalar state value. In training mode actions are sampled
/// from the categorical distribution; in evaluation mode the agent is
/// greedy.
///
/// [`Ppo::opt`] consumes one frozen episode. The behavior log-probabilities
/// and the advantage (returns minus collection-time values) are built once
/// as constants; each epoch re-evaluates the batch under the current
/// parameters, forms the importance ratio against the frozen
/// log-probabilities, and minimizes
///
/// `-mean(min(ratio * A, clamp(ratio, 1 - eps, 1 + eps) * A))
///  + c_v * mse(values, returns) - c_e * mean(entropy)`
///
/// with one joint gradient step on both heads per epoch.
pub struct Ppo<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
{
    model: PpoModel<P>,
    opt_epochs: usize,
    clip_eps: f64,
    value_loss_coef: f64,
    entropy_coef: f64,
    n_opts: usize,
    train: bool,
    rng: SmallRng,
    device: Device,
    phantom: PhantomData<E>,
}

impl<E, P> Ppo<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: Into<Vec<f32>>,
    E::Act: From<u8> + Into<u8>,
{
    /// Number of optimization steps taken so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Converts one observation into a `(1, in_dim)` tensor, validating its
    /// width against the model.
    fn obs_to_tensor(&self, obs: &E::Obs) -> Result<Tensor> {
        let data: Vec<f32> = obs.clone().into();
        let expected = self.model.in_dim() as usize;
        if data.len() != expected {
            return Err(CandleAgentError::ObsDimMismatch {
                expected,
                got: data.len(),
            }
            .into());
        }
        Ok(Tensor::from_vec(data, (1, expected), &self.device)?)
    }

    /// Stacks observations into a `(n, in_dim)` tensor.
    fn batch_to_tensor(&self, obss: &[E::Obs]) -> Result<Tensor> {
        let expected = self.model.in_dim() as usize;
        let mut data = Vec::with_capacity(obss.len() * expected);
        for obs in obss {
            let v: Vec<f32> = obs.clone().into();
            if v.len() != expected {
                return Err(CandleAgentError::ObsDimMismatch {
                    expected,
                    got: v.len(),
                }
                .into());
            }
            data.extend_from_slice(&v);
        }
        Ok(Tensor::from_vec(data, (obss.len(), expected), &self.device)?)
    }

    /// Log-probabilities of all actions at a single observation.
    fn action_log_probs(&self, obs: &E::Obs) -> Result<Vec<f32>> {
        let obs = self.obs_to_tensor(obs)?;
        let logits = self.model.logits(&obs)?;
        Ok(log_softmax(&logits, D::Minus1)?.squeeze(0)?.to_vec1()?)
    }

    fn sample_with_stats_(&mut self, obs: &E::Obs) -> Result<SampledAction<E>> {
        let logp = self.action_log_probs(obs)?;
        let probs: Vec<f32> = logp.iter().map(|v| v.exp()).collect();
        let ix = self.rng.sample(WeightedIndex::new(&probs)?);
        let entropy = -probs.iter().zip(logp.iter()).map(|(p, l)| p * l).sum::<f32>();

        Ok(SampledAction {
            act: (ix as u8).into(),
            logp: logp[ix],
            entropy,
        })
    }

    fn opt_(&mut self, episode: &Episode<E>, returns: &[f32]) -> Result<Record> {
        let n = episode.len();
        ensure!(n > 0, "cannot optimize on an empty episode");
        ensure!(
            returns.len() == n,
            "returns and episode must be parallel arrays"
        );

        // Frozen quantities from collection time; constants for all epochs.
        let obs = self.batch_to_tensor(&episode.obss)?;
        let acts = episode
            .acts
            .iter()
            .map(|a| {
                let ix: u8 = a.clone().into();
                ix as i64
            })
            .collect::<Vec<_>>();
        let acts = Tensor::from_vec(acts, (n, 1), &self.device)?;
        let logp_old = Tensor::from_slice(&episode.logps, (n,), &self.device)?;
        let returns = Tensor::from_slice(returns, (n,), &self.device)?;
        let values_old = Tensor::from_slice(&episode.values, (n,), &self.device)?;
        let advantage = (&returns - &values_old)?;

        let mut loss_actor_tot = 0f32;
        let mut loss_critic_tot = 0f32;
        let mut entropy_tot = 0f32;

        for epoch in 0..self.opt_epochs {
            // Re-evaluation under the current parameters; the only
            // quantities allowed to change across epochs.
            let (logits, values) = self.model.forward(&obs)?;
            let log_probs = log_softmax(&logits, D::Minus1)?;
            let logp_new = log_probs.gather(&acts, D::Minus1)?.squeeze(D::Minus1)?;
            let entropy = (&log_probs.exp()? * &log_probs)?.sum(D::Minus1)?.neg()?;

            let ratio = (&logp_new - &logp_old)?.exp()?;
            let surr1 = (&ratio * &advantage)?;
            let surr2 =
                (ratio.clamp(1.0 - self.clip_eps, 1.0 + self.clip_eps)? * &advantage)?;
            let loss_actor = surr1.minimum(&surr2)?.mean_all()?.neg()?;
            let loss_critic = mse(&values.squeeze(D::Minus1)?, &returns)?;
            let entropy_mean = entropy.mean_all()?;

            let loss = ((&loss_actor + (self.value_loss_coef * &loss_critic)?)?
                - (self.entropy_coef * &entropy_mean)?)?;
            self.model.backward_step(&loss)?;
            self.n_opts += 1;

            let loss_actor = loss_actor.to_scalar::<f32>()?;
            let loss_critic = loss_critic.to_scalar::<f32>()?;
            let entropy_mean = entropy_mean.to_scalar::<f32>()?;
            trace!(
                "epoch {}: loss_actor {}, loss_critic {}, entropy {}",
                epoch,
                loss_actor,
                loss_critic,
                entropy_mean
            );
            loss_actor_tot += loss_actor;
            loss_critic_tot += loss_critic;
            entropy_tot += entropy_mean;
        }

        let k = self.opt_epochs as f32;
        Ok(Record::from_slice(&[
            ("loss_actor", RecordValue::Scalar(loss_actor_tot / k)),
            ("loss_critic", RecordValue::Scalar(loss_critic_tot / k)),
            ("entropy", RecordValue::Scalar(entropy_tot / k)),
            (
                "entropy_collect",
                RecordValue::Scalar(episode.entropies.iter().sum::<f32>() / n as f32),
            ),
        ]))
    }
}

impl<E, P> Policy<E> for Ppo<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: Into<Vec<f32>>,
    E::Act: From<u8> + Into<u8>,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        if self.train {
            self.sample_with_stats_(obs)
                .expect("Failed to sample an action")
                .act
        } else {
            let logp = self
                .action_log_probs(obs)
                .expect("Failed to evaluate the policy");
            let ix = logp
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(ix, _)| ix)
                .unwrap();
            (ix as u8).into()
        }
    }
}

impl<E, P> StochasticPolicy<E> for Ppo<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: Into<Vec<f32>>,
    E::Act: From<u8> + Into<u8>,
{
    fn sample_with_stats(&mut self, obs: &E::Obs) -> Result<SampledAction<E>> {
        self.sample_with_stats_(obs)
    }

    fn estimate_value(&mut self, obs: &E::Obs) -> Result<f32> {
        let obs = self.obs_to_tensor(obs)?;
        Ok(self.model.values(&obs)?.squeeze(1)?.squeeze(0)?.to_scalar()?)
    }
}

impl<E, P> Configurable for Ppo<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
{
    type Config = PpoConfig<P>;

    /// Constructs [`Ppo`] agent.
    fn build(config: Self::Config) -> Self {
        let device: Device = config
            .device
            .expect("No device is given for PPO agent")
            .into();
        let model = PpoModel::build(config.model_config, device.clone())
            .expect("Failed to build the PPO model");

        Self {
            model,
            opt_epochs: config.opt_epochs,
            clip_eps: config.clip_eps,
            value_loss_coef: config.value_loss_coef,
            entropy_coef: config.entropy_coef,
            n_opts: 0,
            train: false,
            rng: SmallRng::seed_from_u64(config.seed),
            device,
            phantom: PhantomData,
        }
    }
}

impl<E, P> Agent<E> for Ppo<E, P>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
    E::Obs: Into<Vec<f32>>,
    E::Act: From<u8> + Into<u8>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, episode: &Episode<E>, returns: &[f32]) -> Result<Record> {
        self.opt_(episode, returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mlp::{Mlp, MlpConfig},
        opt::OptimizerConfig,
        ppo::PpoModelConfig,
    };
    use slither_core::{discounted_returns, Sampler};
    use slither_grid_env::{GridEnvConfig, GridSnakeEnv};

    fn env_config(grid_size: [usize; 3]) -> GridEnvConfig {
        GridEnvConfig::default().grid_size(grid_size).n_obstacles(2)
    }

    fn agent_config(in_dim: i64, lr: f64, opt_epochs: usize) -> PpoConfig<Mlp> {
        PpoConfig::default()
            .model_config(
                PpoModelConfig::default()
                    .pi_config(MlpConfig::new(in_dim, vec![16], 6, false))
                    .v_config(MlpConfig::new(in_dim, vec![16], 1, false))
                    .opt_config(OptimizerConfig::Adam { lr }),
            )
            .opt_epochs(opt_epochs)
            .device(crate::Device::Cpu)
    }

    fn build_agent(in_dim: i64, lr: f64, opt_epochs: usize) -> Ppo<GridSnakeEnv, Mlp> {
        Ppo::build(agent_config(in_dim, lr, opt_epochs))
    }

    #[test]
    fn test_sampled_stats_are_consistent() -> Result<()> {
        let mut env = GridSnakeEnv::build(&env_config([3, 3, 3]), 0)?;
        let obs = env.reset()?;
        let mut agent = build_agent(27, 3e-4, 4);
        agent.train();

        let sampled = agent.sample_with_stats(&obs)?;
        let ix: u8 = sampled.act.into();
        assert!(ix < 6);
        assert!(sampled.logp <= 0.0);
        // Entropy of a 6-way categorical lies in [0, ln 6].
        assert!(sampled.entropy >= 0.0);
        assert!(sampled.entropy <= (6f32).ln() + 1e-5);
        assert!(agent.estimate_value(&obs)?.is_finite());
        Ok(())
    }

    #[test]
    fn test_rejects_mismatched_observation() -> Result<()> {
        let mut env = GridSnakeEnv::build(&env_config([4, 4, 4]), 0)?;
        let obs = env.reset()?;
        // The model expects 27 elements, the env produces 64.
        let mut agent = build_agent(27, 3e-4, 4);
        agent.train();

        let err = agent.sample_with_stats(&obs).unwrap_err();
        assert_eq!(
            err.downcast::<CandleAgentError>().unwrap(),
            CandleAgentError::ObsDimMismatch {
                expected: 27,
                got: 64
            }
        );
        Ok(())
    }

    #[test]
    fn test_opt_reports_finite_losses() -> Result<()> {
        let env = GridSnakeEnv::build(&env_config([3, 3, 3]), 1)?;
        let mut agent = build_agent(27, 3e-4, 4);
        agent.train();

        let mut sampler = Sampler::new(env, 30);
        let episode = sampler.sample_episode(&mut agent)?;
        let returns = discounted_returns(&episode.rewards, &episode.not_dones, 0.99);

        let record = agent.opt(&episode, &returns)?;
        for key in ["loss_actor", "loss_critic", "entropy", "entropy_collect"] {
            assert!(record.get_scalar(key)?.is_finite(), "{} not finite", key);
        }
        assert_eq!(agent.n_opts(), 4);
        Ok(())
    }

    /// With unchanged parameters the importance ratio is one everywhere, so
    /// the clipped surrogate reduces to the plain advantage mean.
    #[test]
    fn test_unit_ratio_matches_unclipped_surrogate() -> Result<()> {
        let env = GridSnakeEnv::build(&env_config([3, 3, 3]), 2)?;
        // Learning rate zero keeps the parameters at their collection-time
        // values through the single epoch.
        let mut agent = build_agent(27, 0.0, 1);
        agent.train();

        let mut sampler = Sampler::new(env, 30);
        let episode = sampler.sample_episode(&mut agent)?;
        let returns = discounted_returns(&episode.rewards, &episode.not_dones, 0.99);

        let expected = -(returns
            .iter()
            .zip(episode.values.iter())
            .map(|(r, v)| r - v)
            .sum::<f32>()
            / episode.len() as f32);

        let record = agent.opt(&episode, &returns)?;
        let loss_actor = record.get_scalar("loss_actor")?;
        assert!(
            (loss_actor - expected).abs() < 1e-4,
            "loss_actor {} vs unclipped {}",
            loss_actor,
            expected
        );
        Ok(())
    }

    #[test]
    fn test_mode_switching() {
        let mut agent = build_agent(27, 3e-4, 1);
        assert!(!agent.is_train());
        agent.train();
        assert!(agent.is_train());
        agent.eval();
        assert!(!agent.is_train());
    }
}
