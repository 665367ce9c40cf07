use crate::{
    error::CandleAgentError,
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{InDim, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`PpoModel`].
pub struct PpoModelConfig<P>
where
    P: OutDim + InDim,
{
    pub(super) pi_config: Option<P>,
    pub(super) v_config: Option<P>,
    pub(super) opt_config: OptimizerConfig,
}

impl<P> Default for PpoModelConfig<P>
where
    P: OutDim + InDim,
{
    fn default() -> Self {
        Self {
            pi_config: None,
            v_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<P> PpoModelConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim + InDim,
{
    /// Sets configurations for the policy head.
    pub fn pi_config(mut self, v: P) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets configurations for the value head.
    pub fn v_config(mut self, v: P) -> Self {
        self.v_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`PpoModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PpoModelConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Actor-critic model of the PPO agent.
///
/// Both heads are built from one [`VarMap`] under the `actor` and `critic`
/// prefixes, and one optimizer owns all the variables, so a single
/// [`PpoModel::backward_step`] updates the policy and the value function
/// jointly.
pub struct PpoModel<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + Clone,
{
    #[allow(dead_code)]
    varmap: VarMap,

    // Input width shared by both heads.
    in_dim: i64,

    // Output width of the policy head (the number of actions).
    n_actions: i64,

    actor: P,
    critic: P,
    opt: Optimizer,
}

impl<P> PpoModel<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + Clone,
{
    /// Constructs [`PpoModel`].
    pub fn build(config: PpoModelConfig<P::Config>, device: Device) -> Result<Self> {
        let pi_config = config.pi_config.context("pi_config is not set.")?;
        let v_config = config.v_config.context("v_config is not set.")?;
        if pi_config.get_in_dim() != v_config.get_in_dim() {
            return Err(CandleAgentError::HeadInputMismatch {
                actor: pi_config.get_in_dim() as usize,
                critic: v_config.get_in_dim() as usize,
            }
            .into());
        }
        let in_dim = pi_config.get_in_dim();
        let n_actions = pi_config.get_out_dim();

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let actor = P::build(vb.pp("actor"), pi_config)?;
        let critic = P::build(vb.pp("critic"), v_config)?;
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            varmap,
            in_dim,
            n_actions,
            actor,
            critic,
            opt,
        })
    }

    /// Input width of the model.
    pub fn in_dim(&self) -> i64 {
        self.in_dim
    }

    /// Number of actions of the policy head.
    pub fn n_actions(&self) -> i64 {
        self.n_actions
    }

    /// Action logits for a batch of observations.
    pub fn logits(&self, obs: &Tensor) -> Result<Tensor> {
        self.actor.forward(obs)
    }

    /// Value estimates for a batch of observations, shape `(n, 1)`.
    pub fn values(&self, obs: &Tensor) -> Result<Tensor> {
        self.critic.forward(obs)
    }

    /// Outputs of both heads for a batch of observations.
    pub fn forward(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        Ok((self.actor.forward(obs)?, self.critic.forward(obs)?))
    }

    /// One joint gradient step on all variables of both heads.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp, MlpConfig};
    use tempdir::TempDir;

    fn model_config() -> PpoModelConfig<MlpConfig> {
        PpoModelConfig::default()
            .pi_config(MlpConfig::new(8, vec![16], 6, false))
            .v_config(MlpConfig::new(8, vec![16], 1, false))
    }

    #[test]
    fn test_serde_ppo_model_config() -> Result<()> {
        let config = model_config().opt_config(OptimizerConfig::Adam { lr: 1e-3 });

        let dir = TempDir::new("ppo_model_config")?;
        let path = dir.path().join("ppo_model_config.yaml");

        config.save(&path)?;
        let config_ = PpoModelConfig::<MlpConfig>::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_forward_shapes() -> Result<()> {
        let model: PpoModel<Mlp> = PpoModel::build(model_config(), Device::Cpu)?;
        let obs = Tensor::zeros((5, 8), DType::F32, &Device::Cpu)?;
        let (logits, values) = model.forward(&obs)?;
        assert_eq!(logits.dims(), &[5, 6]);
        assert_eq!(values.dims(), &[5, 1]);
        Ok(())
    }

    #[test]
    fn test_rejects_mismatched_head_inputs() {
        let config = PpoModelConfig::default()
            .pi_config(MlpConfig::new(8, vec![16], 6, false))
            .v_config(MlpConfig::new(9, vec![16], 1, false));
        let err = match PpoModel::<Mlp>::build(config, Device::Cpu) {
            Ok(_) => panic!("mismatched head inputs should not build"),
            Err(err) => err,
        };
        assert_eq!(
            err.downcast::<CandleAgentError>().unwrap(),
            CandleAgentError::HeadInputMismatch {
                actor: 8,
                critic: 9
            }
        );
    }
}
