//! Configuration of [`Ppo`](super::Ppo) agent.
use super::PpoModelConfig;
use crate::{
    model::SubModel1,
    util::{InDim, OutDim},
    Device,
};
use anyhow::Result;
use candle_core::Tensor;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    marker::PhantomData,
    path::Path,
};

/// Configuration of [`Ppo`](super::Ppo) agent.
#[derive(Debug, Deserialize, Serialize)]
pub struct PpoConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
{
    pub(super) model_config: PpoModelConfig<P::Config>,

    /// Gradient passes over a collected episode.
    pub(super) opt_epochs: usize,

    /// Clip range of the importance ratio.
    pub(super) clip_eps: f64,

    /// Weight of the value loss in the total loss.
    pub(super) value_loss_coef: f64,

    /// Weight of the entropy bonus in the total loss.
    pub(super) entropy_coef: f64,

    /// Seed of the agent's action sampling.
    pub(super) seed: u64,

    /// Device the model lives on.
    pub device: Option<Device>,

    phantom: PhantomData<P>,
}

impl<P> Clone for PpoConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
{
    fn clone(&self) -> Self {
        Self {
            model_config: self.model_config.clone(),
            opt_epochs: self.opt_epochs,
            clip_eps: self.clip_eps,
            value_loss_coef: self.value_loss_coef,
            entropy_coef: self.entropy_coef,
            seed: self.seed,
            device: self.device,
            phantom: PhantomData,
        }
    }
}

impl<P> PartialEq for PpoConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        self.model_config == other.model_config
            && self.opt_epochs == other.opt_epochs
            && self.clip_eps == other.clip_eps
            && self.value_loss_coef == other.value_loss_coef
            && self.entropy_coef == other.entropy_coef
            && self.seed == other.seed
            && self.device == other.device
    }
}

impl<P> Default for PpoConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
{
    fn default() -> Self {
        Self {
            model_config: Default::default(),
            opt_epochs: 4,
            clip_eps: 0.2,
            value_loss_coef: 0.5,
            entropy_coef: 0.01,
            seed: 42,
            device: None,
            phantom: PhantomData,
        }
    }
}

impl<P> PpoConfig<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + InDim + std::fmt::Debug + PartialEq + Clone,
{
    /// Sets the model configuration.
    pub fn model_config(mut self, v: PpoModelConfig<P::Config>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the number of gradient passes over a collected episode.
    pub fn opt_epochs(mut self, v: usize) -> Self {
        self.opt_epochs = v;
        self
    }

    /// Sets the clip range of the importance ratio.
    pub fn clip_eps(mut self, v: f64) -> Self {
        self.clip_eps = v;
        self
    }

    /// Sets the weight of the value loss.
    pub fn value_loss_coef(mut self, v: f64) -> Self {
        self.value_loss_coef = v;
        self
    }

    /// Sets the weight of the entropy bonus.
    pub fn entropy_coef(mut self, v: f64) -> Self {
        self.entropy_coef = v;
        self
    }

    /// Sets the seed of the agent's action sampling.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`PpoConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PpoConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
