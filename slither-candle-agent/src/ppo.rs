//! PPO agent with a clipped surrogate objective.
mod base;
mod config;
mod model;
pub use base::Ppo;
pub use config::PpoConfig;
pub use model::{PpoModel, PpoModelConfig};
