//! Interfaces of environments, policies and agents.
mod agent;
mod env;
mod policy;
mod step;

pub use agent::Agent;
pub use env::{Act, Env, Obs};
pub use policy::{Configurable, Policy, SampledAction, StochasticPolicy};
pub use step::{Info, Step};
