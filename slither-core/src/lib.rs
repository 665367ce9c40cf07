#![warn(missing_docs)]
//! Core components of the Slither reinforcement-learning testbed.
//!
//! This crate defines the interfaces between the three actors of on-policy
//! training and the loop that drives them:
//!
//! * [`Env`] is the environment: a seeded state machine stepped with
//!   actions, emitting observations, rewards and termination flags as
//!   [`Step`] objects.
//! * [`Policy`] maps observations to actions; [`StochasticPolicy`] also
//!   reports the statistics of each draw, which on-policy optimization
//!   freezes at collection time. [`Agent`] is a trainable policy with a
//!   single optimization entry point, [`Agent::opt`], consuming one
//!   [`Episode`] and its discounted returns.
//! * [`Trainer`] runs the loop: a [`Sampler`] collects an episode,
//!   [`discounted_returns`] turns rewards and terminal masks into
//!   per-step returns, the agent optimizes on the frozen batch, and the
//!   results land in [`record::Record`]s written to a
//!   [`record::Recorder`]. An [`Evaluator`] periodically measures the
//!   greedy policy.
//!
//! There is no replay buffer and no vectorized execution here on purpose:
//! episodes are collected and consumed one at a time, single-threaded,
//! which keeps the data flow of the testbed easy to follow end to end.
pub mod error;
pub mod record;

mod base;
mod episode;
mod evaluator;
mod returns;
mod trainer;

pub use base::{
    Act, Agent, Configurable, Env, Info, Obs, Policy, SampledAction, Step, StochasticPolicy,
};
pub use episode::Episode;
pub use evaluator::{DefaultEvaluator, Evaluator};
pub use returns::discounted_returns;
pub use trainer::{Sampler, Trainer, TrainerConfig};
