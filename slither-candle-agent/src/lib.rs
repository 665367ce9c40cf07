//! RL agents implemented with [candle](https://crates.io/crates/candle-core).
pub mod error;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod ppo;
pub mod util;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support
/// serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// Returns the CUDA device of the given ordinal if candle can reach it,
    /// otherwise the CPU.
    pub fn cuda_if_available(ordinal: usize) -> Self {
        match candle_core::Device::cuda_if_available(ordinal) {
            Ok(candle_core::Device::Cuda(_)) => Self::Cuda(ordinal),
            _ => Self::Cpu,
        }
    }
}

impl From<Device> for candle_core::Device {
    fn from(device: Device) -> Self {
        match device {
            Device::Cpu => Self::Cpu,
            Device::Cuda(n) => Self::new_cuda(n).expect("Failed to create the CUDA device"),
        }
    }
}
