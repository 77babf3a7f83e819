//! Graph-based DQN agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! The agent works on [`GraphObs`](grl_core::graph::GraphObs) observations and
//! selects one discrete action per vehicle. Two action-value networks are
//! provided: a per-node [`mlp::Mlp`] and a graph convolutional [`gcn::Gcn`].
pub mod dqn;
pub mod gcn;
pub mod mlp;
pub mod model;
pub mod opt;
mod tensor;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
pub use tensor::GraphTensors;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
/// The device is fixed when an agent is built.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = anyhow::Error;

    fn try_from(device: Device) -> Result<Self> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}
