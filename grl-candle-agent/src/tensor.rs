//! Conversion of graph observations into tensors.
use anyhow::Result;
use candle_core::{Device, Tensor};
use grl_core::graph::GraphObs;

/// Tensors of a [`GraphObs`].
pub struct GraphTensors {
    /// Node features, `[n_nodes, n_features]`.
    pub x: Tensor,

    /// Adjacency matrix, `[n_nodes, n_nodes]`.
    pub adj: Tensor,

    /// Mask of controlled nodes, `[n_nodes]`.
    pub mask: Tensor,
}

impl GraphTensors {
    /// Copies the arrays of `obs` to `device`.
    pub fn from_obs(obs: &GraphObs, device: &Device) -> Result<Self> {
        let n = obs.n_nodes();
        let x = Tensor::from_slice(obs.features(), (n, obs.n_features()), device)?;
        let adj = Tensor::from_slice(obs.adjacency(), (n, n), device)?;
        let mask = Tensor::from_slice(obs.mask(), (n,), device)?;
        Ok(Self { x, adj, mask })
    }

    /// Zeroes the rows of uncontrolled nodes in `xs`, `[n_nodes, d]`.
    pub fn apply_mask(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(xs.broadcast_mul(&self.mask.unsqueeze(1)?)?)
    }
}
