use super::GcnConfig;
use crate::{
    mlp::{create_linear_layers, mlp_forward},
    model::SubModel1,
    GraphTensors,
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};
use grl_core::graph::GraphObs;

/// Action-value network over the vehicle graph.
///
/// 1. Node features are encoded, `h = relu(W_e x)`.
/// 2. One graph convolution aggregates the neighbors,
///    `g = relu(D^{-1}(A + I) W_g h)`, where `D` is the degree matrix of `A + I`.
/// 3. `[h, g]` goes through a two-layer head to `[n_nodes, out_dim]` action values.
/// 4. Rows of uncontrolled nodes are zeroed.
pub struct Gcn {
    device: Device,
    encoder: Linear,
    conv: Linear,
    head: Vec<Linear>,
}

/// Row-normalized adjacency with self loops.
fn normalized_adjacency(adj: &Tensor) -> Result<Tensor> {
    let n = adj.dims()[0];
    let a = (adj + Tensor::eye(n, DType::F32, adj.device())?)?;
    let deg = a.sum_keepdim(1)?;
    Ok(a.broadcast_div(&deg)?)
}

impl SubModel1 for Gcn {
    type Config = GcnConfig;
    type Input = GraphObs;
    type Output = Tensor;

    fn forward(&self, obs: &Self::Input) -> Result<Tensor> {
        let g = GraphTensors::from_obs(obs, &self.device)?;
        let h = self.encoder.forward(&g.x)?.relu()?;
        let a = normalized_adjacency(&g.adj)?;
        let c = a.matmul(&self.conv.forward(&h)?)?.relu()?;
        let xs = Tensor::cat(&[&h, &c], 1)?;
        let xs = mlp_forward(xs, &self.head)?;
        g.apply_mask(&xs)
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vs.device().clone();
        let hidden = config.hidden_dim;
        let vs = vs.pp("gcn");
        let encoder = linear(config.in_dim, hidden, vs.pp("encoder"))?;
        let conv = linear(hidden, hidden, vs.pp("conv"))?;
        let head = create_linear_layers("head", vs, 2 * hidden, &[hidden], config.out_dim)?;

        Ok(Self {
            device,
            encoder,
            conv,
            head,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;

    #[test]
    fn test_normalized_adjacency() -> Result<()> {
        let adj = Tensor::from_slice(&[0f32, 1.0, 1.0, 0.0], (2, 2), &Device::Cpu)?;
        let a = normalized_adjacency(&adj)?.to_vec2::<f32>()?;
        assert_eq!(a, vec![vec![0.5, 0.5], vec![0.5, 0.5]]);

        let adj = Tensor::zeros((2, 2), DType::F32, &Device::Cpu)?;
        let a = normalized_adjacency(&adj)?.to_vec2::<f32>()?;
        assert_eq!(a, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        Ok(())
    }

    #[test]
    fn test_gcn_output_depends_on_neighbors() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let gcn = Gcn::build(vb, GcnConfig::new(2, 16, 3))?;

        let features = vec![1.0, 0.5, -1.0, 2.0, 0.3, 0.3];
        let isolated = GraphObs::new(3, 2, features.clone(), vec![0.0; 9], vec![1.0; 3])?;
        let linked = GraphObs::new(
            3,
            2,
            features,
            vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            vec![1.0, 1.0, 0.0],
        )?;

        let q_isolated = gcn.forward(&isolated)?;
        let q_linked = gcn.forward(&linked)?;
        assert_eq!(q_linked.dims(), &[3, 3]);
        assert_eq!(q_linked.get(2)?.to_vec1::<f32>()?, vec![0.0; 3]);

        let diff = (q_isolated.get(0)? - q_linked.get(0)?)?
            .abs()?
            .sum_all()?
            .to_scalar::<f32>()?;
        assert!(diff > 0.0);
        Ok(())
    }
}
