use super::{mlp_forward, MlpConfig};
use crate::{model::SubModel1, GraphTensors};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, VarBuilder};
use grl_core::graph::GraphObs;

/// Returns linear layers mapping `in_dim` through `units` to `out_dim`.
pub(crate) fn create_linear_layers(
    prefix: &str,
    vs: VarBuilder,
    in_dim: usize,
    units: &[usize],
    out_dim: usize,
) -> Result<Vec<Linear>> {
    let dims = std::iter::once(in_dim)
        .chain(units.iter().copied())
        .chain(std::iter::once(out_dim))
        .collect::<Vec<_>>();
    let vs = vs.pp(prefix);

    let layers = dims
        .windows(2)
        .enumerate()
        .map(|(i, d)| linear(d[0], d[1], vs.pp(format!("ln{}", i))))
        .collect::<candle_core::Result<Vec<_>>>()?;
    Ok(layers)
}

/// Action-value network ignoring the graph structure.
///
/// The same multilayer perceptron maps the features of each node to action
/// values, `[n_nodes, out_dim]`. Rows of uncontrolled nodes are zero.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = GraphObs;
    type Output = Tensor;

    fn forward(&self, obs: &Self::Input) -> Result<Tensor> {
        let g = GraphTensors::from_obs(obs, &self.device)?;
        let xs = mlp_forward(g.x.clone(), &self.layers)?;
        let xs = match self.config.activation_out {
            false => xs,
            true => xs.relu()?,
        };
        g.apply_mask(&xs)
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vs.device().clone();
        let layers =
            create_linear_layers("mlp", vs, config.in_dim, &config.units, config.out_dim)?;

        Ok(Self {
            config,
            device,
            layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_mlp_output_masked() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(vb, MlpConfig::new(2, vec![8, 8], 3, false))?;
        assert_eq!(varmap.all_vars().len(), 6);

        let obs = GraphObs::new(
            3,
            2,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![0.0; 9],
            vec![1.0, 0.0, 1.0],
        )?;
        let q = mlp.forward(&obs)?;
        assert_eq!(q.dims(), &[3, 3]);
        assert_eq!(q.get(1)?.to_vec1::<f32>()?, vec![0.0; 3]);
        Ok(())
    }
}
