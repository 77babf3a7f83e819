//! Multilayer perceptron applied to each node independently.
mod base;
mod config;
pub(crate) use base::create_linear_layers;
pub use base::Mlp;
use candle_core::Tensor;
use candle_nn::{Linear, Module};
pub use config::MlpConfig;

/// Applies `layers` with ReLU between them; no activation after the last layer.
pub(crate) fn mlp_forward(xs: Tensor, layers: &[Linear]) -> candle_core::Result<Tensor> {
    let n_layers = layers.len();
    let mut xs = xs;

    for layer in layers.iter().take(n_layers - 1) {
        xs = layer.forward(&xs)?.relu()?;
    }

    layers[n_layers - 1].forward(&xs)
}
