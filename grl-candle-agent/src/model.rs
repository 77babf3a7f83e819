//! Interface of neural networks used in RL agents.
use anyhow::Result;
use candle_nn::VarBuilder;

/// Neural network model not owning its [`VarMap`] internally.
///
/// Parameters are registered in the [`VarMap`] behind the given [`VarBuilder`],
/// so that an agent can build the same architecture twice (online and target
/// networks) and synchronize the two parameter sets by name.
///
/// [`VarMap`]: candle_nn::VarMap
pub trait SubModel1 {
    /// Configuration from which [`SubModel1`] is constructed.
    type Config;

    /// Input of the [`SubModel1`].
    type Input;

    /// Output of the [`SubModel1`].
    type Output;

    /// Builds [`SubModel1`] with [`VarBuilder`] and [`SubModel1::Config`].
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// A generalized forward function.
    fn forward(&self, input: &Self::Input) -> Result<Self::Output>;
}
