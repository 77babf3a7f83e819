//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{DType, Tensor};
use candle_nn::VarMap;
use log::trace;
use serde::{Deserialize, Serialize};

/// Critic loss type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("track, tau = {}", tau);
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .ok_or_else(|| anyhow!("Variable {} is not found in the source", k_dest))?;
        let t_dest = ((tau * v_src.as_tensor())? + ((1.0 - tau) * v_dest.as_tensor())?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Copies the values of all variables in `src` into the variables in `dest` with the same names.
pub fn copy_vars(dest: &VarMap, src: &VarMap) -> Result<()> {
    trace!("copy_vars");
    let dest = dest.data().lock().map_err(|e| anyhow!("{}", e))?;
    let src = src.data().lock().map_err(|e| anyhow!("{}", e))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .ok_or_else(|| anyhow!("Variable {} is not found in the source", k_dest))?;
        v_dest.set(v_src.as_tensor())?;
    }

    Ok(())
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> usize;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: usize);
}

/// Mean of the elementwise Huber loss with threshold 1.
///
/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor> {
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?;
    let m2 = m1.affine(-1.0, 1.0)?;
    let quadratic = (d.sqr()? * 0.5)?;
    let linear = (&d - 0.5)?;
    Ok(((m1 * quadratic)? + (m2 * linear)?)?.mean_all()?)
}

/// Discounted sum of rewards, $\sum_i \gamma^i r_i$.
pub fn discounted_return(rewards: &[f32], gamma: f64) -> f32 {
    rewards
        .iter()
        .enumerate()
        .map(|(i, &r)| gamma.powi(i as i32) * r as f64)
        .sum::<f64>() as f32
}

/// TD target $R + \gamma^n q_{next} (1 - done)$.
///
/// `ret` is the discounted return over the `n` steps preceding the bootstrap.
pub fn td_target(ret: f32, gamma: f64, n: usize, q_next: &Tensor, not_done: f32) -> Result<Tensor> {
    let discount = gamma.powi(n as i32) * not_done as f64;
    Ok(q_next.affine(discount, ret as f64)?)
}

/// Returns the values of all variables sorted by name.
pub fn var_values(varmap: &VarMap) -> Result<Vec<(String, Vec<f32>)>> {
    let data = varmap.data().lock().map_err(|e| anyhow!("{}", e))?;
    let mut values = data
        .iter()
        .map(|(k, v)| -> Result<(String, Vec<f32>)> {
            Ok((k.clone(), v.as_tensor().flatten_all()?.to_vec1::<f32>()?))
        })
        .collect::<Result<Vec<_>>>()?;
    values.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(values)
}
