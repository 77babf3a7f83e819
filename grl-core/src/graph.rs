//! Graph observations and multi-agent actions.
//!
//! A traffic scene is encoded as a graph whose nodes are vehicles. Each node
//! carries a feature vector; edges encode which vehicles perceive each other,
//! and a mask marks the nodes controlled by the agent.
use crate::{error::GrlError, Act, Obs};
use anyhow::Result;

/// Observation of a traffic scene as a graph.
///
/// All arrays are stored row-major in flat vectors.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphObs {
    n_nodes: usize,
    n_features: usize,
    features: Vec<f32>,
    adjacency: Vec<f32>,
    mask: Vec<f32>,
}

fn check_len(name: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GrlError::ShapeMismatch {
            name: name.to_string(),
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

impl GraphObs {
    /// Constructs a graph observation.
    ///
    /// * `features` - `[n_nodes, n_features]` node features.
    /// * `adjacency` - `[n_nodes, n_nodes]` adjacency matrix.
    /// * `mask` - `[n_nodes]`, `1.0` for controlled vehicles.
    pub fn new(
        n_nodes: usize,
        n_features: usize,
        features: Vec<f32>,
        adjacency: Vec<f32>,
        mask: Vec<f32>,
    ) -> Result<Self> {
        check_len("features", n_nodes * n_features, features.len())?;
        check_len("adjacency", n_nodes * n_nodes, adjacency.len())?;
        check_len("mask", n_nodes, mask.len())?;

        Ok(Self {
            n_nodes,
            n_features,
            features,
            adjacency,
            mask,
        })
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of features per node.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Node features.
    pub fn features(&self) -> &[f32] {
        &self.features
    }

    /// Adjacency matrix.
    pub fn adjacency(&self) -> &[f32] {
        &self.adjacency
    }

    /// Mask of controlled nodes.
    pub fn mask(&self) -> &[f32] {
        &self.mask
    }
}

impl Obs for GraphObs {
    fn len(&self) -> usize {
        self.n_nodes
    }
}

/// One discrete action per node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscreteAct(pub Vec<i64>);

impl Act for DiscreteAct {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<i64>> for DiscreteAct {
    fn from(v: Vec<i64>) -> Self {
        Self(v)
    }
}

/// Real-valued action vector.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousAct(pub Vec<f32>);

impl Act for ContinuousAct {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<f32>> for ContinuousAct {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_obs_shape_check() {
        let obs = GraphObs::new(2, 3, vec![0.0; 6], vec![0.0; 4], vec![1.0, 0.0]);
        assert!(obs.is_ok());
        assert_eq!(obs.unwrap().len(), 2);

        let err = GraphObs::new(2, 3, vec![0.0; 5], vec![0.0; 4], vec![1.0, 0.0]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GrlError>(),
            Some(&GrlError::ShapeMismatch {
                name: "features".to_string(),
                expected: 6,
                actual: 5
            })
        );

        assert!(GraphObs::new(2, 3, vec![0.0; 6], vec![0.0; 3], vec![1.0, 0.0]).is_err());
        assert!(GraphObs::new(2, 3, vec![0.0; 6], vec![0.0; 4], vec![1.0]).is_err());
    }
}
