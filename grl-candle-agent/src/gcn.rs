//! Graph convolutional action-value network.
mod base;
mod config;
pub use base::Gcn;
pub use config::GcnConfig;
