//! Types and traits for recording training metrics.
//!
//! # Basic Usage
//!
//! ```rust
//! use grl_core::record::{Record, RecordValue};
//!
//! // following values are obtained with some process in reality
//! let episode = 1;
//! let reward = -1f32;
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(episode as f32));
//! record.insert("reward", RecordValue::Scalar(reward));
//! ```
//!
//! The [`Trainer`](crate::Trainer) writes one [`Record`] per episode into a
//! [`Recorder`]. The records returned by [`Agent::learn()`](crate::Agent::learn)
//! hold the loss, TD error and absolute Q value of the update.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
