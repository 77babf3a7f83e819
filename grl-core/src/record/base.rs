//! Key-value records of training metrics.
use crate::error::GrlError;
use std::collections::{
    hash_map::{Iter, Keys},
    HashMap,
};

/// Possible types of values stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, e.g., loss or episode reward.
    Scalar(f32),
}

/// A container of key-value pairs.
///
/// # Examples
///
/// ```rust
/// use grl_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("loss", 0.5);
/// record.insert("td_error", RecordValue::Scalar(0.1));
///
/// assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, GrlError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            None => Err(GrlError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns `true` if the record contains no key-value pairs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_access() {
        let mut record = Record::from_slice(&[
            ("loss", RecordValue::Scalar(0.5)),
            ("td_error", RecordValue::Scalar(0.1)),
        ]);
        record.insert("loss", RecordValue::Scalar(0.25));

        assert_eq!(record.get_scalar("loss"), Ok(0.25));
        assert_eq!(record.keys().count(), 2);
        assert_eq!(
            record.get_scalar("q_abs"),
            Err(GrlError::RecordKeyError("q_abs".to_string()))
        );
    }
}
