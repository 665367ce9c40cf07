//! Base implementation of records for logging.
use crate::error::SlitherError;
use chrono::prelude::{DateTime, Local};
use std::{
    collections::{
        hash_map::{Iter, Keys},
        HashMap,
    },
    convert::Into,
};

/// Represents possible types of values in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// Scalar, e.g., loss value.
    Scalar(f32),

    /// Date and time.
    DateTime(DateTime<Local>),

    /// A 1-dimensional array, e.g., per-step returns of an episode.
    Array1(Vec<f32>),

    /// String, e.g., a phase of training.
    String(String),
}

/// Represents a record, a string-keyed map of [`RecordValue`]s.
#[derive(Debug)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Construct empty record.
    pub fn empty() -> Self {
        Self { 0: HashMap::new() }
    }

    /// Create a record with a single scalar entry.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self {
            0: HashMap::from([(name.into(), RecordValue::Scalar(value))]),
        }
    }

    /// Create a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Get keys.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Insert a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Return an iterator over key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Get the value of the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merge records, the entries of `record` winning on key collisions.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merge a record into this one in place.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Get scalar value.
    ///
    /// Returns an error if the key does not exist or the value is not a
    /// scalar.
    pub fn get_scalar(&self, k: &str) -> Result<f32, SlitherError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Scalar(v) => Ok(*v as _),
                _ => Err(SlitherError::RecordValueTypeError("Scalar".to_string())),
            }
        } else {
            Err(SlitherError::RecordKeyError(k.to_string()))
        }
    }

    /// Get an 1-dimensional array.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, SlitherError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Array1(v) => Ok(v.clone()),
                _ => Err(SlitherError::RecordValueTypeError("Array1".to_string())),
            }
        } else {
            Err(SlitherError::RecordKeyError(k.to_string()))
        }
    }

    /// Get String value.
    pub fn get_string(&self, k: &str) -> Result<String, SlitherError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::String(s) => Ok(s.clone()),
                _ => Err(SlitherError::RecordValueTypeError("String".to_string())),
            }
        } else {
            Err(SlitherError::RecordKeyError(k.to_string()))
        }
    }

    /// Returns `true` if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordValue};
    use crate::error::SlitherError;

    #[test]
    fn test_merge_overwrites() {
        let mut a = Record::from_scalar("x", 1.0);
        a.insert("y", RecordValue::Scalar(2.0));
        let b = Record::from_scalar("y", 3.0);
        let merged = a.merge(b);
        assert_eq!(merged.get_scalar("x").unwrap(), 1.0);
        assert_eq!(merged.get_scalar("y").unwrap(), 3.0);
    }

    #[test]
    fn test_typed_lookup_errors() {
        let record = Record::from_slice(&[("xs", RecordValue::Array1(vec![1.0, 2.0]))]);
        assert!(matches!(
            record.get_scalar("xs"),
            Err(SlitherError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            record.get_scalar("missing"),
            Err(SlitherError::RecordKeyError(_))
        ));
        assert_eq!(record.get_array1("xs").unwrap(), vec![1.0, 2.0]);
    }
}
