//! Record structure for mindb.

use crate::value::Value;
use alloc::vec::Vec;

/// Record identifier, unique within a table.
pub type Rid = u64;

/// A stored record: its identifier plus one value per field.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    rid: Rid,
    values: Vec<Value>,
}

impl Record {
    /// Creates a new record with the given id and values.
    pub fn new(rid: Rid, values: Vec<Value>) -> Self {
        Self { rid, values }
    }

    #[inline]
    pub fn rid(&self) -> Rid {
        self.rid
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns a mutable reference to the values.
    #[inline]
    pub fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    /// Returns the value at the given field position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Overwrites the value at `index`; returns false when out of range.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the record and returns its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_record_access() {
        let mut record = Record::new(7, vec![Value::Int(1), Value::String("a".into())]);
        assert_eq!(record.rid(), 7);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get(1), Some(&Value::String("a".into())));
        assert_eq!(record.get(2), None);

        assert!(record.set(0, Value::Int(9)));
        assert!(!record.set(5, Value::Null));
        assert_eq!(record.values()[0], Value::Int(9));
    }

    #[test]
    fn test_into_values() {
        let record = Record::new(1, vec![Value::Null]);
        assert_eq!(record.into_values(), vec![Value::Null]);
    }
}
