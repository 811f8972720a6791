//! Field definition for mindb table schemas.

use crate::types::DataType;
use crate::value::Value;
use alloc::string::String;

/// A field (column) definition in a table schema.
#[derive(Clone, Debug)]
pub struct FieldMeta {
    name: String,
    data_type: DataType,
    nullable: bool,
    /// Position of the field in a record (0-based).
    index: usize,
}

impl FieldMeta {
    /// Creates a new non-nullable field definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            index: 0,
        }
    }

    /// Sets whether this field is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the field position.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns whether `value` may be stored in this field.
    pub fn accepts(&self, value: &Value) -> bool {
        match value.data_type() {
            None => self.nullable,
            Some(dt) => dt == self.data_type,
        }
    }
}

impl PartialEq for FieldMeta {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_new() {
        let field = FieldMeta::new("id", DataType::Int);
        assert_eq!(field.name(), "id");
        assert_eq!(field.data_type(), DataType::Int);
        assert!(!field.is_nullable());
    }

    #[test]
    fn test_field_accepts() {
        let field = FieldMeta::new("a", DataType::Int);
        assert!(field.accepts(&Value::Int(1)));
        assert!(!field.accepts(&Value::Float(1.0)));
        assert!(!field.accepts(&Value::Null));
        assert!(field.nullable(true).accepts(&Value::Null));
    }
}
