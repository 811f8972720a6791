//! Table definition for mindb schemas.

use super::field::FieldMeta;
use super::index::IndexMeta;
use crate::error::{Error, Result};
use crate::types::DataType;
use crate::value::Value;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A table definition: its fields in record order plus index definitions.
#[derive(Clone, Debug)]
pub struct TableMeta {
    name: String,
    fields: Vec<FieldMeta>,
    indexes: Vec<IndexMeta>,
}

impl TableMeta {
    /// Creates a table definition from ready-made fields.
    pub fn new(name: impl Into<String>, fields: Vec<FieldMeta>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(i, f)| f.with_index(i))
            .collect();
        Self {
            name: name.into(),
            fields,
            indexes: Vec::new(),
        }
    }

    /// Starts a builder; fails on an invalid table name.
    pub fn builder(name: impl Into<String>) -> Result<TableMetaBuilder> {
        TableMetaBuilder::new(name)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    #[inline]
    pub fn indexes(&self) -> &[IndexMeta] {
        &self.indexes
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the record position of a field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field(name).map(FieldMeta::index)
    }

    /// Adds an index definition after creation.
    pub fn add_index(&mut self, index: IndexMeta) -> Result<()> {
        if self.indexes.iter().any(|i| i.name() == index.name()) {
            return Err(Error::invalid_schema(format!(
                "Index already exists: {}",
                index.name()
            )));
        }
        for field in index.fields() {
            if self.field(field).is_none() {
                return Err(Error::column_not_found(&self.name, field.as_str()));
            }
        }
        self.indexes.push(index);
        Ok(())
    }

    /// Validates a full row of values against the field list.
    pub fn check_values(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(Error::invalid_argument(format!(
                "table {} expects {} values, got {}",
                self.name,
                self.fields.len(),
                values.len()
            )));
        }
        for (field, value) in self.fields.iter().zip(values) {
            if field.accepts(value) {
                continue;
            }
            return Err(match value.data_type() {
                Some(got) => Error::type_mismatch(field.data_type(), got),
                None => Error::invalid_argument(format!(
                    "field {}.{} is not nullable",
                    self.name,
                    field.name()
                )),
            });
        }
        Ok(())
    }
}

/// Builder for [`TableMeta`].
pub struct TableMetaBuilder {
    name: String,
    fields: Vec<FieldMeta>,
    indexes: Vec<IndexMeta>,
}

impl TableMetaBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            fields: Vec::new(),
            indexes: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(Error::invalid_schema("Name cannot be empty"));
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    /// Adds a non-nullable field.
    pub fn add_field(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.fields.iter().any(|f| f.name() == name) {
            return Err(Error::invalid_schema(format!(
                "Field already exists: {}",
                name
            )));
        }
        self.fields.push(FieldMeta::new(name, data_type));
        Ok(self)
    }

    /// Marks existing fields as nullable.
    pub fn add_nullable(mut self, fields: &[&str]) -> Self {
        self.fields = self
            .fields
            .into_iter()
            .map(|f| {
                if fields.contains(&f.name()) {
                    f.nullable(true)
                } else {
                    f
                }
            })
            .collect();
        self
    }

    /// Adds an index over existing fields.
    pub fn add_index(mut self, name: impl Into<String>, fields: &[&str], unique: bool) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if fields.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Index {} needs at least one field",
                name
            )));
        }
        for field in fields {
            if !self.fields.iter().any(|f| f.name() == *field) {
                return Err(Error::invalid_schema(format!("Field not found: {}", field)));
            }
        }
        let fields = fields.iter().map(|f| f.to_string()).collect();
        self.indexes
            .push(IndexMeta::new(name, &self.name, fields).unique(unique));
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Result<TableMeta> {
        if self.fields.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Table {} has no fields",
                self.name
            )));
        }
        let mut table = TableMeta::new(self.name, self.fields);
        table.indexes = self.indexes;
        Ok(table)
    }
}
