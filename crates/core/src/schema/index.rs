//! Index definition for mindb table schemas.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// An index definition in a table schema.
///
/// Only the leading field participates in range scans.
#[derive(Clone, Debug)]
pub struct IndexMeta {
    name: String,
    table_name: String,
    fields: Vec<String>,
    unique: bool,
}

impl IndexMeta {
    /// Creates a new index definition.
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        fields: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            fields,
            unique: false,
        }
    }

    /// Sets whether this index is unique.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the normalized name (table.index).
    pub fn normalized_name(&self) -> String {
        format!("{}.{}", self.table_name, self.name)
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the indexed field at position `i`.
    pub fn field(&self, i: usize) -> Option<&str> {
        self.fields.get(i).map(String::as_str)
    }

    /// Returns the leading field, the one range scans are keyed on.
    pub fn leading_field(&self) -> Option<&str> {
        self.field(0)
    }

    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

impl PartialEq for IndexMeta {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table_name == other.table_name
    }
}
