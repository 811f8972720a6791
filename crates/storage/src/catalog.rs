//! Named table registry.

use crate::table::{MemTable, Table};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use mindb_core::schema::TableMeta;
use mindb_core::{Error, Result};

/// Registry of the tables of one database.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: BTreeMap<String, Rc<MemTable>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty in-memory table.
    pub fn create_table(&mut self, meta: TableMeta) -> Result<Rc<MemTable>> {
        let name = meta.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(Error::invalid_schema(format!(
                "Table already exists: {}",
                name
            )));
        }
        let table = Rc::new(MemTable::new(meta)?);
        self.tables.insert(name, Rc::clone(&table));
        Ok(table)
    }

    /// Drops a table from the catalog.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.remove(name).is_none() {
            return Err(Error::table_not_found(name));
        }
        Ok(())
    }

    /// Looks a table up by name.
    pub fn table(&self, name: &str) -> Result<Rc<dyn Table>> {
        self.tables
            .get(name)
            .map(|table| Rc::clone(table) as Rc<dyn Table>)
            .ok_or_else(|| Error::table_not_found(name))
    }

    /// Returns all table names.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindb_core::{DataType, StatusCode};

    fn meta(name: &str) -> TableMeta {
        TableMeta::builder(name)
            .unwrap()
            .add_field("id", DataType::Int)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_and_lookup() {
        let mut catalog = Catalog::new();
        catalog.create_table(meta("users")).unwrap();
        catalog.create_table(meta("orders")).unwrap();
        assert_eq!(catalog.table_names(), alloc::vec!["orders", "users"]);
        assert_eq!(catalog.table("users").unwrap().name(), "users");
        assert!(catalog.create_table(meta("users")).is_err());
    }

    #[test]
    fn test_missing_table() {
        let mut catalog = Catalog::new();
        assert_eq!(catalog.table("x").unwrap_err().code(), StatusCode::NotFound);
        assert!(catalog.drop_table("x").is_err());
        catalog.create_table(meta("x")).unwrap();
        catalog.drop_table("x").unwrap();
        assert!(catalog.table("x").is_err());
    }
}
