//! Schema module for mindb.
//!
//! Table, field and index metadata consulted by the planner and the
//! in-memory storage.

mod field;
mod index;
mod table;

pub use field::FieldMeta;
pub use index::IndexMeta;
pub use table::{TableMeta, TableMetaBuilder};
