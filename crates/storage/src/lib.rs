//! mindb Storage - the storage collaborators the query executor talks to.
//!
//! This crate provides:
//!
//! - `Table`, `Index`, `IndexScanner`, `RecordScanner`, `Trx`: the
//!   collaborator traits
//! - `MemTable`, `MemIndex`: in-memory implementations keeping indexes in
//!   sync on every write
//! - `VanillaTrx`: a transaction that writes through
//! - `Catalog`: a table registry
//!
//! # Example
//!
//! ```rust
//! use mindb_core::schema::TableMeta;
//! use mindb_core::{DataType, Value};
//! use mindb_storage::{Catalog, Table, Trx, VanillaTrx};
//!
//! let mut catalog = Catalog::new();
//! let meta = TableMeta::builder("users")
//!     .unwrap()
//!     .add_field("id", DataType::Int)
//!     .unwrap()
//!     .add_field("name", DataType::String)
//!     .unwrap()
//!     .add_index("idx_id", &["id"], true)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let users = catalog.create_table(meta).unwrap();
//!
//! let trx = VanillaTrx::begin();
//! trx.insert_record(&*users, vec![Value::Int(1), Value::String("Alice".into())])
//!     .unwrap();
//!
//! assert_eq!(users.len(), 1);
//! assert_eq!(users.indexes().len(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod catalog;
pub mod index;
pub mod scanner;
pub mod table;
pub mod transaction;

pub use catalog::Catalog;
pub use index::{Index, IndexScanner, MemIndex, MemIndexScanner};
pub use scanner::{MemRecordScanner, RecordScanner};
pub use table::{MemTable, Table};
pub use transaction::{Trx, TrxId, VanillaTrx};
