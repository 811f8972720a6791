//! mindb Core - value, record and schema types shared by the storage and
//! query crates.
//!
//! - `DataType`: supported field types (Boolean, Int, Float, String, Date)
//! - `Value`: runtime cell values with a total order and key encoding
//! - `Record`: a stored row and its record id
//! - `schema`: table, field and index metadata
//! - `Error`: error taxonomy shared by every layer
//!
//! # Example
//!
//! ```rust
//! use mindb_core::{DataType, Record, Value};
//! use mindb_core::schema::TableMeta;
//!
//! let table = TableMeta::builder("t")
//!     .unwrap()
//!     .add_field("a", DataType::Int)
//!     .unwrap()
//!     .add_index("idx_a", &["a"], false)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let record = Record::new(1, vec![Value::Int(2)]);
//! assert!(table.check_values(record.values()).is_ok());
//! ```

#![no_std]

extern crate alloc;

mod error;
mod record;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result, StatusCode};
pub use record::{Record, Rid};
pub use types::DataType;
pub use value::Value;
