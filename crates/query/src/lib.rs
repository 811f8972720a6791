//! mindb Query - query compilation and execution for mindb.
//!
//! A logical plan is rewritten (predicate pushdown), translated into an
//! operator tree (index or full scan per table) and pulled row by row.
//!
//! - `ast`: expressions and their evaluation
//! - `planner`: logical plans and the physical operator generator
//! - `optimizer`: rewrite rules and the optimizer driver
//! - `executor`: pull-based operators and the plan runner
//! - `tuple`: row views passed between operators
//! - `range`: key range bounds used by index scans
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use mindb_core::schema::TableMeta;
//! use mindb_core::{DataType, Value};
//! use mindb_query::ast::Expr;
//! use mindb_query::executor::Operator;
//! use mindb_query::{LogicalPlan, Optimizer, PhysicalPlanRunner};
//! use mindb_storage::{MemTable, Table, Trx, VanillaTrx};
//!
//! let meta = TableMeta::builder("t")
//!     .unwrap()
//!     .add_field("a", DataType::Int)
//!     .unwrap()
//!     .add_index("idx_a", &["a"], false)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let table: Rc<dyn Table> = Rc::new(MemTable::new(meta).unwrap());
//! let trx = VanillaTrx::begin();
//! for a in 1..=3i64 {
//!     trx.insert_record(table.as_ref(), vec![Value::Int(a)]).unwrap();
//! }
//!
//! let plan = LogicalPlan::filter(
//!     LogicalPlan::table_get(table),
//!     Expr::ge(Expr::field("t", "a", DataType::Int), Expr::value(2i64)),
//! );
//! let mut op = Optimizer::default().optimize(plan).unwrap();
//! assert_eq!(op.name(), "INDEX_SCAN");
//!
//! let result = PhysicalPlanRunner::new(&trx).execute(&mut op).unwrap();
//! assert_eq!(result.rows, vec![vec![Value::Int(2)], vec![Value::Int(3)]]);
//! ```

#![no_std]

extern crate alloc;

pub mod ast;
pub mod config;
pub mod context;
pub mod executor;
pub mod optimizer;
pub mod planner;
pub mod range;
pub mod tuple;

pub use config::PlannerConfig;
pub use context::ExecContext;
pub use executor::{PhysicalOperator, PhysicalPlanRunner, QueryResult};
pub use optimizer::Optimizer;
pub use planner::{LogicalPlan, PhysicalOperatorGenerator};
