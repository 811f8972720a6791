//! Query executor module.
//!
//! Physical operators follow the Volcano model: a parent pulls rows from
//! its children with `next`. See [`Operator`] for the protocol.

mod aggregate;
mod dml;
mod explain;
mod filter;
pub mod join;
mod operator;
mod project;
mod runner;
mod scan;
mod sort;

pub use aggregate::AggregateOperator;
pub use dml::{DeleteOperator, InsertOperator, UpdateOperator};
pub use explain::{render_plan, EmptyOperator, ExplainOperator};
pub use filter::PredicateOperator;
pub use join::{JoinOperator, JoinState};
pub use operator::{Operator, OperatorKind, PhysicalOperator};
pub use project::ProjectOperator;
pub use runner::{PhysicalPlanRunner, QueryResult};
pub use scan::{BoundExpr, IndexScanOperator, TableScanOperator};
pub use sort::OrderByOperator;

pub(crate) use scan::merge_bounds;
