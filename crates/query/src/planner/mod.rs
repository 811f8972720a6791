//! Logical plans and their translation into operator trees.

mod logical;
mod physical;

pub use logical::{LogicalPlan, OrderUnit, TableGet, UpdateUnit};
pub use physical::PhysicalOperatorGenerator;
