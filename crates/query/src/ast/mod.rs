//! AST module for query expressions.

mod eval;
mod expr;

pub(crate) use eval::arithmetic;
pub use expr::{AggregateFunc, ArithmeticOp, CompOp, ConjunctionType, Expr, FieldRef, SortOrder};
