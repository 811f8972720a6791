//! Predicate filter operator.

use super::operator::child_tuple;
use super::{Operator, PhysicalOperator};
use crate::ast::Expr;
use crate::context::ExecContext;
use crate::tuple::{JoinedTuple, Tuple};
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use mindb_core::{DataType, Result};

/// Passes through the child rows for which the expression holds.
pub struct PredicateOperator {
    child: Box<PhysicalOperator>,
    expression: Expr,
}

impl PredicateOperator {
    /// # Panics
    ///
    /// Panics if `expression` is not boolean.
    pub fn new(child: PhysicalOperator, expression: Expr) -> Self {
        assert!(
            matches!(expression.value_type(), Some(DataType::Boolean) | None),
            "filter over non-boolean expression {}",
            expression
        );
        Self {
            child: Box::new(child),
            expression,
        }
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }
}

impl Operator for PredicateOperator {
    fn name(&self) -> &'static str {
        "PREDICATE"
    }

    fn param(&self) -> String {
        self.expression.to_string()
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.child.open(ctx)
    }

    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool> {
        while self.child.next(ctx)? {
            let tuple = child_tuple(&self.child)?;
            let env = Tuple::Joined(JoinedTuple::borrowed(Some(&tuple), ctx.father()));
            if self.expression.get_value(&env)?.get_boolean() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        self.child.current_tuple()
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        alloc::vec![self.child.as_ref()]
    }
}
