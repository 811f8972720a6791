//! Projection operator.

use super::operator::child_tuple;
use super::{Operator, PhysicalOperator};
use crate::ast::Expr;
use crate::context::ExecContext;
use crate::tuple::{JoinedTuple, Tuple, TupleCellSpec, ValueListTuple};
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use mindb_core::{Result, Value};

/// Output spec of a projected expression: fields keep their qualified
/// name, anything else is named after its text.
pub(crate) fn output_spec(expr: &Expr) -> TupleCellSpec {
    match expr {
        Expr::Field(field) => field.spec(),
        other => TupleCellSpec::named(other.to_string()),
    }
}

/// Evaluates a list of expressions per input row.
///
/// Without input the expressions are evaluated once, against the father
/// tuple only.
pub struct ProjectOperator {
    child: Option<Box<PhysicalOperator>>,
    expressions: Vec<Expr>,
    specs: Vec<TupleCellSpec>,
    values: Vec<Value>,
    emitted: bool,
    ready: bool,
}

impl ProjectOperator {
    pub fn new(child: Option<PhysicalOperator>, expressions: Vec<Expr>) -> Self {
        let specs = expressions.iter().map(output_spec).collect();
        Self {
            child: child.map(Box::new),
            expressions,
            specs,
            values: Vec::new(),
            emitted: false,
            ready: false,
        }
    }

    pub fn specs(&self) -> &[TupleCellSpec] {
        &self.specs
    }
}

fn evaluate_all(expressions: &[Expr], env: &Tuple<'_>) -> Result<Vec<Value>> {
    expressions.iter().map(|expr| expr.get_value(env)).collect()
}

impl Operator for ProjectOperator {
    fn name(&self) -> &'static str {
        "PROJECT"
    }

    fn param(&self) -> String {
        let specs: Vec<String> = self.specs.iter().map(|s| s.to_string()).collect();
        specs.join(", ")
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.emitted = false;
        self.ready = false;
        match self.child.as_mut() {
            Some(child) => child.open(ctx),
            None => Ok(()),
        }
    }

    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool> {
        self.ready = false;
        match self.child.as_mut() {
            Some(child) => {
                if !child.next(ctx)? {
                    return Ok(false);
                }
                let child: &PhysicalOperator = child;
                let tuple = child_tuple(child)?;
                let env = Tuple::Joined(JoinedTuple::borrowed(Some(&tuple), ctx.father()));
                self.values = evaluate_all(&self.expressions, &env)?;
            }
            None => {
                if self.emitted {
                    return Ok(false);
                }
                self.emitted = true;
                let env = Tuple::Joined(JoinedTuple::borrowed(ctx.father(), None));
                self.values = evaluate_all(&self.expressions, &env)?;
            }
        }
        self.ready = true;
        Ok(true)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        if !self.ready {
            return None;
        }
        Some(Tuple::Values(ValueListTuple::new(&self.values, &self.specs)))
    }

    fn close(&mut self) -> Result<()> {
        self.ready = false;
        match self.child.as_mut() {
            Some(child) => child.close(),
            None => Ok(()),
        }
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        self.child.as_deref().into_iter().collect()
    }
}
