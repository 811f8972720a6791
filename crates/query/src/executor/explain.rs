//! EXPLAIN and empty operators.

use super::{Operator, PhysicalOperator};
use crate::context::ExecContext;
use crate::tuple::{Tuple, TupleCellSpec, ValueListTuple};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use mindb_core::{Result, Value};

/// Renders `op` and its subtree, one operator per line.
pub fn render_plan(op: &PhysicalOperator) -> String {
    let mut out = String::from("OPERATOR(NAME)\n");
    render(op, 0, &mut out);
    out
}

fn render(op: &PhysicalOperator, depth: usize, out: &mut String) {
    if depth > 0 {
        for _ in 1..depth {
            out.push_str("  ");
        }
        out.push_str("└─");
    }
    out.push_str(op.name());
    let param = op.param();
    if !param.is_empty() {
        let _ = write!(out, "({})", param);
    }
    out.push('\n');
    for child in op.children() {
        render(child, depth + 1, out);
    }
}

/// Emits the rendered plan of its child as a single row. The child is
/// never opened.
pub struct ExplainOperator {
    child: Box<PhysicalOperator>,
    specs: [TupleCellSpec; 1],
    values: Vec<Value>,
    emitted: bool,
}

impl ExplainOperator {
    pub fn new(child: PhysicalOperator) -> Self {
        Self {
            child: Box::new(child),
            specs: [TupleCellSpec::named("Query Plan")],
            values: Vec::new(),
            emitted: false,
        }
    }
}

impl Operator for ExplainOperator {
    fn name(&self) -> &'static str {
        "EXPLAIN"
    }

    fn open(&mut self, _ctx: &ExecContext<'_>) -> Result<()> {
        self.emitted = false;
        self.values.clear();
        Ok(())
    }

    fn next(&mut self, _ctx: &ExecContext<'_>) -> Result<bool> {
        if self.emitted {
            self.values.clear();
            return Ok(false);
        }
        self.emitted = true;
        self.values = alloc::vec![Value::String(render_plan(&self.child))];
        Ok(true)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        if self.values.is_empty() {
            return None;
        }
        Some(Tuple::Values(ValueListTuple::new(&self.values, &self.specs)))
    }

    fn close(&mut self) -> Result<()> {
        self.values.clear();
        self.child.close()
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        alloc::vec![self.child.as_ref()]
    }
}

/// Produces nothing. Stands in for a scan whose range is empty.
#[derive(Debug, Default)]
pub struct EmptyOperator;

impl EmptyOperator {
    pub fn new() -> Self {
        Self
    }
}

impl Operator for EmptyOperator {
    fn name(&self) -> &'static str {
        "EMPTY"
    }

    fn open(&mut self, _ctx: &ExecContext<'_>) -> Result<()> {
        Ok(())
    }

    fn next(&mut self, _ctx: &ExecContext<'_>) -> Result<bool> {
        Ok(false)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        None
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
