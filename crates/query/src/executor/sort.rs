//! ORDER BY operator.

use super::operator::child_tuple;
use super::{Operator, PhysicalOperator};
use crate::ast::SortOrder;
use crate::context::ExecContext;
use crate::planner::OrderUnit;
use crate::tuple::{JoinedTuple, Tuple, TupleCellSpec, ValueListTuple};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Write;
use mindb_core::{Result, Value};

struct SortedRow {
    keys: Vec<Value>,
    values: Vec<Value>,
}

/// Materializes its input in `open` and replays it sorted.
///
/// The sort is stable; NULL sorts first in ascending order.
pub struct OrderByOperator {
    child: Box<PhysicalOperator>,
    units: Vec<OrderUnit>,
    rows: Vec<SortedRow>,
    specs: Vec<TupleCellSpec>,
    position: Option<usize>,
}

impl OrderByOperator {
    pub fn new(child: PhysicalOperator, units: Vec<OrderUnit>) -> Self {
        Self {
            child: Box::new(child),
            units,
            rows: Vec::new(),
            specs: Vec::new(),
            position: None,
        }
    }

    fn compare(&self, a: &SortedRow, b: &SortedRow) -> Ordering {
        for (unit, (x, y)) in self.units.iter().zip(a.keys.iter().zip(&b.keys)) {
            let ord = match unit.order {
                SortOrder::Asc => x.cmp(y),
                SortOrder::Desc => y.cmp(x),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    fn materialize(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        while self.child.next(ctx)? {
            let tuple = child_tuple(&self.child)?;
            if self.specs.is_empty() {
                self.specs = tuple.specs();
            }
            let env = Tuple::Joined(JoinedTuple::borrowed(Some(&tuple), ctx.father()));
            let keys = self
                .units
                .iter()
                .map(|unit| unit.expr.get_value(&env))
                .collect::<Result<Vec<_>>>()?;
            self.rows.push(SortedRow {
                keys,
                values: tuple.to_values(),
            });
        }
        Ok(())
    }
}

impl Operator for OrderByOperator {
    fn name(&self) -> &'static str {
        "ORDER_BY"
    }

    fn param(&self) -> String {
        let mut out = String::new();
        for (i, unit) in self.units.iter().enumerate() {
            let order = match unit.order {
                SortOrder::Asc => "ASC",
                SortOrder::Desc => "DESC",
            };
            let sep = if i == 0 { "" } else { ", " };
            let _ = write!(out, "{}{} {}", sep, unit.expr, order);
        }
        out
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.rows.clear();
        self.position = None;
        self.child.open(ctx)?;
        self.materialize(ctx)?;
        self.child.close()?;

        let mut rows = core::mem::take(&mut self.rows);
        rows.sort_by(|a, b| self.compare(a, b));
        self.rows = rows;
        Ok(())
    }

    fn next(&mut self, _ctx: &ExecContext<'_>) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next);
        Ok(next < self.rows.len())
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        let row = self.rows.get(self.position?)?;
        Some(Tuple::Values(ValueListTuple::new(&row.values, &self.specs)))
    }

    fn close(&mut self) -> Result<()> {
        self.rows.clear();
        self.position = None;
        self.child.close()
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        alloc::vec![self.child.as_ref()]
    }
}
