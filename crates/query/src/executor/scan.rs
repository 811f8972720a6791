//! Table and index scan operators.

use super::Operator;
use crate::ast::Expr;
use crate::context::ExecContext;
use crate::range::{check_range, RangeBound, Side};
use crate::tuple::{JoinedTuple, RowTuple, Tuple};
use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};
use mindb_core::{Error, Record, Result, Value};
use mindb_storage::{Index, IndexScanner, RecordScanner, Table};
use tracing::trace;

/// Whether `record` passes every predicate. Predicates see the father
/// tuple on the left and the record on the right.
fn filter(
    record: &Record,
    alias: &str,
    table: &dyn Table,
    predicates: &[Expr],
    father: Option<&Tuple<'_>>,
) -> Result<bool> {
    if predicates.is_empty() {
        return Ok(true);
    }
    let row = Tuple::Row(RowTuple::new(record, alias, table.meta().fields()));
    let env = Tuple::Joined(JoinedTuple::borrowed(father, Some(&row)));
    for predicate in predicates {
        if !predicate.get_value(&env)?.get_boolean() {
            return Ok(false);
        }
    }
    Ok(true)
}

fn write_target(out: &mut String, table: &dyn Table, alias: &str) {
    out.push_str(table.name());
    if alias != table.name() {
        let _ = write!(out, " AS {}", alias);
    }
}

fn write_predicates(out: &mut String, predicates: &[Expr]) {
    for (i, predicate) in predicates.iter().enumerate() {
        let _ = write!(out, "{}{}", if i == 0 { " WHERE " } else { " AND " }, predicate);
    }
}

fn write_bounds(out: &mut String, keyword: &str, bounds: &[BoundExpr]) {
    for (i, bound) in bounds.iter().enumerate() {
        if i == 0 {
            let _ = write!(out, " {} {}", keyword, bound);
        } else {
            let _ = write!(out, ", {}", bound);
        }
    }
}

/// Full scan over a table.
pub struct TableScanOperator {
    table: Rc<dyn Table>,
    alias: String,
    readonly: bool,
    predicates: Vec<Expr>,
    scanner: Option<Box<dyn RecordScanner>>,
    current: Option<Record>,
}

impl TableScanOperator {
    pub fn new(table: Rc<dyn Table>, alias: impl Into<String>, readonly: bool, predicates: Vec<Expr>) -> Self {
        Self {
            table,
            alias: alias.into(),
            readonly,
            predicates,
            scanner: None,
            current: None,
        }
    }

    pub fn predicates(&self) -> &[Expr] {
        &self.predicates
    }
}

impl Operator for TableScanOperator {
    fn name(&self) -> &'static str {
        "TABLE_SCAN"
    }

    fn param(&self) -> String {
        let mut out = String::new();
        write_target(&mut out, self.table.as_ref(), &self.alias);
        write_predicates(&mut out, &self.predicates);
        out
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.current = None;
        self.scanner = Some(self.table.record_scanner(ctx.trx(), self.readonly)?);
        Ok(())
    }

    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool> {
        self.current = None;
        let Some(scanner) = self.scanner.as_mut() else {
            return Ok(false);
        };
        while let Some(record) = scanner.next_record()? {
            if filter(&record, &self.alias, self.table.as_ref(), &self.predicates, ctx.father())? {
                self.current = Some(record);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        let record = self.current.as_ref()?;
        Some(Tuple::Row(RowTuple::new(record, &self.alias, self.table.meta().fields())))
    }

    fn close(&mut self) -> Result<()> {
        self.scanner = None;
        self.current = None;
        Ok(())
    }
}

/// One bound of an index scan: the key must be on the right side of
/// `expr`, equal allowed when `inclusive`.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundExpr {
    pub expr: Expr,
    pub inclusive: bool,
}

impl BoundExpr {
    pub fn new(expr: Expr, inclusive: bool) -> Self {
        Self { expr, inclusive }
    }
}

impl fmt::Display for BoundExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.inclusive { "INCLUSIVE" } else { "EXCLUSIVE" };
        write!(f, "{} {}", self.expr, kind)
    }
}

/// Evaluates `bounds` and keeps the tightest one for `side`.
///
/// `Ok(None)` when some bound evaluates to NULL: no key compares with NULL,
/// so the scan is empty.
pub(crate) fn merge_bounds(
    bounds: &[BoundExpr],
    side: Side,
    mut eval: impl FnMut(&Expr) -> Result<Value>,
) -> Result<Option<RangeBound<Value>>> {
    let mut merged = RangeBound::Unbounded;
    for bound in bounds {
        let value = eval(&bound.expr)?;
        if value.is_null() {
            return Ok(None);
        }
        RangeBound::new(value, bound.inclusive).merge_into(&mut merged, side);
    }
    Ok(Some(merged))
}

/// Range scan over an index, followed by a residual filter.
///
/// Bounds are expressions evaluated at every `open` against the father
/// tuple, so the same operator can scan a different range for each outer
/// row of a join.
pub struct IndexScanOperator {
    table: Rc<dyn Table>,
    index: Rc<dyn Index>,
    alias: String,
    readonly: bool,
    is_delete: bool,
    left: Vec<BoundExpr>,
    right: Vec<BoundExpr>,
    predicates: Vec<Expr>,
    scanner: Option<Box<dyn IndexScanner>>,
    current: Option<Record>,
}

impl IndexScanOperator {
    pub fn new(
        table: Rc<dyn Table>,
        index: Rc<dyn Index>,
        alias: impl Into<String>,
        left: Vec<BoundExpr>,
        right: Vec<BoundExpr>,
    ) -> Self {
        Self {
            table,
            index,
            alias: alias.into(),
            readonly: true,
            is_delete: false,
            left,
            right,
            predicates: Vec::new(),
            scanner: None,
            current: None,
        }
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn is_delete(mut self, is_delete: bool) -> Self {
        self.is_delete = is_delete;
        self
    }

    pub fn with_predicates(mut self, predicates: Vec<Expr>) -> Self {
        self.predicates = predicates;
        self
    }

    pub fn index_name(&self) -> &str {
        self.index.meta().name()
    }

    pub fn left_bounds(&self) -> &[BoundExpr] {
        &self.left
    }

    pub fn right_bounds(&self) -> &[BoundExpr] {
        &self.right
    }

    pub fn predicates(&self) -> &[Expr] {
        &self.predicates
    }
}

impl Operator for IndexScanOperator {
    fn name(&self) -> &'static str {
        "INDEX_SCAN"
    }

    fn param(&self) -> String {
        let mut out = format!("{} ON ", self.index.meta().name());
        write_target(&mut out, self.table.as_ref(), &self.alias);
        write_bounds(&mut out, "LEFT", &self.left);
        write_bounds(&mut out, "RIGHT", &self.right);
        write_predicates(&mut out, &self.predicates);
        out
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.current = None;
        self.scanner = None;

        let env = Tuple::Joined(JoinedTuple::borrowed(ctx.father(), None));
        let left = merge_bounds(&self.left, Side::Left, |e| e.get_value(&env))?;
        let right = merge_bounds(&self.right, Side::Right, |e| e.get_value(&env))?;
        let (Some(left), Some(right)) = (left, right) else {
            trace!(index = %self.index.meta().name(), "null bound, nothing to scan");
            return Ok(());
        };
        if !check_range(&left, &right) {
            trace!(index = %self.index.meta().name(), %left, %right, "empty range");
            return Ok(());
        }

        let left_key = left.value().map(Value::data);
        let right_key = right.value().map(Value::data);
        let scanner = self.index.create_scanner(
            left_key.as_deref(),
            left.is_inclusive(),
            right_key.as_deref(),
            right.is_inclusive(),
        )?;
        self.scanner = Some(scanner);
        Ok(())
    }

    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool> {
        self.current = None;
        let Some(scanner) = self.scanner.as_mut() else {
            return Ok(false);
        };
        while let Some(rid) = scanner.next_entry(self.is_delete)? {
            let record = self.table.get_record(rid, self.readonly)?;
            match ctx.trx().visit_record(self.table.as_ref(), &record, self.readonly) {
                Ok(()) => {}
                Err(Error::RecordInvisible { .. }) => continue,
                Err(err) => return Err(err),
            }
            if filter(&record, &self.alias, self.table.as_ref(), &self.predicates, ctx.father())? {
                self.current = Some(record);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        let record = self.current.as_ref()?;
        Some(Tuple::Row(RowTuple::new(record, &self.alias, self.table.meta().fields())))
    }

    fn close(&mut self) -> Result<()> {
        self.scanner = None;
        self.current = None;
        Ok(())
    }
}
