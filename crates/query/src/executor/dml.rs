//! Insert, delete and update operators.
//!
//! All three do their work in `open` and produce no rows. Delete and
//! update drain their input before touching the table, so the scan below
//! never sees its own changes.

use super::operator::child_tuple;
use super::{Operator, PhysicalOperator};
use crate::ast::Expr;
use crate::context::ExecContext;
use crate::tuple::{JoinedTuple, Tuple};
use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use mindb_core::{Error, Record, Result, Rid, Value};
use mindb_storage::Table;
use tracing::debug;

fn source_record<'t>(child: &PhysicalOperator, tuple: &'t Tuple<'_>) -> Result<&'t Record> {
    tuple.record().ok_or_else(|| {
        Error::internal(format!("{} does not produce stored records", child.name()))
    })
}

/// Inserts literal rows.
pub struct InsertOperator {
    table: Rc<dyn Table>,
    rows: Vec<Vec<Value>>,
}

impl InsertOperator {
    pub fn new(table: Rc<dyn Table>, rows: Vec<Vec<Value>>) -> Self {
        Self { table, rows }
    }
}

impl Operator for InsertOperator {
    fn name(&self) -> &'static str {
        "INSERT"
    }

    fn param(&self) -> String {
        String::from(self.table.name())
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        for row in &self.rows {
            ctx.trx().insert_record(self.table.as_ref(), row.clone())?;
        }
        debug!(table = %self.table.name(), rows = self.rows.len(), "inserted");
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

/// Deletes every record its input produces.
pub struct DeleteOperator {
    child: Box<PhysicalOperator>,
    table: Rc<dyn Table>,
}

impl DeleteOperator {
    pub fn new(child: PhysicalOperator, table: Rc<dyn Table>) -> Self {
        Self {
            child: Box::new(child),
            table,
        }
    }
}

impl Operator for DeleteOperator {
    fn name(&self) -> &'static str {
        "DELETE"
    }

    fn param(&self) -> String {
        String::from(self.table.name())
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.child.open(ctx)?;
        let mut rids: Vec<Rid> = Vec::new();
        while self.child.next(ctx)? {
            let tuple = child_tuple(&self.child)?;
            rids.push(source_record(&self.child, &tuple)?.rid());
        }
        self.child.close()?;

        for rid in &rids {
            ctx.trx().delete_record(self.table.as_ref(), *rid)?;
        }
        debug!(table = %self.table.name(), rows = rids.len(), "deleted");
        Ok(())
    }

    fn next(&mut self, _ctx: &ExecContext<'_>) -> Result<bool> {
        Ok(false)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        None
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        alloc::vec![self.child.as_ref()]
    }
}

/// Rewrites fields of every record its input produces.
///
/// `units` pairs a field position with the expression computing its new
/// value from the old row.
pub struct UpdateOperator {
    child: Box<PhysicalOperator>,
    table: Rc<dyn Table>,
    units: Vec<(usize, Expr)>,
}

impl UpdateOperator {
    pub fn new(child: PhysicalOperator, table: Rc<dyn Table>, units: Vec<(usize, Expr)>) -> Self {
        Self {
            child: Box::new(child),
            table,
            units,
        }
    }
}

impl Operator for UpdateOperator {
    fn name(&self) -> &'static str {
        "UPDATE"
    }

    fn param(&self) -> String {
        let fields = self.table.meta().fields();
        let sets: Vec<String> = self
            .units
            .iter()
            .map(|(i, expr)| {
                let name = fields.get(*i).map_or("?", |f| f.name());
                format!("{} = {}", name, expr)
            })
            .collect();
        format!("{} SET {}", self.table.name(), sets.join(", "))
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.child.open(ctx)?;
        let mut changes: Vec<(Rid, Vec<Value>)> = Vec::new();
        while self.child.next(ctx)? {
            let tuple = child_tuple(&self.child)?;
            let record = source_record(&self.child, &tuple)?;
            let env = Tuple::Joined(JoinedTuple::borrowed(Some(&tuple), ctx.father()));
            let mut values = record.values().to_vec();
            for (i, expr) in &self.units {
                let slot = values.get_mut(*i).ok_or_else(|| {
                    Error::internal(format!("field #{} out of range for {}", i, self.table.name()))
                })?;
                *slot = expr.get_value(&env)?;
            }
            changes.push((record.rid(), values));
        }
        self.child.close()?;

        for (rid, values) in &changes {
            ctx.trx().update_record(self.table.as_ref(), *rid, values.clone())?;
        }
        debug!(table = %self.table.name(), rows = changes.len(), "updated");
        Ok(())
    }

    fn next(&mut self, _ctx: &ExecContext<'_>) -> Result<bool> {
        Ok(false)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        None
    }

    fn close(&mut self) -> Result<()> {
        self.child.close()
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        alloc::vec![self.child.as_ref()]
    }
}
