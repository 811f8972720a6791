//! Physical plan runner: drives an operator tree to completion.

use super::{Operator, PhysicalOperator};
use crate::context::ExecContext;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use mindb_core::{Error, Result, Value};
use mindb_storage::Trx;
use tracing::warn;

/// Rows produced by a plan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    /// Column names, taken from the first row.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Runs operator trees within one transaction.
pub struct PhysicalPlanRunner<'t> {
    trx: &'t dyn Trx,
}

impl<'t> PhysicalPlanRunner<'t> {
    pub fn new(trx: &'t dyn Trx) -> Self {
        Self { trx }
    }

    /// Opens `op`, pulls every row and closes it. The tree is closed on
    /// every path, failures included.
    pub fn execute(&self, op: &mut PhysicalOperator) -> Result<QueryResult> {
        let ctx = ExecContext::new(self.trx);
        let result = Self::drain(op, &ctx);
        let closed = op.close();
        match (result, closed) {
            (Ok(result), Ok(())) => Ok(result),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    warn!(operator = op.name(), error = %close_err, "close failed after error");
                }
                Err(err)
            }
            (Ok(_), Err(err)) => Err(err),
        }
    }

    fn drain(op: &mut PhysicalOperator, ctx: &ExecContext<'_>) -> Result<QueryResult> {
        op.open(ctx)?;
        let mut result = QueryResult::default();
        while op.next(ctx)? {
            let tuple = op
                .current_tuple()
                .ok_or_else(|| Error::internal("row without tuple"))?;
            if result.rows.is_empty() {
                result.columns = tuple.specs().iter().map(|s| s.to_string()).collect();
            }
            result.rows.push(tuple.to_values());
        }
        Ok(result)
    }
}
