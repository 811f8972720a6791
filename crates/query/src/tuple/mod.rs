//! Tuple views.
//!
//! A [`Tuple`] is a read-only view of one row flowing between operators.
//! Tuples never own record storage: a [`RowTuple`] borrows the record held
//! by a scan, a [`ValueListTuple`] borrows values materialized by an
//! operator, and a [`JoinedTuple`] concatenates two other views.

mod joined;
mod row;
mod values;

pub use joined::{JoinedTuple, TupleSlot};
pub use row::RowTuple;
pub use values::ValueListTuple;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use mindb_core::{Record, Value};

/// Identifies a cell by table alias and field name.
///
/// Cells computed by an operator (aggregates, projected expressions) carry
/// an empty table and are looked up by name alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleCellSpec {
    table: String,
    field: String,
}

impl TupleCellSpec {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }

    /// A spec without table qualifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(String::new(), name)
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[inline]
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for TupleCellSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.table.is_empty() {
            f.write_str(&self.field)
        } else {
            write!(f, "{}.{}", self.table, self.field)
        }
    }
}

/// A row view.
#[derive(Clone, Debug)]
pub enum Tuple<'a> {
    Row(RowTuple<'a>),
    Joined(JoinedTuple<'a>),
    Values(ValueListTuple<'a>),
}

impl<'a> Tuple<'a> {
    /// Number of cells.
    pub fn cell_num(&self) -> usize {
        match self {
            Tuple::Row(t) => t.cell_num(),
            Tuple::Joined(t) => t.cell_num(),
            Tuple::Values(t) => t.cell_num(),
        }
    }

    /// Cell at a position; joined tuples number left cells first.
    pub fn cell_at(&self, index: usize) -> Option<&Value> {
        match self {
            Tuple::Row(t) => t.cell_at(index),
            Tuple::Joined(t) => t.cell_at(index),
            Tuple::Values(t) => t.cell_at(index),
        }
    }

    /// Spec of the cell at a position.
    pub fn spec_at(&self, index: usize) -> Option<TupleCellSpec> {
        match self {
            Tuple::Row(t) => t.spec_at(index),
            Tuple::Joined(t) => t.spec_at(index),
            Tuple::Values(t) => t.spec_at(index),
        }
    }

    /// Looks a cell up by spec.
    pub fn find_cell(&self, spec: &TupleCellSpec) -> Option<&Value> {
        match self {
            Tuple::Row(t) => t.find_cell(spec),
            Tuple::Joined(t) => t.find_cell(spec),
            Tuple::Values(t) => t.find_cell(spec),
        }
    }

    /// The stored record behind a row tuple.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Tuple::Row(t) => Some(t.record()),
            _ => None,
        }
    }

    /// Copies every cell out.
    pub fn to_values(&self) -> Vec<Value> {
        (0..self.cell_num())
            .filter_map(|i| self.cell_at(i).cloned())
            .collect()
    }

    /// Specs of every cell.
    pub fn specs(&self) -> Vec<TupleCellSpec> {
        (0..self.cell_num()).filter_map(|i| self.spec_at(i)).collect()
    }
}
