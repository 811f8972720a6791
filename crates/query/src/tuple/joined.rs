use super::{Tuple, TupleCellSpec, ValueListTuple};
use mindb_core::Value;

/// One side of a [`JoinedTuple`].
#[derive(Clone, Debug)]
pub enum TupleSlot<'a> {
    Borrowed(&'a Tuple<'a>),
    /// Cells materialized by the operator producing the join.
    Values(ValueListTuple<'a>),
}

impl<'a> TupleSlot<'a> {
    fn cell_num(&self) -> usize {
        match self {
            TupleSlot::Borrowed(t) => t.cell_num(),
            TupleSlot::Values(t) => t.cell_num(),
        }
    }

    fn cell_at(&self, index: usize) -> Option<&Value> {
        match self {
            TupleSlot::Borrowed(t) => t.cell_at(index),
            TupleSlot::Values(t) => t.cell_at(index),
        }
    }

    fn spec_at(&self, index: usize) -> Option<TupleCellSpec> {
        match self {
            TupleSlot::Borrowed(t) => t.spec_at(index),
            TupleSlot::Values(t) => t.spec_at(index),
        }
    }

    fn find_cell(&self, spec: &TupleCellSpec) -> Option<&Value> {
        match self {
            TupleSlot::Borrowed(t) => t.find_cell(spec),
            TupleSlot::Values(t) => t.find_cell(spec),
        }
    }
}

/// Concatenation of two tuples, either side possibly absent.
///
/// Cells are numbered left first. Lookups by spec try the left side first,
/// so on a name collision the left side wins.
#[derive(Clone, Debug)]
pub struct JoinedTuple<'a> {
    left: Option<TupleSlot<'a>>,
    right: Option<TupleSlot<'a>>,
}

impl<'a> JoinedTuple<'a> {
    /// Joins two borrowed views.
    pub fn borrowed(left: Option<&'a Tuple<'a>>, right: Option<&'a Tuple<'a>>) -> Self {
        Self {
            left: left.map(TupleSlot::Borrowed),
            right: right.map(TupleSlot::Borrowed),
        }
    }

    /// Joins two materialized cell lists.
    pub fn values(left: ValueListTuple<'a>, right: ValueListTuple<'a>) -> Self {
        Self {
            left: Some(TupleSlot::Values(left)),
            right: Some(TupleSlot::Values(right)),
        }
    }

    fn left_num(&self) -> usize {
        self.left.as_ref().map_or(0, TupleSlot::cell_num)
    }

    pub fn cell_num(&self) -> usize {
        self.left_num() + self.right.as_ref().map_or(0, TupleSlot::cell_num)
    }

    pub fn cell_at(&self, index: usize) -> Option<&Value> {
        let left_num = self.left_num();
        if index < left_num {
            self.left.as_ref()?.cell_at(index)
        } else {
            self.right.as_ref()?.cell_at(index - left_num)
        }
    }

    pub fn spec_at(&self, index: usize) -> Option<TupleCellSpec> {
        let left_num = self.left_num();
        if index < left_num {
            self.left.as_ref()?.spec_at(index)
        } else {
            self.right.as_ref()?.spec_at(index - left_num)
        }
    }

    pub fn find_cell(&self, spec: &TupleCellSpec) -> Option<&Value> {
        self.left
            .as_ref()
            .and_then(|t| t.find_cell(spec))
            .or_else(|| self.right.as_ref().and_then(|t| t.find_cell(spec)))
    }
}
