use super::TupleCellSpec;
use mindb_core::Value;

/// Values computed by an operator, each labelled by a spec.
#[derive(Clone, Copy, Debug)]
pub struct ValueListTuple<'a> {
    values: &'a [Value],
    specs: &'a [TupleCellSpec],
}

impl<'a> ValueListTuple<'a> {
    pub fn new(values: &'a [Value], specs: &'a [TupleCellSpec]) -> Self {
        debug_assert_eq!(values.len(), specs.len());
        Self { values, specs }
    }

    pub fn cell_num(&self) -> usize {
        self.values.len()
    }

    pub fn cell_at(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    pub fn spec_at(&self, index: usize) -> Option<TupleCellSpec> {
        self.specs.get(index).cloned()
    }

    pub fn find_cell(&self, spec: &TupleCellSpec) -> Option<&'a Value> {
        // Unqualified specs match on the name alone.
        let pos = self.specs.iter().position(|s| {
            s.field() == spec.field() && (s.table() == spec.table() || s.table().is_empty())
        })?;
        self.values.get(pos)
    }
}
