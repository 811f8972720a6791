use super::TupleCellSpec;
use mindb_core::schema::FieldMeta;
use mindb_core::{Record, Value};

/// A stored record seen through its table alias.
#[derive(Clone, Copy, Debug)]
pub struct RowTuple<'a> {
    record: &'a Record,
    alias: &'a str,
    fields: &'a [FieldMeta],
}

impl<'a> RowTuple<'a> {
    pub fn new(record: &'a Record, alias: &'a str, fields: &'a [FieldMeta]) -> Self {
        Self {
            record,
            alias,
            fields,
        }
    }

    #[inline]
    pub fn record(&self) -> &'a Record {
        self.record
    }

    #[inline]
    pub fn alias(&self) -> &'a str {
        self.alias
    }

    pub fn cell_num(&self) -> usize {
        self.fields.len()
    }

    pub fn cell_at(&self, index: usize) -> Option<&'a Value> {
        let field = self.fields.get(index)?;
        self.record.get(field.index())
    }

    pub fn spec_at(&self, index: usize) -> Option<TupleCellSpec> {
        self.fields
            .get(index)
            .map(|field| TupleCellSpec::new(self.alias, field.name()))
    }

    pub fn find_cell(&self, spec: &TupleCellSpec) -> Option<&'a Value> {
        if spec.table() != self.alias {
            return None;
        }
        let field = self.fields.iter().find(|f| f.name() == spec.field())?;
        self.record.get(field.index())
    }
}
