//! Ordered secondary indexes.
//!
//! An index maps the key bytes of a record's leading indexed field
//! ([`Value::data`]) to record ids. Range scans take optional, possibly
//! exclusive, key bounds on each side.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::{self, Vec};
use core::cell::RefCell;
use core::fmt;
use core::ops::Bound;
use mindb_core::schema::{IndexMeta, TableMeta};
use mindb_core::{Error, Result, Rid, Value};
use tracing::trace;

/// An index that can be range-scanned on its leading field.
pub trait Index: fmt::Debug {
    fn meta(&self) -> &IndexMeta;

    /// Opens a scan over `[left, right]`, each end optional and optionally
    /// exclusive. Keys are [`Value::data`] encodings. NULL keys are never
    /// returned.
    fn create_scanner(
        &self,
        left_key: Option<&[u8]>,
        left_inclusive: bool,
        right_key: Option<&[u8]>,
        right_inclusive: bool,
    ) -> Result<Box<dyn IndexScanner>>;
}

/// Cursor over the record ids matched by an index scan.
pub trait IndexScanner {
    /// Returns the next record id, or `Ok(None)` at end of scan.
    /// `is_delete` tells the index the caller is going to delete the
    /// returned records.
    fn next_entry(&mut self, is_delete: bool) -> Result<Option<Rid>>;
}

static NULL: Value = Value::Null;

/// In-memory ordered index.
#[derive(Debug)]
pub struct MemIndex {
    meta: IndexMeta,
    /// Record position of the leading field.
    field: usize,
    entries: RefCell<BTreeSet<(Vec<u8>, Rid)>>,
}

impl MemIndex {
    /// Creates an empty index over `table`.
    pub fn new(meta: IndexMeta, table: &TableMeta) -> Result<Self> {
        let leading = meta
            .leading_field()
            .ok_or_else(|| Error::invalid_schema("index without fields"))?;
        let field = table
            .field_index(leading)
            .ok_or_else(|| Error::column_not_found(table.name(), leading))?;
        Ok(Self {
            meta,
            field,
            entries: RefCell::new(BTreeSet::new()),
        })
    }

    fn key_value<'v>(&self, values: &'v [Value]) -> &'v Value {
        values.get(self.field).unwrap_or(&NULL)
    }

    /// Fails if inserting `values` would duplicate a key of a unique index.
    /// `ignore` skips the record being updated.
    pub(crate) fn check_unique(&self, values: &[Value], ignore: Option<Rid>) -> Result<()> {
        let value = self.key_value(values);
        if !self.meta.is_unique() || value.is_null() {
            return Ok(());
        }
        let key = value.data();
        let entries = self.entries.borrow();
        let duplicate = entries
            .range((Bound::Included((key.clone(), Rid::MIN)), Bound::Unbounded))
            .take_while(|(k, _)| *k == key)
            .any(|(_, rid)| Some(*rid) != ignore);
        if duplicate {
            return Err(Error::unique_constraint(self.meta.name(), value.clone()));
        }
        Ok(())
    }

    pub(crate) fn insert_entry(&self, rid: Rid, values: &[Value]) {
        let key = self.key_value(values).data();
        self.entries.borrow_mut().insert((key, rid));
    }

    pub(crate) fn remove_entry(&self, rid: Rid, values: &[Value]) {
        let key = self.key_value(values).data();
        self.entries.borrow_mut().remove(&(key, rid));
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Index for MemIndex {
    fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    fn create_scanner(
        &self,
        left_key: Option<&[u8]>,
        left_inclusive: bool,
        right_key: Option<&[u8]>,
        right_inclusive: bool,
    ) -> Result<Box<dyn IndexScanner>> {
        let lower = match left_key {
            Some(key) if left_inclusive => Bound::Included((key.to_vec(), Rid::MIN)),
            Some(key) => Bound::Excluded((key.to_vec(), Rid::MAX)),
            // Unbounded still starts past the NULL keys.
            None => Bound::Excluded((Value::Null.data(), Rid::MAX)),
        };
        let below_right = |key: &[u8]| match right_key {
            None => true,
            Some(right) if right_inclusive => key <= right,
            Some(right) => key < right,
        };

        let entries = self.entries.borrow();
        let rids: Vec<Rid> = entries
            .range((lower, Bound::Unbounded))
            .take_while(|(key, _)| below_right(key))
            .map(|(_, rid)| *rid)
            .collect();
        trace!(index = %self.meta.name(), matched = rids.len(), "index scan opened");
        Ok(Box::new(MemIndexScanner {
            rids: rids.into_iter(),
        }))
    }
}

/// Scanner over the record ids captured when the scan was opened.
///
/// Capturing up front makes deleting the returned records safe, so
/// `is_delete` needs no special handling here.
pub struct MemIndexScanner {
    rids: vec::IntoIter<Rid>,
}

impl IndexScanner for MemIndexScanner {
    fn next_entry(&mut self, _is_delete: bool) -> Result<Option<Rid>> {
        Ok(self.rids.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use mindb_core::DataType;

    fn index(unique: bool) -> MemIndex {
        let table = TableMeta::builder("t")
            .unwrap()
            .add_field("a", DataType::Int)
            .unwrap()
            .build()
            .unwrap();
        let meta = IndexMeta::new("idx_a", "t", vec!["a".into()]).unique(unique);
        let idx = MemIndex::new(meta, &table).unwrap();
        for (rid, a) in [(1, 1), (2, 2), (3, 3), (4, 2)] {
            idx.insert_entry(rid, &[Value::Int(a)]);
        }
        idx.insert_entry(5, &[Value::Null]);
        idx
    }

    fn scan(idx: &MemIndex, left: Option<(i64, bool)>, right: Option<(i64, bool)>) -> Vec<Rid> {
        let lk = left.map(|(v, _)| Value::Int(v).data());
        let rk = right.map(|(v, _)| Value::Int(v).data());
        let mut scanner = idx
            .create_scanner(
                lk.as_deref(),
                left.map_or(false, |(_, i)| i),
                rk.as_deref(),
                right.map_or(false, |(_, i)| i),
            )
            .unwrap();
        let mut out = Vec::new();
        while let Some(rid) = scanner.next_entry(false).unwrap() {
            out.push(rid);
        }
        out
    }

    #[test]
    fn test_range_scans() {
        let idx = index(false);
        assert_eq!(scan(&idx, Some((2, true)), None), vec![2, 4, 3]);
        assert_eq!(scan(&idx, Some((2, false)), None), vec![3]);
        assert_eq!(scan(&idx, None, Some((2, false))), vec![1]);
        assert_eq!(scan(&idx, None, Some((2, true))), vec![1, 2, 4]);
        assert_eq!(scan(&idx, Some((2, true)), Some((2, true))), vec![2, 4]);
        assert_eq!(scan(&idx, None, None), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let idx = index(false);
        assert!(scan(&idx, Some((3, true)), Some((1, true))).is_empty());
        assert!(scan(&idx, Some((2, false)), Some((2, false))).is_empty());
    }

    #[test]
    fn test_remove_entry() {
        let idx = index(false);
        idx.remove_entry(2, &[Value::Int(2)]);
        assert_eq!(scan(&idx, Some((2, true)), Some((2, true))), vec![4]);
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn test_unique_check() {
        let idx = index(true);
        assert!(idx.check_unique(&[Value::Int(9)], None).is_ok());
        assert!(idx.check_unique(&[Value::Int(1)], None).is_err());
        assert!(idx.check_unique(&[Value::Int(1)], Some(1)).is_ok());
        assert!(idx.check_unique(&[Value::Null], None).is_ok());
    }
}
