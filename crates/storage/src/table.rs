//! Table storage.
//!
//! [`Table`] is the collaborator surface the query executor sees;
//! [`MemTable`] keeps records in memory and maintains its indexes on
//! every write.

use crate::index::{Index, MemIndex};
use crate::scanner::{MemRecordScanner, RecordScanner};
use crate::transaction::Trx;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use mindb_core::schema::{IndexMeta, TableMeta};
use mindb_core::{Error, Record, Result, Rid, Value};

/// Record storage backend: HashMap (O(1) lookup) or BTreeMap (ordered).
#[cfg(feature = "hash-store")]
type RecordMap = hashbrown::HashMap<Rid, Record>;
#[cfg(not(feature = "hash-store"))]
type RecordMap = alloc::collections::BTreeMap<Rid, Record>;

/// A table as seen by the query executor.
pub trait Table: fmt::Debug {
    fn meta(&self) -> &TableMeta;

    fn name(&self) -> &str {
        self.meta().name()
    }

    /// Indexes in declaration order.
    fn indexes(&self) -> Vec<Rc<dyn Index>>;

    /// Opens a sequential scan. Records the transaction cannot see are
    /// skipped.
    fn record_scanner(&self, trx: &dyn Trx, readonly: bool) -> Result<Box<dyn RecordScanner>>;

    /// Fetches one record by id.
    fn get_record(&self, rid: Rid, readonly: bool) -> Result<Record>;

    fn insert_record(&self, values: Vec<Value>) -> Result<Rid>;

    /// Removes a record and returns it.
    fn delete_record(&self, rid: Rid) -> Result<Record>;

    /// Runs `visitor` on the stored record. Mutations are kept only when
    /// `readonly` is false.
    fn visit_record(
        &self,
        rid: Rid,
        readonly: bool,
        visitor: &mut dyn FnMut(&mut Record),
    ) -> Result<()>;
}

/// In-memory table.
pub struct MemTable {
    meta: TableMeta,
    records: RefCell<RecordMap>,
    indexes: Vec<Rc<MemIndex>>,
    next_rid: Cell<Rid>,
}

impl MemTable {
    /// Creates an empty table with one index per index definition in `meta`.
    pub fn new(meta: TableMeta) -> Result<Self> {
        let indexes = meta
            .indexes()
            .iter()
            .map(|index| MemIndex::new(index.clone(), &meta).map(Rc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            meta,
            records: RefCell::new(RecordMap::default()),
            indexes,
            next_rid: Cell::new(1),
        })
    }

    /// Adds an index and fills it from the records already stored.
    pub fn create_index(&mut self, meta: IndexMeta) -> Result<()> {
        let index = MemIndex::new(meta.clone(), &self.meta)?;
        for (rid, record) in self.records.borrow().iter() {
            index.check_unique(record.values(), None)?;
            index.insert_entry(*rid, record.values());
        }
        self.meta.add_index(meta)?;
        self.indexes.push(Rc::new(index));
        Ok(())
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns every record ordered by rid.
    pub fn records(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self.records.borrow().values().cloned().collect();
        records.sort_by_key(Record::rid);
        records
    }
}

impl fmt::Debug for MemTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemTable")
            .field("name", &self.meta.name())
            .field("records", &self.len())
            .field("indexes", &self.indexes.len())
            .finish()
    }
}

impl Table for MemTable {
    fn meta(&self) -> &TableMeta {
        &self.meta
    }

    fn indexes(&self) -> Vec<Rc<dyn Index>> {
        self.indexes
            .iter()
            .map(|index| Rc::clone(index) as Rc<dyn Index>)
            .collect()
    }

    fn record_scanner(&self, trx: &dyn Trx, readonly: bool) -> Result<Box<dyn RecordScanner>> {
        let mut visible = Vec::with_capacity(self.len());
        for record in self.records() {
            match trx.visit_record(self, &record, readonly) {
                Ok(()) => visible.push(record),
                Err(Error::RecordInvisible { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(Box::new(MemRecordScanner::new(visible)))
    }

    fn get_record(&self, rid: Rid, _readonly: bool) -> Result<Record> {
        self.records
            .borrow()
            .get(&rid)
            .cloned()
            .ok_or_else(|| Error::record_not_found(self.meta.name(), rid))
    }

    fn insert_record(&self, values: Vec<Value>) -> Result<Rid> {
        self.meta.check_values(&values)?;
        for index in &self.indexes {
            index.check_unique(&values, None)?;
        }
        let rid = self.next_rid.get();
        self.next_rid.set(rid + 1);
        for index in &self.indexes {
            index.insert_entry(rid, &values);
        }
        self.records.borrow_mut().insert(rid, Record::new(rid, values));
        Ok(rid)
    }

    fn delete_record(&self, rid: Rid) -> Result<Record> {
        let record = self
            .records
            .borrow_mut()
            .remove(&rid)
            .ok_or_else(|| Error::record_not_found(self.meta.name(), rid))?;
        for index in &self.indexes {
            index.remove_entry(rid, record.values());
        }
        Ok(record)
    }

    fn visit_record(
        &self,
        rid: Rid,
        readonly: bool,
        visitor: &mut dyn FnMut(&mut Record),
    ) -> Result<()> {
        let mut records = self.records.borrow_mut();
        let stored = records
            .get_mut(&rid)
            .ok_or_else(|| Error::record_not_found(self.meta.name(), rid))?;

        let mut updated = stored.clone();
        visitor(&mut updated);
        if readonly {
            return Ok(());
        }

        self.meta.check_values(updated.values())?;
        if updated.rid() != rid {
            return Err(Error::invalid_argument("record id cannot be changed"));
        }
        for index in &self.indexes {
            index.check_unique(updated.values(), Some(rid))?;
        }
        for index in &self.indexes {
            index.remove_entry(rid, stored.values());
            index.insert_entry(rid, updated.values());
        }
        *stored = updated;
        Ok(())
    }
}
