//! Transactions.
//!
//! Every record access the executor performs on behalf of a statement goes
//! through a [`Trx`]. [`VanillaTrx`] applies changes directly to the table
//! and sees every record.

use crate::table::Table;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use mindb_core::{Record, Result, Rid, Value};
use tracing::trace;

/// Global transaction ID counter.
static NEXT_TRX_ID: AtomicU64 = AtomicU64::new(1);

/// Transaction ID type.
pub type TrxId = u64;

/// Transaction-side record operations.
pub trait Trx {
    fn id(&self) -> TrxId;

    fn insert_record(&self, table: &dyn Table, values: Vec<Value>) -> Result<Rid>;

    fn delete_record(&self, table: &dyn Table, rid: Rid) -> Result<()>;

    /// Replaces every field of the record.
    fn update_record(&self, table: &dyn Table, rid: Rid, values: Vec<Value>) -> Result<()>;

    /// Checks that `record` may be accessed by this transaction.
    ///
    /// Fails with `RecordInvisible` for records the transaction must not
    /// see and `LockedConcurrencyConflict` when another writer holds it.
    fn visit_record(&self, table: &dyn Table, record: &Record, readonly: bool) -> Result<()>;
}

/// Transaction without isolation: writes go straight to the table.
#[derive(Debug)]
pub struct VanillaTrx {
    id: TrxId,
}

impl VanillaTrx {
    /// Starts a new transaction.
    pub fn begin() -> Self {
        let id = NEXT_TRX_ID.fetch_add(1, Ordering::SeqCst);
        trace!(trx = id, "transaction started");
        Self { id }
    }
}

impl Trx for VanillaTrx {
    fn id(&self) -> TrxId {
        self.id
    }

    fn insert_record(&self, table: &dyn Table, values: Vec<Value>) -> Result<Rid> {
        table.insert_record(values)
    }

    fn delete_record(&self, table: &dyn Table, rid: Rid) -> Result<()> {
        table.delete_record(rid).map(|_| ())
    }

    fn update_record(&self, table: &dyn Table, rid: Rid, values: Vec<Value>) -> Result<()> {
        let mut values = Some(values);
        table.visit_record(rid, false, &mut |record| {
            if let Some(values) = values.take() {
                *record.values_mut() = values;
            }
        })
    }

    fn visit_record(&self, _table: &dyn Table, _record: &Record, _readonly: bool) -> Result<()> {
        Ok(())
    }
}
