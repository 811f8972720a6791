//! Record scanning.

use alloc::vec::{self, Vec};
use mindb_core::{Record, Result};

/// Sequential cursor over the records of one table.
///
/// `Ok(None)` marks the end of the table. Scanner resources are released
/// when the scanner is dropped.
pub trait RecordScanner {
    fn next_record(&mut self) -> Result<Option<Record>>;
}

/// Scanner over a snapshot taken when the scan was opened.
pub struct MemRecordScanner {
    records: vec::IntoIter<Record>,
}

impl MemRecordScanner {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl RecordScanner for MemRecordScanner {
    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.records.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use mindb_core::Value;

    #[test]
    fn test_scanner_drains_snapshot() {
        let mut scanner = MemRecordScanner::new(vec![
            Record::new(1, vec![Value::Int(1)]),
            Record::new(2, vec![Value::Int(2)]),
        ]);
        assert_eq!(scanner.next_record().unwrap().unwrap().rid(), 1);
        assert_eq!(scanner.next_record().unwrap().unwrap().rid(), 2);
        assert!(scanner.next_record().unwrap().is_none());
        assert!(scanner.next_record().unwrap().is_none());
    }
}
