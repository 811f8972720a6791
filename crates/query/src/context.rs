//! Execution context handed to operators on every call.

use crate::tuple::Tuple;
use core::fmt;
use mindb_storage::Trx;

/// The transaction and the father tuple of one `open`/`next` call.
///
/// The father tuple is the outer row an enclosing operator exposes to its
/// inner side. It is borrowed for the duration of the call only.
#[derive(Clone, Copy)]
pub struct ExecContext<'c> {
    trx: &'c dyn Trx,
    father: Option<&'c Tuple<'c>>,
}

impl<'c> ExecContext<'c> {
    /// A context without father tuple.
    pub fn new(trx: &'c dyn Trx) -> Self {
        Self { trx, father: None }
    }

    #[inline]
    pub fn trx(&self) -> &'c dyn Trx {
        self.trx
    }

    #[inline]
    pub fn father(&self) -> Option<&'c Tuple<'c>> {
        self.father
    }

    /// Same transaction, with `father` as the outer row.
    pub fn with_father<'f>(&self, father: &'f Tuple<'f>) -> ExecContext<'f>
    where
        'c: 'f,
    {
        ExecContext {
            trx: self.trx,
            father: Some(father),
        }
    }
}

impl fmt::Debug for ExecContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecContext")
            .field("trx", &self.trx.id())
            .field("father", &self.father)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::{TupleCellSpec, ValueListTuple};
    use alloc::vec;
    use mindb_core::Value;
    use mindb_storage::VanillaTrx;

    #[test]
    fn test_with_father() {
        let trx = VanillaTrx::begin();
        let ctx = ExecContext::new(&trx);
        assert!(ctx.father().is_none());

        let values = vec![Value::Int(7)];
        let specs = vec![TupleCellSpec::new("o", "a")];
        let outer = Tuple::Values(ValueListTuple::new(&values, &specs));
        let inner = ctx.with_father(&outer);
        assert_eq!(inner.trx().id(), trx.id());
        let father = inner.father().unwrap();
        assert_eq!(father.find_cell(&TupleCellSpec::new("o", "a")), Some(&Value::Int(7)));
    }
}
