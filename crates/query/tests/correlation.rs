//! Father-tuple correlation: the inner side of a nested-loop join is
//! reopened for every outer row, and index bounds taken from the outer row
//! are recomputed each time.

use mindb_core::schema::{IndexMeta, TableMeta};
use mindb_core::{DataType, Record, Result, Rid, Value};
use mindb_query::ast::Expr;
use mindb_query::{LogicalPlan, Optimizer, PhysicalPlanRunner};
use mindb_storage::{Index, IndexScanner, MemTable, RecordScanner, Table, Trx, VanillaTrx};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<String>>>;

struct SpyIndex {
    inner: Rc<dyn Index>,
    calls: Calls,
}

impl fmt::Debug for SpyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpyIndex({})", self.inner.meta().name())
    }
}

fn describe_key(key: Option<&[u8]>, inclusive: bool) -> String {
    match key {
        None => "-".into(),
        Some(key) => format!("{}{:?}", if inclusive { "=" } else { "" }, key),
    }
}

impl Index for SpyIndex {
    fn meta(&self) -> &IndexMeta {
        self.inner.meta()
    }

    fn create_scanner(
        &self,
        left_key: Option<&[u8]>,
        left_inclusive: bool,
        right_key: Option<&[u8]>,
        right_inclusive: bool,
    ) -> Result<Box<dyn IndexScanner>> {
        self.calls.borrow_mut().push(format!(
            "index {} {}",
            describe_key(left_key, left_inclusive),
            describe_key(right_key, right_inclusive)
        ));
        self.inner
            .create_scanner(left_key, left_inclusive, right_key, right_inclusive)
    }
}

/// Records how a table is accessed.
struct SpyTable {
    inner: MemTable,
    calls: Calls,
}

impl fmt::Debug for SpyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpyTable({})", self.inner.name())
    }
}

impl Table for SpyTable {
    fn meta(&self) -> &TableMeta {
        self.inner.meta()
    }

    fn indexes(&self) -> Vec<Rc<dyn Index>> {
        self.inner
            .indexes()
            .into_iter()
            .map(|inner| {
                Rc::new(SpyIndex {
                    inner,
                    calls: self.calls.clone(),
                }) as Rc<dyn Index>
            })
            .collect()
    }

    fn record_scanner(&self, trx: &dyn Trx, readonly: bool) -> Result<Box<dyn RecordScanner>> {
        self.calls.borrow_mut().push("scan".into());
        self.inner.record_scanner(trx, readonly)
    }

    fn get_record(&self, rid: Rid, readonly: bool) -> Result<Record> {
        self.inner.get_record(rid, readonly)
    }

    fn insert_record(&self, values: Vec<Value>) -> Result<Rid> {
        self.inner.insert_record(values)
    }

    fn delete_record(&self, rid: Rid) -> Result<Record> {
        self.inner.delete_record(rid)
    }

    fn visit_record(
        &self,
        rid: Rid,
        readonly: bool,
        visitor: &mut dyn FnMut(&mut Record),
    ) -> Result<()> {
        self.inner.visit_record(rid, readonly, visitor)
    }
}

fn spy_table(name: &str, key: &str, indexed: bool, rows: &[i64]) -> (Rc<dyn Table>, Calls) {
    let mut builder = TableMeta::builder(name)
        .unwrap()
        .add_field(key, DataType::Int)
        .unwrap();
    if indexed {
        builder = builder.add_index(format!("idx_{}", key), &[key], false).unwrap();
    }
    let calls = Calls::default();
    let table = SpyTable {
        inner: MemTable::new(builder.build().unwrap()).unwrap(),
        calls: calls.clone(),
    };
    for k in rows {
        table.insert_record(vec![Value::Int(*k)]).unwrap();
    }
    (Rc::new(table), calls)
}

fn key(n: i64) -> String {
    format!("{:?}", Value::Int(n).data())
}

fn join_on_key(outer: Rc<dyn Table>, inner: Rc<dyn Table>) -> LogicalPlan {
    LogicalPlan::filter(
        LogicalPlan::join(LogicalPlan::table_get(outer), LogicalPlan::table_get(inner), vec![]),
        Expr::eq(
            Expr::field("inner", "k", DataType::Int),
            Expr::field("outer", "id", DataType::Int),
        ),
    )
}

#[test]
fn test_inner_range_follows_outer_row() {
    let (outer, _) = spy_table("outer", "id", false, &[3, 1, 2]);
    let (inner, calls) = spy_table("inner", "k", true, &[1, 3, 1, 5]);

    let mut op = Optimizer::default().optimize(join_on_key(outer, inner)).unwrap();
    let trx = VanillaTrx::begin();
    let result = PhysicalPlanRunner::new(&trx).execute(&mut op).unwrap();

    assert_eq!(
        result.rows,
        vec![
            vec![Value::Int(3), Value::Int(3)],
            vec![Value::Int(1), Value::Int(1)],
            vec![Value::Int(1), Value::Int(1)],
        ]
    );
    let expected: Vec<String> = [3, 1, 2]
        .iter()
        .map(|n| format!("index ={} ={}", key(*n), key(*n)))
        .collect();
    assert_eq!(*calls.borrow(), expected);
}

#[test]
fn test_empty_outer_never_opens_inner() {
    let (outer, outer_calls) = spy_table("outer", "id", false, &[]);
    let (inner, inner_calls) = spy_table("inner", "k", true, &[1, 2]);

    let mut op = Optimizer::default().optimize(join_on_key(outer, inner)).unwrap();
    let trx = VanillaTrx::begin();
    let result = PhysicalPlanRunner::new(&trx).execute(&mut op).unwrap();

    assert!(result.is_empty());
    assert_eq!(*outer_calls.borrow(), ["scan"]);
    assert!(inner_calls.borrow().is_empty());
}

#[test]
fn test_unindexed_inner_is_rescanned_per_outer_row() {
    let (outer, _) = spy_table("outer", "id", false, &[1, 2]);
    let (inner, calls) = spy_table("inner", "k", false, &[2, 1]);

    let mut op = Optimizer::default().optimize(join_on_key(outer, inner)).unwrap();
    let trx = VanillaTrx::begin();
    let result = PhysicalPlanRunner::new(&trx).execute(&mut op).unwrap();

    assert_eq!(
        result.rows,
        vec![
            vec![Value::Int(1), Value::Int(1)],
            vec![Value::Int(2), Value::Int(2)],
        ]
    );
    assert_eq!(*calls.borrow(), ["scan", "scan"]);
}

#[test]
fn test_constant_bounds_are_not_recomputed_from_outer_row() {
    let (outer, _) = spy_table("outer", "id", false, &[1, 2]);
    let (inner, calls) = spy_table("inner", "k", true, &[1, 2, 3]);

    let plan = LogicalPlan::filter(
        LogicalPlan::join(LogicalPlan::table_get(outer), LogicalPlan::table_get(inner), vec![]),
        Expr::ge(Expr::field("inner", "k", DataType::Int), Expr::value(2i64)),
    );
    let mut op = Optimizer::default().optimize(plan).unwrap();
    let trx = VanillaTrx::begin();
    let result = PhysicalPlanRunner::new(&trx).execute(&mut op).unwrap();

    assert_eq!(result.len(), 4);
    let opened = format!("index ={} -", key(2));
    assert_eq!(*calls.borrow(), [opened.clone(), opened]);
}
