//! Aggregate operator.

use super::operator::child_tuple;
use super::project::output_spec;
use super::{Operator, PhysicalOperator};
use crate::ast::{arithmetic, AggregateFunc, ArithmeticOp, Expr};
use crate::context::ExecContext;
use crate::tuple::{JoinedTuple, Tuple, TupleCellSpec, ValueListTuple};
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use mindb_core::{Error, Result, Value};

/// Running state of one aggregate.
#[derive(Debug)]
struct Accumulator {
    func: AggregateFunc,
    arg: Option<Expr>,
    count: i64,
    acc: Option<Value>,
}

impl Accumulator {
    fn new(expr: &Expr) -> Result<Self> {
        let Expr::Aggregate { func, child } = expr else {
            return Err(Error::invalid_argument(alloc::format!(
                "{} is not an aggregate",
                expr
            )));
        };
        Ok(Self {
            func: *func,
            arg: child.as_deref().cloned(),
            count: 0,
            acc: None,
        })
    }

    /// NULL arguments are skipped; `COUNT(*)` counts every row.
    fn update(&mut self, env: &Tuple<'_>) -> Result<()> {
        let value = match &self.arg {
            Some(arg) => arg.get_value(env)?,
            None => {
                self.count += 1;
                return Ok(());
            }
        };
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;
        self.acc = Some(match (self.func, self.acc.take()) {
            (_, None) => value,
            (AggregateFunc::Sum | AggregateFunc::Avg, Some(acc)) => arithmetic(ArithmeticOp::Add, &acc, &value),
            (AggregateFunc::Min, Some(acc)) => keep(acc, value, Ordering::Less),
            (AggregateFunc::Max, Some(acc)) => keep(acc, value, Ordering::Greater),
            (AggregateFunc::Count, Some(acc)) => acc,
        });
        Ok(())
    }

    fn finish(&self) -> Value {
        match (self.func, &self.acc) {
            (AggregateFunc::Count, _) => Value::Int(self.count),
            (_, None) => Value::Null,
            (AggregateFunc::Avg, Some(sum)) => arithmetic(ArithmeticOp::Div, sum, &Value::Int(self.count)),
            (_, Some(acc)) => acc.clone(),
        }
    }
}

/// Keeps `candidate` when it orders `wanted` against `current`.
fn keep(current: Value, candidate: Value, wanted: Ordering) -> Value {
    if candidate.cmp(&current) == wanted {
        candidate
    } else {
        current
    }
}

/// Folds the whole input into a single row of aggregates.
///
/// Each cell is named after the aggregate text (`COUNT(*)`, `SUM(t.a)`),
/// which is how aggregate expressions above find their value.
pub struct AggregateOperator {
    child: Box<PhysicalOperator>,
    aggregates: Vec<Expr>,
    specs: Vec<TupleCellSpec>,
    values: Vec<Value>,
    done: bool,
}

impl AggregateOperator {
    pub fn new(child: PhysicalOperator, aggregates: Vec<Expr>) -> Self {
        let specs = aggregates.iter().map(output_spec).collect();
        Self {
            child: Box::new(child),
            aggregates,
            specs,
            values: Vec::new(),
            done: false,
        }
    }
}

impl Operator for AggregateOperator {
    fn name(&self) -> &'static str {
        "AGGREGATE"
    }

    fn param(&self) -> String {
        let names: Vec<String> = self.aggregates.iter().map(|a| a.to_string()).collect();
        names.join(", ")
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        self.done = false;
        self.values.clear();
        self.child.open(ctx)
    }

    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool> {
        if self.done {
            self.values.clear();
            return Ok(false);
        }
        let mut accumulators = self
            .aggregates
            .iter()
            .map(Accumulator::new)
            .collect::<Result<Vec<_>>>()?;
        while self.child.next(ctx)? {
            let tuple = child_tuple(&self.child)?;
            let env = Tuple::Joined(JoinedTuple::borrowed(Some(&tuple), ctx.father()));
            for acc in &mut accumulators {
                acc.update(&env)?;
            }
        }
        self.values = accumulators.iter().map(Accumulator::finish).collect();
        self.done = true;
        Ok(true)
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        if self.values.is_empty() {
            return None;
        }
        Some(Tuple::Values(ValueListTuple::new(&self.values, &self.specs)))
    }

    fn close(&mut self) -> Result<()> {
        self.values.clear();
        self.child.close()
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        alloc::vec![self.child.as_ref()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{OperatorKind, TableScanOperator};
    use alloc::rc::Rc;
    use alloc::vec;
    use mindb_core::schema::TableMeta;
    use mindb_core::DataType;
    use mindb_storage::{MemTable, Trx, VanillaTrx};

    fn scan(rows: &[Option<i64>]) -> PhysicalOperator {
        let meta = TableMeta::builder("t")
            .unwrap()
            .add_field("a", DataType::Int)
            .unwrap()
            .add_nullable(&["a"])
            .build()
            .unwrap();
        let table = Rc::new(MemTable::new(meta).unwrap());
        let trx = VanillaTrx::begin();
        for a in rows {
            trx.insert_record(&*table, vec![Value::from(*a)]).unwrap();
        }
        PhysicalOperator::new(OperatorKind::TableScan(TableScanOperator::new(table, "t", true, vec![])))
    }

    fn aggregate(rows: &[Option<i64>]) -> Vec<Value> {
        let a = Expr::field("t", "a", DataType::Int);
        let mut op = AggregateOperator::new(
            scan(rows),
            vec![
                Expr::count_star(),
                Expr::count(a.clone()),
                Expr::sum(a.clone()),
                Expr::avg(a.clone()),
                Expr::min(a.clone()),
                Expr::max(a),
            ],
        );
        let trx = VanillaTrx::begin();
        let ctx = ExecContext::new(&trx);
        op.open(&ctx).unwrap();
        assert!(op.next(&ctx).unwrap());
        let values = op.current_tuple().unwrap().to_values();
        assert!(!op.next(&ctx).unwrap());
        op.close().unwrap();
        values
    }

    #[test]
    fn test_aggregates() {
        let values = aggregate(&[Some(4), None, Some(1), Some(7)]);
        assert_eq!(
            values,
            vec![
                Value::Int(4),
                Value::Int(3),
                Value::Int(12),
                Value::Float(4.0),
                Value::Int(1),
                Value::Int(7),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let values = aggregate(&[]);
        assert_eq!(
            values,
            vec![Value::Int(0), Value::Int(0), Value::Null, Value::Null, Value::Null, Value::Null]
        );
    }

    #[test]
    fn test_lookup_by_name() {
        let trx = VanillaTrx::begin();
        let ctx = ExecContext::new(&trx);
        let mut op = AggregateOperator::new(scan(&[Some(2), Some(3)]), vec![Expr::sum(Expr::field("t", "a", DataType::Int))]);
        op.open(&ctx).unwrap();
        assert!(op.next(&ctx).unwrap());
        let tuple = op.current_tuple().unwrap();
        let doubled = Expr::mul(Expr::sum(Expr::field("t", "a", DataType::Int)), Expr::value(2i64));
        assert_eq!(doubled.get_value(&tuple).unwrap(), Value::Int(10));
        op.close().unwrap();
    }
}
