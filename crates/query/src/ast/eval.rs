//! Expression evaluation.

use super::expr::{ArithmeticOp, CompOp, ConjunctionType, Expr};
use crate::tuple::{Tuple, TupleCellSpec};
use alloc::format;
use alloc::string::ToString;
use mindb_core::{Error, Result, Value};

impl Expr {
    /// Evaluates the expression against `tuple`.
    ///
    /// Fails when a referenced field or aggregate is missing from the tuple.
    pub fn get_value(&self, tuple: &Tuple<'_>) -> Result<Value> {
        self.evaluate(Some(tuple))
    }

    /// Evaluates the expression without any tuple; fails unless it is
    /// built only from constants.
    pub fn try_get_value(&self) -> Result<Value> {
        self.evaluate(None)
    }

    fn evaluate(&self, tuple: Option<&Tuple<'_>>) -> Result<Value> {
        match self {
            Expr::Field(field) => {
                let tuple = tuple.ok_or_else(|| not_constant(self))?;
                tuple
                    .find_cell(&field.spec())
                    .cloned()
                    .ok_or_else(|| Error::column_not_found(field.table.as_str(), field.field.as_str()))
            }
            Expr::Value(value) => Ok(value.clone()),
            Expr::Comparison { op, left, right } => {
                let left = left.evaluate(tuple)?;
                let right = right.evaluate(tuple)?;
                Ok(Value::Boolean(compare(*op, &left, &right)))
            }
            Expr::Conjunction { kind, children } => {
                // Short-circuits; an empty AND is true and an empty OR false.
                let stop_on = *kind == ConjunctionType::Or;
                for child in children {
                    if child.evaluate(tuple)?.get_boolean() == stop_on {
                        return Ok(Value::Boolean(stop_on));
                    }
                }
                Ok(Value::Boolean(!stop_on))
            }
            Expr::Arithmetic { op, left, right } => {
                let left = left.evaluate(tuple)?;
                match (op, right) {
                    (ArithmeticOp::Negative, _) => Ok(negate(&left)),
                    (_, Some(right)) => {
                        let right = right.evaluate(tuple)?;
                        Ok(arithmetic(*op, &left, &right))
                    }
                    (_, None) => Err(Error::invalid_argument(format!(
                        "missing right operand of {}",
                        op.symbol()
                    ))),
                }
            }
            Expr::Aggregate { .. } => {
                let tuple = tuple.ok_or_else(|| not_constant(self))?;
                let name = self.to_string();
                match tuple.find_cell(&TupleCellSpec::named(name.as_str())) {
                    Some(value) => Ok(value.clone()),
                    None => Err(Error::column_not_found("", name)),
                }
            }
        }
    }
}

fn not_constant(expr: &Expr) -> Error {
    Error::invalid_argument(format!("{} is not a constant", expr))
}

/// Comparison with NULL on either side is false.
fn compare(op: CompOp, left: &Value, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    op.matches(left.cmp(right))
}

fn negate(value: &Value) -> Value {
    match value {
        Value::Int(i) => Value::Int(i.wrapping_neg()),
        Value::Float(f) => Value::Float(-f),
        _ => Value::Null,
    }
}

/// Int op Int stays Int (wrapping); any float operand promotes to Float.
/// Division always yields Float, and NULL on a zero divisor.
pub(crate) fn arithmetic(op: ArithmeticOp, left: &Value, right: &Value) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return match op {
            ArithmeticOp::Add => Value::Int(a.wrapping_add(*b)),
            ArithmeticOp::Sub => Value::Int(a.wrapping_sub(*b)),
            ArithmeticOp::Mul => Value::Int(a.wrapping_mul(*b)),
            ArithmeticOp::Div if *b == 0 => Value::Null,
            ArithmeticOp::Div => Value::Float(*a as f64 / *b as f64),
            ArithmeticOp::Negative => negate(left),
        };
    }
    let (Some(a), Some(b)) = (left.to_float(), right.to_float()) else {
        return Value::Null;
    };
    match op {
        ArithmeticOp::Add => Value::Float(a + b),
        ArithmeticOp::Sub => Value::Float(a - b),
        ArithmeticOp::Mul => Value::Float(a * b),
        ArithmeticOp::Div if b == 0.0 => Value::Null,
        ArithmeticOp::Div => Value::Float(a / b),
        ArithmeticOp::Negative => negate(left),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::ValueListTuple;
    use alloc::vec;
    use mindb_core::{DataType, StatusCode};

    fn a() -> Expr {
        Expr::field("t", "a", DataType::Int)
    }

    fn with_a<R>(value: Value, f: impl FnOnce(&Tuple<'_>) -> R) -> R {
        let values = vec![value];
        let specs = vec![TupleCellSpec::new("t", "a")];
        let tuple = Tuple::Values(ValueListTuple::new(&values, &specs));
        f(&tuple)
    }

    #[test]
    fn test_field_lookup() {
        with_a(Value::Int(5), |tuple| {
            assert_eq!(a().get_value(tuple).unwrap(), Value::Int(5));
            let missing = Expr::field("t", "zz", DataType::Int).get_value(tuple);
            assert_eq!(missing.unwrap_err().code(), StatusCode::NotFound);
        });
    }

    #[test]
    fn test_comparisons() {
        with_a(Value::Int(5), |tuple| {
            assert_eq!(
                Expr::ge(a(), Expr::value(5i64)).get_value(tuple).unwrap(),
                Value::Boolean(true)
            );
            assert_eq!(
                Expr::lt(a(), Expr::value(2.5)).get_value(tuple).unwrap(),
                Value::Boolean(false)
            );
            assert_eq!(
                Expr::eq(a(), Expr::value(Value::Null)).get_value(tuple).unwrap(),
                Value::Boolean(false)
            );
            assert_eq!(
                Expr::ne(a(), Expr::value(Value::Null)).get_value(tuple).unwrap(),
                Value::Boolean(false)
            );
        });
    }

    #[test]
    fn test_conjunctions() {
        let t = Expr::value(true);
        let f = Expr::value(false);
        assert_eq!(Expr::and(vec![t.clone(), f.clone()]).try_get_value().unwrap(), Value::Boolean(false));
        assert_eq!(Expr::or(vec![f.clone(), t.clone()]).try_get_value().unwrap(), Value::Boolean(true));
        assert_eq!(Expr::and(vec![]).try_get_value().unwrap(), Value::Boolean(true));
        assert_eq!(Expr::or(vec![]).try_get_value().unwrap(), Value::Boolean(false));
        // Short-circuit skips the failing field lookup.
        assert_eq!(
            Expr::and(vec![f, a()]).try_get_value().unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_arithmetic() {
        let v = |e: Expr| e.try_get_value().unwrap();
        assert_eq!(v(Expr::add(Expr::value(2i64), Expr::value(3i64))), Value::Int(5));
        assert_eq!(v(Expr::mul(Expr::value(2i64), Expr::value(1.5))), Value::Float(3.0));
        assert_eq!(v(Expr::div(Expr::value(7i64), Expr::value(2i64))), Value::Float(3.5));
        assert_eq!(v(Expr::div(Expr::value(7i64), Expr::value(0i64))), Value::Null);
        assert_eq!(v(Expr::div(Expr::value(7.0), Expr::value(0.0))), Value::Null);
        assert_eq!(v(Expr::sub(Expr::value(1i64), Expr::value(Value::Null))), Value::Null);
        assert_eq!(v(Expr::neg(Expr::value(4i64))), Value::Int(-4));
        assert_eq!(v(Expr::add(Expr::value("x"), Expr::value(1i64))), Value::Null);
    }

    #[test]
    fn test_try_get_value_rejects_fields() {
        let err = Expr::gt(a(), Expr::value(1i64)).try_get_value().unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidArgument);
        assert!(Expr::count_star().try_get_value().is_err());
    }

    #[test]
    fn test_aggregate_lookup_by_name() {
        let values = vec![Value::Int(3)];
        let specs = vec![TupleCellSpec::named("COUNT(*)")];
        let tuple = Tuple::Values(ValueListTuple::new(&values, &specs));
        assert_eq!(Expr::count_star().get_value(&tuple).unwrap(), Value::Int(3));
        assert!(Expr::sum(a()).get_value(&tuple).is_err());
    }
}
