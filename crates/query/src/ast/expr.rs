//! Expression AST definitions.

use crate::tuple::TupleCellSpec;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use mindb_core::{DataType, Value};

/// Reference to a field of a table, through the alias the query uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Table alias.
    pub table: String,
    /// Field name.
    pub field: String,
    /// Declared type of the field.
    pub data_type: DataType,
}

impl FieldRef {
    /// Creates a new field reference.
    pub fn new(table: impl Into<String>, field: impl Into<String>, data_type: DataType) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
            data_type,
        }
    }

    /// Cell spec used to look the field up in a tuple.
    pub fn spec(&self) -> TupleCellSpec {
        TupleCellSpec::new(self.table.as_str(), self.field.as_str())
    }

    /// Returns the normalized name (table.field).
    pub fn normalized_name(&self) -> String {
        alloc::format!("{}.{}", self.table, self.field)
    }
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompOp {
    /// The operator that holds after swapping the operands.
    pub fn flip(self) -> Self {
        match self {
            CompOp::Eq => CompOp::Eq,
            CompOp::Ne => CompOp::Ne,
            CompOp::Lt => CompOp::Gt,
            CompOp::Le => CompOp::Ge,
            CompOp::Gt => CompOp::Lt,
            CompOp::Ge => CompOp::Le,
        }
    }

    /// Whether `left.cmp(right) == ordering` satisfies the operator.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompOp::Eq => ordering == Ordering::Equal,
            CompOp::Ne => ordering != Ordering::Equal,
            CompOp::Lt => ordering == Ordering::Less,
            CompOp::Le => ordering != Ordering::Greater,
            CompOp::Gt => ordering == Ordering::Greater,
            CompOp::Ge => ordering != Ordering::Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompOp::Eq => "=",
            CompOp::Ne => "<>",
            CompOp::Lt => "<",
            CompOp::Le => "<=",
            CompOp::Gt => ">",
            CompOp::Ge => ">=",
        }
    }
}

/// Boolean connectives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConjunctionType {
    And,
    Or,
}

/// Arithmetic operators. `Negative` is unary and has no right operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Negative,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub | ArithmeticOp::Negative => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        }
    }
}

/// Aggregate functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn name(self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

/// Sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Expression AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Field reference.
    Field(FieldRef),
    /// Constant.
    Value(Value),
    /// Binary comparison.
    Comparison {
        op: CompOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// AND / OR over any number of children.
    Conjunction {
        kind: ConjunctionType,
        children: Vec<Expr>,
    },
    /// Arithmetic; `right` is `None` for negation.
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Option<Box<Expr>>,
    },
    /// Aggregate over `child`, or over rows when `child` is `None`
    /// (`COUNT(*)`).
    Aggregate {
        func: AggregateFunc,
        child: Option<Box<Expr>>,
    },
}

impl Expr {
    /// Creates a field reference expression.
    pub fn field(table: impl Into<String>, field: impl Into<String>, data_type: DataType) -> Self {
        Expr::Field(FieldRef::new(table, field, data_type))
    }

    /// Creates a constant expression.
    pub fn value(value: impl Into<Value>) -> Self {
        Expr::Value(value.into())
    }

    pub fn compare(op: CompOp, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::compare(CompOp::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::compare(CompOp::Ne, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::compare(CompOp::Lt, left, right)
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Self::compare(CompOp::Le, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::compare(CompOp::Gt, left, right)
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::compare(CompOp::Ge, left, right)
    }

    /// Creates an AND over `children`.
    pub fn and(children: Vec<Expr>) -> Self {
        Expr::Conjunction {
            kind: ConjunctionType::And,
            children,
        }
    }

    /// Creates an OR over `children`.
    pub fn or(children: Vec<Expr>) -> Self {
        Expr::Conjunction {
            kind: ConjunctionType::Or,
            children,
        }
    }

    fn arithmetic(op: ArithmeticOp, left: Expr, right: Expr) -> Self {
        Expr::Arithmetic {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Self::arithmetic(ArithmeticOp::Add, left, right)
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::arithmetic(ArithmeticOp::Sub, left, right)
    }

    pub fn mul(left: Expr, right: Expr) -> Self {
        Self::arithmetic(ArithmeticOp::Mul, left, right)
    }

    pub fn div(left: Expr, right: Expr) -> Self {
        Self::arithmetic(ArithmeticOp::Div, left, right)
    }

    pub fn neg(expr: Expr) -> Self {
        Expr::Arithmetic {
            op: ArithmeticOp::Negative,
            left: Box::new(expr),
            right: None,
        }
    }

    /// Creates a COUNT(*) aggregate.
    pub fn count_star() -> Self {
        Expr::Aggregate {
            func: AggregateFunc::Count,
            child: None,
        }
    }

    fn aggregate(func: AggregateFunc, expr: Expr) -> Self {
        Expr::Aggregate {
            func,
            child: Some(Box::new(expr)),
        }
    }

    pub fn count(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Count, expr)
    }

    pub fn sum(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Sum, expr)
    }

    pub fn avg(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Avg, expr)
    }

    pub fn min(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Min, expr)
    }

    pub fn max(expr: Expr) -> Self {
        Self::aggregate(AggregateFunc::Max, expr)
    }

    /// Direct sub-expressions.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Field(_) | Expr::Value(_) => Vec::new(),
            Expr::Comparison { left, right, .. } => alloc::vec![left.as_ref(), right.as_ref()],
            Expr::Conjunction { children, .. } => children.iter().collect(),
            Expr::Arithmetic { left, right, .. } => {
                let mut out = alloc::vec![left.as_ref()];
                out.extend(right.as_deref());
                out
            }
            Expr::Aggregate { child, .. } => child.as_deref().into_iter().collect(),
        }
    }

    /// Pre-order walk; stops and returns true as soon as `f` does.
    pub fn visit(&self, f: &mut dyn FnMut(&Expr) -> bool) -> bool {
        if f(self) {
            return true;
        }
        self.children().into_iter().any(|child| child.visit(f))
    }

    /// Whether any field of table alias `table` is referenced.
    pub fn references_table(&self, table: &str) -> bool {
        self.visit(&mut |e| matches!(e, Expr::Field(f) if f.table == table))
    }

    /// Whether the expression contains an aggregate.
    pub fn has_aggregate(&self) -> bool {
        self.visit(&mut |e| matches!(e, Expr::Aggregate { .. }))
    }

    /// Static result type; `None` when it is only known to be NULL.
    pub fn value_type(&self) -> Option<DataType> {
        match self {
            Expr::Field(field) => Some(field.data_type),
            Expr::Value(value) => value.data_type(),
            Expr::Comparison { .. } | Expr::Conjunction { .. } => Some(DataType::Boolean),
            Expr::Arithmetic { op, left, right } => {
                let left = left.value_type();
                match (op, right) {
                    (ArithmeticOp::Negative, _) | (_, None) => left,
                    (ArithmeticOp::Div, _) => Some(DataType::Float),
                    (_, Some(right)) => match (left, right.value_type()) {
                        (Some(DataType::Int), Some(DataType::Int)) => Some(DataType::Int),
                        _ => Some(DataType::Float),
                    },
                }
            }
            Expr::Aggregate { func, child } => match (func, child) {
                (AggregateFunc::Count, _) | (_, None) => Some(DataType::Int),
                (AggregateFunc::Avg, _) => Some(DataType::Float),
                (AggregateFunc::Sum, Some(child)) => match child.value_type() {
                    Some(DataType::Int) => Some(DataType::Int),
                    _ => Some(DataType::Float),
                },
                (AggregateFunc::Min | AggregateFunc::Max, Some(child)) => child.value_type(),
            },
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

fn fmt_operand(expr: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expr::Arithmetic { right: Some(_), .. } => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(field) => write!(f, "{}", field),
            Expr::Value(Value::String(s)) => write!(f, "'{}'", s),
            Expr::Value(value @ Value::Date(_)) => write!(f, "'{}'", value),
            Expr::Value(value) => write!(f, "{}", value),
            Expr::Comparison { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Expr::Conjunction { kind, children } => {
                let sep = match kind {
                    ConjunctionType::And => " AND ",
                    ConjunctionType::Or => " OR ",
                };
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
            Expr::Arithmetic { op, left, right } => match right {
                None => {
                    f.write_str(op.symbol())?;
                    fmt_operand(left, f)
                }
                Some(right) => {
                    fmt_operand(left, f)?;
                    write!(f, " {} ", op.symbol())?;
                    fmt_operand(right, f)
                }
            },
            Expr::Aggregate { func, child } => match child {
                None => write!(f, "{}(*)", func.name()),
                Some(child) => write!(f, "{}({})", func.name(), child),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn a() -> Expr {
        Expr::field("t", "a", DataType::Int)
    }

    #[test]
    fn test_field_ref() {
        let field = FieldRef::new("users", "id", DataType::Int);
        assert_eq!(field.normalized_name(), "users.id");
        assert_eq!(field.spec(), TupleCellSpec::new("users", "id"));
    }

    #[test]
    fn test_flip() {
        for op in [CompOp::Eq, CompOp::Ne, CompOp::Lt, CompOp::Le, CompOp::Gt, CompOp::Ge] {
            assert_eq!(op.flip().flip(), op);
            for ord in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
                assert_eq!(op.matches(ord), op.flip().matches(ord.reverse()));
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Expr::ge(a(), Expr::value(2i64)).to_string(), "t.a >= 2");
        assert_eq!(
            Expr::or(vec![Expr::eq(a(), Expr::value("x")), Expr::lt(a(), Expr::value(1i64))])
                .to_string(),
            "(t.a = 'x' OR t.a < 1)"
        );
        assert_eq!(
            Expr::mul(Expr::add(a(), Expr::value(1i64)), Expr::value(2i64)).to_string(),
            "(t.a + 1) * 2"
        );
        assert_eq!(Expr::neg(a()).to_string(), "-t.a");
        assert_eq!(Expr::count_star().to_string(), "COUNT(*)");
        assert_eq!(Expr::sum(a()).to_string(), "SUM(t.a)");
        assert_eq!(Expr::Value(Value::Date(20240105)).to_string(), "'2024-01-05'");
    }

    #[test]
    fn test_visit_and_references() {
        let expr = Expr::and(vec![
            Expr::eq(a(), Expr::field("u", "b", DataType::Int)),
            Expr::gt(Expr::value(1i64), Expr::value(0i64)),
        ]);
        assert!(expr.references_table("t"));
        assert!(expr.references_table("u"));
        assert!(!expr.references_table("v"));
        assert!(!expr.has_aggregate());
        assert!(Expr::add(Expr::count_star(), Expr::value(1i64)).has_aggregate());

        let mut seen = 0;
        expr.visit(&mut |_| {
            seen += 1;
            false
        });
        assert_eq!(seen, 7);
    }

    #[test]
    fn test_value_type() {
        assert_eq!(a().value_type(), Some(DataType::Int));
        assert_eq!(Expr::value(Value::Null).value_type(), None);
        assert_eq!(Expr::eq(a(), a()).value_type(), Some(DataType::Boolean));
        assert_eq!(Expr::add(a(), Expr::value(1i64)).value_type(), Some(DataType::Int));
        assert_eq!(Expr::add(a(), Expr::value(1.5)).value_type(), Some(DataType::Float));
        assert_eq!(Expr::div(a(), a()).value_type(), Some(DataType::Float));
        assert_eq!(Expr::neg(a()).value_type(), Some(DataType::Int));
        assert_eq!(Expr::count(a()).value_type(), Some(DataType::Int));
        assert_eq!(Expr::avg(a()).value_type(), Some(DataType::Float));
        assert_eq!(
            Expr::max(Expr::field("t", "s", DataType::String)).value_type(),
            Some(DataType::String)
        );
    }
}
