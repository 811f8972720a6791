//! Physical operator generation.
//!
//! Translates a rewritten logical plan into an operator tree. The only
//! real decision is how to read each table: the first index whose leading
//! field is compared against something independent of the table becomes
//! an index scan, every other access is a full scan.

use crate::ast::{CompOp, Expr};
use crate::config::PlannerConfig;
use crate::executor::{
    merge_bounds, AggregateOperator, BoundExpr, DeleteOperator, EmptyOperator, ExplainOperator,
    IndexScanOperator, InsertOperator, JoinOperator, OperatorKind, OrderByOperator,
    PhysicalOperator, PredicateOperator, ProjectOperator, TableScanOperator, UpdateOperator,
};
use crate::planner::{LogicalPlan, TableGet};
use crate::range::{check_range, RangeBound, Side};
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use mindb_core::schema::FieldMeta;
use mindb_core::{Error, Result, Value};
use mindb_storage::Index;
use tracing::debug;

/// Converts logical plans into physical operator trees.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhysicalOperatorGenerator {
    config: PlannerConfig,
}

impl PhysicalOperatorGenerator {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Translates `plan`. The plan is consumed.
    pub fn create(&self, plan: LogicalPlan) -> Result<PhysicalOperator> {
        self.create_with(plan, false)
    }

    /// `is_delete` is set below a delete and reaches the index scans.
    fn create_with(&self, plan: LogicalPlan, is_delete: bool) -> Result<PhysicalOperator> {
        let kind = match plan {
            LogicalPlan::TableGet(get) => return self.create_table_get(get, is_delete),
            LogicalPlan::Predicate {
                input,
                mut expressions,
            } => {
                if expressions.len() != 1 {
                    return Err(Error::invalid_argument(format!(
                        "predicate node with {} expressions",
                        expressions.len()
                    )));
                }
                let child = self.create_with(*input, is_delete)?;
                let expression = expressions.remove(0);
                OperatorKind::Predicate(PredicateOperator::new(child, expression))
            }
            LogicalPlan::Join {
                left,
                right,
                conditions,
            } => {
                let left = self.create_with(*left, false)?;
                let right = self.create_with(*right, false)?;
                OperatorKind::Join(JoinOperator::new(left, right, conditions))
            }
            LogicalPlan::Project { input, expressions } => {
                let child = match input {
                    Some(input) => Some(self.create_with(*input, is_delete)?),
                    None => None,
                };
                OperatorKind::Project(ProjectOperator::new(child, expressions))
            }
            LogicalPlan::OrderBy { input, units } => {
                let child = self.create_with(*input, is_delete)?;
                OperatorKind::OrderBy(OrderByOperator::new(child, units))
            }
            LogicalPlan::Aggregate { input, aggregates } => {
                if let Some(expr) = aggregates.iter().find(|e| !matches!(e, Expr::Aggregate { .. })) {
                    return Err(Error::invalid_argument(format!("{} is not an aggregate", expr)));
                }
                let child = self.create_with(*input, is_delete)?;
                OperatorKind::Aggregate(AggregateOperator::new(child, aggregates))
            }
            LogicalPlan::GroupBy { .. } => return Err(Error::unimplemented("GROUP BY")),
            LogicalPlan::Insert { table, rows } => OperatorKind::Insert(InsertOperator::new(table, rows)),
            LogicalPlan::Delete { input, table } => {
                let child = self.create_with(*input, true)?;
                OperatorKind::Delete(DeleteOperator::new(child, table))
            }
            LogicalPlan::Update {
                input,
                table,
                units,
            } => {
                let mut resolved = Vec::with_capacity(units.len());
                for unit in units {
                    let index = table
                        .meta()
                        .field_index(&unit.field)
                        .ok_or_else(|| Error::column_not_found(table.name(), unit.field.as_str()))?;
                    resolved.push((index, unit.value));
                }
                let child = self.create_with(*input, false)?;
                OperatorKind::Update(UpdateOperator::new(child, table, resolved))
            }
            LogicalPlan::Explain { input } => {
                let child = self.create_with(*input, is_delete)?;
                OperatorKind::Explain(ExplainOperator::new(child))
            }
        };
        Ok(PhysicalOperator::new(kind))
    }

    fn create_table_get(&self, get: TableGet, is_delete: bool) -> Result<PhysicalOperator> {
        let TableGet {
            table,
            alias,
            readonly,
            mut predicates,
        } = get;

        if self.config.enable_index_scan {
            for index in table.indexes() {
                let Some(field) = index.meta().leading_field().and_then(|name| table.meta().field(name))
                else {
                    continue;
                };
                let (left, right) = extract_bounds(&alias, field, &mut predicates);
                if left.is_empty() && right.is_empty() {
                    continue;
                }
                let Some((left, right)) = self.fold_bounds(&index, left, right)? else {
                    debug!(table = %table.name(), index = %index.meta().name(), "empty range, scan replaced");
                    return Ok(PhysicalOperator::new(OperatorKind::Empty(EmptyOperator::new())));
                };
                debug!(
                    table = %table.name(),
                    index = %index.meta().name(),
                    left = left.len(),
                    right = right.len(),
                    residual = predicates.len(),
                    "index scan chosen"
                );
                let scan = IndexScanOperator::new(table, index, alias, left, right)
                    .readonly(readonly)
                    .is_delete(is_delete)
                    .with_predicates(predicates);
                return Ok(PhysicalOperator::new(OperatorKind::IndexScan(scan)));
            }
        }

        debug!(table = %table.name(), residual = predicates.len(), "table scan chosen");
        Ok(PhysicalOperator::new(OperatorKind::TableScan(TableScanOperator::new(
            table, alias, readonly, predicates,
        ))))
    }

    /// Evaluates constant bounds ahead of time. A side whose bounds are all
    /// constant collapses to its tightest bound. `Ok(None)` when the range
    /// is known to be empty.
    fn fold_bounds(
        &self,
        index: &Rc<dyn Index>,
        left: Vec<BoundExpr>,
        right: Vec<BoundExpr>,
    ) -> Result<Option<(Vec<BoundExpr>, Vec<BoundExpr>)>> {
        if !self.config.fold_constant_bounds {
            return Ok(Some((left, right)));
        }
        let left_range = fold_side(&left, Side::Left)?;
        let right_range = fold_side(&right, Side::Right)?;

        let folded = |bounds: Vec<BoundExpr>, range: &Option<Option<RangeBound<Value>>>| match range {
            Some(Some(bound)) => to_bound_exprs(bound),
            _ => bounds,
        };
        match (&left_range, &right_range) {
            (Some(None), _) | (_, Some(None)) => return Ok(None),
            (Some(Some(l)), Some(Some(r))) if !check_range(l, r) => {
                debug!(index = %index.meta().name(), left = %l, right = %r, "bounds do not overlap");
                return Ok(None);
            }
            _ => {}
        }
        Ok(Some((folded(left, &left_range), folded(right, &right_range))))
    }
}

/// `None` when some bound depends on a row; `Some(None)` when a constant
/// bound is NULL.
fn fold_side(bounds: &[BoundExpr], side: Side) -> Result<Option<Option<RangeBound<Value>>>> {
    if !bounds.iter().all(|b| is_constant(&b.expr)) {
        return Ok(None);
    }
    merge_bounds(bounds, side, Expr::try_get_value).map(Some)
}

fn to_bound_exprs(bound: &RangeBound<Value>) -> Vec<BoundExpr> {
    match bound.value() {
        Some(value) => alloc::vec![BoundExpr::new(Expr::Value(value.clone()), bound.is_inclusive())],
        None => Vec::new(),
    }
}

fn is_constant(expr: &Expr) -> bool {
    !expr.visit(&mut |e| matches!(e, Expr::Field(_) | Expr::Aggregate { .. }))
}

/// Moves the predicates usable as bounds on `field` out of `predicates`.
fn extract_bounds(
    alias: &str,
    field: &FieldMeta,
    predicates: &mut Vec<Expr>,
) -> (Vec<BoundExpr>, Vec<BoundExpr>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut residual = Vec::with_capacity(predicates.len());
    for predicate in predicates.drain(..) {
        let Some((op, operand)) = key_comparison(&predicate, alias, field) else {
            residual.push(predicate);
            continue;
        };
        match op {
            CompOp::Eq => {
                left.push(BoundExpr::new(operand.clone(), true));
                right.push(BoundExpr::new(operand, true));
            }
            CompOp::Gt => left.push(BoundExpr::new(operand, false)),
            CompOp::Ge => left.push(BoundExpr::new(operand, true)),
            CompOp::Lt => right.push(BoundExpr::new(operand, false)),
            CompOp::Le => right.push(BoundExpr::new(operand, true)),
            CompOp::Ne => residual.push(predicate),
        }
    }
    *predicates = residual;
    (left, right)
}

/// Matches `key OP operand` or `operand OP key`, the latter with the
/// operator flipped. The operand must not read the scanned table, so it
/// can be evaluated before the scan starts, and must have the key's type.
/// A literal NULL operand qualifies and yields an empty scan.
fn key_comparison(predicate: &Expr, alias: &str, field: &FieldMeta) -> Option<(CompOp, Expr)> {
    let Expr::Comparison { op, left, right } = predicate else {
        return None;
    };
    if *op == CompOp::Ne {
        return None;
    }
    let is_key = |e: &Expr| matches!(e, Expr::Field(f) if f.table == alias && f.field == field.name());
    let (op, operand) = if is_key(left) {
        (*op, right.as_ref())
    } else if is_key(right) {
        (op.flip(), left.as_ref())
    } else {
        return None;
    };
    if operand.references_table(alias) || operand.has_aggregate() {
        return None;
    }
    if operand.value_type().is_some_and(|t| t != field.data_type()) {
        return None;
    }
    Some((op, operand.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Operator;
    use alloc::vec;
    use mindb_core::schema::TableMeta;
    use mindb_core::{DataType, StatusCode};
    use mindb_storage::{MemTable, Table};

    fn table() -> Rc<dyn Table> {
        let meta = TableMeta::builder("t")
            .unwrap()
            .add_field("a", DataType::Int)
            .unwrap()
            .add_field("b", DataType::Int)
            .unwrap()
            .add_index("idx_b", &["b"], false)
            .unwrap()
            .add_index("idx_a", &["a"], false)
            .unwrap()
            .build()
            .unwrap();
        Rc::new(MemTable::new(meta).unwrap())
    }

    fn col(field: &str) -> Expr {
        Expr::field("t", field, DataType::Int)
    }

    fn int(n: i64) -> Expr {
        Expr::value(n)
    }

    fn generate(predicates: Vec<Expr>) -> PhysicalOperator {
        generate_with(PlannerConfig::default(), predicates)
    }

    fn generate_with(config: PlannerConfig, predicates: Vec<Expr>) -> PhysicalOperator {
        let get = TableGet::new(table()).with_predicates(predicates);
        PhysicalOperatorGenerator::new(config)
            .create(LogicalPlan::TableGet(get))
            .unwrap()
    }

    fn index_scan(op: &PhysicalOperator) -> &IndexScanOperator {
        match op.kind() {
            OperatorKind::IndexScan(scan) => scan,
            _ => panic!("expected index scan, got {}", op.name()),
        }
    }

    #[test]
    fn test_no_usable_predicate_is_table_scan() {
        let op = generate(vec![Expr::ne(col("a"), int(1)), Expr::gt(col("a"), col("b"))]);
        assert_eq!(op.name(), "TABLE_SCAN");
        assert_eq!(op.param(), "t WHERE t.a <> 1 AND t.a > t.b");
    }

    #[test]
    fn test_single_bound() {
        let op = generate(vec![Expr::ge(col("a"), int(2))]);
        let scan = index_scan(&op);
        assert_eq!(scan.index_name(), "idx_a");
        assert_eq!(scan.left_bounds(), &[BoundExpr::new(int(2), true)]);
        assert!(scan.right_bounds().is_empty());
        assert!(scan.predicates().is_empty());
    }

    #[test]
    fn test_flipped_comparison() {
        let op = generate(vec![Expr::lt(int(5), col("a"))]);
        let scan = index_scan(&op);
        assert_eq!(scan.left_bounds(), &[BoundExpr::new(int(5), false)]);
    }

    #[test]
    fn test_first_matching_index_wins_and_keeps_residual() {
        let op = generate(vec![Expr::eq(col("a"), int(1)), Expr::le(col("b"), int(9))]);
        let scan = index_scan(&op);
        assert_eq!(scan.index_name(), "idx_b");
        assert_eq!(scan.right_bounds(), &[BoundExpr::new(int(9), true)]);
        assert_eq!(scan.predicates(), &[Expr::eq(col("a"), int(1))]);
        assert_eq!(op.param(), "idx_b ON t RIGHT 9 INCLUSIVE WHERE t.a = 1");
    }

    #[test]
    fn test_constant_bounds_are_merged() {
        let op = generate(vec![
            Expr::gt(col("a"), int(1)),
            Expr::ge(col("a"), Expr::add(int(1), int(2))),
            Expr::lt(col("a"), int(10)),
            Expr::le(col("a"), int(10)),
        ]);
        let scan = index_scan(&op);
        assert_eq!(scan.left_bounds(), &[BoundExpr::new(int(3), true)]);
        assert_eq!(scan.right_bounds(), &[BoundExpr::new(int(10), false)]);
    }

    #[test]
    fn test_empty_ranges() {
        let point = generate(vec![Expr::ge(col("a"), int(5)), Expr::le(col("a"), int(5))]);
        assert_eq!(point.name(), "INDEX_SCAN");

        let empty = generate(vec![Expr::gt(col("a"), int(5)), Expr::le(col("a"), int(5))]);
        assert_eq!(empty.name(), "EMPTY");

        let null = generate(vec![Expr::eq(col("a"), Expr::value(Value::Null))]);
        assert_eq!(null.name(), "EMPTY");
    }

    #[test]
    fn test_without_folding_bounds_stay_expressions() {
        let config = PlannerConfig::new().with_constant_folding(false);
        let op = generate_with(config, vec![Expr::gt(col("a"), int(5)), Expr::le(col("a"), int(5))]);
        let scan = index_scan(&op);
        assert_eq!(scan.left_bounds().len(), 1);
        assert_eq!(scan.right_bounds().len(), 1);
    }

    #[test]
    fn test_correlated_bounds_are_kept() {
        let outer = Expr::field("o", "x", DataType::Int);
        let op = generate(vec![Expr::eq(col("a"), outer.clone()), Expr::gt(col("a"), int(0))]);
        let scan = index_scan(&op);
        assert_eq!(
            scan.left_bounds(),
            &[BoundExpr::new(outer.clone(), true), BoundExpr::new(int(0), false)]
        );
        assert_eq!(scan.right_bounds(), &[BoundExpr::new(outer, true)]);
    }

    #[test]
    fn test_ineligible_operands() {
        // Self reference, type mismatch, aggregate.
        for predicate in [
            Expr::gt(col("a"), Expr::add(col("b"), int(1))),
            Expr::gt(col("a"), Expr::value(1.5)),
            Expr::gt(col("a"), Expr::count_star()),
        ] {
            assert_eq!(generate(vec![predicate]).name(), "TABLE_SCAN");
        }
    }

    #[test]
    fn test_index_scan_disabled() {
        let config = PlannerConfig::new().with_index_scan(false);
        let op = generate_with(config, vec![Expr::eq(col("a"), int(1))]);
        assert_eq!(op.name(), "TABLE_SCAN");
    }

    #[test]
    fn test_malformed_and_unsupported_nodes() {
        let generator = PhysicalOperatorGenerator::default();
        let bad = LogicalPlan::Predicate {
            input: alloc::boxed::Box::new(LogicalPlan::table_get(table())),
            expressions: vec![],
        };
        let err = generator.create(bad).unwrap_err();
        assert_eq!(err.code(), StatusCode::InvalidArgument);

        let group = LogicalPlan::group_by(LogicalPlan::table_get(table()), vec![col("a")], vec![]);
        let err = generator.create(group).unwrap_err();
        assert_eq!(err.code(), StatusCode::Unimplemented);

        let not_agg = LogicalPlan::aggregate(LogicalPlan::table_get(table()), vec![col("a")]);
        assert_eq!(generator.create(not_agg).unwrap_err().code(), StatusCode::InvalidArgument);
    }

    #[test]
    fn test_update_resolves_fields() {
        use crate::planner::UpdateUnit;
        let generator = PhysicalOperatorGenerator::default();
        let t = table();
        let ok = LogicalPlan::update(LogicalPlan::table_get(t.clone()), t.clone(), vec![UpdateUnit::new("b", int(0))]);
        assert_eq!(generator.create(ok).unwrap().param(), "t SET b = 0");

        let missing = LogicalPlan::update(LogicalPlan::table_get(t.clone()), t, vec![UpdateUnit::new("zz", int(0))]);
        assert_eq!(generator.create(missing).unwrap_err().code(), StatusCode::NotFound);
    }
}
