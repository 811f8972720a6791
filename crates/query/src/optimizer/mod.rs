//! Query optimizer module.
//!
//! The optimizer rewrites a logical plan to a fix point and hands the
//! result to the physical operator generator.

mod pass;
mod predicate_pushdown;

pub use pass::{RewriteRule, Rewriter};
pub use predicate_pushdown::PredicatePushdownRewriter;

use crate::config::PlannerConfig;
use crate::executor::PhysicalOperator;
use crate::planner::{LogicalPlan, PhysicalOperatorGenerator};
use mindb_core::Result;
use tracing::warn;

/// Query optimizer: logical rewrites followed by physical generation.
pub struct Optimizer {
    config: PlannerConfig,
    rewriter: Rewriter,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Optimizer {
    /// Creates an optimizer with the default rewrite rules.
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            rewriter: Rewriter::new(),
        }
    }

    /// Creates an optimizer with a custom rewriter.
    pub fn with_rewriter(config: PlannerConfig, rewriter: Rewriter) -> Self {
        Self { config, rewriter }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Rewrites `plan` until no rule changes it, at most
    /// `max_rewrite_rounds` times. Returns whether anything changed.
    pub fn rewrite(&self, plan: &mut LogicalPlan) -> Result<bool> {
        let mut changed = false;
        for _ in 0..self.config.max_rewrite_rounds {
            if !self.rewriter.rewrite(plan)? {
                return Ok(changed);
            }
            changed = true;
        }
        warn!(
            rounds = self.config.max_rewrite_rounds,
            "rewrite stopped before reaching a fix point"
        );
        Ok(changed)
    }

    /// Translates a logical plan into a physical operator tree.
    pub fn to_physical(&self, plan: LogicalPlan) -> Result<PhysicalOperator> {
        PhysicalOperatorGenerator::new(self.config).create(plan)
    }

    /// Rewrites and translates `plan`.
    pub fn optimize(&self, mut plan: LogicalPlan) -> Result<PhysicalOperator> {
        self.rewrite(&mut plan)?;
        self.to_physical(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use alloc::rc::Rc;
    use mindb_core::schema::TableMeta;
    use mindb_core::DataType;
    use mindb_storage::{MemTable, Table};

    fn table() -> Rc<dyn Table> {
        let meta = TableMeta::builder("t")
            .unwrap()
            .add_field("a", DataType::Int)
            .unwrap()
            .build()
            .unwrap();
        Rc::new(MemTable::new(meta).unwrap())
    }

    fn filters(depth: usize) -> LogicalPlan {
        let mut plan = LogicalPlan::table_get(table());
        for i in 0..depth {
            plan = LogicalPlan::filter(
                plan,
                Expr::gt(Expr::field("t", "a", DataType::Int), Expr::value(i as i64)),
            );
        }
        plan
    }

    #[test]
    fn test_rewrite_reaches_fix_point() {
        let optimizer = Optimizer::default();
        let mut plan = filters(3);
        assert!(optimizer.rewrite(&mut plan).unwrap());
        let LogicalPlan::TableGet(get) = &plan else {
            panic!("expected table get, got {}", plan.kind());
        };
        assert_eq!(get.predicates.len(), 3);
        assert!(!optimizer.rewrite(&mut plan).unwrap());
    }

    #[test]
    fn test_rewrite_rounds_are_bounded() {
        let optimizer = Optimizer::new(PlannerConfig::new().with_max_rewrite_rounds(0));
        let mut plan = filters(1);
        assert!(!optimizer.rewrite(&mut plan).unwrap());
        assert_eq!(plan.kind(), "predicate");
    }

    #[test]
    fn test_optimize_produces_operator() {
        use crate::executor::Operator;
        let op = Optimizer::default().optimize(filters(2)).unwrap();
        assert_eq!(op.name(), "TABLE_SCAN");
    }
}
