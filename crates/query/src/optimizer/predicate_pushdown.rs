//! Predicate pushdown rewrite.
//!
//! Moves the expression of a filter node down the tree as close to the
//! table accesses as possible:
//! 1. AND conjunctions are split and every conjunct is pushed on its own;
//!    OR is never split and only travels as a whole
//! 2. Filter nodes are passed through
//! 3. A table access absorbs the expression into its residual predicates
//! 4. A join keeps an expression over aggregate outputs as a join
//!    condition. Otherwise it sends the expression to its right input when
//!    it references a table under that input, to the left input otherwise,
//!    and keeps what neither input absorbed as a join condition
//!
//! A filter node whose expression was absorbed entirely is replaced by its
//! input.

use crate::ast::{ConjunctionType, Expr};
use crate::optimizer::RewriteRule;
use crate::planner::LogicalPlan;
use alloc::vec::Vec;
use mindb_core::Result;

/// Predicate pushdown rule.
pub struct PredicatePushdownRewriter;

impl RewriteRule for PredicatePushdownRewriter {
    fn rewrite(&self, plan: &mut LogicalPlan) -> Result<bool> {
        let mut changed = false;
        // Each absorbed filter exposes its input, which may be a filter too.
        loop {
            let LogicalPlan::Predicate { input, expressions } = &mut *plan else {
                break;
            };
            if expressions.len() != 1 {
                break;
            }
            let original = expressions.clone();
            let mut consumed = false;
            let remaining = expressions
                .pop()
                .and_then(|expr| pushdown(expr, input, &mut consumed));

            match remaining {
                None => {
                    let input = core::mem::replace(
                        input.as_mut(),
                        LogicalPlan::project_values(Vec::new()),
                    );
                    *plan = input;
                    changed = true;
                }
                Some(expr) if consumed => {
                    expressions.push(expr);
                    changed = true;
                    break;
                }
                Some(_) => {
                    *expressions = original;
                    break;
                }
            }
        }
        Ok(changed)
    }

    fn name(&self) -> &'static str {
        "predicate_pushdown"
    }
}

/// Pushes `expr` into `target`. Returns what was not absorbed; `consumed`
/// is set whenever some node absorbed a part of it.
fn pushdown(expr: Expr, target: &mut LogicalPlan, consumed: &mut bool) -> Option<Expr> {
    let expr = match expr {
        Expr::Conjunction {
            kind: ConjunctionType::And,
            children,
        } => {
            let mut remaining: Vec<Expr> = children
                .into_iter()
                .filter_map(|child| pushdown(child, target, consumed))
                .collect();
            return match remaining.len() {
                0 => None,
                1 => remaining.pop(),
                _ => Some(Expr::and(remaining)),
            };
        }
        expr => expr,
    };

    match target {
        LogicalPlan::Predicate { input, .. } => pushdown(expr, input, consumed),
        LogicalPlan::TableGet(get) => {
            get.predicates.push(expr);
            *consumed = true;
            None
        }
        LogicalPlan::Join { conditions, .. } if expr.has_aggregate() => {
            // Aggregate outputs exist only above the aggregating input.
            conditions.push(expr);
            *consumed = true;
            None
        }
        LogicalPlan::Join {
            left,
            right,
            conditions,
        } => {
            let to_right = {
                let aliases = right.table_aliases();
                expr.visit(&mut |e| matches!(e, Expr::Field(f) if aliases.contains(f.table.as_str())))
            };
            let side = if to_right { right } else { left };
            if let Some(rest) = pushdown(expr, side, consumed) {
                conditions.push(rest);
            }
            *consumed = true;
            None
        }
        _ => Some(expr),
    }
}
