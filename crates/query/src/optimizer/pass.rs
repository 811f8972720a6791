//! Rewrite rules and the driver that applies them over a plan tree.

use crate::optimizer::PredicatePushdownRewriter;
use crate::planner::LogicalPlan;
use alloc::boxed::Box;
use alloc::vec::Vec;
use mindb_core::Result;
use tracing::trace;

/// A rule that rewrites a logical plan in place at its root node.
pub trait RewriteRule {
    /// Rewrites `plan`; returns whether anything changed.
    fn rewrite(&self, plan: &mut LogicalPlan) -> Result<bool>;

    /// Returns the name of this rule.
    fn name(&self) -> &'static str {
        "unnamed"
    }
}

/// Applies every rule to a node, then recurses into the node's children.
pub struct Rewriter {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Rewriter {
    /// Creates a rewriter with the default rules.
    pub fn new() -> Self {
        Self {
            rules: alloc::vec![Box::new(PredicatePushdownRewriter)],
        }
    }

    /// Creates a rewriter with custom rules.
    pub fn with_rules(rules: Vec<Box<dyn RewriteRule>>) -> Self {
        Self { rules }
    }

    /// One pass over the whole tree.
    pub fn rewrite(&self, plan: &mut LogicalPlan) -> Result<bool> {
        let mut changed = false;
        for rule in &self.rules {
            if rule.rewrite(plan)? {
                trace!(rule = rule.name(), node = plan.kind(), "plan rewritten");
                changed = true;
            }
        }
        for child in plan.children_mut() {
            changed |= self.rewrite(child)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Replaces every Explain node by its input.
    struct StripExplain;

    impl RewriteRule for StripExplain {
        fn rewrite(&self, plan: &mut LogicalPlan) -> Result<bool> {
            if let LogicalPlan::Explain { input } = plan {
                let input = core::mem::replace(input.as_mut(), LogicalPlan::project_values(vec![]));
                *plan = input;
                return Ok(true);
            }
            Ok(false)
        }
    }

    #[test]
    fn test_rules_apply_at_every_level() {
        let mut plan = LogicalPlan::explain(LogicalPlan::explain(LogicalPlan::project_values(vec![])));
        let rewriter = Rewriter::with_rules(vec![Box::new(StripExplain)]);
        assert!(rewriter.rewrite(&mut plan).unwrap());
        assert_eq!(plan.kind(), "explain");
        assert!(rewriter.rewrite(&mut plan).unwrap());
        assert_eq!(plan.kind(), "project");
        assert!(!rewriter.rewrite(&mut plan).unwrap());
    }
}
