//! Planner configuration.

/// Knobs for the rewriter and the physical operator generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Upper bound on rewrite rounds before the optimizer gives up on
    /// reaching a fix point.
    pub max_rewrite_rounds: usize,
    /// When false every table access becomes a table scan.
    pub enable_index_scan: bool,
    /// Evaluate constant index bounds at plan time and emit an empty
    /// operator for an empty interval.
    pub fold_constant_bounds: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_rewrite_rounds: 16,
            enable_index_scan: true,
            fold_constant_bounds: true,
        }
    }
}

impl PlannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rewrite_rounds(mut self, rounds: usize) -> Self {
        self.max_rewrite_rounds = rounds;
        self
    }

    pub fn with_index_scan(mut self, enabled: bool) -> Self {
        self.enable_index_scan = enabled;
        self
    }

    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.fold_constant_bounds = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = PlannerConfig::new()
            .with_max_rewrite_rounds(2)
            .with_index_scan(false)
            .with_constant_folding(false);
        assert_eq!(config.max_rewrite_rounds, 2);
        assert!(!config.enable_index_scan);
        assert!(!config.fold_constant_bounds);
        assert_eq!(PlannerConfig::default().max_rewrite_rounds, 16);
    }
}
