//! Logical query plan definitions.

use crate::ast::{Expr, SortOrder};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashSet;
use mindb_core::Value;
use mindb_storage::Table;

/// Access to one table under an alias.
///
/// `predicates` holds the residual filters pushed down onto the access;
/// the physical generator turns some of them into index bounds.
#[derive(Clone)]
pub struct TableGet {
    pub table: Rc<dyn Table>,
    pub alias: String,
    pub readonly: bool,
    pub predicates: Vec<Expr>,
}

impl TableGet {
    /// Readonly access aliased by the table's own name.
    pub fn new(table: Rc<dyn Table>) -> Self {
        let alias = String::from(table.name());
        Self {
            table,
            alias,
            readonly: true,
            predicates: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn with_predicates(mut self, predicates: Vec<Expr>) -> Self {
        self.predicates = predicates;
        self
    }
}

impl fmt::Debug for TableGet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableGet")
            .field("table", &self.table.name())
            .field("alias", &self.alias)
            .field("readonly", &self.readonly)
            .field("predicates", &self.predicates)
            .finish()
    }
}

/// One ORDER BY key.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderUnit {
    pub expr: Expr,
    pub order: SortOrder,
}

impl OrderUnit {
    pub fn new(expr: Expr, order: SortOrder) -> Self {
        Self { expr, order }
    }

    pub fn asc(expr: Expr) -> Self {
        Self::new(expr, SortOrder::Asc)
    }

    pub fn desc(expr: Expr) -> Self {
        Self::new(expr, SortOrder::Desc)
    }
}

/// One `SET field = expr` assignment.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateUnit {
    pub field: String,
    pub value: Expr,
}

impl UpdateUnit {
    pub fn new(field: impl Into<String>, value: Expr) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }
}

/// Logical query plan node.
#[derive(Clone, Debug)]
pub enum LogicalPlan {
    /// Table access with residual predicates.
    TableGet(TableGet),

    /// Filter. A well-formed node carries exactly one expression.
    Predicate {
        input: Box<LogicalPlan>,
        expressions: Vec<Expr>,
    },

    /// Inner join; `conditions` are implicitly AND-ed.
    Join {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
        conditions: Vec<Expr>,
    },

    /// Projection. Without input it produces a single row of constants.
    Project {
        input: Option<Box<LogicalPlan>>,
        expressions: Vec<Expr>,
    },

    /// Sort.
    OrderBy {
        input: Box<LogicalPlan>,
        units: Vec<OrderUnit>,
    },

    /// Aggregation over the whole input.
    Aggregate {
        input: Box<LogicalPlan>,
        aggregates: Vec<Expr>,
    },

    /// Grouped aggregation. Recognized but not executable.
    GroupBy {
        input: Box<LogicalPlan>,
        group_by: Vec<Expr>,
        aggregates: Vec<Expr>,
    },

    /// Literal rows inserted into a table.
    Insert {
        table: Rc<dyn Table>,
        rows: Vec<Vec<Value>>,
    },

    /// Deletes every row produced by `input`.
    Delete {
        input: Box<LogicalPlan>,
        table: Rc<dyn Table>,
    },

    /// Updates every row produced by `input`.
    Update {
        input: Box<LogicalPlan>,
        table: Rc<dyn Table>,
        units: Vec<UpdateUnit>,
    },

    /// Describes the physical plan of `input` instead of running it.
    Explain { input: Box<LogicalPlan> },
}

impl LogicalPlan {
    /// Readonly access to `table` under its own name.
    pub fn table_get(table: Rc<dyn Table>) -> Self {
        LogicalPlan::TableGet(TableGet::new(table))
    }

    /// Readonly access to `table` under `alias`.
    pub fn table_get_as(table: Rc<dyn Table>, alias: impl Into<String>) -> Self {
        LogicalPlan::TableGet(TableGet::new(table).alias(alias))
    }

    /// Filters `input` by `predicate`.
    pub fn filter(input: LogicalPlan, predicate: Expr) -> Self {
        LogicalPlan::Predicate {
            input: Box::new(input),
            expressions: alloc::vec![predicate],
        }
    }

    pub fn join(left: LogicalPlan, right: LogicalPlan, conditions: Vec<Expr>) -> Self {
        LogicalPlan::Join {
            left: Box::new(left),
            right: Box::new(right),
            conditions,
        }
    }

    pub fn project(input: LogicalPlan, expressions: Vec<Expr>) -> Self {
        LogicalPlan::Project {
            input: Some(Box::new(input)),
            expressions,
        }
    }

    /// Projection of constants without any input.
    pub fn project_values(expressions: Vec<Expr>) -> Self {
        LogicalPlan::Project {
            input: None,
            expressions,
        }
    }

    pub fn order_by(input: LogicalPlan, units: Vec<OrderUnit>) -> Self {
        LogicalPlan::OrderBy {
            input: Box::new(input),
            units,
        }
    }

    pub fn aggregate(input: LogicalPlan, aggregates: Vec<Expr>) -> Self {
        LogicalPlan::Aggregate {
            input: Box::new(input),
            aggregates,
        }
    }

    pub fn group_by(input: LogicalPlan, group_by: Vec<Expr>, aggregates: Vec<Expr>) -> Self {
        LogicalPlan::GroupBy {
            input: Box::new(input),
            group_by,
            aggregates,
        }
    }

    pub fn insert(table: Rc<dyn Table>, rows: Vec<Vec<Value>>) -> Self {
        LogicalPlan::Insert { table, rows }
    }

    /// Deletes the rows of `input`, whose table accesses become writable.
    pub fn delete(mut input: LogicalPlan, table: Rc<dyn Table>) -> Self {
        input.mark_writable();
        LogicalPlan::Delete {
            input: Box::new(input),
            table,
        }
    }

    /// Updates the rows of `input`, whose table accesses become writable.
    pub fn update(mut input: LogicalPlan, table: Rc<dyn Table>, units: Vec<UpdateUnit>) -> Self {
        input.mark_writable();
        LogicalPlan::Update {
            input: Box::new(input),
            table,
            units,
        }
    }

    pub fn explain(input: LogicalPlan) -> Self {
        LogicalPlan::Explain {
            input: Box::new(input),
        }
    }

    /// Node kind, as shown in traces.
    pub fn kind(&self) -> &'static str {
        match self {
            LogicalPlan::TableGet(_) => "table_get",
            LogicalPlan::Predicate { .. } => "predicate",
            LogicalPlan::Join { .. } => "join",
            LogicalPlan::Project { .. } => "project",
            LogicalPlan::OrderBy { .. } => "order_by",
            LogicalPlan::Aggregate { .. } => "aggregate",
            LogicalPlan::GroupBy { .. } => "group_by",
            LogicalPlan::Insert { .. } => "insert",
            LogicalPlan::Delete { .. } => "delete",
            LogicalPlan::Update { .. } => "update",
            LogicalPlan::Explain { .. } => "explain",
        }
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::TableGet(_) | LogicalPlan::Insert { .. } => alloc::vec![],
            LogicalPlan::Join { left, right, .. } => alloc::vec![left.as_ref(), right.as_ref()],
            LogicalPlan::Project { input, .. } => input.as_deref().into_iter().collect(),
            LogicalPlan::Predicate { input, .. }
            | LogicalPlan::OrderBy { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::GroupBy { input, .. }
            | LogicalPlan::Delete { input, .. }
            | LogicalPlan::Update { input, .. }
            | LogicalPlan::Explain { input } => alloc::vec![input.as_ref()],
        }
    }

    /// Direct children, mutably.
    pub fn children_mut(&mut self) -> Vec<&mut LogicalPlan> {
        match self {
            LogicalPlan::TableGet(_) | LogicalPlan::Insert { .. } => alloc::vec![],
            LogicalPlan::Join { left, right, .. } => alloc::vec![left.as_mut(), right.as_mut()],
            LogicalPlan::Project { input, .. } => input.as_deref_mut().into_iter().collect(),
            LogicalPlan::Predicate { input, .. }
            | LogicalPlan::OrderBy { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::GroupBy { input, .. }
            | LogicalPlan::Delete { input, .. }
            | LogicalPlan::Update { input, .. }
            | LogicalPlan::Explain { input } => alloc::vec![input.as_mut()],
        }
    }

    /// Aliases of every table access in the subtree.
    pub fn table_aliases(&self) -> HashSet<&str> {
        let mut aliases = HashSet::new();
        self.collect_aliases(&mut aliases);
        aliases
    }

    fn collect_aliases<'a>(&'a self, out: &mut HashSet<&'a str>) {
        if let LogicalPlan::TableGet(get) = self {
            out.insert(get.alias.as_str());
        }
        for child in self.children() {
            child.collect_aliases(out);
        }
    }

    fn mark_writable(&mut self) {
        if let LogicalPlan::TableGet(get) = self {
            get.readonly = false;
        }
        for child in self.children_mut() {
            child.mark_writable();
        }
    }

    /// Number of nodes in the subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }
}
