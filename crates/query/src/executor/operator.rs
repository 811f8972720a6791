//! Operator protocol and the physical operator tree node.

use super::{
    AggregateOperator, DeleteOperator, EmptyOperator, ExplainOperator, IndexScanOperator,
    InsertOperator, JoinOperator, OrderByOperator, PredicateOperator, ProjectOperator,
    TableScanOperator, UpdateOperator,
};
use crate::context::ExecContext;
use crate::tuple::Tuple;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use mindb_core::Result;
use tracing::warn;

/// Volcano iterator protocol.
///
/// A caller drives an operator through `open`, any number of `next` calls
/// and `close`. `current_tuple` is valid only right after `next` returned
/// `Ok(true)`. `close` must release every scan handle no matter how far
/// the iteration got.
pub trait Operator {
    /// Operator name, as shown by EXPLAIN.
    fn name(&self) -> &'static str;

    /// Operator detail, as shown by EXPLAIN.
    fn param(&self) -> String {
        String::new()
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()>;

    /// Advances to the next row. `Ok(false)` is the end of the stream.
    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool>;

    fn current_tuple(&self) -> Option<Tuple<'_>>;

    fn close(&mut self) -> Result<()>;

    fn children(&self) -> Vec<&PhysicalOperator> {
        Vec::new()
    }
}

/// Concrete operator variants.
pub enum OperatorKind {
    TableScan(TableScanOperator),
    IndexScan(IndexScanOperator),
    Predicate(PredicateOperator),
    Join(JoinOperator),
    Project(ProjectOperator),
    Aggregate(AggregateOperator),
    OrderBy(OrderByOperator),
    Insert(InsertOperator),
    Delete(DeleteOperator),
    Update(UpdateOperator),
    Explain(ExplainOperator),
    Empty(EmptyOperator),
}

macro_rules! dispatch {
    ($kind:expr, $op:ident => $body:expr) => {
        match $kind {
            OperatorKind::TableScan($op) => $body,
            OperatorKind::IndexScan($op) => $body,
            OperatorKind::Predicate($op) => $body,
            OperatorKind::Join($op) => $body,
            OperatorKind::Project($op) => $body,
            OperatorKind::Aggregate($op) => $body,
            OperatorKind::OrderBy($op) => $body,
            OperatorKind::Insert($op) => $body,
            OperatorKind::Delete($op) => $body,
            OperatorKind::Update($op) => $body,
            OperatorKind::Explain($op) => $body,
            OperatorKind::Empty($op) => $body,
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Open,
    Closed,
}

/// A node of the physical operator tree.
///
/// Wraps the concrete operator and checks the call order: `open` on an
/// open operator and `next` on an operator that is not open are bugs and
/// fail in debug builds. `close` is idempotent. A closed operator may be
/// opened again, which is how a join restarts its inner side.
pub struct PhysicalOperator {
    kind: OperatorKind,
    state: Lifecycle,
}

impl PhysicalOperator {
    pub fn new(kind: OperatorKind) -> Self {
        Self {
            kind,
            state: Lifecycle::Created,
        }
    }

    pub fn kind(&self) -> &OperatorKind {
        &self.kind
    }

    pub fn is_open(&self) -> bool {
        self.state == Lifecycle::Open
    }
}

impl Operator for PhysicalOperator {
    fn name(&self) -> &'static str {
        dispatch!(&self.kind, op => op.name())
    }

    fn param(&self) -> String {
        dispatch!(&self.kind, op => op.param())
    }

    fn open(&mut self, ctx: &ExecContext<'_>) -> Result<()> {
        debug_assert!(self.state != Lifecycle::Open, "{} opened twice", self.name());
        // Marked open first so that close releases a half-opened operator.
        self.state = Lifecycle::Open;
        dispatch!(&mut self.kind, op => op.open(ctx)).inspect_err(|err| {
            warn!(operator = self.name(), error = %err, "open failed");
        })
    }

    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool> {
        debug_assert!(self.state == Lifecycle::Open, "{} is not open", self.name());
        dispatch!(&mut self.kind, op => op.next(ctx)).inspect_err(|err| {
            warn!(operator = self.name(), error = %err, "next failed");
        })
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        if self.state != Lifecycle::Open {
            return None;
        }
        dispatch!(&self.kind, op => op.current_tuple())
    }

    fn close(&mut self) -> Result<()> {
        if self.state != Lifecycle::Open {
            return Ok(());
        }
        self.state = Lifecycle::Closed;
        dispatch!(&mut self.kind, op => op.close())
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        dispatch!(&self.kind, op => op.children())
    }
}

impl fmt::Debug for PhysicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.name());
        let param = self.param();
        if !param.is_empty() {
            out.field("param", &param);
        }
        for child in self.children() {
            out.field("child", child);
        }
        out.finish()
    }
}

/// Pulls the current tuple of a child that just returned a row.
pub(crate) fn child_tuple(child: &PhysicalOperator) -> Result<Tuple<'_>> {
    child.current_tuple().ok_or_else(|| {
        mindb_core::Error::internal(alloc::format!("{} returned a row without a tuple", child.name()))
    })
}
