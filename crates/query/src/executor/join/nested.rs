//! Nested loop join.

use crate::ast::Expr;
use crate::context::ExecContext;
use crate::executor::operator::child_tuple;
use crate::executor::{Operator, PhysicalOperator};
use crate::tuple::{JoinedTuple, Tuple, TupleCellSpec, ValueListTuple};
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use mindb_core::{Result, Value};
use tracing::trace;

/// Position of the join in its iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinState {
    /// Outer input not opened yet.
    OuterStart,
    /// Outer input open; the next outer row is due.
    OuterAdvance,
    /// An outer row is ready; the inner input must be opened against it.
    InnerStart,
    /// Inner input open for the current outer row.
    InnerAdvance,
    /// Outer input exhausted.
    Done,
}

fn transition(state: &mut JoinState, to: JoinState) {
    trace!(from = ?*state, to = ?to, "join state");
    *state = to;
}

/// Cells copied out of a child tuple. Buffers are reused across rows.
#[derive(Default)]
struct CellBuffer {
    values: Vec<Value>,
    specs: Vec<TupleCellSpec>,
}

impl CellBuffer {
    fn fill(&mut self, tuple: &Tuple<'_>) {
        self.values.clear();
        self.values.extend((0..tuple.cell_num()).filter_map(|i| tuple.cell_at(i).cloned()));
        // A child's schema is fixed while it is open.
        if self.specs.len() != self.values.len() {
            self.specs = tuple.specs();
        }
    }

    fn clear(&mut self) {
        self.values.clear();
        self.specs.clear();
    }

    fn view(&self) -> ValueListTuple<'_> {
        ValueListTuple::new(&self.values, &self.specs)
    }
}

/// Nested loop join driven by an explicit state machine.
///
/// The inner input is reopened for every outer row with that row, joined
/// to the join's own father tuple, as its father tuple. An inner index
/// scan bounded by outer columns therefore scans a fresh range per outer
/// row.
///
/// Matched rows are copied into buffers owned by the join, so
/// `current_tuple` only borrows.
pub struct JoinOperator {
    left: Box<PhysicalOperator>,
    right: Box<PhysicalOperator>,
    conditions: Vec<Expr>,
    state: JoinState,
    outer: CellBuffer,
    inner: CellBuffer,
}

impl JoinOperator {
    pub fn new(left: PhysicalOperator, right: PhysicalOperator, conditions: Vec<Expr>) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
            conditions,
            state: JoinState::OuterStart,
            outer: CellBuffer::default(),
            inner: CellBuffer::default(),
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }

    pub fn conditions(&self) -> &[Expr] {
        &self.conditions
    }
}

impl Operator for JoinOperator {
    fn name(&self) -> &'static str {
        "JOIN"
    }

    fn param(&self) -> String {
        let conditions: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        conditions.join(" AND ")
    }

    fn open(&mut self, _ctx: &ExecContext<'_>) -> Result<()> {
        transition(&mut self.state, JoinState::OuterStart);
        self.outer.clear();
        self.inner.clear();
        Ok(())
    }

    fn next(&mut self, ctx: &ExecContext<'_>) -> Result<bool> {
        loop {
            match self.state {
                JoinState::OuterStart => {
                    transition(&mut self.state, JoinState::OuterAdvance);
                    self.left.open(ctx)?;
                }
                JoinState::OuterAdvance => {
                    if self.left.next(ctx)? {
                        transition(&mut self.state, JoinState::InnerStart);
                    } else {
                        transition(&mut self.state, JoinState::Done);
                        self.left.close()?;
                    }
                }
                JoinState::InnerStart => {
                    let outer = child_tuple(&self.left)?;
                    self.outer.fill(&outer);
                    let father = Tuple::Joined(JoinedTuple::borrowed(Some(&outer), ctx.father()));
                    transition(&mut self.state, JoinState::InnerAdvance);
                    self.right.open(&ctx.with_father(&father))?;
                }
                JoinState::InnerAdvance => {
                    let outer = child_tuple(&self.left)?;
                    let father = Tuple::Joined(JoinedTuple::borrowed(Some(&outer), ctx.father()));
                    if !self.right.next(&ctx.with_father(&father))? {
                        transition(&mut self.state, JoinState::OuterAdvance);
                        self.right.close()?;
                        continue;
                    }
                    let inner = child_tuple(&self.right)?;
                    let pair = Tuple::Joined(JoinedTuple::borrowed(Some(&outer), Some(&inner)));
                    let env = Tuple::Joined(JoinedTuple::borrowed(Some(&pair), ctx.father()));
                    let mut matched = true;
                    for condition in &self.conditions {
                        if !condition.get_value(&env)?.get_boolean() {
                            matched = false;
                            break;
                        }
                    }
                    if matched {
                        self.inner.fill(&inner);
                        return Ok(true);
                    }
                }
                JoinState::Done => return Ok(false),
            }
        }
    }

    fn current_tuple(&self) -> Option<Tuple<'_>> {
        if self.state != JoinState::InnerAdvance {
            return None;
        }
        Some(Tuple::Joined(JoinedTuple::values(self.outer.view(), self.inner.view())))
    }

    fn close(&mut self) -> Result<()> {
        let result = match self.state {
            JoinState::OuterStart | JoinState::Done => Ok(()),
            JoinState::OuterAdvance | JoinState::InnerStart => self.left.close(),
            JoinState::InnerAdvance => {
                let right = self.right.close();
                let left = self.left.close();
                right.and(left)
            }
        };
        transition(&mut self.state, JoinState::Done);
        result
    }

    fn children(&self) -> Vec<&PhysicalOperator> {
        alloc::vec![self.left.as_ref(), self.right.as_ref()]
    }
}
