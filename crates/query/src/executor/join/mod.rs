//! Join operators.

mod nested;

pub use nested::{JoinOperator, JoinState};
