//! Index range bounds.
//!
//! A [`RangeBound`] is one end of an index scan interval. Several bounds may
//! apply to the same end (`a > 1 AND a >= 3`); [`RangeBound::merge_into`]
//! keeps the tightest of them.

use core::cmp::Ordering;
use core::fmt;

/// Which end of the interval a bound constrains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// One end of a scan interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeBound<T> {
    Unbounded,
    Included(T),
    Excluded(T),
}

impl<T> RangeBound<T> {
    pub fn new(value: T, inclusive: bool) -> Self {
        if inclusive {
            RangeBound::Included(value)
        } else {
            RangeBound::Excluded(value)
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            RangeBound::Unbounded => None,
            RangeBound::Included(v) | RangeBound::Excluded(v) => Some(v),
        }
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, RangeBound::Unbounded)
    }

    #[inline]
    pub fn is_inclusive(&self) -> bool {
        matches!(self, RangeBound::Included(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RangeBound<U> {
        match self {
            RangeBound::Unbounded => RangeBound::Unbounded,
            RangeBound::Included(v) => RangeBound::Included(f(v)),
            RangeBound::Excluded(v) => RangeBound::Excluded(f(v)),
        }
    }
}

impl<T: Ord> RangeBound<T> {
    /// Compares how much of the key space the two bounds admit on `side`.
    ///
    /// `Greater` means `self` is looser. An unbounded end is looser than any
    /// value; at equal values inclusive is looser than exclusive.
    pub fn compare(&self, other: &Self, side: Side) -> Ordering {
        match (self.value(), other.value()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Equal => self.is_inclusive().cmp(&other.is_inclusive()),
                ord => match side {
                    Side::Left => ord.reverse(),
                    Side::Right => ord,
                },
            },
        }
    }

    /// Replaces `accumulator` with `self` when `self` is strictly tighter.
    pub fn merge_into(self, accumulator: &mut Self, side: Side) {
        if self.compare(accumulator, side) == Ordering::Less {
            *accumulator = self;
        }
    }
}

/// Whether the interval `[left, right]` admits at least one key.
///
/// Unbounded ends never make the interval empty.
pub fn check_range<T: Ord>(left: &RangeBound<T>, right: &RangeBound<T>) -> bool {
    match (left.value(), right.value()) {
        (Some(l), Some(r)) => match l.cmp(r) {
            Ordering::Less => true,
            Ordering::Equal => left.is_inclusive() && right.is_inclusive(),
            Ordering::Greater => false,
        },
        _ => true,
    }
}

impl<T: fmt::Display> fmt::Display for RangeBound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Unbounded => f.write_str("unbounded"),
            RangeBound::Included(v) => write!(f, "{} inclusive", v),
            RangeBound::Excluded(v) => write!(f, "{} exclusive", v),
        }
    }
}
