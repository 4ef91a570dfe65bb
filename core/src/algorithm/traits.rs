//! Core trait and error definitions for the flow algorithms
//!
//! The flow structures are generic over an integer capacity type. This
//! module defines the numeric contract those types must satisfy and the
//! error enumeration shared by every fallible graph operation.
//!
//! # Numeric Model
//! Capacities are exact integers, either signed or unsigned. Every value a
//! flow computation produces is bounded by `Capacity::MAX`; accumulation
//! saturates at that bound instead of wrapping.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Integer type usable as an edge capacity and flow value
///
/// # Invariants
/// - `ZERO` is the additive identity and the smallest legal capacity
/// - `MAX` is the largest representable value and the default flow limit
/// - `a - b` is only ever evaluated with `ZERO <= b <= a`
pub trait Capacity:
    Copy
    + Ord
    + Debug
    + Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + SubAssign
{
    /// Additive identity
    const ZERO: Self;

    /// Largest representable capacity
    const MAX: Self;

    /// Addition clamped to `MAX`
    fn saturating_add(self, rhs: Self) -> Self;

    #[inline]
    fn is_negative(self) -> bool {
        self < Self::ZERO
    }

    #[inline]
    fn is_positive(self) -> bool {
        self > Self::ZERO
    }
}

macro_rules! impl_capacity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Capacity for $ty {
                const ZERO: Self = 0;
                const MAX: Self = <$ty>::MAX;

                #[inline]
                fn saturating_add(self, rhs: Self) -> Self {
                    <$ty>::saturating_add(self, rhs)
                }
            }
        )*
    };
}

impl_capacity!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Contract violations reported by flow graph operations
///
/// Values of the generic capacity type are carried pre-rendered so the
/// error stays independent of `Cap`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Vertex {vertex} out of range for graph with {vertex_count} vertices")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("Edge {edge} out of range for graph with {edge_count} edges")]
    EdgeOutOfRange { edge: usize, edge_count: usize },

    #[error("Negative capacity: {0}")]
    NegativeCapacity(String),

    #[error("Negative flow limit: {0}")]
    NegativeFlowLimit(String),

    #[error("Source and sink are the same vertex: {0}")]
    SameSourceAndSink(usize),

    #[error("Invalid flow assignment: flow {flow} must lie in [0, {cap}]")]
    InvalidFlowAssignment { cap: String, flow: String },
}
