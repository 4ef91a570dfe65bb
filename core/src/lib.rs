//! Generic maximum-flow graph
//!
//! A capacitated directed multigraph solved with Dinic's blocking-flow
//! algorithm. Residual state is kept between calls, so flows can be
//! augmented incrementally, pushed back by swapping source and sink, or
//! edited edge by edge before the next computation.
//!
//! ```
//! use flowgraph_core::FlowGraph;
//!
//! let mut graph = FlowGraph::new(4);
//! graph.add_edge(0, 1, 1i32);
//! graph.add_edge(0, 2, 1);
//! graph.add_edge(1, 3, 1);
//! graph.add_edge(2, 3, 1);
//!
//! assert_eq!(graph.flow(0, 3), 2);
//! assert_eq!(graph.min_cut(0), vec![true, false, false, false]);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;

pub use crate::algorithm::graph::max_flow::{Edge, FlowGraph};
pub use crate::algorithm::traits::{Capacity, FlowError};
