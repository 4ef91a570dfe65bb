//! Maximum Flow Algorithm Implementation
//!
//! This module implements Dinic's blocking-flow algorithm over a residual
//! multigraph with integer capacities. The graph keeps its residual state
//! between computations, so flows can be augmented incrementally, reversed
//! by swapping source and sink, or adjusted edge by edge.
//!
//! # Residual Representation
//! Every logical edge `k` owns two arc records at positions `2k` and
//! `2k + 1`. The forward arc starts with the full capacity and the reverse
//! arc with zero; pushing `d` units moves `d` from one to the other. The
//! partner of arc `p` is therefore `p ^ 1`, and for each edge
//! `forward.cap + reverse.cap` stays equal to its capacity.
//!
//! # Algorithmic Complexity
//! - **Time Complexity**: O(V² · E) per `flow` call
//! - **Space Complexity**: O(V + E)
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::{debug, trace};

use crate::algorithm::traits::{Capacity, FlowError};

/// Level marking a vertex as unreached by BFS or pruned as a dead end
const UNREACHED: usize = usize::MAX;

/// Remaining stack below which the blocking-flow search switches segments
const RED_ZONE: usize = 32 * 1024;

/// Size of each stack segment allocated for deep searches
const STACK_SEGMENT: usize = 1024 * 1024;

/// Logical edge view reconstructed from its pair of residual arcs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge<Cap> {
    /// Source vertex
    pub from: usize,
    /// Target vertex
    pub to: usize,
    /// Total edge capacity
    pub cap: Cap,
    /// Flow currently routed from `from` to `to`
    pub flow: Cap,
}

/// Residual arc record
#[derive(Debug, Clone)]
struct ResidualArc<Cap> {
    to: usize,
    cap: Cap,
}

/// Capacitated directed multigraph with persistent residual state
#[derive(Debug, Clone)]
pub struct FlowGraph<Cap> {
    /// Number of vertices, fixed at construction
    vertex_count: usize,
    /// Per-vertex `(neighbor, arc position)` pairs in insertion order
    adjacency: Vec<Vec<(usize, usize)>>,
    /// Paired residual arcs, forward at even and reverse at odd positions
    arcs: Vec<ResidualArc<Cap>>,
}

impl<Cap: Capacity> Default for FlowGraph<Cap> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<Cap: Capacity> FlowGraph<Cap> {
    /// Create a flow graph with `vertex_count` vertices and no edges
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            adjacency: vec![Vec::new(); vertex_count],
            arcs: Vec::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_count
    }

    pub fn num_edges(&self) -> usize {
        self.arcs.len() / 2
    }

    /// Add a directed edge and return its index
    ///
    /// # Panics
    /// If either endpoint is out of range or `cap` is negative.
    pub fn add_edge(&mut self, from: usize, to: usize, cap: Cap) -> usize {
        self.try_add_edge(from, to, cap).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Add a directed edge, reporting contract violations as errors
    ///
    /// Indices are handed out as 0, 1, 2, ... in call order.
    pub fn try_add_edge(&mut self, from: usize, to: usize, cap: Cap) -> Result<usize, FlowError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        if cap.is_negative() {
            return Err(FlowError::NegativeCapacity(cap.to_string()));
        }

        let index = self.num_edges();
        let forward = self.arcs.len();
        let reverse = forward + 1;

        self.arcs.push(ResidualArc { to, cap });
        self.arcs.push(ResidualArc { to: from, cap: Cap::ZERO });
        self.adjacency[from].push((to, forward));
        self.adjacency[to].push((from, reverse));

        Ok(index)
    }

    /// Edge view for index `edge`
    ///
    /// # Panics
    /// If `edge` is out of range.
    pub fn get_edge(&self, edge: usize) -> Edge<Cap> {
        self.try_get_edge(edge).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_get_edge(&self, edge: usize) -> Result<Edge<Cap>, FlowError> {
        self.check_edge(edge)?;
        Ok(self.edge_view(edge))
    }

    /// All edge views in insertion order
    pub fn edges(&self) -> Vec<Edge<Cap>> {
        (0..self.num_edges()).map(|edge| self.edge_view(edge)).collect()
    }

    /// Overwrite an edge's capacity and flow
    ///
    /// # Panics
    /// If `edge` is out of range or `new_flow` is not within `[0, new_cap]`.
    pub fn change_edge(&mut self, edge: usize, new_cap: Cap, new_flow: Cap) {
        self.try_change_edge(edge, new_cap, new_flow).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_change_edge(
        &mut self,
        edge: usize,
        new_cap: Cap,
        new_flow: Cap,
    ) -> Result<(), FlowError> {
        self.check_edge(edge)?;
        if new_flow.is_negative() || new_flow > new_cap {
            return Err(FlowError::InvalidFlowAssignment {
                cap: new_cap.to_string(),
                flow: new_flow.to_string(),
            });
        }

        trace!("change_edge {}: cap={} flow={}", edge, new_cap, new_flow);
        self.arcs[2 * edge].cap = new_cap - new_flow;
        self.arcs[2 * edge + 1].cap = new_flow;
        Ok(())
    }

    /// Maximum flow from `s` to `t`
    ///
    /// # Panics
    /// If `s` or `t` is out of range or `s == t`.
    pub fn flow(&mut self, s: usize, t: usize) -> Cap {
        self.flow_with_limit(s, t, Cap::MAX)
    }

    pub fn try_flow(&mut self, s: usize, t: usize) -> Result<Cap, FlowError> {
        self.try_flow_with_limit(s, t, Cap::MAX)
    }

    /// Push up to `flow_limit` units from `s` to `t`
    ///
    /// # Panics
    /// If `s` or `t` is out of range, `s == t`, or `flow_limit` is negative.
    pub fn flow_with_limit(&mut self, s: usize, t: usize, flow_limit: Cap) -> Cap {
        self.try_flow_with_limit(s, t, flow_limit).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Push up to `flow_limit` units from `s` to `t` on top of the current
    /// residual state and return the amount pushed
    ///
    /// # Guarantees
    /// - The result lies in `[0, flow_limit]`
    /// - If the result is below `flow_limit`, no augmenting path remains
    pub fn try_flow_with_limit(
        &mut self,
        s: usize,
        t: usize,
        flow_limit: Cap,
    ) -> Result<Cap, FlowError> {
        self.check_vertex(s)?;
        self.check_vertex(t)?;
        if s == t {
            return Err(FlowError::SameSourceAndSink(s));
        }
        if flow_limit.is_negative() {
            return Err(FlowError::NegativeFlowLimit(flow_limit.to_string()));
        }

        let mut level = vec![UNREACHED; self.vertex_count];
        let mut cursor = vec![0usize; self.vertex_count];
        let mut total = Cap::ZERO;
        let mut phases = 0usize;

        while total < flow_limit {
            self.assign_levels(s, t, &mut level);
            if level[t] == UNREACHED {
                break;
            }

            let sink_level = level[t];
            cursor.fill(0);
            let pushed = self.augment(s, t, flow_limit - total, &mut level, &mut cursor);
            phases += 1;
            trace!("phase {}: sink at level {}, pushed {}", phases, sink_level, pushed);
            if !pushed.is_positive() {
                break;
            }
            total = total.saturating_add(pushed);
        }

        debug!("flow {} -> {}: {} in {} phases", s, t, total, phases);
        Ok(total)
    }

    /// Vertices reachable from `s` over arcs with positive residual
    ///
    /// Taken right after maximising flow from `s` to `t`, the `true` side is
    /// the source side of a minimum `s`-`t` cut.
    ///
    /// # Panics
    /// If `s` is out of range.
    pub fn min_cut(&self, s: usize) -> Vec<bool> {
        self.try_min_cut(s).unwrap_or_else(|err| panic!("{}", err))
    }

    pub fn try_min_cut(&self, s: usize) -> Result<Vec<bool>, FlowError> {
        self.check_vertex(s)?;

        let mut visited = vec![false; self.vertex_count];
        let mut queue = VecDeque::new();
        visited[s] = true;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            for &(u, arc) in &self.adjacency[v] {
                if self.arcs[arc].cap.is_positive() && !visited[u] {
                    visited[u] = true;
                    queue.push_back(u);
                }
            }
        }

        Ok(visited)
    }

    /// BFS level assignment from `s`, stopping once `t` is labelled
    fn assign_levels(&self, s: usize, t: usize, level: &mut [usize]) {
        level.fill(UNREACHED);
        level[s] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            for &(u, arc) in &self.adjacency[v] {
                if !self.arcs[arc].cap.is_positive() || level[u] != UNREACHED {
                    continue;
                }
                level[u] = level[v] + 1;
                if u == t {
                    return;
                }
                queue.push_back(u);
            }
        }
    }

    /// Blocking-flow search walking from `v` back towards `s`
    ///
    /// Only arcs `u -> v` with `level[u] < level[v]` and positive residual
    /// are used. `cursor[v]` never moves backwards within a phase, and a
    /// vertex that cannot fill its room is pruned by resetting its level.
    /// Recursion depth is the level of the sink, up to the vertex count, so
    /// the stack is grown on demand.
    fn augment(
        &mut self,
        s: usize,
        v: usize,
        room: Cap,
        level: &mut [usize],
        cursor: &mut [usize],
    ) -> Cap {
        if v == s {
            return room;
        }

        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || {
            let level_v = level[v];
            let mut pushed = Cap::ZERO;

            while cursor[v] < self.adjacency[v].len() {
                let (u, arc) = self.adjacency[v][cursor[v]];
                // arc is v -> u; its partner carries u -> v
                let partner = arc ^ 1;
                let available = self.arcs[partner].cap;

                if level[u] < level_v && available.is_positive() {
                    let want = (room - pushed).min(available);
                    let d = self.augment(s, u, want, level, cursor);
                    if d.is_positive() {
                        self.arcs[arc].cap += d;
                        self.arcs[partner].cap -= d;
                        pushed += d;
                        if pushed == room {
                            return pushed;
                        }
                    }
                }

                cursor[v] += 1;
            }

            level[v] = UNREACHED;
            pushed
        })
    }

    fn edge_view(&self, edge: usize) -> Edge<Cap> {
        let forward = &self.arcs[2 * edge];
        let reverse = &self.arcs[2 * edge + 1];
        Edge {
            from: reverse.to,
            to: forward.to,
            cap: forward.cap.saturating_add(reverse.cap),
            flow: reverse.cap,
        }
    }

    fn check_vertex(&self, vertex: usize) -> Result<(), FlowError> {
        if vertex < self.vertex_count {
            Ok(())
        } else {
            Err(FlowError::VertexOutOfRange {
                vertex,
                vertex_count: self.vertex_count,
            })
        }
    }

    fn check_edge(&self, edge: usize) -> Result<(), FlowError> {
        let edge_count = self.num_edges();
        if edge < edge_count {
            Ok(())
        } else {
            Err(FlowError::EdgeOutOfRange { edge, edge_count })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_graph_creation() {
        let graph: FlowGraph<i32> = FlowGraph::new(4);
        assert_eq!(graph.num_vertices(), 4);
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.edges().is_empty());

        let empty: FlowGraph<u64> = FlowGraph::default();
        assert_eq!(empty.num_vertices(), 0);
    }

    #[test]
    fn test_add_edge_builds_paired_arcs() {
        let mut graph = FlowGraph::new(3);
        assert_eq!(graph.add_edge(0, 1, 10i64), 0);
        assert_eq!(graph.add_edge(1, 2, 5), 1);

        assert_eq!(graph.arcs.len(), 4);
        assert_eq!(graph.arcs[0].to, 1);
        assert_eq!(graph.arcs[0].cap, 10);
        assert_eq!(graph.arcs[1].to, 0);
        assert_eq!(graph.arcs[1].cap, 0);

        assert_eq!(graph.adjacency[0], vec![(1, 0)]);
        assert_eq!(graph.adjacency[1], vec![(0, 1), (2, 2)]);
        assert_eq!(graph.adjacency[2], vec![(1, 3)]);
    }

    #[test]
    fn test_self_loop_adjacency() {
        let mut graph = FlowGraph::new(1);
        graph.add_edge(0, 0, 3u32);
        assert_eq!(graph.adjacency[0], vec![(0, 0), (0, 1)]);
        assert_eq!(
            graph.get_edge(0),
            Edge { from: 0, to: 0, cap: 3, flow: 0 }
        );
    }

    #[test]
    fn test_try_add_edge_rejects_without_mutation() {
        let mut graph = FlowGraph::new(2);
        assert_eq!(
            graph.try_add_edge(0, 2, 1i32),
            Err(FlowError::VertexOutOfRange { vertex: 2, vertex_count: 2 })
        );
        assert_eq!(
            graph.try_add_edge(0, 1, -1i32),
            Err(FlowError::NegativeCapacity("-1".to_string()))
        );
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.adjacency.iter().all(Vec::is_empty));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_add_edge_out_of_range_panics() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(3, 0, 1i32);
    }

    #[test]
    #[should_panic(expected = "Negative capacity")]
    fn test_add_edge_negative_capacity_panics() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(0, 1, -5i64);
    }

    #[test]
    fn test_level_assignment_stops_at_sink() {
        let mut graph = FlowGraph::new(4);
        graph.add_edge(0, 1, 1i32);
        graph.add_edge(1, 2, 1);
        graph.add_edge(2, 3, 1);
        graph.add_edge(0, 3, 0);

        let mut level = vec![0; 4];
        graph.assign_levels(0, 2, &mut level);
        assert_eq!(level, vec![0, 1, 2, UNREACHED]);
    }

    #[test]
    fn test_flow_rejects_invalid_terminals() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(0, 1, 4i32);

        assert_eq!(graph.try_flow(1, 1), Err(FlowError::SameSourceAndSink(1)));
        assert_eq!(
            graph.try_flow(0, 5),
            Err(FlowError::VertexOutOfRange { vertex: 5, vertex_count: 2 })
        );
        assert_eq!(
            graph.try_flow_with_limit(0, 1, -3),
            Err(FlowError::NegativeFlowLimit("-3".to_string()))
        );
        assert_eq!(graph.get_edge(0).flow, 0);
    }

    #[test]
    #[should_panic(expected = "same vertex")]
    fn test_flow_same_terminals_panics() {
        let mut graph: FlowGraph<i32> = FlowGraph::new(3);
        graph.flow(2, 2);
    }

    #[test]
    fn test_flow_with_limit_stops_early() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(0, 1, 10u32);

        assert_eq!(graph.flow_with_limit(0, 1, 4), 4);
        assert_eq!(graph.get_edge(0).flow, 4);
        assert_eq!(graph.flow_with_limit(0, 1, 0), 0);
        assert_eq!(graph.flow(0, 1), 6);
        assert_eq!(graph.get_edge(0), Edge { from: 0, to: 1, cap: 10, flow: 10 });
    }

    #[test]
    fn test_flow_across_layers() {
        let mut graph = FlowGraph::new(6);
        graph.add_edge(0, 1, 16i32);
        graph.add_edge(0, 2, 13);
        graph.add_edge(1, 2, 10);
        graph.add_edge(1, 3, 12);
        graph.add_edge(2, 1, 4);
        graph.add_edge(2, 4, 14);
        graph.add_edge(3, 2, 9);
        graph.add_edge(3, 5, 20);
        graph.add_edge(4, 3, 7);
        graph.add_edge(4, 5, 4);

        assert_eq!(graph.flow(0, 5), 23);
        let cut = graph.min_cut(0);
        assert!(cut[0]);
        assert!(!cut[5]);
    }

    #[test]
    fn test_disconnected_flow_is_zero() {
        let mut graph = FlowGraph::new(4);
        graph.add_edge(0, 1, 10i64);
        graph.add_edge(2, 3, 5);

        assert_eq!(graph.flow(0, 3), 0);
        assert_eq!(graph.min_cut(0), vec![true, true, false, false]);
    }

    #[test]
    fn test_change_edge_overwrites_residuals() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(0, 1, 5i32);
        graph.change_edge(0, 8, 3);

        assert_eq!(graph.arcs[0].cap, 5);
        assert_eq!(graph.arcs[1].cap, 3);
        assert_eq!(graph.get_edge(0), Edge { from: 0, to: 1, cap: 8, flow: 3 });
    }

    #[test]
    fn test_try_change_edge_validation() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(0, 1, 5i32);

        assert_eq!(
            graph.try_change_edge(1, 5, 0),
            Err(FlowError::EdgeOutOfRange { edge: 1, edge_count: 1 })
        );
        assert!(graph.try_change_edge(0, 2, 3).is_err());
        assert!(graph.try_change_edge(0, 2, -1).is_err());
        assert_eq!(graph.get_edge(0), Edge { from: 0, to: 1, cap: 5, flow: 0 });
    }

    #[test]
    #[should_panic(expected = "Invalid flow assignment")]
    fn test_change_edge_inconsistent_panics() {
        let mut graph = FlowGraph::new(2);
        graph.add_edge(0, 1, 5u16);
        graph.change_edge(0, 1, 2);
    }

    #[test]
    #[should_panic(expected = "Edge 0 out of range")]
    fn test_get_edge_out_of_range_panics() {
        let graph: FlowGraph<i32> = FlowGraph::new(2);
        graph.get_edge(0);
    }

    #[test]
    fn test_min_cut_rejects_invalid_source() {
        let graph: FlowGraph<i32> = FlowGraph::new(2);
        assert_eq!(
            graph.try_min_cut(2),
            Err(FlowError::VertexOutOfRange { vertex: 2, vertex_count: 2 })
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = FlowGraph::new(2);
        original.add_edge(0, 1, 7i32);
        let mut copy = original.clone();

        assert_eq!(copy.flow(0, 1), 7);
        assert_eq!(original.get_edge(0).flow, 0);
        assert_eq!(copy.get_edge(0).flow, 7);
    }
}
