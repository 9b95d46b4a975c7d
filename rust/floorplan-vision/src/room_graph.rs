// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar wall graph
//!
//! Nodes are created on demand from wall endpoints. An endpoint reuses the
//! first existing node (in creation order) closer than the weld tolerance,
//! so residual jitter left by regularization collapses into one node.
//! Edges are undirected and never duplicated.

use crate::types::{Point2D, Segment};
use std::collections::VecDeque;

pub type NodeId = usize;
pub type EdgeId = usize;

/// A wall junction or wall end
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Point2D,
    /// Adjacent nodes in edge insertion order
    pub neighbors: Vec<NodeId>,
}

/// An undirected wall between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// Index of the wall segment this edge came from
    pub segment_index: usize,
}

/// Node/edge graph of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of a set of wall segments
    pub fn from_walls(walls: &[Segment], tolerance: f64) -> Self {
        let mut graph = Self::new();
        for (i, wall) in walls.iter().enumerate() {
            graph.add_wall(wall, i, tolerance);
        }
        graph
    }

    /// Return the first node within `tolerance` of `position`, or create one
    pub fn find_or_create_node(&mut self, position: Point2D, tolerance: f64) -> NodeId {
        if let Some(node) = self
            .nodes
            .iter()
            .find(|n| n.position.distance_to(&position) < tolerance)
        {
            return node.id;
        }

        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            position,
            neighbors: Vec::new(),
        });
        id
    }

    /// Add a wall as an undirected edge.
    ///
    /// Returns the new edge, or `None` when both endpoints fall on the same
    /// node or the node pair is already connected.
    pub fn add_wall(&mut self, wall: &Segment, segment_index: usize, tolerance: f64) -> Option<EdgeId> {
        let a = self.find_or_create_node(wall.p1, tolerance);
        let b = self.find_or_create_node(wall.p2, tolerance);
        if a == b || self.has_edge(a, b) {
            return None;
        }

        self.nodes[a].neighbors.push(b);
        self.nodes[b].neighbors.push(a);
        self.edges.push(Edge {
            a,
            b,
            segment_index,
        });
        Some(self.edges.len() - 1)
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.nodes[a].neighbors.contains(&b)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn position(&self, id: NodeId) -> Point2D {
        self.nodes[id].position
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Connected component of every node, numbered in node order
    pub fn component_labels(&self) -> Vec<usize> {
        let mut labels = vec![usize::MAX; self.nodes.len()];
        let mut next_label = 0;

        for start in 0..self.nodes.len() {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = next_label;
            let mut queue = VecDeque::from([start]);

            while let Some(current) = queue.pop_front() {
                for &neighbor in &self.nodes[current].neighbors {
                    if labels[neighbor] == usize::MAX {
                        labels[neighbor] = next_label;
                        queue.push_back(neighbor);
                    }
                }
            }
            next_label += 1;
        }

        labels
    }
}
