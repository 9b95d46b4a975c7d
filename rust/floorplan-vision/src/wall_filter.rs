// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Separation of structural walls from furniture symbols
//!
//! Real walls form one large connected network (or a few large wings);
//! furniture outlines are small isolated loops. Lines are joined at their
//! integer-rounded endpoints and split into connected components:
//! - the component with the greatest total length is the wall skeleton
//! - any other component longer than `island_ratio` of it is also wall
//! - everything else is a symbol, classified by its bounding box

use crate::types::{Asset, AssetKind, AssetThresholds, Point2D, Segment};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Configuration for symbol separation
#[derive(Debug, Clone)]
pub struct SymbolFilterConfig {
    /// Length ratio to the largest component above which a component stays wall.
    /// Default: 0.10
    pub island_ratio: f64,
    /// Symbols whose bounding box is thinner than this are dropped as noise.
    /// Default: 5.0
    pub min_symbol_extent: f64,
    pub assets: AssetThresholds,
}

impl Default for SymbolFilterConfig {
    fn default() -> Self {
        Self {
            island_ratio: 0.10,
            min_symbol_extent: 5.0,
            assets: AssetThresholds::default(),
        }
    }
}

/// Result of symbol separation
#[derive(Debug, Clone, Default)]
pub struct SymbolFilterResult {
    /// Wall lines, in input order
    pub walls: Vec<Segment>,
    /// Recognized furniture, largest component first
    pub assets: Vec<Asset>,
    pub stats: SymbolFilterStats,
}

/// Statistics from symbol separation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolFilterStats {
    pub components: usize,
    pub wall_components: usize,
    pub symbol_components: usize,
    pub noise_components: usize,
}

type NodeKey = (i64, i64);

fn node_key(p: &Point2D) -> NodeKey {
    (p.x.round() as i64, p.y.round() as i64)
}

/// Endpoint graph keyed by rounded coordinates; nodes are numbered in
/// first-seen order
#[derive(Debug, Default)]
struct NodeIndex {
    index: FxHashMap<NodeKey, usize>,
    keys: Vec<NodeKey>,
    /// (neighbor node, line index) per node
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl NodeIndex {
    fn intern(&mut self, p: &Point2D) -> usize {
        let key = node_key(p);
        if let Some(&node) = self.index.get(&key) {
            return node;
        }
        let node = self.keys.len();
        self.index.insert(key, node);
        self.keys.push(key);
        self.adjacency.push(Vec::new());
        node
    }
}

/// A connected group of lines
#[derive(Debug, Default)]
struct Component {
    lines: Vec<usize>,
    nodes: Vec<usize>,
    length: f64,
}

/// Split regularized lines into wall lines and furniture assets
pub fn separate_symbols(lines: &[Segment], config: &SymbolFilterConfig) -> SymbolFilterResult {
    if lines.is_empty() {
        return SymbolFilterResult::default();
    }

    let mut nodes = NodeIndex::default();
    for (i, line) in lines.iter().enumerate() {
        let u = nodes.intern(&line.p1);
        let v = nodes.intern(&line.p2);
        nodes.adjacency[u].push((v, i));
        nodes.adjacency[v].push((u, i));
    }

    let mut components = connected_components(lines, &nodes.adjacency);

    // Longest first; ties keep discovery order
    components.sort_by(|a, b| b.length.total_cmp(&a.length));
    let max_length = components[0].length;

    let mut stats = SymbolFilterStats {
        components: components.len(),
        ..Default::default()
    };
    let mut is_wall_line = vec![false; lines.len()];
    let mut assets = Vec::new();

    for (rank, component) in components.iter().enumerate() {
        let ratio = if max_length > 0.0 {
            component.length / max_length
        } else {
            1.0
        };

        if rank == 0 || ratio > config.island_ratio {
            stats.wall_components += 1;
            for &line in &component.lines {
                is_wall_line[line] = true;
            }
            continue;
        }

        match symbol_asset(component, &nodes.keys, config) {
            Some(asset) => {
                stats.symbol_components += 1;
                assets.push(asset);
            }
            None => stats.noise_components += 1,
        }
    }

    let walls = lines
        .iter()
        .zip(&is_wall_line)
        .filter(|(_, &keep)| keep)
        .map(|(line, _)| *line)
        .collect();

    SymbolFilterResult {
        walls,
        assets,
        stats,
    }
}

/// Breadth-first labeling, seeded in node order
fn connected_components(lines: &[Segment], adjacency: &[Vec<(usize, usize)>]) -> Vec<Component> {
    let mut visited = vec![false; adjacency.len()];
    let mut line_taken = vec![false; lines.len()];
    let mut components = Vec::new();

    for start in 0..adjacency.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let mut component = Component {
            nodes: vec![start],
            ..Default::default()
        };
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for &(next, line) in &adjacency[current] {
                if !line_taken[line] {
                    line_taken[line] = true;
                    component.lines.push(line);
                    component.length += lines[line].length();
                }
                if !visited[next] {
                    visited[next] = true;
                    component.nodes.push(next);
                    queue.push_back(next);
                }
            }
        }

        components.push(component);
    }

    components
}

/// Bounding-box asset for a symbol component, or `None` for noise
fn symbol_asset(
    component: &Component,
    keys: &[NodeKey],
    config: &SymbolFilterConfig,
) -> Option<Asset> {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for &node in &component.nodes {
        let (x, y) = keys[node];
        min_x = min_x.min(x as f64);
        min_y = min_y.min(y as f64);
        max_x = max_x.max(x as f64);
        max_y = max_y.max(y as f64);
    }

    let width = max_x - min_x;
    let height = max_y - min_y;
    if width < config.min_symbol_extent || height < config.min_symbol_extent {
        return None;
    }

    Some(Asset {
        kind: classify_symbol(width, height, &config.assets),
        pos: Point2D::new((min_x + max_x) * 0.5, (min_y + max_y) * 0.5),
        width,
        height,
    })
}

/// Classify a symbol by bounding-box aspect ratio and area
pub fn classify_symbol(width: f64, height: f64, thresholds: &AssetThresholds) -> AssetKind {
    let aspect = if height > 0.1 { width / height } else { 1.0 };
    let area = width * height;

    if aspect > thresholds.table_aspect_min
        && aspect < thresholds.table_aspect_max
        && area < thresholds.table_max_area
    {
        AssetKind::Table
    } else if (aspect > thresholds.bed_aspect_high || aspect < thresholds.bed_aspect_low)
        && area > thresholds.bed_min_area
    {
        AssetKind::Bed
    } else {
        AssetKind::Misc
    }
}
