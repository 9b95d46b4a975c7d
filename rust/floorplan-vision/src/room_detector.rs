// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room detection by face tracing over the wall graph
//!
//! Every undirected edge is expanded into two directed edges. From each
//! directed edge not yet claimed by a closed face, the tracer walks the graph
//! taking, at each node, the neighbor whose direction deviates least from the
//! incoming direction (deviation measured counter-clockwise in `[0, 2π)`).
//! Walks that return to their start become candidate faces; walks that hit a
//! dead end or the step cap are dropped.
//!
//! Candidates are then post-processed:
//! 1. A walk and its reverse describe one polygon; only the first is kept.
//! 2. Faces at or below the minimum area are dropped.
//! 3. Optionally, within each connected wall component, the largest face is
//!    dropped when it encloses every vertex of the component's other faces
//!    (the outer boundary of that wing).

use crate::line_ops::point_to_line_distance;
use crate::room_graph::{Graph, NodeId};
use crate::types::{Point2D, Room, RoomKind};
use rustc_hash::FxHashSet;
use std::f64::consts::TAU;

/// Configuration for room recovery
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Faces must have an area strictly above this (square pixels). Default: 2000
    pub min_room_area: f64,
    /// Hard cap on steps of one trace. Default: 50
    pub max_trace_steps: usize,
    /// Drop the outer boundary face of each wall component. Default: true
    pub exclude_outer_face: bool,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_room_area: 2000.0,
            max_trace_steps: 50,
            exclude_outer_face: true,
        }
    }
}

/// Rooms plus the number of closed walks that produced them
#[derive(Debug, Clone, Default)]
pub struct RoomDetection {
    pub rooms: Vec<Room>,
    pub candidate_faces: usize,
}

/// Trace every closed face of the graph.
///
/// Each returned walk is closed: its first node id repeats as the last.
pub fn trace_faces(graph: &Graph, max_steps: usize) -> Vec<Vec<NodeId>> {
    let mut claimed: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
    let mut faces = Vec::new();

    let directed = graph
        .edges()
        .iter()
        .flat_map(|e| [(e.a, e.b), (e.b, e.a)]);

    for (u, v) in directed {
        if claimed.contains(&(u, v)) {
            continue;
        }
        if let Some(path) = trace_face(graph, u, v, max_steps) {
            for step in path.windows(2) {
                claimed.insert((step[0], step[1]));
            }
            faces.push(path);
        }
    }

    faces
}

/// Walk from the directed edge `start -> first` until it closes
fn trace_face(graph: &Graph, start: NodeId, first: NodeId, max_steps: usize) -> Option<Vec<NodeId>> {
    let mut path = vec![start];
    let mut previous = start;
    let mut current = first;
    let mut steps = 0;

    while current != start {
        if steps >= max_steps {
            return None;
        }
        path.push(current);

        let here = graph.position(current).to_nalgebra();
        let incoming = here - graph.position(previous).to_nalgebra();
        let angle_in = incoming.y.atan2(incoming.x);

        let mut best: Option<(NodeId, f64)> = None;
        for &candidate in &graph.node(current).neighbors {
            if candidate == previous {
                continue;
            }
            let outgoing = graph.position(candidate).to_nalgebra() - here;
            let deviation = (outgoing.y.atan2(outgoing.x) - angle_in).rem_euclid(TAU);
            if best.map_or(true, |(_, d)| deviation < d) {
                best = Some((candidate, deviation));
            }
        }

        // Dead end: no neighbor besides the one we came from
        let (next, _) = best?;
        previous = current;
        current = next;
        steps += 1;
    }

    if path.len() > 2 {
        path.push(start);
        Some(path)
    } else {
        None
    }
}

/// Orientation-independent key of a closed walk
fn face_key(path: &[NodeId]) -> Vec<NodeId> {
    let cycle = &path[..path.len() - 1];
    let rotate_to_min = |nodes: &[NodeId]| -> Vec<NodeId> {
        let pivot = nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, &n)| n)
            .map_or(0, |(i, _)| i);
        nodes[pivot..].iter().chain(&nodes[..pivot]).copied().collect()
    };

    let forward = rotate_to_min(cycle);
    let reversed: Vec<NodeId> = cycle.iter().rev().copied().collect();
    let backward = rotate_to_min(&reversed);
    forward.min(backward)
}

/// Keep the first orientation of every traced polygon
pub fn dedupe_mirrored_faces(faces: Vec<Vec<NodeId>>) -> Vec<Vec<NodeId>> {
    let mut seen: FxHashSet<Vec<NodeId>> = FxHashSet::default();
    faces
        .into_iter()
        .filter(|path| seen.insert(face_key(path)))
        .collect()
}

/// A closed face with resolved geometry
#[derive(Debug, Clone)]
struct Face {
    polygon: Vec<Point2D>,
    area: f64,
    /// Connected wall component the face belongs to
    component: usize,
}

impl Face {
    fn new(graph: &Graph, path: &[NodeId], labels: &[usize]) -> Self {
        let polygon: Vec<Point2D> = path.iter().map(|&n| graph.position(n)).collect();
        let area = Room::calculate_area(&polygon);
        Self {
            polygon,
            area,
            component: labels[path[0]],
        }
    }

    fn corners(&self) -> &[Point2D] {
        &self.polygon[..self.polygon.len() - 1]
    }

    /// Inside or on the boundary
    fn covers(&self, point: &Point2D) -> bool {
        const ON_EDGE: f64 = 1e-6;

        let on_boundary = self
            .polygon
            .windows(2)
            .any(|e| point_to_line_distance(point, &e[0], &e[1]) < ON_EDGE);
        if on_boundary {
            return true;
        }

        // Even-odd ray cast towards +x
        let mut inside = false;
        for e in self.polygon.windows(2) {
            let (a, b) = (e[0], e[1]);
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// Per wall component, drop the largest face if every other face of that
/// component lies inside it
fn exclude_outer_faces(faces: &mut Vec<Face>) {
    let mut outer_faces = Vec::new();
    let mut seen: FxHashSet<usize> = FxHashSet::default();

    for component in faces.iter().map(|f| f.component) {
        if !seen.insert(component) {
            continue;
        }
        let members: Vec<usize> = (0..faces.len())
            .filter(|&i| faces[i].component == component)
            .collect();
        if members.len() < 2 {
            continue;
        }

        let mut largest = members[0];
        for &i in &members {
            if faces[i].area > faces[largest].area {
                largest = i;
            }
        }

        let outer = &faces[largest];
        let encloses_all = members
            .iter()
            .filter(|&&i| i != largest)
            .all(|&i| faces[i].corners().iter().all(|p| outer.covers(p)));
        if encloses_all {
            outer_faces.push(largest);
        }
    }

    let mut index = 0;
    faces.retain(|_| {
        let keep = !outer_faces.contains(&index);
        index += 1;
        keep
    });
}

fn classify_face(face: Face) -> Room {
    let corners = face.corners();
    let n = corners.len() as f64;
    let centroid = Point2D::new(
        corners.iter().map(|p| p.x).sum::<f64>() / n,
        corners.iter().map(|p| p.y).sum::<f64>() / n,
    );
    let kind = RoomKind::classify(face.area, corners.len());

    Room {
        polygon: face.polygon,
        area: face.area,
        centroid,
        kind,
    }
}

/// Recover and classify the rooms enclosed by the wall graph
pub fn detect_rooms(graph: &Graph, config: &RoomConfig) -> RoomDetection {
    let walks = trace_faces(graph, config.max_trace_steps);
    let candidate_faces = walks.len();
    let labels = graph.component_labels();

    let mut faces: Vec<Face> = dedupe_mirrored_faces(walks)
        .iter()
        .map(|path| Face::new(graph, path, &labels))
        .filter(|face| face.area > config.min_room_area)
        .collect();

    if config.exclude_outer_face {
        exclude_outer_faces(&mut faces);
    }

    RoomDetection {
        rooms: faces.into_iter().map(classify_face).collect(),
        candidate_faces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;
    use approx::assert_relative_eq;

    fn square() -> Vec<Segment> {
        vec![
            Segment::from_coords(0.0, 0.0, 100.0, 0.0),
            Segment::from_coords(100.0, 0.0, 100.0, 100.0),
            Segment::from_coords(100.0, 100.0, 0.0, 100.0),
            Segment::from_coords(0.0, 100.0, 0.0, 0.0),
        ]
    }

    fn two_rooms() -> Vec<Segment> {
        vec![
            Segment::from_coords(0.0, 0.0, 100.0, 0.0),
            Segment::from_coords(100.0, 0.0, 200.0, 0.0),
            Segment::from_coords(200.0, 0.0, 200.0, 100.0),
            Segment::from_coords(200.0, 100.0, 100.0, 100.0),
            Segment::from_coords(100.0, 100.0, 0.0, 100.0),
            Segment::from_coords(0.0, 100.0, 0.0, 0.0),
            Segment::from_coords(100.0, 0.0, 100.0, 100.0),
        ]
    }

    #[test]
    fn test_square_traces_both_orientations() {
        let graph = Graph::from_walls(&square(), 10.0);
        let walks = trace_faces(&graph, 50);

        assert_eq!(walks.len(), 2);
        for walk in &walks {
            assert_eq!(walk.len(), 5);
            assert_eq!(walk.first(), walk.last());
        }
        assert_eq!(dedupe_mirrored_faces(walks).len(), 1);
    }

    #[test]
    fn test_single_square_room() {
        let graph = Graph::from_walls(&square(), 10.0);
        let detection = detect_rooms(&graph, &RoomConfig::default());

        assert_eq!(detection.rooms.len(), 1);
        let room = &detection.rooms[0];
        assert_relative_eq!(room.area, 10_000.0);
        assert_relative_eq!(room.centroid.x, 50.0);
        assert_relative_eq!(room.centroid.y, 50.0);
        assert_eq!(room.kind, RoomKind::Store);
        assert_eq!(room.polygon.len(), 5);
        assert_eq!(room.polygon.first(), room.polygon.last());
    }

    #[test]
    fn test_outer_face_is_excluded() {
        let graph = Graph::from_walls(&two_rooms(), 10.0);
        let detection = detect_rooms(&graph, &RoomConfig::default());

        assert_eq!(detection.candidate_faces, 4);
        assert_eq!(detection.rooms.len(), 2);
        for room in &detection.rooms {
            assert_relative_eq!(room.area, 10_000.0);
        }
        assert_relative_eq!(detection.rooms[0].centroid.x, 50.0);
        assert_relative_eq!(detection.rooms[1].centroid.x, 150.0);
    }

    #[test]
    fn test_outer_face_excluded_per_wing() {
        let mut walls = two_rooms();
        walls.extend([
            Segment::from_coords(500.0, 0.0, 600.0, 0.0),
            Segment::from_coords(600.0, 0.0, 600.0, 100.0),
            Segment::from_coords(600.0, 100.0, 500.0, 100.0),
            Segment::from_coords(500.0, 100.0, 500.0, 0.0),
        ]);
        let graph = Graph::from_walls(&walls, 10.0);
        let detection = detect_rooms(&graph, &RoomConfig::default());

        assert_eq!(detection.rooms.len(), 3);
        for room in &detection.rooms {
            assert_relative_eq!(room.area, 10_000.0);
        }
        assert_relative_eq!(detection.rooms[2].centroid.x, 550.0);
    }

    #[test]
    fn test_outer_face_kept_when_disabled() {
        let graph = Graph::from_walls(&two_rooms(), 10.0);
        let config = RoomConfig {
            exclude_outer_face: false,
            ..Default::default()
        };
        let detection = detect_rooms(&graph, &config);

        assert_eq!(detection.rooms.len(), 3);
        assert!(detection.rooms.iter().any(|r| (r.area - 20_000.0).abs() < 1e-9));
    }

    #[test]
    fn test_dangling_stub_does_not_block_room() {
        let mut walls = square();
        walls.push(Segment::from_coords(100.0, 100.0, 150.0, 150.0));
        let graph = Graph::from_walls(&walls, 10.0);

        let detection = detect_rooms(&graph, &RoomConfig::default());
        assert_eq!(detection.rooms.len(), 1);
        assert_relative_eq!(detection.rooms[0].area, 10_000.0);
    }

    #[test]
    fn test_step_cap() {
        let graph = Graph::from_walls(&square(), 10.0);
        assert!(trace_faces(&graph, 2).is_empty());
        assert_eq!(trace_faces(&graph, 3).len(), 2);
    }

    #[test]
    fn test_open_chain_has_no_faces() {
        let walls = vec![
            Segment::from_coords(0.0, 0.0, 100.0, 0.0),
            Segment::from_coords(100.0, 0.0, 100.0, 100.0),
            Segment::from_coords(100.0, 100.0, 0.0, 100.0),
        ];
        let graph = Graph::from_walls(&walls, 10.0);
        assert!(trace_faces(&graph, 50).is_empty());
    }

    #[test]
    fn test_small_faces_are_dropped() {
        let walls = vec![
            Segment::from_coords(0.0, 0.0, 40.0, 0.0),
            Segment::from_coords(40.0, 0.0, 40.0, 40.0),
            Segment::from_coords(40.0, 40.0, 0.0, 40.0),
            Segment::from_coords(0.0, 40.0, 0.0, 0.0),
        ];
        let graph = Graph::from_walls(&walls, 10.0);
        let detection = detect_rooms(&graph, &RoomConfig::default());

        assert_eq!(detection.candidate_faces, 2);
        assert!(detection.rooms.is_empty());
    }

    #[test]
    fn test_face_key_ignores_rotation_and_direction() {
        assert_eq!(face_key(&[2, 0, 1, 2]), face_key(&[0, 1, 2, 0]));
        assert_eq!(face_key(&[0, 2, 1, 0]), face_key(&[1, 2, 0, 1]));
        assert_eq!(face_key(&[0, 1, 2, 0]), face_key(&[0, 2, 1, 0]));
    }
}
