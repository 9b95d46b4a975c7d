// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line regularization: orthogonal snapping and endpoint welding
//!
//! 1. Orthogonalize: force each segment onto its dominant axis, snapping the
//!    shared coordinate to the grid.
//! 2. Weld: merge endpoints into clusters. A point joins the *first* cluster
//!    (in creation order) whose running centroid lies within the weld radius,
//!    not the nearest one.
//! 3. Canonicalize: clusters joined by a horizontal segment share one Y,
//!    clusters joined by a vertical segment share one X. For an isolated
//!    segment this is the midpoint of its endpoints' perpendicular coordinate.
//! 4. Discard degenerate and short lines.

use crate::types::{Point2D, Segment};

/// Snap every segment onto its dominant axis
pub fn orthogonalize(segments: &[Segment], grid: f64) -> Vec<Segment> {
    segments
        .iter()
        .map(|seg| {
            let (p1, p2) = (seg.p1, seg.p2);
            let mid = seg.midpoint();
            if seg.is_horizontal() {
                let y = snap_to_grid(mid.y, grid);
                Segment::new(Point2D::new(p1.x, y), Point2D::new(p2.x, y))
            } else {
                let x = snap_to_grid(mid.x, grid);
                Segment::new(Point2D::new(x, p1.y), Point2D::new(x, p2.y))
            }
        })
        .collect()
}

fn snap_to_grid(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}

/// Endpoint clusters built with a first-match running-centroid policy.
///
/// Owned by a single regularization call.
#[derive(Debug, Clone, Default)]
pub struct EndpointClusters {
    centroids: Vec<Point2D>,
    sums: Vec<(f64, f64)>,
    counts: Vec<usize>,
    /// Cluster index of every input point
    membership: Vec<usize>,
}

impl EndpointClusters {
    /// Cluster `points` in order
    pub fn weld(points: &[Point2D], radius: f64) -> Self {
        let mut clusters = Self::default();

        for point in points {
            let found = clusters
                .centroids
                .iter()
                .position(|c| point.distance_to(c) < radius);

            let index = match found {
                Some(index) => {
                    let sum = &mut clusters.sums[index];
                    sum.0 += point.x;
                    sum.1 += point.y;
                    clusters.counts[index] += 1;
                    let n = clusters.counts[index] as f64;
                    clusters.centroids[index] = Point2D::new(sum.0 / n, sum.1 / n);
                    index
                }
                None => {
                    clusters.centroids.push(*point);
                    clusters.sums.push((point.x, point.y));
                    clusters.counts.push(1);
                    clusters.centroids.len() - 1
                }
            };
            clusters.membership.push(index);
        }

        clusters
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Cluster that absorbed the `point_index`-th input point
    pub fn cluster_of(&self, point_index: usize) -> usize {
        self.membership[point_index]
    }

    pub fn centroid(&self, cluster: usize) -> Point2D {
        self.centroids[cluster]
    }

    /// Welded position of the `point_index`-th input point
    pub fn position_of(&self, point_index: usize) -> Point2D {
        self.centroids[self.membership[point_index]]
    }
}

/// Union-find over cluster indices; roots are always the smallest member
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }

    /// Mean of `value` over each member's group
    fn group_means(&mut self, value: impl Fn(usize) -> f64) -> Vec<f64> {
        let n = self.parent.len();
        let mut sums = vec![0.0; n];
        let mut counts = vec![0usize; n];
        let roots: Vec<usize> = (0..n).map(|i| self.find(i)).collect();

        for (i, &root) in roots.iter().enumerate() {
            sums[root] += value(i);
            counts[root] += 1;
        }

        roots
            .iter()
            .map(|&root| sums[root] / counts[root] as f64)
            .collect()
    }
}

/// Orthogonalize, weld and canonicalize raw segments into clean wall lines
pub fn regularize_lines(
    segments: &[Segment],
    grid: f64,
    weld_radius: f64,
    min_length: f64,
) -> Vec<Segment> {
    let ortho = orthogonalize(segments, grid);
    let points: Vec<Point2D> = ortho.iter().flat_map(|s| [s.p1, s.p2]).collect();
    let clusters = EndpointClusters::weld(&points, weld_radius);
    if clusters.is_empty() {
        return Vec::new();
    }

    // (cluster a, cluster b, horizontal) for every line surviving the weld
    let survivors: Vec<(usize, usize, bool)> = (0..ortho.len())
        .filter_map(|i| {
            let a = clusters.cluster_of(2 * i);
            let b = clusters.cluster_of(2 * i + 1);
            if a == b {
                return None;
            }
            let welded = Segment::new(clusters.centroid(a), clusters.centroid(b));
            if welded.length() < min_length {
                return None;
            }
            Some((a, b, welded.is_horizontal()))
        })
        .collect();

    let mut rows = DisjointSet::new(clusters.len());
    let mut columns = DisjointSet::new(clusters.len());
    for &(a, b, horizontal) in &survivors {
        if horizontal {
            rows.union(a, b);
        } else {
            columns.union(a, b);
        }
    }
    let shared_y = rows.group_means(|c| clusters.centroid(c).y);
    let shared_x = columns.group_means(|c| clusters.centroid(c).x);

    let position = |c: usize| Point2D::new(shared_x[c], shared_y[c]);

    survivors
        .iter()
        .map(|&(a, b, _)| Segment::new(position(a), position(b)))
        .filter(|line| line.length() >= min_length)
        .collect()
}

/// Calculate perpendicular distance from a point to a line segment
pub fn point_to_line_distance(point: &Point2D, line_start: &Point2D, line_end: &Point2D) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-10 {
        return point.distance_to(line_start);
    }

    // Project point onto line and calculate perpendicular distance
    let t = ((point.x - line_start.x) * dx + (point.y - line_start.y) * dy) / length_sq;
    let t = t.clamp(0.0, 1.0);

    let proj_x = line_start.x + t * dx;
    let proj_y = line_start.y + t * dy;

    let px = point.x - proj_x;
    let py = point.y - proj_y;
    (px * px + py * py).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_line_distance() {
        let start = Point2D::new(0.0, 0.0);
        let end = Point2D::new(10.0, 0.0);
        let point = Point2D::new(5.0, 5.0);

        let dist = point_to_line_distance(&point, &start, &end);
        assert!((dist - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_orthogonalize_snaps_to_grid() {
        let lines = vec![
            Segment::from_coords(0.0, 9.0, 50.0, 12.0),
            Segment::from_coords(31.0, 0.0, 32.6, 40.0),
        ];
        let ortho = orthogonalize(&lines, 2.0);

        assert_eq!(ortho[0], Segment::from_coords(0.0, 10.0, 50.0, 10.0));
        assert_eq!(ortho[1], Segment::from_coords(32.0, 0.0, 32.0, 40.0));
    }

    #[test]
    fn test_weld_is_first_match() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(50.0, 0.0),
            // Nearer to the second cluster, but the first one also qualifies
            Point2D::new(26.0, 0.0),
        ];
        let clusters = EndpointClusters::weld(&points, 30.0);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.cluster_of(2), 0);
        assert_eq!(clusters.centroid(0), Point2D::new(13.0, 0.0));
        assert_eq!(clusters.position_of(0), clusters.position_of(2));
    }

    #[test]
    fn test_empty_input() {
        assert!(EndpointClusters::weld(&[], 60.0).is_empty());
        assert!(regularize_lines(&[], 2.0, 60.0, 10.0).is_empty());
    }

    #[test]
    fn test_welded_corner_is_exact() {
        let lines = vec![
            Segment::from_coords(0.0, 0.0, 100.0, 1.0),
            Segment::from_coords(101.0, 3.0, 100.0, 100.0),
        ];
        let regular = regularize_lines(&lines, 2.0, 60.0, 10.0);

        assert_eq!(regular.len(), 2);
        assert_eq!(regular[0].p2, regular[1].p1);
        assert_eq!(regular[0].p1.y, regular[0].p2.y);
        assert_eq!(regular[1].p1.x, regular[1].p2.x);
    }

    #[test]
    fn test_square_stays_square() {
        let lines = vec![
            Segment::from_coords(0.0, 0.0, 100.0, 0.0),
            Segment::from_coords(100.0, 0.0, 100.0, 100.0),
            Segment::from_coords(100.0, 100.0, 0.0, 100.0),
            Segment::from_coords(0.0, 100.0, 0.0, 0.0),
        ];
        let regular = regularize_lines(&lines, 2.0, 60.0, 10.0);
        assert_eq!(regular, lines);
    }

    #[test]
    fn test_short_and_collapsed_lines_are_dropped() {
        let lines = vec![
            Segment::from_coords(0.0, 0.0, 200.0, 0.0),
            // Both ends weld into the same cluster
            Segment::from_coords(300.0, 0.0, 303.0, 0.0),
            // Survives welding but stays shorter than the minimum
            Segment::from_coords(400.0, 0.0, 400.0, 6.0),
        ];
        let regular = regularize_lines(&lines, 2.0, 5.0, 10.0);
        assert_eq!(regular, vec![Segment::from_coords(0.0, 0.0, 200.0, 0.0)]);
    }
}
