// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gap handling along wall runs
//!
//! Segments are bucketed by their quantized perpendicular coordinate, so every
//! bucket holds the intervals of one wall line. Two detectors walk the sorted
//! intervals of each bucket with disjoint gap windows:
//! - [`bridge_gaps`] closes small scan artifacts by adding bridging segments
//! - [`detect_openings`] reports doorway-sized gaps and leaves them open

use crate::types::{Opening, Point2D, Segment};
use std::collections::BTreeMap;

/// Intervals along one wall line, keyed by quantized perpendicular coordinate
type Buckets = BTreeMap<i64, Vec<(f64, f64)>>;

/// Segments grouped into horizontal and vertical wall lines
#[derive(Debug, Default)]
struct WallLines {
    horizontal: Buckets,
    vertical: Buckets,
    grid: f64,
}

impl WallLines {
    fn build(segments: &[Segment], grid: f64) -> Self {
        let mut lines = WallLines {
            grid,
            ..Default::default()
        };

        for seg in segments {
            let (p1, p2) = (seg.p1, seg.p2);
            if seg.is_horizontal() {
                let key = quantize(p1.y, grid);
                lines
                    .horizontal
                    .entry(key)
                    .or_default()
                    .push(ordered(p1.x, p2.x));
            } else {
                let key = quantize(p1.x, grid);
                lines
                    .vertical
                    .entry(key)
                    .or_default()
                    .push(ordered(p1.y, p2.y));
            }
        }

        for intervals in lines
            .horizontal
            .values_mut()
            .chain(lines.vertical.values_mut())
        {
            intervals.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        }

        lines
    }

    /// Perpendicular coordinate of a bucket
    fn axis(&self, key: i64) -> f64 {
        key as f64 * self.grid
    }
}

fn quantize(value: f64, grid: f64) -> i64 {
    (value / grid).round() as i64
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Point on a wall line: `along` runs with the wall, `axis` across it
fn on_line(axis: f64, along: f64, vertical: bool) -> Point2D {
    if vertical {
        Point2D::new(axis, along)
    } else {
        Point2D::new(along, axis)
    }
}

/// Close small gaps between consecutive intervals of each wall line.
///
/// Returns the input followed by the bridging segments (horizontal lines
/// first, each in ascending key order). A gap is bridged when it is strictly
/// between 0 and `max_gap`.
pub fn bridge_gaps(segments: &[Segment], grid: f64, max_gap: f64) -> Vec<Segment> {
    let lines = WallLines::build(segments, grid);
    let mut out = segments.to_vec();

    for (buckets, vertical) in [(&lines.horizontal, false), (&lines.vertical, true)] {
        for (&key, intervals) in buckets {
            let axis = lines.axis(key);
            for pair in intervals.windows(2) {
                let current_end = pair[0].1;
                let next_start = pair[1].0;
                let gap = next_start - current_end;
                if gap > 0.0 && gap < max_gap {
                    out.push(Segment::new(
                        on_line(axis, current_end, vertical),
                        on_line(axis, next_start, vertical),
                    ));
                }
            }
        }
    }

    out
}

/// Report doorway-sized gaps along each wall line.
///
/// Each interval start is compared with the furthest end seen so far in the
/// bucket, so overlapping intervals never produce a gap. A gap is reported
/// when it lies strictly between `min_width` and `max_width`.
pub fn detect_openings(
    segments: &[Segment],
    grid: f64,
    min_width: f64,
    max_width: f64,
) -> Vec<Opening> {
    let lines = WallLines::build(segments, grid);
    let mut openings = Vec::new();

    for (buckets, vertical) in [(&lines.horizontal, false), (&lines.vertical, true)] {
        for (&key, intervals) in buckets {
            let Some(&(_, first_end)) = intervals.first() else {
                continue;
            };
            let axis = lines.axis(key);
            let mut reach = first_end;

            for &(start, end) in &intervals[1..] {
                let gap = start - reach;
                if gap > min_width && gap < max_width {
                    openings.push(Opening {
                        pos: on_line(axis, reach + gap * 0.5, vertical),
                        width: gap,
                        vertical,
                    });
                }
                if end > reach {
                    reach = end;
                }
            }
        }
    }

    openings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_wall(gap: f64) -> Vec<Segment> {
        vec![
            Segment::from_coords(0.0, 10.0, 100.0, 10.0),
            Segment::from_coords(100.0 + gap, 10.0, 200.0, 10.0),
        ]
    }

    #[test]
    fn test_bridge_boundary() {
        let eps = 1e-6;

        let bridged = bridge_gaps(&split_wall(80.0 - eps), 2.0, 80.0);
        assert_eq!(bridged.len(), 3);
        let bridge = bridged[2];
        assert!((bridge.p1.x - 100.0).abs() < 1e-9);
        assert!((bridge.p2.x - (180.0 - eps)).abs() < 1e-9);
        assert!((bridge.p1.y - 10.0).abs() < 1e-9);

        assert_eq!(bridge_gaps(&split_wall(80.0 + eps), 2.0, 80.0).len(), 2);
    }

    #[test]
    fn test_bridge_keeps_input_and_ignores_overlap() {
        let segments = vec![
            Segment::from_coords(0.0, 10.0, 100.0, 10.0),
            Segment::from_coords(50.0, 10.0, 150.0, 10.0),
        ];
        let bridged = bridge_gaps(&segments, 2.0, 80.0);
        assert_eq!(bridged, segments);
    }

    #[test]
    fn test_vertical_bridge() {
        let segments = vec![
            Segment::from_coords(40.0, 0.0, 40.0, 50.0),
            Segment::from_coords(40.5, 60.0, 40.5, 120.0),
        ];
        let bridged = bridge_gaps(&segments, 2.0, 80.0);
        assert_eq!(bridged.len(), 3);
        assert_eq!(bridged[2], Segment::from_coords(40.0, 50.0, 40.0, 60.0));
    }

    #[test]
    fn test_detect_door_gap() {
        let openings = detect_openings(&split_wall(90.0), 2.0, 80.0, 100.0);
        assert_eq!(openings.len(), 1);
        assert!((openings[0].pos.x - 145.0).abs() < 1e-9);
        assert!((openings[0].pos.y - 10.0).abs() < 1e-9);
        assert!((openings[0].width - 90.0).abs() < 1e-9);
        assert!(!openings[0].vertical);
    }

    #[test]
    fn test_gap_outside_door_window() {
        assert!(detect_openings(&split_wall(50.0), 2.0, 80.0, 100.0).is_empty());
        assert!(detect_openings(&split_wall(120.0), 2.0, 80.0, 100.0).is_empty());
    }

    #[test]
    fn test_bridged_gap_is_not_reported() {
        let bridged = bridge_gaps(&split_wall(60.0), 2.0, 80.0);
        assert!(detect_openings(&bridged, 2.0, 80.0, 100.0).is_empty());
    }

    #[test]
    fn test_contained_interval_does_not_fake_gap() {
        // 150 - 60 would look like a door, but the long interval covers it
        let segments = vec![
            Segment::from_coords(0.0, 0.0, 300.0, 0.0),
            Segment::from_coords(20.0, 0.0, 60.0, 0.0),
            Segment::from_coords(150.0, 0.0, 400.0, 0.0),
        ];
        assert!(detect_openings(&segments, 2.0, 80.0, 100.0).is_empty());
    }

    #[test]
    fn test_vertical_opening() {
        let segments = vec![
            Segment::from_coords(20.0, 0.0, 20.0, 100.0),
            Segment::from_coords(20.0, 185.0, 20.0, 300.0),
        ];
        let openings = detect_openings(&segments, 2.0, 80.0, 100.0);
        assert_eq!(openings.len(), 1);
        assert!(openings[0].vertical);
        assert!((openings[0].pos.x - 20.0).abs() < 1e-9);
        assert!((openings[0].pos.y - 142.5).abs() < 1e-9);
    }
}
