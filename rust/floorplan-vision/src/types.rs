// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan vectorization and room recovery

use crate::error::{Error, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in image space (x to the right, y down)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A wall segment between two points.
///
/// The order of `p1`/`p2` is kept for output stability but carries no
/// geometric meaning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub p1: Point2D,
    pub p2: Point2D,
}

impl Segment {
    pub fn new(p1: Point2D, p2: Point2D) -> Self {
        Self { p1, p2 }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point2D::new(x1, y1), Point2D::new(x2, y2))
    }

    pub fn length(&self) -> f64 {
        self.p1.distance_to(&self.p2)
    }

    /// `true` when the X extent dominates the Y extent
    pub fn is_horizontal(&self) -> bool {
        (self.p2.x - self.p1.x).abs() > (self.p2.y - self.p1.y).abs()
    }

    pub fn midpoint(&self) -> Point2D {
        Point2D::new((self.p1.x + self.p2.x) / 2.0, (self.p1.y + self.p2.y) / 2.0)
    }
}

/// A doorway-sized gap left open in a wall run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Opening {
    /// Midpoint of the gap
    pub pos: Point2D,
    /// Gap length along the wall
    pub width: f64,
    /// `true` when the host wall runs vertically
    pub vertical: bool,
}

/// Furniture symbol classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Table,
    Bed,
    Misc,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Table => "Table",
            AssetKind::Bed => "Bed",
            AssetKind::Misc => "Misc",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An isolated symbol recognized as furniture
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Bounding box center
    pub pos: Point2D,
    pub width: f64,
    pub height: f64,
}

/// Coarse room type derived from area and corner count
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RoomKind {
    Store,
    Office,
    Meet,
    #[serde(rename = "L-Hall")]
    LHall,
    Conf,
    Open,
}

impl RoomKind {
    /// Classify by area bracket (square pixels); the 300k-800k bracket is
    /// split by the number of distinct corners, so an L-shaped room (six
    /// corners) is an `LHall` and a rectangle is a `Conf`.
    pub fn classify(area: f64, corners: usize) -> Self {
        if area < 30_000.0 {
            RoomKind::Store
        } else if area < 100_000.0 {
            RoomKind::Office
        } else if area < 300_000.0 {
            RoomKind::Meet
        } else if area < 800_000.0 {
            if corners >= 6 {
                RoomKind::LHall
            } else {
                RoomKind::Conf
            }
        } else {
            RoomKind::Open
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomKind::Store => "Store",
            RoomKind::Office => "Office",
            RoomKind::Meet => "Meet",
            RoomKind::LHall => "L-Hall",
            RoomKind::Conf => "Conf",
            RoomKind::Open => "Open",
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recovered room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    /// Closed boundary: the first vertex repeats as the last
    pub polygon: Vec<Point2D>,
    /// Area in square pixels
    pub area: f64,
    /// Mean of the distinct boundary vertices
    pub centroid: Point2D,
    #[serde(rename = "type")]
    pub kind: RoomKind,
}

impl Room {
    /// Number of distinct corners (the closing repeat is not counted)
    pub fn corner_count(&self) -> usize {
        self.polygon.len().saturating_sub(1)
    }

    /// Calculate polygon area using the shoelace formula.
    ///
    /// Accepts open or closed rings; a closing repeat contributes nothing.
    pub fn calculate_area(points: &[Point2D]) -> f64 {
        let n = points.len();
        if n < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += points[i].x * points[j].y;
            area -= points[j].x * points[i].y;
        }

        (area / 2.0).abs()
    }
}

/// Per-stage counts of one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineStats {
    pub raw_segments: usize,
    pub bridged_segments: usize,
    pub openings: usize,
    pub regularized_lines: usize,
    pub wall_lines: usize,
    pub assets: usize,
    pub graph_nodes: usize,
    pub graph_edges: usize,
    pub candidate_faces: usize,
    pub rooms: usize,
}

/// Complete analysis of one floor plan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FloorPlanAnalysis {
    pub walls: Vec<Segment>,
    pub openings: Vec<Opening>,
    pub assets: Vec<Asset>,
    pub rooms: Vec<Room>,
    pub stats: PipelineStats,
}

impl FloorPlanAnalysis {
    /// `true` when nothing was detected (a valid, empty drawing)
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
            && self.openings.is_empty()
            && self.assets.is_empty()
            && self.rooms.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Pixel-to-centimetre calibration for reporting real-world sizes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Calibration {
    pub cm_per_pixel: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self { cm_per_pixel: 1.0 }
    }
}

impl Calibration {
    const SQFT_PER_CM2: f64 = 0.001_076_39;

    /// Derive the scale from a measured reference: `pixel_distance` pixels in
    /// the drawing correspond to `real_distance_cm` centimetres.
    pub fn from_reference(pixel_distance: f64, real_distance_cm: f64) -> Option<Self> {
        if pixel_distance > 0.0 && real_distance_cm.is_finite() {
            Some(Self {
                cm_per_pixel: real_distance_cm / pixel_distance,
            })
        } else {
            None
        }
    }

    pub fn area_cm2(&self, area_px: f64) -> f64 {
        area_px * self.cm_per_pixel * self.cm_per_pixel
    }

    pub fn area_sqft(&self, area_px: f64) -> f64 {
        self.area_cm2(area_px) * Self::SQFT_PER_CM2
    }

    /// Two-line label: room type, then area in square feet
    pub fn room_label(&self, room: &Room) -> String {
        format!("{}\n{:.1} sq ft", room.kind, self.area_sqft(room.area))
    }
}

/// Aspect/area cut-offs separating furniture symbol types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetThresholds {
    /// Exclusive aspect-ratio range (width / height) for a table
    pub table_aspect_min: f64,
    pub table_aspect_max: f64,
    /// A table's bounding box must be smaller than this
    pub table_max_area: f64,
    /// A bed's aspect ratio lies below `bed_aspect_low` or above `bed_aspect_high`
    pub bed_aspect_low: f64,
    pub bed_aspect_high: f64,
    /// A bed's bounding box must be larger than this
    pub bed_min_area: f64,
}

impl Default for AssetThresholds {
    fn default() -> Self {
        Self {
            table_aspect_min: 0.8,
            table_aspect_max: 1.2,
            table_max_area: 8000.0,
            bed_aspect_low: 0.7,
            bed_aspect_high: 1.4,
            bed_min_area: 6000.0,
        }
    }
}

/// Configuration for the vectorization pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloorPlanConfig {
    /// Darkness threshold (0-1): a pixel is wall when its value < threshold * 255
    pub threshold: f64,
    /// Replace `threshold` with Otsu's level before scanning
    pub auto_threshold: bool,
    /// Radius of the opening that fills light specks inside walls (0 = off)
    pub pinhole_radius: u8,
    /// A dark run must be strictly longer than this to become a segment
    pub min_segment_length: f64,
    /// Distance between scanned rows/columns (pixels)
    pub scan_step: u32,
    /// Distance between samples along a scanned row/column (pixels)
    pub sample_stride: u32,
    /// Grid for bucket keys and orthogonal snapping
    pub snap_grid_size: f64,
    /// Endpoint cluster radius for line welding
    pub weld_radius: f64,
    /// Node merge tolerance for graph construction
    pub node_weld_tolerance: f64,
    /// Minimum length ratio to the largest component for a component to stay wall
    pub island_ratio: f64,
    /// Gaps strictly between 0 and this are bridged
    pub max_bridge_gap: f64,
    /// Gaps strictly between these bounds are reported as openings
    pub door_min_width: f64,
    pub door_max_width: f64,
    /// Regularized lines shorter than this are discarded
    pub min_line_length: f64,
    /// Symbol bounding boxes thinner than this are noise
    pub min_symbol_extent: f64,
    /// Rooms must have an area strictly above this (square pixels)
    pub min_room_area: f64,
    /// Hard cap on steps of a single face trace
    pub max_trace_steps: usize,
    /// Drop the outer boundary face of each wall component when it contains
    /// every other room of that component
    pub exclude_outer_face: bool,
    pub assets: AssetThresholds,
}

impl Default for FloorPlanConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            auto_threshold: false,
            pinhole_radius: 0,
            min_segment_length: 20.0,
            scan_step: 6,
            sample_stride: 2,
            snap_grid_size: 2.0,
            weld_radius: 60.0,
            node_weld_tolerance: 10.0,
            island_ratio: 0.10,
            max_bridge_gap: 80.0,
            door_min_width: 80.0,
            door_max_width: 100.0,
            min_line_length: 10.0,
            min_symbol_extent: 5.0,
            min_room_area: 2000.0,
            max_trace_steps: 50,
            exclude_outer_face: true,
            assets: AssetThresholds::default(),
        }
    }
}

impl FloorPlanConfig {
    /// Check every value before any stage runs
    pub fn validate(&self) -> Result<()> {
        let floats = [
            ("threshold", self.threshold),
            ("min_segment_length", self.min_segment_length),
            ("snap_grid_size", self.snap_grid_size),
            ("weld_radius", self.weld_radius),
            ("node_weld_tolerance", self.node_weld_tolerance),
            ("island_ratio", self.island_ratio),
            ("max_bridge_gap", self.max_bridge_gap),
            ("door_min_width", self.door_min_width),
            ("door_max_width", self.door_max_width),
            ("min_line_length", self.min_line_length),
            ("min_symbol_extent", self.min_symbol_extent),
            ("min_room_area", self.min_room_area),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(Error::config(field, format!("must be finite, got {value}")));
            }
        }

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::config("threshold", "must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.island_ratio) {
            return Err(Error::config("island_ratio", "must be within 0..=1"));
        }

        for (field, value) in [
            ("snap_grid_size", self.snap_grid_size),
            ("weld_radius", self.weld_radius),
            ("node_weld_tolerance", self.node_weld_tolerance),
        ] {
            if value <= 0.0 {
                return Err(Error::config(field, format!("must be positive, got {value}")));
            }
        }

        for (field, value) in [
            ("min_segment_length", self.min_segment_length),
            ("max_bridge_gap", self.max_bridge_gap),
            ("min_line_length", self.min_line_length),
            ("min_symbol_extent", self.min_symbol_extent),
            ("min_room_area", self.min_room_area),
        ] {
            if value < 0.0 {
                return Err(Error::config(field, format!("must not be negative, got {value}")));
            }
        }

        if self.scan_step == 0 {
            return Err(Error::config("scan_step", "must be at least 1"));
        }
        if self.sample_stride == 0 {
            return Err(Error::config("sample_stride", "must be at least 1"));
        }
        if self.max_trace_steps == 0 {
            return Err(Error::config("max_trace_steps", "must be at least 1"));
        }

        // Bridged and reported gap windows must never overlap
        if self.door_min_width < self.max_bridge_gap {
            return Err(Error::config(
                "door_min_width",
                format!(
                    "must be >= max_bridge_gap ({} < {})",
                    self.door_min_width, self.max_bridge_gap
                ),
            ));
        }
        if self.door_max_width <= self.door_min_width {
            return Err(Error::config(
                "door_max_width",
                format!(
                    "must exceed door_min_width ({} <= {})",
                    self.door_max_width, self.door_min_width
                ),
            ));
        }

        Ok(())
    }
}
