// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan vectorization and room-graph recovery
//!
//! This crate turns a raster floor plan into structured data:
//! 1. Scan rows and columns for dark runs (raw wall segments)
//! 2. Bridge small gaps and report doorway-sized ones as openings
//! 3. Regularize lines: orthogonal snapping and endpoint welding
//! 4. Separate wall lines from furniture symbols
//! 5. Build a planar graph of the walls
//! 6. Trace closed faces and classify them as rooms
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_vision::{analyze_grayscale_buffer, FloorPlanConfig};
//!
//! let analysis = analyze_grayscale_buffer(&pixels, width, height, &FloorPlanConfig::default())?;
//! for room in &analysis.rooms {
//!     println!("{} at ({:.0}, {:.0})", room.kind, room.centroid.x, room.centroid.y);
//! }
//! ```

pub mod error;
pub mod image_ops;
pub mod line_ops;
pub mod room_detector;
pub mod room_graph;
pub mod scanner;
pub mod types;
pub mod wall_detector;
pub mod wall_filter;

// Re-export commonly used types and functions
pub use error::{Error, Result};
pub use image_ops::{grayscale_from_raw, rgba_to_grayscale};
pub use room_detector::{detect_rooms, RoomConfig, RoomDetection};
pub use room_graph::Graph;
pub use scanner::{scan_segments, ScanParams};
pub use types::{
    Asset, AssetKind, AssetThresholds, Calibration, FloorPlanAnalysis, FloorPlanConfig, Opening,
    PipelineStats, Point2D, Room, RoomKind, Segment,
};
pub use wall_detector::{bridge_gaps, detect_openings};
pub use wall_filter::{classify_symbol, separate_symbols, SymbolFilterConfig};

use image::GrayImage;

/// Run the full pipeline on a grayscale image
///
/// The configuration is validated before any stage runs. A drawing with no
/// dark strokes is not an error: it yields an empty analysis.
pub fn analyze_floor_plan(image: &GrayImage, config: &FloorPlanConfig) -> Result<FloorPlanAnalysis> {
    config.validate()?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage { width, height });
    }

    let threshold = if config.auto_threshold {
        let level = image_ops::otsu_threshold_fraction(image);
        tracing::debug!(threshold = level, "Using Otsu threshold");
        level
    } else {
        config.threshold
    };

    let filled;
    let image = if config.pinhole_radius > 0 {
        filled = image_ops::fill_pinholes(image, config.pinhole_radius);
        &filled
    } else {
        image
    };

    let params = ScanParams {
        threshold,
        min_segment_length: config.min_segment_length,
        scan_step: config.scan_step,
        sample_stride: config.sample_stride,
    };
    let raw = scan_segments(image, &params);

    tracing::info!(
        width,
        height,
        raw_segments = raw.len(),
        "Scanned floor plan"
    );

    run_stages(raw, config)
}

/// Run the pipeline on a row-major 8-bit grayscale buffer
pub fn analyze_grayscale_buffer(
    buffer: &[u8],
    width: u32,
    height: u32,
    config: &FloorPlanConfig,
) -> Result<FloorPlanAnalysis> {
    let image = grayscale_from_raw(buffer, width, height)?;
    analyze_floor_plan(&image, config)
}

/// Run the pipeline on RGBA pixel data (4 bytes per pixel)
pub fn analyze_floor_plan_from_rgba(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &FloorPlanConfig,
) -> Result<FloorPlanAnalysis> {
    let image = rgba_to_grayscale(rgba, width, height)?;
    analyze_floor_plan(&image, config)
}

/// Run every stage after scanning on already extracted raw segments
///
/// Useful for vector sources (or tests) that provide segments directly.
pub fn analyze_segments(raw: &[Segment], config: &FloorPlanConfig) -> Result<FloorPlanAnalysis> {
    config.validate()?;
    run_stages(raw.to_vec(), config)
}

fn run_stages(raw: Vec<Segment>, config: &FloorPlanConfig) -> Result<FloorPlanAnalysis> {
    let grid = config.snap_grid_size;
    let mut stats = PipelineStats {
        raw_segments: raw.len(),
        ..Default::default()
    };

    if raw.is_empty() {
        tracing::debug!("No dark runs found, returning empty analysis");
        return Ok(FloorPlanAnalysis::default());
    }

    // Openings are measured on the bridged set, so scan artifacts never
    // split a doorway into two reported gaps
    let bridged = bridge_gaps(&raw, grid, config.max_bridge_gap);
    let openings = detect_openings(
        &bridged,
        grid,
        config.door_min_width,
        config.door_max_width,
    );
    stats.bridged_segments = bridged.len();
    stats.openings = openings.len();
    tracing::debug!(
        bridged = stats.bridged_segments,
        openings = stats.openings,
        "Bridged gaps"
    );

    let regular =
        line_ops::regularize_lines(&bridged, grid, config.weld_radius, config.min_line_length);
    stats.regularized_lines = regular.len();
    tracing::debug!(lines = stats.regularized_lines, "Regularized lines");

    let symbol_config = SymbolFilterConfig {
        island_ratio: config.island_ratio,
        min_symbol_extent: config.min_symbol_extent,
        assets: config.assets.clone(),
    };
    let separated = separate_symbols(&regular, &symbol_config);
    stats.wall_lines = separated.walls.len();
    stats.assets = separated.assets.len();

    tracing::debug!(
        components = separated.stats.components,
        wall_components = separated.stats.wall_components,
        symbols = separated.stats.symbol_components,
        noise = separated.stats.noise_components,
        "Separated walls from symbols"
    );

    let graph = Graph::from_walls(&separated.walls, config.node_weld_tolerance);
    stats.graph_nodes = graph.node_count();
    stats.graph_edges = graph.edge_count();
    tracing::debug!(
        nodes = stats.graph_nodes,
        edges = stats.graph_edges,
        "Built wall graph"
    );

    let room_config = RoomConfig {
        min_room_area: config.min_room_area,
        max_trace_steps: config.max_trace_steps,
        exclude_outer_face: config.exclude_outer_face,
    };
    let detection = detect_rooms(&graph, &room_config);
    stats.candidate_faces = detection.candidate_faces;
    stats.rooms = detection.rooms.len();

    tracing::info!(
        walls = stats.wall_lines,
        openings = stats.openings,
        assets = stats.assets,
        candidate_faces = stats.candidate_faces,
        rooms = stats.rooms,
        "Floor plan analysis complete"
    );

    Ok(FloorPlanAnalysis {
        walls: separated.walls,
        openings,
        assets: separated.assets,
        rooms: detection.rooms,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn draw_rect(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }

    /// One room, walls 6 px thick and aligned with the scan lattice
    fn create_simple_floor_plan_image() -> GrayImage {
        let mut img = GrayImage::from_pixel(240, 240, Luma([255]));
        draw_rect(&mut img, 36, 36, 204, 42); // top
        draw_rect(&mut img, 36, 198, 204, 204); // bottom
        draw_rect(&mut img, 36, 36, 42, 204); // left
        draw_rect(&mut img, 198, 36, 204, 204); // right
        img
    }

    #[test]
    fn test_full_pipeline() {
        let img = create_simple_floor_plan_image();
        let analysis = analyze_floor_plan(&img, &FloorPlanConfig::default()).unwrap();

        assert_eq!(analysis.stats.raw_segments, 4);
        assert_eq!(analysis.walls.len(), 4);
        assert_eq!(analysis.stats.graph_nodes, 4);
        assert_eq!(analysis.rooms.len(), 1);

        // Corners weld to the mean of the row and column runs
        let room = &analysis.rooms[0];
        assert!((room.area - 165.0 * 165.0).abs() < 1e-9);
        assert_eq!(room.kind, RoomKind::Store);
        assert_eq!(room.polygon.first(), room.polygon.last());
    }

    #[test]
    fn test_blank_image_is_empty() {
        let pixels = vec![255u8; 100 * 80];
        let analysis =
            analyze_grayscale_buffer(&pixels, 100, 80, &FloorPlanConfig::default()).unwrap();

        assert!(analysis.is_empty());
        assert_eq!(analysis.stats, PipelineStats::default());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = analyze_grayscale_buffer(&[], 0, 10, &FloorPlanConfig::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyImage { width: 0, height: 10 }));
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let err = analyze_grayscale_buffer(&[0u8; 10], 4, 4, &FloorPlanConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSizeMismatch {
                expected: 16,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_invalid_config_rejected_before_scanning() {
        let config = FloorPlanConfig {
            door_min_width: 50.0,
            ..Default::default()
        };
        let img = create_simple_floor_plan_image();
        let err = analyze_floor_plan(&img, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig {
                field: "door_min_width",
                ..
            }
        ));
    }

    #[test]
    fn test_buffer_entry_points_still_validate_config() {
        let config = FloorPlanConfig {
            scan_step: 0,
            ..Default::default()
        };
        let pixels = vec![255u8; 16];
        assert!(matches!(
            analyze_grayscale_buffer(&pixels, 4, 4, &config),
            Err(Error::InvalidConfig { field: "scan_step", .. })
        ));

        let rgba = vec![255u8; 64];
        assert!(matches!(
            analyze_floor_plan_from_rgba(&rgba, 4, 4, &config),
            Err(Error::InvalidConfig { field: "scan_step", .. })
        ));
    }

    #[test]
    fn test_rgba_entry_point() {
        let rgba: Vec<u8> = [255u8, 255, 255, 255].repeat(50 * 50);
        let analysis =
            analyze_floor_plan_from_rgba(&rgba, 50, 50, &FloorPlanConfig::default()).unwrap();
        assert!(analysis.is_empty());
    }
}
