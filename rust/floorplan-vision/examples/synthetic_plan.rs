// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Analyze a synthetic floor plan and print the result as JSON
//!
//! Run with: cargo run -p floorplan-vision --example synthetic_plan

use floorplan_vision::{analyze_floor_plan, Calibration, FloorPlanConfig};
use image::{GrayImage, Luma};

fn main() -> floorplan_vision::Result<()> {
    let image = create_synthetic_floor_plan();
    let analysis = analyze_floor_plan(&image, &FloorPlanConfig::default())?;

    println!("=== Synthetic floor plan ===");
    println!("  Walls:    {}", analysis.walls.len());
    println!("  Openings: {}", analysis.openings.len());
    println!("  Assets:   {}", analysis.assets.len());
    println!("  Rooms:    {}", analysis.rooms.len());

    // 1 px = 2 cm
    let calibration = Calibration { cm_per_pixel: 2.0 };
    for room in &analysis.rooms {
        println!(
            "    {} at ({:.0}, {:.0})",
            calibration.room_label(room).replace('\n', ", "),
            room.centroid.x,
            room.centroid.y
        );
    }

    println!("\n{}", analysis.to_json()?);
    Ok(())
}

fn fill(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, Luma([0]));
        }
    }
}

/// 600x400 plan: exterior walls, a partition with a doorway, a table
fn create_synthetic_floor_plan() -> GrayImage {
    let mut img = GrayImage::from_pixel(640, 440, Luma([255]));

    // Exterior walls
    fill(&mut img, 20, 20, 620, 26);
    fill(&mut img, 20, 414, 620, 420);
    fill(&mut img, 20, 20, 26, 420);
    fill(&mut img, 614, 20, 620, 420);

    // Partition with a 90 px doorway
    fill(&mut img, 318, 20, 324, 200);
    fill(&mut img, 318, 290, 324, 420);

    // Table outline
    fill(&mut img, 120, 150, 160, 152);
    fill(&mut img, 120, 188, 160, 190);
    fill(&mut img, 120, 150, 122, 190);
    fill(&mut img, 158, 150, 160, 190);

    img
}
