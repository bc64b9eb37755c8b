mod config;

use std::fs;

use ndarray::Array3;
use radial_slice::{RadialSlicer, Volume, center_column};

use config::AppConfig;

/// Layered test scan: bands along depth that bend with distance from the
/// face center, so slices at different angles are told apart easily.
fn synthetic_volume(depth: usize, height: usize, width: usize) -> Array3<u16> {
    let cy = height as f64 / 2.0;
    let cx = width as f64 / 2.0;
    Array3::from_shape_fn((depth, height, width), |(d, h, w)| {
        let radius = (h as f64 - cy).hypot(w as f64 - cx);
        let phase = d as f64 / 6.0 + radius * 0.05 + (w as f64 / 40.0).sin();
        (30_000.0 * (1.0 + phase.sin())) as u16
    })
}

fn main() {
    env_logger::init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config: {e}. Using defaults.");
        AppConfig::default()
    });

    let shape = &config.volume;
    let data = synthetic_volume(shape.depth, shape.height, shape.width);
    let volume = Volume::new(data.view()).expect("should have a non-empty volume");
    let slices = RadialSlicer::new(&volume, config.slicing.clone())
        .and_then(|slicer| slicer.slice(&config.angles))
        .expect("should have sliced the volume");

    if let Some(dir) = &config.output.directory {
        fs::create_dir_all(dir).expect("should have created the output directory");
    }

    for (index, slice) in &slices {
        log::info!(
            "slice {index}: {:>6.1} deg, p1 ({:.1}, {:.1}), p2 ({:.1}, {:.1}), center at column {:.1}",
            slice.angle,
            slice.p1.x,
            slice.p1.y,
            slice.p2.x,
            slice.p2.y,
            center_column(slice)
        );
        if let Some(dir) = &config.output.directory {
            let path = dir.join(format!("slice_{index:03}.png"));
            match slice.to_image().map(|image| image.save(&path)) {
                Some(Ok(())) => {}
                Some(Err(e)) => log::error!("Failed to write {}: {e}", path.display()),
                None => log::error!("Slice {index} has no pixels"),
            }
        }
    }
}
