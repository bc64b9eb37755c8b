use ndarray::Array3;

use crate::geometry::Point2D;

/// Index of the depth coordinate in the last axis of a sample grid.
pub const DEPTH: usize = 0;
/// Index of the height (face `y`) coordinate.
pub const Y: usize = 1;
/// Index of the width (face `x`) coordinate.
pub const X: usize = 2;

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        step.mul_add(i as f64, start)
                    }
                })
                .collect()
        }
    }
}

/// Points sampled along the slicing line, `p1` first and `p2` last.
pub fn line_samples(p1: Point2D, p2: Point2D, count: usize) -> Vec<Point2D> {
    linspace(p1.x, p2.x, count)
        .into_iter()
        .zip(linspace(p1.y, p2.y, count))
        .map(|(x, y)| Point2D::new(x, y))
        .collect()
}

/// Volume coordinates `[depth, y, x]` for every pixel of a slice between `p1`
/// and `p2`, shaped `(output_w, output_h, 3)`.
///
/// The line is sampled `output_w` times and so is depth, over
/// `[0, output_w - 1]`. Pixels are laid out as if a flat run of
/// `output_w * output_h` samples cycled through the line samples while
/// advancing one depth sample every `output_h` pixels. For square outputs
/// this makes each row one depth and each column one point along the line.
pub fn build_sample_grid(p1: Point2D, p2: Point2D, output_size: (usize, usize)) -> Array3<f64> {
    let (output_w, output_h) = output_size;
    let line = line_samples(p1, p2, output_w);
    let depth = linspace(0.0, output_w.saturating_sub(1) as f64, output_w);

    let mut grid = Array3::<f64>::zeros((output_w, output_h, 3));
    for ((row, col, axis), value) in grid.indexed_iter_mut() {
        let flat = row * output_h + col;
        let point = line[flat % output_w];
        *value = match axis {
            DEPTH => depth[flat / output_h],
            Y => point.y,
            _ => point.x,
        };
    }
    grid
}
