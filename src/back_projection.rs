//! Maps pixels picked on a slice image back onto the volume.
//!
//! Pixels are resolved through the same flat layout the sample grid uses, so a
//! back-projected coordinate is exactly where the pixel was sampled. For square
//! outputs column `u` runs along the slicing line from `p1` to `p2`; row `v` is
//! always the depth sample.

use crate::error::{Result, SliceError};
use crate::geometry::Point2D;
use crate::slicer::SliceRecord;

/// Face-plane position of pixel `(u, v)` of `record`.
///
/// Pixel `(u, v)` is flat sample `v * output_h + u`, which sits on line sample
/// `(v * output_h + u) % output_w`. For square outputs `u = 0` lands on `p1`
/// and `u = output_w - 1` on `p2`. An unset pixel (`None` or `(0, 0)`) yields
/// `(0, 0)`.
///
/// # Errors
///
/// [`SliceError::PixelOutOfRange`] unless the pixel lies on the image.
pub fn back_project(record: &SliceRecord, pixel: Option<(f64, f64)>) -> Result<Point2D> {
    let Some((u, v)) = pixel.filter(|&p| p != (0.0, 0.0)) else {
        return Ok(Point2D::default());
    };
    let (rows, cols) = record.image.dim();
    if !(0.0..cols as f64).contains(&u) || !(0.0..rows as f64).contains(&v) {
        return Err(SliceError::PixelOutOfRange {
            pixel: (u, v),
            shape: (rows, cols),
        });
    }
    // rows == output_w line samples, cols == output_h pixels per depth step
    let flat = v.floor().mul_add(cols as f64, u);
    let sample = flat % rows as f64;
    Ok(record.p1.lerp(record.p2, line_parameter(sample, rows)))
}

/// Volume coordinate `[depth, y, x]` of pixel `(u, v)`.
///
/// An unset pixel yields the origin.
pub fn back_project_volume(record: &SliceRecord, pixel: Option<(f64, f64)>) -> Result<[f64; 3]> {
    let point = back_project(record, pixel)?;
    let depth = pixel.map_or(0.0, |(_, v)| v);
    Ok([depth, point.y, point.x])
}

/// Line sample at which the rotation center sits. This is its image column
/// for square outputs.
pub fn center_column(record: &SliceRecord) -> f64 {
    let (output_w, _) = record.output_size();
    let length = record.p1.distance(record.p2);
    if length == 0.0 || output_w < 2 {
        return 0.0;
    }
    record.p1.distance(record.rotate_center) / length * (output_w - 1) as f64
}

#[inline]
fn line_parameter(sample: f64, output_w: usize) -> f64 {
    if output_w > 1 {
        sample / (output_w - 1) as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn record(p1: Point2D, p2: Point2D, center: Point2D, size: (usize, usize)) -> SliceRecord {
        SliceRecord {
            angle: 30.0,
            image: Array2::zeros(size),
            rotate_center: center,
            p1,
            p2,
        }
    }

    #[test]
    fn unset_pixel_maps_to_origin() {
        let r = record(Point2D::new(3.0, 4.0), Point2D::new(9.0, 1.0), Point2D::new(6.0, 2.5), (8, 8));
        assert_eq!(back_project(&r, None).unwrap(), Point2D::new(0.0, 0.0));
        assert_eq!(back_project(&r, Some((0.0, 0.0))).unwrap(), Point2D::new(0.0, 0.0));
        assert_eq!(back_project_volume(&r, None).unwrap(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn first_and_last_columns_hit_endpoints() {
        let p1 = Point2D::new(0.0, 12.5);
        let p2 = Point2D::new(63.0, 40.0);
        let r = record(p1, p2, Point2D::new(31.5, 26.25), (64, 64));
        assert!(back_project(&r, Some((0.0, 5.0))).unwrap().fuzzy_eq(p1));
        assert!(back_project(&r, Some((63.0, 5.0))).unwrap().fuzzy_eq(p2));
        let mid = back_project(&r, Some((31.5, 5.0))).unwrap();
        assert!(mid.fuzzy_eq(Point2D::new(31.5, 26.25)));
    }

    #[test]
    fn volume_coordinate_uses_row_as_depth() {
        let r = record(Point2D::new(0.0, 2.0), Point2D::new(10.0, 2.0), Point2D::new(5.0, 2.0), (11, 11));
        let [d, y, x] = back_project_volume(&r, Some((4.0, 7.0))).unwrap();
        assert_eq!(d, 7.0);
        assert_eq!(y, 2.0);
        assert!((x - 4.0).abs() < 1e-12);
    }

    #[test]
    fn column_beyond_width_is_rejected() {
        let r = record(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(5.0, 0.0), (11, 11));
        assert!(matches!(
            back_project(&r, Some((11.0, 1.0))),
            Err(SliceError::PixelOutOfRange { shape: (11, 11), .. })
        ));
        assert!(back_project(&r, Some((-1.0, 1.0))).is_err());
        assert!(back_project(&r, Some((1.0, 11.0))).is_err());
    }

    #[test]
    fn center_column_locates_pivot() {
        let r = record(Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0), Point2D::new(25.0, 0.0), (101, 101));
        assert!((center_column(&r) - 25.0).abs() < 1e-12);
        let pivot = back_project(&r, Some((center_column(&r), 1.0))).unwrap();
        assert!(pivot.fuzzy_eq(r.rotate_center));
    }

    #[test]
    fn non_square_pixels_follow_grid_layout() {
        // 16 line samples, 8 pixels per depth step
        let r = record(Point2D::new(0.0, 5.0), Point2D::new(15.0, 5.0), Point2D::new(7.0, 5.0), (16, 8));
        let [d, y, x] = back_project_volume(&r, Some((5.0, 1.0))).unwrap();
        assert_eq!((d, y), (1.0, 5.0));
        assert!((x - 13.0).abs() < 1e-12);
        assert_eq!(back_project_volume(&r, Some((7.0, 9.0))).unwrap(), [9.0, 5.0, 15.0]);
        assert!(matches!(
            back_project(&r, Some((12.0, 1.0))),
            Err(SliceError::PixelOutOfRange { shape: (16, 8), .. })
        ));
    }
}
