//! Planar geometry on the en-face plane: rotating the slicing line about the
//! rotation center and finding where it crosses the face rectangle.
//!
//! The face rectangle always has its origin at `(0, 0)`; `x` runs along the
//! width axis of the volume and `y` along the height axis.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SliceError};

/// Tolerance for classifying directions as axis-aligned, accepting boundary
/// crossings and merging coincident crossings.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn fuzzy_eq_eps(&self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() < eps && (self.y - other.y).abs() < eps
    }

    pub fn fuzzy_eq(&self, other: Self) -> bool {
        self.fuzzy_eq_eps(other, EPSILON)
    }

    /// Point at parameter `t` on the segment from `self` to `other`.
    #[inline]
    pub fn lerp(&self, other: Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }

    pub fn distance(&self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Lexicographic order on `(x, y)`.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// The two points where a slicing line enters and leaves the face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceLine {
    pub p1: Point2D,
    pub p2: Point2D,
}

/// Rotates `point` counter-clockwise about `center` by `angle_degrees`.
pub fn rotate_point(point: Point2D, center: Point2D, angle_degrees: f64) -> Point2D {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point2D::new(
        dx.mul_add(cos, -dy * sin) + center.x,
        dx.mul_add(sin, dy * cos) + center.y,
    )
}

/// Every point where the infinite line through `line` crosses the boundary of
/// `[0, rect_width] × [0, rect_height]`.
///
/// The segment is only used for its direction and midpoint, so callers should
/// pass endpoints that lie well outside the rectangle. Crossings are returned
/// in the order `x = 0`, `x = rect_width`, `y = 0`, `y = rect_height`;
/// a crossing through a corner is reported once.
pub fn intersect_line_with_rect(
    line: (Point2D, Point2D),
    rect_width: f64,
    rect_height: f64,
) -> Vec<Point2D> {
    let (a, b) = line;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    let x0 = (a.x + b.x) * 0.5;
    let y0 = (a.y + b.y) * 0.5;

    if dx.abs() <= EPSILON * length {
        return match snap_to_range(x0, rect_width) {
            Some(x) => vec![Point2D::new(x, 0.0), Point2D::new(x, rect_height)],
            None => Vec::new(),
        };
    }

    if dy.abs() <= EPSILON * length {
        return match snap_to_range(y0, rect_height) {
            Some(y) => vec![Point2D::new(0.0, y), Point2D::new(rect_width, y)],
            None => Vec::new(),
        };
    }

    let m = dy / dx;
    let candidates = [
        snap_to_range(m.mul_add(-x0, y0), rect_height).map(|y| Point2D::new(0.0, y)),
        snap_to_range(m.mul_add(rect_width - x0, y0), rect_height)
            .map(|y| Point2D::new(rect_width, y)),
        snap_to_range(-y0 / m + x0, rect_width).map(|x| Point2D::new(x, 0.0)),
        snap_to_range((rect_height - y0) / m + x0, rect_width)
            .map(|x| Point2D::new(x, rect_height)),
    ];

    let mut intersections: Vec<Point2D> = Vec::with_capacity(2);
    for point in candidates.into_iter().flatten() {
        if !intersections.iter().any(|p| p.fuzzy_eq(point)) {
            intersections.push(point);
        }
    }
    intersections
}

/// `value` pulled onto `[0, upper]` if it lies within tolerance of it.
#[inline]
fn snap_to_range(value: f64, upper: f64) -> Option<f64> {
    if value >= -EPSILON && value <= upper + EPSILON {
        Some(value.clamp(0.0, upper))
    } else {
        None
    }
}

/// Orders a pair of crossings so slices read left to right across the sweep.
///
/// Angle `0` keeps the computed order, angles below 90 are sorted by `(x, y)`
/// and angles from 90 on are swapped. Without the swap every slice past 90
/// degrees is mirrored relative to the ones before it.
pub fn orient_endpoints(p1: Point2D, p2: Point2D, angle_degrees: f64) -> (Point2D, Point2D) {
    if angle_degrees == 0.0 {
        (p1, p2)
    } else if angle_degrees < 90.0 {
        if p1.total_cmp(&p2) == Ordering::Greater {
            (p2, p1)
        } else {
            (p1, p2)
        }
    } else {
        (p2, p1)
    }
}

/// Horizontal segment through `center`, reaching `half_length` to each side.
pub fn baseline(center: Point2D, half_length: f64) -> (Point2D, Point2D) {
    (
        Point2D::new(center.x - half_length, center.y),
        Point2D::new(center.x + half_length, center.y),
    )
}

/// Rotates `baseline` about `center`, crosses it with the face and orients the
/// two crossings.
///
/// # Errors
///
/// [`SliceError::Geometry`] unless the rotated line crosses the face exactly
/// twice.
pub fn slice_line_for_angle(
    baseline: (Point2D, Point2D),
    center: Point2D,
    angle_degrees: f64,
    rect_width: f64,
    rect_height: f64,
) -> Result<SliceLine> {
    let rotated = (
        rotate_point(baseline.0, center, angle_degrees),
        rotate_point(baseline.1, center, angle_degrees),
    );
    let intersections = intersect_line_with_rect(rotated, rect_width, rect_height);
    let &[first, second] = intersections.as_slice() else {
        return Err(SliceError::Geometry {
            angle: angle_degrees,
            count: intersections.len(),
        });
    };
    let (p1, p2) = orient_endpoints(first, second, angle_degrees);
    Ok(SliceLine { p1, p2 })
}
