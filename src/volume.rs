use ndarray::{ArrayView3, ArrayViewD, Ix3};

use crate::enums::AngleSpec;
use crate::error::{Result, SliceError};
use crate::geometry::Point2D;
use crate::slicer::{RadialSlicer, RadialSlices, SliceConfig};

/// Read-only view of a scan with axes (depth, height, width).
///
/// Depth is the rotation axis; height and width span the en-face plane.
pub struct Volume<'a, T> {
    data: ArrayView3<'a, T>,
}

impl<'a, T> Volume<'a, T>
where
    T: Copy + Into<f64> + Send + Sync,
{
    /// # Errors
    ///
    /// [`SliceError::Shape`] if any axis is empty.
    pub fn new(data: ArrayView3<'a, T>) -> Result<Self> {
        let (depth, height, width) = data.dim();
        if depth == 0 || height == 0 || width == 0 {
            return Err(SliceError::shape(format!(
                "volume axes must be non-empty, got {depth}x{height}x{width}"
            )));
        }
        Ok(Self { data })
    }

    /// Accepts an array of any dimensionality and checks it is 3D.
    pub fn from_dyn(data: ArrayViewD<'a, T>) -> Result<Self> {
        let ndim = data.ndim();
        let data = data.into_dimensionality::<Ix3>().map_err(|_| {
            SliceError::shape(format!("volume must be 3-dimensional, got {ndim} axes"))
        })?;
        Self::new(data)
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn view(&self) -> ArrayView3<'a, T> {
        self.data.clone()
    }

    /// Extent of the en-face plane in index units, `(width - 1, height - 1)`.
    pub fn face_rect(&self) -> (f64, f64) {
        let (_, height, width) = self.dim();
        ((width - 1) as f64, (height - 1) as f64)
    }

    /// Middle of the en-face plane.
    pub fn face_center(&self) -> Point2D {
        let (width, height) = self.face_rect();
        Point2D::new(width * 0.5, height * 0.5)
    }

    pub fn face_diagonal(&self) -> f64 {
        let (width, height) = self.face_rect();
        width.hypot(height)
    }

    pub fn radial_slice(&self, angle_spec: &AngleSpec, config: SliceConfig) -> Result<RadialSlices> {
        RadialSlicer::new(self, config)?.slice(angle_spec)
    }
}
