//! # radial-slice
//!
//! Radial cross-sections of 3D scans (OCT, CT, ...) that all pivot around
//! one point of the en-face plane.
//!
//! A volume is an array with axes (depth, height, width). The rotation center
//! lives on the (height, width) face. For every angle the slicing line through
//! the center is crossed with the face rectangle, its two crossings are
//! ordered so that all slices read the same way round, and the volume is
//! resampled with trilinear interpolation along the line over the full depth.
//!
//! Each [`SliceRecord`] keeps the endpoints `p1` and `p2` of its line, so a
//! pixel picked on the slice image can be mapped back onto the volume with
//! [`back_project`].
//!
//! Angles can be processed one after the other or in parallel using rayon,
//! see [`Processor`]. A run either produces every slice or fails as a whole.
//!
//! # Examples
//!
//! Slice every 15 degrees around a point of the face and save the slices as
//! grayscale images.
//!
//! ```no_run
//! # use radial_slice::{radial_slice, Point2D};
//! # use ndarray::Array3;
//! let scan = Array3::<u16>::zeros((128, 512, 512));
//! let slices = radial_slice(scan.view(), 15.0, Some(Point2D::new(289.0, 78.0)), (128, 128))
//!     .expect("should have sliced the volume");
//! for (index, slice) in &slices {
//!     slice
//!         .to_image()
//!         .expect("should have built an image")
//!         .save(format!("slice_{index:03}.png"))
//!         .expect("should have written the image");
//! }
//! ```

pub mod angles;
pub mod back_projection;
pub mod enums;
pub mod error;
pub mod geometry;
pub mod interpolator;
pub mod sample_grid;
pub mod slicer;
pub mod volume;

pub use back_projection::{back_project, back_project_volume, center_column};
pub use enums::{AngleSpec, Processor};
pub use error::{Result, SliceError};
pub use geometry::{Point2D, SliceLine};
pub use interpolator::Interpolator;
pub use slicer::{
    CancellationToken, OutputSize, RadialSlicer, RadialSlices, SliceConfig, SliceRecord,
    radial_slice,
};
pub use volume::Volume;
