use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::{GrayImage, ImageBuffer};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::angles::build_angle_list;
use crate::enums::{AngleSpec, Processor};
use crate::error::{Result, SliceError};
use crate::geometry::{Point2D, SliceLine, baseline, slice_line_for_angle};
use crate::interpolator::Interpolator;
use crate::sample_grid::build_sample_grid;
use crate::volume::Volume;

/// Slices keyed by their position in the angle sequence.
pub type RadialSlices = BTreeMap<usize, SliceRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSize {
    pub width: usize,
    pub height: usize,
}

impl OutputSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub const fn as_tuple(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl Default for OutputSize {
    fn default() -> Self {
        Self::new(512, 512)
    }
}

impl From<(usize, usize)> for OutputSize {
    fn from((width, height): (usize, usize)) -> Self {
        Self::new(width, height)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Pivot on the en-face plane. Defaults to the middle of the face.
    pub rotate_center: Option<Point2D>,
    pub output_size: OutputSize,
    pub processor: Processor,
    /// Dedicated worker count for [`Processor::Parallel`], capped at the
    /// available cores. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

/// Shared flag for stopping a run between angles.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One radial slice and the line it was resampled along.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceRecord {
    pub angle: f64,
    /// Resampled intensities, shaped `(output_w, output_h)`.
    pub image: Array2<f64>,
    pub rotate_center: Point2D,
    pub p1: Point2D,
    pub p2: Point2D,
}

impl SliceRecord {
    pub fn line(&self) -> SliceLine {
        SliceLine {
            p1: self.p1,
            p2: self.p2,
        }
    }

    /// `(output_w, output_h)` of the run that produced this record.
    pub fn output_size(&self) -> (usize, usize) {
        self.image.dim()
    }

    /// Grayscale preview with intensities stretched to the full 8-bit range.
    pub fn to_image(&self) -> Option<GrayImage> {
        let (rows, cols) = self.image.dim();
        let (min, max) = self
            .image
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = max - min;
        let pixel_data: Vec<u8> = self
            .image
            .iter()
            .map(|&v| Self::normalize_to_u8(v, min, range))
            .collect();
        ImageBuffer::from_raw(cols as u32, rows as u32, pixel_data)
    }

    #[inline]
    fn normalize_to_u8(value: f64, min: f64, range: f64) -> u8 {
        if range > 0.0 {
            (((value - min) / range) * 255.0).clamp(0.0, 255.0) as u8
        } else {
            0
        }
    }
}

/// Cuts radial slices out of one volume around a fixed rotation center.
pub struct RadialSlicer<'a, T> {
    interpolator: Interpolator<'a, T>,
    config: SliceConfig,
    center: Point2D,
    face: (f64, f64),
    baseline: (Point2D, Point2D),
    cancellation: Option<CancellationToken>,
}

impl<'a, T> RadialSlicer<'a, T>
where
    T: Copy + Into<f64> + Send + Sync,
{
    /// # Errors
    ///
    /// [`SliceError::Shape`] if either output dimension is zero.
    pub fn new(volume: &Volume<'a, T>, config: SliceConfig) -> Result<Self> {
        let OutputSize { width, height } = config.output_size;
        if width == 0 || height == 0 {
            return Err(SliceError::shape(format!(
                "output size must be positive, got {width}x{height}"
            )));
        }

        let center = config.rotate_center.unwrap_or_else(|| volume.face_center());
        let face = volume.face_rect();
        // Long enough that the rotated segment spans the face at every angle.
        let half_length = volume.face_diagonal() + center.x.abs() + center.y.abs() + 1.0;

        Ok(Self {
            interpolator: Interpolator::new(volume.view()),
            config,
            center,
            face,
            baseline: baseline(center, half_length),
            cancellation: None,
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn rotate_center(&self) -> Point2D {
        self.center
    }

    /// Endpoints of the slice at `angle_degrees`, without resampling.
    pub fn slice_line(&self, angle_degrees: f64) -> Result<SliceLine> {
        let (width, height) = self.face;
        slice_line_for_angle(self.baseline, self.center, angle_degrees, width, height)
    }

    /// Resamples the volume along the line at `angle_degrees`.
    pub fn slice_at(&self, angle_degrees: f64) -> Result<SliceRecord> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(SliceError::Cancelled);
        }

        let SliceLine { p1, p2 } = self.slice_line(angle_degrees)?;
        log::debug!(
            "angle {angle_degrees}: ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            p1.x,
            p1.y,
            p2.x,
            p2.y
        );

        let grid = build_sample_grid(p1, p2, self.config.output_size.as_tuple());
        let image = self.interpolator.evaluate_grid(&grid)?;

        Ok(SliceRecord {
            angle: angle_degrees,
            image,
            rotate_center: self.center,
            p1,
            p2,
        })
    }

    /// Slices at every angle of `angle_spec`. Any failing angle fails the
    /// whole run.
    pub fn slice(&self, angle_spec: &AngleSpec) -> Result<RadialSlices> {
        let angles = build_angle_list(angle_spec)?;
        log::info!(
            "Slicing {} angles around ({:.2}, {:.2}) with {:?} processor",
            angles.len(),
            self.center.x,
            self.center.y,
            self.config.processor
        );

        let records: Vec<SliceRecord> = match self.config.processor {
            Processor::Sequential => angles
                .iter()
                .map(|&angle| self.slice_at(angle))
                .collect::<Result<_>>()?,
            Processor::Parallel => match self.config.threads {
                Some(threads) => {
                    let threads = threads.clamp(1, Self::available_cores());
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(threads)
                        .build()
                        .map_err(|err| SliceError::ThreadPool(err.to_string()))?;
                    pool.install(|| self.slice_parallel(&angles))?
                }
                None => self.slice_parallel(&angles)?,
            },
        };

        Ok(records.into_iter().enumerate().collect())
    }

    fn slice_parallel(&self, angles: &[f64]) -> Result<Vec<SliceRecord>> {
        angles
            .par_iter()
            .map(|&angle| self.slice_at(angle))
            .collect()
    }

    fn available_cores() -> usize {
        std::thread::available_parallelism().map_or(1, |n| n.get())
    }
}

/// Radial slices of `volume` around `rotate_center`, one per angle of
/// `angle_spec`, each resampled to `output_size`.
///
/// `rotate_center` defaults to the middle of the face.
///
/// # Errors
///
/// Fails on an empty volume or output size, an invalid angle step, or a line
/// that does not cross the face exactly twice.
pub fn radial_slice<T>(
    volume: ndarray::ArrayView3<'_, T>,
    angle_spec: impl Into<AngleSpec>,
    rotate_center: Option<Point2D>,
    output_size: (usize, usize),
) -> Result<RadialSlices>
where
    T: Copy + Into<f64> + Send + Sync,
{
    let volume = Volume::new(volume)?;
    let config = SliceConfig {
        rotate_center,
        output_size: output_size.into(),
        ..SliceConfig::default()
    };
    RadialSlicer::new(&volume, config)?.slice(&angle_spec.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn analytic_volume(shape: (usize, usize, usize)) -> Array3<f64> {
        Array3::from_shape_fn(shape, |(d, h, w)| (d + h + w) as f64)
    }

    #[test]
    fn default_config() {
        let config = SliceConfig::default();
        assert_eq!(config.output_size, OutputSize::new(512, 512));
        assert_eq!(config.processor, Processor::Sequential);
        assert!(config.rotate_center.is_none());
    }

    #[test]
    fn rejects_zero_output_size() {
        let data = analytic_volume((8, 8, 8));
        let err = radial_slice(data.view(), 45.0, None, (0, 8)).unwrap_err();
        assert!(matches!(err, SliceError::Shape(_)));
    }

    #[test]
    fn records_follow_angle_sequence_order() {
        let data = analytic_volume((16, 16, 16));
        let angles = vec![120.0, 10.0, 60.0];
        let slices = radial_slice(data.view(), angles.clone(), None, (16, 16)).unwrap();
        let got: Vec<f64> = slices.values().map(|record| record.angle).collect();
        assert_eq!(got, angles);
        assert_eq!(slices.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn records_share_center_and_size() {
        let data = analytic_volume((16, 20, 24));
        let center = Point2D::new(7.0, 5.0);
        let slices = radial_slice(data.view(), 30.0, Some(center), (12, 12)).unwrap();
        assert_eq!(slices.len(), 6);
        for record in slices.values() {
            assert_eq!(record.rotate_center, center);
            assert_eq!(record.output_size(), (12, 12));
        }
    }

    #[test]
    fn center_outside_face_fails_whole_run() {
        let data = analytic_volume((8, 8, 8));
        let err = radial_slice(data.view(), 45.0, Some(Point2D::new(20.0, 3.0)), (8, 8))
            .unwrap_err();
        assert!(matches!(err, SliceError::Geometry { .. }));
    }

    #[test]
    fn depth_coupled_to_width_overruns_shallow_volumes() {
        let data = analytic_volume((4, 16, 16));
        let err = radial_slice(data.view(), 90.0, None, (16, 4)).unwrap_err();
        assert!(matches!(err, SliceError::OutOfBounds { .. }));
    }

    #[test]
    fn parallel_matches_sequential() {
        let data = analytic_volume((24, 24, 24));
        let volume = Volume::new(data.view()).unwrap();
        let sequential = RadialSlicer::new(
            &volume,
            SliceConfig {
                output_size: OutputSize::new(24, 24),
                ..SliceConfig::default()
            },
        )
        .unwrap()
        .slice(&AngleSpec::Step(10.0))
        .unwrap();

        for threads in [None, Some(2)] {
            let parallel = RadialSlicer::new(
                &volume,
                SliceConfig {
                    output_size: OutputSize::new(24, 24),
                    processor: Processor::Parallel,
                    threads,
                    ..SliceConfig::default()
                },
            )
            .unwrap()
            .slice(&AngleSpec::Step(10.0))
            .unwrap();
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn cancelled_run_returns_no_slices() {
        let data = analytic_volume((8, 8, 8));
        let volume = Volume::new(data.view()).unwrap();
        let token = CancellationToken::new();
        let slicer = RadialSlicer::new(
            &volume,
            SliceConfig {
                output_size: OutputSize::new(8, 8),
                ..SliceConfig::default()
            },
        )
        .unwrap()
        .with_cancellation(token.clone());
        assert!(slicer.slice(&AngleSpec::Step(45.0)).is_ok());
        token.cancel();
        assert!(matches!(
            slicer.slice(&AngleSpec::Step(45.0)),
            Err(SliceError::Cancelled)
        ));
    }

    #[test]
    fn preview_spans_full_gray_range() {
        let data = analytic_volume((8, 8, 8));
        let slices = radial_slice(data.view(), vec![0.0], Some(Point2D::new(3.0, 3.0)), (8, 8))
            .unwrap();
        let preview = slices[&0].to_image().unwrap();
        assert_eq!(preview.dimensions(), (8, 8));
        assert_eq!(preview.get_pixel(0, 0).0[0], 0);
        assert_eq!(preview.get_pixel(7, 7).0[0], 255);
    }
}
