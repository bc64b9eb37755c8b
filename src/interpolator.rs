use ndarray::{Array2, Array3, ArrayView3, Axis, Zip};

use crate::error::{Result, SliceError};

/// Trilinear interpolation over the integer grid of a volume.
///
/// Coordinates are `[depth, y, x]` and must lie within
/// `[0, depth-1] × [0, height-1] × [0, width-1]`.
pub struct Interpolator<'a, T> {
    data: ArrayView3<'a, T>,
}

impl<'a, T> Interpolator<'a, T>
where
    T: Copy + Into<f64>,
{
    pub fn new(data: ArrayView3<'a, T>) -> Self {
        Self { data }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Trilinear estimate at `coordinate`.
    ///
    /// # Errors
    ///
    /// [`SliceError::OutOfBounds`] for coordinates outside the grid, NaN
    /// included. Queries are never clamped.
    pub fn evaluate(&self, coordinate: [f64; 3]) -> Result<f64> {
        let shape = self.dim();
        let [d, y, x] = coordinate;
        let (Some((d0, d1, fd)), Some((y0, y1, fy)), Some((x0, x1, fx))) = (
            Self::cell(d, shape.0),
            Self::cell(y, shape.1),
            Self::cell(x, shape.2),
        ) else {
            return Err(SliceError::OutOfBounds { coordinate, shape });
        };

        let v = |d: usize, y: usize, x: usize| -> f64 { self.data[[d, y, x]].into() };

        let c00 = Self::lerp(v(d0, y0, x0), v(d0, y0, x1), fx);
        let c01 = Self::lerp(v(d0, y1, x0), v(d0, y1, x1), fx);
        let c10 = Self::lerp(v(d1, y0, x0), v(d1, y0, x1), fx);
        let c11 = Self::lerp(v(d1, y1, x0), v(d1, y1, x1), fx);

        let c0 = Self::lerp(c00, c01, fy);
        let c1 = Self::lerp(c10, c11, fy);

        Ok(Self::lerp(c0, c1, fd))
    }

    /// Evaluates every `[depth, y, x]` entry of `grid`, producing an image with
    /// the grid's first two dimensions.
    pub fn evaluate_grid(&self, grid: &Array3<f64>) -> Result<Array2<f64>> {
        let (rows, cols, _) = grid.dim();
        let mut image = Array2::<f64>::zeros((rows, cols));
        let mut failure = None;
        Zip::from(&mut image)
            .and(grid.lanes(Axis(2)))
            .for_each(|pixel, coordinate| {
                if failure.is_some() {
                    return;
                }
                match self.evaluate([coordinate[0], coordinate[1], coordinate[2]]) {
                    Ok(value) => *pixel = value,
                    Err(err) => failure = Some(err),
                }
            });
        match failure {
            Some(err) => Err(err),
            None => Ok(image),
        }
    }

    /// Lower index, upper index and fractional offset of the cell holding
    /// `position` on an axis of `len` samples.
    #[inline]
    fn cell(position: f64, len: usize) -> Option<(usize, usize, f64)> {
        let max = len.checked_sub(1)? as f64;
        if !(0.0..=max).contains(&position) {
            return None;
        }
        let i0 = position.floor() as usize;
        let i1 = (i0 + 1).min(len - 1);
        Some((i0, i1, position - i0 as f64))
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        (b - a).mul_add(t, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(shape: (usize, usize, usize)) -> Array3<f64> {
        Array3::from_shape_fn(shape, |(d, y, x)| (d + 2 * y + 3 * x) as f64)
    }

    #[test]
    fn exact_on_grid_points() {
        let volume = ramp((4, 5, 6));
        let interpolator = Interpolator::new(volume.view());
        assert_eq!(interpolator.evaluate([2.0, 3.0, 4.0]).unwrap(), 20.0);
        assert_eq!(interpolator.evaluate([3.0, 4.0, 5.0]).unwrap(), 26.0);
    }

    #[test]
    fn reproduces_linear_functions_between_grid_points() {
        let volume = ramp((4, 5, 6));
        let interpolator = Interpolator::new(volume.view());
        let value = interpolator.evaluate([0.5, 1.25, 2.75]).unwrap();
        assert!((value - (0.5 + 2.5 + 8.25)).abs() < 1e-12);
    }

    #[test]
    fn averages_the_eight_corners() {
        let mut volume = Array3::<u16>::zeros((2, 2, 2));
        volume[[1, 1, 1]] = 800;
        let interpolator = Interpolator::new(volume.view());
        assert!((interpolator.evaluate([0.5, 0.5, 0.5]).unwrap() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn single_sample_axis() {
        let volume = ramp((1, 3, 3));
        let interpolator = Interpolator::new(volume.view());
        assert_eq!(interpolator.evaluate([0.0, 1.0, 1.5]).unwrap(), 6.5);
    }

    #[test]
    fn out_of_grid_queries_fail() {
        let volume = ramp((4, 5, 6));
        let interpolator = Interpolator::new(volume.view());
        for coordinate in [
            [-0.001, 0.0, 0.0],
            [0.0, 4.0001, 0.0],
            [0.0, 0.0, 6.0],
            [f64::NAN, 0.0, 0.0],
        ] {
            assert!(matches!(
                interpolator.evaluate(coordinate),
                Err(SliceError::OutOfBounds { shape: (4, 5, 6), .. })
            ));
        }
    }

    #[test]
    fn grid_evaluation_stops_at_first_bad_sample() {
        let volume = ramp((2, 2, 2));
        let interpolator = Interpolator::new(volume.view());
        let mut grid = Array3::<f64>::zeros((2, 2, 3));
        grid[[1, 0, 2]] = 5.0;
        assert!(interpolator.evaluate_grid(&grid).is_err());
        grid[[1, 0, 2]] = 1.0;
        let image = interpolator.evaluate_grid(&grid).unwrap();
        assert_eq!(image[[1, 0]], 3.0);
        assert_eq!(image[[0, 0]], 0.0);
    }
}
