use crate::enums::AngleSpec;
use crate::error::{Result, SliceError};

/// A line through a point is unchanged by a half turn, so stepped sweeps stop
/// short of this.
pub const HALF_TURN: f64 = 180.0;

/// Most angles a step may expand to.
pub const MAX_STEPPED_ANGLES: usize = 1 << 20;

/// Expands an [`AngleSpec`] into the angles to slice at, in slicing order.
///
/// A step `s` yields `0, s, 2s, ...` up to but excluding 180 degrees. An
/// explicit list is used as given, without sorting or range checks.
///
/// # Errors
///
/// [`SliceError::InvalidAngleStep`] if a step is not a positive finite number
/// or would produce more than [`MAX_STEPPED_ANGLES`] angles.
pub fn build_angle_list(spec: &AngleSpec) -> Result<Vec<f64>> {
    match spec {
        AngleSpec::Step(step) => {
            let step = *step;
            let count = (HALF_TURN / step).ceil();
            if !step.is_finite() || step <= 0.0 || count > MAX_STEPPED_ANGLES as f64 {
                return Err(SliceError::InvalidAngleStep(step));
            }
            let count = count as usize;
            Ok((0..count)
                .map(|i| i as f64 * step)
                .filter(|&angle| angle < HALF_TURN)
                .collect())
        }
        AngleSpec::List(angles) => Ok(angles.clone()),
    }
}
