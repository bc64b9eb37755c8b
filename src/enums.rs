use serde::{Deserialize, Serialize};

/// Which angles to slice at.
///
/// Deserialized untagged: a bare number is a step, an array is a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AngleSpec {
    /// Slice every `step` degrees over `[0, 180)`.
    Step(f64),
    /// Slice at exactly these angles, in this order.
    List(Vec<f64>),
}

impl Default for AngleSpec {
    fn default() -> Self {
        Self::Step(15.0)
    }
}

impl From<f64> for AngleSpec {
    fn from(step: f64) -> Self {
        Self::Step(step)
    }
}

impl From<Vec<f64>> for AngleSpec {
    fn from(angles: Vec<f64>) -> Self {
        Self::List(angles)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    #[default]
    Sequential,
    /// One rayon task per angle.
    Parallel,
}
