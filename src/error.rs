use thiserror::Error;

pub type Result<T> = std::result::Result<T, SliceError>;

#[derive(Debug, Error)]
pub enum SliceError {
    #[error("Line at {angle} degrees crosses the face {count} times, expected 2")]
    Geometry { angle: f64, count: usize },

    #[error("Invalid shape: {0}")]
    Shape(String),

    #[error("Angle step must be a positive finite number of degrees, got {0}")]
    InvalidAngleStep(f64),

    #[error("Sample {coordinate:?} lies outside volume of shape {shape:?}")]
    OutOfBounds {
        coordinate: [f64; 3],
        shape: (usize, usize, usize),
    },

    #[error("Pixel {pixel:?} is outside a slice of shape {shape:?}")]
    PixelOutOfRange {
        pixel: (f64, f64),
        shape: (usize, usize),
    },

    #[error("Slicing was cancelled")]
    Cancelled,

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl SliceError {
    pub(crate) fn shape(details: impl Into<String>) -> Self {
        Self::Shape(details.into())
    }
}
