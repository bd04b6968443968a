use core::fmt;

use crate::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SizeMismatch { expected: usize, actual: usize },
    OutOfBounds { rect: Rect, width: usize, height: usize },
    EmptyImage,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds {
                rect,
                width,
                height,
            } => write!(f, "rectangle {rect} out of bounds for {width}x{height} image"),
            Self::EmptyImage => write!(f, "image has zero width or height"),
        }
    }
}

impl std::error::Error for Error {}
