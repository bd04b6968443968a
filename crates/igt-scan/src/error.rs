use core::fmt;

use igt_core::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A geometry rectangle does not fit the buffer it is cropped from.
    GeometryMismatch {
        what: &'static str,
        rect: Rect,
        width: usize,
        height: usize,
    },
    /// The frame source failed to deliver a frame.
    Source(String),
    Image(igt_core::Error),
}

impl ScanError {
    pub(crate) fn mismatch(what: &'static str, rect: Rect, width: usize, height: usize) -> Self {
        Self::GeometryMismatch {
            what,
            rect,
            width,
            height,
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GeometryMismatch {
                what,
                rect,
                width,
                height,
            } => write!(
                f,
                "{what} {rect} does not fit a {width}x{height} buffer (wrong region preset or capture crop?)"
            ),
            Self::Source(msg) => write!(f, "frame source: {msg}"),
            Self::Image(e) => write!(f, "image: {e}"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<igt_core::Error> for ScanError {
    fn from(e: igt_core::Error) -> Self {
        match e {
            igt_core::Error::OutOfBounds {
                rect,
                width,
                height,
            } => Self::mismatch("crop", rect, width, height),
            other => Self::Image(other),
        }
    }
}
