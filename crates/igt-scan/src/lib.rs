//! Finish-screen location and timer extraction over decoded video frames.
//!
//! A [`Scanner`] pulls frames from a [`FrameSource`] and feeds them to the
//! [`Locator`] state machine:
//!
//! - `Skipping`: a countdown of frames known to be irrelevant (loads, hub
//!   navigation). Its last frame is checked like an `Idle` one.
//! - `Idle`: waits for a white flash (both corner squares bright).
//! - `Searching`: a short window starting at the flash frame. Frames whose
//!   confirm button is blue and whose reference digit is gold contribute a
//!   [`Candidate`] timer crop.
//! - `ExtendedSearch`: one wider window when the first closed empty.
//! - `Done`: every expected occurrence was accepted.
//!
//! The darkest candidate inside the brightness band wins. Its lap rows are
//! re-cropped by the [`RowAligner`], every digit is normalized and handed to
//! the [`DigitClassifier`], and the digits become a [`TimerReading`].
//!
//! Running out of frames early is not an error: the [`ScanReport`] carries
//! [`ScanOutcome::StreamExhausted`] with the readings gathered so far.

mod aligner;
mod config;
mod error;
mod frame;
mod geometry;
mod locator;
mod reading;
mod scan;

pub use aligner::{RowAligner, horizontal_offset, vertical_offset};
pub use config::{OpenRange, ScanConfig};
pub use error::ScanError;
pub use frame::{CaptureRegion, CapturedFrame, ScreenFrame};
pub use geometry::{
    Category, DIGITS_PER_ROW, GAME_HEIGHT, GAME_WIDTH, GameRegion, GeometryProfile, LAP_ROWS,
};
pub use locator::{
    Candidate, Locator, LocatorEvent, LocatorState, SearchWindow, select_candidate,
};
pub use reading::{LapTime, RunTime, TimerReading};
pub use scan::{
    DigitClassifier, FrameSource, ProgressSink, ScanOutcome, ScanReport, Scanner,
};
