use igt_core::ImageView;
use log::{info, warn};
use serde::Serialize;

use crate::ScanError;
use crate::aligner::RowAligner;
use crate::config::ScanConfig;
use crate::frame::ScreenFrame;
use crate::geometry::{Category, GameRegion, GeometryProfile};
use crate::locator::{Candidate, Locator, LocatorEvent};
use crate::reading::{RunTime, TimerReading};

/// Sequential supplier of decoded frames.
pub trait FrameSource {
    type Frame: ScreenFrame;

    /// Next frame in presentation order; `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, ScanError>;
}

/// Maps a normalized 39x66 digit to its value.
pub trait DigitClassifier {
    fn classify(&self, digit: &ImageView<'_, u8>) -> u8;
}

impl<F: Fn(&ImageView<'_, u8>) -> u8> DigitClassifier for F {
    fn classify(&self, digit: &ImageView<'_, u8>) -> u8 {
        self(digit)
    }
}

/// Receives scan notifications. Every method defaults to doing nothing.
pub trait ProgressSink {
    fn occurrence_found(&mut self, _found: usize, _expected: usize) {}

    /// Candidates were captured but none was plausible.
    fn occurrence_skipped(&mut self, _candidates: usize) {}

    /// A flash opened a window that closed without candidates.
    fn window_empty(&mut self, _frame: u64) {}
}

impl ProgressSink for () {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ScanOutcome {
    Complete,
    /// The stream ended before every expected occurrence was accepted.
    StreamExhausted { found: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub region: GameRegion,
    pub category: Category,
    pub expected: usize,
    pub readings: Vec<TimerReading>,
    /// Occurrences dropped for lack of a plausible candidate.
    pub skipped: usize,
    /// Flashes not followed by a finish screen.
    pub empty_windows: usize,
    pub frames: u64,
    /// Horizontal correction measured on the first reading.
    pub column_offset: Option<isize>,
    pub outcome: ScanOutcome,
}

impl ScanReport {
    pub fn total(&self) -> RunTime {
        RunTime::total(&self.readings)
    }
}

/// Runs the locator over a frame source and reads every accepted screen.
#[derive(Debug, Clone)]
pub struct Scanner {
    geometry: GeometryProfile,
    category: Category,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(
        region: GameRegion,
        category: Category,
        config: ScanConfig,
    ) -> Result<Self, ScanError> {
        let geometry = GeometryProfile::for_region(region);
        geometry.validate()?;
        Ok(Self {
            geometry,
            category,
            config,
        })
    }

    pub fn geometry(&self) -> &GeometryProfile {
        &self.geometry
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn run<S, C, P>(
        &self,
        source: &mut S,
        classifier: &C,
        progress: &mut P,
    ) -> Result<ScanReport, ScanError>
    where
        S: FrameSource + ?Sized,
        C: DigitClassifier + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let expected = self.category.expected_count();
        let mut locator = Locator::new(&self.geometry, self.config.clone(), expected);
        let mut reader = Reader {
            aligner: RowAligner::new(&self.geometry, self.config.align_slack),
            classifier,
            progress,
            column_offset: None,
            readings: Vec::with_capacity(expected),
            skipped: 0,
            empty_windows: 0,
        };

        while !locator.is_done() {
            let Some(frame) = source.next_frame()? else {
                if let Some(event) = locator.finish() {
                    reader.handle(event, &locator)?;
                }
                break;
            };
            if let Some(event) = locator.step(&frame)? {
                reader.handle(event, &locator)?;
            }
        }

        let found = locator.found();
        let outcome = if found >= expected {
            ScanOutcome::Complete
        } else {
            warn!(
                "stream exhausted after {} frames: {found}/{expected} timer screens",
                locator.frames()
            );
            ScanOutcome::StreamExhausted { found, expected }
        };

        Ok(ScanReport {
            region: self.geometry.region,
            category: self.category,
            expected,
            readings: reader.readings,
            skipped: reader.skipped,
            empty_windows: reader.empty_windows,
            frames: locator.frames(),
            column_offset: reader.column_offset,
            outcome,
        })
    }
}

struct Reader<'a, C: ?Sized, P: ?Sized> {
    aligner: RowAligner<'a>,
    classifier: &'a C,
    progress: &'a mut P,
    column_offset: Option<isize>,
    readings: Vec<TimerReading>,
    skipped: usize,
    empty_windows: usize,
}

impl<C, P> Reader<'_, C, P>
where
    C: DigitClassifier + ?Sized,
    P: ProgressSink + ?Sized,
{
    fn handle(&mut self, event: LocatorEvent, locator: &Locator<'_>) -> Result<(), ScanError> {
        match event {
            LocatorEvent::Accepted(candidate) => {
                self.read(candidate)?;
                self.progress
                    .occurrence_found(locator.found(), locator.expected());
            }
            LocatorEvent::NoPlausibleCandidate { candidates } => {
                self.skipped += 1;
                self.progress.occurrence_skipped(candidates);
            }
            LocatorEvent::WindowEmpty => {
                self.empty_windows += 1;
                self.progress.window_empty(locator.frames().saturating_sub(1));
            }
        }
        Ok(())
    }

    fn read(&mut self, candidate: Candidate) -> Result<(), ScanError> {
        let screen = candidate.image.as_view();
        let dx = match self.column_offset {
            Some(dx) => dx,
            None => {
                let dx = self.aligner.column_offset(&screen)?;
                self.column_offset = Some(dx);
                dx
            }
        };

        let digits: Vec<u8> = self
            .aligner
            .digits(&screen, dx)?
            .iter()
            .map(|d| self.classifier.classify(&d.as_view()))
            .collect();
        info!("frame {}: read {digits:?}", candidate.frame);

        self.readings.push(TimerReading {
            frame: candidate.frame,
            digits,
            screen: candidate.image,
        });
        Ok(())
    }
}
