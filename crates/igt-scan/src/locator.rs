use core::mem;

use igt_core::{Image, mean_u8};
use log::{debug, info, warn};

use crate::ScanError;
use crate::config::{OpenRange, ScanConfig};
use crate::frame::ScreenFrame;
use crate::geometry::GeometryProfile;

/// A timer crop captured while a search window was open.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index of the frame, counted from the first frame fed to the locator.
    pub frame: u64,
    /// Grayscale crop of the whole timer region.
    pub image: Image<u8>,
    pub brightness: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchWindow {
    /// Frames left in the window, including the next one.
    pub remaining: usize,
    pub candidates: Vec<Candidate>,
}

impl SearchWindow {
    fn new(len: usize) -> Self {
        Self {
            remaining: len.max(1),
            candidates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocatorState {
    /// Ignoring frames; the last one of the countdown is checked for a flash.
    Skipping { remaining: usize },
    /// Watching for the flash that precedes a finish screen.
    Idle,
    Searching(SearchWindow),
    /// One wider window after the first closed without candidates.
    ExtendedSearch(SearchWindow),
    /// Every expected occurrence was accepted.
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocatorEvent {
    /// The darkest plausible candidate of the window.
    Accepted(Candidate),
    /// Candidates were captured but none had a plausible brightness; the
    /// occurrence is dropped.
    NoPlausibleCandidate { candidates: usize },
    /// The window closed, even after widening, without a single candidate.
    WindowEmpty,
}

/// Darkest candidate whose brightness lies inside `band`. Ties keep the
/// earliest.
pub fn select_candidate(candidates: Vec<Candidate>, band: OpenRange) -> Option<Candidate> {
    candidates
        .into_iter()
        .filter(|c| band.contains(c.brightness))
        .fold(None, |best: Option<Candidate>, c| match best {
            Some(b) if b.brightness <= c.brightness => Some(b),
            _ => Some(c),
        })
}

/// Frame-by-frame finish-screen detector.
///
/// Feed every decoded frame to [`Locator::step`] in order and call
/// [`Locator::finish`] once the stream ends. After an error the locator is
/// left [`LocatorState::Done`].
#[derive(Debug)]
pub struct Locator<'g> {
    geometry: &'g GeometryProfile,
    cfg: ScanConfig,
    expected: usize,
    found: usize,
    frames: u64,
    state: LocatorState,
}

impl<'g> Locator<'g> {
    pub fn new(geometry: &'g GeometryProfile, cfg: ScanConfig, expected: usize) -> Self {
        let state = if expected == 0 {
            LocatorState::Done
        } else {
            skip_or_idle(cfg.initial_skip)
        };
        Self {
            geometry,
            cfg,
            expected,
            found: 0,
            frames: 0,
            state,
        }
    }

    pub fn state(&self) -> &LocatorState {
        &self.state
    }

    pub fn found(&self) -> usize {
        self.found
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Frames consumed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_done(&self) -> bool {
        self.state == LocatorState::Done
    }

    /// Advances the machine by one frame.
    pub fn step<F: ScreenFrame + ?Sized>(
        &mut self,
        frame: &F,
    ) -> Result<Option<LocatorEvent>, ScanError> {
        let index = self.frames;
        self.frames += 1;

        let state = mem::replace(&mut self.state, LocatorState::Done);
        let (next, event) = match state {
            LocatorState::Skipping { remaining } if remaining > 1 => (
                LocatorState::Skipping {
                    remaining: remaining - 1,
                },
                None,
            ),
            LocatorState::Skipping { .. } | LocatorState::Idle => self.watch(frame, index)?,
            LocatorState::Searching(window) => self.search(window, frame, index, false)?,
            LocatorState::ExtendedSearch(window) => self.search(window, frame, index, true)?,
            LocatorState::Done => (LocatorState::Done, None),
        };
        self.state = next;
        Ok(event)
    }

    /// Ends the stream. An open window is resolved with whatever it collected.
    pub fn finish(&mut self) -> Option<LocatorEvent> {
        let candidates = match &mut self.state {
            LocatorState::Searching(window) | LocatorState::ExtendedSearch(window) => {
                mem::take(&mut window.candidates)
            }
            _ => return None,
        };
        debug!(
            "stream ended inside a search window with {} candidate(s)",
            candidates.len()
        );
        let (next, event) = self.resolve(candidates);
        self.state = next;
        event
    }

    fn watch<F: ScreenFrame + ?Sized>(
        &mut self,
        frame: &F,
        index: u64,
    ) -> Result<(LocatorState, Option<LocatorEvent>), ScanError> {
        let [top_left, bottom_right] = frame.corner_means(self.cfg.corner_size)?;
        let flash = top_left >= self.cfg.flash_threshold && bottom_right >= self.cfg.flash_threshold;
        if !flash {
            return Ok((LocatorState::Idle, None));
        }

        debug!("frame {index}: flash (corners {top_left:.1}/{bottom_right:.1}), searching");
        self.search(SearchWindow::new(self.cfg.search_window), frame, index, false)
    }

    fn search<F: ScreenFrame + ?Sized>(
        &mut self,
        mut window: SearchWindow,
        frame: &F,
        index: u64,
        extended: bool,
    ) -> Result<(LocatorState, Option<LocatorEvent>), ScanError> {
        let button = frame.mean_hue(self.geometry.confirm_button)?;
        let reference = frame.mean_hue(self.geometry.reference_digit)?;
        if self.cfg.button_hue.contains(button) && self.cfg.reference_hue.contains(reference) {
            let image = frame.gray_crop(self.geometry.timer)?;
            let brightness = mean_u8(&image.as_view());
            debug!("frame {index}: finish screen candidate, brightness {brightness:.1}");
            window.candidates.push(Candidate {
                frame: index,
                image,
                brightness,
            });
        }

        window.remaining -= 1;
        if window.remaining > 0 {
            let state = if extended {
                LocatorState::ExtendedSearch(window)
            } else {
                LocatorState::Searching(window)
            };
            return Ok((state, None));
        }

        if window.candidates.is_empty() && !extended {
            debug!(
                "frame {index}: window closed empty, widening to {} frames",
                self.cfg.extended_window
            );
            let wide = SearchWindow::new(self.cfg.extended_window);
            return Ok((LocatorState::ExtendedSearch(wide), None));
        }

        Ok(self.resolve(window.candidates))
    }

    fn resolve(&mut self, candidates: Vec<Candidate>) -> (LocatorState, Option<LocatorEvent>) {
        if candidates.is_empty() {
            debug!("flash was not followed by a finish screen");
            return (LocatorState::Idle, Some(LocatorEvent::WindowEmpty));
        }

        let count = candidates.len();
        match select_candidate(candidates, self.cfg.brightness) {
            Some(winner) => {
                self.found += 1;
                info!(
                    "occurrence {}/{} at frame {} (brightness {:.1}, {count} candidate(s))",
                    self.found, self.expected, winner.frame, winner.brightness
                );
                let next = if self.found >= self.expected {
                    LocatorState::Done
                } else {
                    skip_or_idle(self.cfg.cooldown)
                };
                (next, Some(LocatorEvent::Accepted(winner)))
            }
            None => {
                warn!("skipping occurrence: none of {count} candidate(s) has a plausible brightness");
                (
                    skip_or_idle(self.cfg.cooldown),
                    Some(LocatorEvent::NoPlausibleCandidate { candidates: count }),
                )
            }
        }
    }
}

fn skip_or_idle(frames: usize) -> LocatorState {
    if frames == 0 {
        LocatorState::Idle
    } else {
        LocatorState::Skipping { remaining: frames }
    }
}

#[cfg(test)]
mod tests {
    use igt_core::{Image, Rect};

    use super::{Candidate, Locator, LocatorEvent, LocatorState, select_candidate};
    use crate::ScanError;
    use crate::config::{OpenRange, ScanConfig};
    use crate::frame::ScreenFrame;
    use crate::geometry::{GameRegion, GeometryProfile};

    #[derive(Clone, Copy, Default)]
    struct Scripted {
        flash: bool,
        overlay: bool,
        brightness: u8,
    }

    impl ScreenFrame for Scripted {
        fn corner_means(&self, _size: usize) -> Result<[f32; 2], ScanError> {
            let v = if self.flash { 230.0 } else { 20.0 };
            Ok([v, v])
        }

        fn mean_hue(&self, rect: Rect) -> Result<f32, ScanError> {
            let ntsc = GeometryProfile::for_region(GameRegion::NtscU);
            Ok(match (self.overlay, rect == ntsc.confirm_button) {
                (false, _) => 0.0,
                (true, true) => 170.0,
                (true, false) => 40.0,
            })
        }

        fn gray_crop(&self, rect: Rect) -> Result<Image<u8>, ScanError> {
            Ok(Image::new_fill(rect.width, rect.height, self.brightness))
        }
    }

    fn cfg() -> ScanConfig {
        ScanConfig {
            initial_skip: 0,
            cooldown: 5,
            ..ScanConfig::default()
        }
    }

    fn candidate(frame: u64, brightness: f32) -> Candidate {
        Candidate {
            frame,
            image: Image::new_fill(1, 1, 0),
            brightness,
        }
    }

    #[test]
    fn selection_prefers_darkest_inside_band() {
        let band = OpenRange::new(70.0, 160.0);
        let picked = select_candidate(
            vec![
                candidate(0, 50.0),
                candidate(1, 140.0),
                candidate(2, 95.0),
                candidate(3, 95.0),
                candidate(4, 170.0),
            ],
            band,
        );
        assert_eq!(picked.map(|c| c.frame), Some(2));
        assert_eq!(
            select_candidate(vec![candidate(0, 60.0), candidate(1, 160.0)], band),
            None
        );
    }

    #[test]
    fn initial_skip_checks_last_frame_for_flash() {
        let geometry = GeometryProfile::for_region(GameRegion::NtscU);
        let mut loc = Locator::new(
            &geometry,
            ScanConfig {
                initial_skip: 3,
                ..cfg()
            },
            1,
        );
        let flash = Scripted {
            flash: true,
            ..Scripted::default()
        };

        loc.step(&flash).expect("step");
        loc.step(&flash).expect("step");
        assert!(matches!(loc.state(), LocatorState::Skipping { remaining: 1 }));
        loc.step(&flash).expect("step");
        assert!(matches!(loc.state(), LocatorState::Searching(_)));
    }

    #[test]
    fn empty_window_widens_once_then_returns_idle() {
        let geometry = GeometryProfile::for_region(GameRegion::NtscU);
        let cfg = ScanConfig {
            search_window: 2,
            extended_window: 3,
            ..cfg()
        };
        let mut loc = Locator::new(&geometry, cfg, 1);
        let flash = Scripted {
            flash: true,
            ..Scripted::default()
        };
        let dark = Scripted::default();

        assert_eq!(loc.step(&flash).expect("step"), None);
        assert_eq!(loc.step(&dark).expect("step"), None);
        assert!(matches!(loc.state(), LocatorState::ExtendedSearch(w) if w.remaining == 3));

        assert_eq!(loc.step(&dark).expect("step"), None);
        assert_eq!(loc.step(&dark).expect("step"), None);
        assert_eq!(loc.step(&dark).expect("step"), Some(LocatorEvent::WindowEmpty));
        assert_eq!(loc.state(), &LocatorState::Idle);
        assert_eq!(loc.found(), 0);
    }

    #[test]
    fn implausible_candidates_skip_the_occurrence() {
        let geometry = GeometryProfile::for_region(GameRegion::NtscU);
        let cfg = ScanConfig {
            search_window: 2,
            ..cfg()
        };
        let mut loc = Locator::new(&geometry, cfg, 2);
        let washed_out = Scripted {
            flash: true,
            overlay: true,
            brightness: 200,
        };

        loc.step(&washed_out).expect("step");
        let event = loc.step(&washed_out).expect("step");
        assert_eq!(
            event,
            Some(LocatorEvent::NoPlausibleCandidate { candidates: 2 })
        );
        assert_eq!(loc.state(), &LocatorState::Skipping { remaining: 5 });
        assert_eq!(loc.found(), 0);
    }

    #[test]
    fn last_expected_occurrence_finishes() {
        let geometry = GeometryProfile::for_region(GameRegion::NtscU);
        let cfg = ScanConfig {
            search_window: 1,
            ..cfg()
        };
        let mut loc = Locator::new(&geometry, cfg, 1);
        let screen = Scripted {
            flash: true,
            overlay: true,
            brightness: 100,
        };

        let event = loc.step(&screen).expect("step");
        assert!(matches!(event, Some(LocatorEvent::Accepted(c)) if c.frame == 0));
        assert!(loc.is_done());
        assert_eq!(loc.step(&screen).expect("step"), None);
        assert_eq!(loc.frames(), 2);
    }

    #[test]
    fn stream_end_resolves_open_window() {
        let geometry = GeometryProfile::for_region(GameRegion::NtscU);
        let mut loc = Locator::new(&geometry, cfg(), 3);
        let screen = Scripted {
            flash: true,
            overlay: true,
            brightness: 120,
        };

        loc.step(&screen).expect("step");
        let event = loc.finish();
        assert!(matches!(event, Some(LocatorEvent::Accepted(c)) if c.brightness == 120.0));
        assert_eq!(loc.found(), 1);
        assert_eq!(loc.finish(), None);
    }
}
