use serde::{Deserialize, Serialize};

/// Open interval `(lo, hi)`: both ends excluded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenRange {
    pub lo: f32,
    pub hi: f32,
}

impl OpenRange {
    pub const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, v: f32) -> bool {
        v > self.lo && v < self.hi
    }
}

/// Tuned constants of the screen locator and the row/column aligner.
///
/// Frame counts assume 30 fps footage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Both corner squares must reach this mean for a flash.
    pub flash_threshold: f32,
    /// Side of the top-left and bottom-right corner squares.
    pub corner_size: usize,
    /// Mean hue of the confirm button (blue), full 8-bit hue scale.
    pub button_hue: OpenRange,
    /// Mean hue of the reference digit (gold), full 8-bit hue scale.
    pub reference_hue: OpenRange,
    /// Plausible mean brightness of a timer crop.
    pub brightness: OpenRange,
    pub search_window: usize,
    /// Used once when the first window closes without candidates.
    pub extended_window: usize,
    /// Frames ignored after a resolved occurrence.
    pub cooldown: usize,
    /// Frames ignored at the start of the footage.
    pub initial_skip: usize,
    /// Margin, in probe pixels, tolerated before a row/column is corrected.
    pub align_slack: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            flash_threshold: 200.0,
            corner_size: 50,
            button_hue: OpenRange::new(150.0, 200.0),
            reference_hue: OpenRange::new(25.0, 55.0),
            brightness: OpenRange::new(70.0, 160.0),
            search_window: 10,
            extended_window: 300,
            cooldown: 2100,
            initial_skip: 2100,
            align_slack: 2,
        }
    }
}
