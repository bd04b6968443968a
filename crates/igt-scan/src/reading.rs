use core::fmt;

use igt_core::Image;
use serde::Serialize;

use crate::geometry::{DIGITS_PER_ROW, LAP_ROWS};

/// Digits read from one accepted timer screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerReading {
    /// Frame the screen was captured from.
    pub frame: u64,
    /// `LAP_ROWS x DIGITS_PER_ROW` digits, row-major, each row `[m, s, s, c, c]`.
    pub digits: Vec<u8>,
    /// The timer crop, kept for review.
    #[serde(skip)]
    pub screen: Image<u8>,
}

impl TimerReading {
    pub fn laps(&self) -> impl Iterator<Item = LapTime> + '_ {
        self.digits
            .chunks_exact(DIGITS_PER_ROW)
            .take(LAP_ROWS)
            .map(LapTime::from_digits)
    }
}

/// One lap, as shown on the timer screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LapTime {
    pub minutes: u32,
    pub seconds: u32,
    pub centis: u32,
}

impl LapTime {
    /// From `[m, s, s, c, c]`. Missing digits count as zero.
    pub fn from_digits(d: &[u8]) -> Self {
        let at = |i: usize| d.get(i).copied().unwrap_or(0) as u32;
        Self {
            minutes: at(0),
            seconds: at(1) * 10 + at(2),
            centis: at(3) * 10 + at(4),
        }
    }

    pub fn total_centis(&self) -> u64 {
        (self.minutes as u64 * 60 + self.seconds as u64) * 100 + self.centis as u64
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}.{:02}", self.minutes, self.seconds, self.centis)
    }
}

/// Accumulated in-game time over every lap of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunTime {
    pub centis: u64,
}

impl RunTime {
    pub fn total(readings: &[TimerReading]) -> Self {
        let centis = readings
            .iter()
            .flat_map(TimerReading::laps)
            .map(|lap| lap.total_centis())
            .sum();
        Self { centis }
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centis = self.centis % 100;
        let secs = self.centis / 100;
        let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);
        if hours > 0 {
            write!(f, "{hours}:{minutes:02}:{seconds:02}.{centis:02}")
        } else {
            write!(f, "{minutes:02}:{seconds:02}.{centis:02}")
        }
    }
}
