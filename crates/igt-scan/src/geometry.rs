use core::fmt;
use core::str::FromStr;

use igt_core::Rect;
use serde::{Deserialize, Serialize};

use crate::ScanError;

/// Width of the game picture after capture cropping and resizing.
pub const GAME_WIDTH: usize = 435;
/// Height of the game picture after capture cropping and resizing.
pub const GAME_HEIGHT: usize = 323;

pub const LAP_ROWS: usize = 3;
pub const DIGITS_PER_ROW: usize = 5;

/// Vertical distance between consecutive lap rows on the timer screen.
const ROW_PITCH: isize = 26;

/// Console release the footage was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameRegion {
    NtscU,
    Pal,
    NtscJ,
}

impl GameRegion {
    pub const ALL: [Self; 3] = [Self::NtscU, Self::Pal, Self::NtscJ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NtscU => "ntsc-u",
            Self::Pal => "pal",
            Self::NtscJ => "ntsc-j",
        }
    }
}

impl fmt::Display for GameRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown region '{s}' (expected ntsc-u, pal or ntsc-j)"))
    }
}

/// Speedrun category; fixes how many timer screens a complete run shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    AnyPercent,
    AllCups,
}

impl Category {
    pub const ALL: [Self; 2] = [Self::AnyPercent, Self::AllCups];

    pub fn expected_count(self) -> usize {
        match self {
            Self::AnyPercent => 21,
            Self::AllCups => 16,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnyPercent => "any-percent",
            Self::AllCups => "all-cups",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category '{s}' (expected any-percent or all-cups)"))
    }
}

/// Pixel layout of the finish screen for one [`GameRegion`].
///
/// `reference_digit`, `confirm_button` and `timer` are in game-frame
/// coordinates ([`GAME_WIDTH`] x [`GAME_HEIGHT`]). `rows` are relative to the
/// timer crop, `digits` relative to a row crop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryProfile {
    pub region: GameRegion,
    /// Top of the gold "1" of the lap counter.
    pub reference_digit: Rect,
    /// Blue "continue" button.
    pub confirm_button: Rect,
    pub timer: Rect,
    /// `y0..y1` per lap row.
    pub rows: [(usize, usize); LAP_ROWS],
    /// `x0..x1` per digit, in `[m, s, s, c, c]` order.
    pub digits: [(usize, usize); DIGITS_PER_ROW],
}

impl GeometryProfile {
    pub fn for_region(region: GameRegion) -> Self {
        match region {
            GameRegion::NtscU => Self {
                region,
                reference_digit: Rect::from_bounds(25, 35, 75, 85),
                confirm_button: Rect::from_bounds(290, 300, 170, 180),
                timer: Rect::from_bounds(10, 103, 288, 420),
                rows: lap_rows([(6, 28), (6, 28), (6, 28)]),
                digits: [(10, 24), (35, 48), (50, 63), (74, 87), (89, 102)],
            },
            GameRegion::Pal => Self {
                region,
                reference_digit: Rect::from_bounds(30, 40, 75, 85),
                confirm_button: Rect::from_bounds(280, 290, 170, 180),
                timer: Rect::from_bounds(10, 93, 288, 407),
                rows: lap_rows([(5, 26), (4, 25), (-1, 20)]),
                digits: [(9, 23), (32, 45), (44, 57), (65, 78), (76, 91)],
            },
            GameRegion::NtscJ => Self {
                region,
                reference_digit: Rect::from_bounds(25, 35, 75, 85),
                confirm_button: Rect::from_bounds(290, 300, 170, 180),
                timer: Rect::from_bounds(10, 103, 288, 420),
                rows: lap_rows([(6, 28), (6, 28), (6, 28)]),
                digits: [(10, 24), (30, 43), (43, 56), (64, 77), (77, 90)],
            },
        }
    }

    /// Rectangle of lap row `row` inside the timer crop, moved down by `dy`.
    pub fn row_rect(&self, row: usize, dy: isize) -> Option<Rect> {
        let (y0, y1) = *self.rows.get(row)?;
        Rect::from_bounds(y0, y1, 0, self.timer.width).offset(0, dy)
    }

    /// Rectangle of digit `digit` inside a row crop of height `row_height`,
    /// moved right by `dx`.
    pub fn digit_rect(&self, digit: usize, row_height: usize, dx: isize) -> Option<Rect> {
        let (x0, x1) = *self.digits.get(digit)?;
        Rect::from_bounds(0, row_height, x0, x1).offset(dx, 0)
    }

    /// Checks every rectangle against the game frame and the timer crop.
    pub fn validate(&self) -> Result<(), ScanError> {
        for (what, rect) in [
            ("reference digit", self.reference_digit),
            ("confirm button", self.confirm_button),
            ("timer region", self.timer),
        ] {
            if !rect.fits_within(GAME_WIDTH, GAME_HEIGHT) {
                return Err(ScanError::mismatch(what, rect, GAME_WIDTH, GAME_HEIGHT));
            }
        }

        let (tw, th) = (self.timer.width, self.timer.height);
        for row in 0..LAP_ROWS {
            let rect = self.row_rect(row, 0).unwrap_or_default();
            if rect.is_empty() || !rect.fits_within(tw, th) {
                return Err(ScanError::mismatch("lap row", rect, tw, th));
            }
            for digit in 0..DIGITS_PER_ROW {
                let d = self.digit_rect(digit, rect.height, 0).unwrap_or_default();
                if d.is_empty() || !d.fits_within(tw, rect.height) {
                    return Err(ScanError::mismatch("digit", d, tw, rect.height));
                }
            }
        }
        Ok(())
    }
}

fn lap_rows(raw: [(isize, isize); LAP_ROWS]) -> [(usize, usize); LAP_ROWS] {
    let mut rows = [(0, 0); LAP_ROWS];
    for (i, (y0, y1)) in raw.into_iter().enumerate() {
        let pitch = ROW_PITCH * i as isize;
        rows[i] = ((y0 + pitch).max(0) as usize, (y1 + pitch).max(0) as usize);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::{Category, GameRegion, GeometryProfile};

    #[test]
    fn every_preset_fits_its_frames() {
        for region in GameRegion::ALL {
            GeometryProfile::for_region(region)
                .validate()
                .expect("preset is consistent");
        }
    }

    #[test]
    fn rows_advance_by_pitch() {
        let ntsc = GeometryProfile::for_region(GameRegion::NtscU);
        assert_eq!(ntsc.rows, [(6, 28), (32, 54), (58, 80)]);

        let pal = GeometryProfile::for_region(GameRegion::Pal);
        assert_eq!(pal.rows, [(5, 26), (30, 51), (51, 72)]);
        assert_eq!(pal.timer.height, 83);
    }

    #[test]
    fn shifted_rects() {
        let g = GeometryProfile::for_region(GameRegion::NtscU);
        let row = g.row_rect(1, -3).expect("in quadrant");
        assert_eq!((row.y, row.bottom(), row.width), (29, 51, 132));

        let digit = g.digit_rect(4, 22, 2).expect("in quadrant");
        assert_eq!((digit.x, digit.right(), digit.height), (91, 104, 22));
        assert_eq!(g.row_rect(0, -7), None);
        assert_eq!(g.row_rect(3, 0), None);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for region in GameRegion::ALL {
            assert_eq!(region.to_string().parse::<GameRegion>(), Ok(region));
        }
        assert_eq!("ALL-CUPS".parse::<Category>(), Ok(Category::AllCups));
        assert!("any".parse::<Category>().is_err());
        assert_eq!(Category::AnyPercent.expected_count(), 21);
        assert_eq!(Category::AllCups.expected_count(), 16);
    }
}
