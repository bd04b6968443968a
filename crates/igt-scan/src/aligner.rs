use igt_core::{Image, ImageView, Rect, resize_bilinear};
use igt_digit::{BLACK, DigitDims, NormalizeConfig, normalize_digit_with};
use log::debug;

use crate::ScanError;
use crate::geometry::{DIGITS_PER_ROW, GeometryProfile, LAP_ROWS};

/// Vertical correction for a probe digit, in probe pixels.
///
/// Every column is scanned at most half the height from the top and from the
/// bottom for the first non-black pixel; the per-side minima are compared.
/// Positive moves the crop down. `None` when neither side finds ink.
pub fn vertical_offset(probe: &ImageView<'_, u8>, slack: usize) -> Option<isize> {
    let (w, h) = (probe.width(), probe.height());
    let span = h / 2;

    let mut up: Option<usize> = None;
    let mut down: Option<usize> = None;
    for x in 0..w {
        if let Some(d) = (0..span).position(|j| probe.row(j)[x] != BLACK) {
            up = Some(up.map_or(d, |u| u.min(d)));
        }
        if let Some(d) = (0..span).position(|j| probe.row(h - 1 - j)[x] != BLACK) {
            down = Some(down.map_or(d, |v| v.min(d)));
        }
    }
    if up.is_none() && down.is_none() {
        return None;
    }

    let up = up.unwrap_or(span);
    let down = down.unwrap_or(span);
    let widest = up.max(down);
    if widest <= slack {
        return Some(0);
    }
    Some(if widest == up {
        (up - slack) as isize
    } else {
        slack as isize - down as isize
    })
}

/// Horizontal correction for a probe digit, in probe pixels.
///
/// Rows of the middle third are scanned at most half the width from each
/// side; the average distance to the first non-black pixel decides. Positive
/// moves the crop right. A side where no row found ink is ignored.
pub fn horizontal_offset(probe: &ImageView<'_, u8>, slack: usize) -> isize {
    let (w, h) = (probe.width(), probe.height());
    let span = w / 2;

    let (mut left_sum, mut left_rows) = (0usize, 0usize);
    let (mut right_sum, mut right_rows) = (0usize, 0usize);
    for y in h / 3..=(2 * h / 3).min(h.saturating_sub(1)) {
        let row = probe.row(y);
        if let Some(d) = row.iter().take(span).position(|&v| v != BLACK) {
            left_sum += d;
            left_rows += 1;
        }
        if let Some(d) = row.iter().rev().take(span).position(|&v| v != BLACK) {
            right_sum += d;
            right_rows += 1;
        }
    }

    let left = (left_rows > 0).then(|| left_sum / left_rows);
    let right = (right_rows > 0).then(|| right_sum / right_rows);
    if left.is_none() || right.is_none() {
        debug!("column probe: no ink on one side (left {left:?}, right {right:?})");
    }

    match (left, right) {
        (Some(l), _) if l > slack => (l - slack) as isize,
        (_, Some(r)) if r > slack => -((r - slack) as isize),
        _ => 0,
    }
}

fn checked_rect(
    rect: Option<Rect>,
    width: usize,
    height: usize,
    what: &'static str,
) -> Result<Rect, ScanError> {
    match rect {
        Some(r) if !r.is_empty() && r.fits_within(width, height) => Ok(r),
        other => Err(ScanError::mismatch(what, other.unwrap_or_default(), width, height)),
    }
}

/// Cuts lap rows and digits out of an accepted timer crop, correcting their
/// placement.
#[derive(Debug, Clone, Copy)]
pub struct RowAligner<'g> {
    geometry: &'g GeometryProfile,
    slack: usize,
}

impl<'g> RowAligner<'g> {
    pub fn new(geometry: &'g GeometryProfile, slack: usize) -> Self {
        Self { geometry, slack }
    }

    /// Crop of digit `digit` in `row`, resized to `dims`.
    fn digit_crop(
        &self,
        screen: &ImageView<'_, u8>,
        row: Rect,
        digit: usize,
        dx: isize,
        dims: DigitDims,
    ) -> Result<Image<u8>, ScanError> {
        let row = checked_rect(Some(row), screen.width(), screen.height(), "lap row")?;
        let row_view = screen.subview(row)?;
        let rect = self.geometry.digit_rect(digit, row.height, dx);
        let rect = checked_rect(rect, row.width, row.height, "digit")?;
        Ok(resize_bilinear(&row_view.subview(rect)?, dims.width, dims.height)?)
    }

    /// Normalized probe of the first digit of `row`.
    pub fn probe(
        &self,
        screen: &ImageView<'_, u8>,
        row: Rect,
        dx: isize,
    ) -> Result<Image<u8>, ScanError> {
        let small = self.digit_crop(screen, row, 0, dx, DigitDims::PROBE)?;
        Ok(normalize_digit_with(&small.as_view(), &NormalizeConfig::probe()))
    }

    /// Horizontal correction of all digit crops, measured on the first digit
    /// of lap row 0.
    pub fn column_offset(&self, screen: &ImageView<'_, u8>) -> Result<isize, ScanError> {
        let row = checked_rect(
            self.geometry.row_rect(0, 0),
            screen.width(),
            screen.height(),
            "lap row",
        )?;
        let probe = self.probe(screen, row, 0)?;
        let dx = horizontal_offset(&probe.as_view(), self.slack);
        debug!("column offset {dx}");
        Ok(dx)
    }

    /// Rectangle of lap row `row` with its vertical correction applied,
    /// clamped to the screen.
    pub fn aligned_row(
        &self,
        screen: &ImageView<'_, u8>,
        row: usize,
        dx: isize,
    ) -> Result<Rect, ScanError> {
        let base = checked_rect(
            self.geometry.row_rect(row, 0),
            screen.width(),
            screen.height(),
            "lap row",
        )?;

        let probe = self.probe(screen, base, dx)?;
        let Some(dy) = vertical_offset(&probe.as_view(), self.slack) else {
            debug!("row {row}: no ink in probe digit, left uncorrected");
            return Ok(base);
        };

        let lowest = -(base.y as isize);
        let highest = (screen.height() - base.bottom()) as isize;
        let dy = dy.clamp(lowest, highest);
        if dy != 0 {
            debug!("row {row}: vertical offset {dy}");
        }
        base.offset(0, dy)
            .ok_or_else(|| ScanError::mismatch("lap row", base, screen.width(), screen.height()))
    }

    /// Every digit of the screen, row by row, normalized for classification.
    pub fn digits(
        &self,
        screen: &ImageView<'_, u8>,
        dx: isize,
    ) -> Result<Vec<Image<u8>>, ScanError> {
        let mut out = Vec::with_capacity(LAP_ROWS * DIGITS_PER_ROW);
        for row in 0..LAP_ROWS {
            let rect = self.aligned_row(screen, row, dx)?;
            for digit in 0..DIGITS_PER_ROW {
                let crop = self.digit_crop(screen, rect, digit, dx, DigitDims::CLASSIFY)?;
                out.push(normalize_digit_with(
                    &crop.as_view(),
                    &NormalizeConfig::classify(),
                ));
            }
        }
        Ok(out)
    }
}
