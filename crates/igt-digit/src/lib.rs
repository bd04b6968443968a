//! Digit glyph normalization for timer-screen crops.
//!
//! Pipeline, per digit crop:
//! 1. [`binarize`]: two-level image around `1.05 x mean`.
//! 2. [`denoise_border`]: estimate the backdrop margin on each side and paint
//!    it [`BLACK`].
//! 3. [`remove_small_regions`]: drop [`WHITE`] blobs smaller than the minimum
//!    region size.
//! 4. Dilation with a 4x4 kernel to reconnect broken strokes.
//! 5. Classification-sized crops only: 1-pixel [`BLACK`] frame, then
//!    [`align_top`].
//!
//! Polarity: digit faces are bright on this material, so after binarization
//! the glyph is [`WHITE`] and outlines/backdrop are [`BLACK`].

mod align;
mod binarize;
mod border;
mod normalize;
mod regions;

pub use align::{align_top, paint_frame};
pub use binarize::{MEAN_SCALE, binarize};
pub use border::{Margins, denoise_border, estimate_margins, paint_margins};
pub use normalize::{NormalizeConfig, normalize_digit, normalize_digit_with};
pub use regions::{
    Connectivity, Region, RegionPass, Segmenter, detect_and_filter_regions, flood_fill,
    remove_small_regions,
};

pub const BLACK: u8 = 0;
pub const WHITE: u8 = 255;
/// Temporary mark for regions that survived the size filter.
pub const GRAY: u8 = 127;

/// Fixed digit crop dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitDims {
    pub width: usize,
    pub height: usize,
}

impl DigitDims {
    /// Small crop used by the row/column alignment heuristics.
    pub const PROBE: Self = Self {
        width: 13,
        height: 22,
    };

    /// Upscaled crop fed to the classifier.
    pub const CLASSIFY: Self = Self {
        width: 13 * 3,
        height: 22 * 3,
    };
}
