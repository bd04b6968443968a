use igt_core::{Image, ImageView};
use igt_morph::{Kernel, dilate_u8};

use crate::{DigitDims, align_top, binarize, denoise_border, paint_frame, remove_small_regions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// White blobs smaller than this are treated as noise.
    pub min_region_size: usize,
    pub dilate: Kernel,
    /// Re-apply the black frame and top-align the glyph after dilation.
    pub align: bool,
}

impl NormalizeConfig {
    /// Settings for probe-sized crops used by the alignment heuristics.
    pub const fn probe() -> Self {
        Self {
            min_region_size: 20,
            dilate: Kernel::square(4),
            align: false,
        }
    }

    /// Settings for classifier-sized crops.
    pub const fn classify() -> Self {
        Self {
            min_region_size: 150,
            dilate: Kernel::square(4),
            align: true,
        }
    }

    /// Probe settings for probe-height crops, classifier settings otherwise.
    pub fn for_height(height: usize) -> Self {
        if height == DigitDims::PROBE.height {
            Self::probe()
        } else {
            Self::classify()
        }
    }
}

/// Normalizes a grayscale digit crop, choosing settings from its height.
pub fn normalize_digit(src: &ImageView<'_, u8>) -> Image<u8> {
    normalize_digit_with(src, &NormalizeConfig::for_height(src.height()))
}

pub fn normalize_digit_with(src: &ImageView<'_, u8>, cfg: &NormalizeConfig) -> Image<u8> {
    let mut img = binarize(src);
    denoise_border(&mut img);
    remove_small_regions(&mut img, cfg.min_region_size);

    let mut img = dilate_u8(&img.as_view(), cfg.dilate);
    if cfg.align {
        paint_frame(&mut img);
        align_top(&mut img);
    }
    img
}
