use igt_core::{Image, ImageView, mean_u8};

use crate::{BLACK, WHITE};

/// Bias applied to the mean before thresholding. Values above 1 push more
/// pixels to [`BLACK`].
pub const MEAN_SCALE: f32 = 1.05;

/// Pixels at or above `MEAN_SCALE x mean` become [`WHITE`], the rest [`BLACK`].
pub fn binarize(src: &ImageView<'_, u8>) -> Image<u8> {
    let threshold = mean_u8(src) * MEAN_SCALE;
    Image::from_fn(src.width(), src.height(), |x, y| {
        if src.row(y)[x] as f32 >= threshold {
            WHITE
        } else {
            BLACK
        }
    })
}
