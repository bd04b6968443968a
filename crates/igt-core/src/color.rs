use crate::{Image, ImageView};

/// Packed 8-bit RGB pixel.
pub type Rgb8 = [u8; 3];

/// Rec. 601 luma, rounded to nearest.
pub fn luma(px: Rgb8) -> u8 {
    let [r, g, b] = px;
    let y = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

pub fn to_gray(src: &ImageView<'_, Rgb8>) -> Image<u8> {
    Image::from_fn(src.width(), src.height(), |x, y| luma(src.row(y)[x]))
}

/// Hue on the full 8-bit scale: degrees mapped onto `0..=255` (256 steps per
/// turn). Achromatic pixels report hue 0.
pub fn hue_full(px: Rgb8) -> u8 {
    let [r, g, b] = px.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let chroma = max - min;
    if chroma <= 0.0 {
        return 0;
    }

    let mut degrees = if max == r {
        60.0 * (g - b) / chroma
    } else if max == g {
        60.0 * (b - r) / chroma + 120.0
    } else {
        60.0 * (r - g) / chroma + 240.0
    };
    if degrees < 0.0 {
        degrees += 360.0;
    }

    (degrees * 256.0 / 360.0).round().clamp(0.0, 255.0) as u8
}

/// Mean full-scale hue over every pixel of the view.
pub fn mean_hue(src: &ImageView<'_, Rgb8>) -> f32 {
    let count = src.width() * src.height();
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = src
        .rows()
        .flat_map(|row| row.iter())
        .map(|&px| hue_full(px) as u64)
        .sum();
    sum as f32 / count as f32
}

/// Mean intensity over every pixel of the view.
pub fn mean_u8(src: &ImageView<'_, u8>) -> f32 {
    let count = src.width() * src.height();
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = src
        .rows()
        .flat_map(|row| row.iter())
        .map(|&v| v as u64)
        .sum();
    sum as f32 / count as f32
}
