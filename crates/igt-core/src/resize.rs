use crate::color::Rgb8;
use crate::{Error, Image, ImageView};

/// Pixel types the resampler can interpolate channel by channel.
pub trait Resample: Copy {
    const CHANNELS: usize;

    fn channel(self, c: usize) -> f32;

    fn from_channels(values: [f32; 3]) -> Self;
}

impl Resample for u8 {
    const CHANNELS: usize = 1;

    fn channel(self, _c: usize) -> f32 {
        self as f32
    }

    fn from_channels(values: [f32; 3]) -> Self {
        round_u8(values[0])
    }
}

impl Resample for Rgb8 {
    const CHANNELS: usize = 3;

    fn channel(self, c: usize) -> f32 {
        self[c] as f32
    }

    fn from_channels(values: [f32; 3]) -> Self {
        values.map(round_u8)
    }
}

fn round_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Bilinear resize with pixel-center alignment and clamped borders.
///
/// Destination pixel `(x, y)` samples source position
/// `((x + 0.5) * sx - 0.5, (y + 0.5) * sy - 0.5)`.
pub fn resize_bilinear<T: Resample>(
    src: &ImageView<'_, T>,
    width: usize,
    height: usize,
) -> Result<Image<T>, Error> {
    if src.width() == 0 || src.height() == 0 || width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }

    let sx = src.width() as f32 / width as f32;
    let sy = src.height() as f32 / height as f32;

    let x_taps: Vec<Tap> = (0..width)
        .map(|x| Tap::new((x as f32 + 0.5) * sx - 0.5, src.width()))
        .collect();

    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let ty = Tap::new((y as f32 + 0.5) * sy - 0.5, src.height());
        let top = src.row(ty.i0);
        let bottom = src.row(ty.i1);
        for tx in &x_taps {
            let mut out = [0.0f32; 3];
            for (c, slot) in out.iter_mut().enumerate().take(T::CHANNELS) {
                let upper = top[tx.i0].channel(c) * (1.0 - tx.w) + top[tx.i1].channel(c) * tx.w;
                let lower =
                    bottom[tx.i0].channel(c) * (1.0 - tx.w) + bottom[tx.i1].channel(c) * tx.w;
                *slot = upper * (1.0 - ty.w) + lower * ty.w;
            }
            data.push(T::from_channels(out));
        }
    }

    Image::from_vec(width, height, data)
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    i0: usize,
    i1: usize,
    w: f32,
}

impl Tap {
    fn new(pos: f32, len: usize) -> Self {
        let last = len - 1;
        if pos <= 0.0 {
            return Self { i0: 0, i1: 0, w: 0.0 };
        }
        let floor = pos.floor();
        let i0 = (floor as usize).min(last);
        let i1 = (i0 + 1).min(last);
        Self {
            i0,
            i1,
            w: pos - floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::resize_bilinear;
    use crate::{Error, Image};

    #[test]
    fn identity_resize_is_lossless() {
        let img = Image::from_fn(7, 5, |x, y| (x * 30 + y) as u8);
        let out = resize_bilinear(&img.as_view(), 7, 5).expect("non-empty");
        assert_eq!(out, img);
    }

    #[test]
    fn upscale_by_three_keeps_flat_regions_flat() {
        let img = Image::from_fn(4, 2, |x, _| if x < 2 { 0u8 } else { 255 });
        let out = resize_bilinear(&img.as_view(), 12, 6).expect("non-empty");

        assert_eq!(out.width(), 12);
        assert_eq!(out.height(), 6);
        assert!(out.as_view().row(3)[..5].iter().all(|&v| v == 0));
        assert!(out.as_view().row(3)[7..].iter().all(|&v| v == 255));
    }

    #[test]
    fn downscale_averages_rgb_blocks() {
        let img = Image::from_fn(2, 2, |x, _| if x == 0 { [0u8, 100, 200] } else { [200, 100, 0] });
        let out = resize_bilinear(&img.as_view(), 1, 1).expect("non-empty");
        assert_eq!(out.data(), &[[100, 100, 100]]);
    }

    #[test]
    fn empty_target_is_rejected() {
        let img = Image::new_fill(3, 3, 0u8);
        assert_eq!(
            resize_bilinear(&img.as_view(), 0, 3),
            Err(Error::EmptyImage)
        );
    }
}
