//! Rectangular-kernel grayscale morphology.
//!
//! The structuring element is a `kw x kh` block of ones anchored at
//! `(kw / 2, kh / 2)`, so an even kernel reaches one pixel further up/left
//! than down/right. Neighbours outside the image are ignored.
//! On two-level `0`/`255` images dilation grows the `255` set.

use igt_core::{Image, ImageView};

/// Structuring-element extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    pub width: usize,
    pub height: usize,
}

impl Kernel {
    pub const fn square(size: usize) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    fn reach(extent: usize) -> (usize, usize) {
        let before = extent / 2;
        let after = extent.saturating_sub(1) - before;
        (before, after)
    }
}

/// Maximum filter over the kernel window.
pub fn dilate_u8(src: &ImageView<'_, u8>, kernel: Kernel) -> Image<u8> {
    let (w, h) = (src.width(), src.height());
    if w == 0 || h == 0 || kernel.width == 0 || kernel.height == 0 {
        return src.to_image();
    }

    let (left, right) = Kernel::reach(kernel.width);
    let (up, down) = Kernel::reach(kernel.height);

    // Separable: horizontal pass then vertical pass.
    let horizontal = Image::from_fn(w, h, |x, y| {
        let x0 = x.saturating_sub(left);
        let x1 = (x + right).min(w - 1);
        src.row(y)[x0..=x1].iter().copied().max().unwrap_or(0)
    });

    Image::from_fn(w, h, |x, y| {
        let y0 = y.saturating_sub(up);
        let y1 = (y + down).min(h - 1);
        (y0..=y1)
            .filter_map(|yy| horizontal.get(x, yy).copied())
            .max()
            .unwrap_or(0)
    })
}

#[cfg(test)]
mod tests {
    use igt_core::Image;

    use crate::{Kernel, dilate_u8};

    #[test]
    fn single_pixel_grows_to_kernel_footprint() {
        let mut img = Image::new_fill(8, 8, 0u8);
        *img.get_mut(4, 4).expect("in bounds") = 255;

        let out = dilate_u8(&img.as_view(), Kernel::square(4));

        // Anchor (2, 2): the source pixel spreads to x,y in 3..=6.
        for y in 0..8 {
            for x in 0..8 {
                let expected = if (3..=6).contains(&x) && (3..=6).contains(&y) {
                    255
                } else {
                    0
                };
                assert_eq!(out.get(x, y), Some(&expected), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn odd_kernel_is_symmetric() {
        let mut img = Image::new_fill(5, 5, 0u8);
        *img.get_mut(2, 2).expect("in bounds") = 9;

        let out = dilate_u8(&img.as_view(), Kernel::square(3));
        let set = out.data().iter().filter(|&&v| v == 9).count();
        assert_eq!(set, 9);
        assert_eq!(out.get(0, 0), Some(&0));
    }

    #[test]
    fn border_pixels_ignore_outside_neighbours() {
        let img = Image::from_fn(4, 1, |x, _| if x == 0 { 255u8 } else { 0 });
        let out = dilate_u8(&img.as_view(), Kernel::square(4));
        assert_eq!(out.data(), &[255, 255, 255, 0]);
    }
}
