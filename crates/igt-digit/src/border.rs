use igt_core::{Image, ImageView, Rect};
use log::debug;

use crate::BLACK;

/// Estimated backdrop depth per side, in pixels.
///
/// `None` means no line on that side reached a [`BLACK`] pixel within its
/// half-span; that side is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub top: Option<usize>,
    pub bottom: Option<usize>,
}

#[derive(Default)]
struct DepthAccumulator {
    sum: usize,
    lines: usize,
}

impl DepthAccumulator {
    fn push(&mut self, depth: Option<usize>) {
        if let Some(d) = depth {
            self.sum += d;
            self.lines += 1;
        }
    }

    fn margin(&self) -> Option<usize> {
        if self.lines == 0 {
            return None;
        }
        Some((self.sum / self.lines).max(1))
    }
}

fn first_black(mut values: impl Iterator<Item = u8>) -> Option<usize> {
    values.position(|v| v == BLACK)
}

/// Average distance from each edge to the first [`BLACK`] pixel.
///
/// Lines are scanned only halfway across so a hollow glyph interior is never
/// mistaken for the backdrop.
pub fn estimate_margins(img: &ImageView<'_, u8>) -> Margins {
    let (w, h) = (img.width(), img.height());
    let (half_w, half_h) = (w / 2, h / 2);

    let mut left = DepthAccumulator::default();
    let mut right = DepthAccumulator::default();
    for row in img.rows() {
        left.push(first_black(row.iter().copied().take(half_w)));
        right.push(first_black(row.iter().rev().copied().take(half_w)));
    }

    let mut top = DepthAccumulator::default();
    let mut bottom = DepthAccumulator::default();
    for x in 0..w {
        let column = |y: usize| img.row(y)[x];
        top.push(first_black((0..half_h).map(column)));
        bottom.push(first_black((0..half_h).map(|j| column(h - 1 - j))));
    }

    Margins {
        left: left.margin(),
        right: right.margin(),
        top: top.margin(),
        bottom: bottom.margin(),
    }
}

/// Paints every pixel inside the given margins [`BLACK`].
pub fn paint_margins(img: &mut Image<u8>, margins: &Margins) {
    let (w, h) = (img.width(), img.height());
    let bands = [
        margins.left.map(|m| Rect::new(0, 0, m.min(w), h)),
        margins
            .right
            .map(|m| Rect::new(w - m.min(w), 0, m.min(w), h)),
        margins.top.map(|m| Rect::new(0, 0, w, m.min(h))),
        margins
            .bottom
            .map(|m| Rect::new(0, h - m.min(h), w, m.min(h))),
    ];

    let mut view = img.as_view_mut();
    for band in bands.into_iter().flatten() {
        if let Ok(mut sub) = view.subview_mut(band) {
            sub.fill(BLACK);
        }
    }
}

/// Estimates the backdrop margins and blackens them in place.
pub fn denoise_border(img: &mut Image<u8>) -> Margins {
    let margins = estimate_margins(&img.as_view());
    if margins.left.is_none()
        || margins.right.is_none()
        || margins.top.is_none()
        || margins.bottom.is_none()
    {
        debug!("border denoise: no backdrop found on some side, margins={margins:?}");
    }
    paint_margins(img, &margins);
    margins
}

#[cfg(test)]
mod tests {
    use igt_core::Image;

    use super::{Margins, denoise_border, estimate_margins};
    use crate::{BLACK, WHITE};

    /// White canvas with a black ring whose outer edge sits `inset` pixels in.
    fn ring(w: usize, h: usize, inset: usize) -> Image<u8> {
        Image::from_fn(w, h, |x, y| {
            let on_ring = ((x == inset || x == w - 1 - inset) && (inset..h - inset).contains(&y))
                || ((y == inset || y == h - 1 - inset) && (inset..w - inset).contains(&x));
            if on_ring { BLACK } else { WHITE }
        })
    }

    #[test]
    fn margins_match_ring_inset() {
        let img = ring(13, 22, 3);
        let m = estimate_margins(&img.as_view());

        // Rows/columns outside the ring see no black within the half-span and
        // do not contribute.
        assert_eq!(m.left, Some(3));
        assert_eq!(m.right, Some(3));
        assert_eq!(m.top, Some(3));
        assert_eq!(m.bottom, Some(3));
    }

    #[test]
    fn denoise_blackens_noise_band() {
        let mut img = ring(13, 22, 2);
        denoise_border(&mut img);

        for y in 0..22 {
            for x in 0..13 {
                if x < 2 || x >= 11 || y < 2 || y >= 20 {
                    assert_eq!(img.get(x, y), Some(&BLACK), "pixel ({x}, {y})");
                }
            }
        }
        assert_eq!(img.get(6, 10), Some(&WHITE));
    }

    #[test]
    fn margin_is_at_least_one() {
        let img = ring(13, 22, 0);
        let m = estimate_margins(&img.as_view());
        assert_eq!(
            m,
            Margins {
                left: Some(1),
                right: Some(1),
                top: Some(1),
                bottom: Some(1),
            }
        );
    }

    #[test]
    fn side_without_black_is_skipped() {
        let mut img = Image::from_fn(10, 10, |x, _| if x >= 8 { BLACK } else { WHITE });
        let m = denoise_border(&mut img);

        // Only the two black columns reach black when scanned vertically.
        assert_eq!(m.left, None);
        assert_eq!(m.right, Some(1));
        assert_eq!(m.top, Some(1));
        assert_eq!(m.bottom, Some(1));
        assert_eq!(img.get(0, 5), Some(&WHITE));
        assert_eq!(img.get(0, 0), Some(&BLACK));
    }
}
