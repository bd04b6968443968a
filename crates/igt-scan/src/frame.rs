use std::cell::OnceCell;

use igt_core::{Image, ImageView, Rect, Rgb8, mean_hue, mean_u8, resize_bilinear, to_gray};
use serde::{Deserialize, Serialize};

use crate::ScanError;
use crate::geometry::{GAME_HEIGHT, GAME_WIDTH};

/// Measurements the screen locator takes from one game frame.
///
/// Rectangles are in game-frame coordinates ([`GAME_WIDTH`] x
/// [`GAME_HEIGHT`]).
pub trait ScreenFrame {
    /// Mean gray level of the top-left and bottom-right `size` x `size`
    /// squares.
    fn corner_means(&self, size: usize) -> Result<[f32; 2], ScanError>;

    /// Mean full-scale hue over `rect`.
    fn mean_hue(&self, rect: Rect) -> Result<f32, ScanError>;

    /// Grayscale copy of `rect`.
    fn gray_crop(&self, rect: Rect) -> Result<Image<u8>, ScanError>;
}

/// Part of the raw video picture that shows the game.
///
/// `None` uses the whole picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub crop: Option<Rect>,
}

impl CaptureRegion {
    pub fn full() -> Self {
        Self { crop: None }
    }

    pub fn new(crop: Rect) -> Self {
        Self { crop: Some(crop) }
    }

    /// Wraps a decoded frame. The crop is checked here; resizing to the game
    /// frame happens on first measurement.
    pub fn prepare(&self, raw: Image<Rgb8>) -> Result<CapturedFrame, ScanError> {
        let (w, h) = (raw.width(), raw.height());
        let crop = self.crop.unwrap_or(Rect::new(0, 0, w, h));
        if crop.is_empty() || !crop.fits_within(w, h) {
            return Err(ScanError::mismatch("capture region", crop, w, h));
        }
        Ok(CapturedFrame {
            raw,
            crop,
            game: OnceCell::new(),
        })
    }
}

struct GameImages {
    rgb: Image<Rgb8>,
    gray: Image<u8>,
}

/// A decoded frame bound to its capture region.
pub struct CapturedFrame {
    raw: Image<Rgb8>,
    crop: Rect,
    game: OnceCell<GameImages>,
}

impl CapturedFrame {
    fn game(&self) -> Result<&GameImages, ScanError> {
        if let Some(game) = self.game.get() {
            return Ok(game);
        }
        let view = self.raw.as_view().subview(self.crop)?;
        let rgb = resize_bilinear(&view, GAME_WIDTH, GAME_HEIGHT)?;
        let gray = to_gray(&rgb.as_view());
        Ok(self.game.get_or_init(|| GameImages { rgb, gray }))
    }

    /// Game picture resized to [`GAME_WIDTH`] x [`GAME_HEIGHT`].
    pub fn game_rgb(&self) -> Result<&Image<Rgb8>, ScanError> {
        Ok(&self.game()?.rgb)
    }
}

fn region<'a, T>(
    img: &'a Image<T>,
    rect: Rect,
    what: &'static str,
) -> Result<ImageView<'a, T>, ScanError> {
    if rect.is_empty() || !rect.fits_within(img.width(), img.height()) {
        return Err(ScanError::mismatch(what, rect, img.width(), img.height()));
    }
    Ok(img.as_view().subview(rect)?)
}

impl ScreenFrame for CapturedFrame {
    fn corner_means(&self, size: usize) -> Result<[f32; 2], ScanError> {
        let gray = &self.game()?.gray;
        let (w, h) = (gray.width(), gray.height());
        let s = size.min(w).min(h);
        let top_left = region(gray, Rect::new(0, 0, s, s), "flash corner")?;
        let bottom_right = region(gray, Rect::new(w - s, h - s, s, s), "flash corner")?;
        Ok([mean_u8(&top_left), mean_u8(&bottom_right)])
    }

    fn mean_hue(&self, rect: Rect) -> Result<f32, ScanError> {
        let rgb = &self.game()?.rgb;
        Ok(mean_hue(&region(rgb, rect, "hue probe")?))
    }

    fn gray_crop(&self, rect: Rect) -> Result<Image<u8>, ScanError> {
        let gray = &self.game()?.gray;
        Ok(region(gray, rect, "timer region")?.to_image())
    }
}

#[cfg(test)]
mod tests {
    use igt_core::{Image, Rect, Rgb8};

    use super::{CaptureRegion, ScreenFrame};
    use crate::ScanError;
    use crate::geometry::{GAME_HEIGHT, GAME_WIDTH};

    /// Raw 2x-scaled picture: dark, with a blue block where the game shows
    /// its confirm button (game rect x 170..180, y 290..300).
    fn raw_frame() -> Image<Rgb8> {
        Image::from_fn(GAME_WIDTH * 2, GAME_HEIGHT * 2, |x, y| {
            if (340..360).contains(&x) && (580..600).contains(&y) {
                [40, 90, 220]
            } else {
                [30, 30, 30]
            }
        })
    }

    #[test]
    fn crop_outside_raw_picture_is_a_mismatch() {
        let capture = CaptureRegion::new(Rect::new(800, 0, 100, 100));
        let err = capture.prepare(raw_frame()).err().expect("rejected");
        assert!(matches!(
            err,
            ScanError::GeometryMismatch {
                what: "capture region",
                ..
            }
        ));
    }

    #[test]
    fn full_capture_is_resized_to_game_frame() {
        let frame = CaptureRegion::full().prepare(raw_frame()).expect("fits");
        let rgb = frame.game_rgb().expect("resized");
        assert_eq!((rgb.width(), rgb.height()), (GAME_WIDTH, GAME_HEIGHT));

        let [tl, br] = frame.corner_means(50).expect("corners");
        assert_eq!((tl, br), (30.0, 30.0));

        let hue = frame
            .mean_hue(Rect::from_bounds(292, 298, 172, 178))
            .expect("inside");
        assert!(hue > 150.0 && hue < 200.0, "hue {hue}");
    }

    #[test]
    fn gray_crop_has_rect_size() {
        let frame = CaptureRegion::full().prepare(raw_frame()).expect("fits");
        let crop = frame
            .gray_crop(Rect::from_bounds(10, 103, 288, 420))
            .expect("inside");
        assert_eq!((crop.width(), crop.height()), (132, 93));
        assert!(frame.gray_crop(Rect::new(400, 0, 50, 10)).is_err());
    }
}
