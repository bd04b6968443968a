//! Pixel-buffer primitives for timer-screen extraction.
//!
//! ## Image Views and Stride
//! Images use element stride (not byte stride). `stride` is the distance, in
//! elements, between adjacent row starts and may be greater than `width`.
//! Sub-views borrow the parent buffer; [`Image::crop`] copies.
//!
//! ## Rectangles
//! [`Rect`] is half-open on both axes. Every crop is bounds-checked and fails
//! with [`Error::OutOfBounds`] instead of clipping, so a geometry preset that
//! does not match the capture surfaces as an error.
//!
//! ## Colour
//! Colour frames are [`Rgb8`] triples. Hue is reported on the full 8-bit scale
//! (`0..=255` per turn), matching the thresholds used by the screen locator.

mod color;
mod error;
mod geom;
mod image;
mod resize;

pub use color::{Rgb8, hue_full, luma, mean_hue, mean_u8, to_gray};
pub use error::Error;
pub use geom::Rect;
pub use image::{Image, ImageView, ImageViewMut};
pub use resize::{Resample, resize_bilinear};
