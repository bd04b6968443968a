use igt_core::Image;

use crate::{BLACK, WHITE};

/// Paints the outermost 1-pixel frame [`BLACK`].
pub fn paint_frame(img: &mut Image<u8>) {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return;
    }
    let mut view = img.as_view_mut();
    view.row_mut(0).fill(BLACK);
    view.row_mut(h - 1).fill(BLACK);
    for y in 0..h {
        let row = view.row_mut(y);
        row[0] = BLACK;
        row[w - 1] = BLACK;
    }
}

/// Shifts the glyph up so its first [`WHITE`] row lands on row 1, just inside
/// the frame. Rows vacated at the bottom are filled [`BLACK`].
///
/// Returns the number of rows removed.
pub fn align_top(img: &mut Image<u8>) -> usize {
    let (w, h) = (img.width(), img.height());
    if w < 3 || h < 3 {
        return 0;
    }

    let interior = 1..w - 1;
    let first_white = {
        let view = img.as_view();
        (1..h).find(|&y| view.row(y)[interior.clone()].contains(&WHITE))
    };
    let Some(first) = first_white else {
        return 0;
    };

    let shift = first - 1;
    if shift == 0 {
        return 0;
    }

    let mut view = img.as_view_mut();
    for y in 1..h - shift {
        let src: Vec<u8> = view.row(y + shift)[interior.clone()].to_vec();
        view.row_mut(y)[interior.clone()].copy_from_slice(&src);
    }
    for y in h - shift..h {
        view.row_mut(y).fill(BLACK);
    }

    shift
}
