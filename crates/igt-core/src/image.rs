use crate::{Error, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds an image by evaluating `f(x, y)` in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<T> {
        self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.width + x)
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    pub fn as_view_mut(&mut self) -> ImageViewMut<'_, T> {
        ImageViewMut {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &mut self.data,
        }
    }
}

impl<T: Copy> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }

    /// Copies the pixels under `rect` into a new owned image.
    pub fn crop(&self, rect: Rect) -> Result<Image<T>, Error> {
        Ok(self.as_view().subview(rect)?.to_image())
    }
}

/// Borrowed, possibly strided window into an [`Image`].
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).map(|y| self.row(y))
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Borrows the pixels under `rect`; fails instead of clipping.
    pub fn subview(&self, rect: Rect) -> Result<ImageView<'a, T>, Error> {
        let start = window_start(rect, self.width, self.height, self.stride)?;
        Ok(ImageView {
            width: rect.width,
            height: rect.height,
            stride: self.stride,
            data: &self.data[start..],
        })
    }
}

impl<T: Copy> ImageView<'_, T> {
    pub fn to_image(&self) -> Image<T> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for row in self.rows() {
            data.extend_from_slice(row);
        }
        Image {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Mutable counterpart of [`ImageView`].
#[derive(Debug)]
pub struct ImageViewMut<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a mut [T],
}

impl<T> ImageViewMut<'_, T> {
    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    pub fn subview_mut(&mut self, rect: Rect) -> Result<ImageViewMut<'_, T>, Error> {
        let start = window_start(rect, self.width, self.height, self.stride)?;
        Ok(ImageViewMut {
            width: rect.width,
            height: rect.height,
            stride: self.stride,
            data: &mut self.data[start..],
        })
    }
}

impl<T: Copy> ImageViewMut<'_, T> {
    pub fn fill(&mut self, value: T) {
        for y in 0..self.height {
            self.row_mut(y).fill(value);
        }
    }
}

/// Offset of `rect`'s first pixel in a buffer of the given shape. Views only
/// come from owned images, so the buffer always holds at least
/// `(height - 1) * stride + width` elements.
fn window_start(rect: Rect, width: usize, height: usize, stride: usize) -> Result<usize, Error> {
    if !rect.fits_within(width, height) {
        return Err(Error::OutOfBounds {
            rect,
            width,
            height,
        });
    }
    if rect.is_empty() {
        return Ok(0);
    }
    Ok(rect.y * stride + rect.x)
}
