use std::collections::VecDeque;

use igt_core::Image;

use crate::{BLACK, GRAY, WHITE};

const DX: [isize; 8] = [1, 0, -1, 0, 1, -1, 1, -1];
const DY: [isize; 8] = [0, 1, 0, -1, 1, 1, -1, -1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    C4,
    C8,
}

impl Connectivity {
    fn neighbours(self) -> usize {
        match self {
            Self::C4 => 4,
            Self::C8 => 8,
        }
    }
}

/// A connected set of same-coloured pixels, in breadth-first discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    pub pixels: Vec<(usize, usize)>,
}

impl Region {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn paint(&self, img: &mut Image<u8>, color: u8) {
        for &(x, y) in &self.pixels {
            if let Some(px) = img.get_mut(x, y) {
                *px = color;
            }
        }
    }
}

/// Parameters for one [`detect_and_filter_regions`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPass {
    /// Colour of the pixels being grouped.
    pub source: u8,
    /// Colour given to every visited pixel.
    pub paint: u8,
    /// Colour given to regions smaller than `min_size`.
    pub reject: u8,
    pub min_size: usize,
    pub connectivity: Connectivity,
}

impl RegionPass {
    /// White blobs below `min_size` go black; survivors are marked gray.
    pub fn white_blobs(min_size: usize) -> Self {
        Self {
            source: WHITE,
            paint: GRAY,
            reject: BLACK,
            min_size,
            connectivity: Connectivity::C8,
        }
    }
}

/// Breadth-first region labeller.
///
/// Visitation is tracked in a label arena indexed by flat coordinate, so a
/// region may be painted with its own source colour without being revisited.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    width: usize,
    height: usize,
    visited: Vec<bool>,
    queue: VecDeque<usize>,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.visited.clear();
        self.visited.resize(width * height, false);
        self.queue.clear();
    }

    fn fill(
        &mut self,
        img: &mut Image<u8>,
        seed: (usize, usize),
        source: u8,
        paint: u8,
        connectivity: Connectivity,
    ) -> Region {
        let (w, h) = (self.width, self.height);
        let (sx, sy) = seed;
        let seed_idx = sy * w + sx;
        if sx >= w || sy >= h || self.visited[seed_idx] || img.data()[seed_idx] != source {
            return Region::default();
        }

        let mut pixels = Vec::new();
        self.visited[seed_idx] = true;
        img.data_mut()[seed_idx] = paint;
        self.queue.push_back(seed_idx);

        while let Some(p) = self.queue.pop_front() {
            let (x, y) = (p % w, p / w);
            pixels.push((x, y));

            for k in 0..connectivity.neighbours() {
                let nx = x as isize + DX[k];
                let ny = y as isize + DY[k];
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let q = ny as usize * w + nx as usize;
                if self.visited[q] || img.data()[q] != source {
                    continue;
                }
                self.visited[q] = true;
                img.data_mut()[q] = paint;
                self.queue.push_back(q);
            }
        }

        Region { pixels }
    }

    /// Flood-fills the `source`-coloured region containing `seed`, repainting
    /// it with `paint`. Returns an empty region when `seed` is outside the
    /// image or not `source`-coloured.
    pub fn flood_fill(
        &mut self,
        img: &mut Image<u8>,
        seed: (usize, usize),
        source: u8,
        paint: u8,
        connectivity: Connectivity,
    ) -> Region {
        self.reset(img.width(), img.height());
        if seed.0 >= img.width() || seed.1 >= img.height() {
            return Region::default();
        }
        self.fill(img, seed, source, paint, connectivity)
    }

    /// Labels every `source` region seeded from an interior pixel (the outer
    /// 1-pixel frame is never used as a seed). Regions smaller than
    /// `min_size` are repainted `reject`; the rest keep `paint` and are
    /// returned in row-major discovery order.
    pub fn detect_and_filter(&mut self, img: &mut Image<u8>, pass: &RegionPass) -> Vec<Region> {
        let (w, h) = (img.width(), img.height());
        self.reset(w, h);

        let mut kept = Vec::new();
        for y in 1..h.saturating_sub(1) {
            for x in 1..w.saturating_sub(1) {
                let idx = y * w + x;
                if self.visited[idx] || img.data()[idx] != pass.source {
                    continue;
                }

                let region = self.fill(img, (x, y), pass.source, pass.paint, pass.connectivity);
                if region.len() < pass.min_size {
                    region.paint(img, pass.reject);
                } else {
                    kept.push(region);
                }
            }
        }

        kept
    }
}

/// One-shot [`Segmenter::flood_fill`].
pub fn flood_fill(
    img: &mut Image<u8>,
    seed: (usize, usize),
    source: u8,
    paint: u8,
    connectivity: Connectivity,
) -> Region {
    Segmenter::new().flood_fill(img, seed, source, paint, connectivity)
}

/// One-shot [`Segmenter::detect_and_filter`].
pub fn detect_and_filter_regions(img: &mut Image<u8>, pass: &RegionPass) -> Vec<Region> {
    Segmenter::new().detect_and_filter(img, pass)
}

/// Removes [`WHITE`] blobs smaller than `min_size` (they become [`BLACK`]) and
/// returns the surviving regions, restored to [`WHITE`].
pub fn remove_small_regions(img: &mut Image<u8>, min_size: usize) -> Vec<Region> {
    let kept = detect_and_filter_regions(img, &RegionPass::white_blobs(min_size));
    for region in &kept {
        region.paint(img, WHITE);
    }
    kept
}

#[cfg(test)]
mod tests {
    use igt_core::Image;

    use super::{
        Connectivity, RegionPass, detect_and_filter_regions, flood_fill, remove_small_regions,
    };
    use crate::{BLACK, GRAY, WHITE};

    /// 13x22 black canvas with a 5x10 white blob at (4, 6).
    fn blob_canvas() -> Image<u8> {
        Image::from_fn(13, 22, |x, y| {
            if (4..9).contains(&x) && (6..16).contains(&y) {
                WHITE
            } else {
                BLACK
            }
        })
    }

    #[test]
    fn blob_above_min_size_is_kept() {
        let mut img = blob_canvas();
        let kept = detect_and_filter_regions(&mut img, &RegionPass::white_blobs(20));

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].len(), 50);
        assert_eq!(kept[0].pixels[0], (4, 6));
        assert_eq!(img.data().iter().filter(|&&v| v == GRAY).count(), 50);
    }

    #[test]
    fn blob_below_min_size_is_rejected() {
        let mut img = blob_canvas();
        let kept = detect_and_filter_regions(&mut img, &RegionPass::white_blobs(60));

        assert!(kept.is_empty());
        assert!(img.data().iter().all(|&v| v == BLACK));
    }

    #[test]
    fn second_pass_finds_nothing() {
        let mut img = blob_canvas();
        *img.get_mut(1, 1).expect("in bounds") = WHITE;
        let pass = RegionPass::white_blobs(20);

        let first = detect_and_filter_regions(&mut img, &pass);
        let second = detect_and_filter_regions(&mut img, &pass);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn fill_is_independent_of_seed() {
        let base = blob_canvas();

        let mut a = base.clone();
        let mut b = base.clone();
        let mut ra = flood_fill(&mut a, (4, 6), WHITE, GRAY, Connectivity::C4);
        let mut rb = flood_fill(&mut b, (8, 15), WHITE, GRAY, Connectivity::C4);
        ra.pixels.sort_unstable();
        rb.pixels.sort_unstable();

        assert_eq!(ra, rb);
        assert_eq!(a, b);
    }

    #[test]
    fn diagonal_neighbours_only_join_under_c8() {
        let img = Image::from_fn(6, 6, |x, y| if x == y { WHITE } else { BLACK });

        let mut c4 = img.clone();
        assert_eq!(flood_fill(&mut c4, (1, 1), WHITE, GRAY, Connectivity::C4).len(), 1);

        let mut c8 = img.clone();
        assert_eq!(flood_fill(&mut c8, (1, 1), WHITE, GRAY, Connectivity::C8).len(), 6);
    }

    #[test]
    fn painting_with_source_colour_terminates() {
        let mut img = blob_canvas();
        let region = flood_fill(&mut img, (5, 7), WHITE, WHITE, Connectivity::C8);
        assert_eq!(region.len(), 50);
        assert_eq!(img, blob_canvas());
    }

    #[test]
    fn seed_of_wrong_colour_yields_empty_region() {
        let mut img = blob_canvas();
        assert!(flood_fill(&mut img, (0, 0), WHITE, GRAY, Connectivity::C8).is_empty());
        assert!(flood_fill(&mut img, (40, 0), WHITE, GRAY, Connectivity::C8).is_empty());
    }

    #[test]
    fn noise_removal_restores_survivors_to_white() {
        let mut img = blob_canvas();
        *img.get_mut(1, 20).expect("in bounds") = WHITE;
        *img.get_mut(11, 2).expect("in bounds") = WHITE;

        let kept = remove_small_regions(&mut img, 20);

        assert_eq!(kept.len(), 1);
        assert_eq!(img, blob_canvas());
    }
}
