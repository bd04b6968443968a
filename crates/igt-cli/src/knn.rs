use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use igt_core::{Image, ImageView};
use igt_digit::DigitDims;
use igt_scan::DigitClassifier;
use log::debug;

/// k-nearest-neighbour digit classifier over normalized digit images.
///
/// Distance is Euclidean over raw pixel values; the `k` nearest samples vote
/// and ties go to the smaller digit.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    dims: DigitDims,
    samples: Vec<Vec<u8>>,
    labels: Vec<u8>,
}

impl KnnClassifier {
    pub const DEFAULT_K: usize = 5;

    pub fn new(k: usize, dims: DigitDims) -> Self {
        Self {
            k: k.max(1),
            dims,
            samples: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn add_sample(&mut self, img: &ImageView<'_, u8>, label: u8) -> Result<()> {
        if (img.width(), img.height()) != (self.dims.width, self.dims.height) {
            bail!(
                "sample is {}x{}, expected {}x{}",
                img.width(),
                img.height(),
                self.dims.width,
                self.dims.height
            );
        }
        if label > 9 {
            bail!("label {label} is not a digit");
        }
        self.samples
            .push(img.rows().flat_map(|r| r.iter().copied()).collect());
        self.labels.push(label);
        Ok(())
    }

    /// Loads `labels.txt` (first line: one digit per sample) and
    /// `digits/img<i>.png` from `dir`.
    pub fn load_dir(dir: &Path, k: usize) -> Result<Self> {
        let labels_path = dir.join("labels.txt");
        let text = fs::read_to_string(&labels_path)
            .with_context(|| format!("reading {}", labels_path.display()))?;
        let line = text.lines().next().unwrap_or_default().trim();

        let mut knn = Self::new(k, DigitDims::CLASSIFY);
        for (i, ch) in line.chars().enumerate() {
            let Some(label) = ch.to_digit(10) else {
                bail!("{}: label {i} is '{ch}', not a digit", labels_path.display());
            };
            let path = dir.join("digits").join(format!("img{i}.png"));
            let img = load_gray(&path)?;
            knn.add_sample(&img.as_view(), label as u8)
                .with_context(|| format!("adding {}", path.display()))?;
        }
        if knn.is_empty() {
            bail!("{} lists no samples", labels_path.display());
        }
        debug!("loaded {} digit samples from {}", knn.len(), dir.display());
        Ok(knn)
    }

    fn distance(sample: &[u8], digit: &ImageView<'_, u8>) -> u64 {
        digit
            .rows()
            .flat_map(|r| r.iter())
            .zip(sample)
            .map(|(&a, &b)| {
                let d = a as i64 - b as i64;
                (d * d) as u64
            })
            .sum()
    }
}

impl DigitClassifier for KnnClassifier {
    fn classify(&self, digit: &ImageView<'_, u8>) -> u8 {
        let mut ranked: Vec<(u64, usize)> = self
            .samples
            .iter()
            .enumerate()
            .map(|(i, s)| (Self::distance(s, digit), i))
            .collect();
        ranked.sort_unstable();

        let mut votes = [0usize; 10];
        for &(_, i) in ranked.iter().take(self.k) {
            votes[self.labels[i] as usize] += 1;
        }
        // max_by_key keeps the last maximum; scan from 9 down so it is the
        // smallest digit.
        (0..10u8)
            .rev()
            .max_by_key(|&d| votes[d as usize])
            .unwrap_or(0)
    }
}

pub fn load_gray(path: &Path) -> Result<Image<u8>> {
    let luma = image::open(path)
        .with_context(|| format!("opening image {}", path.display()))?
        .into_luma8();
    let (w, h) = luma.dimensions();
    Image::from_vec(w as usize, h as usize, luma.into_raw())
        .with_context(|| format!("constructing image from {}", path.display()))
}
