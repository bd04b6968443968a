use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use igt_core::{Image, Rgb8};
use igt_scan::{CaptureRegion, CapturedFrame, FrameSource, ScanError};

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Frames stored as numbered image files, consumed in lexical name order.
#[derive(Debug)]
pub struct FrameDir {
    paths: Vec<PathBuf>,
    next: usize,
    capture: CaptureRegion,
}

impl FrameDir {
    pub fn open(dir: &Path, capture: CaptureRegion) -> Result<Self> {
        let entries =
            fs::read_dir(dir).with_context(|| format!("listing frames in {}", dir.display()))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("reading entry of {}", dir.display()))?
                .path();
            let is_frame = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if path.is_file() && is_frame {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            bail!("no frame images found in {}", dir.display());
        }
        paths.sort();

        Ok(Self {
            paths,
            next: 0,
            capture,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

pub fn load_rgb(path: &Path) -> Result<Image<Rgb8>, ScanError> {
    let rgb = image::open(path)
        .map_err(|e| ScanError::Source(format!("{}: {e}", path.display())))?
        .into_rgb8();
    let (w, h) = rgb.dimensions();
    let pixels: Vec<Rgb8> = rgb.pixels().map(|p| p.0).collect();
    Ok(Image::from_vec(w as usize, h as usize, pixels)?)
}

impl FrameSource for FrameDir {
    type Frame = CapturedFrame;

    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, ScanError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        let raw = load_rgb(path)?;
        self.capture.prepare(raw).map(Some)
    }
}
