//! Example: cut and normalize every digit of a saved timer screen.
//!
//! Loads a grayscale timer crop (as written by `ctr_igt scan`),
//! measures the column offset and per-row corrections, and writes each
//! normalized 39x66 digit as `<out>/r<row>d<digit>.png` plus a JSON summary.
//!
//! Run from the workspace root:
//!   cargo run -p ctr-igt --example timer_screen -- --help
//!   cargo run -p ctr-igt --example timer_screen -- --input screen_000.png

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ctr_igt::{
    DIGITS_PER_ROW, GameRegion, GeometryProfile, Image, LAP_ROWS, RowAligner, ScanConfig, WHITE,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "Normalize the digits of a saved timer screen")]
struct Args {
    /// Grayscale timer crop.
    #[arg(long)]
    input: PathBuf,

    /// Region preset the screen was captured with.
    #[arg(long, default_value = "ntsc-u")]
    region: GameRegion,

    /// Output directory (default: <input stem>_digits next to the input).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Serialize)]
struct RowDto {
    row: usize,
    y: usize,
    height: usize,
    ink_pixels: Vec<usize>,
}

#[derive(Serialize)]
struct Summary {
    region: GameRegion,
    column_offset: isize,
    elapsed_ms: f64,
    rows: Vec<RowDto>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let out_dir = args.out.clone().unwrap_or_else(|| {
        let stem = args.input.file_stem().unwrap_or_default().to_string_lossy();
        args.input.with_file_name(format!("{stem}_digits"))
    });
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let gray = image::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .into_luma8();
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let screen = Image::from_vec(w, h, gray.into_raw()).context("building screen image")?;

    let geometry = GeometryProfile::for_region(args.region);
    if (w, h) != (geometry.timer.width, geometry.timer.height) {
        bail!(
            "screen is {w}x{h}, {} timer crops are {}x{}",
            args.region,
            geometry.timer.width,
            geometry.timer.height
        );
    }

    let aligner = RowAligner::new(&geometry, ScanConfig::default().align_slack);
    let view = screen.as_view();

    let t0 = Instant::now();
    let dx = aligner.column_offset(&view)?;
    let digits = aligner.digits(&view, dx)?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    let mut rows = Vec::with_capacity(LAP_ROWS);
    for row in 0..LAP_ROWS {
        let rect = aligner.aligned_row(&view, row, dx)?;
        let mut ink_pixels = Vec::with_capacity(DIGITS_PER_ROW);
        for d in 0..DIGITS_PER_ROW {
            let digit = &digits[row * DIGITS_PER_ROW + d];
            ink_pixels.push(digit.data().iter().filter(|&&v| v == WHITE).count());

            let path = out_dir.join(format!("r{row}d{d}.png"));
            image::GrayImage::from_raw(
                digit.width() as u32,
                digit.height() as u32,
                digit.data().to_vec(),
            )
            .context("wrapping digit buffer")?
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        }
        println!("  row {row}: y {}..{}  ink {ink_pixels:?}", rect.y, rect.bottom());
        rows.push(RowDto {
            row,
            y: rect.y,
            height: rect.height,
            ink_pixels,
        });
    }
    println!("column offset {dx}, {elapsed_ms:.2} ms");

    let summary = Summary {
        region: args.region,
        column_offset: dx,
        elapsed_ms,
        rows,
    };
    let out_path = out_dir.join("summary.json");
    let out_file = std::fs::File::create(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    serde_json::to_writer_pretty(out_file, &summary)
        .with_context(|| format!("writing JSON to {}", out_path.display()))?;

    println!("results written to {}", out_dir.display());
    Ok(())
}
