use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use igt_cli::{FrameDir, KnnClassifier, load_gray};
use igt_core::{Image, Rect};
use igt_digit::{
    BLACK, Margins, NormalizeConfig, RegionPass, WHITE, binarize, denoise_border,
    detect_and_filter_regions, normalize_digit_with,
};
use igt_scan::{
    CaptureRegion, Category, GameRegion, ProgressSink, ScanConfig, ScanOutcome, Scanner,
};
use image::GrayImage;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "ctr_igt")]
#[command(about = "Extract CTR in-game time from decoded video frames")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Locate every timer screen in a frame directory and read its digits.
    #[command(name = "scan")]
    Scan(ScanArgs),
    /// Run the digit normalization pipeline on one image.
    #[command(name = "normalize")]
    Normalize(NormalizeArgs),
    /// Binarize an image and report its white regions.
    #[command(name = "regions")]
    Regions(RegionsArgs),
}

#[derive(Args, Debug, Clone)]
struct ScanArgs {
    /// Directory of decoded frames, read in file-name order.
    #[arg(long, required = true)]
    frames: PathBuf,
    /// Directory holding `labels.txt` and `digits/img<i>.png`.
    #[arg(long, required = true)]
    model: PathBuf,
    #[arg(long, default_value = "ntsc-u")]
    region: GameRegion,
    #[arg(long, default_value = "any-percent")]
    category: Category,
    /// Game area of the frames as `x,y,width,height` (default: whole frame).
    #[arg(long, value_parser = parse_rect)]
    crop: Option<Rect>,
    /// JSON file overriding scan constants.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = KnnClassifier::DEFAULT_K)]
    k: usize,
    /// Receives `readings.json` and one `screen_<n>.png` per accepted screen.
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct NormalizeArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    /// Resize to the classifier crop (39x66) first; otherwise the probe crop
    /// (13x22) when `--probe` is given, or the input size.
    #[arg(long, default_value_t = false)]
    classify: bool,
    #[arg(long, default_value_t = false)]
    probe: bool,
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct RegionsArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value_t = 150)]
    min_size: usize,
    /// Blacken the estimated border margins before labelling.
    #[arg(long, default_value_t = false)]
    denoise: bool,
}

#[derive(Serialize)]
struct MetaNormalize {
    input: PathBuf,
    width: usize,
    height: usize,
    min_region_size: usize,
    aligned: bool,
    margins: MarginsDto,
    white_pixels: usize,
}

#[derive(Serialize)]
struct MarginsDto {
    left: Option<usize>,
    right: Option<usize>,
    top: Option<usize>,
    bottom: Option<usize>,
}

impl From<Margins> for MarginsDto {
    fn from(m: Margins) -> Self {
        Self {
            left: m.left,
            right: m.right,
            top: m.top,
            bottom: m.bottom,
        }
    }
}

#[derive(Serialize)]
struct RegionDto {
    size: usize,
    bbox: Rect,
}

#[derive(Serialize)]
struct ReadingsDto<'a> {
    total: String,
    laps: Vec<Vec<String>>,
    report: &'a igt_scan::ScanReport,
}

/// Prints occurrence progress to stderr.
struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn occurrence_found(&mut self, found: usize, expected: usize) {
        eprintln!("{found}/{expected} IGT screens found.");
    }

    fn occurrence_skipped(&mut self, candidates: usize) {
        eprintln!("skipped a timer screen: {candidates} candidate(s), none readable");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Scan(args) => run_scan(args),
        Command::Normalize(args) => run_normalize(args),
        Command::Regions(args) => run_regions(args),
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => read_json::<ScanConfig>(path)?,
        None => ScanConfig::default(),
    };
    let capture = args.crop.map_or(CaptureRegion::full(), CaptureRegion::new);

    let classifier = KnnClassifier::load_dir(&args.model, args.k)?;
    let mut frames = FrameDir::open(&args.frames, capture)?;
    info!(
        "scanning {} frames for {} timer screens ({}, {})",
        frames.len(),
        args.category.expected_count(),
        args.region,
        args.category
    );

    let scanner = Scanner::new(args.region, args.category, config)?;
    let report = scanner
        .run(&mut frames, &classifier, &mut StderrProgress)
        .with_context(|| format!("scanning {}", args.frames.display()))?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;
    for (i, reading) in report.readings.iter().enumerate() {
        save_u8_image(args.out.join(format!("screen_{i:03}.png")), &reading.screen)?;
    }

    let total = report.total();
    let laps = report
        .readings
        .iter()
        .map(|r| r.laps().map(|l| l.to_string()).collect())
        .collect();
    write_json(
        args.out.join("readings.json"),
        &ReadingsDto {
            total: total.to_string(),
            laps,
            report: &report,
        },
    )?;

    if let ScanOutcome::StreamExhausted { found, expected } = report.outcome {
        eprintln!("video ended early: {found}/{expected} timer screens read");
    }
    println!("Your in game time is: {total}");
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<()> {
    if args.classify && args.probe {
        bail!("--classify and --probe are mutually exclusive");
    }
    let src = load_gray(&args.input)?;
    let src = if args.classify || args.probe {
        let dims = if args.classify {
            igt_digit::DigitDims::CLASSIFY
        } else {
            igt_digit::DigitDims::PROBE
        };
        igt_core::resize_bilinear(&src.as_view(), dims.width, dims.height)
            .context("resizing digit")?
    } else {
        src
    };

    let cfg = NormalizeConfig::for_height(src.height());
    let mut stage = binarize(&src.as_view());
    let margins = denoise_border(&mut stage);
    let out = normalize_digit_with(&src.as_view(), &cfg);

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;
    save_u8_image(args.out.join("normalized.png"), &out)?;
    write_json(
        args.out.join("meta.json"),
        &MetaNormalize {
            input: args.input.clone(),
            width: out.width(),
            height: out.height(),
            min_region_size: cfg.min_region_size,
            aligned: cfg.align,
            margins: margins.into(),
            white_pixels: out.data().iter().filter(|&&v| v == WHITE).count(),
        },
    )?;
    println!("normalized {} -> {}", args.input.display(), args.out.display());
    Ok(())
}

fn run_regions(args: RegionsArgs) -> Result<()> {
    let src = load_gray(&args.input)?;
    let mut img = binarize(&src.as_view());
    if args.denoise {
        denoise_border(&mut img);
    }

    let kept = detect_and_filter_regions(&mut img, &RegionPass::white_blobs(args.min_size));
    let regions: Vec<RegionDto> = kept
        .iter()
        .map(|r| RegionDto {
            size: r.len(),
            bbox: bounding_box(&r.pixels),
        })
        .collect();

    let black = img.data().iter().filter(|&&v| v == BLACK).count();
    info!(
        "{}: {} region(s) kept, {black} black pixels after filtering",
        args.input.display(),
        regions.len()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&regions).context("serializing regions")?
    );
    Ok(())
}

fn bounding_box(pixels: &[(usize, usize)]) -> Rect {
    let Some(&(x0, y0)) = pixels.first() else {
        return Rect::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
    for &(x, y) in pixels {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts: Vec<usize> = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid rectangle '{s}': {e}"))?;
    match parts.as_slice() {
        &[x, y, w, h] if w > 0 && h > 0 => Ok(Rect::new(x, y, w, h)),
        _ => Err(format!("expected x,y,width,height with non-zero size, got '{s}'")),
    }
}

fn save_u8_image(path: PathBuf, img: &Image<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}
