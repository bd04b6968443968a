use criterion::{Criterion, black_box, criterion_group, criterion_main};
use igt_core::Image;
use igt_digit::{DigitDims, RegionPass, Segmenter, binarize, normalize_digit};

fn noisy_digit(dims: DigitDims) -> Image<u8> {
    let (w, h) = (dims.width, dims.height);
    let mut data = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            let ring = (x as isize - w as isize / 2).abs() + (y as isize - h as isize / 2).abs();
            let base = if (w / 4..w / 2).contains(&(ring as usize)) { 220 } else { 80 };
            data.push((base + (x * 31 + y * 17) % 23) as u8);
        }
    }
    Image::from_vec(w, h, data).expect("valid image")
}

fn bench_normalize_classify(c: &mut Criterion) {
    let img = noisy_digit(DigitDims::CLASSIFY);
    let view = img.as_view();

    c.bench_function("normalize_digit_39x66", |b| {
        b.iter(|| {
            let out = normalize_digit(black_box(&view));
            black_box(out);
        });
    });
}

fn bench_normalize_probe(c: &mut Criterion) {
    let img = noisy_digit(DigitDims::PROBE);
    let view = img.as_view();

    c.bench_function("normalize_digit_13x22", |b| {
        b.iter(|| {
            let out = normalize_digit(black_box(&view));
            black_box(out);
        });
    });
}

fn bench_region_pass(c: &mut Criterion) {
    let bin = binarize(&noisy_digit(DigitDims::CLASSIFY).as_view());
    let pass = RegionPass::white_blobs(150);
    let mut seg = Segmenter::new();

    c.bench_function("detect_and_filter_regions_39x66", |b| {
        b.iter(|| {
            let mut img = bin.clone();
            let kept = seg.detect_and_filter(black_box(&mut img), &pass);
            black_box(kept.len());
        });
    });
}

criterion_group!(
    benches,
    bench_normalize_classify,
    bench_normalize_probe,
    bench_region_pass
);
criterion_main!(benches);
