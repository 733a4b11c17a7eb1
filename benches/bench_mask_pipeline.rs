use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::Rgba;
use text_mask::image_support::raster_from_rgba_image;
use text_mask::test_util::{draw_bar, page, test_alphabet};
use text_mask::{MaskPipeline, PixelFormat};

fn criterion_benchmark(c: &mut Criterion) {
    let mut image = page(
        640,
        480,
        Rgba([240u8, 236, 228, 255]),
        0,
        0,
        "",
        Rgba([0u8, 0, 0, 255]),
    );
    for line in 0..40u32 {
        test_alphabet::render_standard_color(
            &mut image,
            8,
            20 + line * (test_alphabet::LETTER_HEIGHT + 4),
            "abcdew abcdew abcdew abcdew abcdew",
            Rgba([30u8, 30, 90, 255]),
        );
    }
    draw_bar(&mut image, 470, 4, Rgba([200u8, 40, 40, 255]));

    let rgba = raster_from_rgba_image(&image).expect("valid image");
    let argb = rgba.convert(PixelFormat::ARGB8).expect("valid image");
    let pipeline = MaskPipeline::default();

    c.bench_function("mask_pipeline_rgba", |b| {
        b.iter(|| {
            let mask = pipeline.run(&rgba);
            black_box(mask).expect("extraction succeeds");
        })
    });
    c.bench_function("mask_pipeline_argb", |b| {
        b.iter(|| {
            let mask = pipeline.run(&argb);
            black_box(mask).expect("extraction succeeds");
        })
    });
}

fn short_warmup() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::new(2, 0))
        .measurement_time(std::time::Duration::new(10, 0))
        .sample_size(50)
}

criterion_group!(
name = benches;
config = short_warmup();
targets = criterion_benchmark
);
criterion_main!(benches);
