//! Extract the text of an image as a colored mask.
//!
//! The color image is turned into a monochrome brightness mask, posterized into three bands,
//! inverted if the background turns out to be light, and finally used as alpha for the original
//! colors. Everything that is not text ends up transparent.

pub mod composite;
pub mod config;
pub mod filters;
pub mod polarity;
pub mod util;

mod error;
pub use error::*;

mod interface;
pub use interface::*;

// This here ensures that we have image support when the feature is enabled, but also for all tests.
#[cfg(any(test, feature = "image_support"))]
pub mod image_support;
#[cfg(any(test, feature = "image_support"))]
pub mod test_util;

use composite::composite;
use config::MaskConfig;
use filters::{Filter, Mask};
use polarity::{correct_polarity, detect_polarity, Polarity};
use serde::Serialize;

/// What happened during a single pipeline run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct MaskReport {
    pub width: u32,
    pub height: u32,
    pub polarity: Polarity,
    /// Bright pixels found on the sampled scanline.
    pub bright_count: u32,
    /// Whether the mask was inverted to make the text bright.
    pub inverted: bool,
}

/// The text mask pipeline, built once from a configuration and then run per image.
///
/// Holds no state between runs, a single pipeline can be shared between threads.
pub struct MaskPipeline {
    config: MaskConfig,
    normalizer: Option<Box<dyn Filter + Send + Sync>>,
    background: Option<Raster>,
}

impl Default for MaskPipeline {
    fn default() -> Self {
        MaskPipeline::new(MaskConfig::default())
    }
}

fn at(stage: Stage) -> impl FnOnce(MaskError) -> ExtractionError {
    move |source| ExtractionError { stage, source }
}

impl MaskPipeline {
    pub fn new(config: MaskConfig) -> Self {
        MaskPipeline {
            config,
            normalizer: None,
            background: None,
        }
    }

    /// Replace the monochrome conversion with another filter.
    pub fn with_normalizer(mut self, normalizer: Box<dyn Filter + Send + Sync>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Blend against this raster instead of full transparency.
    pub fn with_background(mut self, background: Raster) -> Self {
        self.background = Some(background);
        self
    }

    pub fn config(&self) -> &MaskConfig {
        &self.config
    }

    /// Brightness representation of the input, monochrome conversion followed by color controls.
    pub fn normalize(&self, input: &Raster) -> Result<Mask, MaskError> {
        let format = self.config.working_format;
        let mono = match &self.normalizer {
            Some(f) => f.apply(input, format)?,
            None => self.config.monochrome.apply(input, format)?,
        };
        let adjusted = self.config.color_controls.apply(&mono, format)?;
        Ok(Mask::from_raster(adjusted))
    }

    pub fn posterize(&self, mask: &Mask) -> Result<Mask, MaskError> {
        let posterized = self
            .config
            .posterize
            .apply(mask.as_raster(), self.config.working_format)?;
        Ok(Mask::from_raster(posterized))
    }

    /// Run all stages, the first failing stage aborts the run.
    pub fn run_with_report(&self, input: &Raster) -> Result<(Raster, MaskReport), ExtractionError> {
        let normalized = self.normalize(input).map_err(at(Stage::Normalize))?;
        let posterized = self.posterize(&normalized).map_err(at(Stage::Posterize))?;
        let scan = detect_polarity(&posterized, &self.config.polarity)
            .map_err(at(Stage::DetectPolarity))?;
        let text_mask = correct_polarity(posterized, scan.polarity, self.config.working_format)
            .map_err(at(Stage::CorrectPolarity))?;
        let output = composite(
            input,
            &text_mask,
            self.background.as_ref(),
            &self.config.composite,
        )
        .map_err(at(Stage::Composite))?;

        let report = MaskReport {
            width: input.width(),
            height: input.height(),
            polarity: scan.polarity,
            bright_count: scan.bright_count,
            inverted: scan.polarity.is_light(),
        };
        Ok((output, report))
    }

    pub fn run(&self, input: &Raster) -> Result<Raster, ExtractionError> {
        self.run_with_report(input).map(|(output, _)| output)
    }

    /// The text mask, or a copy of the input if the mask cannot be made.
    ///
    /// The failure is dropped silently, use [`MaskPipeline::run`] to see it.
    pub fn run_or_original(&self, input: &Raster) -> Raster {
        self.run(input).unwrap_or_else(|_| input.clone())
    }
}

/// Colored text on a transparent background, None if extraction failed.
pub fn colorized_mask_image(image: &Raster) -> Option<Raster> {
    MaskPipeline::default().run(image).ok()
}

/// Colored text mask with the default pipeline, the image itself if that fails.
pub fn mask_or_original(image: &Raster) -> Raster {
    match MaskPipeline::default().run(image) {
        Ok(output) => output,
        Err(e) => {
            log::warn!("{e}, using the original image");
            image.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_support::raster_from_rgba_image;
    use crate::test_util::{page, scale_image_rgba, test_alphabet};
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    /// Filter that never produces output.
    struct Unavailable;
    impl Filter for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }
        fn apply(&self, _: &Raster, _: PixelFormat) -> Result<Raster, MaskError> {
            Err(MaskError::FilterUnavailable {
                filter: self.name(),
                reason: String::from("simulated"),
            })
        }
    }

    fn alpha(r: &Raster, x: u32, y: u32) -> u8 {
        r.pixel(x, y).unwrap().to_u8()[3]
    }

    #[test]
    fn all_white_becomes_transparent() {
        let input = Raster::filled(10, 10, PixelFormat::RGBA8, RGBA::white());
        let (out, report) = MaskPipeline::default().run_with_report(&input).unwrap();
        assert_eq!(out.dimensions(), (10, 10));
        assert_eq!(report.polarity, Polarity::Light);
        assert_eq!(report.bright_count, 10);
        assert!(report.inverted);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(alpha(&out, x, y), 0);
            }
        }
    }

    #[test]
    fn black_top_row_keeps_bright_band() {
        // Black top row and a black vertical stroke on a white interior.
        let input = Raster::from_fn(10, 10, PixelFormat::RGBA8, |x, y| {
            if y == 0 || (x == 4 && (2..8).contains(&y)) {
                RGBA::black()
            } else {
                RGBA::white()
            }
        });
        let (out, report) = MaskPipeline::default().run_with_report(&input).unwrap();
        assert_eq!(report.polarity, Polarity::Dark);
        assert!(!report.inverted);
        // No inversion, so the dark pixels drop out and the bright band stays.
        assert_eq!(alpha(&out, 4, 0), 0);
        assert_eq!(alpha(&out, 4, 5), 0);
        assert_eq!(out.pixel(1, 5).unwrap().to_u8(), [255, 255, 255, 255]);
    }

    #[test]
    fn dark_text_on_light_page() {
        let image = page(40, 12, WHITE, 2, 2, "abc", BLACK);
        let input = raster_from_rgba_image(&image).unwrap();
        let (out, report) = MaskPipeline::default().run_with_report(&input).unwrap();
        assert_eq!(report.polarity, Polarity::Light);
        // Top of the 'a', its stamp starts one pixel after x = 2.
        assert_eq!(out.pixel(5, 2).unwrap().to_u8(), [0, 0, 0, 255]);
        assert_eq!(alpha(&out, 0, 0), 0);
        assert_eq!(alpha(&out, 4, 2), 0);
        assert_eq!(alpha(&out, 39, 11), 0);
    }

    #[test]
    fn light_text_on_dark_page_keeps_its_color() {
        let yellow = Rgba([255, 220, 0, 255]);
        let image = page(40, 12, BLACK, 2, 2, "abc", yellow);
        let input = raster_from_rgba_image(&image).unwrap();
        let (out, report) = MaskPipeline::default().run_with_report(&input).unwrap();
        assert_eq!(report.polarity, Polarity::Dark);
        assert_eq!(out.pixel(5, 2).unwrap().to_u8(), [255, 220, 0, 255]);
        assert_eq!(alpha(&out, 4, 2), 0);
        assert_eq!(alpha(&out, 0, 11), 0);
    }

    #[test]
    fn scaled_text_is_kept() {
        let mut image = page(60, 30, WHITE, 0, 0, "", BLACK);
        let glyph = scale_image_rgba(&test_alphabet::letter('w', BLACK), 2.0);
        assert_eq!(glyph.dimensions(), (22, 14));
        test_util::apply_stamp(&mut image, 10, 10, &glyph);
        let input = raster_from_rgba_image(&image).unwrap();
        let out = MaskPipeline::default().run(&input).unwrap();
        // The 'w' starts with a stroke in its top left corner.
        assert_eq!(alpha(&out, 10, 10), 255);
        assert_eq!(alpha(&out, 9, 10), 0);
        assert_eq!(alpha(&out, 0, 0), 0);
    }

    #[test]
    fn output_has_input_dimensions() {
        for (w, h) in [(1, 1), (7, 3), (3, 7), (0, 4), (4, 0)] {
            let input = Raster::from_fn(w, h, PixelFormat::RGBA8, |x, y| {
                RGBA::from_u8([(x * 30) as u8, (y * 30) as u8, 90, 255])
            });
            let out = MaskPipeline::default().run(&input).unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    #[test]
    fn zero_width_is_dark_without_error() {
        let input = Raster::packed(0, 3, PixelFormat::RGBA8, vec![]).unwrap();
        let (_, report) = MaskPipeline::default().run_with_report(&input).unwrap();
        assert_eq!(report.polarity, Polarity::Dark);
    }

    #[test]
    fn channel_order_does_not_change_the_result() {
        let image = page(30, 10, WHITE, 1, 1, "dew", Rgba([20, 40, 160, 255]));
        let rgba = raster_from_rgba_image(&image).unwrap();
        let argb = rgba.convert(PixelFormat::ARGB8).unwrap();
        assert_eq!(argb.format().order, ChannelOrder::Argb);
        let pipeline = MaskPipeline::default();
        assert_eq!(pipeline.run(&rgba).unwrap(), pipeline.run(&argb).unwrap());
    }

    #[test]
    fn failing_normalizer_aborts() {
        let input = Raster::filled(10, 10, PixelFormat::RGBA8, RGBA::white());
        let pipeline = MaskPipeline::default().with_normalizer(Box::new(Unavailable));
        let err = pipeline.run(&input).unwrap_err();
        assert_eq!(err.stage, Stage::Normalize);
        assert!(matches!(err.source, MaskError::FilterUnavailable { .. }));
        assert_eq!(pipeline.run_or_original(&input), input);
    }

    #[test]
    fn fallback_is_an_exact_copy() {
        let input = Raster::from_fn(5, 2, PixelFormat::ARGB8, |x, y| {
            RGBA::from_u8([(x * 50) as u8, (y * 90) as u8, 7, 255])
        });
        let mut config = MaskConfig::default();
        config.posterize.levels = 0;
        let pipeline = MaskPipeline::new(config);
        assert!(pipeline.run(&input).is_err());
        let out = pipeline.run_or_original(&input);
        assert_eq!(out.format(), PixelFormat::ARGB8);
        assert_eq!(out, input);
    }

    #[test]
    fn invalid_levels_fail_in_posterize() {
        let mut config = MaskConfig::default();
        config.posterize.levels = 1;
        let input = Raster::filled(4, 4, PixelFormat::RGBA8, RGBA::white());
        let err = MaskPipeline::new(config).run(&input).unwrap_err();
        assert_eq!(err.stage, Stage::Posterize);
    }

    #[test]
    fn free_functions() {
        let input = Raster::filled(3, 3, PixelFormat::RGBA8, RGBA::white());
        let out = colorized_mask_image(&input).expect("default pipeline succeeds");
        assert_eq!(alpha(&out, 1, 1), 0);
        assert_eq!(mask_or_original(&input), out);
    }

    #[test]
    fn posterized_mask_has_three_values() {
        let input = Raster::from_fn(64, 4, PixelFormat::RGBA8, |x, y| {
            RGBA::from_u8([(x * 4) as u8, (y * 60) as u8, 255 - (x * 4) as u8, 255])
        });
        let pipeline = MaskPipeline::default();
        let mask = pipeline
            .posterize(&pipeline.normalize(&input).unwrap())
            .unwrap();
        let mut seen: Vec<f32> = vec![];
        for y in 0..4 {
            for x in 0..64 {
                let v = mask.brightness(x, y).unwrap();
                if !seen.contains(&v) {
                    seen.push(v);
                }
            }
        }
        assert!(seen.len() <= 3, "{seen:?}");
    }

    #[test]
    fn background_raster_is_used() {
        let input = Raster::filled(4, 4, PixelFormat::RGBA8, RGBA::white());
        let background = Raster::filled(4, 4, PixelFormat::RGBA8, RGBA::rgb(0.0, 0.0, 1.0));
        let out = MaskPipeline::default()
            .with_background(background)
            .run(&input)
            .unwrap();
        assert_eq!(out.pixel(2, 2).unwrap().to_u8(), [0, 0, 255, 255]);
    }

    #[test]
    fn pipeline_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MaskPipeline>();
    }
}
