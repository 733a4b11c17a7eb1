//! Background polarity detection and correction.
//!
//! The background is judged from a single scanline, the top one by default. This assumes the
//! border of the picture shows the page background and only a single background tone exists.

use crate::filters::{ColorInvert, Filter, Mask};
use crate::interface::{Image, PixelFormat};
use crate::MaskError;
use serde::{Deserialize, Serialize};

/// Whether the background is lighter or darker than the text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Light background, dark text.
    Light,
    /// Dark background, light text.
    Dark,
}

impl Polarity {
    pub fn is_light(&self) -> bool {
        *self == Polarity::Light
    }
}

/// Where and how the background is sampled.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarityParams {
    /// Row that is sampled.
    pub scanline: u32,
    /// A pixel counts as bright if its white component exceeds this.
    pub threshold: f32,
}

impl Default for PolarityParams {
    fn default() -> Self {
        PolarityParams {
            scanline: 0,
            threshold: 0.5,
        }
    }
}

/// Outcome of a scan, with the counts that led to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PolarityScan {
    pub polarity: Polarity,
    /// Pixels on the scanline brighter than the threshold.
    pub bright_count: u32,
    /// Pixels on the scanline.
    pub sampled: u32,
}

/// Classify the background by counting bright pixels on the scanline.
///
/// The background is light only if strictly more than `width / 2` pixels are bright, ties go to
/// dark. An image without pixels on the scanline (zero width or zero height) is dark.
pub fn detect_polarity(
    image: &dyn Image,
    params: &PolarityParams,
) -> Result<PolarityScan, MaskError> {
    let width = image.width();
    if image.height() == 0 {
        return Ok(PolarityScan {
            polarity: Polarity::Dark,
            bright_count: 0,
            sampled: 0,
        });
    }

    let mut bright_count = 0u32;
    for x in 0..width {
        if image.pixel(x, params.scanline)?.white_component() > params.threshold {
            bright_count += 1;
        }
    }

    let polarity = if bright_count > width / 2 {
        Polarity::Light
    } else {
        Polarity::Dark
    };
    log::trace!("scanline {}: {bright_count} of {width} bright, {polarity:?}", params.scanline);
    Ok(PolarityScan {
        polarity,
        bright_count,
        sampled: width,
    })
}

/// Make the text the bright band, inverting the mask for a light background.
pub fn correct_polarity(
    mask: Mask,
    polarity: Polarity,
    format: PixelFormat,
) -> Result<Mask, MaskError> {
    match polarity {
        Polarity::Light => Ok(Mask::from_raster(
            ColorInvert.apply(mask.as_raster(), format)?,
        )),
        Polarity::Dark => Ok(mask),
    }
}
