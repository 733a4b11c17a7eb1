//! Recombine a text mask with the original colors.

use crate::filters::{Filter, Mask, MaskToAlpha};
use crate::interface::{PixelFormat, Raster, RGBA};
use crate::MaskError;
use serde::{Deserialize, Serialize};

/// How color channels of the output relate to its alpha.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaMode {
    /// Color channels hold the color itself.
    #[default]
    Straight,
    /// Color channels are multiplied by alpha.
    Premultiplied,
}

/// Settings for the final blend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeParams {
    pub alpha_mode: AlphaMode,
    /// Format of the produced raster.
    pub output_format: PixelFormat,
}

impl Default for CompositeParams {
    fn default() -> Self {
        CompositeParams {
            alpha_mode: AlphaMode::Straight,
            output_format: PixelFormat::RGBA8,
        }
    }
}

/// Convert the brightness of a mask into an alpha only raster.
pub fn mask_to_alpha(mask: &Mask) -> Result<Raster, MaskError> {
    MaskToAlpha.apply(mask.as_raster(), PixelFormat::ALPHA_F32)
}

fn blend(src: RGBA, bg: RGBA, m: f32, mode: AlphaMode) -> RGBA {
    let n = 1.0 - m;
    let a = src.a * m + bg.a * n;
    let premultiplied = |s: f32, b: f32| s * src.a * m + b * bg.a * n;
    let (r, g, b) = (
        premultiplied(src.r, bg.r),
        premultiplied(src.g, bg.g),
        premultiplied(src.b, bg.b),
    );
    match mode {
        AlphaMode::Premultiplied => RGBA::rgba(r, g, b, a),
        // Nothing to mix in, keep the source color as is.
        AlphaMode::Straight if bg.a == 0.0 => RGBA::rgba(src.r, src.g, src.b, a),
        AlphaMode::Straight if a > 0.0 => RGBA::rgba(r / a, g / a, b / a, a),
        AlphaMode::Straight => RGBA::transparent(),
    }
}

fn check_dimensions(what: &str, raster: &Raster, input: &Raster) -> Result<(), MaskError> {
    if raster.dimensions() != input.dimensions() {
        return Err(MaskError::CompositeUnavailable(format!(
            "{what} is {:?}, input is {:?}",
            raster.dimensions(),
            input.dimensions()
        )));
    }
    Ok(())
}

/// Blend input over background using the alpha of `alpha` as weight.
///
/// Without a background the input is blended against full transparency, every pixel keeps its
/// source color and gets `source alpha * mask alpha` as alpha.
pub fn blend_with_alpha_mask(
    input: &Raster,
    background: Option<&Raster>,
    alpha: &Raster,
    params: &CompositeParams,
) -> Result<Raster, MaskError> {
    check_dimensions("alpha mask", alpha, input)?;
    if let Some(bg) = background {
        check_dimensions("background", bg, input)?;
    }
    Raster::try_from_fn(
        input.width(),
        input.height(),
        params.output_format,
        |x, y| {
            let src = input.pixel(x, y)?;
            let m = alpha.pixel(x, y)?.a.clamp(0.0, 1.0);
            let bg = match background {
                Some(b) => b.pixel(x, y)?,
                None => RGBA::transparent(),
            };
            Ok(blend(src, bg, m, params.alpha_mode).clamped())
        },
    )
}

/// Keep the input colors where the mask is bright, make the rest transparent.
pub fn composite(
    input: &Raster,
    mask: &Mask,
    background: Option<&Raster>,
    params: &CompositeParams,
) -> Result<Raster, MaskError> {
    let alpha = mask_to_alpha(mask)?;
    blend_with_alpha_mask(input, background, &alpha, params)
}
