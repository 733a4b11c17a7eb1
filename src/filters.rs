//! Per-pixel filters that turn a color raster into a brightness mask.
//!
//! Every filter reads its input through the raster access layer and writes a new raster in the
//! requested pixel format, inputs are never modified.

use crate::interface::{Image, PixelFormat, Raster, RGBA};
use crate::MaskError;
use serde::{Deserialize, Serialize};

/// A transformation from one raster into a new raster.
pub trait Filter {
    /// Short name, used in error reporting.
    fn name(&self) -> &'static str;

    /// Produce a new raster in `format` from the input raster.
    fn apply(&self, input: &Raster, format: PixelFormat) -> Result<Raster, MaskError>;
}

/// Build a raster of the same dimensions by mapping every pixel.
fn map_pixels<F>(input: &Raster, format: PixelFormat, f: F) -> Result<Raster, MaskError>
where
    F: Fn(RGBA) -> RGBA,
{
    Raster::try_from_fn(input.width(), input.height(), format, |x, y| {
        Ok(f(input.pixel(x, y)?))
    })
}

fn check_finite(filter: &'static str, name: &str, v: f32) -> Result<(), MaskError> {
    if !v.is_finite() {
        return Err(MaskError::filter(filter, format!("{name} is not finite: {v}")));
    }
    Ok(())
}

/// A raster whose pixels mean brightness or opacity instead of color.
///
/// The brightness of a pixel is its white component.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    raster: Raster,
}

impl Mask {
    pub fn from_raster(raster: Raster) -> Mask {
        Mask { raster }
    }
    pub fn as_raster(&self) -> &Raster {
        &self.raster
    }
    pub fn into_raster(self) -> Raster {
        self.raster
    }

    /// Brightness at (x, y), in [0, 1].
    pub fn brightness(&self, x: u32, y: u32) -> Result<f32, MaskError> {
        Ok(self.raster.pixel(x, y)?.white_component())
    }
}

impl Image for Mask {
    fn width(&self) -> u32 {
        self.raster.width()
    }
    fn height(&self) -> u32 {
        self.raster.height()
    }
    fn format(&self) -> PixelFormat {
        self.raster.format()
    }
    fn pixel(&self, x: u32, y: u32) -> Result<RGBA, MaskError> {
        self.raster.pixel(x, y)
    }
}

/// Remaps every pixel onto a single color by its luminance.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Monochrome {
    /// Color that full luminance maps to.
    pub color: [f32; 3],
    /// 0.0 passes the input through, 1.0 is fully monochrome.
    pub intensity: f32,
}

impl Default for Monochrome {
    fn default() -> Self {
        Monochrome {
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

impl Filter for Monochrome {
    fn name(&self) -> &'static str {
        "monochrome"
    }

    fn apply(&self, input: &Raster, format: PixelFormat) -> Result<Raster, MaskError> {
        for (i, c) in self.color.iter().enumerate() {
            check_finite(self.name(), &format!("color[{i}]"), *c)?;
        }
        check_finite(self.name(), "intensity", self.intensity)?;
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(MaskError::filter(
                self.name(),
                format!("intensity {} outside of [0, 1]", self.intensity),
            ));
        }
        let [cr, cg, cb] = self.color;
        map_pixels(input, format, |p| {
            let l = p.luminance();
            let mono = RGBA::rgb(l * cr, l * cg, l * cb);
            p.mix_color(&mono, self.intensity).clamped()
        })
    }
}

/// Saturation, brightness and contrast adjustment.
///
/// The defaults leave every pixel untouched.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorControls {
    /// Scale around mid gray, 1.0 is unchanged.
    pub contrast: f32,
    /// 0.0 is gray, 1.0 is unchanged.
    pub saturation: f32,
    /// Offset added to every channel, 0.0 is unchanged.
    pub brightness: f32,
}

impl Default for ColorControls {
    fn default() -> Self {
        ColorControls {
            contrast: 1.0,
            saturation: 1.0,
            brightness: 0.0,
        }
    }
}

impl ColorControls {
    pub fn is_identity(&self) -> bool {
        *self == ColorControls::default()
    }

    fn adjust(&self, p: RGBA) -> RGBA {
        let l = p.luminance();
        let gray = RGBA::rgba(l, l, l, p.a);
        let saturated = gray.mix_color(&p, self.saturation);
        saturated
            .map_color(|v| (v + self.brightness - 0.5) * self.contrast + 0.5)
            .clamped()
    }
}

impl Filter for ColorControls {
    fn name(&self) -> &'static str {
        "color_controls"
    }

    fn apply(&self, input: &Raster, format: PixelFormat) -> Result<Raster, MaskError> {
        check_finite(self.name(), "contrast", self.contrast)?;
        check_finite(self.name(), "saturation", self.saturation)?;
        check_finite(self.name(), "brightness", self.brightness)?;
        if self.contrast < 0.0 || self.saturation < 0.0 {
            return Err(MaskError::filter(
                self.name(),
                "contrast and saturation must not be negative",
            ));
        }
        if self.is_identity() {
            return map_pixels(input, format, |p| p);
        }
        map_pixels(input, format, |p| self.adjust(p))
    }
}

/// Quantize every color channel into evenly spaced bands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Posterize {
    pub levels: u32,
}

impl Default for Posterize {
    fn default() -> Self {
        Posterize { levels: 3 }
    }
}

impl Posterize {
    /// Band value nearest to v.
    pub fn quantize(&self, v: f32) -> f32 {
        let steps = self.levels.saturating_sub(1) as f32;
        (v.clamp(0.0, 1.0) * steps).round() / steps
    }
}

impl Filter for Posterize {
    fn name(&self) -> &'static str {
        "posterize"
    }

    fn apply(&self, input: &Raster, format: PixelFormat) -> Result<Raster, MaskError> {
        if self.levels < 2 {
            return Err(MaskError::filter(
                self.name(),
                format!("needs at least 2 levels, got {}", self.levels),
            ));
        }
        map_pixels(input, format, |p| p.map_color(|v| self.quantize(v)))
    }
}

/// Inverts the color channels, alpha is preserved.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ColorInvert;

impl Filter for ColorInvert {
    fn name(&self) -> &'static str {
        "color_invert"
    }

    fn apply(&self, input: &Raster, format: PixelFormat) -> Result<Raster, MaskError> {
        map_pixels(input, format, |p| p.map_color(|v| 1.0 - v))
    }
}

/// Turns brightness into opacity, white becomes opaque, black transparent.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MaskToAlpha;

impl Filter for MaskToAlpha {
    fn name(&self) -> &'static str {
        "mask_to_alpha"
    }

    fn apply(&self, input: &Raster, format: PixelFormat) -> Result<Raster, MaskError> {
        map_pixels(input, format, |p| {
            RGBA::rgba(1.0, 1.0, 1.0, p.white_component().clamp(0.0, 1.0))
        })
    }
}
