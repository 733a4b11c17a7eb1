//! Raster access layer, pixel values and buffer layouts.

use crate::MaskError;
use serde::{Deserialize, Serialize};

/// Luminance weights, ITU-R BT.709.
const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

#[derive(Debug, Default, Copy, Clone, PartialEq)]
/// Struct to represent a single pixel, channel intensities are in [0, 1].
pub struct RGBA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RGBA {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> RGBA {
        RGBA { r, g, b, a }
    }
    /// Opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> RGBA {
        RGBA { r, g, b, a: 1.0 }
    }
    pub const fn white() -> RGBA {
        RGBA::rgb(1.0, 1.0, 1.0)
    }
    pub const fn black() -> RGBA {
        RGBA::rgb(0.0, 0.0, 0.0)
    }
    pub const fn transparent() -> RGBA {
        RGBA::rgba(0.0, 0.0, 0.0, 0.0)
    }

    pub fn from_u8(v: [u8; 4]) -> RGBA {
        RGBA {
            r: v[0] as f32 / 255.0,
            g: v[1] as f32 / 255.0,
            b: v[2] as f32 / 255.0,
            a: v[3] as f32 / 255.0,
        }
    }

    pub fn to_u8(&self) -> [u8; 4] {
        [
            quantize_u8(self.r),
            quantize_u8(self.g),
            quantize_u8(self.b),
            quantize_u8(self.a),
        ]
    }

    /// Relative luminance of the color channels, alpha is ignored.
    ///
    /// Gray values come back unchanged; the weights sum to one and the sum is
    /// taken in f64 before narrowing.
    pub fn luminance(&self) -> f32 {
        (LUMA_WEIGHTS[0] * self.r as f64
            + LUMA_WEIGHTS[1] * self.g as f64
            + LUMA_WEIGHTS[2] * self.b as f64) as f32
    }

    /// The white component of this color, as a gray level.
    pub fn white_component(&self) -> f32 {
        self.luminance()
    }

    /// Apply a function to the color channels, leaving alpha alone.
    pub fn map_color<F: Fn(f32) -> f32>(&self, f: F) -> RGBA {
        RGBA {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
            a: self.a,
        }
    }

    /// Linear interpolation of the color channels, `t = 0` gives self and `t = 1` gives other,
    /// both exactly. Alpha is taken from self.
    pub fn mix_color(&self, other: &RGBA, t: f32) -> RGBA {
        let s = 1.0 - t;
        RGBA {
            r: self.r * s + other.r * t,
            g: self.g * s + other.g * t,
            b: self.b * s + other.b * t,
            a: self.a,
        }
    }

    pub fn clamped(&self) -> RGBA {
        RGBA {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

impl From<[u8; 4]> for RGBA {
    fn from(v: [u8; 4]) -> Self {
        RGBA::from_u8(v)
    }
}

fn quantize_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Channel {
    R,
    G,
    B,
    A,
    L,
}

/// Order of the channels within a single pixel.
///
/// Decoders may hand out the same picture in different orders, so this is always
/// carried with the buffer instead of being assumed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelOrder {
    Rgba,
    Argb,
    Bgra,
    Abgr,
    Rgb,
    Bgr,
    /// Single gray channel, reads as opaque gray.
    Luma,
    LumaAlpha,
    /// Single alpha channel, reads as white with that alpha.
    Alpha,
}

impl ChannelOrder {
    fn layout(&self) -> &'static [Channel] {
        use Channel::*;
        match self {
            ChannelOrder::Rgba => &[R, G, B, A],
            ChannelOrder::Argb => &[A, R, G, B],
            ChannelOrder::Bgra => &[B, G, R, A],
            ChannelOrder::Abgr => &[A, B, G, R],
            ChannelOrder::Rgb => &[R, G, B],
            ChannelOrder::Bgr => &[B, G, R],
            ChannelOrder::Luma => &[L],
            ChannelOrder::LumaAlpha => &[L, A],
            ChannelOrder::Alpha => &[A],
        }
    }

    /// Number of channels in a pixel.
    pub fn channels(&self) -> usize {
        self.layout().len()
    }

    pub fn has_alpha(&self) -> bool {
        self.layout().contains(&Channel::A)
    }
}

/// Storage of a single channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    /// One byte, 0 to 255.
    U8,
    /// Little endian f32, 0.0 to 1.0.
    F32,
}

impl BitDepth {
    pub fn bytes(&self) -> usize {
        match self {
            BitDepth::U8 => 1,
            BitDepth::F32 => 4,
        }
    }

    fn read(&self, bytes: &[u8]) -> f32 {
        match self {
            BitDepth::U8 => bytes[0] as f32 / 255.0,
            BitDepth::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }

    fn write(&self, v: f32, out: &mut Vec<u8>) {
        match self {
            BitDepth::U8 => out.push(quantize_u8(v)),
            BitDepth::F32 => out.extend_from_slice(&v.to_le_bytes()),
        }
    }
}

/// Channel order plus bit depth, together the full description of a pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelFormat {
    pub order: ChannelOrder,
    pub depth: BitDepth,
}

impl PixelFormat {
    pub const RGBA8: PixelFormat = PixelFormat::new(ChannelOrder::Rgba, BitDepth::U8);
    pub const ARGB8: PixelFormat = PixelFormat::new(ChannelOrder::Argb, BitDepth::U8);
    pub const RGBA_F32: PixelFormat = PixelFormat::new(ChannelOrder::Rgba, BitDepth::F32);
    pub const LUMA_F32: PixelFormat = PixelFormat::new(ChannelOrder::Luma, BitDepth::F32);
    pub const ALPHA8: PixelFormat = PixelFormat::new(ChannelOrder::Alpha, BitDepth::U8);
    pub const ALPHA_F32: PixelFormat = PixelFormat::new(ChannelOrder::Alpha, BitDepth::F32);

    pub const fn new(order: ChannelOrder, depth: BitDepth) -> PixelFormat {
        PixelFormat { order, depth }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.order.channels() * self.depth.bytes()
    }

    /// Decode one pixel from exactly `bytes_per_pixel` bytes.
    fn decode(&self, bytes: &[u8]) -> RGBA {
        let mut p = if self.order == ChannelOrder::Alpha {
            RGBA::white()
        } else {
            RGBA::black()
        };
        let step = self.depth.bytes();
        for (i, c) in self.order.layout().iter().enumerate() {
            let v = self.depth.read(&bytes[i * step..]);
            match c {
                Channel::R => p.r = v,
                Channel::G => p.g = v,
                Channel::B => p.b = v,
                Channel::A => p.a = v,
                Channel::L => {
                    p.r = v;
                    p.g = v;
                    p.b = v;
                }
            }
        }
        p
    }

    fn encode(&self, p: &RGBA, out: &mut Vec<u8>) {
        for c in self.order.layout().iter() {
            let v = match c {
                Channel::R => p.r,
                Channel::G => p.g,
                Channel::B => p.b,
                Channel::A => p.a,
                Channel::L => p.luminance(),
            };
            self.depth.write(v, out);
        }
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::RGBA8
    }
}

/// Read access to a two dimensional pixel source.
pub trait Image {
    /// Returns the width of the image.
    fn width(&self) -> u32;
    /// Returns the height of the image.
    fn height(&self) -> u32;
    /// Layout of the pixels backing this image.
    fn format(&self) -> PixelFormat;
    /// Returns a specific pixel's value, errors if x or y are outside of the image.
    fn pixel(&self, x: u32, y: u32) -> Result<RGBA, MaskError>;
}

/// A decoded, immutable pixel buffer with an explicit layout.
/// Row size and total size in bytes of a buffer without row padding.
fn packed_layout(
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<(usize, usize), MaskError> {
    let bytes_per_row = (width as usize)
        .checked_mul(format.bytes_per_pixel())
        .ok_or_else(|| MaskError::InvalidLayout(format!("width {width} overflows")))?;
    let len = bytes_per_row
        .checked_mul(height as usize)
        .ok_or_else(|| MaskError::InvalidLayout(format!("height {height} overflows")))?;
    Ok((bytes_per_row, len))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    bytes_per_row: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap a buffer, the buffer must hold exactly `height * bytes_per_row` bytes and each row
    /// must fit `width` pixels.
    pub fn new(
        width: u32,
        height: u32,
        bytes_per_row: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Raster, MaskError> {
        let (min_row, _) = packed_layout(width, 0, format)?;
        if bytes_per_row < min_row {
            return Err(MaskError::InvalidLayout(format!(
                "{bytes_per_row} bytes per row cannot hold {width} pixels of {format:?}"
            )));
        }
        let expected = (height as usize)
            .checked_mul(bytes_per_row)
            .ok_or_else(|| MaskError::InvalidLayout(format!("height {height} overflows")))?;
        if data.len() != expected {
            return Err(MaskError::InvalidLayout(format!(
                "expected {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Raster {
            width,
            height,
            bytes_per_row,
            format,
            data,
        })
    }

    /// Wrap a buffer without any row padding.
    pub fn packed(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Raster, MaskError> {
        Raster::new(
            width,
            height,
            width as usize * format.bytes_per_pixel(),
            format,
            data,
        )
    }

    /// Build a packed raster by evaluating `f` for every pixel, row by row.
    pub fn try_from_fn<F>(
        width: u32,
        height: u32,
        format: PixelFormat,
        mut f: F,
    ) -> Result<Raster, MaskError>
    where
        F: FnMut(u32, u32) -> Result<RGBA, MaskError>,
    {
        let (bytes_per_row, len) = packed_layout(width, height, format)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                format.encode(&f(x, y)?, &mut data);
            }
        }
        Raster::new(width, height, bytes_per_row, format, data)
    }

    /// Infallible version of [`Raster::try_from_fn`].
    ///
    /// # Panics
    /// If the buffer size for `width` by `height` pixels does not fit in `usize`.
    pub fn from_fn<F>(width: u32, height: u32, format: PixelFormat, mut f: F) -> Raster
    where
        F: FnMut(u32, u32) -> RGBA,
    {
        let (bytes_per_row, len) = match packed_layout(width, height, format) {
            Ok(layout) => layout,
            Err(e) => panic!("{e}"),
        };
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                format.encode(&f(x, y), &mut data);
            }
        }
        Raster {
            width,
            height,
            bytes_per_row,
            format,
            data,
        }
    }

    /// A raster filled with a single color.
    pub fn filled(width: u32, height: u32, format: PixelFormat, color: RGBA) -> Raster {
        Raster::from_fn(width, height, format, |_, _| color)
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }
    pub fn format(&self) -> PixelFormat {
        self.format
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), MaskError> {
        if x >= self.width || y >= self.height {
            return Err(MaskError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Read the pixel at (x, y), honoring the channel order of this raster.
    pub fn pixel(&self, x: u32, y: u32) -> Result<RGBA, MaskError> {
        self.check_bounds(x, y)?;
        let bpp = self.format.bytes_per_pixel();
        let offset = y as usize * self.bytes_per_row + x as usize * bpp;
        Ok(self.format.decode(&self.data[offset..offset + bpp]))
    }

    /// The bytes of row y holding pixel data, row padding excluded.
    pub fn row_bytes(&self, y: u32) -> Result<&[u8], MaskError> {
        if y >= self.height {
            return Err(MaskError::OutOfBounds {
                x: 0,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let start = y as usize * self.bytes_per_row;
        Ok(&self.data[start..start + self.width as usize * self.format.bytes_per_pixel()])
    }

    /// Re-encode into another pixel format, dropping any row padding.
    pub fn convert(&self, format: PixelFormat) -> Result<Raster, MaskError> {
        Raster::try_from_fn(self.width, self.height, format, |x, y| self.pixel(x, y))
    }
}

impl Image for Raster {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn format(&self) -> PixelFormat {
        self.format
    }
    fn pixel(&self, x: u32, y: u32) -> Result<RGBA, MaskError> {
        Raster::pixel(self, x, y)
    }
}
