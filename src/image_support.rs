//! Glue between [`Raster`] and the buffers of the `image` crate.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::map::map_colors;
use std::path::Path;

use crate::{MaskError, PixelFormat, Raster};

/// Wrap an rgba image, copying its buffer.
pub fn raster_from_rgba_image(image: &RgbaImage) -> Result<Raster, MaskError> {
    Raster::packed(
        image.width(),
        image.height(),
        PixelFormat::RGBA8,
        image.as_raw().clone(),
    )
}

/// Any decoded image, converted to 8 bit rgba.
pub fn raster_from_dynamic(image: &DynamicImage) -> Result<Raster, MaskError> {
    raster_from_rgba_image(&image.to_rgba8())
}

/// Convert a raster of any layout into an rgba image.
pub fn raster_to_rgba_image(raster: &Raster) -> Result<RgbaImage, MaskError> {
    let (width, height) = raster.dimensions();
    let data = if raster.format() == PixelFormat::RGBA8
        && raster.bytes_per_row() == width as usize * 4
    {
        raster.data().to_vec()
    } else {
        raster.convert(PixelFormat::RGBA8)?.into_data()
    };
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| MaskError::InvalidLayout(String::from("buffer does not fit rgba image")))
}

/// The alpha channel of an image as gray, opaque is white.
pub fn alpha_preview(image: &RgbaImage) -> GrayImage {
    map_colors(image, |p: Rgba<u8>| -> Luma<u8> { Luma([p.0[3]]) })
}

/// Load an image file into an rgba raster.
pub fn load_raster(path: &Path) -> Result<Raster, Box<dyn std::error::Error>> {
    let image = image::open(path)?;
    Ok(raster_from_dynamic(&image)?)
}

/// Save a raster, the file format follows from the extension.
pub fn save_raster(raster: &Raster, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    raster_to_rgba_image(raster)?.save(path)?;
    Ok(())
}
