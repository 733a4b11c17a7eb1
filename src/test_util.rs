//! Synthetic text images for tests and benchmarks.

use image::Pixel;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// A trivial function which blends an rgba stamp onto the image at x,y position.
pub fn apply_stamp(image: &mut RgbaImage, x: u32, y: u32, stamp: &RgbaImage) {
    for yy in 0..stamp.height() {
        for xx in 0..stamp.width() {
            if xx + x >= image.width() || yy + y >= image.height() {
                continue;
            }
            let mut base_pixel = *image.get_pixel(xx + x, yy + y);
            let stamp_pixel = stamp.get_pixel(xx, yy);
            base_pixel.blend(stamp_pixel);
            *image.get_pixel_mut(xx + x, yy + y) = base_pixel;
        }
    }
}

/// Scale an rgba image.
pub fn scale_image_rgba(image: &RgbaImage, scaling: f32) -> RgbaImage {
    use imageproc::geometric_transformations::*;
    let scale_projection = Projection::scale(scaling, scaling);

    let new_width = (image.width() as f32 * scaling) as u32;
    let new_height = (image.height() as f32 * scaling) as u32;

    let mut new_image = RgbaImage::new(new_width, new_height);

    warp_into(
        image,
        &scale_projection,
        Interpolation::Nearest,
        Rgba([0u8, 0, 0, 0]),
        &mut new_image,
    );
    new_image
}

/// A horizontal bar of `thickness` rows starting at y, spanning the full width.
pub fn draw_bar(image: &mut RgbaImage, y: u32, thickness: u32, color: Rgba<u8>) {
    let rect = Rect::at(0, y as i32).of_size(image.width(), thickness);
    draw_filled_rect_mut(image, rect, color);
}

/// An image of the given background with text rendered at (x, y) in the standard alphabet.
pub fn page(
    width: u32,
    height: u32,
    background: Rgba<u8>,
    x: u32,
    y: u32,
    text: &str,
    color: Rgba<u8>,
) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(width, height, background);
    test_alphabet::render_standard_color(&mut image, x, y, text, color);
    image
}

pub mod test_alphabet {
    use super::*;

    /// Helper function to convert letters from the ascii format below to an rgba image.
    fn letter_to_rgba(v: &str, color: Rgba<u8>) -> RgbaImage {
        let lines = v
            .lines()
            .map(|x| x.trim())
            .filter(|x| !x.is_empty())
            .collect::<Vec<&str>>();
        let mut image = RgbaImage::new(lines[0].len() as u32, lines.len() as u32);
        for (y, row) in lines.iter().enumerate() {
            for (x, v) in (**row).chars().enumerate() {
                if v == 'x' {
                    *image.get_pixel_mut(x as u32, y as u32) = color;
                }
            }
        }
        image
    }

    pub const LETTER_HEIGHT: u32 = 7;
    // Letters shall be 7 high. Because that's odd and allows for center lines.
    // width can be variable.
    const A: &str = "
        ..x..
        .x.x.
        x...x
        x...x
        xxxxx
        x...x
        x...x";
    const B: &str = "
        xxxx.
        x...x
        x...x
        xxxxx
        x...x
        x...x
        xxxx.";
    const C: &str = "
        .xxx.
        x...x
        x....
        x....
        x....
        x...x
        .xxx.";
    const D: &str = "
        xxxx.
        x...x
        x...x
        x...x
        x...x
        x...x
        xxxx.";
    const E: &str = "
        xxxxx
        x....
        x....
        xxxxx
        x....
        x....
        xxxxx";
    const W: &str = "
        x.........x
        .x.......x.
        .x.......x.
        .x...x...x.
        ..x.x.x.x..
        ..x.x.x.x..
        ...x...x...";
    const SPACE: &str = "
        .....
        .....
        .....
        .....
        .....
        .....
        .....";

    /// A single letter in the given color on a transparent background.
    pub fn letter(c: char, color: Rgba<u8>) -> RgbaImage {
        let pattern = match c {
            'a' => A,
            'b' => B,
            'c' => C,
            'd' => D,
            'e' => E,
            'w' => W,
            ' ' => SPACE,
            _ => {
                panic!("letter does not exist in alphabet")
            }
        };
        letter_to_rgba(pattern, color)
    }

    /// Render text with one pixel of bearing on either side of each letter, returns the x
    /// position after the last letter.
    pub fn render_standard_color(
        image: &mut RgbaImage,
        x: u32,
        y: u32,
        text: &str,
        color: Rgba<u8>,
    ) -> u32 {
        let lsb = 1;
        let rsb = 1;
        let mut x = x + lsb;

        let r = color.channels()[0];
        let g = color.channels()[1];
        let b = color.channels()[2];
        for c in text.chars() {
            let l = letter(c, Rgba([r, g, b, 255]));
            apply_stamp(image, x, y, &l);
            x += l.width() + rsb;
        }
        x
    }
}
