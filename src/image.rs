use crate::error::{IcoError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

//===========================================================================//

// Size limits for decoded images:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

// Largest width/height an ICO entry can describe.
pub(crate) const MAX_SIZE: u32 = 256;

//===========================================================================//

/// The in-memory layout of an [`IconImage`]'s pixels.  Every format stores
/// one `u32` per pixel as `0xAARRGGBB`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum PixelFormat {
    /// Straight (non-premultiplied) alpha.  This is the canonical format:
    /// decoding always produces it and encoding requires it.
    Argb32,
    /// Color channels premultiplied by alpha.
    Argb32Premultiplied,
    /// Opaque color; the alpha byte is ignored.
    Rgb32,
}

//===========================================================================//

/// Packs four channels into a `0xAARRGGBB` pixel.
pub fn argb(alpha: u8, red: u8, green: u8, blue: u8) -> u32 {
    ((alpha as u32) << 24)
        | ((red as u32) << 16)
        | ((green as u32) << 8)
        | (blue as u32)
}

/// Splits a `0xAARRGGBB` pixel into `(alpha, red, green, blue)`.
pub fn channels(pixel: u32) -> (u8, u8, u8, u8) {
    ((pixel >> 24) as u8, (pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
}

pub(crate) fn alpha(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// Reverses the order of the rows of a `width`-pixel-wide buffer in place,
/// turning bottom-up bitmap storage into top-down order and back.
pub(crate) fn flip_rows(pixels: &mut [u32], width: usize) {
    if width == 0 {
        return;
    }
    let height = pixels.len() / width;
    for row in 0..(height / 2) {
        let (top, bottom) = pixels.split_at_mut((height - row - 1) * width);
        top[(row * width)..((row + 1) * width)]
            .swap_with_slice(&mut bottom[..width]);
    }
}

//===========================================================================//

/// A decoded image: the pixel buffer that goes into and comes out of an
/// ICO container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    hotspot: Option<(u16, u16)>,
    pixels: Vec<u32>,
}

impl IconImage {
    /// Creates a new image from `0xAARRGGBB` pixels in row-major order from
    /// top to bottom.  Returns an error if either dimension is zero or if
    /// `pixels` doesn't hold exactly `width * height` entries.
    pub fn try_from_pixels(
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: Vec<u32>,
    ) -> Result<IconImage> {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(IcoError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        let expected = (width as u64) * (height as u64);
        if pixels.len() as u64 != expected {
            return Err(IcoError::CorruptPixelData {
                expected: expected as usize,
                actual: pixels.len(),
            });
        }
        Ok(IconImage { width, height, format, hotspot: None, pixels })
    }

    /// Like [`IconImage::try_from_pixels`], but panics if the dimensions are
    /// out of range or if `pixels` is the wrong length.
    pub fn from_pixels(
        format: PixelFormat,
        width: u32,
        height: u32,
        pixels: Vec<u32>,
    ) -> IconImage {
        match IconImage::try_from_pixels(format, width, height, pixels) {
            Ok(image) => image,
            Err(error) => panic!("{}", error),
        }
    }

    /// Creates a straight-alpha ARGB32 image.  Panics if the dimensions are
    /// out of range or if `pixels` is the wrong length.
    pub fn from_argb_pixels(
        width: u32,
        height: u32,
        pixels: Vec<u32>,
    ) -> IconImage {
        IconImage::from_pixels(PixelFormat::Argb32, width, height, pixels)
    }

    /// Creates a straight-alpha ARGB32 image from RGBA bytes.  The
    /// `rgba_data` must have `4 * width * height` bytes and be in row-major
    /// order from top to bottom.  Panics if the dimensions are out of range
    /// or if `rgba_data` is the wrong length.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> IconImage {
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            panic!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        let pixels = rgba_data
            .chunks_exact(4)
            .map(|rgba| argb(rgba[3], rgba[0], rgba[1], rgba[2]))
            .collect();
        IconImage::from_argb_pixels(width, height, pixels)
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the layout of the pixel data.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the coordinates of the cursor hotspot (pixels right from the
    /// left edge of the image, and pixels down from the top edge), or `None`
    /// if this image is an icon rather than a cursor.
    pub fn cursor_hotspot(&self) -> Option<(u16, u16)> {
        self.hotspot
    }

    /// Sets or clears the cursor hotspot coordinates.
    pub fn set_cursor_hotspot(&mut self, hotspot: Option<(u16, u16)>) {
        self.hotspot = hotspot;
    }

    /// Returns the pixels in row-major order from top to bottom.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Returns the pixels mutably, in row-major order from top to bottom.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Returns the pixel at the given position.  Panics if the position is
    /// out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Returns the image as straight-alpha RGBA bytes, in row-major order
    /// from top to bottom.
    pub fn to_rgba_data(&self) -> Vec<u8> {
        let image = self.convert_to(PixelFormat::Argb32);
        let mut rgba = Vec::with_capacity(image.pixels.len() * 4);
        for &pixel in image.pixels.iter() {
            let (alpha, red, green, blue) = channels(pixel);
            rgba.extend_from_slice(&[red, green, blue, alpha]);
        }
        rgba
    }

    /// Returns a copy of this image converted to `format`.
    pub fn convert_to(&self, format: PixelFormat) -> IconImage {
        let convert: fn(u32) -> u32 = match (self.format, format) {
            (from, to) if from == to => |pixel| pixel,
            (_, PixelFormat::Rgb32) => |pixel| pixel | 0xff00_0000,
            (PixelFormat::Rgb32, _) => |pixel| pixel | 0xff00_0000,
            (PixelFormat::Argb32, _) => premultiply,
            (PixelFormat::Argb32Premultiplied, _) => unpremultiply,
        };
        IconImage {
            width: self.width,
            height: self.height,
            format,
            hotspot: self.hotspot,
            pixels: self.pixels.iter().map(|&pixel| convert(pixel)).collect(),
        }
    }

    pub(crate) fn compute_stats(&self) -> ImageStats {
        let mut colors = BTreeSet::<u32>::new();
        let mut has_alpha = false;
        let mut has_nonbinary_alpha = false;
        for &pixel in self.pixels.iter() {
            let alpha = alpha(pixel);
            if alpha != u8::MAX {
                has_alpha = true;
                if alpha != 0 {
                    has_nonbinary_alpha = true;
                }
            }
            if colors.len() <= 256 {
                colors.insert(pixel & 0x00ff_ffff);
            }
        }
        ImageStats {
            has_alpha,
            has_nonbinary_alpha,
            colors: if colors.len() <= 256 { Some(colors) } else { None },
        }
    }
}

fn premultiply(pixel: u32) -> u32 {
    let (alpha, red, green, blue) = channels(pixel);
    let scale = |channel: u8| {
        ((channel as u32 * alpha as u32 + 127) / 255) as u8
    };
    argb(alpha, scale(red), scale(green), scale(blue))
}

fn unpremultiply(pixel: u32) -> u32 {
    let (alpha, red, green, blue) = channels(pixel);
    if alpha == 0 {
        return 0;
    }
    let scale = |channel: u8| {
        let value = (channel as u32 * 255 + alpha as u32 / 2) / alpha as u32;
        value.min(255) as u8
    };
    argb(alpha, scale(red), scale(green), scale(blue))
}

//===========================================================================//

pub(crate) struct ImageStats {
    /// True if the image uses transparency.
    pub(crate) has_alpha: bool,
    /// True if the image has alpha values between 0 and the maximum exclusive.
    pub(crate) has_nonbinary_alpha: bool,
    /// The distinct `0x00RRGGBB` colors, or `None` if the image has more than
    /// 256 colors.
    pub(crate) colors: Option<BTreeSet<u32>>,
}

//===========================================================================//


//===========================================================================//
