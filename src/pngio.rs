use crate::error::{IcoError, Result};
use crate::image::{argb, channels, IconImage, PixelFormat, MAX_SIZE};
use std::io::{Read, Write};

//===========================================================================//

// The signature that all PNG files start with.
pub(crate) const PNG_SIGNATURE: &[u8] =
    &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

//===========================================================================//

/// Returns true if `data` begins with the full eight-byte PNG signature.
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(PNG_SIGNATURE)
}

fn decoding_error(error: png::DecodingError) -> IcoError {
    match error {
        png::DecodingError::IoError(error) => IcoError::Io(error),
        other => IcoError::MalformedPng(other.to_string()),
    }
}

fn encoding_error(error: png::EncodingError) -> IcoError {
    match error {
        png::EncodingError::IoError(error) => IcoError::Io(error),
        other => IcoError::MalformedPng(other.to_string()),
    }
}

//===========================================================================//

impl IconImage {
    /// Decodes an image from a PNG file.  Any PNG color type and bit depth
    /// is accepted and converted to straight-alpha ARGB32.  Images larger
    /// than 256x256 can't be stored in an icon and are rejected with
    /// [`IcoError::InvalidDimensions`] before any pixel data is read.
    pub fn read_png<R: Read>(reader: R) -> Result<IconImage> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(
            png::Transformations::EXPAND | png::Transformations::STRIP_16,
        );
        let mut png_reader = decoder.read_info().map_err(decoding_error)?;
        let (width, height) = {
            let info = png_reader.info();
            (info.width, info.height)
        };
        let valid = 1..=MAX_SIZE;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(IcoError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        let mut buffer = vec![0u8; png_reader.output_buffer_size()];
        let frame =
            png_reader.next_frame(&mut buffer).map_err(decoding_error)?;
        buffer.truncate(frame.buffer_size());
        let (color_type, bit_depth) = png_reader.output_color_type();
        if bit_depth != png::BitDepth::Eight {
            return Err(IcoError::MalformedPng(format!(
                "unexpected output bit depth {:?}",
                bit_depth
            )));
        }
        let pixels: Vec<u32> = match color_type {
            png::ColorType::Rgba => buffer
                .chunks_exact(4)
                .map(|px| argb(px[3], px[0], px[1], px[2]))
                .collect(),
            png::ColorType::Rgb => buffer
                .chunks_exact(3)
                .map(|px| argb(u8::MAX, px[0], px[1], px[2]))
                .collect(),
            png::ColorType::GrayscaleAlpha => buffer
                .chunks_exact(2)
                .map(|px| argb(px[1], px[0], px[0], px[0]))
                .collect(),
            png::ColorType::Grayscale => buffer
                .iter()
                .map(|&gray| argb(u8::MAX, gray, gray, gray))
                .collect(),
            png::ColorType::Indexed => {
                return Err(IcoError::MalformedPng(
                    "indexed output despite palette expansion".to_string(),
                ));
            }
        };
        IconImage::try_from_pixels(PixelFormat::Argb32, width, height, pixels)
    }

    /// Encodes the image as a PNG file.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<()> {
        let _bits_per_pixel = self.write_png_internal(writer)?;
        Ok(())
    }

    /// Encodes the image as a PNG file and returns the bits-per-pixel.
    /// Opaque images are stored as RGB, everything else as RGBA.
    pub(crate) fn write_png_internal<W: Write>(
        &self,
        writer: W,
    ) -> Result<u16> {
        let image = self.convert_to(PixelFormat::Argb32);
        let has_alpha = image.compute_stats().has_alpha;
        let mut encoder =
            png::Encoder::new(writer, image.width(), image.height());
        encoder.set_depth(png::BitDepth::Eight);
        if has_alpha {
            encoder.set_color(png::ColorType::Rgba);
        } else {
            encoder.set_color(png::ColorType::Rgb);
        }
        let mut writer = encoder.write_header().map_err(encoding_error)?;
        let channel_count = if has_alpha { 4 } else { 3 };
        let mut data =
            Vec::<u8>::with_capacity(image.pixels().len() * channel_count);
        for &pixel in image.pixels().iter() {
            let (alpha, red, green, blue) = channels(pixel);
            data.extend_from_slice(&[red, green, blue]);
            if has_alpha {
                data.push(alpha);
            }
        }
        writer.write_image_data(&data).map_err(encoding_error)?;
        writer.finish().map_err(encoding_error)?;
        Ok(if has_alpha { 32 } else { 24 })
    }
}

//===========================================================================//


//===========================================================================//
