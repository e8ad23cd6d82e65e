use crate::bmpdepth::{row_stride, BmpDepth};
use crate::error::{IcoError, Result};
use crate::image::{
    alpha, argb, channels, flip_rows, IconImage, PixelFormat, MAX_SIZE,
};
use crate::options::{EncodeOptions, MaskPolicy};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::io::{self, Write};

//===========================================================================//

// The size of a BITMAPINFOHEADER struct, in bytes.
pub(crate) const BMP_HEADER_LEN: u32 = 40;

// The only compression value allowed in icon bitmaps.
const BI_RGB: u32 = 0;

// Color used for palette indices past the end of the color table.
const OPAQUE_BLACK: u32 = 0xff00_0000;

//===========================================================================//

/// The BITMAPINFOHEADER at the start of every raw icon image.  The stored
/// height counts the rows of both the color data and the AND mask.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct BitmapInfoHeader {
    pub(crate) header_size: u32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) planes: u16,
    pub(crate) bit_count: u16,
    pub(crate) compression: u32,
    pub(crate) image_size: u32,
    pub(crate) colors_used: u32,
}

impl BitmapInfoHeader {
    pub(crate) fn read(data: &[u8]) -> Result<BitmapInfoHeader> {
        if data.len() < BMP_HEADER_LEN as usize {
            return Err(IcoError::CorruptPixelData {
                expected: BMP_HEADER_LEN as usize,
                actual: data.len(),
            });
        }
        let mut reader = data;
        let header_size = reader.read_u32::<LittleEndian>()?;
        if header_size < BMP_HEADER_LEN {
            return Err(IcoError::InvalidBitmapHeader(header_size));
        }
        let width = reader.read_i32::<LittleEndian>()?;
        let height = reader.read_i32::<LittleEndian>()?;
        let planes = reader.read_u16::<LittleEndian>()?;
        let bit_count = reader.read_u16::<LittleEndian>()?;
        let compression = reader.read_u32::<LittleEndian>()?;
        let image_size = reader.read_u32::<LittleEndian>()?;
        let _horz_ppm = reader.read_i32::<LittleEndian>()?;
        let _vert_ppm = reader.read_i32::<LittleEndian>()?;
        let colors_used = reader.read_u32::<LittleEndian>()?;
        let _colors_important = reader.read_u32::<LittleEndian>()?;
        Ok(BitmapInfoHeader {
            header_size,
            width,
            height,
            planes,
            bit_count,
            compression,
            image_size,
            colors_used,
        })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.header_size)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        writer.write_i32::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bit_count)?;
        writer.write_u32::<LittleEndian>(self.compression)?;
        writer.write_u32::<LittleEndian>(self.image_size)?;
        writer.write_i32::<LittleEndian>(0)?; // horz ppm
        writer.write_i32::<LittleEndian>(0)?; // vert ppm
        writer.write_u32::<LittleEndian>(self.colors_used)?;
        writer.write_u32::<LittleEndian>(0)?; // colors important
        Ok(())
    }
}

//===========================================================================//

/// Works out the real image height from the header's height field, which
/// counts the AND mask rows as well as the color rows.  An odd field can't
/// have been doubled and is taken as-is.
fn bitmap_height(width: i32, raw_height: i32) -> Result<u32> {
    let invalid = IcoError::InvalidDimensions {
        width: width as i64,
        height: raw_height as i64,
    };
    if width < 1 || width as u32 > MAX_SIZE || raw_height < 1 {
        return Err(invalid);
    }
    let raw_height = raw_height as u32;
    let height = if raw_height % 2 == 0 {
        raw_height / 2
    } else {
        raw_height
    };
    if height > MAX_SIZE {
        return Err(invalid);
    }
    Ok(height)
}

fn palette_len(depth: BmpDepth, colors_used: u32) -> usize {
    let max = depth.num_colors();
    if colors_used > 0 && (colors_used as usize) < max {
        colors_used as usize
    } else {
        max
    }
}

/// Decodes one stored row into `out`.  The pixel layout of each depth is
/// the only thing that differs between them.
fn decode_row(
    depth: BmpDepth,
    row: &[u8],
    palette: &[u32],
    out: &mut [u32],
) {
    match depth {
        BmpDepth::One | BmpDepth::Four | BmpDepth::Eight => {
            let bits = depth.bits_per_pixel() as usize;
            let per_byte = 8 / bits;
            let mask = 0xffu8 >> (8 - bits);
            for (col, pixel) in out.iter_mut().enumerate() {
                let byte = row[col / per_byte];
                let shift = 8 - bits * (col % per_byte + 1);
                let index = ((byte >> shift) & mask) as usize;
                *pixel = palette.get(index).copied().unwrap_or(OPAQUE_BLACK);
            }
        }
        BmpDepth::TwentyFour => {
            for (pixel, bgr) in out.iter_mut().zip(row.chunks_exact(3)) {
                *pixel = argb(u8::MAX, bgr[2], bgr[1], bgr[0]);
            }
        }
        BmpDepth::ThirtyTwo => {
            for (pixel, bgra) in out.iter_mut().zip(row.chunks_exact(4)) {
                *pixel = argb(bgra[3], bgra[2], bgra[1], bgra[0]);
            }
        }
    }
}

/// Clears the alpha of every pixel whose AND mask bit is set.  Both the
/// mask and `pixels` are in bottom-up row order.
fn apply_mask(mask: &[u8], width: usize, pixels: &mut [u32]) {
    let mask_stride = row_stride(width as u32, 1);
    let rows =
        mask.chunks_exact(mask_stride).zip(pixels.chunks_exact_mut(width));
    for (mask_row, out_row) in rows {
        for (col, pixel) in out_row.iter_mut().enumerate() {
            if (mask_row[col / 8] >> (7 - col % 8)) & 0x1 == 1 {
                *pixel &= 0x00ff_ffff;
            }
        }
    }
}

/// Decodes a raw bitmap icon entry (header, color table, XOR data and AND
/// mask) into a straight-alpha ARGB32 image.
pub(crate) fn decode_bmp(data: &[u8]) -> Result<IconImage> {
    let header = BitmapInfoHeader::read(data)?;
    if header.compression != BI_RGB {
        return Err(IcoError::UnsupportedCompression(header.compression));
    }
    let depth = match BmpDepth::from_bits_per_pixel(header.bit_count) {
        Some(depth) => depth,
        None => return Err(IcoError::UnsupportedBitDepth(header.bit_count)),
    };
    let height = bitmap_height(header.width, header.height)?;
    let width = header.width as u32;

    let num_colors = palette_len(depth, header.colors_used);
    let stride = depth.row_stride(width);
    let palette_start = header.header_size as usize;
    let color_start = palette_start.saturating_add(4 * num_colors);
    let color_end = stride
        .checked_mul(height as usize)
        .and_then(|len| len.checked_add(color_start))
        .unwrap_or(usize::MAX);
    if color_end > data.len() {
        return Err(IcoError::CorruptPixelData {
            expected: color_end,
            actual: data.len(),
        });
    }
    log::trace!(
        "Decoding {}x{} BMP at {} bpp with {} palette entries",
        width,
        height,
        depth.bits_per_pixel(),
        num_colors
    );

    let palette: Vec<u32> = data[palette_start..color_start]
        .chunks_exact(4)
        .map(|bgrx| argb(u8::MAX, bgrx[2], bgrx[1], bgrx[0]))
        .collect();

    // Color data is stored row by row, starting from the *bottom* row.  We
    // decode in that order and flip at the end.
    let mut pixels = vec![0u32; width as usize * height as usize];
    let rows = data[color_start..color_end]
        .chunks_exact(stride)
        .zip(pixels.chunks_exact_mut(width as usize));
    for (row, out) in rows {
        decode_row(depth, row, &palette, out);
    }

    let mask_len = row_stride(width, 1) * height as usize;
    let mask = color_end
        .checked_add(mask_len)
        .and_then(|mask_end| data.get(color_end..mask_end));
    if depth == BmpDepth::ThirtyTwo {
        // A 32-bit image with any nonzero alpha carries its own
        // transparency, and the mask is redundant.  All-zero alpha means
        // BGR0 data whose transparency lives only in the mask.
        if pixels.iter().all(|&pixel| alpha(pixel) == 0) {
            for pixel in pixels.iter_mut() {
                *pixel |= 0xff00_0000;
            }
            if let Some(mask) = mask {
                apply_mask(mask, width as usize, &mut pixels);
            }
        }
    } else if let Some(mask) = mask {
        apply_mask(mask, width as usize, &mut pixels);
    } else {
        log::warn!(
            "{}x{} BMP entry has no AND mask; treating it as opaque",
            width,
            height
        );
    }

    flip_rows(&mut pixels, width as usize);
    IconImage::try_from_pixels(PixelFormat::Argb32, width, height, pixels)
}

//===========================================================================//

/// A raw bitmap payload ready to be placed in an entry.
pub(crate) struct EncodedBmp {
    pub(crate) depth: BmpDepth,
    pub(crate) num_colors: usize,
    pub(crate) data: Vec<u8>,
}

/// Picks the depth to encode at, plus the color table for indexed depths.
/// Without a preference, or when the preferred depth can't represent the
/// image exactly, 32 bpp is used.
fn choose_depth(
    image: &IconImage,
    preferred: Option<BmpDepth>,
) -> (BmpDepth, Vec<u32>) {
    let preferred = match preferred {
        None | Some(BmpDepth::ThirtyTwo) => {
            return (BmpDepth::ThirtyTwo, Vec::new());
        }
        Some(depth) => depth,
    };
    let stats = image.compute_stats();
    if stats.has_nonbinary_alpha {
        // Only 32 bpp can support alpha values between 0 and 255, because
        // the AND mask is a single bit per pixel.
        log::debug!(
            "Image has partial transparency; using 32 bpp instead of {}",
            preferred.bits_per_pixel()
        );
        return (BmpDepth::ThirtyTwo, Vec::new());
    }
    if preferred == BmpDepth::TwentyFour {
        return (BmpDepth::TwentyFour, Vec::new());
    }
    match stats.colors {
        Some(ref colors) if colors.len() <= preferred.num_colors() => {
            (preferred, colors.iter().cloned().collect())
        }
        _ => {
            log::debug!(
                "Image has too many colors for {} bpp; using 32 bpp",
                preferred.bits_per_pixel()
            );
            (BmpDepth::ThirtyTwo, Vec::new())
        }
    }
}

fn encode_row(
    depth: BmpDepth,
    row: &[u32],
    color_map: &HashMap<u32, u8>,
    out: &mut Vec<u8>,
) {
    match depth {
        BmpDepth::One | BmpDepth::Four | BmpDepth::Eight => {
            let bits = depth.bits_per_pixel() as usize;
            for chunk in row.chunks(8 / bits) {
                let mut byte = 0u8;
                for (index, &pixel) in chunk.iter().enumerate() {
                    let color =
                        color_map.get(&(pixel & 0x00ff_ffff)).copied();
                    byte |= color.unwrap_or(0) << (8 - bits * (index + 1));
                }
                out.push(byte);
            }
        }
        BmpDepth::TwentyFour => {
            for &pixel in row.iter() {
                let (_, red, green, blue) = channels(pixel);
                out.extend_from_slice(&[blue, green, red]);
            }
        }
        BmpDepth::ThirtyTwo => {
            for &pixel in row.iter() {
                let (alpha, red, green, blue) = channels(pixel);
                out.extend_from_slice(&[blue, green, red, alpha]);
            }
        }
    }
}

/// Encodes an ARGB32 image as a raw bitmap payload: header, color table,
/// bottom-up XOR rows and (unless disabled for 32 bpp) the AND mask.
pub(crate) fn encode_bmp(
    image: &IconImage,
    preferred: Option<BmpDepth>,
    options: &EncodeOptions,
) -> Result<EncodedBmp> {
    let (depth, colors) = choose_depth(image, preferred);
    let width = image.width();
    let height = image.height();
    let with_mask = depth != BmpDepth::ThirtyTwo
        || options.get_mask_policy() == MaskPolicy::Always;
    let num_colors = depth.num_colors();
    let stride = depth.row_stride(width);
    let mask_stride = row_stride(width, 1);
    let image_size = height as usize
        * (stride + if with_mask { mask_stride } else { 0 });
    let data_size = BMP_HEADER_LEN as usize + 4 * num_colors + image_size;
    let mut data = Vec::<u8>::with_capacity(data_size);

    let header = BitmapInfoHeader {
        header_size: BMP_HEADER_LEN,
        width: width as i32,
        height: 2 * height as i32,
        planes: 1,
        bit_count: depth.bits_per_pixel(),
        compression: BI_RGB,
        image_size: image_size as u32,
        colors_used: 0,
    };
    header.write(&mut data)?;

    // Write the color table, padded out to the full size for the depth:
    let mut color_map = HashMap::<u32, u8>::new();
    for (index, &color) in colors.iter().enumerate() {
        color_map.insert(color, index as u8);
        let (_, red, green, blue) = channels(color);
        data.extend_from_slice(&[blue, green, red, 0]);
    }
    data.resize(data.len() + 4 * (num_colors - colors.len()), 0);

    let width = width as usize;
    let mut pixels = image.pixels().to_vec();
    flip_rows(&mut pixels, width);

    for row in pixels.chunks_exact(width) {
        let start = data.len();
        encode_row(depth, row, &color_map, &mut data);
        data.resize(start + stride, 0);
    }

    if with_mask {
        // Below 32 bpp the mask is the only transparency there is, and the
        // image's alpha is known to be 0 or 255.
        let threshold = if depth == BmpDepth::ThirtyTwo {
            options.get_alpha_threshold()
        } else {
            1
        };
        for row in pixels.chunks_exact(width) {
            let start = data.len();
            for chunk in row.chunks(8) {
                let mut byte = 0u8;
                for (bit, &pixel) in chunk.iter().enumerate() {
                    if alpha(pixel) < threshold {
                        byte |= 1 << (7 - bit);
                    }
                }
                data.push(byte);
            }
            data.resize(start + mask_stride, 0);
        }
    }

    debug_assert_eq!(data.len(), data_size);
    Ok(EncodedBmp { depth, num_colors, data })
}

//===========================================================================//


//===========================================================================//
