#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// A color depth for raw (BMP-encoded) icon images.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum BmpDepth {
    /// Two-color palette.
    One,
    /// 16-color palette.
    Four,
    /// 256-color palette.
    Eight,
    /// Direct BGR color, transparency only via the AND mask.
    TwentyFour,
    /// Direct BGRA color.
    ThirtyTwo,
}

impl BmpDepth {
    /// Returns the depth with the given bits-per-pixel, or `None` if raw
    /// icon images can't use that depth.
    pub fn from_bits_per_pixel(bits_per_pixel: u16) -> Option<BmpDepth> {
        match bits_per_pixel {
            1 => Some(BmpDepth::One),
            4 => Some(BmpDepth::Four),
            8 => Some(BmpDepth::Eight),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    /// Returns the number of bits used for each pixel.
    pub fn bits_per_pixel(self) -> u16 {
        match self {
            BmpDepth::One => 1,
            BmpDepth::Four => 4,
            BmpDepth::Eight => 8,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    /// Returns the maximum size of the color table; zero for direct-color
    /// depths.
    pub fn num_colors(self) -> usize {
        match self {
            BmpDepth::One => 2,
            BmpDepth::Four => 16,
            BmpDepth::Eight => 256,
            BmpDepth::TwentyFour | BmpDepth::ThirtyTwo => 0,
        }
    }

    /// Returns the length of one stored row of `width` pixels.
    pub(crate) fn row_stride(self, width: u32) -> usize {
        row_stride(width, self.bits_per_pixel())
    }
}

//===========================================================================//

/// Returns the number of bytes in one bitmap row of `width` pixels at
/// `bits_per_pixel`, including the padding up to a multiple of four bytes.
pub fn row_stride(width: u32, bits_per_pixel: u16) -> usize {
    let row_bits = width as usize * bits_per_pixel as usize;
    ((row_bits + 31) / 32) * 4
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{row_stride, BmpDepth};

    #[test]
    fn bmp_depth_round_trip() {
        let depths = &[
            BmpDepth::One,
            BmpDepth::Four,
            BmpDepth::Eight,
            BmpDepth::TwentyFour,
            BmpDepth::ThirtyTwo,
        ];
        for &depth in depths.iter() {
            assert_eq!(
                BmpDepth::from_bits_per_pixel(depth.bits_per_pixel()),
                Some(depth)
            );
        }
    }

    #[test]
    fn unsupported_depths() {
        for &bits in &[0, 2, 3, 16, 48, 64] {
            assert_eq!(BmpDepth::from_bits_per_pixel(bits), None);
        }
    }

    #[test]
    fn row_stride_is_padded() {
        assert_eq!(row_stride(1, 1), 4);
        assert_eq!(row_stride(32, 1), 4);
        assert_eq!(row_stride(33, 1), 8);
        assert_eq!(row_stride(5, 4), 4);
        assert_eq!(row_stride(9, 4), 8);
        assert_eq!(row_stride(3, 8), 4);
        assert_eq!(row_stride(5, 24), 16);
        assert_eq!(row_stride(16, 24), 48);
        assert_eq!(row_stride(7, 32), 28);
        assert_eq!(row_stride(256, 1), 32);
    }
}

//===========================================================================//
