#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// Whether 32-bit raw entries also carry a 1-bit AND mask.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum MaskPolicy {
    /// Always append an AND mask synthesized from the alpha channel.  Some
    /// older consumers refuse 32-bit entries without one.
    Always,
    /// Omit the mask for 32-bit entries; the alpha channel alone carries
    /// transparency.  Palette and 24-bit entries still get a mask.
    Never,
}

/// Settings that control how [`IcoWriter`](crate::IcoWriter) encodes
/// images.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct EncodeOptions {
    compact: bool,
    png_threshold: u32,
    mask_policy: MaskPolicy,
    alpha_threshold: u8,
}

impl EncodeOptions {
    /// Returns the default options: raw bitmaps up to 255x255 with an AND
    /// mask marking fully transparent pixels, PNG above that.
    pub fn new() -> EncodeOptions {
        EncodeOptions {
            compact: false,
            png_threshold: 255,
            mask_policy: MaskPolicy::Always,
            alpha_threshold: 1,
        }
    }

    /// If true, every image is stored as embedded PNG regardless of size.
    pub fn compact(mut self, compact: bool) -> EncodeOptions {
        self.compact = compact;
        self
    }

    /// Images wider or taller than `threshold` pixels are stored as PNG.
    pub fn png_threshold(mut self, threshold: u32) -> EncodeOptions {
        self.png_threshold = threshold;
        self
    }

    /// Sets the AND mask policy for 32-bit raw entries.
    pub fn mask_policy(mut self, policy: MaskPolicy) -> EncodeOptions {
        self.mask_policy = policy;
        self
    }

    /// Pixels with alpha strictly below `threshold` get their mask bit set.
    pub fn alpha_threshold(mut self, threshold: u8) -> EncodeOptions {
        self.alpha_threshold = threshold;
        self
    }

    /// Returns true if `width`x`height` images must be stored as PNG.
    pub fn uses_png(&self, width: u32, height: u32) -> bool {
        self.compact
            || width > self.png_threshold
            || height > self.png_threshold
    }

    /// Returns the AND mask policy for 32-bit raw entries.
    pub fn get_mask_policy(&self) -> MaskPolicy {
        self.mask_policy
    }

    /// Returns the alpha value below which the mask bit is set.
    pub fn get_alpha_threshold(&self) -> u8 {
        self.alpha_threshold
    }
}

impl Default for EncodeOptions {
    fn default() -> EncodeOptions {
        EncodeOptions::new()
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{EncodeOptions, MaskPolicy};

    #[test]
    fn defaults_use_png_only_for_large_images() {
        let options = EncodeOptions::default();
        assert!(!options.uses_png(255, 255));
        assert!(options.uses_png(256, 16));
        assert!(options.uses_png(16, 256));
        assert_eq!(options.get_mask_policy(), MaskPolicy::Always);
        assert_eq!(options.get_alpha_threshold(), 1);
    }

    #[test]
    fn compact_always_uses_png() {
        let options = EncodeOptions::new().compact(true);
        assert!(options.uses_png(1, 1));
        let options = EncodeOptions::new().png_threshold(48);
        assert!(!options.uses_png(48, 48));
        assert!(options.uses_png(49, 48));
    }
}

//===========================================================================//
