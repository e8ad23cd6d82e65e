use crate::bmp::encode_bmp;
use crate::bmpdepth::BmpDepth;
use crate::error::{IcoError, Result};
use crate::header::{ResourceType, DIR_ENTRY_LEN, HEADER_LEN};
use crate::icondir::{IconDir, IconDirEntry};
use crate::image::{IconImage, PixelFormat, MAX_SIZE};
use crate::options::EncodeOptions;
use std::io::Write;

//===========================================================================//

/// Identifies an image queued in an [`IcoWriter`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct EntryHandle(usize);

impl EntryHandle {
    /// Returns the position the image will have in the written directory.
    pub fn index(self) -> usize {
        self.0
    }
}

//===========================================================================//

/// Builds an ICO or CUR file from a sequence of images.
///
/// Images are encoded as they are added and kept in memory; nothing is
/// written until [`IcoWriter::finalize`], since the directory at the front of
/// the file needs every entry's offset.  Entries are written in the order
/// they were added, so encoding the same images twice gives identical
/// output.
pub struct IcoWriter {
    restype: ResourceType,
    options: EncodeOptions,
    entries: Vec<IconDirEntry>,
    payloads: Vec<Vec<u8>>,
}

impl IcoWriter {
    /// Starts a new, empty icon or cursor file with default options.
    pub fn new(restype: ResourceType) -> IcoWriter {
        IcoWriter::with_options(restype, EncodeOptions::default())
    }

    /// Starts a new, empty icon or cursor file.
    pub fn with_options(
        restype: ResourceType,
        options: EncodeOptions,
    ) -> IcoWriter {
        IcoWriter {
            restype,
            options,
            entries: Vec::new(),
            payloads: Vec::new(),
        }
    }

    /// Returns the type of resource being written.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the encoding options in use.
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Returns the number of images queued so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no images have been queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encodes an image and queues it as the next entry.  Images larger
    /// than the options' PNG threshold are stored as PNG; everything else
    /// becomes a 32-bit raw bitmap.
    pub fn add_image(&mut self, image: &IconImage) -> Result<EntryHandle> {
        self.add_image_with_depth(image, None)
    }

    /// Like [`IcoWriter::add_image`], but stores raw bitmaps at `depth` when
    /// that depth can represent the image exactly.  Images that need PNG
    /// storage ignore the requested depth.
    pub fn add_image_with_depth(
        &mut self,
        image: &IconImage,
        depth: Option<BmpDepth>,
    ) -> Result<EntryHandle> {
        if image.format() != PixelFormat::Argb32 {
            return Err(IcoError::InvalidPixelFormat(image.format()));
        }
        let (width, height) = (image.width(), image.height());
        if width > MAX_SIZE || height > MAX_SIZE {
            return Err(IcoError::ImageTooLarge { width, height });
        }
        let (num_colors, bits_per_pixel, data) =
            if self.options.uses_png(width, height) {
                let mut data = Vec::new();
                let bits_per_pixel = image.write_png_internal(&mut data)?;
                (0, bits_per_pixel, data)
            } else {
                let encoded = encode_bmp(image, depth, &self.options)?;
                let num_colors = encoded.num_colors as u8; // 256 becomes 0
                (num_colors, encoded.depth.bits_per_pixel(), encoded.data)
            };
        if data.len() > u32::MAX as usize {
            return Err(IcoError::PayloadTooLarge(data.len() as u64));
        }
        let (color_planes, bits_per_pixel) = match self.restype {
            ResourceType::Icon => (1, bits_per_pixel),
            ResourceType::Cursor => image.cursor_hotspot().unwrap_or((0, 0)),
        };
        let index = self.entries.len();
        log::debug!(
            "Queued entry {}: {}x{}, {} bytes",
            index,
            width,
            height,
            data.len()
        );
        self.entries.push(IconDirEntry::new(
            self.restype,
            index,
            (width, height),
            num_colors,
            color_planes,
            bits_per_pixel,
            data.len() as u32,
        ));
        self.payloads.push(data);
        Ok(EntryHandle(index))
    }

    /// Writes the header, the directory table and then every queued image,
    /// and returns the directory that was written.  Fails if no images were
    /// queued or if there are more than 65535 of them.
    pub fn finalize<W: Write>(self, mut writer: W) -> Result<IconDir> {
        let IcoWriter { restype, mut entries, payloads, .. } = self;
        if entries.is_empty() {
            return Err(IcoError::InvalidEntryCount(0));
        }
        if entries.len() > (u16::MAX as usize) {
            return Err(IcoError::TooManyEntries(entries.len()));
        }
        let mut offset = HEADER_LEN + DIR_ENTRY_LEN * entries.len() as u64;
        for (entry, payload) in entries.iter_mut().zip(payloads.iter()) {
            if offset > u32::MAX as u64 {
                return Err(IcoError::PayloadTooLarge(offset));
            }
            entry.set_data_offset(offset as u32);
            offset += payload.len() as u64;
        }
        let directory = IconDir::from_entries(restype, entries);
        directory.write_table(&mut writer)?;
        for payload in payloads.iter() {
            writer.write_all(payload)?;
        }
        writer.flush()?;
        log::debug!(
            "Wrote {:?} file with {} entries ({} bytes)",
            restype,
            directory.len(),
            offset
        );
        Ok(directory)
    }
}

//===========================================================================//


//===========================================================================//
