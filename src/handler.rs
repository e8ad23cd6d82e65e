use crate::error::{IcoError, Result};
use crate::header::{self, ResourceType};
use crate::icondir::IconDir;
use crate::image::{IconImage, PixelFormat};
use crate::writer::IcoWriter;
use std::io::{Read, Seek, SeekFrom, Write};

//===========================================================================//

/// A question that can be asked of an [`IcoHandler`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ImageOption {
    /// Size of the current image, from the directory.
    Size,
    /// Whether the format can hold more than one image.
    MultipleImages,
    /// Whether the images form an animation.
    Animation,
    /// Bits-per-pixel of the current image, from the directory.
    BitDepth,
}

/// The answer to an [`ImageOption`] query.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OptionValue {
    /// A width and height in pixels.
    Size(u32, u32),
    /// A yes/no answer.
    Bool(bool),
    /// A numeric answer.
    Int(u32),
}

//===========================================================================//

/// Presents an ICO/CUR stream as a sequence of images with a "current
/// image" cursor, in the shape generic image-loading code expects.
///
/// The directory is parsed on first use, starting from wherever the device
/// is positioned at that time.
pub struct IcoHandler<R> {
    device: R,
    directory: Option<IconDir>,
    current: usize,
}

impl<R: Read + Seek> IcoHandler<R> {
    /// Wraps a device.  Nothing is read until the handler is queried.
    pub fn new(device: R) -> IcoHandler<R> {
        IcoHandler { device, directory: None, current: 0 }
    }

    /// Returns the short name of the format.
    pub fn name(&self) -> &'static str {
        "ico"
    }

    /// Returns true if `device` looks like an ICO/CUR stream.  The device
    /// position is left unchanged.
    pub fn can_read_device(device: &mut R) -> bool {
        header::recognize(device)
    }

    /// Returns true if the wrapped device looks like an ICO/CUR stream.
    /// Doesn't affect the current image or the parsed directory.
    pub fn can_read(&mut self) -> bool {
        if self.directory.is_some() {
            return true;
        }
        IcoHandler::can_read_device(&mut self.device)
    }

    fn directory(&mut self) -> Result<&IconDir> {
        if self.directory.is_none() {
            let start = self.device.stream_position()?;
            match IconDir::read(&mut self.device) {
                Ok(directory) => self.directory = Some(directory),
                Err(error) => {
                    // Rewind so that a later attempt starts from the same
                    // place.
                    self.device.seek(SeekFrom::Start(start))?;
                    return Err(error);
                }
            }
        }
        match self.directory {
            Some(ref directory) => Ok(directory),
            None => Err(IcoError::NotIco("directory unavailable")),
        }
    }

    /// Returns the parsed directory, parsing it first if needed.
    pub fn icon_dir(&mut self) -> Result<&IconDir> {
        self.directory()
    }

    /// Returns the resource type of the stream.
    pub fn resource_type(&mut self) -> Result<ResourceType> {
        Ok(self.directory()?.resource_type())
    }

    /// Returns the number of images, or zero if the stream can't be parsed.
    pub fn image_count(&mut self) -> usize {
        match self.directory() {
            Ok(directory) => directory.len(),
            Err(error) => {
                log::debug!("Can't count images: {}", error);
                0
            }
        }
    }

    /// Returns the index of the current image.
    pub fn current_image_number(&self) -> usize {
        self.current
    }

    /// Makes image `index` current.  Fails with
    /// [`IcoError::IndexOutOfRange`] if there is no such image; the current
    /// image is unchanged in that case.
    pub fn jump_to_image(&mut self, index: usize) -> Result<()> {
        let count = self.directory()?.len();
        if index >= count {
            return Err(IcoError::IndexOutOfRange { index, count });
        }
        self.current = index;
        Ok(())
    }

    /// Advances to the next image.  Fails with [`IcoError::EndOfSequence`]
    /// when the current image is the last one.
    pub fn jump_to_next_image(&mut self) -> Result<()> {
        let count = self.directory()?.len();
        if self.current + 1 >= count {
            return Err(IcoError::EndOfSequence);
        }
        self.current += 1;
        Ok(())
    }

    /// Decodes the current image.  The cursor doesn't move.
    pub fn read(&mut self) -> Result<IconImage> {
        let current = self.current;
        let entry = self.directory()?.entries()[current].clone();
        entry.decode(&mut self.device)
    }

    /// Returns true if [`IcoHandler::option`] can answer `option`.
    pub fn supports_option(&self, option: ImageOption) -> bool {
        match option {
            ImageOption::Size
            | ImageOption::MultipleImages
            | ImageOption::Animation
            | ImageOption::BitDepth => true,
        }
    }

    /// Answers an option query without touching the device.  Per-image
    /// options describe the current image as recorded in the directory; they
    /// are `None` until the directory has been parsed by one of the other
    /// queries (such as [`IcoHandler::image_count`]).
    pub fn option(&self, option: ImageOption) -> Option<OptionValue> {
        let entry = self
            .directory
            .as_ref()
            .and_then(|directory| directory.entries().get(self.current));
        match option {
            ImageOption::MultipleImages => Some(OptionValue::Bool(true)),
            ImageOption::Animation => Some(OptionValue::Bool(false)),
            ImageOption::Size => entry
                .map(|entry| OptionValue::Size(entry.width(), entry.height())),
            ImageOption::BitDepth => entry.map(|entry| {
                OptionValue::Int(entry.bits_per_pixel() as u32)
            }),
        }
    }

    /// Returns the wrapped device.
    pub fn into_inner(self) -> R {
        self.device
    }
}

//===========================================================================//

/// Writes `images` as a complete ICO file, converting each to straight-alpha
/// ARGB32 first.
pub fn write_icon<W: Write>(writer: W, images: &[IconImage]) -> Result<()> {
    let mut ico_writer = IcoWriter::new(ResourceType::Icon);
    for image in images.iter() {
        if image.format() == PixelFormat::Argb32 {
            ico_writer.add_image(image)?;
        } else {
            ico_writer.add_image(&image.convert_to(PixelFormat::Argb32))?;
        }
    }
    ico_writer.finalize(writer)?;
    Ok(())
}

//===========================================================================//


//===========================================================================//
