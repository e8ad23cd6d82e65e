use crate::bmp::decode_bmp;
use crate::error::{IcoError, Result};
use crate::header::{self, stream_len, IconHeader, ResourceType};
use crate::image::IconImage;
use crate::pngio::{is_png, PNG_SIGNATURE};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Seek, SeekFrom, Write};

//===========================================================================//

/// Converts a directory width/height byte to pixels; zero means 256.
pub fn decode_dimension(byte: u8) -> u32 {
    if byte == 0 {
        256
    } else {
        byte as u32
    }
}

/// Converts a width/height in pixels to a directory byte.  Sizes of 256
/// and above are stored as zero.
pub fn encode_dimension(size: u32) -> u8 {
    if size > 255 {
        0
    } else {
        size as u8
    }
}

//===========================================================================//

/// The directory of an ICO or CUR file: one entry per embedded image, in
/// on-disk order.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDir {
    restype: ResourceType,
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    pub(crate) fn from_entries(
        restype: ResourceType,
        entries: Vec<IconDirEntry>,
    ) -> IconDir {
        IconDir { restype, entries }
    }

    /// Returns true if the stream starts with a plausible ICO/CUR header.
    /// The stream position is left unchanged.
    pub fn recognize<R: Read + Seek>(reader: &mut R) -> bool {
        header::recognize(reader)
    }

    /// Returns the type of resource stored in this collection, either icons or
    /// cursors.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the entries in this collection.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.  A directory parsed from a
    /// stream is never empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the header and directory table of an ICO or CUR file, starting
    /// at the reader's current position.  Image offsets are taken relative
    /// to that position.  No image data is read; use
    /// [`IconDirEntry::decode`] for that.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<IconDir> {
        let base = reader.stream_position()?;
        let available = stream_len(reader)?.saturating_sub(base);
        if available < header::HEADER_LEN {
            return Err(IcoError::TruncatedHeader {
                expected: header::HEADER_LEN,
                available,
            });
        }
        let dir_header = IconHeader::read(reader)?;
        if dir_header.count == 0 {
            return Err(IcoError::InvalidEntryCount(0));
        }
        if dir_header.table_end() > available {
            return Err(IcoError::TruncatedHeader {
                expected: dir_header.table_end(),
                available,
            });
        }
        let table_len = dir_header.table_end() - header::HEADER_LEN;
        let mut table = vec![0u8; table_len as usize];
        reader.read_exact(&mut table)?;
        let mut table = table.as_slice();
        let mut entries = Vec::with_capacity(dir_header.count as usize);
        for index in 0..(dir_header.count as usize) {
            let restype = dir_header.restype;
            let entry = IconDirEntry::read(&mut table, restype, index, base)?;
            log::trace!(
                "Entry {}: {}x{}, {} bytes at offset {}",
                index,
                entry.width,
                entry.height,
                entry.data_size,
                entry.data_offset
            );
            entries.push(entry);
        }
        log::debug!(
            "Parsed {:?} directory with {} entries",
            dir_header.restype,
            entries.len()
        );
        Ok(IconDir { restype: dir_header.restype, entries })
    }

    /// Writes the header and directory table.  Entry offsets must already
    /// be set; image data is not written.
    pub(crate) fn write_table<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.entries.len() > (u16::MAX as usize) {
            return Err(IcoError::TooManyEntries(self.entries.len()));
        }
        let header = IconHeader {
            restype: self.restype,
            count: self.entries.len() as u16,
        };
        header.write(writer)?;
        for entry in self.entries.iter() {
            entry.write(writer)?;
        }
        Ok(())
    }
}

//===========================================================================//

/// One entry in an ICO or CUR directory; describes a single image.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDirEntry {
    restype: ResourceType,
    index: usize,
    width: u32,
    height: u32,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_size: u32,
    data_offset: u32,
    base: u64,
}

impl IconDirEntry {
    pub(crate) fn new(
        restype: ResourceType,
        index: usize,
        (width, height): (u32, u32),
        num_colors: u8,
        color_planes: u16,
        bits_per_pixel: u16,
        data_size: u32,
    ) -> IconDirEntry {
        IconDirEntry {
            restype,
            index,
            width,
            height,
            num_colors,
            color_planes,
            bits_per_pixel,
            data_size,
            data_offset: 0,
            base: 0,
        }
    }

    fn read(
        table: &mut &[u8],
        restype: ResourceType,
        index: usize,
        base: u64,
    ) -> io::Result<IconDirEntry> {
        let width = decode_dimension(table.read_u8()?);
        let height = decode_dimension(table.read_u8()?);
        let num_colors = table.read_u8()?;
        let reserved = table.read_u8()?;
        if reserved != 0 {
            log::warn!(
                "Ignoring nonzero reserved byte ({}) in entry {}",
                reserved,
                index
            );
        }
        let color_planes = table.read_u16::<LittleEndian>()?;
        let bits_per_pixel = table.read_u16::<LittleEndian>()?;
        let data_size = table.read_u32::<LittleEndian>()?;
        let data_offset = table.read_u32::<LittleEndian>()?;
        Ok(IconDirEntry {
            restype,
            index,
            width,
            height,
            num_colors,
            color_planes,
            bits_per_pixel,
            data_size,
            data_offset,
            base,
        })
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(encode_dimension(self.width))?;
        writer.write_u8(encode_dimension(self.height))?;
        writer.write_u8(self.num_colors)?;
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.color_planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.data_size)?;
        writer.write_u32::<LittleEndian>(self.data_offset)?;
        Ok(())
    }

    pub(crate) fn set_data_offset(&mut self, offset: u32) {
        self.data_offset = offset;
    }

    /// Returns the type of resource stored in this entry, either an icon or a
    /// cursor.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the position of this entry in its directory.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the width of the image as recorded in the directory, in
    /// pixels (1 to 256).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image as recorded in the directory, in
    /// pixels (1 to 256).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the palette size recorded in the directory (0 if none or
    /// 256).
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the bits-per-pixel (color depth) of the image.  Returns zero if
    /// `self.resource_type() == ResourceType::Cursor` (since CUR files store
    /// hotspot coordinates in place of this field).
    pub fn bits_per_pixel(&self) -> u16 {
        if self.restype == ResourceType::Cursor {
            0
        } else {
            self.bits_per_pixel
        }
    }

    /// Returns the coordinates of the cursor hotspot (pixels right from the
    /// left edge of the image, and pixels down from the top edge), or `None`
    /// if `self.resource_type() != ResourceType::Cursor`.
    pub fn cursor_hotspot(&self) -> Option<(u16, u16)> {
        if self.restype == ResourceType::Cursor {
            Some((self.color_planes, self.bits_per_pixel))
        } else {
            None
        }
    }

    /// Returns the size of the encoded image data, in bytes.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Returns the offset of the encoded image data, relative to the start
    /// of the container.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Checks that the entry's data lies within the stream and seeks to its
    /// start.
    fn seek_to_data<S: Seek>(&self, reader: &mut S) -> Result<()> {
        let start = self.base + self.data_offset as u64;
        let end = start + self.data_size as u64;
        let stream_len = stream_len(reader)?;
        if end > stream_len {
            return Err(IcoError::EntryOutOfBounds {
                index: self.index,
                offset: self.data_offset,
                size: self.data_size,
                stream_len,
            });
        }
        reader.seek(SeekFrom::Start(start))?;
        Ok(())
    }

    /// Reads this entry's raw, encoded image data from the stream.  Fails
    /// with [`IcoError::EntryOutOfBounds`] if the data would extend past the
    /// end of the stream.
    pub fn read_data<R: Read + Seek>(
        &self,
        reader: &mut R,
    ) -> Result<Vec<u8>> {
        self.seek_to_data(reader)?;
        let mut data = vec![0u8; self.data_size as usize];
        reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Reads just enough of the entry to tell whether it holds an embedded
    /// PNG rather than a raw bitmap.  Fails like
    /// [`IconDirEntry::read_data`] if the entry is out of bounds.
    pub fn is_png<R: Read + Seek>(&self, reader: &mut R) -> Result<bool> {
        self.seek_to_data(reader)?;
        let len = PNG_SIGNATURE.len().min(self.data_size as usize);
        let mut prefix = vec![0u8; len];
        reader.read_exact(&mut prefix)?;
        Ok(is_png(&prefix))
    }

    /// Decodes this entry into a straight-alpha ARGB32 image.  Returns an
    /// error if the data is out of bounds, malformed or can't be decoded.
    pub fn decode<R: Read + Seek>(
        &self,
        reader: &mut R,
    ) -> Result<IconImage> {
        let data = self.read_data(reader)?;
        let mut image = if is_png(&data) {
            IconImage::read_png(data.as_slice())?
        } else if data.starts_with(&PNG_SIGNATURE[..4]) {
            return Err(IcoError::MalformedPng(
                "damaged PNG signature".to_string(),
            ));
        } else {
            decode_bmp(&data)?
        };
        if image.width() != self.width || image.height() != self.height {
            // Since Windows Vista a zero byte in the directory stands for any
            // size of 256 or more, so the image data is authoritative.
            log::warn!(
                "Entry {} is {}x{} in the directory but {}x{} in its data",
                self.index,
                self.width,
                self.height,
                image.width(),
                image.height()
            );
        }
        image.set_cursor_hotspot(self.cursor_hotspot());
        Ok(image)
    }
}

//===========================================================================//


//===========================================================================//
