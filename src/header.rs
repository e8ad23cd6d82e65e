use crate::error::{IcoError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Seek, SeekFrom, Write};

//===========================================================================//

// Size of the ICONDIR header, in bytes.
pub(crate) const HEADER_LEN: u64 = 6;

// Size of one ICONDIRENTRY record, in bytes.
pub(crate) const DIR_ENTRY_LEN: u64 = 16;

//===========================================================================//

/// The type of resource stored in an ICO/CUR container.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ResourceType {
    /// Plain images (ICO files)
    Icon,
    /// Images with cursor hotspots (CUR files)
    Cursor,
}

impl ResourceType {
    pub(crate) fn from_number(number: u16) -> Option<ResourceType> {
        match number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }

    pub(crate) fn number(self) -> u16 {
        match self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }

    /// Returns the conventional file extension for this resource type.
    pub fn extension(self) -> &'static str {
        match self {
            ResourceType::Icon => "ico",
            ResourceType::Cursor => "cur",
        }
    }
}

//===========================================================================//

/// The fixed six-byte ICONDIR header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct IconHeader {
    pub(crate) restype: ResourceType,
    pub(crate) count: u16,
}

impl IconHeader {
    /// Parses the header.  A nonzero reserved field or an unknown resource
    /// type means the stream isn't an ICO/CUR container at all.
    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<IconHeader> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            return Err(IcoError::NotIco("nonzero reserved field"));
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        let restype = match ResourceType::from_number(restype) {
            Some(restype) => restype,
            None => return Err(IcoError::NotIco("unknown resource type")),
        };
        let count = reader.read_u16::<LittleEndian>()?;
        Ok(IconHeader { restype, count })
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.restype.number())?;
        writer.write_u16::<LittleEndian>(self.count)?;
        Ok(())
    }

    /// Returns the number of bytes taken up by the header plus the
    /// directory table that follows it.
    pub(crate) fn table_end(&self) -> u64 {
        HEADER_LEN + DIR_ENTRY_LEN * self.count as u64
    }
}

//===========================================================================//

/// Returns true if the stream looks like an ICO or CUR container: a zero
/// reserved field, a resource type of 1 or 2, and at least one entry.
///
/// Only the first six bytes are examined, and the stream position is
/// restored afterwards, so a full parse can follow.
pub fn recognize<R: Read + Seek>(reader: &mut R) -> bool {
    let start = match reader.stream_position() {
        Ok(position) => position,
        Err(_) => return false,
    };
    let mut bytes = [0u8; HEADER_LEN as usize];
    let peeked = reader.read_exact(&mut bytes);
    if reader.seek(SeekFrom::Start(start)).is_err() || peeked.is_err() {
        return false;
    }
    match IconHeader::read(&mut &bytes[..]) {
        Ok(header) => header.count > 0,
        Err(_) => false,
    }
}

/// Returns the total length of the stream without moving its position.
pub(crate) fn stream_len<S: Seek>(stream: &mut S) -> io::Result<u64> {
    let position = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if position != len {
        stream.seek(SeekFrom::Start(position))?;
    }
    Ok(len)
}

//===========================================================================//


//===========================================================================//
