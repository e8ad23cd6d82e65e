use crate::image::PixelFormat;
use std::io;
use thiserror::Error;

//===========================================================================//

/// A specialized `Result` type for ICO reading and writing.
pub type Result<T> = std::result::Result<T, IcoError>;

//===========================================================================//

/// The broad class of an [`IcoError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The stream is not an ICO/CUR container at all; another format
    /// handler should be tried.
    Recognition,
    /// The container structure is broken (truncated header, bad entry
    /// count, entry data out of bounds).
    Structural,
    /// An entry uses an encoding this crate doesn't decode.
    UnsupportedEncoding,
    /// The pixel data is shorter than its declared geometry requires.
    CorruptPixelData,
    /// An image can't be stored in an ICO container as given.
    EncodingConstraint,
    /// The handler's image cursor was moved out of range.
    Sequence,
    /// The underlying stream failed.
    Io,
}

/// An error produced while recognizing, decoding or encoding an ICO file.
#[derive(Debug, Error)]
pub enum IcoError {
    /// The stream doesn't start with a valid ICONDIR header.
    #[error("Not an ICO/CUR stream ({0})")]
    NotIco(&'static str),
    /// The stream ends before the header and directory table do.
    #[error(
        "Truncated ICO header (needed {expected} bytes, \
         but only {available} available)"
    )]
    TruncatedHeader {
        /// Bytes required by the declared entry count.
        expected: u64,
        /// Bytes actually present in the stream.
        available: u64,
    },
    /// The header declares zero entries.
    #[error("Invalid number of ICO entries ({0})")]
    InvalidEntryCount(usize),
    /// A directory entry points outside of the stream.
    #[error(
        "Entry {index} data (offset {offset}, size {size}) extends past \
         end of stream (length {stream_len})"
    )]
    EntryOutOfBounds {
        /// Position of the entry in the directory.
        index: usize,
        /// Declared `imageOffset`.
        offset: u32,
        /// Declared `bytesInRes`.
        size: u32,
        /// Total length of the stream.
        stream_len: u64,
    },
    /// Bitmap or PNG dimensions are zero, negative or out of range.
    #[error("Invalid image dimensions ({width}x{height})")]
    InvalidDimensions {
        /// Width as stored.
        width: i64,
        /// Height as stored.
        height: i64,
    },
    /// A raw bitmap's header is shorter than a BITMAPINFOHEADER.
    #[error("Invalid BMP header size (was {0}, but must be at least 40)")]
    InvalidBitmapHeader(u32),
    /// A raw bitmap uses a bit count other than 1, 4, 8, 24 or 32.
    #[error("Unsupported BMP bits-per-pixel ({0})")]
    UnsupportedBitDepth(u16),
    /// A raw bitmap is compressed.
    #[error("Unsupported BMP compression ({0}); only 0 is allowed")]
    UnsupportedCompression(u32),
    /// Embedded PNG data couldn't be decoded or encoded.
    #[error("Malformed PNG data: {0}")]
    MalformedPng(String),
    /// The entry is too short for the bitmap geometry it declares.
    #[error(
        "Corrupt pixel data (needed {expected} bytes, but entry has {actual})"
    )]
    CorruptPixelData {
        /// Bytes required by header, palette and color rows.
        expected: usize,
        /// Bytes present in the entry.
        actual: usize,
    },
    /// An image wider or taller than 256 pixels was given to the writer.
    #[error("Image too large for ICO ({width}x{height}, but max is 256x256)")]
    ImageTooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// The writer only accepts straight-alpha ARGB32 images.
    #[error("Invalid pixel format {0:?}; expected {expected:?}",
            expected = PixelFormat::Argb32)]
    InvalidPixelFormat(PixelFormat),
    /// More entries were queued than a 16-bit count can describe.
    #[error("Too many entries ({0}, but max is {max})", max = u16::MAX)]
    TooManyEntries(usize),
    /// Entry offsets would overflow the 32-bit offset field.
    #[error("Total image data too large ({0} bytes)")]
    PayloadTooLarge(u64),
    /// `jump_to_image` was given an index past the last entry.
    #[error("Image index {index} out of range (count is {count})")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of entries in the directory.
        count: usize,
    },
    /// `jump_to_next_image` was called on the last entry.
    #[error("No more images")]
    EndOfSequence,
    /// The underlying stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl IcoError {
    /// Returns which class of failure this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            IcoError::NotIco(_) => ErrorKind::Recognition,
            IcoError::TruncatedHeader { .. }
            | IcoError::InvalidEntryCount(_)
            | IcoError::EntryOutOfBounds { .. }
            | IcoError::InvalidDimensions { .. }
            | IcoError::InvalidBitmapHeader(_) => ErrorKind::Structural,
            IcoError::UnsupportedBitDepth(_)
            | IcoError::UnsupportedCompression(_)
            | IcoError::MalformedPng(_) => ErrorKind::UnsupportedEncoding,
            IcoError::CorruptPixelData { .. } => ErrorKind::CorruptPixelData,
            IcoError::ImageTooLarge { .. }
            | IcoError::InvalidPixelFormat(_)
            | IcoError::TooManyEntries(_)
            | IcoError::PayloadTooLarge(_) => ErrorKind::EncodingConstraint,
            IcoError::IndexOutOfRange { .. } | IcoError::EndOfSequence => {
                ErrorKind::Sequence
            }
            IcoError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<IcoError> for io::Error {
    fn from(error: IcoError) -> io::Error {
        let kind = match error {
            IcoError::Io(error) => return error,
            ref other => match other.kind() {
                ErrorKind::EncodingConstraint | ErrorKind::Sequence => {
                    io::ErrorKind::InvalidInput
                }
                _ => io::ErrorKind::InvalidData,
            },
        };
        io::Error::new(kind, error)
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{ErrorKind, IcoError};
    use std::io;

    #[test]
    fn kinds_match_taxonomy() {
        assert_eq!(IcoError::NotIco("x").kind(), ErrorKind::Recognition);
        assert_eq!(
            IcoError::InvalidEntryCount(0).kind(),
            ErrorKind::Structural
        );
        assert_eq!(
            IcoError::UnsupportedBitDepth(3).kind(),
            ErrorKind::UnsupportedEncoding
        );
        assert_eq!(
            IcoError::ImageTooLarge { width: 300, height: 1 }.kind(),
            ErrorKind::EncodingConstraint
        );
        assert_eq!(IcoError::EndOfSequence.kind(), ErrorKind::Sequence);
    }

    #[test]
    fn converts_to_io_error() {
        let error: io::Error = IcoError::UnsupportedBitDepth(3).into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
        let error: io::Error =
            IcoError::Io(io::Error::from(io::ErrorKind::UnexpectedEof)).into();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
        let error: io::Error = IcoError::TooManyEntries(70000).into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}

//===========================================================================//
