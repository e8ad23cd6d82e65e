//! A library for reading and writing ICO (Windows icon) and CUR (Windows
//! cursor) containers.
//!
//! An ICO file holds a directory of images, usually the same picture at
//! several sizes and color depths.  Each image is stored either as a raw
//! bitmap (a BITMAPINFOHEADER, an optional color table, bottom-up color rows
//! and a 1-bit AND mask) or as a complete embedded PNG.
//!
//! Reading is done in two steps: [`IconDir::read`] parses the header and
//! directory, and [`IconDirEntry::decode`] seeks to one entry and decodes it
//! into an [`IconImage`].  Writing goes through [`IcoWriter`], which queues
//! encoded images and lays out the file in [`IcoWriter::finalize`].
//! [`IcoHandler`] wraps a stream with a "current image" cursor for code that
//! expects a generic image-format handler.
//!
//! ```no_run
//! use std::fs::File;
//!
//! let mut file = File::open("app.ico").unwrap();
//! let icon_dir = icoformat::IconDir::read(&mut file).unwrap();
//! for entry in icon_dir.entries() {
//!     let image = entry.decode(&mut file).unwrap();
//!     println!("{}x{}", image.width(), image.height());
//! }
//! ```

#![warn(missing_docs)]

mod bmp;
mod bmpdepth;
mod error;
mod handler;
mod header;
mod icondir;
mod image;
mod options;
mod pngio;
mod writer;

pub use crate::bmpdepth::{row_stride, BmpDepth};
pub use crate::error::{ErrorKind, IcoError, Result};
pub use crate::handler::{write_icon, IcoHandler, ImageOption, OptionValue};
pub use crate::header::{recognize, ResourceType};
pub use crate::icondir::{
    decode_dimension, encode_dimension, IconDir, IconDirEntry,
};
pub use crate::image::{argb, channels, IconImage, PixelFormat};
pub use crate::options::{EncodeOptions, MaskPolicy};
pub use crate::pngio::is_png;
pub use crate::writer::{EntryHandle, IcoWriter};

//===========================================================================//
