extern crate icoformat;

use icoformat::{ErrorKind, IcoError, IcoHandler, IconDir};
use std::io::Cursor;

//===========================================================================//

// A PNG header claiming 60000x60000 RGBA pixels, with a tiny IDAT.
const HUGE_PNG: &[u8] = b"\
    \x89\x50\x4e\x47\x0d\x0a\x1a\x0a\x00\x00\x00\x0d\x49\x48\x44\x52\
    \x00\x00\xea\x60\x00\x00\xea\x60\x08\x06\x00\x00\x00\x80\xd2\x75\
    \x42\x00\x00\x00\x0c\x49\x44\x41\x54\x78\x9c\x63\x60\x60\x60\x00\
    \x00\x00\x04\x00\x01\xf6\x17\x38\x55\x00\x00\x00\x00\x49\x45\x4e\
    \x44\xae\x42\x60\x82";

// A 2x2 8-bit grayscale PNG.
const GRAYSCALE_PNG: &[u8] = b"\
    \x89\x50\x4e\x47\x0d\x0a\x1a\x0a\x00\x00\x00\x0d\x49\x48\x44\x52\
    \x00\x00\x00\x02\x00\x00\x00\x02\x08\x00\x00\x00\x00\x57\xdd\x52\
    \xf8\x00\x00\x00\x0e\x49\x44\x41\x54\x78\x9c\x63\xb4\x77\x60\xdc\
    \xef\x00\x00\x04\x08\x01\x81\x86\x2e\xc9\x8d\x00\x00\x00\x00\x49\
    \x45\x4e\x44\xae\x42\x60\x82";

/// Builds a raw bitmap payload of `size`x`size` pixels at `bit_count` bpp,
/// every color byte set from `fill`, followed by an all-clear AND mask.
fn raw_payload(size: u32, bit_count: u16, fill: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&(size as i32).to_le_bytes());
    data.extend_from_slice(&(2 * size as i32).to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&bit_count.to_le_bytes());
    data.extend_from_slice(&[0u8; 24]);
    for _ in 0..(size * size) {
        data.extend_from_slice(fill);
    }
    let mask_len = icoformat::row_stride(size, 1) * size as usize;
    data.resize(data.len() + mask_len, 0);
    data
}

/// Lays out an icon file from `(width byte, height byte, bit count,
/// payload)` tuples.
fn container(entries: &[(u8, u8, u16, Vec<u8>)]) -> Vec<u8> {
    let mut file = vec![0, 0, 1, 0];
    file.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    let mut offset = 6 + 16 * entries.len() as u32;
    for &(width, height, bit_count, ref payload) in entries.iter() {
        file.extend_from_slice(&[width, height, 0, 0, 1, 0]);
        file.extend_from_slice(&bit_count.to_le_bytes());
        file.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        file.extend_from_slice(&offset.to_le_bytes());
        offset += payload.len() as u32;
    }
    for &(_, _, _, ref payload) in entries.iter() {
        file.extend_from_slice(payload);
    }
    file
}

//===========================================================================//

#[test]
fn decode_two_raw_entries_in_order() {
    let file = container(&[
        (16, 16, 32, raw_payload(16, 32, &[1, 2, 3, 255])),
        (32, 32, 32, raw_payload(32, 32, &[4, 5, 6, 128])),
    ]);
    assert_eq!(&file[..6], b"\x00\x00\x01\x00\x02\x00");
    let mut handler = IcoHandler::new(Cursor::new(file));
    assert!(handler.can_read());
    assert_eq!(handler.image_count(), 2);

    handler.jump_to_image(0).unwrap();
    let image = handler.read().unwrap();
    assert_eq!((image.width(), image.height()), (16, 16));
    assert!(image.pixels().iter().all(|&pixel| pixel == 0xff03_0201));

    handler.jump_to_image(1).unwrap();
    let image = handler.read().unwrap();
    assert_eq!((image.width(), image.height()), (32, 32));
    assert!(image.pixels().iter().all(|&pixel| pixel == 0x8006_0504));
}

#[test]
fn decode_palette_and_direct_depths() {
    // Two-entry palette for the 1 bpp image: black, then white.
    let mut one_bpp = raw_payload(8, 1, &[]);
    let palette: &[u8] = b"\x00\x00\x00\x00\xff\xff\xff\x00";
    for (index, &byte) in palette.iter().enumerate() {
        one_bpp.insert(40 + index, byte);
    }
    // Color rows: every pixel uses palette index 1.
    for row in 0..8 {
        one_bpp.insert(48 + row * 4, 0xff);
        one_bpp.splice((49 + row * 4)..(49 + row * 4), vec![0, 0, 0]);
    }
    let file = container(&[
        (8, 8, 1, one_bpp),
        (4, 4, 24, {
            let mut data = raw_payload(4, 24, &[]);
            let rows: Vec<u8> =
                [9u8, 8, 7].iter().cycle().take(48).cloned().collect();
            data.splice(40..40, rows);
            data
        }),
    ]);
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    let image = icon_dir.entries()[0].decode(&mut cursor).unwrap();
    assert_eq!((image.width(), image.height()), (8, 8));
    assert!(image.pixels().iter().all(|&pixel| pixel == 0xffff_ffff));
    let image = icon_dir.entries()[1].decode(&mut cursor).unwrap();
    assert_eq!((image.width(), image.height()), (4, 4));
    assert!(image.pixels().iter().all(|&pixel| pixel == 0xff07_0809));
}

#[test]
fn decode_embedded_png() {
    let file = container(&[(2, 2, 32, GRAYSCALE_PNG.to_vec())]);
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    let entry = &icon_dir.entries()[0];
    assert!(entry.is_png(&mut cursor).unwrap());
    let image = entry.decode(&mut cursor).unwrap();
    assert_eq!(
        image.pixels(),
        &[0xff3f_3f3f, 0xff7f_7f7f, 0xffbf_bfbf, 0xffff_ffff]
    );
    assert_eq!(image.cursor_hotspot(), None);
}

#[test]
fn unsupported_bit_count_fails_cleanly() {
    let file = container(&[(4, 4, 3, raw_payload(4, 3, &[0xaa; 2]))]);
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    let error = icon_dir.entries()[0].decode(&mut cursor).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnsupportedEncoding);
    match error {
        IcoError::UnsupportedBitDepth(3) => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn entry_past_end_of_stream_is_structural() {
    let mut file = container(&[(4, 4, 32, raw_payload(4, 32, &[0; 4]))]);
    // Claim one more byte than the stream holds.
    let size = u32::from_le_bytes([file[14], file[15], file[16], file[17]]);
    file[14..18].copy_from_slice(&(size + 1).to_le_bytes());
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    let error = icon_dir.entries()[0].decode(&mut cursor).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Structural);
}

#[test]
fn short_pixel_data_is_corrupt() {
    let mut payload = raw_payload(4, 32, &[0; 4]);
    payload.truncate(40 + 30);
    let file = container(&[(4, 4, 32, payload)]);
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    let error = icon_dir.entries()[0].decode(&mut cursor).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::CorruptPixelData);
}

#[test]
fn directory_dimensions_are_in_range() {
    let file = container(&[
        (0, 0, 32, vec![0; 4]),
        (1, 255, 32, vec![0; 4]),
        (48, 0, 32, vec![0; 4]),
    ]);
    let icon_dir = IconDir::read(&mut Cursor::new(file)).unwrap();
    let sizes: Vec<(u32, u32)> = icon_dir
        .entries()
        .iter()
        .map(|entry| (entry.width(), entry.height()))
        .collect();
    assert_eq!(sizes, vec![(256, 256), (1, 255), (48, 256)]);
    for &(width, height) in sizes.iter() {
        assert!(width > 0 && width <= 256);
        assert!(height > 0 && height <= 256);
    }
}

#[test]
fn recognize_rejects_other_formats() {
    let file = container(&[(1, 1, 32, raw_payload(1, 32, &[0; 4]))]);
    assert!(icoformat::recognize(&mut Cursor::new(&file)));
    for &(index, value) in &[(0, 1u8), (1, 0x80), (2, 0), (2, 3), (3, 1)] {
        let mut broken = file.clone();
        broken[index] = value;
        assert!(
            !icoformat::recognize(&mut Cursor::new(&broken)),
            "byte {} set to {} should not be recognized",
            index,
            value
        );
    }
    let error = IconDir::read(&mut Cursor::new(b"BM\x00\x00\x00\x00"))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Recognition);
}

#[test]
fn oversized_png_is_rejected_before_decoding() {
    let file = container(&[(0, 0, 32, HUGE_PNG.to_vec())]);
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    let error = icon_dir.entries()[0].decode(&mut cursor).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Structural);
    match error {
        IcoError::InvalidDimensions { width: 60000, height: 60000 } => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn bitmap_height_is_halved_even_when_directory_disagrees() {
    // The directory claims the doubled height of the bitmap header.
    let file = container(&[(16, 32, 32, raw_payload(16, 32, &[1, 2, 3, 4]))]);
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    assert_eq!(icon_dir.entries()[0].height(), 32);
    let image = icon_dir.entries()[0].decode(&mut cursor).unwrap();
    assert_eq!((image.width(), image.height()), (16, 16));
    assert!(image.pixels().iter().all(|&pixel| pixel == 0x0403_0201));
}

#[test]
fn png_check_reports_out_of_bounds_entries() {
    let mut file = container(&[(4, 4, 32, raw_payload(4, 32, &[0; 4]))]);
    file[18..22].copy_from_slice(&1000u32.to_le_bytes());
    let mut cursor = Cursor::new(file);
    let icon_dir = IconDir::read(&mut cursor).unwrap();
    let error = icon_dir.entries()[0].is_png(&mut cursor).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Structural);
}

//===========================================================================//
