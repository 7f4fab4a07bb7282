// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image decoding tests for downloaded bodies

use image::{DynamicImage, ImageFormat};
use ocr_gateway::vision::{decode_image_bytes, detect_format, ImageError};
use std::io::Cursor;

fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

#[test]
fn test_decodes_common_formats() {
    for (format, name) in [
        (ImageFormat::Png, "PNG"),
        (ImageFormat::Jpeg, "JPEG"),
        (ImageFormat::Bmp, "BMP"),
        (ImageFormat::Tiff, "TIFF"),
    ] {
        let bytes = encode(format, 40, 20);
        let (image, info) = decode_image_bytes(&bytes).unwrap();

        assert_eq!((image.width(), image.height()), (40, 20), "{}", name);
        assert_eq!(info.size_label(), "40x20");
        assert_eq!(info.format_name(), name);
        assert_eq!(info.size_bytes, bytes.len());
    }
}

#[test]
fn test_detects_format_from_magic_bytes() {
    assert_eq!(
        detect_format(&encode(ImageFormat::Png, 2, 2)).unwrap(),
        ImageFormat::Png
    );
    assert_eq!(
        detect_format(&encode(ImageFormat::Jpeg, 2, 2)).unwrap(),
        ImageFormat::Jpeg
    );
}

#[test]
fn test_empty_body() {
    assert!(matches!(decode_image_bytes(&[]), Err(ImageError::EmptyData)));
}

#[test]
fn test_html_body_is_unsupported() {
    let html = b"<!doctype html><html><body>Not found</body></html>";
    assert!(decode_image_bytes(html).is_err());
}

#[test]
fn test_truncated_png_fails_to_decode() {
    let bytes = encode(ImageFormat::Png, 64, 64);
    let truncated = &bytes[..bytes.len() / 2];
    assert!(matches!(
        decode_image_bytes(truncated),
        Err(ImageError::DecodeFailed(_))
    ));
}
