// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for PaddleOCR

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Height of classifier and recognition inputs
pub const LINE_INPUT_HEIGHT: u32 = 48;

/// Fixed width of the orientation classifier input
pub const CLS_INPUT_WIDTH: u32 = 192;

/// Maximum width for recognition model input
pub const REC_MAX_WIDTH: u32 = 960;

/// Mean values for detection normalization (ImageNet)
pub const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for detection normalization (ImageNet)
pub const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Classifier and recognizer normalize to [-1, 1]
pub const LINE_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const LINE_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Crops with height/width at or above this ratio are treated as vertical text
pub const VERTICAL_ASPECT_RATIO: f32 = 1.5;

/// Write `rgb` into `tensor[0, c, y, x]` as `(pixel/255 - mean) / std`
fn fill_normalized(tensor: &mut Array4<f32>, rgb: &RgbImage, mean: [f32; 3], std: [f32; 3]) {
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - mean[c]) / std[c];
        }
    }
}

/// Preprocess an image for OCR detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to `target_size`
/// 2. Pad to square with gray (128) background
/// 3. Normalize with ImageNet mean/std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detection(image: &DynamicImage, target_size: u32) -> Array4<f32> {
    let resized = resize_with_padding(image, target_size);
    let rgb = resized.to_rgb8();

    let mut tensor = Array4::zeros((1, 3, target_size as usize, target_size as usize));
    fill_normalized(&mut tensor, &rgb, DET_MEAN, DET_STD);
    tensor
}

/// Preprocess a text line crop for the orientation classifier
///
/// Resized to height 48 keeping aspect ratio (width capped at 192), then
/// right-padded with zeros to a fixed [1, 3, 48, 192] tensor.
pub fn preprocess_for_classification(image: &DynamicImage) -> Array4<f32> {
    let width = scaled_line_width(image, CLS_INPUT_WIDTH);
    let resized = image.resize_exact(
        width,
        LINE_INPUT_HEIGHT,
        image::imageops::FilterType::Triangle,
    );

    let mut tensor = Array4::zeros((
        1,
        3,
        LINE_INPUT_HEIGHT as usize,
        CLS_INPUT_WIDTH as usize,
    ));
    fill_normalized(&mut tensor, &resized.to_rgb8(), LINE_MEAN, LINE_STD);
    tensor
}

/// Preprocess a text line crop for recognition
///
/// Resized to height 48 with dynamic width (aspect ratio preserved, capped at
/// `REC_MAX_WIDTH`, minimum 4). No padding.
pub fn preprocess_for_recognition(image: &DynamicImage) -> Array4<f32> {
    let width = scaled_line_width(image, REC_MAX_WIDTH);
    let resized = image.resize_exact(
        width,
        LINE_INPUT_HEIGHT,
        image::imageops::FilterType::Lanczos3,
    );

    let mut tensor = Array4::zeros((1, 3, LINE_INPUT_HEIGHT as usize, width as usize));
    fill_normalized(&mut tensor, &resized.to_rgb8(), LINE_MEAN, LINE_STD);
    tensor
}

fn scaled_line_width(image: &DynamicImage, max_width: u32) -> u32 {
    let (orig_w, orig_h) = image.dimensions();
    if orig_h == 0 {
        return 4;
    }
    let scale = LINE_INPUT_HEIGHT as f32 / orig_h as f32;
    ((orig_w as f32 * scale).round() as u32).clamp(4, max_width)
}

/// Resize image with aspect ratio preservation and padding
///
/// The image is scaled to fit within target_size x target_size
/// while preserving aspect ratio, then centered on a gray (128) canvas.
pub fn resize_with_padding(image: &DynamicImage, target_size: u32) -> DynamicImage {
    let info = PreprocessInfo::new(image, target_size);
    let mut output = RgbImage::from_pixel(target_size, target_size, Rgb([128, 128, 128]));

    if info.original_width == 0 || info.original_height == 0 {
        return DynamicImage::ImageRgb8(output);
    }

    let resized = image.resize_exact(
        info.scaled_width,
        info.scaled_height,
        image::imageops::FilterType::Lanczos3,
    );
    image::imageops::overlay(
        &mut output,
        &resized.to_rgb8(),
        info.offset_x as i64,
        info.offset_y as i64,
    );

    DynamicImage::ImageRgb8(output)
}

/// Crop the axis-aligned bounds of `polygon` from `image`
///
/// Tall crops are rotated 90° counter-clockwise so text runs horizontally.
/// Returns `None` when the clamped region is empty.
pub fn crop_text_region(image: &DynamicImage, polygon: &[[f32; 2]; 4]) -> Option<DynamicImage> {
    let (width, height) = image.dimensions();

    let min_x = polygon.iter().map(|p| p[0]).fold(f32::INFINITY, f32::min);
    let max_x = polygon.iter().map(|p| p[0]).fold(f32::NEG_INFINITY, f32::max);
    let min_y = polygon.iter().map(|p| p[1]).fold(f32::INFINITY, f32::min);
    let max_y = polygon.iter().map(|p| p[1]).fold(f32::NEG_INFINITY, f32::max);

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(width);
    let y1 = (max_y.ceil().max(0.0) as u32).min(height);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let crop = image.crop_imm(x0, y0, x1 - x0, y1 - y0);
    if crop.height() as f32 / crop.width() as f32 >= VERTICAL_ASPECT_RATIO {
        Some(crop.rotate270())
    } else {
        Some(crop)
    }
}

/// Scaling factor and offsets used during detection preprocessing
///
/// Maps detection results back to original image coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PreprocessInfo {
    /// Scale factor applied
    pub scale: f32,
    /// Width after scaling, before padding
    pub scaled_width: u32,
    /// Height after scaling, before padding
    pub scaled_height: u32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl PreprocessInfo {
    /// Calculate preprocessing info for an image
    pub fn new(image: &DynamicImage, target_size: u32) -> Self {
        let (orig_w, orig_h) = image.dimensions();

        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                scaled_width: 0,
                scaled_height: 0,
                offset_x: 0,
                offset_y: 0,
                original_width: orig_w,
                original_height: orig_h,
            };
        }

        let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
        let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
        let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            scaled_width: new_w,
            scaled_height: new_h,
            offset_x: (target_size - new_w) / 2,
            offset_y: (target_size - new_h) / 2,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Map a coordinate from preprocessed space back to original image space,
    /// clamped to the image bounds
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}
