//! Decoding, grayscale conversion and cropping of captured screens

use super::types::Rect;
use crate::adb::error::{AdbError, AdbResult};
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, GrayImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Anything that can be turned into a grayscale grid.
#[derive(Debug, Clone, Copy)]
pub enum ImageInput<'a> {
    Path(&'a Path),
    Image(&'a DynamicImage),
    Gray(&'a GrayImage),
}

impl ImageInput<'_> {
    /// Short label used in log lines and `NoMatch` errors.
    pub fn describe(&self) -> String {
        match self {
            ImageInput::Path(p) => p.display().to_string(),
            ImageInput::Image(img) => format!("<image {}x{}>", img.width(), img.height()),
            ImageInput::Gray(img) => format!("<gray {}x{}>", img.width(), img.height()),
        }
    }
}

impl<'a> From<&'a Path> for ImageInput<'a> {
    fn from(p: &'a Path) -> Self {
        ImageInput::Path(p)
    }
}

impl<'a> From<&'a PathBuf> for ImageInput<'a> {
    fn from(p: &'a PathBuf) -> Self {
        ImageInput::Path(p.as_path())
    }
}

impl<'a> From<&'a str> for ImageInput<'a> {
    fn from(p: &'a str) -> Self {
        ImageInput::Path(Path::new(p))
    }
}

impl<'a> From<&'a DynamicImage> for ImageInput<'a> {
    fn from(img: &'a DynamicImage) -> Self {
        ImageInput::Image(img)
    }
}

impl<'a> From<&'a GrayImage> for ImageInput<'a> {
    fn from(img: &'a GrayImage) -> Self {
        ImageInput::Gray(img)
    }
}

/// Decode screencap output (PNG, or anything `image` can sniff).
pub fn decode(bytes: &[u8]) -> AdbResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|source| AdbError::Decode { source })
}

/// Single-channel 8-bit luma. Already-gray input is returned unchanged.
pub fn to_gray<'a>(input: impl Into<ImageInput<'a>>) -> AdbResult<GrayImage> {
    match input.into() {
        ImageInput::Path(path) => {
            let img = image::open(path).map_err(AdbError::from_image_error)?;
            Ok(img.to_luma8())
        }
        ImageInput::Image(img) => Ok(img.to_luma8()),
        ImageInput::Gray(img) => Ok(img.clone()),
    }
}

/// Sub-grid `[y0:y1, x0:x1]`, or a copy of the whole grid when `region` is
/// `None`. Regions reaching past the grid are clipped to it.
pub fn crop_gray(image: &GrayImage, region: Option<&Rect>) -> GrayImage {
    match region {
        Some(r) => image::imageops::crop_imm(image, r.x0, r.y0, r.width(), r.height()).to_image(),
        None => image.clone(),
    }
}

pub fn crop_color(image: &DynamicImage, region: Option<&Rect>) -> DynamicImage {
    match region {
        Some(r) => image.crop_imm(r.x0, r.y0, r.width(), r.height()),
        None => image.clone(),
    }
}

/// PNG-encode and base64 an image, for handing screens to OCR or vision APIs.
pub fn to_base64_png(image: &DynamicImage) -> AdbResult<String> {
    let mut data = Vec::new();
    let mut cursor = Cursor::new(&mut data);
    let encoder = PngEncoder::new(&mut cursor);
    image
        .write_with_encoder(encoder)
        .map_err(|source| AdbError::Encode { source })?;
    Ok(base64::engine::general_purpose::STANDARD.encode(&data))
}
