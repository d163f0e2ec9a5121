//! JPEG and PNG encoding

use crate::ExportResult;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JPEG has no alpha channel, so the image is flattened to RGB first
pub fn encode_jpeg(image: &RgbaImage, quality: u8, path: &Path) -> ExportResult<()> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();

    let mut writer = BufWriter::new(File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
    writer.flush()?;

    Ok(())
}

pub fn encode_png(image: &RgbaImage, level: u8, path: &Path) -> ExportResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(
        &mut writer,
        png_compression(level),
        FilterType::Adaptive,
    );
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    writer.flush()?;

    Ok(())
}

/// Map a 0-9 compression level onto the encoder presets
pub fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}
