//! Export module for CapYap
//!
//! Encodes cropped captures to JPEG, PNG or GIF files.

mod gif;
mod still;

pub use gif::GifEncoder;
pub use still::{encode_jpeg, encode_png, png_compression};

use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GIF encoding error: {0}")]
    GifEncode(String),

    #[error("Cannot encode an empty image")]
    EmptyImage,
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    /// Format for a stored settings index, unknown values fall back to JPEG
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => OutputFormat::Png,
            2 => OutputFormat::Gif,
            _ => OutputFormat::Jpeg,
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            OutputFormat::Jpeg => 0,
            OutputFormat::Png => 1,
            OutputFormat::Gif => 2,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Gif => "gif",
        }
    }
}

/// Encoder parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub format: OutputFormat,
    /// 0-100, used by JPEG and GIF
    pub quality: u8,
    /// 0-9, used by PNG
    pub png_compression: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 92,
            png_compression: 6,
        }
    }
}

/// Encode `image` to `path`, replacing any existing file
pub fn encode_to_path(
    image: &RgbaImage,
    settings: &EncodeSettings,
    path: &Path,
) -> ExportResult<PathBuf> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::EmptyImage);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match settings.format {
        OutputFormat::Jpeg => encode_jpeg(image, settings.quality, path)?,
        OutputFormat::Png => encode_png(image, settings.png_compression, path)?,
        OutputFormat::Gif => GifEncoder::new(settings.quality).encode(image, path)?,
    }

    tracing::debug!(
        format = ?settings.format,
        width = image.width(),
        height = image.height(),
        path = %path.display(),
        "encoded capture"
    );
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_index_falls_back_to_jpeg() {
        assert_eq!(OutputFormat::from_index(0), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_index(1), OutputFormat::Png);
        assert_eq!(OutputFormat::from_index(2), OutputFormat::Gif);
        assert_eq!(OutputFormat::from_index(7), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_index(-1), OutputFormat::Jpeg);
    }

    #[test]
    fn extensions() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Gif.extension(), "gif");
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = RgbaImage::new(0, 10);
        let err = encode_to_path(&img, &EncodeSettings::default(), Path::new("unused.jpg"));
        assert!(matches!(err, Err(ExportError::EmptyImage)));
    }
}
