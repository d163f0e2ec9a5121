//! Crop, encode and prepare a capture for upload

use crate::settings::UploadSettings;
use crate::upload::{UploadOptions, UploadRequest};
use capture::{CaptureError, Rect, Screenshot};
use export::{encode_to_path, ExportError, OutputFormat};
use image::RgbaImage;
use overlay::SelectionOutcome;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Crop failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Encoding failed: {0}")]
    Export(#[from] ExportError),

    #[error("Failed to read encoded capture: {0}")]
    Io(#[from] std::io::Error),
}

/// `<dir>/screenshot-temp.<ext>`, overwritten by every capture
pub fn temp_capture_path(dir: &Path, format: OutputFormat) -> PathBuf {
    dir.join(format!("screenshot-temp.{}", format.extension()))
}

pub struct SavedCapture {
    pub path: PathBuf,
    pub image: RgbaImage,
}

/// Crop `rect` (bitmap-local) out of the screenshot and encode it to the
/// temp file for the configured format
pub fn save_capture(
    screenshot: &Screenshot,
    rect: Rect,
    settings: &UploadSettings,
    dir: &Path,
) -> Result<SavedCapture, PipelineError> {
    let image = screenshot.crop(rect)?;
    let encode = settings.encode_settings();
    let path = encode_to_path(&image, &encode, &temp_capture_path(dir, encode.format))?;

    tracing::info!(?rect, format = ?encode.format, path = %path.display(), "capture saved");
    Ok(SavedCapture { path, image })
}

pub fn upload_options(settings: &UploadSettings) -> UploadOptions {
    UploadOptions {
        quality: settings.compression_quality,
        level: settings.compression_level,
    }
}

/// Build the upload for a finished overlay session; nothing on dismiss
pub fn prepare_upload(
    outcome: SelectionOutcome,
    screenshot: &Screenshot,
    settings: &UploadSettings,
    dir: &Path,
) -> Result<Option<UploadRequest>, PipelineError> {
    let rect = match outcome {
        SelectionOutcome::Region(rect) => rect,
        SelectionOutcome::Cancelled => {
            tracing::debug!("selection dismissed, nothing to upload");
            return Ok(None);
        }
    };

    let saved = save_capture(screenshot, rect, settings, dir)?;
    // The temp file is reused by the next capture, uploads carry their own copy
    let data = std::fs::read(&saved.path)?;
    Ok(Some(UploadRequest {
        ticket: Uuid::new_v4(),
        path: saved.path,
        data,
        options: upload_options(settings),
        image: saved.image,
    }))
}
