//! GIF export using gifski

use crate::{ExportError, ExportResult};
use crossbeam_channel::{bounded, Receiver, Sender};
use gifski::{Collector, Settings, Writer};
use image::RgbaImage;
use imgref::ImgVec;
use rgb::RGBA8;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread;

/// Convert image::RgbaImage to imgref::ImgVec<RGBA8>
fn rgba_image_to_imgvec(img: &RgbaImage) -> ImgVec<RGBA8> {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let pixels: Vec<RGBA8> = img
        .as_raw()
        .chunks_exact(4)
        .map(|chunk| RGBA8::new(chunk[0], chunk[1], chunk[2], chunk[3]))
        .collect();

    ImgVec::new(pixels, width, height)
}

/// Still-image GIF encoder.
///
/// gifski needs a collector and a writer running concurrently, even for a
/// single frame.
pub struct GifEncoder {
    quality: u8,
}

impl GifEncoder {
    /// `quality` is clamped to gifski's 1-100 range
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn encode(&self, image: &RgbaImage, output_path: &Path) -> ExportResult<()> {
        let settings = Settings {
            width: Some(image.width()),
            height: Some(image.height()),
            quality: self.quality,
            fast: false,
            repeat: gifski::Repeat::Infinite,
        };

        let (collector, writer) =
            gifski::new(settings).map_err(|e| ExportError::GifEncode(e.to_string()))?;

        let (frame_tx, frame_rx): (Sender<ImgVec<RGBA8>>, Receiver<ImgVec<RGBA8>>) = bounded(1);

        let collector_handle = thread::spawn(move || Self::collector_thread(collector, frame_rx));

        let path: PathBuf = output_path.to_path_buf();
        let writer_handle = thread::spawn(move || Self::writer_thread(writer, &path));

        frame_tx
            .send(rgba_image_to_imgvec(image))
            .map_err(|_| ExportError::GifEncode("Failed to send frame".to_string()))?;
        // Closing the channel ends the collector
        drop(frame_tx);

        collector_handle
            .join()
            .map_err(|_| ExportError::GifEncode("Collector thread panicked".to_string()))??;

        writer_handle
            .join()
            .map_err(|_| ExportError::GifEncode("Writer thread panicked".to_string()))??;

        Ok(())
    }

    fn collector_thread(collector: Collector, frame_rx: Receiver<ImgVec<RGBA8>>) -> ExportResult<()> {
        for (index, frame) in frame_rx.into_iter().enumerate() {
            collector
                .add_frame_rgba(index, frame, index as f64)
                .map_err(|e| ExportError::GifEncode(e.to_string()))?;
        }
        Ok(())
    }

    fn writer_thread(writer: Writer, output_path: &Path) -> ExportResult<()> {
        let file = BufWriter::new(File::create(output_path)?);
        writer
            .write(file, &mut gifski::progress::NoProgress {})
            .map_err(|e| ExportError::GifEncode(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_is_clamped() {
        assert_eq!(GifEncoder::new(0).quality(), 1);
        assert_eq!(GifEncoder::new(70).quality(), 70);
        assert_eq!(GifEncoder::new(250).quality(), 100);
    }

    #[test]
    fn imgvec_keeps_layout() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgba([1, 2, 3, 4]));

        let converted = rgba_image_to_imgvec(&img);
        assert_eq!(converted.width(), 3);
        assert_eq!(converted.height(), 2);
        assert_eq!(converted.buf()[5], RGBA8::new(1, 2, 3, 4));
    }
}
