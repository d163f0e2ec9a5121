//! Clipboard output

use arboard::{Clipboard, ImageData};
use image::RgbaImage;
use std::borrow::Cow;

pub fn set_text(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    tracing::debug!("url copied to clipboard");
    Ok(())
}

pub fn set_image(image: &RgbaImage) -> Result<(), arboard::Error> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_image(image_data(image))?;
    tracing::debug!(width = image.width(), height = image.height(), "image copied to clipboard");
    Ok(())
}

fn image_data(image: &RgbaImage) -> ImageData<'_> {
    ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: Cow::Borrowed(image.as_raw()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_data_borrows_rgba_rows() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let data = image_data(&image);

        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.bytes.len(), 3 * 2 * 4);
        assert_eq!(&data.bytes[..4], &[1, 2, 3, 255]);
    }
}
