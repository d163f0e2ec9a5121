//! Virtual desktop screenshot

use crate::bounds::{Bounds, Point};
use crate::{CaptureError, CaptureResult, Rect};
use image::{ImageBuffer, RgbaImage};

/// Full virtual-desktop bitmap, top-down BGRA
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub virtual_left: i32,
    pub virtual_top: i32,
}

impl Screenshot {
    pub fn new(data: Vec<u8>, width: u32, height: u32, origin: Point) -> CaptureResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(CaptureError::BufferSize { width, height });
        }

        Ok(Self {
            data,
            width,
            height,
            virtual_left: origin.x,
            virtual_top: origin.y,
        })
    }

    pub fn origin(&self) -> Point {
        Point::new(self.virtual_left, self.virtual_top)
    }

    /// Area covered on the virtual desktop
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.virtual_left, self.virtual_top, self.width, self.height)
    }

    /// Extract `rect` (screenshot-local) as an RGBA image.
    ///
    /// The rectangle is clipped to the bitmap; a rectangle that misses it
    /// entirely is an error.
    pub fn crop(&self, rect: Rect) -> CaptureResult<RgbaImage> {
        let full = Rect::new(0, 0, self.width, self.height);
        let clipped = full
            .intersection(&rect)
            .ok_or(CaptureError::InvalidRegion(rect))?;

        let src_x = clipped.x as usize;
        let src_y = clipped.y as usize;
        let crop_width = clipped.width as usize;
        let stride = self.width as usize * 4;

        let mut cropped = Vec::with_capacity(crop_width * clipped.height as usize * 4);
        for row in src_y..src_y + clipped.height as usize {
            let offset = row * stride + src_x * 4;
            for px in self.data[offset..offset + crop_width * 4].chunks_exact(4) {
                cropped.extend_from_slice(&[px[2], px[1], px[0], 0xFF]);
            }
        }

        ImageBuffer::from_raw(clipped.width, clipped.height, cropped)
            .ok_or(CaptureError::InvalidRegion(rect))
    }

    /// Copy of the pixels blended towards black, `alpha` = opacity of the black layer
    pub fn dimmed(&self, alpha: u8) -> Vec<u8> {
        let keep = 255 - alpha as u32;
        self.data
            .chunks_exact(4)
            .flat_map(|px| {
                [
                    (px[0] as u32 * keep / 255) as u8,
                    (px[1] as u32 * keep / 255) as u8,
                    (px[2] as u32 * keep / 255) as u8,
                    px[3],
                ]
            })
            .collect()
    }
}

#[cfg(windows)]
pub use gdi::capture_all_monitors;

#[cfg(windows)]
mod gdi {
    use super::Screenshot;
    use crate::desktop::Desktop;
    use crate::{CaptureError, CaptureResult};
    use windows::Win32::Graphics::Gdi::{
        BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
        GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
        DIB_RGB_COLORS, HDC, SRCCOPY,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        DrawIcon, GetCursorInfo, CURSORINFO, CURSOR_SHOWING, HICON,
    };

    /// Capture every monitor into one bitmap spanning the virtual desktop.
    ///
    /// Must run before any overlay is shown, otherwise the overlay ends up
    /// in the capture.
    pub fn capture_all_monitors(
        desktop: &dyn Desktop,
        capture_cursor: bool,
    ) -> CaptureResult<Screenshot> {
        let bounds = desktop.full_virtual_bounds();
        if bounds.is_empty() || bounds.width() == 0 || bounds.height() == 0 {
            return Err(CaptureError::NoDisplays);
        }

        let width = bounds.width() as i32;
        let height = bounds.height() as i32;

        unsafe {
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(CaptureError::Gdi("Failed to get screen DC".into()));
            }

            let mem_dc = CreateCompatibleDC(screen_dc);
            let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
            if mem_dc.is_invalid() || bitmap.is_invalid() {
                if !bitmap.is_invalid() {
                    let _ = DeleteObject(bitmap);
                }
                if !mem_dc.is_invalid() {
                    let _ = DeleteDC(mem_dc);
                }
                ReleaseDC(None, screen_dc);
                return Err(CaptureError::Gdi(format!(
                    "Failed to create a {}x{} bitmap",
                    width, height
                )));
            }
            let old_bitmap = SelectObject(mem_dc, bitmap);

            let blit = BitBlt(
                mem_dc,
                0,
                0,
                width,
                height,
                screen_dc,
                bounds.left,
                bounds.top,
                SRCCOPY,
            );

            if blit.is_ok() && capture_cursor {
                draw_cursor(mem_dc, bounds.left, bounds.top);
            }

            let mut bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // Top-down DIB
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                bmiColors: [Default::default()],
            };

            let mut data = vec![0u8; width as usize * height as usize * 4];

            // The bitmap must not be selected into a DC while reading its bits
            SelectObject(mem_dc, old_bitmap);
            let scan_lines = if blit.is_ok() {
                GetDIBits(
                    mem_dc,
                    bitmap,
                    0,
                    height as u32,
                    Some(data.as_mut_ptr() as *mut _),
                    &mut bmi,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            ReleaseDC(None, screen_dc);

            blit?;
            if scan_lines != height {
                return Err(CaptureError::Gdi(format!(
                    "GetDIBits copied {} of {} scan lines",
                    scan_lines, height
                )));
            }

            tracing::debug!(width, height, left = bounds.left, top = bounds.top, "captured virtual desktop");
            Screenshot::new(data, width as u32, height as u32, bounds.origin())
        }
    }

    unsafe fn draw_cursor(hdc: HDC, virtual_left: i32, virtual_top: i32) {
        let mut info = CURSORINFO {
            cbSize: std::mem::size_of::<CURSORINFO>() as u32,
            ..Default::default()
        };

        if GetCursorInfo(&mut info).is_err() || info.flags.0 & CURSOR_SHOWING.0 == 0 {
            return;
        }

        let x = info.ptScreenPos.x - virtual_left;
        let y = info.ptScreenPos.y - virtual_top;
        if let Err(e) = DrawIcon(hdc, x, y, HICON(info.hCursor.0)) {
            tracing::warn!("failed to draw cursor: {e}");
        }
    }
}
