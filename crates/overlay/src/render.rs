//! GDI rendering for overlay

use crate::magnifier::Loupe;
use crate::selection::{SelectionTracker, SnapMode};
use crate::toolbar::Toolbar;
use crate::{OverlayError, OverlayResult};
use capture::{Rect, Screenshot};
use windows::Win32::Foundation::{COLORREF, HWND, RECT, SIZE};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreatePen, CreateSolidBrush,
    DeleteDC, DeleteObject, DrawTextW, EndPaint, FillRect, GetDC, GetStockObject,
    GetTextExtentPoint32W, LineTo, MoveToEx, Rectangle, ReleaseDC, RoundRect, SelectObject,
    SetBkMode, SetDIBits, SetStretchBltMode, SetTextColor, StretchBlt, TextOutW, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, COLORONCOLOR, DIB_RGB_COLORS, DT_CENTER, DT_SINGLELINE,
    DT_VCENTER, HBITMAP, HDC, HGDIOBJ, NULL_BRUSH, PAINTSTRUCT, PS_DASH, PS_SOLID, SRCCOPY,
    TRANSPARENT,
};

/// Opacity of the black layer over unselected pixels
const DIM_ALPHA: u8 = 120;
const LABEL_PADDING: i32 = 4;
const HINT_BAR_HEIGHT: i32 = 32;

const WHITE: COLORREF = COLORREF(0x00FFFFFF);
const LABEL_BACKGROUND: COLORREF = COLORREF(0x00202020);
const BAR_BACKGROUND: COLORREF = COLORREF(0x00333333);
const TOOLBAR_BACKGROUND: COLORREF = COLORREF(0x00282828);
const TOOLBAR_BORDER: COLORREF = COLORREF(0x00434343);
const BUTTON_ACTIVE: COLORREF = COLORREF(0x00FF4678);
const TOOLBAR_CORNER: i32 = 12;

/// Memory DC with one bitmap selected
struct Surface {
    dc: HDC,
    bitmap: HBITMAP,
    previous: HGDIOBJ,
}

impl Surface {
    unsafe fn new(reference: HDC, width: i32, height: i32) -> OverlayResult<Self> {
        let dc = CreateCompatibleDC(reference);
        if dc.is_invalid() {
            return Err(OverlayError::Renderer("CreateCompatibleDC failed".into()));
        }

        let bitmap = CreateCompatibleBitmap(reference, width, height);
        if bitmap.is_invalid() {
            let _ = DeleteDC(dc);
            return Err(OverlayError::Renderer(format!(
                "CreateCompatibleBitmap {}x{} failed",
                width, height
            )));
        }

        let previous = SelectObject(dc, bitmap);
        Ok(Self { dc, bitmap, previous })
    }

    /// Upload top-down BGRA pixels
    unsafe fn load(&self, pixels: &[u8], width: i32, height: i32) -> OverlayResult<()> {
        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height, // Top-down
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            bmiColors: [Default::default()],
        };

        let copied = SetDIBits(
            self.dc,
            self.bitmap,
            0,
            height as u32,
            pixels.as_ptr() as *const _,
            &bmi,
            DIB_RGB_COLORS,
        );

        if copied != height {
            return Err(OverlayError::Renderer(format!(
                "SetDIBits copied {} of {} scan lines",
                copied, height
            )));
        }
        Ok(())
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc, self.previous);
            let _ = DeleteObject(self.bitmap);
            let _ = DeleteDC(self.dc);
        }
    }
}

/// Overlay renderer
pub struct OverlayRenderer {
    width: i32,
    height: i32,
    bright: Surface,
    dimmed: Surface,
}

impl OverlayRenderer {
    /// Upload the screenshot and its darkened copy into GDI bitmaps
    pub fn new(screenshot: &Screenshot) -> OverlayResult<Self> {
        let width = screenshot.width as i32;
        let height = screenshot.height as i32;

        unsafe {
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(OverlayError::Renderer("Failed to get screen DC".into()));
            }

            let surfaces = Surface::new(screen_dc, width, height).and_then(|bright| {
                let dimmed = Surface::new(screen_dc, width, height)?;
                Ok((bright, dimmed))
            });
            ReleaseDC(None, screen_dc);
            let (bright, dimmed) = surfaces?;

            bright.load(&screenshot.data, width, height)?;
            dimmed.load(&screenshot.dimmed(DIM_ALPHA), width, height)?;

            Ok(Self {
                width,
                height,
                bright,
                dimmed,
            })
        }
    }

    /// Paint one frame; everything is composed off-screen first
    pub fn render(&self, hwnd: HWND, tracker: &SelectionTracker) {
        unsafe {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);

            match Surface::new(hdc, self.width, self.height) {
                Ok(back) => {
                    self.compose(back.dc, tracker);
                    let _ = BitBlt(hdc, 0, 0, self.width, self.height, back.dc, 0, 0, SRCCOPY);
                }
                Err(e) => tracing::warn!("overlay back buffer unavailable: {e}"),
            }

            let _ = EndPaint(hwnd, &ps);
        }
    }

    unsafe fn compose(&self, hdc: HDC, tracker: &SelectionTracker) {
        let _ = BitBlt(hdc, 0, 0, self.width, self.height, self.dimmed.dc, 0, 0, SRCCOPY);

        if let Some(rect) = tracker.selection_local() {
            let _ = BitBlt(
                hdc,
                rect.x,
                rect.y,
                rect.width as i32,
                rect.height as i32,
                self.bright.dc,
                rect.x,
                rect.y,
                SRCCOPY,
            );
            self.draw_selection(hdc, &rect);
        }

        let cursor = tracker.origin().to_local(tracker.cursor());
        let global = tracker.cursor();
        self.draw_label(
            hdc,
            &format!("{}, {}", global.x, global.y),
            cursor.x + 16,
            cursor.y - 24,
        );

        if tracker.magnifier() {
            self.draw_loupe(hdc, &Loupe::around(cursor, self.width as u32, self.height as u32));
        }

        if let Some(toolbar) = tracker.toolbar() {
            self.draw_toolbar(hdc, &toolbar, tracker.mode());
        }

        self.draw_hint_bar(hdc, tracker.mode());
    }

    /// Rect/Monitor/Window buttons, the active mode highlighted
    unsafe fn draw_toolbar(&self, hdc: HDC, toolbar: &Toolbar, active: SnapMode) {
        let pen = CreatePen(PS_SOLID, 1, TOOLBAR_BORDER);
        let brush = CreateSolidBrush(TOOLBAR_BACKGROUND);
        let old_pen = SelectObject(hdc, pen);
        let old_brush = SelectObject(hdc, brush);

        let frame = toolbar.frame;
        let _ = RoundRect(
            hdc,
            frame.x,
            frame.y,
            frame.right(),
            frame.bottom(),
            TOOLBAR_CORNER,
            TOOLBAR_CORNER,
        );

        SelectObject(hdc, old_brush);
        SelectObject(hdc, old_pen);
        let _ = DeleteObject(brush);
        let _ = DeleteObject(pen);

        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, WHITE);

        for (mode, rect) in toolbar.buttons {
            let mut area = RECT {
                left: rect.x,
                top: rect.y,
                right: rect.right(),
                bottom: rect.bottom(),
            };

            if mode == active {
                let fill = CreateSolidBrush(BUTTON_ACTIVE);
                FillRect(hdc, &area, fill);
                let _ = DeleteObject(fill);
            }

            let mut text: Vec<u16> = mode.label().encode_utf16().collect();
            DrawTextW(
                hdc,
                &mut text,
                &mut area,
                DT_CENTER | DT_VCENTER | DT_SINGLELINE,
            );
        }
    }

    unsafe fn draw_selection(&self, hdc: HDC, rect: &Rect) {
        // Dashes only render with a 1px pen
        let pen = CreatePen(PS_DASH, 1, WHITE);
        let old_pen = SelectObject(hdc, pen);
        let old_brush = SelectObject(hdc, GetStockObject(NULL_BRUSH));
        SetBkMode(hdc, TRANSPARENT);

        let _ = Rectangle(hdc, rect.x, rect.y, rect.right(), rect.bottom());

        SelectObject(hdc, old_brush);
        SelectObject(hdc, old_pen);
        let _ = DeleteObject(pen);

        let label = format!("{}x{}", rect.width, rect.height);
        let label_y = if rect.y >= 28 {
            rect.y - 24
        } else {
            rect.bottom() + LABEL_PADDING
        };
        self.draw_label(hdc, &label, rect.x, label_y);
    }

    /// White text on a dark box
    unsafe fn draw_label(&self, hdc: HDC, text: &str, x: i32, y: i32) {
        let wide: Vec<u16> = text.encode_utf16().collect();

        let mut extent = SIZE::default();
        let _ = GetTextExtentPoint32W(hdc, &wide, &mut extent);

        let background = RECT {
            left: x,
            top: y,
            right: x + extent.cx + LABEL_PADDING * 2,
            bottom: y + extent.cy + LABEL_PADDING * 2,
        };
        let brush = CreateSolidBrush(LABEL_BACKGROUND);
        FillRect(hdc, &background, brush);
        let _ = DeleteObject(brush);

        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, WHITE);
        let _ = TextOutW(hdc, x + LABEL_PADDING, y + LABEL_PADDING, &wide);
    }

    unsafe fn draw_loupe(&self, hdc: HDC, loupe: &Loupe) {
        SetStretchBltMode(hdc, COLORONCOLOR);
        let _ = StretchBlt(
            hdc,
            loupe.dest.x,
            loupe.dest.y,
            loupe.dest.width as i32,
            loupe.dest.height as i32,
            self.bright.dc,
            loupe.source.x,
            loupe.source.y,
            loupe.source.width as i32,
            loupe.source.height as i32,
            SRCCOPY,
        );

        let pen = CreatePen(PS_SOLID, 1, WHITE);
        let old_pen = SelectObject(hdc, pen);
        let old_brush = SelectObject(hdc, GetStockObject(NULL_BRUSH));

        let _ = Rectangle(
            hdc,
            loupe.dest.x,
            loupe.dest.y,
            loupe.dest.right(),
            loupe.dest.bottom(),
        );

        let center = loupe.center();
        let _ = MoveToEx(hdc, loupe.dest.x, center.y, None);
        let _ = LineTo(hdc, loupe.dest.right(), center.y);
        let _ = MoveToEx(hdc, center.x, loupe.dest.y, None);
        let _ = LineTo(hdc, center.x, loupe.dest.bottom());

        SelectObject(hdc, old_brush);
        SelectObject(hdc, old_pen);
        let _ = DeleteObject(pen);
    }

    unsafe fn draw_hint_bar(&self, hdc: HDC, mode: SnapMode) {
        let bar_top = self.height - HINT_BAR_HEIGHT;

        let brush = CreateSolidBrush(BAR_BACKGROUND);
        let bar_rect = RECT {
            left: 0,
            top: bar_top,
            right: self.width,
            bottom: self.height,
        };
        FillRect(hdc, &bar_rect, brush);
        let _ = DeleteObject(brush);

        let text = match mode {
            SnapMode::Free => {
                "Drag to select | Hold Ctrl: monitor | Hold Shift: window | Hold Alt: magnifier | Esc: cancel"
            }
            SnapMode::Monitor => "Click to capture this monitor | Esc: cancel",
            SnapMode::Window => "Click to capture this window | Esc: cancel",
        };
        let wide: Vec<u16> = text.encode_utf16().collect();

        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, WHITE);
        let _ = TextOutW(hdc, 10, bar_top + 8, &wide);
    }
}
