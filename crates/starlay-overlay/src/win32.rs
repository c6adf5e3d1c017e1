use std::collections::HashMap;
use std::process::Child;
use std::sync::Once;

use starlay_core::{OverlayBackend, OverlayError};
use starlay_types::{Color, Rect, WindowCommand, WindowId};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CLEARTYPE_QUALITY, CLIP_DEFAULT_PRECIS, CombineRgn, CreateFontW, CreateRectRgn,
    CreateSolidBrush, DEFAULT_CHARSET, DT_CENTER, DT_LEFT, DT_NOPREFIX, DT_SINGLELINE, DT_TOP,
    DT_VCENTER, DT_WORDBREAK, DeleteObject, DrawTextW, EndPaint, FW_NORMAL, FillRect, HDC,
    InvalidateRect, OUT_DEFAULT_PRECIS, PAINTSTRUCT, RGN_DIFF, SelectObject, SetBkMode,
    SetTextColor, SetWindowRgn, TRANSPARENT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GWLP_USERDATA, GetClientRect,
    GetWindowLongPtrW, LWA_ALPHA, MSG, PM_REMOVE, PeekMessageW, RegisterClassW,
    SW_SHOWNOACTIVATE, SetLayeredWindowAttributes, SetWindowDisplayAffinity, SetWindowLongPtrW,
    ShowWindow, TranslateMessage, WDA_EXCLUDEFROMCAPTURE, WM_ERASEBKGND, WM_PAINT, WNDCLASSW,
    WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};
use windows::core::{PCWSTR, w};

use crate::player::{self, PlaybackTarget, PlayerCommand};

const CLASS_NAME: PCWSTR = w!("StarlayOverlay");
/// Horizontal padding around wrapped overlay text
const TEXT_MARGIN: i32 = 8;

#[derive(Clone, Copy)]
enum Layout {
    Wrapped,
    Centered,
}

/// Everything WM_PAINT needs, owned by the window through GWLP_USERDATA
struct PaintState {
    background: COLORREF,
    text: Vec<u16>,
    font_px: i32,
    font_family: Vec<u16>,
    layout: Layout,
}

struct NativeSurface {
    hwnd: HWND,
    state: *mut PaintState,
    player: Option<Child>,
}

/// Layered, topmost, click-through windows hidden from screen capture
pub struct Win32Backend {
    surfaces: HashMap<WindowId, NativeSurface>,
    font_family: Vec<u16>,
    player: PlayerCommand,
}

impl Win32Backend {
    pub fn new(font_family: &str, player: PlayerCommand) -> Self {
        Self {
            surfaces: HashMap::new(),
            font_family: wide(font_family),
            player,
        }
    }

    fn create(&mut self, id: WindowId, rect: &Rect, state: PaintState) -> Result<HWND, OverlayError> {
        if self.surfaces.contains_key(&id) {
            self.destroy(id);
        }

        let (hwnd, state) = create_window(rect, state).map_err(|reason| OverlayError::Create { id, reason })?;
        self.surfaces.insert(
            id,
            NativeSurface {
                hwnd,
                state,
                player: None,
            },
        );
        Ok(hwnd)
    }

    fn destroy(&mut self, id: WindowId) {
        let Some(surface) = self.surfaces.remove(&id) else {
            return;
        };
        if let Some(child) = surface.player {
            player::stop(child);
        }
        unsafe {
            SetWindowLongPtrW(surface.hwnd, GWLP_USERDATA, 0);
            if let Err(e) = DestroyWindow(surface.hwnd) {
                tracing::warn!("DestroyWindow({id}) failed: {e}");
            }
            drop(Box::from_raw(surface.state));
        }
        tracing::debug!("Destroyed {id}");
    }

    fn paint_state(&self, background: Color, text: &str, font_pt: u32, layout: Layout) -> PaintState {
        PaintState {
            background: colorref(background),
            text: text.encode_utf16().collect(),
            font_px: font_pt as i32,
            font_family: self.font_family.clone(),
            layout,
        }
    }
}

impl OverlayBackend for Win32Backend {
    fn apply(&mut self, command: &WindowCommand) -> Result<(), OverlayError> {
        match command {
            WindowCommand::CreateOverlay {
                id,
                rect,
                background,
                holes,
                font_pt,
            } => {
                let state = self.paint_state(*background, "", *font_pt, Layout::Wrapped);
                let hwnd = self.create(*id, rect, state)?;
                punch_holes(hwnd, rect, holes);
            }
            WindowCommand::CreatePatch {
                id,
                rect,
                color,
                text,
                font_pt,
            } => {
                let state = self.paint_state(*color, text, *font_pt, Layout::Centered);
                self.create(*id, rect, state)?;
            }
            WindowCommand::SetText { id, text } => {
                let surface = self
                    .surfaces
                    .get(id)
                    .ok_or(OverlayError::UnknownSurface(*id))?;
                unsafe {
                    (*surface.state).text = text.encode_utf16().collect();
                    let _ = InvalidateRect(Some(surface.hwnd), None, true);
                }
            }
            WindowCommand::ShowVideo { id, rect, path } => {
                let state = self.paint_state(Color::BLACK, "", 1, Layout::Centered);
                let hwnd = self.create(*id, rect, state)?;
                let target = PlaybackTarget {
                    hwnd: hwnd.0 as isize,
                    path,
                    rect: *rect,
                };
                match self.player.spawn(&target) {
                    Ok(child) => {
                        if let Some(surface) = self.surfaces.get_mut(id) {
                            surface.player = Some(child);
                        }
                    }
                    Err(e) => {
                        self.destroy(*id);
                        return Err(e);
                    }
                }
            }
            WindowCommand::Destroy { id } => self.destroy(*id),
        }
        Ok(())
    }

    fn pump(&mut self) {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            }
        }

        for (id, surface) in &mut self.surfaces {
            let exited = match surface.player.as_mut().map(Child::try_wait) {
                Some(Ok(Some(status))) => {
                    tracing::debug!("Video player for {id} exited with {status}");
                    true
                }
                _ => false,
            };
            if exited {
                surface.player = None;
            }
        }
    }

    fn destroy_all(&mut self) {
        let ids: Vec<_> = self.surfaces.keys().copied().collect();
        for id in ids {
            self.destroy(id);
        }
    }

    fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }
}

impl Drop for Win32Backend {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

fn wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

fn colorref(color: Color) -> COLORREF {
    COLORREF(color.r as u32 | (color.g as u32) << 8 | (color.b as u32) << 16)
}

fn create_window(rect: &Rect, state: PaintState) -> Result<(HWND, *mut PaintState), String> {
    static REGISTER_CLASS: Once = Once::new();
    let instance = unsafe { GetModuleHandleW(None) }.map_err(|e| e.to_string())?;

    REGISTER_CLASS.call_once(|| unsafe {
        let wc = WNDCLASSW {
            hInstance: instance.into(),
            lpszClassName: CLASS_NAME,
            lpfnWndProc: Some(overlay_wndproc),
            ..Default::default()
        };
        let _ = RegisterClassW(&wc);
    });

    let hwnd = unsafe {
        CreateWindowExW(
            WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW | WS_EX_TRANSPARENT | WS_EX_NOACTIVATE,
            CLASS_NAME,
            w!(""),
            WS_POPUP,
            rect.x,
            rect.y,
            rect.width as i32,
            rect.height as i32,
            None,
            None,
            Some(instance.into()),
            None,
        )
    }
    .map_err(|e| e.to_string())?;

    let state = Box::into_raw(Box::new(state));
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, state as isize);
        let _ = SetLayeredWindowAttributes(hwnd, COLORREF(0), 255, LWA_ALPHA);
        if let Err(e) = SetWindowDisplayAffinity(hwnd, WDA_EXCLUDEFROMCAPTURE) {
            tracing::warn!("Could not exclude overlay from capture: {e}");
        }
        let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
    }

    Ok((hwnd, state))
}

/// Cut overlay-relative `holes` out of the window's visible region
fn punch_holes(hwnd: HWND, rect: &Rect, holes: &[Rect]) {
    if holes.is_empty() {
        return;
    }

    unsafe {
        let region = CreateRectRgn(0, 0, rect.width as i32, rect.height as i32);
        for hole in holes {
            let cut = CreateRectRgn(
                hole.x,
                hole.y,
                hole.x + hole.width as i32,
                hole.y + hole.height as i32,
            );
            CombineRgn(Some(region), Some(region), Some(cut), RGN_DIFF);
            let _ = DeleteObject(cut.into());
        }
        // The window owns the region from here on
        SetWindowRgn(hwnd, Some(region), true);
    }
}

unsafe extern "system" fn overlay_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            unsafe {
                let hdc = BeginPaint(hwnd, &mut ps);
                let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const PaintState;
                if let Some(state) = state.as_ref() {
                    paint(hwnd, hdc, state);
                }
                let _ = EndPaint(hwnd, &ps);
            }
            LRESULT(0)
        }
        WM_ERASEBKGND => LRESULT(1),
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

unsafe fn paint(hwnd: HWND, hdc: HDC, state: &PaintState) {
    let mut client = RECT::default();
    unsafe {
        let _ = GetClientRect(hwnd, &mut client);
        let brush = CreateSolidBrush(state.background);
        FillRect(hdc, &client, brush);
        let _ = DeleteObject(brush.into());

        if state.text.is_empty() {
            return;
        }

        let font = CreateFontW(
            -state.font_px,
            0,
            0,
            0,
            FW_NORMAL.0 as i32,
            0,
            0,
            0,
            DEFAULT_CHARSET,
            OUT_DEFAULT_PRECIS,
            CLIP_DEFAULT_PRECIS,
            CLEARTYPE_QUALITY,
            0,
            PCWSTR(state.font_family.as_ptr()),
        );
        let previous = SelectObject(hdc, font.into());
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, COLORREF(0));

        let (mut bounds, format) = match state.layout {
            Layout::Wrapped => (
                RECT {
                    left: client.left + TEXT_MARGIN,
                    top: client.top,
                    right: client.right - TEXT_MARGIN,
                    bottom: client.bottom,
                },
                DT_LEFT | DT_TOP | DT_WORDBREAK | DT_NOPREFIX,
            ),
            Layout::Centered => (client, DT_CENTER | DT_VCENTER | DT_SINGLELINE | DT_NOPREFIX),
        };
        let mut text = state.text.clone();
        DrawTextW(hdc, &mut text, &mut bounds, format);

        SelectObject(hdc, previous);
        let _ = DeleteObject(font.into());
    }
}
