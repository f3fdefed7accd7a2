//! Host window for the cube
//!
//! A plain top-level window that:
//! - Clocks the controller from a 16 ms timer
//! - Maps arrow keys and mouse hover onto controller input
//! - Paints the rasterised cube with a top-down 32-bit DIB
//!
//! The host state lives in a box whose pointer sits in `GWLP_USERDATA`; it is
//! reclaimed on `WM_NCDESTROY`.

use std::ffi::c_void;
use std::time::Instant;

use tiny_skia::Pixmap;
use tracing::{debug, info, warn};
use windows::core::w;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, EndPaint, InvalidateRect, SetDIBitsToDevice, BITMAPINFO, BITMAPINFOHEADER,
    BI_RGB, DIB_RGB_COLORS, PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{TrackMouseEvent, TME_LEAVE, TRACKMOUSEEVENT};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DispatchMessageW, GetClientRect, GetMessageW,
    GetWindowLongPtrW, KillTimer, LoadCursorW, PostQuitMessage, RegisterClassW, SetTimer,
    SetWindowLongPtrW, ShowWindow, TranslateMessage, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT,
    GWLP_USERDATA, IDC_ARROW, MSG, SW_SHOW, WINDOW_EX_STYLE, WM_DESTROY, WM_ERASEBKGND,
    WM_KEYDOWN, WM_MOUSELEAVE, WM_MOUSEMOVE, WM_NCDESTROY, WM_PAINT, WM_TIMER, WNDCLASSW,
    WS_OVERLAPPEDWINDOW,
};

use crate::app::controller::CubeController;
use crate::config::{ConfigError, CubeConfig};
use crate::domain::core::{Point, Rect};
use crate::input::{KeyEvent, PointerTracker};
use crate::ui::{CubeLayout, CubeRenderer, OrientationTween};

/// Frame timer id
const FRAME_TIMER_ID: usize = 1;

/// Frame timer period in milliseconds
const FRAME_INTERVAL_MS: u32 = 16;

/// Initial client size
const INITIAL_SIZE: (i32, i32) = (480, 480);

/// Host window errors
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to get module handle")]
    ModuleHandleFailed,

    #[error("Failed to register cube window class")]
    ClassRegistrationFailed,

    #[error("Failed to create cube window")]
    WindowCreationFailed,

    #[error("Failed to start frame timer")]
    TimerFailed,

    #[error("Controller setup failed: {0}")]
    Controller(#[from] ConfigError),
}

/// Everything the window procedure needs between messages
struct HostState {
    controller: CubeController,
    tween: OrientationTween,
    renderer: CubeRenderer,
    pointer: PointerTracker,
    started: Instant,
    frame: Option<Pixmap>,
    tracking_leave: bool,
}

impl HostState {
    fn new(config: CubeConfig) -> Result<Self, ConfigError> {
        let started = Instant::now();
        let controller = CubeController::mount(config, started.elapsed())?;
        let tween = OrientationTween::new(controller.orientation());
        Ok(Self {
            controller,
            tween,
            renderer: CubeRenderer::with_system_font(),
            pointer: PointerTracker::new(),
            started,
            frame: None,
            tracking_leave: false,
        })
    }

    /// One host frame: timers, animation, tween, rasterisation
    fn tick(&mut self, canvas: Rect) {
        let now = self.started.elapsed();
        self.controller.advance(now);
        let style = self.controller.render();
        let displayed = self.tween.update(&style, now);

        if canvas.is_empty() {
            return;
        }
        let layout = CubeLayout::from_orientation(displayed, canvas, 1.0);
        match self.renderer.render_layout(&layout) {
            Ok(pixmap) => self.frame = Some(pixmap),
            Err(error) => warn!(%error, "frame render failed"),
        }
    }

    fn key_down(&mut self, vk_code: u32) {
        let key = KeyEvent::from_vk_code(vk_code);
        if key.is_ignored() {
            return;
        }
        self.controller.handle_key(key, self.started.elapsed());
    }

    fn mouse_moved(&mut self, position: Point, canvas: Rect) {
        let bounds = CubeLayout::cube_bounds(canvas);
        if let Some(event) = self.pointer.moved(position, bounds) {
            self.controller.handle_pointer(event, self.started.elapsed());
        }
    }

    fn mouse_left(&mut self) {
        self.tracking_leave = false;
        if let Some(event) = self.pointer.left_window() {
            self.controller.handle_pointer(event, self.started.elapsed());
        }
    }
}

/// Creates the cube window and runs its message loop until it is closed
pub fn run(config: CubeConfig) -> Result<(), WindowError> {
    let state = Box::new(HostState::new(config)?);
    let class_name = w!("WobbleCubeWindow");

    let hinstance = unsafe { GetModuleHandleW(None) }.map_err(|_| WindowError::ModuleHandleFailed)?;

    let wc = WNDCLASSW {
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(cube_window_proc),
        hInstance: hinstance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
        lpszClassName: class_name,
        ..Default::default()
    };

    if unsafe { RegisterClassW(&wc) } == 0 {
        return Err(WindowError::ClassRegistrationFailed);
    }

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            w!("Wobble Cube"),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            INITIAL_SIZE.0,
            INITIAL_SIZE.1,
            None,
            None,
            hinstance,
            None,
        )
    };

    if hwnd.0 == 0 {
        return Err(WindowError::WindowCreationFailed);
    }

    // Ownership passes to the window; WM_NCDESTROY takes it back
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
    }

    if unsafe { SetTimer(hwnd, FRAME_TIMER_ID, FRAME_INTERVAL_MS, None) } == 0 {
        return Err(WindowError::TimerFailed);
    }

    unsafe {
        ShowWindow(hwnd, SW_SHOW);
    }
    info!("cube window shown");

    let mut msg = MSG::default();
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    info!("message loop finished");
    Ok(())
}

/// Host state stored on the window, if any
///
/// # Safety
/// The pointer must have come from `run` and not yet been reclaimed.
unsafe fn host_state<'a>(hwnd: HWND) -> Option<&'a mut HostState> {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut HostState;
    unsafe { ptr.as_mut() }
}

fn client_rect(hwnd: HWND) -> Rect {
    let mut rect = RECT::default();
    if unsafe { GetClientRect(hwnd, &mut rect) }.is_err() {
        return Rect::new(0, 0, 0, 0);
    }
    Rect::new(0, 0, rect.right - rect.left, rect.bottom - rect.top)
}

fn lparam_point(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as u16 as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as u16 as i16 as i32;
    Point::new(x, y)
}

fn track_mouse_leave(hwnd: HWND) -> bool {
    let mut tracking = TRACKMOUSEEVENT {
        cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
        dwFlags: TME_LEAVE,
        hwndTrack: hwnd,
        dwHoverTime: 0,
    };
    unsafe { TrackMouseEvent(&mut tracking) }.is_ok()
}

fn paint(hwnd: HWND, state: &HostState) {
    unsafe {
        let mut ps = PAINTSTRUCT::default();
        let hdc = BeginPaint(hwnd, &mut ps);

        if let Some(pixmap) = &state.frame {
            let width = pixmap.width() as i32;
            let height = pixmap.height() as i32;
            let pixels = state.renderer.pixmap_to_bgra(pixmap);

            let mut bitmap_info = BITMAPINFO::default();
            bitmap_info.bmiHeader = BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            SetDIBitsToDevice(
                hdc,
                0,
                0,
                width as u32,
                height as u32,
                0,
                0,
                0,
                height as u32,
                pixels.as_ptr() as *const c_void,
                &bitmap_info,
                DIB_RGB_COLORS,
            );
        }

        EndPaint(hwnd, &ps);
    }
}

unsafe extern "system" fn cube_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCDESTROY {
        unsafe {
            let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut HostState;
            if !ptr.is_null() {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                drop(Box::from_raw(ptr));
                debug!("host state released");
            }
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }
    }

    let Some(state) = (unsafe { host_state(hwnd) }) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };

    match msg {
        WM_TIMER if wparam.0 == FRAME_TIMER_ID => {
            state.tick(client_rect(hwnd));
            unsafe {
                InvalidateRect(hwnd, None, false);
            }
            LRESULT(0)
        }
        WM_PAINT => {
            paint(hwnd, state);
            LRESULT(0)
        }
        // The frame covers the whole client area
        WM_ERASEBKGND => LRESULT(1),
        WM_KEYDOWN => {
            state.key_down(wparam.0 as u32);
            LRESULT(0)
        }
        WM_MOUSEMOVE => {
            if !state.tracking_leave {
                state.tracking_leave = track_mouse_leave(hwnd);
            }
            state.mouse_moved(lparam_point(lparam), client_rect(hwnd));
            LRESULT(0)
        }
        WM_MOUSELEAVE => {
            state.mouse_left();
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe {
                let _ = KillTimer(hwnd, FRAME_TIMER_ID);
            }
            state.controller.unmount();
            unsafe {
                PostQuitMessage(0);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lparam_coordinates_are_signed() {
        let packed = ((-5i16 as u16 as isize) << 16) | (120u16 as isize);
        assert_eq!(lparam_point(LPARAM(packed)), Point::new(120, -5));
    }

    #[test]
    fn host_state_starts_in_auto_mode() {
        let state = HostState::new(CubeConfig::default()).unwrap();
        assert!(state.controller.mode().is_auto());
        assert!(state.frame.is_none());
    }

    #[test]
    fn hover_over_cube_pauses() {
        let mut state = HostState::new(CubeConfig::default()).unwrap();
        let canvas = Rect::new(0, 0, 400, 400);

        state.mouse_moved(Point::new(2, 2), canvas);
        assert!(state.controller.mode().is_auto());

        state.mouse_moved(canvas.center(), canvas);
        assert!(state.controller.mode().is_manual());
    }

    #[test]
    fn tick_renders_a_frame() {
        let mut state = HostState::new(CubeConfig::default()).unwrap();
        state.tick(Rect::new(0, 0, 64, 48));
        let frame = state.frame.as_ref().unwrap();
        assert_eq!((frame.width(), frame.height()), (64, 48));
    }
}
