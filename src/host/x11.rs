// src/host/x11.rs
//! X11 host window.
//!
//! One window serves three roles, each behind its own handle so the simulator
//! can own them separately:
//! - [`X11Gpu`]: a [`GpuBackend`] whose drawable is the window; frames are
//!   rasterized in host memory and pushed with `XPutImage`
//! - [`X11Input`]: pointer and button events read from the window
//! - [`X11LedIndicator`]: shows the LED states in the window title

use crate::color::Argb8888;
use crate::config::Config;
use crate::controls::{Led, LedObserver};
use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::gpu::quad::{draw_strip, Surface, TextureView, PASSTHROUGH_FRAGMENT, PASSTHROUGH_VERTEX};
use crate::gpu::{FrameUnavailable, GpuBackend, GpuError, PipelineDescriptor, QuadDraw, TextureDescriptor};
use crate::host::{map_window_point, HostEvent, HostInput};
use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace, warn};
use std::cell::Cell;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::rc::Rc;
use std::time::Duration;
use x11::xlib::*;

/// `QueuedAfterReading` from Xlib.h; the `x11` crate does not export it.
const QUEUED_AFTER_READING: c_int = 1;

/// Connection, window and graphics context shared by the host handles.
pub struct X11Window {
    display: *mut Display,
    window: Window,
    gc: GC,
    visual: *mut Visual,
    wm_delete_window: Atom,
    size: Cell<(u32, u32)>,
    mapped: Cell<bool>,
    title: String,
}

impl X11Window {
    /// Opens the display and creates a window sized to the scaled screen.
    pub fn open(config: &Config) -> Result<Rc<Self>> {
        let scale = config.display.window_scale.max(1);
        let width = SCREEN_WIDTH as u32 * scale;
        let height = SCREEN_HEIGHT as u32 * scale;
        let title = CString::new(config.display.title.as_str()).context("Window title contains NUL")?;

        unsafe {
            let display = XOpenDisplay(ptr::null());
            if display.is_null() {
                return Err(anyhow!("Failed to open X11 display. Is DISPLAY set?"));
            }

            let screen = XDefaultScreen(display);
            let root = XRootWindow(display, screen);
            let visual = XDefaultVisual(display, screen);

            let window = XCreateSimpleWindow(
                display,
                root,
                0,
                0,
                width,
                height,
                1,
                XBlackPixel(display, screen),
                XBlackPixel(display, screen),
            );
            if window == 0 {
                XCloseDisplay(display);
                return Err(anyhow!("Failed to create X11 window"));
            }

            XStoreName(display, window, title.as_ptr());
            XSelectInput(
                display,
                window,
                ExposureMask
                    | KeyPressMask
                    | KeyReleaseMask
                    | ButtonPressMask
                    | ButtonReleaseMask
                    | PointerMotionMask
                    | StructureNotifyMask,
            );

            let gc = XCreateGC(display, window, 0, ptr::null_mut());

            let mut wm_delete_window = XInternAtom(display, b"WM_DELETE_WINDOW\0".as_ptr() as *const c_char, 0);
            XSetWMProtocols(display, window, &mut wm_delete_window, 1);

            XMapWindow(display, window);
            XFlush(display);

            info!("X11Window: Created window {}x{} (scale {})", width, height, scale);

            Ok(Rc::new(Self {
                display,
                window,
                gc,
                visual,
                wm_delete_window,
                size: Cell::new((width, height)),
                mapped: Cell::new(false),
                title: config.display.title.clone(),
            }))
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn set_title(&self, title: &str) {
        let Ok(c_title) = CString::new(title) else {
            warn!("X11Window: Title {:?} contains NUL, not set", title);
            return;
        };
        unsafe {
            XStoreName(self.display, self.window, c_title.as_ptr());
            XFlush(self.display);
        }
    }

    fn put_image(&self, pixels: &mut [u32], width: u32, height: u32) -> bool {
        unsafe {
            let image = XCreateImage(
                self.display,
                self.visual,
                24,
                ZPixmap,
                0,
                pixels.as_mut_ptr() as *mut c_char,
                width,
                height,
                32,
                0,
            );
            if image.is_null() {
                return false;
            }
            XPutImage(self.display, self.window, self.gc, image, 0, 0, 0, 0, width, height);
            // The pixel storage is ours; detach it before destroying the image.
            (*image).data = ptr::null_mut();
            XDestroyImage(image);
            XFlush(self.display);
        }
        true
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        info!("X11Window: Cleaning up");
        unsafe {
            if !self.gc.is_null() {
                XFreeGC(self.display, self.gc);
            }
            if self.window != 0 {
                XDestroyWindow(self.display, self.window);
            }
            if !self.display.is_null() {
                XCloseDisplay(self.display);
            }
        }
    }
}

pub struct X11Texture {
    desc: TextureDescriptor,
    pixels: Vec<Argb8888>,
}

pub struct X11Pipeline;

pub struct X11Buffer {
    data: Vec<f32>,
}

pub struct X11Frame {
    width: u32,
    height: u32,
    target: Vec<Argb8888>,
}

/// Presents into the window. Textures live in host memory.
pub struct X11Gpu {
    window: Rc<X11Window>,
    staging: Vec<u32>,
}

impl X11Gpu {
    pub fn new(window: Rc<X11Window>) -> Self {
        Self { window, staging: Vec::new() }
    }
}

impl GpuBackend for X11Gpu {
    type Buffer = X11Buffer;
    type Texture = X11Texture;
    type Pipeline = X11Pipeline;
    type Frame = X11Frame;

    fn device_name(&self) -> &str {
        "X11 (XPutImage)"
    }

    fn create_pipeline(&mut self, desc: &PipelineDescriptor) -> Result<Self::Pipeline, GpuError> {
        if desc.vertex_function != PASSTHROUGH_VERTEX || desc.fragment_function != PASSTHROUGH_FRAGMENT {
            return Err(GpuError::Pipeline {
                label: desc.label.to_string(),
                reason: "only the pass-through shaders are available".to_string(),
            });
        }
        Ok(X11Pipeline)
    }

    fn create_buffer(&mut self, label: &str, data: &[f32]) -> Result<Self::Buffer, GpuError> {
        if data.is_empty() {
            return Err(GpuError::BufferAllocation {
                label: label.to_string(),
                reason: "zero length".to_string(),
            });
        }
        Ok(X11Buffer { data: data.to_vec() })
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Self::Texture, GpuError> {
        Ok(X11Texture {
            desc: *desc,
            pixels: vec![Argb8888::CLEAR; desc.width * desc.height],
        })
    }

    fn replace_texture(&mut self, texture: &mut Self::Texture, pixels: &[Argb8888], bytes_per_row: usize) {
        let row = (bytes_per_row / texture.desc.format.bytes_per_pixel()).max(1);
        for (dst, src) in texture.pixels.chunks_mut(texture.desc.width).zip(pixels.chunks(row)) {
            let n = dst.len().min(src.len());
            dst[..n].copy_from_slice(&src[..n]);
        }
    }

    fn begin_frame(&mut self) -> Result<Self::Frame, FrameUnavailable> {
        if !self.window.mapped.get() {
            return Err(FrameUnavailable::NoDrawable);
        }
        let (width, height) = self.window.size();
        if width == 0 || height == 0 {
            return Err(FrameUnavailable::NoRenderPassDescriptor);
        }
        Ok(X11Frame {
            width,
            height,
            target: vec![Argb8888::CLEAR; width as usize * height as usize],
        })
    }

    fn draw(&mut self, frame: &mut Self::Frame, draw: QuadDraw<'_, Self>) {
        let mut surface = Surface {
            pixels: &mut frame.target,
            width: frame.width as usize,
            height: frame.height as usize,
        };
        let texture = TextureView {
            pixels: &draw.texture.pixels,
            width: draw.texture.desc.width,
            height: draw.texture.desc.height,
        };
        draw_strip(
            &mut surface,
            &draw.positions.data,
            &draw.tex_coords.data,
            draw.vertex_start,
            draw.vertex_count,
            &texture,
        );
    }

    fn end_frame(&mut self, frame: Self::Frame) {
        self.staging.clear();
        self.staging.extend(frame.target.iter().map(|p| p.0));
        if !self.window.put_image(&mut self.staging, frame.width, frame.height) {
            warn!("X11Gpu: Failed to create XImage, frame dropped");
        }
        trace!("X11Gpu: Presented {}x{}", frame.width, frame.height);
    }
}

/// Pointer and button events from the window.
pub struct X11Input {
    window: Rc<X11Window>,
    button_keysym: KeySym,
    button_down: bool,
}

impl X11Input {
    pub fn new(window: Rc<X11Window>, button_key: char) -> Self {
        // Latin-1 keysyms equal their code points.
        let button_keysym = button_key as KeySym;
        Self {
            window,
            button_keysym,
            button_down: false,
        }
    }

    /// A KeyRelease immediately followed by a KeyPress for the same key at
    /// the same time is auto-repeat, not a real release.
    unsafe fn is_auto_repeat(&self, release: &XKeyEvent) -> bool {
        if XEventsQueued(self.window.display, QUEUED_AFTER_READING) == 0 {
            return false;
        }
        let mut next: XEvent = std::mem::zeroed();
        XPeekEvent(self.window.display, &mut next);
        next.get_type() == KeyPress && next.key.time == release.time && next.key.keycode == release.keycode
    }

    #[allow(non_upper_case_globals)]
    unsafe fn convert_event(&mut self, event: &mut XEvent) -> Option<HostEvent> {
        let (win_w, win_h) = self.window.size();
        match event.get_type() {
            KeyPress => {
                let keysym = XLookupKeysym(&mut event.key, 0);
                if keysym != self.button_keysym || self.button_down {
                    return None;
                }
                self.button_down = true;
                Some(HostEvent::ButtonDown)
            }
            KeyRelease => {
                let keysym = XLookupKeysym(&mut event.key, 0);
                if keysym != self.button_keysym || self.is_auto_repeat(&event.key) {
                    return None;
                }
                self.button_down = false;
                Some(HostEvent::ButtonUp)
            }
            ButtonPress if event.button.button == Button1 => {
                let (x, y) = map_window_point(event.button.x, event.button.y, win_w, win_h);
                Some(HostEvent::PointerDown { x, y })
            }
            ButtonRelease if event.button.button == Button1 => {
                let (x, y) = map_window_point(event.button.x, event.button.y, win_w, win_h);
                Some(HostEvent::PointerUp { x, y })
            }
            MotionNotify => {
                let (x, y) = map_window_point(event.motion.x, event.motion.y, win_w, win_h);
                Some(HostEvent::PointerMoved { x, y })
            }
            ConfigureNotify => {
                let (w, h) = (event.configure.width.max(0) as u32, event.configure.height.max(0) as u32);
                if (w, h) != self.window.size() {
                    debug!("X11Input: Window resized to {}x{}", w, h);
                    self.window.size.set((w, h));
                }
                None
            }
            MapNotify => {
                self.window.mapped.set(true);
                None
            }
            UnmapNotify => {
                self.window.mapped.set(false);
                None
            }
            ClientMessage if event.client_message.data.get_long(0) as Atom == self.window.wm_delete_window => {
                Some(HostEvent::CloseRequested)
            }
            _ => None,
        }
    }
}

impl HostInput for X11Input {
    fn poll_events(&mut self, _now: Duration) -> Result<Vec<HostEvent>> {
        let mut events = Vec::new();
        unsafe {
            while XPending(self.window.display) > 0 {
                let mut event: XEvent = std::mem::zeroed();
                XNextEvent(self.window.display, &mut event);
                if let Some(host_event) = self.convert_event(&mut event) {
                    events.push(host_event);
                }
            }
        }
        Ok(events)
    }
}

/// Shows the LED states in the window title, e.g. `HMI Simulator [GREEN]`.
pub struct X11LedIndicator {
    window: Rc<X11Window>,
    leds: [bool; Led::COUNT],
}

impl X11LedIndicator {
    pub fn new(window: Rc<X11Window>) -> Self {
        Self {
            window,
            leds: [false; Led::COUNT],
        }
    }
}

impl LedObserver for X11LedIndicator {
    fn on_led_changed(&mut self, led: Led, on: bool) {
        self.leds[led.index()] = on;
        let title = indicator_title(&self.window.title, &self.leds);
        self.window.set_title(&title);
    }
}

/// Window title with the lit LEDs appended, e.g. `"hmi-sim [GREEN RED]"`.
fn indicator_title(base: &str, leds: &[bool; Led::COUNT]) -> String {
    let lit: Vec<String> = Led::ALL
        .iter()
        .filter(|l| leds[l.index()])
        .map(|l| l.to_string())
        .collect();
    if lit.is_empty() {
        base.to_string()
    } else {
        format!("{} [{}]", base, lit.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_after_reading_matches_xlib() {
        assert_eq!(QUEUED_AFTER_READING, 1);
    }

    #[test]
    fn title_lists_lit_leds_in_order() {
        let mut leds = [false; Led::COUNT];
        assert_eq!(indicator_title("hmi-sim", &leds), "hmi-sim");

        leds[Led::Red.index()] = true;
        assert_eq!(indicator_title("hmi-sim", &leds), "hmi-sim [RED]");

        leds[Led::Green.index()] = true;
        assert_eq!(indicator_title("hmi-sim", &leds), "hmi-sim [GREEN RED]");
    }
}
