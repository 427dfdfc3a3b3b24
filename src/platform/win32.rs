// src/platform/win32.rs
#![allow(non_snake_case)] // Allow non-snake case for Win32 types

//! Win32 implementation of `PlatformSurface`.
//!
//! Windows are created hidden (popup style, never shown) purely to obtain a
//! device context with a GL-capable pixel format. Memory surfaces are
//! compatible DCs with a DIB section selected into them, giving the FBO
//! provider a CPU-visible staging surface it can `BitBlt` onto a caller's
//! target DC.

use super::{DeviceSurface, FormatFlags, GlContext, PixelFormatRequest, PlatformSurface, WindowHandle};
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::mem;
use std::ptr;

use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows_sys::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GdiFlush, GetDC,
    ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HGDIOBJ,
    SRCCOPY,
};
use windows_sys::Win32::Graphics::OpenGL::{
    ChoosePixelFormat, SetPixelFormat, SwapBuffers, wglCreateContext, wglDeleteContext,
    wglMakeCurrent, PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL,
    PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, RegisterClassExW, SetWindowPos, CS_HREDRAW,
    CS_OWNDC, CS_VREDRAW, SWP_NOACTIVATE, SWP_NOCOPYBITS, SWP_NOMOVE, SWP_NOOWNERZORDER,
    WNDCLASSEXW, WS_CLIPCHILDREN, WS_CLIPSIBLINGS, WS_POPUP,
};

/// UTF-16, nul-terminated window class name.
static CLASS_NAME: Lazy<Vec<u16>> = Lazy::new(|| {
    "GlsurfRenderWindow"
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect()
});

/// Registered once per process; 0 means registration failed.
static CLASS_ATOM: Lazy<u16> = Lazy::new(|| {
    // SAFETY: Win32 calls; CLASS_NAME outlives the process.
    unsafe {
        let wnd_class = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW | CS_OWNDC,
            lpfnWndProc: Some(wnd_proc),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: GetModuleHandleW(ptr::null()),
            hIcon: 0,
            hCursor: 0,
            hbrBackground: 0,
            lpszMenuName: ptr::null(),
            lpszClassName: CLASS_NAME.as_ptr(),
            hIconSm: 0,
        };
        RegisterClassExW(&wnd_class)
    }
});

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// DIB section selected into a compatible DC, tracked per memory surface so
/// the storage can be rewritten on upload and released exactly once.
struct DibSurface {
    bitmap: HGDIOBJ,
    previous_bitmap: HGDIOBJ,
    bits: *mut u8,
    len: usize,
}

/// The real Win32 windowing backend.
#[derive(Default)]
pub struct Win32Platform {
    memory_surfaces: HashMap<isize, DibSurface>,
}

impl Win32Platform {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_dib(
        surface: DeviceSurface,
        width: i32,
        height: i32,
        bit_depth: u8,
    ) -> Result<DibSurface> {
        let mut header: BITMAPINFOHEADER = unsafe { mem::zeroed() };
        header.biSize = mem::size_of::<BITMAPINFOHEADER>() as u32;
        header.biWidth = width;
        // Positive height: bottom-up rows, matching GL pixel readback order.
        header.biHeight = height;
        header.biPlanes = 1;
        header.biBitCount = bit_depth as u16;
        header.biCompression = BI_RGB;
        let info = BITMAPINFO {
            bmiHeader: header,
            bmiColors: unsafe { mem::zeroed() },
        };

        let mut bits: *mut std::ffi::c_void = ptr::null_mut();
        // SAFETY: Win32 call; `info` and `bits` are valid for the duration.
        let bitmap = unsafe {
            CreateDIBSection(surface.raw(), &info, DIB_RGB_COLORS, &mut bits, 0, 0)
        };
        if bitmap == 0 || bits.is_null() {
            return Err(anyhow!(
                "CreateDIBSection failed for {}x{} @ {} bpp",
                width,
                height,
                bit_depth
            ));
        }

        let row_bytes = (width.max(0) as usize) * ((bit_depth as usize) / 8).max(1);
        Ok(DibSurface {
            bitmap,
            previous_bitmap: 0,
            bits: bits as *mut u8,
            len: row_bytes * (height.max(0) as usize),
        })
    }

    fn release_dib(surface: DeviceSurface, dib: &mut DibSurface) {
        // SAFETY: the bitmap was selected into `surface` by this backend.
        unsafe {
            if dib.previous_bitmap != 0 {
                SelectObject(surface.raw(), dib.previous_bitmap);
            }
            DeleteObject(dib.bitmap);
        }
        dib.bitmap = 0;
        dib.bits = ptr::null_mut();
        dib.len = 0;
    }
}

impl PlatformSurface for Win32Platform {
    fn create_window(&mut self, width: i32, height: i32) -> Result<WindowHandle> {
        if *CLASS_ATOM == 0 {
            return Err(anyhow!("RegisterClassExW failed for the render window class"));
        }

        info!("Creating hidden render window: {}x{}px", width, height);
        // SAFETY: Win32 call; the class was registered above.
        let hwnd = unsafe {
            CreateWindowExW(
                0,
                CLASS_NAME.as_ptr(),
                ptr::null(),
                WS_CLIPCHILDREN | WS_CLIPSIBLINGS | WS_POPUP,
                0,
                0,
                width,
                height,
                0,
                0,
                GetModuleHandleW(ptr::null()),
                ptr::null(),
            )
        };
        if hwnd == 0 {
            return Err(anyhow!("CreateWindowExW failed"));
        }
        debug!("Render window created (HWND: {:#x})", hwnd);
        Ok(WindowHandle::from_raw(hwnd))
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        if window.is_null() {
            return;
        }
        debug!("Destroying render window (HWND: {:#x})", window.raw());
        // SAFETY: the window was created by this backend.
        unsafe {
            DestroyWindow(window.raw());
        }
    }

    fn acquire_surface(&mut self, window: WindowHandle) -> Result<DeviceSurface> {
        // SAFETY: Win32 call on a window owned by the caller.
        let hdc = unsafe { GetDC(window.raw()) };
        if hdc == 0 {
            return Err(anyhow!("GetDC failed (HWND: {:#x})", window.raw()));
        }
        Ok(DeviceSurface::from_raw(hdc))
    }

    fn release_surface(&mut self, window: WindowHandle, surface: DeviceSurface) {
        if surface.is_null() {
            return;
        }
        // SAFETY: the DC was acquired from `window` by this backend.
        unsafe {
            ReleaseDC(window.raw(), surface.raw());
        }
    }

    fn resize_window(&mut self, window: WindowHandle, width: i32, height: i32) {
        if window.is_null() {
            return;
        }
        // SAFETY: the window was created by this backend.
        unsafe {
            SetWindowPos(
                window.raw(),
                0,
                0,
                0,
                width,
                height,
                SWP_NOACTIVATE | SWP_NOCOPYBITS | SWP_NOMOVE | SWP_NOOWNERZORDER,
            );
        }
    }

    fn choose_pixel_format(
        &mut self,
        surface: DeviceSurface,
        request: &PixelFormatRequest,
    ) -> i32 {
        let pfd = descriptor_from_request(request);
        // SAFETY: Win32 call with a fully-initialized descriptor.
        unsafe { ChoosePixelFormat(surface.raw(), &pfd) }
    }

    fn assign_pixel_format(
        &mut self,
        surface: DeviceSurface,
        format: i32,
        request: &PixelFormatRequest,
    ) -> bool {
        let pfd = descriptor_from_request(request);
        // SAFETY: Win32 call with a fully-initialized descriptor.
        let ok = unsafe { SetPixelFormat(surface.raw(), format, &pfd) } != 0;
        if !ok {
            warn!("SetPixelFormat rejected format {}", format);
        }
        ok
    }

    fn create_context(&mut self, surface: DeviceSurface) -> Result<GlContext> {
        // SAFETY: Win32 call; the surface has an assigned pixel format.
        let hglrc = unsafe { wglCreateContext(surface.raw()) };
        if hglrc == 0 {
            return Err(anyhow!("wglCreateContext failed").context("creating GL context"));
        }
        info!("GL context created (HGLRC: {:#x})", hglrc);
        Ok(GlContext::from_raw(hglrc))
    }

    fn delete_context(&mut self, context: GlContext) {
        if context.is_null() {
            return;
        }
        // SAFETY: the context was created by this backend.
        unsafe {
            wglDeleteContext(context.raw());
        }
    }

    fn make_current(&mut self, surface: DeviceSurface, context: GlContext) {
        // SAFETY: Win32 call; surface and context belong to the caller.
        let ok = unsafe { wglMakeCurrent(surface.raw(), context.raw()) } != 0;
        if !ok {
            error!(
                "wglMakeCurrent failed (HDC: {:#x}, HGLRC: {:#x})",
                surface.raw(),
                context.raw()
            );
        }
    }

    fn swap_buffers(&mut self, surface: DeviceSurface) {
        // SAFETY: Win32 call on a double-buffered DC.
        unsafe {
            SwapBuffers(surface.raw());
        }
    }

    fn copy_surface(
        &mut self,
        target: DeviceSurface,
        width: i32,
        height: i32,
        source: DeviceSurface,
    ) {
        // SAFETY: Win32 call; both DCs belong to the caller.
        let ok = unsafe {
            BitBlt(target.raw(), 0, 0, width, height, source.raw(), 0, 0, SRCCOPY)
        } != 0;
        if !ok {
            warn!(
                "BitBlt failed ({}x{}, {:#x} -> {:#x})",
                width,
                height,
                source.raw(),
                target.raw()
            );
        }
    }

    fn create_memory_surface(
        &mut self,
        compatible_with: DeviceSurface,
        width: i32,
        height: i32,
        bit_depth: u8,
    ) -> Result<DeviceSurface> {
        // SAFETY: Win32 call; a null source DC yields a screen-compatible DC.
        let hdc = unsafe { CreateCompatibleDC(compatible_with.raw()) };
        if hdc == 0 {
            return Err(anyhow!("CreateCompatibleDC failed"));
        }
        let surface = DeviceSurface::from_raw(hdc);

        let mut dib = Self::create_dib(surface, width, height, bit_depth)
            .context("creating DIB section for memory surface")?;
        // SAFETY: selecting the fresh DIB into the DC we just created.
        dib.previous_bitmap = unsafe { SelectObject(surface.raw(), dib.bitmap) };
        self.memory_surfaces.insert(surface.raw(), dib);
        debug!(
            "Memory surface created (HDC: {:#x}, {}x{} @ {} bpp)",
            surface.raw(),
            width,
            height,
            bit_depth
        );
        Ok(surface)
    }

    fn resize_memory_surface(
        &mut self,
        surface: DeviceSurface,
        width: i32,
        height: i32,
        bit_depth: u8,
    ) {
        let Some(mut dib) = self.memory_surfaces.remove(&surface.raw()) else {
            warn!("resize_memory_surface on unknown surface {:#x}", surface.raw());
            return;
        };
        let previous = dib.previous_bitmap;
        Self::release_dib(surface, &mut dib);

        match Self::create_dib(surface, width, height, bit_depth) {
            Ok(mut new_dib) => {
                // SAFETY: selecting the replacement DIB into the same DC.
                unsafe { SelectObject(surface.raw(), new_dib.bitmap) };
                new_dib.previous_bitmap = previous;
                self.memory_surfaces.insert(surface.raw(), new_dib);
            }
            Err(e) => error!("Failed to resize memory surface: {:#}", e),
        }
    }

    fn delete_memory_surface(&mut self, surface: DeviceSurface) {
        if surface.is_null() {
            return;
        }
        if let Some(mut dib) = self.memory_surfaces.remove(&surface.raw()) {
            Self::release_dib(surface, &mut dib);
        }
        // SAFETY: the DC was created by this backend.
        unsafe {
            DeleteDC(surface.raw());
        }
    }

    fn upload_pixels(&mut self, surface: DeviceSurface, width: i32, height: i32, pixels: &[u8]) {
        let Some(dib) = self.memory_surfaces.get(&surface.raw()) else {
            warn!("upload_pixels on unknown surface {:#x}", surface.raw());
            return;
        };
        let expected = (width.max(0) as usize) * (height.max(0) as usize) * 4;
        let len = pixels.len().min(dib.len).min(expected);
        // SAFETY: GdiFlush serializes pending GDI drawing before we touch the
        // DIB bits; `dib.bits` points at `dib.len` writable bytes.
        unsafe {
            GdiFlush();
            ptr::copy_nonoverlapping(pixels.as_ptr(), dib.bits, len);
        }
    }
}

impl Drop for Win32Platform {
    fn drop(&mut self) {
        if !self.memory_surfaces.is_empty() {
            warn!(
                "Win32Platform dropped with {} live memory surface(s); a provider was not destroyed",
                self.memory_surfaces.len()
            );
        }
    }
}

fn descriptor_from_request(request: &PixelFormatRequest) -> PIXELFORMATDESCRIPTOR {
    let mut flags = 0;
    if request.flags.contains(FormatFlags::DRAW_TO_WINDOW) {
        flags |= PFD_DRAW_TO_WINDOW;
    }
    if request.flags.contains(FormatFlags::SUPPORT_OPENGL) {
        flags |= PFD_SUPPORT_OPENGL;
    }
    if request.flags.contains(FormatFlags::DOUBLE_BUFFER) {
        flags |= PFD_DOUBLEBUFFER;
    }

    let mut pfd: PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };
    pfd.nSize = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16;
    pfd.nVersion = 1;
    pfd.dwFlags = flags;
    pfd.iPixelType = PFD_TYPE_RGBA;
    pfd.cColorBits = request.color_bits;
    pfd.cDepthBits = request.depth_bits;
    pfd.cStencilBits = request.stencil_bits;
    pfd.iLayerType = PFD_MAIN_PLANE;
    pfd
}
