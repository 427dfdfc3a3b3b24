// src/platform/mock.rs

use super::{
    DeviceSurface, GlContext, PixelFormatRequest, PlatformSurface, WindowHandle,
};
use anyhow::Result;
use std::collections::{HashMap, HashSet};

/// One recorded platform operation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    CreateWindow { width: i32, height: i32 },
    DestroyWindow(WindowHandle),
    AcquireSurface(WindowHandle),
    ReleaseSurface { window: WindowHandle, surface: DeviceSurface },
    ResizeWindow { window: WindowHandle, width: i32, height: i32 },
    ChoosePixelFormat { color_bits: u8 },
    AssignPixelFormat { format: i32 },
    CreateContext(DeviceSurface),
    DeleteContext(GlContext),
    MakeCurrent { surface: DeviceSurface, context: GlContext },
    SwapBuffers(DeviceSurface),
    CopySurface { target: DeviceSurface, width: i32, height: i32, source: DeviceSurface },
    CreateMemorySurface { width: i32, height: i32, bit_depth: u8 },
    ResizeMemorySurface { surface: DeviceSurface, width: i32, height: i32, bit_depth: u8 },
    DeleteMemorySurface(DeviceSurface),
    UploadPixels { surface: DeviceSurface, width: i32, height: i32, byte_len: usize },
}

/// Scriptable recording double for the native windowing layer.
#[derive(Default)]
pub struct MockPlatform {
    next_handle: isize,
    calls: Vec<PlatformCall>,
    /// When set, `choose_pixel_format` finds nothing (returns 0).
    pub fail_choose_pixel_format: bool,
    /// When set, `assign_pixel_format` is rejected.
    pub reject_pixel_format: bool,
    live_windows: HashSet<isize>,
    live_surfaces: HashSet<isize>,
    live_contexts: HashSet<isize>,
    live_memory_surfaces: HashMap<isize, (i32, i32, u8)>,
    current: Option<(DeviceSurface, GlContext)>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call, oldest first.
    pub fn calls(&self) -> &[PlatformCall] {
        &self.calls
    }

    /// Handles of windows that have been created but not destroyed.
    pub fn live_window_count(&self) -> usize {
        self.live_windows.len()
    }

    pub fn live_surface_count(&self) -> usize {
        self.live_surfaces.len()
    }

    pub fn live_context_count(&self) -> usize {
        self.live_contexts.len()
    }

    pub fn live_memory_surface_count(&self) -> usize {
        self.live_memory_surfaces.len()
    }

    /// The dimensions last given to a live memory surface.
    pub fn memory_surface_dimensions(&self, surface: DeviceSurface) -> Option<(i32, i32, u8)> {
        self.live_memory_surfaces.get(&surface.raw()).copied()
    }

    /// The (surface, context) pair most recently made current.
    pub fn current_context(&self) -> Option<(DeviceSurface, GlContext)> {
        self.current
    }

    fn fresh_handle(&mut self) -> isize {
        self.next_handle += 1;
        self.next_handle
    }
}

impl PlatformSurface for MockPlatform {
    fn create_window(&mut self, width: i32, height: i32) -> Result<WindowHandle> {
        self.calls.push(PlatformCall::CreateWindow { width, height });
        let handle = self.fresh_handle();
        self.live_windows.insert(handle);
        Ok(WindowHandle::from_raw(handle))
    }

    fn destroy_window(&mut self, window: WindowHandle) {
        self.calls.push(PlatformCall::DestroyWindow(window));
        self.live_windows.remove(&window.raw());
    }

    fn acquire_surface(&mut self, window: WindowHandle) -> Result<DeviceSurface> {
        self.calls.push(PlatformCall::AcquireSurface(window));
        let handle = self.fresh_handle();
        self.live_surfaces.insert(handle);
        Ok(DeviceSurface::from_raw(handle))
    }

    fn release_surface(&mut self, window: WindowHandle, surface: DeviceSurface) {
        self.calls.push(PlatformCall::ReleaseSurface { window, surface });
        self.live_surfaces.remove(&surface.raw());
    }

    fn resize_window(&mut self, window: WindowHandle, width: i32, height: i32) {
        self.calls.push(PlatformCall::ResizeWindow { window, width, height });
    }

    fn choose_pixel_format(
        &mut self,
        _surface: DeviceSurface,
        request: &PixelFormatRequest,
    ) -> i32 {
        self.calls.push(PlatformCall::ChoosePixelFormat {
            color_bits: request.color_bits,
        });
        if self.fail_choose_pixel_format {
            0
        } else {
            7
        }
    }

    fn assign_pixel_format(
        &mut self,
        _surface: DeviceSurface,
        format: i32,
        _request: &PixelFormatRequest,
    ) -> bool {
        self.calls.push(PlatformCall::AssignPixelFormat { format });
        !self.reject_pixel_format
    }

    fn create_context(&mut self, surface: DeviceSurface) -> Result<GlContext> {
        self.calls.push(PlatformCall::CreateContext(surface));
        let handle = self.fresh_handle();
        self.live_contexts.insert(handle);
        Ok(GlContext::from_raw(handle))
    }

    fn delete_context(&mut self, context: GlContext) {
        self.calls.push(PlatformCall::DeleteContext(context));
        self.live_contexts.remove(&context.raw());
    }

    fn make_current(&mut self, surface: DeviceSurface, context: GlContext) {
        self.calls.push(PlatformCall::MakeCurrent { surface, context });
        self.current = Some((surface, context));
    }

    fn swap_buffers(&mut self, surface: DeviceSurface) {
        self.calls.push(PlatformCall::SwapBuffers(surface));
    }

    fn copy_surface(
        &mut self,
        target: DeviceSurface,
        width: i32,
        height: i32,
        source: DeviceSurface,
    ) {
        self.calls.push(PlatformCall::CopySurface {
            target,
            width,
            height,
            source,
        });
    }

    fn create_memory_surface(
        &mut self,
        _compatible_with: DeviceSurface,
        width: i32,
        height: i32,
        bit_depth: u8,
    ) -> Result<DeviceSurface> {
        self.calls.push(PlatformCall::CreateMemorySurface {
            width,
            height,
            bit_depth,
        });
        let handle = self.fresh_handle();
        self.live_memory_surfaces
            .insert(handle, (width, height, bit_depth));
        Ok(DeviceSurface::from_raw(handle))
    }

    fn resize_memory_surface(
        &mut self,
        surface: DeviceSurface,
        width: i32,
        height: i32,
        bit_depth: u8,
    ) {
        self.calls.push(PlatformCall::ResizeMemorySurface {
            surface,
            width,
            height,
            bit_depth,
        });
        if let Some(entry) = self.live_memory_surfaces.get_mut(&surface.raw()) {
            *entry = (width, height, bit_depth);
        }
    }

    fn delete_memory_surface(&mut self, surface: DeviceSurface) {
        self.calls.push(PlatformCall::DeleteMemorySurface(surface));
        self.live_memory_surfaces.remove(&surface.raw());
    }

    fn upload_pixels(&mut self, surface: DeviceSurface, width: i32, height: i32, pixels: &[u8]) {
        self.calls.push(PlatformCall::UploadPixels {
            surface,
            width,
            height,
            byte_len: pixels.len(),
        });
    }
}
