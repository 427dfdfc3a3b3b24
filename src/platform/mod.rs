// src/platform/mod.rs

//! Defines the `PlatformSurface` trait for windowing/device-context backends
//! and the opaque handle types shared by providers and backends.
//!
//! Providers never call the OS directly; every native operation they need
//! (window creation, device-surface acquisition, pixel-format selection,
//! WGL context management, buffer swaps, surface-to-surface copies) goes
//! through this trait. That keeps the providers platform-agnostic and lets
//! tests substitute a recording double for the real Win32 backend.

use anyhow::Result;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[cfg(test)]
pub mod mock;
#[cfg(test)]
mod tests;
#[cfg(windows)]
pub mod win32;

/// Opaque identifier for a native window owned by a provider.
///
/// Zero is the null state; a handle is nulled after the window it names is
/// destroyed so destruction happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub(crate) isize);

/// Opaque identifier for a device surface (a window-backed or memory-backed
/// drawable usable for presentation or CPU pixel access).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceSurface(pub(crate) isize);

/// Opaque identifier for a GL rendering context, bound 1:1 to the device
/// surface it was created on. At most one context may be current on a given
/// logical thread at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlContext(pub(crate) isize);

macro_rules! impl_handle {
    ($name:ident) => {
        impl $name {
            /// The null handle.
            pub const NULL: Self = Self(0);

            /// Wraps a raw platform value.
            #[inline]
            pub fn from_raw(raw: isize) -> Self {
                Self(raw)
            }

            /// The raw platform value.
            #[inline]
            pub fn raw(self) -> isize {
                self.0
            }

            /// True for the null handle.
            #[inline]
            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

impl_handle!(WindowHandle);
impl_handle!(DeviceSurface);
impl_handle!(GlContext);

bitflags! {
    /// Buffering-mode flags of a pixel-format request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FormatFlags: u32 {
        /// The format must be usable for drawing to a window.
        const DRAW_TO_WINDOW = 1 << 0;
        /// The format must support OpenGL rendering.
        const SUPPORT_OPENGL = 1 << 1;
        /// The format must be double-buffered.
        const DOUBLE_BUFFER = 1 << 2;
    }
}

/// A platform pixel-format descriptor: color/depth/stencil bit layout and
/// buffering mode, negotiated before context creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatRequest {
    pub flags: FormatFlags,
    pub color_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
}

impl PixelFormatRequest {
    /// The standard request used by the hidden-window provider: the caller's
    /// color depth, a 16-bit depth buffer, an 8-bit stencil buffer, and
    /// double-buffered window rendering.
    pub fn for_bit_depth(bit_depth: u8) -> Self {
        Self {
            flags: FormatFlags::DRAW_TO_WINDOW
                | FormatFlags::SUPPORT_OPENGL
                | FormatFlags::DOUBLE_BUFFER,
            color_bits: bit_depth,
            depth_bits: 16,
            stencil_bits: 8,
        }
    }
}

/// Defines the interface to the native windowing and device-context layer.
///
/// A `PlatformSurface` implementation is responsible for:
/// 1. Creating and destroying the hidden native window a provider renders
///    through, including one-time window class registration.
/// 2. Acquiring and releasing device surfaces for that window.
/// 3. Selecting and assigning pixel formats on a device surface.
/// 4. Creating, deleting, and binding GL contexts.
/// 5. Presenting: buffer swaps and direct surface-to-surface pixel copies.
/// 6. Managing memory surfaces (CPU-side drawables compatible with a window
///    surface) used by the FBO provider to present read-back pixels.
///
/// Operations that the presentation path treats as infallible (swaps,
/// copies, resizes) log failures internally instead of returning errors;
/// resource acquisition returns `Result` so `create` can fail loudly.
pub trait PlatformSurface {
    /// Creates a hidden native window of the given pixel size.
    fn create_window(&mut self, width: i32, height: i32) -> Result<WindowHandle>;

    /// Destroys a window previously created by this backend. Idempotent for
    /// the null handle.
    fn destroy_window(&mut self, window: WindowHandle);

    /// Acquires the device surface of a window.
    fn acquire_surface(&mut self, window: WindowHandle) -> Result<DeviceSurface>;

    /// Releases a device surface acquired from `window`.
    fn release_surface(&mut self, window: WindowHandle, surface: DeviceSurface);

    /// Resizes a window in place: no repaint, no move, no z-order change,
    /// no focus change.
    fn resize_window(&mut self, window: WindowHandle, width: i32, height: i32);

    /// Finds a pixel format matching the request. Returns 0 when no
    /// compatible format exists.
    fn choose_pixel_format(&mut self, surface: DeviceSurface, request: &PixelFormatRequest)
        -> i32;

    /// Assigns a pixel format (chosen or negotiated) to a surface. Returns
    /// false when the platform rejects the assignment.
    fn assign_pixel_format(
        &mut self,
        surface: DeviceSurface,
        format: i32,
        request: &PixelFormatRequest,
    ) -> bool;

    /// Creates a GL context bound to the surface's pixel format.
    fn create_context(&mut self, surface: DeviceSurface) -> Result<GlContext>;

    /// Deletes a GL context. Idempotent for the null handle.
    fn delete_context(&mut self, context: GlContext);

    /// Makes `context` current on `surface` for the calling thread.
    fn make_current(&mut self, surface: DeviceSurface, context: GlContext);

    /// Swaps the front and back buffers of a double-buffered surface.
    fn swap_buffers(&mut self, surface: DeviceSurface);

    /// Copies the pixel area (0,0)..(width,height) from `source` onto
    /// `target`.
    fn copy_surface(
        &mut self,
        target: DeviceSurface,
        width: i32,
        height: i32,
        source: DeviceSurface,
    );

    /// Creates a memory surface compatible with `compatible_with`, backed by
    /// CPU-visible pixel storage of the given size and depth.
    fn create_memory_surface(
        &mut self,
        compatible_with: DeviceSurface,
        width: i32,
        height: i32,
        bit_depth: u8,
    ) -> Result<DeviceSurface>;

    /// Reallocates a memory surface's pixel storage at a new size.
    fn resize_memory_surface(
        &mut self,
        surface: DeviceSurface,
        width: i32,
        height: i32,
        bit_depth: u8,
    );

    /// Deletes a memory surface and its pixel storage. Idempotent for the
    /// null handle.
    fn delete_memory_surface(&mut self, surface: DeviceSurface);

    /// Copies `pixels` (row-major, bottom-up, as produced by GL readback)
    /// into a memory surface's storage so a following `copy_surface` can
    /// present them.
    fn upload_pixels(&mut self, surface: DeviceSurface, width: i32, height: i32, pixels: &[u8]);
}
