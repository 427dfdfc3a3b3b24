// src/pixel_buffer.rs

//! The CPU-side readback buffer that receives resolved frame pixels.
//!
//! A `PixelBuffer` is a resizable block of CPU-addressable memory sized to
//! `width * height * bytes_per_pixel`. The FBO provider reads the resolved
//! color buffer back into it on every blit, and exposes it read-only to
//! collaborators that want direct pixel access (screenshot export, encoders).
//!
//! The buffer is reallocated on resize rather than grown in place, so its
//! capacity always matches the current dimensions exactly.

use log::debug;

/// A CPU-addressable pixel block, laid out row-major with no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: i32,
    height: i32,
    bytes_per_pixel: usize,
    data: Box<[u8]>,
}

impl PixelBuffer {
    /// Allocates a zeroed buffer for the given dimensions and color depth.
    ///
    /// Negative dimensions are clamped to zero; the buffer is then empty
    /// but still usable (resize later to give it real capacity).
    pub fn new(width: i32, height: i32, bit_depth: u8) -> Self {
        let bytes_per_pixel = ((bit_depth as usize) / 8).max(1);
        let len = Self::byte_len(width, height, bytes_per_pixel);
        debug!(
            "Allocating pixel buffer: {}x{} @ {} bytes/px ({} bytes)",
            width, height, bytes_per_pixel, len
        );
        Self {
            width: width.max(0),
            height: height.max(0),
            bytes_per_pixel,
            data: vec![0u8; len].into_boxed_slice(),
        }
    }

    /// Drops the old storage and allocates fresh storage at the new size.
    ///
    /// Contents are not preserved across a resize; the next readback
    /// overwrites the whole buffer anyway.
    pub fn resize(&mut self, width: i32, height: i32, bit_depth: u8) {
        *self = Self::new(width, height, bit_depth);
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bytes per pixel (4 for the usual BGRA readback format).
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer holds no pixels (zero area).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only view of the pixel bytes.
    #[inline]
    pub fn bits(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of the pixel bytes, written by the GL readback.
    #[inline]
    pub fn bits_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn byte_len(width: i32, height: i32, bytes_per_pixel: usize) -> usize {
        (width.max(0) as usize) * (height.max(0) as usize) * bytes_per_pixel
    }
}
