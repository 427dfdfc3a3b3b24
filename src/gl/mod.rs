// src/gl/mod.rs

//! Defines the `GlApi` trait: the slice of the GL function-binding layer the
//! providers consume.
//!
//! The providers only need object lifecycle (framebuffers, renderbuffers),
//! binding, storage allocation, attachment, pixel transfer, and a handful of
//! capability queries. Everything else the GL wrapper offers (draw calls,
//! shaders, state) is out of scope here. Treating the binding layer as a
//! trait lets the FBO lifecycle run against a recording mock in tests and
//! against the WGL-loaded real entry points on Windows.

use crate::config::GlVersion;
use crate::platform::{DeviceSurface, GlContext};

#[cfg(test)]
pub mod mock;
#[cfg(windows)]
pub mod wgl;

/// The extension token probed during multisample pixel-format negotiation.
pub const MULTISAMPLE_EXTENSION: &str = "WGL_ARB_multisample";

/// Fixed sample count used for the FBO provider's multisampled attachments.
pub const RENDERBUFFER_SAMPLES: i32 = 8;

/// Which framebuffer binding point an id is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferBinding {
    /// Both read and draw (`GL_FRAMEBUFFER`).
    Both,
    /// Read source only (`GL_READ_FRAMEBUFFER`).
    Read,
    /// Draw destination only (`GL_DRAW_FRAMEBUFFER`).
    Draw,
}

/// Framebuffer attachment slot for a renderbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentSlot {
    /// First color attachment.
    Color0,
    /// Depth attachment.
    Depth,
}

/// Renderbuffer storage formats used by the providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFormat {
    /// 8-bit-per-channel RGBA color storage.
    Rgba,
    /// 24-bit depth storage.
    Depth24,
}

/// The GL capability surface consumed by the render context providers.
///
/// Binding state follows GL semantics: `renderbuffer_storage*` allocates
/// storage for the renderbuffer currently bound via `bind_renderbuffer`, and
/// `attach_renderbuffer` attaches to the framebuffer currently bound via
/// `bind_framebuffer(Both, ..)`.
pub trait GlApi {
    /// Generates a fresh framebuffer object name.
    fn gen_framebuffer(&mut self) -> u32;

    /// Deletes a framebuffer object.
    fn delete_framebuffer(&mut self, id: u32);

    /// Generates a fresh renderbuffer name.
    fn gen_renderbuffer(&mut self) -> u32;

    /// Deletes a batch of renderbuffers.
    fn delete_renderbuffers(&mut self, ids: &[u32]);

    /// Binds a framebuffer to a binding point (0 unbinds).
    fn bind_framebuffer(&mut self, binding: FramebufferBinding, id: u32);

    /// Binds a renderbuffer (0 unbinds).
    fn bind_renderbuffer(&mut self, id: u32);

    /// Allocates single-sample storage for the bound renderbuffer.
    fn renderbuffer_storage(&mut self, format: StorageFormat, width: i32, height: i32);

    /// Allocates multisampled storage for the bound renderbuffer.
    fn renderbuffer_storage_multisample(
        &mut self,
        samples: i32,
        format: StorageFormat,
        width: i32,
        height: i32,
    );

    /// Attaches a renderbuffer to a slot of the bound framebuffer.
    fn attach_renderbuffer(&mut self, slot: AttachmentSlot, id: u32);

    /// Blits the color buffer of the read framebuffer onto the draw
    /// framebuffer over the full rectangle (0,0)..(width,height), with
    /// nearest-neighbor filtering. This is the multisample resolve step.
    fn blit_color_rect(&mut self, width: i32, height: i32);

    /// Selects color attachment 0 of the bound framebuffer as the read
    /// buffer for subsequent pixel readback.
    fn set_read_buffer_color0(&mut self);

    /// Reads (0,0)..(width,height) of the read buffer into `out` in
    /// BGRA/unsigned-byte layout. `out` must hold at least
    /// `width * height * 4` bytes; shorter buffers skip the readback.
    fn read_pixels_bgra(&mut self, width: i32, height: i32, out: &mut [u8]);

    /// The space-separated extension string of the current context, or
    /// `None` when no extension query is available.
    fn extensions(&mut self) -> Option<String>;

    /// Queries for a pixel format on `surface` supporting the given number
    /// of multisample subsamples (attribute-list enumeration). Returns the
    /// format index, or `None` when no such format exists.
    fn choose_multisample_format(&mut self, surface: DeviceSurface, samples: i32) -> Option<i32>;

    /// Asks the GL layer to upgrade the current context to `version` where
    /// supported, returning the context handle to use from now on (the
    /// original handle when no upgrade happened).
    fn update_context_version(
        &mut self,
        surface: DeviceSurface,
        context: GlContext,
        version: GlVersion,
    ) -> GlContext;

    /// The framebuffer id currently bound as the draw target
    /// (`GL_FRAMEBUFFER_BINDING`).
    fn bound_framebuffer(&mut self) -> u32;
}
