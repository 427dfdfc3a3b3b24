// src/context/fbo.rs

//! Render context provider backed by offscreen framebuffer objects.
//!
//! Rendering goes into a multisampled *draw* framebuffer. Each `blit`
//! resolves it into a single-sample *present* framebuffer, reads the
//! resolved pixels back into a CPU-side `PixelBuffer`, uploads them to a
//! memory device surface, and copies that surface onto the caller's target.
//! The draw framebuffer is re-bound afterwards so rendering continues into
//! it without the caller noticing any of this.

use crate::config::SurfaceConfig;
use crate::context::hidden_window::HiddenWindowContextProvider;
use crate::context::provider::RenderContextProvider;
use crate::gl::{AttachmentSlot, FramebufferBinding, GlApi, StorageFormat, RENDERBUFFER_SAMPLES};
use crate::pixel_buffer::PixelBuffer;
use crate::platform::{DeviceSurface, PlatformSurface};
use anyhow::{Context, Result};
use log::{debug, info, trace};

/// A GPU framebuffer with one color and one depth renderbuffer attachment.
///
/// All ids are zero when unallocated; attachments are owned exclusively by
/// this object and are deleted together with it. Storage is never resized
/// in place: a dimension change frees the whole object and allocates a new
/// one. In-place storage reallocation is known to leave drivers with
/// mismatched attachment dimensions, so full recreation is the resize
/// strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferObject {
    framebuffer: u32,
    color: u32,
    depth: u32,
    samples: i32,
}

impl FramebufferObject {
    /// Generates a framebuffer with freshly allocated color (RGBA) and
    /// depth (24-bit) renderbuffer storage at the given size. The
    /// framebuffer is left bound as the active target.
    fn allocate<G: GlApi>(gl: &mut G, width: i32, height: i32, samples: i32) -> Self {
        let framebuffer = gl.gen_framebuffer();
        gl.bind_framebuffer(FramebufferBinding::Both, framebuffer);

        let color = gl.gen_renderbuffer();
        gl.bind_renderbuffer(color);
        if samples > 1 {
            gl.renderbuffer_storage_multisample(samples, StorageFormat::Rgba, width, height);
        } else {
            gl.renderbuffer_storage(StorageFormat::Rgba, width, height);
        }

        let depth = gl.gen_renderbuffer();
        gl.bind_renderbuffer(depth);
        if samples > 1 {
            gl.renderbuffer_storage_multisample(samples, StorageFormat::Depth24, width, height);
        } else {
            gl.renderbuffer_storage(StorageFormat::Depth24, width, height);
        }

        gl.attach_renderbuffer(AttachmentSlot::Color0, color);
        gl.attach_renderbuffer(AttachmentSlot::Depth, depth);

        debug!(
            "Framebuffer {} allocated ({}x{}, {} sample(s), color rb {}, depth rb {})",
            framebuffer, width, height, samples, color, depth
        );
        Self {
            framebuffer,
            color,
            depth,
            samples,
        }
    }

    /// Deletes both attachments and the framebuffer, resetting every id to
    /// zero so a later reuse starts from an invalid handle.
    fn release<G: GlApi>(&mut self, gl: &mut G) {
        gl.delete_renderbuffers(&[self.color, self.depth]);
        gl.delete_framebuffer(self.framebuffer);
        self.color = 0;
        self.depth = 0;
        self.framebuffer = 0;
        self.samples = 0;
    }

    /// The framebuffer id (zero when unallocated).
    pub fn id(&self) -> u32 {
        self.framebuffer
    }

    /// The color renderbuffer attachment id.
    pub fn color_attachment(&self) -> u32 {
        self.color
    }

    /// The depth renderbuffer attachment id.
    pub fn depth_attachment(&self) -> u32 {
        self.depth
    }

    /// Sample count of the attachments (1 for single-sample storage).
    pub fn samples(&self) -> i32 {
        self.samples
    }

    /// Whether this object currently owns GPU resources.
    pub fn is_allocated(&self) -> bool {
        self.framebuffer != 0
    }
}

/// Provider that renders into a multisampled offscreen framebuffer and
/// presents via resolve, readback, and a CPU-side surface copy.
pub struct FboContextProvider<P: PlatformSurface, G: GlApi> {
    inner: HiddenWindowContextProvider<P, G>,
    draw: FramebufferObject,
    present: FramebufferObject,
    memory_surface: DeviceSurface,
    pixels: PixelBuffer,
}

impl<P: PlatformSurface, G: GlApi> FboContextProvider<P, G> {
    pub fn new(platform: P, gl: G) -> Self {
        Self {
            inner: HiddenWindowContextProvider::new(platform, gl),
            draw: FramebufferObject::default(),
            present: FramebufferObject::default(),
            memory_surface: DeviceSurface::NULL,
            pixels: PixelBuffer::new(0, 0, 32),
        }
    }

    /// Read-only access to the most recently read-back frame, for
    /// collaborators that need direct pixel access (screenshot export).
    pub fn internal_pixel_buffer(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// The multisampled framebuffer rendering goes into.
    pub fn draw_framebuffer(&self) -> FramebufferObject {
        self.draw
    }

    /// The single-sample framebuffer the resolve blit lands in.
    pub fn present_framebuffer(&self) -> FramebufferObject {
        self.present
    }

    /// The hidden-window provider this one presents through.
    pub fn window_provider(&self) -> &HiddenWindowContextProvider<P, G> {
        &self.inner
    }

    /// Allocates the present (single-sample) then draw (multisampled)
    /// framebuffers, leaving the draw framebuffer bound for rendering.
    fn create_framebuffers(&mut self, width: i32, height: i32) {
        let gl = self.inner.gl_mut();
        self.present = FramebufferObject::allocate(gl, width, height, 1);
        self.draw = FramebufferObject::allocate(gl, width, height, RENDERBUFFER_SAMPLES);
    }

    /// Releases both framebuffers and all four renderbuffer attachments,
    /// resetting every id to zero.
    fn destroy_framebuffers(&mut self) {
        let gl = self.inner.gl_mut();
        let mut draw = self.draw;
        let mut present = self.present;
        draw.release(gl);
        present.release(gl);
        self.draw = draw;
        self.present = present;
    }
}

impl<P: PlatformSurface, G: GlApi> RenderContextProvider for FboContextProvider<P, G> {
    fn create(&mut self, config: &SurfaceConfig) -> Result<()> {
        self.inner.create(config)?;

        self.create_framebuffers(config.width, config.height);

        let window_surface = self.inner.surface();
        self.memory_surface = self
            .inner
            .platform_mut()
            .create_memory_surface(window_surface, config.width, config.height, config.bit_depth)
            .context("creating CPU-side presentation surface")?;
        self.pixels = PixelBuffer::new(config.width, config.height, config.bit_depth);

        info!(
            "FBO context created: {}x{} @ {} bpp, draw fb {} ({}x msaa), present fb {}",
            config.width,
            config.height,
            config.bit_depth,
            self.draw.id(),
            self.draw.samples(),
            self.present.id()
        );
        Ok(())
    }

    fn destroy(&mut self) {
        self.destroy_framebuffers();

        self.inner
            .platform_mut()
            .delete_memory_surface(self.memory_surface);
        self.memory_surface = DeviceSurface::NULL;

        self.inner.destroy();
    }

    fn set_dimensions(&mut self, width: i32, height: i32) {
        self.inner.set_dimensions(width, height);

        let bit_depth = self.inner.bit_depth();
        self.pixels.resize(width, height, bit_depth);
        let memory_surface = self.memory_surface;
        self.inner
            .platform_mut()
            .resize_memory_surface(memory_surface, width, height, bit_depth);

        // Full recreation, not in-place storage reallocation; see
        // `FramebufferObject` for why.
        self.destroy_framebuffers();
        self.create_framebuffers(width, height);
    }

    fn make_current(&mut self) {
        self.inner.make_current();
    }

    fn blit(&mut self, target: DeviceSurface) {
        if self.inner.surface().is_null() {
            trace!("blit skipped: null device surface");
            return;
        }
        let (width, height) = (self.inner.width(), self.inner.height());
        let (draw, present) = (self.draw, self.present);

        // Resolve the multisampled color buffer into the present target.
        let gl = self.inner.gl_mut();
        gl.bind_framebuffer(FramebufferBinding::Read, draw.id());
        gl.bind_framebuffer(FramebufferBinding::Draw, present.id());
        gl.blit_color_rect(width, height);

        // Read the resolved pixels back to CPU memory.
        gl.bind_framebuffer(FramebufferBinding::Both, present.id());
        gl.set_read_buffer_color0();
        gl.read_pixels_bgra(width, height, self.pixels.bits_mut());

        // Present through the memory surface.
        let memory_surface = self.memory_surface;
        let platform = self.inner.platform_mut();
        platform.upload_pixels(memory_surface, width, height, self.pixels.bits());
        platform.copy_surface(target, width, height, memory_surface);

        // Subsequent rendering continues into the draw framebuffer.
        self.inner
            .gl_mut()
            .bind_framebuffer(FramebufferBinding::Both, draw.id());
    }
}
