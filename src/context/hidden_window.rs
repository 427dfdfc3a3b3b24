// src/context/hidden_window.rs

//! Render context provider backed by a hidden native window.
//!
//! The window is never shown; it exists so the platform will hand out a
//! device surface with a GL-capable pixel format. Rendering happens into
//! the window's back buffer and `blit` swaps then copies the front buffer
//! onto the caller's target surface.

use crate::config::SurfaceConfig;
use crate::context::provider::RenderContextProvider;
use crate::gl::{GlApi, MULTISAMPLE_EXTENSION};
use crate::platform::{
    DeviceSurface, GlContext, PixelFormatRequest, PlatformSurface, WindowHandle,
};
use anyhow::{anyhow, Result};
use log::{debug, info, trace, warn};

/// Outcome of multisample pixel-format negotiation.
///
/// Negotiation is attempted at most once per provider. When it succeeds,
/// the negotiated format index is used instead of the descriptor path on
/// the next `create`. `create` itself never triggers negotiation or
/// re-creates the context afterwards; a successful negotiation only takes
/// effect if the caller destroys and re-creates the provider by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultisampleState {
    /// Whether a multisample-capable pixel format was found.
    pub supported: bool,
    /// The negotiated format index; meaningless unless `supported`.
    pub format: i32,
}

/// Provider that renders through a hidden, double-buffered native window.
pub struct HiddenWindowContextProvider<P: PlatformSurface, G: GlApi> {
    platform: P,
    gl: G,
    window: WindowHandle,
    surface: DeviceSurface,
    context: GlContext,
    width: i32,
    height: i32,
    bit_depth: u8,
    multisample: MultisampleState,
    /// GDI drawing can be layered on top of GL output for this provider.
    gdi_drawing_enabled: bool,
}

impl<P: PlatformSurface, G: GlApi> HiddenWindowContextProvider<P, G> {
    pub fn new(platform: P, gl: G) -> Self {
        Self {
            platform,
            gl,
            window: WindowHandle::NULL,
            surface: DeviceSurface::NULL,
            context: GlContext::NULL,
            width: 0,
            height: 0,
            bit_depth: 0,
            multisample: MultisampleState::default(),
            gdi_drawing_enabled: true,
        }
    }

    /// Probes for a multisample-capable pixel format.
    ///
    /// Checks the capability string for the multisample extension token,
    /// then queries for a 4-subsample format, falling back to 2 subsamples.
    /// On any miss, multisampling stays disabled and the standard
    /// descriptor path remains active. Returns the final `supported` state.
    pub fn negotiate_multisample(&mut self) -> bool {
        let has_extension = self
            .gl
            .extensions()
            .map(|s| s.split_whitespace().any(|token| token == MULTISAMPLE_EXTENSION))
            .unwrap_or(false);
        if !has_extension {
            debug!("{} not advertised; multisampling disabled", MULTISAMPLE_EXTENSION);
            self.multisample = MultisampleState::default();
            return false;
        }

        for samples in [4, 2] {
            if let Some(format) = self.gl.choose_multisample_format(self.surface, samples) {
                info!(
                    "Negotiated {}x multisample pixel format (index {})",
                    samples, format
                );
                self.multisample = MultisampleState {
                    supported: true,
                    format,
                };
                return true;
            }
            debug!("No pixel format with {} subsamples", samples);
        }

        self.multisample = MultisampleState::default();
        false
    }

    /// The negotiation outcome, for capability probing and tests.
    pub fn multisample_state(&self) -> MultisampleState {
        self.multisample
    }

    /// Whether GDI drawing may be layered over GL output.
    pub fn gdi_drawing_enabled(&self) -> bool {
        self.gdi_drawing_enabled
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// The device surface of the hidden window.
    pub fn surface(&self) -> DeviceSurface {
        self.surface
    }

    /// The GL context handle.
    pub fn context(&self) -> GlContext {
        self.context
    }

    /// Read-only access to the GL capability surface.
    pub fn gl(&self) -> &G {
        &self.gl
    }

    /// Read-only access to the platform backend.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub(crate) fn gl_mut(&mut self) -> &mut G {
        &mut self.gl
    }

    pub(crate) fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

impl<P: PlatformSurface, G: GlApi> RenderContextProvider for HiddenWindowContextProvider<P, G> {
    fn create(&mut self, config: &SurfaceConfig) -> Result<()> {
        self.width = config.width;
        self.height = config.height;
        self.bit_depth = config.bit_depth;

        self.window = self.platform.create_window(config.width, config.height)?;
        self.surface = self.platform.acquire_surface(self.window)?;

        let request = PixelFormatRequest::for_bit_depth(config.bit_depth);
        let format = if self.multisample.supported {
            self.multisample.format
        } else {
            self.platform.choose_pixel_format(self.surface, &request)
        };
        if format == 0 {
            return Err(anyhow!(
                "no compatible pixel format for {} bpp",
                config.bit_depth
            ));
        }
        if !self.platform.assign_pixel_format(self.surface, format, &request) {
            return Err(anyhow!("pixel format {} was rejected by the platform", format));
        }

        self.context = self.platform.create_context(self.surface)?;
        self.make_current();

        // Upgrade the legacy context to the requested version where the
        // driver supports it.
        self.context =
            self.gl
                .update_context_version(self.surface, self.context, config.gl_version);

        info!(
            "Hidden-window context created: {}x{} @ {} bpp, {:?}",
            config.width, config.height, config.bit_depth, config.gl_version
        );
        Ok(())
    }

    fn destroy(&mut self) {
        self.platform.release_surface(self.window, self.surface);
        self.surface = DeviceSurface::NULL;

        self.platform.destroy_window(self.window);
        self.window = WindowHandle::NULL;

        self.platform.delete_context(self.context);
        self.context = GlContext::NULL;
        debug!("Hidden-window context destroyed");
    }

    fn set_dimensions(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.platform.resize_window(self.window, width, height);
    }

    fn make_current(&mut self) {
        if self.context.is_null() {
            trace!("make_current skipped: null context");
            return;
        }
        self.platform.make_current(self.surface, self.context);
    }

    fn blit(&mut self, target: DeviceSurface) {
        if self.surface.is_null() || target.is_null() {
            trace!("blit skipped: null surface handle");
            return;
        }
        self.platform.swap_buffers(self.surface);
        self.platform
            .copy_surface(target, self.width, self.height, self.surface);
    }
}

impl<P: PlatformSurface, G: GlApi> Drop for HiddenWindowContextProvider<P, G> {
    fn drop(&mut self) {
        if !self.window.is_null() || !self.context.is_null() {
            warn!("HiddenWindowContextProvider dropped without destroy(); native resources may leak");
        }
    }
}
