// src/lib.rs

//! Offscreen OpenGL render-context providers for native windowing systems.
//!
//! Two presentation strategies are offered behind the
//! [`RenderContextProvider`] trait:
//!
//! * [`HiddenWindowContextProvider`] renders into the back buffer of a
//!   hidden native window and presents by swapping then copying the front
//!   buffer onto the caller's device surface.
//! * [`FboContextProvider`] renders into a multisampled framebuffer
//!   object, resolves it to a single-sample framebuffer on present, reads
//!   the pixels back, and copies them to the caller's surface through a
//!   CPU-side memory surface.
//!
//! Native windowing and GL access go through the [`platform::PlatformSurface`]
//! and [`gl::GlApi`] traits, so providers are testable without a display
//! and the Win32/WGL backends stay confined to their own modules.

// Declare modules
pub mod config;
pub mod context;
pub mod gl;
pub mod pixel_buffer;
pub mod platform;

pub use config::{GlVersion, SurfaceConfig};
pub use context::{
    FboContextProvider, FramebufferObject, HiddenWindowContextProvider, MultisampleState,
    RenderContextProvider,
};
pub use pixel_buffer::PixelBuffer;
pub use platform::{DeviceSurface, GlContext, WindowHandle};
