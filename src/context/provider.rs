// src/context/provider.rs

//! The `RenderContextProvider` trait: the contract between a host
//! application and a render surface.
//!
//! Each provider variant implements this trait directly; the FBO variant
//! holds a hidden-window provider internally rather than extending it, so
//! delegation is explicit and per-operation.

use crate::config::SurfaceConfig;
use crate::platform::DeviceSurface;
use anyhow::Result;

/// A render surface bound to an OpenGL context.
///
/// Lifecycle: `create` once, `make_current` before issuing draw calls,
/// `blit` per frame to present, `set_dimensions` on resize, `destroy` to
/// release every GPU and OS resource. A provider instance is owned by
/// exactly one logical thread; resize and destroy must be serialized with
/// in-flight rendering by the caller.
pub trait RenderContextProvider {
    /// Creates the native surface, selects a pixel format, and binds a GL
    /// context to it.
    ///
    /// Fails when no compatible pixel format exists or the platform rejects
    /// the pixel-format assignment. Partially-acquired resources are kept
    /// until an explicit `destroy`; there is no automatic rollback.
    fn create(&mut self, config: &SurfaceConfig) -> Result<()>;

    /// Releases every GPU and OS resource the provider owns. Idempotent.
    fn destroy(&mut self);

    /// Updates the stored dimensions and resizes the native surface and any
    /// offscreen resources to match.
    fn set_dimensions(&mut self, width: i32, height: i32);

    /// Makes the provider's GL context current on the calling thread.
    /// No-op when the context handle is null.
    fn make_current(&mut self);

    /// Presents the most recently rendered frame onto `target`.
    /// No-op when the required surface handles are null.
    fn blit(&mut self, target: DeviceSurface);
}
