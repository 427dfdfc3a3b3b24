// src/context/mod.rs

//! Render context providers.
//!
//! - `RenderContextProvider`: the contract every provider implements
//! - `HiddenWindowContextProvider`: renders through a hidden native window
//! - `FboContextProvider`: renders offscreen into a multisampled
//!   framebuffer object and presents via readback

pub mod fbo;
pub mod hidden_window;
pub mod provider;

pub use fbo::{FboContextProvider, FramebufferObject};
pub use hidden_window::{HiddenWindowContextProvider, MultisampleState};
pub use provider::RenderContextProvider;
