// src/config.rs

//! Defines the configuration structures for render context creation.
//!
//! A `SurfaceConfig` carries everything a provider needs to build its native
//! surface and GL context: the requested OpenGL version, the surface
//! dimensions in pixels, and the color bit depth. The struct can be
//! deserialized from a configuration file (e.g., TOML, JSON) so host
//! applications can expose these settings to users; sensible defaults are
//! provided for every field.

use serde::{Deserialize, Serialize};

/// The OpenGL version a caller requests for a render context.
///
/// The base context created through the platform's pixel-format path is a
/// legacy (2.1-level) context; after it is made current, the GL layer is
/// asked to upgrade it to the requested version where the driver supports
/// attribute-based context creation. When the upgrade is unavailable the
/// base context is kept and the request degrades silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum GlVersion {
    /// Legacy fixed-function-era context. Never needs an upgrade call.
    OpenGl2_1,
    /// First core-profile version with framebuffer objects in core.
    #[default]
    OpenGl3_0,
    /// Highest version the provider will request by name.
    OpenGl4_4,
}

impl GlVersion {
    /// The (major, minor) pair handed to attribute-based context creation.
    pub fn major_minor(self) -> (i32, i32) {
        match self {
            GlVersion::OpenGl2_1 => (2, 1),
            GlVersion::OpenGl3_0 => (3, 0),
            GlVersion::OpenGl4_4 => (4, 4),
        }
    }

    /// Whether this version requires an upgraded (attribute-created) context.
    pub fn requires_upgrade(self) -> bool {
        self > GlVersion::OpenGl2_1
    }
}

/// Parameters for creating a render surface and its GL context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// The OpenGL version to request once the base context is current.
    pub gl_version: GlVersion,
    /// Surface width in pixels. Must be positive.
    pub width: i32,
    /// Surface height in pixels. Must be positive.
    pub height: i32,
    /// Color depth in bits per pixel (usually 24 or 32).
    pub bit_depth: u8,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            gl_version: GlVersion::default(),
            width: 800,
            height: 600,
            bit_depth: 32,
        }
    }
}

impl SurfaceConfig {
    /// Bytes per pixel implied by the configured bit depth, never less
    /// than one byte.
    pub fn bytes_per_pixel(&self) -> usize {
        ((self.bit_depth as usize) / 8).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_default_to_800x600_32bit_gl30() {
        let config = SurfaceConfig::default();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.bit_depth, 32);
        assert_eq!(config.gl_version, GlVersion::OpenGl3_0);
    }

    #[test]
    fn it_should_compute_bytes_per_pixel_from_bit_depth() {
        let mut config = SurfaceConfig::default();
        assert_eq!(config.bytes_per_pixel(), 4);
        config.bit_depth = 24;
        assert_eq!(config.bytes_per_pixel(), 3);
        // Degenerate depths still reserve at least one byte per pixel.
        config.bit_depth = 0;
        assert_eq!(config.bytes_per_pixel(), 1);
    }

    #[test]
    fn it_should_only_require_upgrade_above_legacy_versions() {
        assert!(!GlVersion::OpenGl2_1.requires_upgrade());
        assert!(GlVersion::OpenGl3_0.requires_upgrade());
        assert!(GlVersion::OpenGl4_4.requires_upgrade());
        assert_eq!(GlVersion::OpenGl4_4.major_minor(), (4, 4));
    }
}
