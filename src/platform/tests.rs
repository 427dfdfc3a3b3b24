// src/platform/tests.rs

use super::mock::{MockPlatform, PlatformCall};
use super::{DeviceSurface, FormatFlags, GlContext, PixelFormatRequest, PlatformSurface, WindowHandle};
use anyhow::Result;
use test_log::test;

#[test]
fn it_should_build_the_standard_pixel_format_request() {
    let request = PixelFormatRequest::for_bit_depth(32);
    assert_eq!(request.color_bits, 32);
    assert_eq!(request.depth_bits, 16);
    assert_eq!(request.stencil_bits, 8);
    assert!(request.flags.contains(FormatFlags::DRAW_TO_WINDOW));
    assert!(request.flags.contains(FormatFlags::SUPPORT_OPENGL));
    assert!(request.flags.contains(FormatFlags::DOUBLE_BUFFER));
}

#[test]
fn it_should_treat_zero_as_the_null_handle() {
    assert!(WindowHandle::NULL.is_null());
    assert!(DeviceSurface::default().is_null());
    assert!(!GlContext::from_raw(42).is_null());
    assert_eq!(GlContext::from_raw(42).raw(), 42);
}

#[test]
fn it_should_hand_out_distinct_handles_and_track_liveness() -> Result<()> {
    let mut platform = MockPlatform::new();

    let window = platform.create_window(640, 480)?;
    let surface = platform.acquire_surface(window)?;
    let context = platform.create_context(surface)?;
    assert_ne!(window.raw(), surface.raw());
    assert_ne!(surface.raw(), context.raw());
    assert_eq!(platform.live_window_count(), 1);
    assert_eq!(platform.live_surface_count(), 1);
    assert_eq!(platform.live_context_count(), 1);

    platform.delete_context(context);
    platform.release_surface(window, surface);
    platform.destroy_window(window);
    assert_eq!(platform.live_window_count(), 0);
    assert_eq!(platform.live_surface_count(), 0);
    assert_eq!(platform.live_context_count(), 0);
    Ok(())
}

#[test]
fn it_should_record_platform_calls_in_order() -> Result<()> {
    let mut platform = MockPlatform::new();

    let window = platform.create_window(100, 50)?;
    let surface = platform.acquire_surface(window)?;
    platform.swap_buffers(surface);
    platform.copy_surface(DeviceSurface::from_raw(99), 100, 50, surface);

    assert_eq!(
        platform.calls(),
        &[
            PlatformCall::CreateWindow { width: 100, height: 50 },
            PlatformCall::AcquireSurface(window),
            PlatformCall::SwapBuffers(surface),
            PlatformCall::CopySurface {
                target: DeviceSurface::from_raw(99),
                width: 100,
                height: 50,
                source: surface,
            },
        ]
    );
    Ok(())
}

#[test]
fn it_should_track_memory_surface_dimensions_across_resizes() -> Result<()> {
    let mut platform = MockPlatform::new();

    let memory = platform.create_memory_surface(DeviceSurface::NULL, 8, 4, 32)?;
    assert_eq!(platform.memory_surface_dimensions(memory), Some((8, 4, 32)));

    platform.resize_memory_surface(memory, 16, 2, 32);
    assert_eq!(platform.memory_surface_dimensions(memory), Some((16, 2, 32)));

    platform.delete_memory_surface(memory);
    assert_eq!(platform.live_memory_surface_count(), 0);
    Ok(())
}
