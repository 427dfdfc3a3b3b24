// src/gl/wgl.rs
#![allow(non_snake_case)] // Allow non-snake case for GL entry point types

//! WGL-backed implementation of `GlApi`.
//!
//! OpenGL 1.1 entry points come straight from opengl32.dll; everything newer
//! (framebuffer objects, multisample storage, framebuffer blits, the WGL ARB
//! extensions) must be resolved through `wglGetProcAddress` after a context
//! has been made current. Resolution happens lazily on first use and the
//! function table is kept for the life of the API object.

use super::{AttachmentSlot, FramebufferBinding, GlApi, StorageFormat};
use crate::config::GlVersion;
use crate::platform::{DeviceSurface, GlContext};
use anyhow::{anyhow, Result};
use log::{debug, error, info, warn};
use std::ffi::{c_char, c_void, CStr, CString};
use std::mem;

use windows_sys::Win32::Graphics::OpenGL::{
    glGetIntegerv, glGetString, glReadBuffer, glReadPixels, wglDeleteContext, wglGetCurrentDC,
    wglGetProcAddress, wglMakeCurrent,
};
use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleW, GetProcAddress};

// GL constants beyond the 1.1 header.
const GL_EXTENSIONS: u32 = 0x1F03;
const GL_UNSIGNED_BYTE: u32 = 0x1401;
const GL_NEAREST: u32 = 0x2600;
const GL_COLOR_BUFFER_BIT: u32 = 0x0000_4000;
const GL_BGRA: u32 = 0x80E1;
const GL_RGBA: u32 = 0x1908;
const GL_DEPTH_COMPONENT24: u32 = 0x81A6;
const GL_FRAMEBUFFER: u32 = 0x8D40;
const GL_READ_FRAMEBUFFER: u32 = 0x8CA8;
const GL_DRAW_FRAMEBUFFER: u32 = 0x8CA9;
const GL_RENDERBUFFER: u32 = 0x8D41;
const GL_COLOR_ATTACHMENT0: u32 = 0x8CE0;
const GL_DEPTH_ATTACHMENT: u32 = 0x8D00;
const GL_FRAMEBUFFER_BINDING: u32 = 0x8CA6;

// WGL_ARB_pixel_format attribute names.
const WGL_DRAW_TO_WINDOW_ARB: i32 = 0x2001;
const WGL_ACCELERATION_ARB: i32 = 0x2003;
const WGL_SUPPORT_OPENGL_ARB: i32 = 0x2010;
const WGL_DOUBLE_BUFFER_ARB: i32 = 0x2011;
const WGL_COLOR_BITS_ARB: i32 = 0x2014;
const WGL_ALPHA_BITS_ARB: i32 = 0x201B;
const WGL_DEPTH_BITS_ARB: i32 = 0x2022;
const WGL_STENCIL_BITS_ARB: i32 = 0x2023;
const WGL_FULL_ACCELERATION_ARB: i32 = 0x2027;
const WGL_SAMPLE_BUFFERS_ARB: i32 = 0x2041;
const WGL_SAMPLES_ARB: i32 = 0x2042;

// WGL_ARB_create_context attribute names.
const WGL_CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
const WGL_CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;

type GenObjectsFn = unsafe extern "system" fn(i32, *mut u32);
type DeleteObjectsFn = unsafe extern "system" fn(i32, *const u32);
type BindObjectFn = unsafe extern "system" fn(u32, u32);
type RenderbufferStorageFn = unsafe extern "system" fn(u32, u32, i32, i32);
type RenderbufferStorageMultisampleFn = unsafe extern "system" fn(u32, i32, u32, i32, i32);
type FramebufferRenderbufferFn = unsafe extern "system" fn(u32, u32, u32, u32);
type BlitFramebufferFn =
    unsafe extern "system" fn(i32, i32, i32, i32, i32, i32, i32, i32, u32, u32);
type GetExtensionsStringFn = unsafe extern "system" fn(isize) -> *const c_char;
type ChoosePixelFormatArbFn =
    unsafe extern "system" fn(isize, *const i32, *const f32, u32, *mut i32, *mut u32) -> i32;
type CreateContextAttribsFn = unsafe extern "system" fn(isize, isize, *const i32) -> isize;

/// Extension entry points resolved against the current context.
struct ExtFns {
    gen_framebuffers: GenObjectsFn,
    delete_framebuffers: DeleteObjectsFn,
    gen_renderbuffers: GenObjectsFn,
    delete_renderbuffers: DeleteObjectsFn,
    bind_framebuffer: BindObjectFn,
    bind_renderbuffer: BindObjectFn,
    renderbuffer_storage: RenderbufferStorageFn,
    renderbuffer_storage_multisample: RenderbufferStorageMultisampleFn,
    framebuffer_renderbuffer: FramebufferRenderbufferFn,
    blit_framebuffer: BlitFramebufferFn,
    get_extensions_string_arb: Option<GetExtensionsStringFn>,
    choose_pixel_format_arb: Option<ChoosePixelFormatArbFn>,
    create_context_attribs_arb: Option<CreateContextAttribsFn>,
}

/// `GlApi` over the live WGL/OpenGL entry points.
///
/// A context must be current on the calling thread before any method other
/// than construction is used; entry-point resolution depends on it.
#[derive(Default)]
pub struct WglApi {
    fns: Option<ExtFns>,
    load_failed: bool,
}

impl WglApi {
    pub fn new() -> Self {
        Self {
            fns: None,
            load_failed: false,
        }
    }

    /// Resolves a GL entry point: `wglGetProcAddress` first, opengl32.dll
    /// exports as the fallback for 1.1-era names.
    fn resolve(name: &str) -> Option<*const c_void> {
        let c_name = CString::new(name).ok()?;
        // SAFETY: c_name is a valid nul-terminated string.
        let proc = unsafe { wglGetProcAddress(c_name.as_ptr() as *const u8) };
        // wglGetProcAddress signals failure with null or the documented
        // sentinel values; fall back to the opengl32.dll exports for
        // 1.1-era names.
        let raw = proc.map_or(0isize, |f| f as isize);
        if raw != 0 && raw != 1 && raw != 2 && raw != 3 && raw != -1 {
            return Some(raw as *const c_void);
        }
        let module_name: Vec<u16> = "opengl32.dll\0".encode_utf16().collect();
        // SAFETY: module_name is nul-terminated and outlives both calls.
        unsafe {
            let module = GetModuleHandleW(module_name.as_ptr());
            GetProcAddress(module, c_name.as_ptr() as *const u8).map(|f| f as *const c_void)
        }
    }

    fn resolve_required<T>(name: &str) -> Result<T> {
        let ptr = Self::resolve(name)
            .ok_or_else(|| anyhow!("required GL entry point {} is unavailable", name))?;
        // SAFETY: T is an extern "system" fn pointer type of matching shape.
        Ok(unsafe { mem::transmute_copy::<*const c_void, T>(&ptr) })
    }

    fn resolve_optional<T>(name: &str) -> Option<T> {
        let ptr = Self::resolve(name)?;
        // SAFETY: T is an extern "system" fn pointer type of matching shape.
        Some(unsafe { mem::transmute_copy::<*const c_void, T>(&ptr) })
    }

    fn load() -> Result<ExtFns> {
        info!("Resolving framebuffer-object and WGL extension entry points");
        Ok(ExtFns {
            gen_framebuffers: Self::resolve_required("glGenFramebuffers")?,
            delete_framebuffers: Self::resolve_required("glDeleteFramebuffers")?,
            gen_renderbuffers: Self::resolve_required("glGenRenderbuffers")?,
            delete_renderbuffers: Self::resolve_required("glDeleteRenderbuffers")?,
            bind_framebuffer: Self::resolve_required("glBindFramebuffer")?,
            bind_renderbuffer: Self::resolve_required("glBindRenderbuffer")?,
            renderbuffer_storage: Self::resolve_required("glRenderbufferStorage")?,
            renderbuffer_storage_multisample: Self::resolve_required(
                "glRenderbufferStorageMultisample",
            )?,
            framebuffer_renderbuffer: Self::resolve_required("glFramebufferRenderbuffer")?,
            blit_framebuffer: Self::resolve_required("glBlitFramebuffer")?,
            get_extensions_string_arb: Self::resolve_optional("wglGetExtensionsStringARB"),
            choose_pixel_format_arb: Self::resolve_optional("wglChoosePixelFormatARB"),
            create_context_attribs_arb: Self::resolve_optional("wglCreateContextAttribsARB"),
        })
    }

    /// The resolved function table, loading it on first use. Returns `None`
    /// (once, with an error log) when the driver lacks FBO support.
    fn fns(&mut self) -> Option<&ExtFns> {
        if self.fns.is_none() && !self.load_failed {
            match Self::load() {
                Ok(fns) => self.fns = Some(fns),
                Err(e) => {
                    error!("GL entry point resolution failed: {:#}", e);
                    self.load_failed = true;
                }
            }
        }
        self.fns.as_ref()
    }
}

impl GlApi for WglApi {
    fn gen_framebuffer(&mut self) -> u32 {
        let Some(fns) = self.fns() else { return 0 };
        let mut id = 0u32;
        // SAFETY: resolved entry point; `id` is a valid out pointer.
        unsafe { (fns.gen_framebuffers)(1, &mut id) };
        id
    }

    fn delete_framebuffer(&mut self, id: u32) {
        let Some(fns) = self.fns() else { return };
        // SAFETY: resolved entry point.
        unsafe { (fns.delete_framebuffers)(1, &id) };
    }

    fn gen_renderbuffer(&mut self) -> u32 {
        let Some(fns) = self.fns() else { return 0 };
        let mut id = 0u32;
        // SAFETY: resolved entry point; `id` is a valid out pointer.
        unsafe { (fns.gen_renderbuffers)(1, &mut id) };
        id
    }

    fn delete_renderbuffers(&mut self, ids: &[u32]) {
        let Some(fns) = self.fns() else { return };
        // SAFETY: resolved entry point; `ids` is a valid slice.
        unsafe { (fns.delete_renderbuffers)(ids.len() as i32, ids.as_ptr()) };
    }

    fn bind_framebuffer(&mut self, binding: FramebufferBinding, id: u32) {
        let Some(fns) = self.fns() else { return };
        let target = match binding {
            FramebufferBinding::Both => GL_FRAMEBUFFER,
            FramebufferBinding::Read => GL_READ_FRAMEBUFFER,
            FramebufferBinding::Draw => GL_DRAW_FRAMEBUFFER,
        };
        // SAFETY: resolved entry point.
        unsafe { (fns.bind_framebuffer)(target, id) };
    }

    fn bind_renderbuffer(&mut self, id: u32) {
        let Some(fns) = self.fns() else { return };
        // SAFETY: resolved entry point.
        unsafe { (fns.bind_renderbuffer)(GL_RENDERBUFFER, id) };
    }

    fn renderbuffer_storage(&mut self, format: StorageFormat, width: i32, height: i32) {
        let Some(fns) = self.fns() else { return };
        // SAFETY: resolved entry point.
        unsafe { (fns.renderbuffer_storage)(GL_RENDERBUFFER, gl_format(format), width, height) };
    }

    fn renderbuffer_storage_multisample(
        &mut self,
        samples: i32,
        format: StorageFormat,
        width: i32,
        height: i32,
    ) {
        let Some(fns) = self.fns() else { return };
        // SAFETY: resolved entry point.
        unsafe {
            (fns.renderbuffer_storage_multisample)(
                GL_RENDERBUFFER,
                samples,
                gl_format(format),
                width,
                height,
            )
        };
    }

    fn attach_renderbuffer(&mut self, slot: AttachmentSlot, id: u32) {
        let Some(fns) = self.fns() else { return };
        let attachment = match slot {
            AttachmentSlot::Color0 => GL_COLOR_ATTACHMENT0,
            AttachmentSlot::Depth => GL_DEPTH_ATTACHMENT,
        };
        // SAFETY: resolved entry point.
        unsafe { (fns.framebuffer_renderbuffer)(GL_FRAMEBUFFER, attachment, GL_RENDERBUFFER, id) };
    }

    fn blit_color_rect(&mut self, width: i32, height: i32) {
        let Some(fns) = self.fns() else { return };
        // SAFETY: resolved entry point.
        unsafe {
            (fns.blit_framebuffer)(
                0,
                0,
                width,
                height,
                0,
                0,
                width,
                height,
                GL_COLOR_BUFFER_BIT,
                GL_NEAREST,
            )
        };
    }

    fn set_read_buffer_color0(&mut self) {
        // SAFETY: opengl32 export; a context is current.
        unsafe { glReadBuffer(GL_COLOR_ATTACHMENT0) };
    }

    fn read_pixels_bgra(&mut self, width: i32, height: i32, out: &mut [u8]) {
        let needed = (width.max(0) as usize) * (height.max(0) as usize) * 4;
        if out.len() < needed {
            warn!(
                "read_pixels_bgra skipped: buffer holds {} bytes, {} needed",
                out.len(),
                needed
            );
            return;
        }
        // SAFETY: opengl32 export; `out` holds at least `needed` bytes.
        unsafe {
            glReadPixels(
                0,
                0,
                width,
                height,
                GL_BGRA,
                GL_UNSIGNED_BYTE,
                out.as_mut_ptr() as *mut c_void,
            )
        };
    }

    fn extensions(&mut self) -> Option<String> {
        if let Some(get_extensions) = self.fns().and_then(|f| f.get_extensions_string_arb) {
            // SAFETY: resolved entry point; the current DC is valid.
            let ptr = unsafe { get_extensions(wglGetCurrentDC()) };
            if !ptr.is_null() {
                // SAFETY: the driver returns a nul-terminated string.
                return Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned());
            }
        }
        // Fall back to the core extension string.
        // SAFETY: opengl32 export; a context is current.
        let ptr = unsafe { glGetString(GL_EXTENSIONS) };
        if ptr.is_null() {
            return None;
        }
        // SAFETY: the driver returns a nul-terminated string.
        Some(
            unsafe { CStr::from_ptr(ptr as *const c_char) }
                .to_string_lossy()
                .into_owned(),
        )
    }

    fn choose_multisample_format(&mut self, surface: DeviceSurface, samples: i32) -> Option<i32> {
        let choose = self.fns().and_then(|f| f.choose_pixel_format_arb)?;

        let attributes = [
            WGL_DRAW_TO_WINDOW_ARB,
            1,
            WGL_SUPPORT_OPENGL_ARB,
            1,
            WGL_ACCELERATION_ARB,
            WGL_FULL_ACCELERATION_ARB,
            WGL_COLOR_BITS_ARB,
            24,
            WGL_ALPHA_BITS_ARB,
            8,
            WGL_DEPTH_BITS_ARB,
            16,
            WGL_STENCIL_BITS_ARB,
            0,
            WGL_DOUBLE_BUFFER_ARB,
            1,
            WGL_SAMPLE_BUFFERS_ARB,
            1,
            WGL_SAMPLES_ARB,
            samples,
            0,
            0,
        ];
        let float_attributes = [0f32, 0f32];

        let mut format = 0i32;
        let mut format_count = 0u32;
        // SAFETY: resolved entry point with valid attribute lists and out
        // pointers.
        let valid = unsafe {
            choose(
                surface.raw(),
                attributes.as_ptr(),
                float_attributes.as_ptr(),
                1,
                &mut format,
                &mut format_count,
            )
        } != 0;

        if valid && format_count >= 1 {
            debug!("{}x multisample pixel format found: {}", samples, format);
            Some(format)
        } else {
            None
        }
    }

    fn update_context_version(
        &mut self,
        surface: DeviceSurface,
        context: GlContext,
        version: GlVersion,
    ) -> GlContext {
        if !version.requires_upgrade() {
            return context;
        }
        let Some(create) = self.fns().and_then(|f| f.create_context_attribs_arb) else {
            warn!("wglCreateContextAttribsARB unavailable; keeping legacy context");
            return context;
        };

        let (major, minor) = version.major_minor();
        let attributes = [
            WGL_CONTEXT_MAJOR_VERSION_ARB,
            major,
            WGL_CONTEXT_MINOR_VERSION_ARB,
            minor,
            0,
        ];
        // SAFETY: resolved entry point; surface and context are live.
        let upgraded = unsafe { create(surface.raw(), 0, attributes.as_ptr()) };
        if upgraded == 0 {
            warn!("Context upgrade to {:?} failed; keeping legacy context", version);
            return context;
        }

        // SAFETY: swapping currency to the upgraded context before deleting
        // the legacy one.
        unsafe {
            wglMakeCurrent(surface.raw(), upgraded);
            wglDeleteContext(context.raw());
        }
        info!("Context upgraded to {:?} (HGLRC: {:#x})", version, upgraded);
        GlContext::from_raw(upgraded)
    }

    fn bound_framebuffer(&mut self) -> u32 {
        let mut value = 0i32;
        // SAFETY: opengl32 export; `value` is a valid out pointer.
        unsafe { glGetIntegerv(GL_FRAMEBUFFER_BINDING, &mut value) };
        value as u32
    }
}

fn gl_format(format: StorageFormat) -> u32 {
    match format {
        StorageFormat::Rgba => GL_RGBA,
        StorageFormat::Depth24 => GL_DEPTH_COMPONENT24,
    }
}
