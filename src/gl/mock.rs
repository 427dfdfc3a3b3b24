// src/gl/mock.rs

//! Recording mock of the `GlApi` capability surface.
//!
//! Tracks live object names, bindings, and storage allocations the way a GL
//! implementation would, and records the transfer operations so tests can
//! assert on the exact resolve/readback sequence a provider performed.

use super::{AttachmentSlot, FramebufferBinding, GlApi, StorageFormat};
use crate::config::GlVersion;
use crate::platform::{DeviceSurface, GlContext};
use std::collections::{HashMap, HashSet};

/// Storage allocated for a renderbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderbufferStorage {
    pub samples: i32,
    pub format: StorageFormat,
    pub width: i32,
    pub height: i32,
}

/// A recorded resolve blit: (read binding, draw binding, width, height).
pub type ResolveBlit = (u32, u32, i32, i32);

#[derive(Default)]
pub struct MockGl {
    next_id: u32,
    live_framebuffers: HashSet<u32>,
    live_renderbuffers: HashMap<u32, Option<RenderbufferStorage>>,
    attachments: HashMap<u32, HashMap<&'static str, u32>>,
    bound_renderbuffer: u32,
    read_binding: u32,
    draw_binding: u32,
    extensions: Option<String>,
    multisample_formats: HashMap<i32, i32>,
    resolve_blits: Vec<ResolveBlit>,
    read_requests: Vec<(i32, i32, usize)>,
    read_buffer_set: usize,
    upgrades: Vec<GlVersion>,
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extension string the mock advertises (`None` = no query
    /// support at all).
    pub fn set_extensions(&mut self, extensions: Option<&str>) {
        self.extensions = extensions.map(str::to_owned);
    }

    /// Registers a pixel format index for a multisample subsample count.
    pub fn allow_multisample_format(&mut self, samples: i32, format: i32) {
        self.multisample_formats.insert(samples, format);
    }

    /// Ids of all live renderbuffers.
    pub fn live_renderbuffers(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.live_renderbuffers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of live framebuffer objects.
    pub fn live_framebuffer_count(&self) -> usize {
        self.live_framebuffers.len()
    }

    /// The storage allocated for a renderbuffer, if any.
    pub fn storage_of(&self, id: u32) -> Option<RenderbufferStorage> {
        self.live_renderbuffers.get(&id).copied().flatten()
    }

    /// The renderbuffer attached to a slot of a framebuffer.
    pub fn attachment_of(&self, framebuffer: u32, slot: AttachmentSlot) -> Option<u32> {
        self.attachments
            .get(&framebuffer)
            .and_then(|slots| slots.get(slot_name(slot)))
            .copied()
    }

    /// Every recorded resolve blit, oldest first.
    pub fn resolve_blits(&self) -> &[ResolveBlit] {
        &self.resolve_blits
    }

    /// Every recorded pixel readback as (width, height, buffer capacity).
    pub fn read_requests(&self) -> &[(i32, i32, usize)] {
        &self.read_requests
    }

    /// How many times the read buffer was pointed at color attachment 0.
    pub fn read_buffer_set_count(&self) -> usize {
        self.read_buffer_set
    }

    /// Context-version upgrade requests, oldest first.
    pub fn upgrades(&self) -> &[GlVersion] {
        &self.upgrades
    }

    /// The framebuffer currently bound as the draw target.
    pub fn draw_binding(&self) -> u32 {
        self.draw_binding
    }

    fn fresh_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

fn slot_name(slot: AttachmentSlot) -> &'static str {
    match slot {
        AttachmentSlot::Color0 => "color0",
        AttachmentSlot::Depth => "depth",
    }
}

impl GlApi for MockGl {
    fn gen_framebuffer(&mut self) -> u32 {
        let id = self.fresh_id();
        self.live_framebuffers.insert(id);
        id
    }

    fn delete_framebuffer(&mut self, id: u32) {
        self.live_framebuffers.remove(&id);
        self.attachments.remove(&id);
    }

    fn gen_renderbuffer(&mut self) -> u32 {
        let id = self.fresh_id();
        self.live_renderbuffers.insert(id, None);
        id
    }

    fn delete_renderbuffers(&mut self, ids: &[u32]) {
        for id in ids {
            self.live_renderbuffers.remove(id);
        }
    }

    fn bind_framebuffer(&mut self, binding: FramebufferBinding, id: u32) {
        match binding {
            FramebufferBinding::Both => {
                self.read_binding = id;
                self.draw_binding = id;
            }
            FramebufferBinding::Read => self.read_binding = id,
            FramebufferBinding::Draw => self.draw_binding = id,
        }
    }

    fn bind_renderbuffer(&mut self, id: u32) {
        self.bound_renderbuffer = id;
    }

    fn renderbuffer_storage(&mut self, format: StorageFormat, width: i32, height: i32) {
        self.live_renderbuffers.insert(
            self.bound_renderbuffer,
            Some(RenderbufferStorage {
                samples: 1,
                format,
                width,
                height,
            }),
        );
    }

    fn renderbuffer_storage_multisample(
        &mut self,
        samples: i32,
        format: StorageFormat,
        width: i32,
        height: i32,
    ) {
        self.live_renderbuffers.insert(
            self.bound_renderbuffer,
            Some(RenderbufferStorage {
                samples,
                format,
                width,
                height,
            }),
        );
    }

    fn attach_renderbuffer(&mut self, slot: AttachmentSlot, id: u32) {
        self.attachments
            .entry(self.draw_binding)
            .or_default()
            .insert(slot_name(slot), id);
    }

    fn blit_color_rect(&mut self, width: i32, height: i32) {
        self.resolve_blits
            .push((self.read_binding, self.draw_binding, width, height));
    }

    fn set_read_buffer_color0(&mut self) {
        self.read_buffer_set += 1;
    }

    fn read_pixels_bgra(&mut self, width: i32, height: i32, out: &mut [u8]) {
        self.read_requests.push((width, height, out.len()));
        let needed = (width.max(0) as usize) * (height.max(0) as usize) * 4;
        if out.len() >= needed {
            out[..needed].fill(0xAB);
        }
    }

    fn extensions(&mut self) -> Option<String> {
        self.extensions.clone()
    }

    fn choose_multisample_format(&mut self, _surface: DeviceSurface, samples: i32) -> Option<i32> {
        self.multisample_formats.get(&samples).copied()
    }

    fn update_context_version(
        &mut self,
        _surface: DeviceSurface,
        context: GlContext,
        version: GlVersion,
    ) -> GlContext {
        self.upgrades.push(version);
        context
    }

    fn bound_framebuffer(&mut self) -> u32 {
        self.draw_binding
    }
}
