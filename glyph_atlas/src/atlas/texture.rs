// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph textures and the GPU backend seam.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

use fontcover::{GlyphCache, GlyphMetrics};
use hashbrown::HashMap;

use super::packer::{AtlasRect, GlyphPacker, TexCoords};
use crate::generator::{GenerationListener, GlyphGenerationData, GlyphGenerator};

/// Identifies a texture allocated by a [`TextureBackend`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureHandle(pub u64);

/// The GPU side of glyph textures.
///
/// Only called from [`TextureManager::update_dynamic_textures`](crate::TextureManager::update_dynamic_textures),
/// on the thread that owns the graphics context.
pub trait TextureBackend {
    /// Creates an empty single channel texture.
    fn allocate_texture(&mut self, width: u32, height: u32) -> TextureHandle;

    /// Writes `data`, `rect.width * rect.height` bytes in rows, into `rect`.
    fn upload_region(&mut self, texture: TextureHandle, rect: AtlasRect, data: &[u8]);

    /// Submits the uploads issued since the last flush.
    fn flush(&mut self);

    /// Returns true if uploads are visible as soon as they are flushed.
    ///
    /// Backends that apply uploads later keep the frame loop redrawing for
    /// a grace period after the last upload.
    fn uploads_are_synchronous(&self) -> bool;
}

/// Where a glyph lives in a texture and how to place it.
#[derive(Clone, Copy, Debug)]
pub struct GlyphInfo {
    /// Texels reserved for the glyph.
    pub rect: AtlasRect,
    /// Normalized texture coordinates of `rect`.
    pub tex_coords: TexCoords,
    /// Placement metrics.
    pub metrics: GlyphMetrics,
}

/// Remaining room in a texture, as seen by the group allocator.
pub trait AtlasSpace {
    /// Returns true if `count` more average sized glyphs would fit.
    fn has_enough_space(&self, count: u32) -> bool;
}

impl<T: AtlasSpace + ?Sized> AtlasSpace for Arc<T> {
    fn has_enough_space(&self, count: u32) -> bool {
        (**self).has_enough_space(count)
    }
}

type GlyphKey = (u32, i32);

struct IndexState {
    packer: GlyphPacker,
    glyphs: HashMap<GlyphKey, GlyphInfo>,
}

/// Packaged glyphs waiting to be written to the GPU.
#[derive(Default)]
struct PendingUploads {
    glyphs: Mutex<Vec<GlyphGenerationData>>,
}

impl PendingUploads {
    fn lock(&self) -> MutexGuard<'_, Vec<GlyphGenerationData>> {
        self.glyphs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GenerationListener for PendingUploads {
    fn on_glyphs_generated(&self, glyphs: Vec<GlyphGenerationData>) {
        self.lock().extend(glyphs);
    }
}

/// A glyph texture: an index of packed glyphs plus the uploads that have
/// not reached the GPU yet.
pub struct FontTexture {
    id: u32,
    width: u32,
    height: u32,
    // Side of the square used to estimate remaining space.
    average_glyph_size: u32,
    state: Mutex<IndexState>,
    pending: Arc<PendingUploads>,
    handle: Mutex<Option<TextureHandle>>,
}

impl FontTexture {
    /// Creates an empty texture. `base_glyph_height` sizes the squares
    /// remaining space is estimated in.
    pub fn new(id: u32, width: u32, height: u32, base_glyph_height: u32) -> Self {
        Self {
            id,
            width,
            height,
            average_glyph_size: base_glyph_height + base_glyph_height / 2,
            state: Mutex::new(IndexState {
                packer: GlyphPacker::new(width, height),
                glyphs: HashMap::new(),
            }),
            pending: Arc::default(),
            handle: Mutex::new(None),
        }
    }

    /// Identifier assigned by the texture manager, stable for the texture's
    /// lifetime.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The GPU texture, once the first update has allocated it.
    pub fn handle(&self) -> Option<TextureHandle> {
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of glyphs in the index.
    pub fn glyph_count(&self) -> usize {
        self.lock_state().glyphs.len()
    }

    /// Number of packaged glyphs waiting for upload.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns the index entry of every character of `text`, rasterizing
    /// and scheduling the ones not present yet.
    ///
    /// The flag is true if any entry was added. A glyph that does not fit
    /// is replaced by the invalid glyph, if that one is already present.
    pub fn find_resources(
        &self,
        text: &str,
        fixed_size: i32,
        cache: &GlyphCache,
        generator: &dyn GlyphGenerator,
    ) -> (Vec<GlyphInfo>, bool) {
        let mut state = self.lock_state();
        let mut has_new = false;
        let infos = text
            .chars()
            .map(|c| {
                let key = (u32::from(c), fixed_size);
                if let Some(info) = state.glyphs.get(&key) {
                    return *info;
                }
                let (info, is_new) = self.map_resource(&mut state, key, c, cache, generator);
                has_new |= is_new;
                info
            })
            .collect();
        (infos, has_new)
    }

    fn map_resource(
        &self,
        state: &mut IndexState,
        key: GlyphKey,
        c: char,
        cache: &GlyphCache,
        generator: &dyn GlyphGenerator,
    ) -> (GlyphInfo, bool) {
        let glyph = cache.glyph(c, key.1);
        let Some(rect) = state.packer.pack(glyph.image.width, glyph.image.height) else {
            if glyph.metrics.is_valid {
                log::warn!(
                    "glyph packer could not pack {:#x} ({}x{}) into a {}x{} texture",
                    key.0,
                    glyph.image.width,
                    glyph.image.height,
                    self.width,
                    self.height
                );
            }
            let invalid = cache.invalid_glyph(key.1);
            let info = state
                .glyphs
                .get(&invalid.key())
                .copied()
                .unwrap_or(GlyphInfo {
                    rect: AtlasRect::default(),
                    tex_coords: TexCoords::default(),
                    metrics: invalid.metrics,
                });
            return (info, false);
        };

        let info = GlyphInfo {
            rect,
            tex_coords: state.packer.map_texture_coords(rect),
            metrics: glyph.metrics,
        };
        state.glyphs.insert(key, info);
        if glyph.image.is_empty() {
            // Nothing to upload.
            cache.mark_glyph_ready(&glyph);
        } else {
            log::trace!("scheduling glyph {:#x} into texture {}", key.0, self.id);
            let listener: Arc<dyn GenerationListener> = self.pending.clone();
            generator.schedule(listener, GlyphGenerationData { rect, glyph });
        }
        (info, true)
    }

    /// Uploads every packaged glyph, allocating the GPU texture first if
    /// needed, and marks the uploaded glyphs ready.
    pub fn update_state(&self, backend: &mut dyn TextureBackend, cache: &GlyphCache) {
        let handle = {
            let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
            *handle.get_or_insert_with(|| backend.allocate_texture(self.width, self.height))
        };
        let pending = core::mem::take(&mut *self.pending.lock());
        for data in pending {
            let GlyphGenerationData { rect, glyph } = data;
            let len = rect.width as usize * rect.height as usize;
            if let Some(bytes) = glyph.image.bytes().get(..len) {
                if len > 0 {
                    backend.upload_region(handle, rect, bytes);
                }
            }
            cache.mark_glyph_ready(&glyph);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AtlasSpace for FontTexture {
    fn has_enough_space(&self, count: u32) -> bool {
        let state = self.lock_state();
        !state.packer.is_full()
            && state
                .packer
                .can_be_packed(count, self.average_glyph_size, self.average_glyph_size)
    }
}

impl Debug for FontTexture {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontTexture")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("handle", &self.handle())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ImmediateGlyphGenerator;
    use fontcover::testing::{SyntheticFont, SyntheticRasterizer};
    use fontcover::{GlyphCacheConfig, SDF_GLYPH_SIZE, UnicodeBlock};

    #[derive(Default)]
    struct RecordingBackend {
        allocated: Vec<(u32, u32)>,
        uploads: Vec<(TextureHandle, AtlasRect, usize)>,
    }

    impl TextureBackend for RecordingBackend {
        fn allocate_texture(&mut self, width: u32, height: u32) -> TextureHandle {
            self.allocated.push((width, height));
            TextureHandle(self.allocated.len() as u64)
        }

        fn upload_region(&mut self, texture: TextureHandle, rect: AtlasRect, data: &[u8]) {
            self.uploads.push((texture, rect, data.len()));
        }

        fn flush(&mut self) {}

        fn uploads_are_synchronous(&self) -> bool {
            true
        }
    }

    fn cache() -> GlyphCache {
        GlyphCache::new(
            GlyphCacheConfig {
                blocks: alloc::vec![UnicodeBlock::new("Basic_Latin", 0x00, 0x7F)],
                fonts: alloc::vec![SyntheticFont::new("latin").with_range(' '..='~').to_source()],
                ..GlyphCacheConfig::default()
            },
            &SyntheticRasterizer,
        )
    }

    #[test]
    fn glyphs_are_indexed_once_and_uploaded() {
        let cache = cache();
        let generator = ImmediateGlyphGenerator::new(cache.sdf_scale());
        let texture = FontTexture::new(0, 256, 256, cache.base_glyph_height());

        let (infos, has_new) = texture.find_resources("abba", SDF_GLYPH_SIZE, &cache, &generator);
        assert!(has_new);
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[0].rect, infos[3].rect);
        assert_ne!(infos[0].rect, infos[1].rect);
        assert_eq!(texture.glyph_count(), 2);
        assert_eq!(texture.pending_count(), 2);

        let (_, has_new) = texture.find_resources("ab", SDF_GLYPH_SIZE, &cache, &generator);
        assert!(!has_new);

        assert!(!cache.are_glyphs_ready("ab", SDF_GLYPH_SIZE));
        let mut backend = RecordingBackend::default();
        texture.update_state(&mut backend, &cache);
        assert_eq!(backend.allocated, [(256, 256)]);
        assert_eq!(backend.uploads.len(), 2);
        let (handle, rect, len) = backend.uploads[0];
        assert_eq!(Some(handle), texture.handle());
        assert_eq!(len, (rect.width * rect.height) as usize);
        assert_eq!(texture.pending_count(), 0);
        assert!(cache.are_glyphs_ready("ab", SDF_GLYPH_SIZE));

        // The texture is allocated only once.
        texture.update_state(&mut backend, &cache);
        assert_eq!(backend.allocated.len(), 1);
    }

    #[test]
    fn whitespace_is_ready_without_upload() {
        let cache = cache();
        let generator = ImmediateGlyphGenerator::new(cache.sdf_scale());
        let texture = FontTexture::new(0, 256, 256, cache.base_glyph_height());
        let (infos, has_new) = texture.find_resources(" ", SDF_GLYPH_SIZE, &cache, &generator);
        assert!(has_new);
        assert!(infos[0].rect.is_empty());
        assert_eq!(texture.pending_count(), 0);
        assert!(cache.are_glyphs_ready(" ", SDF_GLYPH_SIZE));
    }

    #[test]
    fn overflow_falls_back_to_invalid_glyph() {
        let cache = cache();
        let generator = ImmediateGlyphGenerator::new(cache.sdf_scale());
        // Room for exactly one 19x30 distance field glyph.
        let texture = FontTexture::new(0, 20, 31, cache.base_glyph_height());
        let (infos, _) = texture.find_resources("\u{9}", SDF_GLYPH_SIZE, &cache, &generator);
        assert!(!infos[0].rect.is_empty());
        assert!(!texture.has_enough_space(1));

        let (infos, has_new) = texture.find_resources("x", SDF_GLYPH_SIZE, &cache, &generator);
        assert!(!has_new);
        let (invalid, _) = texture.find_resources("\u{9}", SDF_GLYPH_SIZE, &cache, &generator);
        assert_eq!(infos[0].rect, invalid[0].rect);
        assert_eq!(texture.glyph_count(), 1);
    }
}
