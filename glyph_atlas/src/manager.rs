// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The texture manager: glyph regions, readiness and gated uploads.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use core::time::Duration;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use fontcover::{GlyphCache, GlyphMetrics};

use crate::atlas::{
    FontTexture, GlyphGroups, GlyphInfo, TexCoords, TextureBackend, TextureHandle,
};
use crate::generator::GlyphGenerator;

/// Sizing of glyph textures and the upload grace period.
#[derive(Clone, Debug)]
pub struct AtlasConfig {
    /// Edge length of the square glyph textures.
    pub texture_size: u32,
    /// Ratio between the average glyph edge and the base glyph height.
    pub glyph_area_multiplier: f32,
    /// Fraction of a texture glyphs are expected to cover when it is full.
    pub glyph_area_coverage: f32,
    /// How long backends without synchronous uploads keep redrawing after
    /// the last upload.
    pub upload_timeout: Duration,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            texture_size: 1024,
            glyph_area_multiplier: 1.2,
            glyph_area_coverage: 0.9,
            upload_timeout: Duration::from_secs(2),
        }
    }
}

impl AtlasConfig {
    /// The glyph count ceiling of one texture group.
    pub fn max_glyphs(&self, base_glyph_height: u32) -> u32 {
        let texture_area = f64::from(self.texture_size) * f64::from(self.texture_size);
        let glyph_edge = (base_glyph_height as f32 * self.glyph_area_multiplier) as u32;
        let glyph_area = f64::from(glyph_edge.max(1)).powi(2);
        (f64::from(self.glyph_area_coverage) * texture_area / glyph_area).ceil() as u32
    }
}

/// A glyph resolved to its place in a texture.
#[derive(Clone, Debug)]
pub struct GlyphRegion {
    texture: Arc<FontTexture>,
    info: GlyphInfo,
}

impl GlyphRegion {
    /// The texture holding the glyph.
    pub fn texture(&self) -> &Arc<FontTexture> {
        &self.texture
    }

    /// Identifier of the texture holding the glyph.
    pub fn texture_id(&self) -> u32 {
        self.texture.id()
    }

    /// The GPU texture, once allocated.
    pub fn texture_handle(&self) -> Option<TextureHandle> {
        self.texture.handle()
    }

    /// Normalized texture coordinates.
    pub fn tex_coords(&self) -> TexCoords {
        self.info.tex_coords
    }

    /// Size of the glyph in texels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.info.rect.width, self.info.rect.height)
    }

    /// Placement metrics.
    pub fn metrics(&self) -> GlyphMetrics {
        self.info.metrics
    }

    /// Left edge of the ink relative to the pen position.
    pub fn offset_x(&self) -> f32 {
        self.info.metrics.offset_x
    }

    /// Bottom edge of the ink relative to the baseline.
    pub fn offset_y(&self) -> f32 {
        self.info.metrics.offset_y
    }

    /// Horizontal advance.
    pub fn advance_x(&self) -> f32 {
        self.info.metrics.advance_x
    }

    /// Vertical advance.
    pub fn advance_y(&self) -> f32 {
        self.info.metrics.advance_y
    }

    /// False if the region shows the invalid glyph placeholder.
    pub fn is_valid(&self) -> bool {
        self.info.metrics.is_valid
    }
}

/// Hands out glyph regions and keeps glyph textures in sync with the GPU.
///
/// Lookups may come from any thread and are serialized on one lock for the
/// whole group selection and rasterization step. Texture updates take a
/// separate lock on the texture list, so they do not hold up lookups.
pub struct TextureManager {
    config: AtlasConfig,
    cache: Arc<GlyphCache>,
    generator: Arc<dyn GlyphGenerator>,
    max_glyphs: u32,
    groups: Mutex<GlyphGroups<Arc<FontTexture>>>,
    textures: Mutex<Vec<Arc<FontTexture>>>,
    next_texture_id: AtomicU32,
    nothing_to_upload: AtomicBool,
    upload_timer: Mutex<Instant>,
    released: AtomicBool,
}

impl TextureManager {
    /// Creates a manager drawing glyphs from `cache`.
    pub fn new(
        cache: Arc<GlyphCache>,
        generator: Arc<dyn GlyphGenerator>,
        config: AtlasConfig,
    ) -> Self {
        let max_glyphs = config.max_glyphs(cache.base_glyph_height());
        log::debug!(
            "glyph textures {0}x{0}, at most {max_glyphs} glyphs each",
            config.texture_size
        );
        Self {
            config,
            cache,
            generator,
            max_glyphs,
            groups: Mutex::new(GlyphGroups::new(max_glyphs)),
            textures: Mutex::new(Vec::new()),
            next_texture_id: AtomicU32::new(0),
            nothing_to_upload: AtomicBool::new(false),
            upload_timer: Mutex::new(Instant::now()),
            released: AtomicBool::new(false),
        }
    }

    /// The glyph cache lookups go through.
    pub fn glyph_cache(&self) -> &GlyphCache {
        &self.cache
    }

    /// Glyph count ceiling of one texture group.
    pub fn max_glyphs_count(&self) -> u32 {
        self.max_glyphs
    }

    /// Number of texture groups created so far.
    pub fn group_count(&self) -> usize {
        self.lock_groups().len()
    }

    /// Number of glyph textures created so far.
    pub fn texture_count(&self) -> usize {
        self.lock_textures().len()
    }

    /// Returns the region of every character of `text`.
    ///
    /// Glyphs not seen before are rasterized and scheduled for packaging;
    /// their texels are uploaded by a later
    /// [`update_dynamic_textures`](Self::update_dynamic_textures).
    pub fn glyph_regions(&self, text: &str, fixed_size: i32) -> Vec<GlyphRegion> {
        let mut regions = self.multiline_glyph_regions(&[text], fixed_size);
        regions.pop().unwrap_or_default()
    }

    /// Returns the regions of several lines, which all share one texture.
    pub fn multiline_glyph_regions(&self, lines: &[&str], fixed_size: i32) -> Vec<Vec<GlyphRegion>> {
        if self.released.load(Ordering::Acquire) {
            log::warn!("glyph regions requested from a released texture manager");
            return Vec::new();
        }
        let combined = lines.concat();

        let mut groups = self.lock_groups();
        let index = groups.find_or_create_group(&combined, fixed_size);
        for line in lines {
            groups.mark_characters_usage(index, line, fixed_size);
        }
        let Some(group) = groups.get_mut(index) else {
            return Vec::new();
        };
        let texture = group
            .texture_or_insert_with(|| self.allocate_glyph_texture())
            .clone();

        // Packing stays under the groups lock, so the space estimate of the
        // next request sees every glyph of this one.
        let regions = lines
            .iter()
            .map(|line| self.regions_in_texture(&texture, line, fixed_size))
            .collect();
        drop(groups);
        regions
    }

    fn regions_in_texture(
        &self,
        texture: &Arc<FontTexture>,
        text: &str,
        fixed_size: i32,
    ) -> Vec<GlyphRegion> {
        let (infos, has_new) =
            texture.find_resources(text, fixed_size, &self.cache, self.generator.as_ref());
        if has_new {
            self.nothing_to_upload.store(false, Ordering::Release);
        }
        infos
            .into_iter()
            .map(|info| GlyphRegion {
                texture: texture.clone(),
                info,
            })
            .collect()
    }

    fn allocate_glyph_texture(&self) -> Arc<FontTexture> {
        let id = self.next_texture_id.fetch_add(1, Ordering::Relaxed);
        let size = self.config.texture_size;
        let texture = Arc::new(FontTexture::new(
            id,
            size,
            size,
            self.cache.base_glyph_height(),
        ));
        self.lock_textures().push(texture.clone());
        self.nothing_to_upload.store(false, Ordering::Release);
        log::debug!("allocated glyph texture {id}");
        texture
    }

    /// Returns true if every character of `text` is uploaded at `fixed_size`.
    pub fn are_glyphs_ready(&self, text: &str, fixed_size: i32) -> bool {
        self.cache.are_glyphs_ready(text, fixed_size)
    }

    /// Returns true while the glyph generator has work queued or running.
    pub fn has_async_routines(&self) -> bool {
        !self.generator.is_suspended()
    }

    /// Writes pending glyphs to the GPU.
    ///
    /// Returns true if the frame should be drawn again. When nothing was
    /// requested since the last sync and no glyph is being generated,
    /// nothing is uploaded: synchronous backends return false, others
    /// return true until the upload timeout has passed since the last sync.
    pub fn update_dynamic_textures(&self, backend: &mut dyn TextureBackend) -> bool {
        if !self.has_async_routines() && self.nothing_to_upload.swap(true, Ordering::AcqRel) {
            if backend.uploads_are_synchronous() {
                return false;
            }
            let since_upload = self
                .upload_timer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .elapsed();
            return since_upload < self.config.upload_timeout;
        }
        if self.released.load(Ordering::Acquire) {
            return false;
        }

        *self.upload_timer.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        for texture in self.lock_textures().iter() {
            texture.update_state(backend, &self.cache);
        }
        backend.flush();
        true
    }

    /// Cancels glyph generation and drops every group and texture.
    ///
    /// The manager hands out no regions afterwards.
    pub fn release(&self) {
        self.released.store(true, Ordering::Release);
        self.generator.finish_and_cancel_all();
        self.lock_groups().clear();
        self.lock_textures().clear();
        self.nothing_to_upload.store(true, Ordering::Release);
    }

    fn lock_groups(&self) -> MutexGuard<'_, GlyphGroups<Arc<FontTexture>>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_textures(&self) -> MutexGuard<'_, Vec<Arc<FontTexture>>> {
        self.textures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TextureManager")
            .field("config", &self.config)
            .field("max_glyphs", &self.max_glyphs)
            .field("groups", &self.group_count())
            .field("textures", &self.texture_count())
            .field(
                "nothing_to_upload",
                &self.nothing_to_upload.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}
