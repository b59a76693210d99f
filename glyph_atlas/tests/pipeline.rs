// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End to end: fonts to glyph cache to texture manager to a CPU backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fontcover::testing::{SyntheticFont, SyntheticRasterizer, box_pixel};
use fontcover::{GlyphCache, GlyphCacheConfig, SDF_BORDER, SDF_GLYPH_SIZE, UnicodeBlock};
use glyph_atlas::{
    AtlasConfig, AtlasRect, GlyphGenerator, ImmediateGlyphGenerator, TextureBackend,
    TextureHandle, TextureManager, ThreadedGlyphGenerator,
};

/// Keeps texture contents in memory.
#[derive(Default)]
struct CpuBackend {
    textures: Vec<(u32, Vec<u8>)>,
    flushes: usize,
}

impl CpuBackend {
    fn texel(&self, handle: TextureHandle, x: u32, y: u32) -> u8 {
        let (width, texels) = &self.textures[handle.0 as usize];
        texels[(y * width + x) as usize]
    }
}

impl TextureBackend for CpuBackend {
    fn allocate_texture(&mut self, width: u32, height: u32) -> TextureHandle {
        self.textures.push((width, vec![0; (width * height) as usize]));
        TextureHandle(self.textures.len() as u64 - 1)
    }

    fn upload_region(&mut self, texture: TextureHandle, rect: AtlasRect, data: &[u8]) {
        let (width, texels) = &mut self.textures[texture.0 as usize];
        for row in 0..rect.height {
            let src = (row * rect.width) as usize;
            let dst = ((rect.y + row) * *width + rect.x) as usize;
            texels[dst..dst + rect.width as usize]
                .copy_from_slice(&data[src..src + rect.width as usize]);
        }
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn uploads_are_synchronous(&self) -> bool {
        true
    }
}

fn glyph_cache() -> Arc<GlyphCache> {
    let config = GlyphCacheConfig {
        blocks: vec![
            UnicodeBlock::new("Basic_Latin", 0x0000, 0x007F),
            UnicodeBlock::new("Cyrillic", 0x0400, 0x04FF),
        ],
        fonts: vec![
            SyntheticFont::new("latin").with_range(' '..='~').to_source(),
            SyntheticFont::new("cyrillic")
                .with_range('\u{0400}'..='\u{04FF}')
                .to_source(),
        ],
        ..GlyphCacheConfig::default()
    };
    Arc::new(GlyphCache::new(config, &SyntheticRasterizer))
}

fn small_textures() -> AtlasConfig {
    AtlasConfig {
        texture_size: 256,
        ..AtlasConfig::default()
    }
}

#[test]
fn threaded_generation_reaches_the_gpu() {
    let cache = glyph_cache();
    let generator = Arc::new(ThreadedGlyphGenerator::new(cache.sdf_scale()).unwrap());
    let manager = TextureManager::new(cache, generator, small_textures());
    let mut backend = CpuBackend::default();

    let text = "Привет, world";
    let regions = manager.glyph_regions(text, SDF_GLYPH_SIZE);
    assert_eq!(regions.len(), text.chars().count());
    assert!(regions.iter().all(|region| region.is_valid()));
    assert!(
        regions
            .windows(2)
            .all(|pair| pair[0].texture_id() == pair[1].texture_id())
    );
    for region in &regions {
        let coords = region.tex_coords();
        assert!(0.0 <= coords.min_x && coords.min_x <= coords.max_x && coords.max_x <= 1.0);
        assert!(0.0 <= coords.min_y && coords.min_y <= coords.max_y && coords.max_y <= 1.0);
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    while !manager.are_glyphs_ready(text, SDF_GLYPH_SIZE) {
        assert!(Instant::now() < deadline, "glyphs never became ready");
        manager.update_dynamic_textures(&mut backend);
        std::thread::sleep(Duration::from_millis(1));
    }
    while manager.has_async_routines() {
        assert!(Instant::now() < deadline, "generator never went idle");
        std::thread::sleep(Duration::from_millis(1));
    }
    // One last sync, then idle frames are skipped.
    manager.update_dynamic_textures(&mut backend);
    assert!(!manager.update_dynamic_textures(&mut backend));
    assert_eq!(backend.textures.len(), 1);
    assert!(backend.flushes > 0);

    manager.release();
    assert!(manager.glyph_regions(text, SDF_GLYPH_SIZE).is_empty());
}

#[test]
fn raw_glyph_texels_land_in_their_region() {
    let cache = glyph_cache();
    let generator = Arc::new(ImmediateGlyphGenerator::new(cache.sdf_scale()));
    let manager = TextureManager::new(cache, generator, small_textures());
    let mut backend = CpuBackend::default();

    let regions = manager.glyph_regions("Ж", 16);
    assert!(manager.update_dynamic_textures(&mut backend));
    assert!(manager.are_glyphs_ready("Ж", 16));
    assert!(!manager.are_glyphs_ready("Ж", SDF_GLYPH_SIZE));

    let region = &regions[0];
    // A 8 x 16 box with the border on every side.
    assert_eq!(region.pixel_size(), (8 + 2 * SDF_BORDER, 16 + 2 * SDF_BORDER));
    let handle = region.texture_handle().unwrap();
    let tex = region.tex_coords();
    let origin_x = (tex.min_x * 256.0).floor() as u32;
    let origin_y = (tex.min_y * 256.0).floor() as u32;
    assert_eq!(backend.texel(handle, origin_x, origin_y), 0);
    assert_eq!(
        backend.texel(handle, origin_x + SDF_BORDER, origin_y + SDF_BORDER),
        box_pixel(0, 0)
    );
    assert_eq!(
        backend.texel(handle, origin_x + SDF_BORDER + 3, origin_y + SDF_BORDER + 5),
        box_pixel(3, 5)
    );
}

#[test]
fn missing_characters_show_the_placeholder() {
    let cache = glyph_cache();
    let generator: Arc<dyn GlyphGenerator> =
        Arc::new(ImmediateGlyphGenerator::new(cache.sdf_scale()));
    let manager = TextureManager::new(cache, generator, small_textures());

    let regions = manager.glyph_regions("a€", SDF_GLYPH_SIZE);
    assert!(regions[0].is_valid());
    assert!(!regions[1].is_valid());
    assert!(regions[1].pixel_size().0 > 0);
}

#[test]
fn small_textures_roll_over_to_new_groups() {
    let cache = glyph_cache();
    let generator = Arc::new(ImmediateGlyphGenerator::new(cache.sdf_scale()));
    let config = AtlasConfig {
        texture_size: 64,
        ..AtlasConfig::default()
    };
    let manager = TextureManager::new(cache, generator, config);
    assert_eq!(manager.max_glyphs_count(), 6);

    let first = manager.glyph_regions("abcde", SDF_GLYPH_SIZE);
    let second = manager.glyph_regions("fghij", SDF_GLYPH_SIZE);
    assert_eq!(manager.group_count(), 2);
    assert_ne!(first[0].texture_id(), second[0].texture_id());

    // Served by the sealed group without growing it.
    let again = manager.glyph_regions("edcba", SDF_GLYPH_SIZE);
    assert_eq!(again[0].texture_id(), first[0].texture_id());
    assert_eq!(manager.group_count(), 2);
}
