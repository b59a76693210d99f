// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The glyph cache façade.

use alloc::vec::Vec;
use std::sync::{PoisonError, RwLock};

use crate::block::UnicodeBlock;
use crate::config::GlyphCacheConfig;
use crate::coverage::BlockCoverageResolver;
use crate::face::FontFace;
use crate::glyph::{Glyph, GlyphMetrics, INVALID_GLYPH_CODE, SDF_BORDER, SDF_GLYPH_SIZE, is_sdf_size};
use crate::image::{BufferPool, GlyphImage};
use crate::raster::Rasterizer;
use crate::sdf::SdfImage;

/// Font of the invalid glyph placeholder.
const INVALID_GLYPH_FONT: usize = 0;

/// Resolves code points to fonts and rasterizes their glyphs.
///
/// All methods take `&self`. Lookups through [`glyph`](Self::glyph) share a
/// last-used block hint and serialize on it; readiness queries only take a
/// read lock and run concurrently.
#[derive(Debug)]
pub struct GlyphCache {
    fonts: Vec<FontFace>,
    resolver: RwLock<BlockCoverageResolver>,
    invalid_glyph: Glyph,
    base_glyph_height: u32,
    sdf_scale: u32,
}

impl GlyphCache {
    /// Opens the configured fonts and computes their block weights.
    ///
    /// Fonts that fail to open are logged and skipped; the remaining fonts
    /// are indexed in list order.
    pub fn new(config: GlyphCacheConfig, rasterizer: &dyn Rasterizer) -> Self {
        let GlyphCacheConfig {
            blocks,
            whitelist,
            blacklist,
            fonts: sources,
            base_glyph_height,
            sdf_scale,
        } = config;
        let sdf_scale = sdf_scale.max(1);
        let pool = BufferPool::new();
        let mut resolver = BlockCoverageResolver::new(blocks);
        let mut fonts = Vec::with_capacity(sources.len());
        for source in &sources {
            match FontFace::open(rasterizer, source, sdf_scale, pool.clone()) {
                Ok(face) => {
                    resolver.add_font(&source.name, &face.code_points(), &whitelist, &blacklist);
                    fonts.push(face);
                }
                Err(err) => log::warn!("error reading font file {}: {err}", source.name),
            }
        }
        log_block_mapping(&resolver, &fonts);

        let invalid_glyph = match fonts.get(INVALID_GLYPH_FONT) {
            Some(font) => {
                let mut glyph = font.rasterize(INVALID_GLYPH_CODE, base_glyph_height, true);
                glyph.metrics.is_valid = false;
                glyph.font_index = INVALID_GLYPH_FONT;
                glyph
            }
            None => {
                log::warn!("no usable fonts, every glyph will be blank");
                Glyph {
                    metrics: GlyphMetrics::default(),
                    image: GlyphImage::default(),
                    font_index: INVALID_GLYPH_FONT,
                    code: INVALID_GLYPH_CODE,
                    fixed_size: SDF_GLYPH_SIZE,
                }
            }
        };

        Self {
            fonts,
            resolver: RwLock::new(resolver),
            invalid_glyph,
            base_glyph_height,
            sdf_scale,
        }
    }

    /// Pixel height at which SDF glyphs are rasterized.
    pub fn base_glyph_height(&self) -> u32 {
        self.base_glyph_height
    }

    /// Ratio between the SDF working raster and the final glyph.
    pub fn sdf_scale(&self) -> u32 {
        self.sdf_scale
    }

    /// The fonts that opened successfully, in priority order.
    pub fn fonts(&self) -> &[FontFace] {
        &self.fonts
    }

    /// Every Unicode block paired with the font that covers it best.
    pub fn block_mapping(&self) -> Vec<(UnicodeBlock, Option<usize>)> {
        let resolver = self.resolver.read().unwrap_or_else(PoisonError::into_inner);
        resolver
            .blocks()
            .iter()
            .enumerate()
            .map(|(index, block)| (block.clone(), resolver.preferred_font(index)))
            .collect()
    }

    /// Returns the font for `code`, or `None` if no font can render it.
    pub fn font_index(&self, code: char) -> Option<usize> {
        let code = u32::from(code);
        self.resolver
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(code, |font| self.fonts[font].has_glyph(code))
    }

    /// Same as [`font_index`](Self::font_index) but never contends with
    /// other readers.
    pub fn font_index_stateless(&self, code: char) -> Option<usize> {
        let code = u32::from(code);
        self.resolver
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve_stateless(code, |font| self.fonts[font].has_glyph(code))
    }

    /// Rasterizes `code`, as a distance field if `fixed_size` is
    /// [`SDF_GLYPH_SIZE`] or as a raw bitmap of that pixel height otherwise.
    ///
    /// Code points no font can render yield the invalid glyph.
    pub fn glyph(&self, code: char, fixed_size: i32) -> Glyph {
        let Some(font_index) = self.font_index(code) else {
            return self.invalid_glyph(fixed_size);
        };
        let sdf = is_sdf_size(fixed_size);
        let height = if sdf {
            self.base_glyph_height
        } else {
            fixed_size.unsigned_abs()
        };
        let mut glyph = self.fonts[font_index].rasterize(u32::from(code), height, sdf);
        glyph.font_index = font_index;
        glyph
    }

    /// The placeholder for code points no font can render.
    ///
    /// The distance field placeholder is rendered once up front; raw
    /// placeholders are rendered at the requested size.
    pub fn invalid_glyph(&self, fixed_size: i32) -> Glyph {
        if is_sdf_size(fixed_size) {
            return self.invalid_glyph.clone();
        }
        match self.fonts.get(INVALID_GLYPH_FONT) {
            Some(font) => {
                let mut glyph = font.rasterize(INVALID_GLYPH_CODE, fixed_size.unsigned_abs(), false);
                glyph.metrics.is_valid = false;
                glyph.font_index = INVALID_GLYPH_FONT;
                glyph
            }
            None => Glyph {
                fixed_size,
                ..self.invalid_glyph.clone()
            },
        }
    }

    /// Turns a rasterized glyph into its upload form.
    ///
    /// Distance field glyphs get their field generated from the working
    /// raster into a buffer rounded up to a power of two; raw glyphs are
    /// copied. The result has no working raster left. Glyphs without ink
    /// are returned as they are.
    pub fn generate_glyph(glyph: &Glyph, sdf_scale: u32) -> Glyph {
        let Some(data) = &glyph.image.data else {
            return glyph.clone();
        };
        let (width, height) = (glyph.image.width, glyph.image.height);
        let buffer = if glyph.is_sdf() {
            let sdf_scale = sdf_scale.max(1);
            let mut image = SdfImage::new(
                glyph.image.raster_rows,
                glyph.image.raster_pitch,
                data,
                sdf_scale * SDF_BORDER,
            );
            image.generate_sdf(1.0 / sdf_scale as f32);
            debug_assert_eq!((image.width(), image.height()), (width, height));
            let len = width as usize * height as usize;
            let mut buffer = data.pool().reserve(len.next_power_of_two());
            image.write_to(&mut buffer);
            buffer
        } else {
            data.clone()
        };
        Glyph {
            metrics: glyph.metrics,
            image: GlyphImage {
                width,
                height,
                raster_rows: 0,
                raster_pitch: 0,
                data: Some(buffer),
            },
            font_index: glyph.font_index,
            code: glyph.code,
            fixed_size: glyph.fixed_size,
        }
    }

    /// Records that `glyph` has been placed in an atlas.
    pub fn mark_glyph_ready(&self, glyph: &Glyph) {
        if let Some(font) = self.fonts.get(glyph.font_index) {
            font.mark_ready(glyph.code, glyph.fixed_size);
        }
    }

    /// Returns true if every character of `text` resolves to a font and has
    /// been marked ready at `fixed_size`.
    pub fn are_glyphs_ready(&self, text: &str, fixed_size: i32) -> bool {
        let resolver = self.resolver.read().unwrap_or_else(PoisonError::into_inner);
        text.chars().all(|c| {
            let code = u32::from(c);
            resolver
                .resolve_stateless(code, |font| self.fonts[font].has_glyph(code))
                .is_some_and(|font| self.fonts[font].is_ready(code, fixed_size))
        })
    }
}

fn log_block_mapping(resolver: &BlockCoverageResolver, fonts: &[FontFace]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    log::debug!("how unicode blocks are mapped on font files:");
    for (index, block) in resolver.blocks().iter().enumerate() {
        match resolver.preferred_font(index) {
            Some(font) => log::debug!(
                "{} is in {} ({})",
                block.name,
                fonts[font].name(),
                fonts[font].display_name()
            ),
            None => log::debug!("{} is unsupported", block.name),
        }
    }
}
