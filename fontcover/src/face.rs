// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A loaded font and the glyph renderings already placed in an atlas.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use std::sync::{Mutex, PoisonError};

use hashbrown::HashSet;

use crate::config::FontSource;
use crate::error::FontError;
use crate::glyph::{Glyph, GlyphMetrics, SDF_BORDER, SDF_GLYPH_SIZE};
use crate::image::{BufferPool, GlyphImage};
use crate::raster::{RasterFace, Rasterizer};

/// One opened font.
pub struct FontFace {
    name: String,
    face: Box<dyn RasterFace>,
    sdf_scale: u32,
    pool: BufferPool,
    ready: Mutex<HashSet<(u32, i32)>>,
}

impl FontFace {
    /// Opens `source`, failing if it cannot be parsed or has no glyphs.
    pub fn open(
        rasterizer: &dyn Rasterizer,
        source: &FontSource,
        sdf_scale: u32,
        pool: BufferPool,
    ) -> Result<Self, FontError> {
        let face = rasterizer.open_face(source.data.clone())?;
        if face.glyph_count() == 0 {
            return Err(FontError::InvalidFont("font has no glyphs"));
        }
        Ok(Self {
            name: source.name.clone(),
            face,
            sdf_scale: sdf_scale.max(1),
            pool,
            ready: Mutex::new(HashSet::new()),
        })
    }

    /// The name the font was listed under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `family:style` name reported by the font.
    pub fn display_name(&self) -> String {
        self.face.name()
    }

    /// Returns true if the character map has a glyph for `code`.
    pub fn has_glyph(&self, code: u32) -> bool {
        self.face.glyph_index(code) != 0
    }

    /// Every code point the font maps, sorted and without duplicates.
    pub fn code_points(&self) -> Vec<u32> {
        let mut codes = self.face.char_codes();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    /// Renders `code`.
    ///
    /// In SDF mode the glyph is rendered `sdf_scale` times larger than
    /// `pixel_height` and the image keeps that working raster for later
    /// distance field generation, while `width`, `height` and the metrics
    /// already describe the final, downscaled glyph. Otherwise the image is
    /// the bitmap surrounded by [`SDF_BORDER`] empty pixels.
    ///
    /// The returned glyph has font index 0; the caller knows the real one.
    pub fn rasterize(&self, code: u32, pixel_height: u32, sdf: bool) -> Glyph {
        let render_height = if sdf {
            pixel_height * self.sdf_scale
        } else {
            pixel_height
        };
        let rendered = self.face.render(code, render_height);
        let scale = if sdf { 1.0 / self.sdf_scale as f32 } else { 1.0 };

        let mut image = GlyphImage {
            width: rendered.width,
            height: rendered.rows,
            raster_rows: rendered.rows,
            raster_pitch: rendered.pitch,
            data: None,
        };
        if let Some(bitmap) = &rendered.bitmap {
            if sdf {
                let border = 2 * self.sdf_scale * SDF_BORDER;
                image.width = ((rendered.pitch + border) as f32 * scale).round() as u32;
                image.height = ((rendered.rows + border) as f32 * scale).round() as u32;
                let len = rendered.rows as usize * rendered.pitch as usize;
                let mut data = self.pool.reserve(len);
                let copied = len.min(bitmap.len());
                data[..copied].copy_from_slice(&bitmap[..copied]);
                image.data = Some(data);
            } else {
                image.width += 2 * SDF_BORDER;
                image.height += 2 * SDF_BORDER;
                let mut data = self
                    .pool
                    .reserve(image.width as usize * image.height as usize);
                let pitch = rendered.pitch.max(1) as usize;
                let columns = (rendered.width as usize).min(pitch);
                for (row, src) in bitmap
                    .chunks(pitch)
                    .take(rendered.rows as usize)
                    .enumerate()
                {
                    let start = (row + SDF_BORDER as usize) * image.width as usize
                        + SDF_BORDER as usize;
                    let columns = columns.min(src.len());
                    data[start..start + columns].copy_from_slice(&src[..columns]);
                }
                image.data = Some(data);
            }
        }

        Glyph {
            metrics: GlyphMetrics {
                advance_x: rendered.advance_x * scale,
                advance_y: rendered.advance_y * scale,
                offset_x: rendered.bbox_min_x * scale,
                offset_y: rendered.bbox_min_y * scale,
                is_valid: true,
            },
            image,
            font_index: 0,
            code,
            fixed_size: if sdf {
                SDF_GLYPH_SIZE
            } else {
                pixel_height as i32
            },
        }
    }

    /// Records that `(code, fixed_size)` is present in an atlas.
    pub fn mark_ready(&self, code: u32, fixed_size: i32) {
        self.ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((code, fixed_size));
    }

    /// Returns true if `(code, fixed_size)` was marked ready.
    pub fn is_ready(&self, code: u32, fixed_size: i32) -> bool {
        self.ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(code, fixed_size))
    }
}

impl Debug for FontFace {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .field("sdf_scale", &self.sdf_scale)
            .finish_non_exhaustive()
    }
}
