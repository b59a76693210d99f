// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterizer backed by the swash scaler.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use std::sync::{Mutex, PoisonError};

use ::swash::scale::{Render, ScaleContext, Source};
use ::swash::zeno::Format;
use ::swash::{CacheKey, FontRef, StringId};
use linebender_resource_handle::Blob;

use crate::error::FontError;
use crate::raster::{RasterFace, Rasterizer, RenderedGlyph};

/// Opens TrueType and OpenType fonts with swash.
///
/// Glyphs are rendered from outlines with hinting enabled into 8-bit alpha
/// masks.
#[derive(Copy, Clone, Debug, Default)]
pub struct SwashRasterizer;

impl Rasterizer for SwashRasterizer {
    fn open_face(&self, data: Blob<u8>) -> Result<Box<dyn RasterFace>, FontError> {
        let font = FontRef::from_index(data.data(), 0)
            .ok_or(FontError::InvalidFont("unsupported font format"))?;
        let (offset, key) = (font.offset, font.key);
        Ok(Box::new(SwashFace {
            data,
            offset,
            key,
            context: Mutex::new(ScaleContext::new()),
        }))
    }
}

struct SwashFace {
    data: Blob<u8>,
    offset: u32,
    key: CacheKey,
    // The scaler caches outlines and is not reentrant.
    context: Mutex<ScaleContext>,
}

impl SwashFace {
    fn font(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.data(),
            offset: self.offset,
            key: self.key,
        }
    }

    fn string(&self, id: StringId) -> String {
        self.font()
            .localized_strings()
            .find_by_id(id, None)
            .map(|s| s.chars().collect())
            .unwrap_or_default()
    }
}

impl RasterFace for SwashFace {
    fn glyph_count(&self) -> u32 {
        u32::from(self.font().metrics(&[]).glyph_count)
    }

    fn glyph_index(&self, code: u32) -> u32 {
        u32::from(self.font().charmap().map(code))
    }

    fn char_codes(&self) -> Vec<u32> {
        let mut codes = Vec::new();
        self.font().charmap().enumerate(|code, glyph_id| {
            if glyph_id != 0 {
                codes.push(code);
            }
        });
        codes
    }

    fn name(&self) -> String {
        let mut name = self.string(StringId::Family);
        name.push(':');
        name.push_str(&self.string(StringId::SubFamily));
        name
    }

    fn render(&self, code: u32, pixel_size: u32) -> RenderedGlyph {
        let font = self.font();
        let glyph_id = font.charmap().map(code);
        let size = pixel_size as f32;
        let advance_x = font
            .glyph_metrics(&[])
            .scale(size)
            .advance_width(glyph_id)
            .floor();

        let mut context = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        let mut scaler = context.builder(font).size(size).hint(true).build();
        let image = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_id);

        match image {
            Some(image) if image.placement.width > 0 && image.placement.height > 0 => {
                let placement = image.placement;
                RenderedGlyph {
                    width: placement.width,
                    rows: placement.height,
                    pitch: placement.width,
                    bitmap: Some(image.data),
                    advance_x,
                    advance_y: 0.0,
                    bbox_min_x: placement.left as f32,
                    bbox_min_y: (placement.top - placement.height as i32) as f32,
                }
            }
            _ => RenderedGlyph {
                advance_x,
                ..RenderedGlyph::default()
            },
        }
    }
}
