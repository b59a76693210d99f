// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic rasterizer for tests.
//!
//! Synthetic "font files" are a small header followed by the list of code
//! points they map. Every glyph except the space renders as a box half as
//! wide as it is tall, filled with a position dependent pattern.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::RangeInclusive;

use linebender_resource_handle::Blob;

use crate::config::FontSource;
use crate::error::FontError;
use crate::raster::{RasterFace, Rasterizer, RenderedGlyph};

const MAGIC: &[u8; 4] = b"SYNF";

/// Builder for synthetic font data.
#[derive(Clone, Debug, Default)]
pub struct SyntheticFont {
    name: String,
    codes: Vec<u32>,
}

impl SyntheticFont {
    /// Starts a font with the given family name and no glyphs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            codes: Vec::new(),
        }
    }

    /// Maps every code point in `range`.
    pub fn with_range(mut self, range: RangeInclusive<char>) -> Self {
        self.codes.extend(range.map(u32::from));
        self
    }

    /// Maps the given code points.
    pub fn with_codes(mut self, codes: impl IntoIterator<Item = u32>) -> Self {
        self.codes.extend(codes);
        self
    }

    /// Serializes the font.
    pub fn to_bytes(&self) -> Vec<u8> {
        let name = self.name.as_bytes();
        let mut bytes = Vec::with_capacity(4 + 1 + name.len() + 4 * self.codes.len());
        bytes.extend_from_slice(MAGIC);
        bytes.push(name.len().min(255) as u8);
        bytes.extend_from_slice(&name[..name.len().min(255)]);
        for code in &self.codes {
            bytes.extend_from_slice(&code.to_le_bytes());
        }
        bytes
    }

    /// Serializes the font into a source listed under the family name.
    pub fn to_source(&self) -> FontSource {
        FontSource::new(self.name.clone(), Blob::from(self.to_bytes()))
    }
}

/// Opens [`SyntheticFont`] data.
#[derive(Copy, Clone, Debug, Default)]
pub struct SyntheticRasterizer;

impl Rasterizer for SyntheticRasterizer {
    fn open_face(&self, data: Blob<u8>) -> Result<Box<dyn RasterFace>, FontError> {
        let bytes = data.data();
        let rest = bytes
            .strip_prefix(MAGIC)
            .ok_or(FontError::InvalidFont("unrecognized font data"))?;
        let (&name_len, rest) = rest
            .split_first()
            .ok_or(FontError::InvalidFont("truncated header"))?;
        let name_len = name_len as usize;
        if rest.len() < name_len || (rest.len() - name_len) % 4 != 0 {
            return Err(FontError::InvalidFont("truncated character map"));
        }
        let (name, table) = rest.split_at(name_len);
        let mut codes: Vec<u32> = table
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        codes.sort_unstable();
        codes.dedup();
        Ok(Box::new(SyntheticFace {
            name: String::from_utf8_lossy(name).into_owned(),
            codes,
        }))
    }
}

struct SyntheticFace {
    name: String,
    codes: Vec<u32>,
}

/// The pixel value of the synthetic box at `(x, y)`.
pub fn box_pixel(x: u32, y: u32) -> u8 {
    128 + ((x * 7 + y * 13) % 127) as u8
}

impl RasterFace for SyntheticFace {
    fn glyph_count(&self) -> u32 {
        self.codes.len() as u32
    }

    fn glyph_index(&self, code: u32) -> u32 {
        self.codes
            .binary_search(&code)
            .map_or(0, |index| index as u32 + 1)
    }

    fn char_codes(&self) -> Vec<u32> {
        self.codes.clone()
    }

    fn name(&self) -> String {
        alloc::format!("{}:Regular", self.name)
    }

    fn render(&self, code: u32, pixel_size: u32) -> RenderedGlyph {
        let width = (pixel_size / 2).max(1);
        let rows = pixel_size;
        let mut glyph = RenderedGlyph {
            width,
            rows,
            pitch: width,
            bitmap: None,
            advance_x: (width + 2) as f32,
            advance_y: 0.0,
            bbox_min_x: 1.0,
            bbox_min_y: 0.0,
        };
        // Only the space has no ink; unmapped code points get a notdef box.
        if code == u32::from(' ') {
            glyph.width = 0;
            glyph.rows = 0;
            glyph.pitch = 0;
            return glyph;
        }
        let mut bitmap = Vec::with_capacity((width * rows) as usize);
        for y in 0..rows {
            bitmap.extend((0..width).map(|x| box_pixel(x, y)));
        }
        glyph.bitmap = Some(bitmap);
        glyph
    }
}
