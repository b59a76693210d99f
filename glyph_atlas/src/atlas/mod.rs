// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph textures and their grouping.
//!
//! A [`FontTexture`] packs glyphs with a [`GlyphPacker`] and keeps the
//! packaged bitmaps until a [`TextureBackend`] receives them. Textures are
//! handed out through [`GlyphGroups`], which keeps the glyphs of one request
//! in a single texture.

mod group;
mod packer;
mod texture;

pub use group::{GlyphGroups, HybridGlyphGroup};
pub use packer::{AtlasRect, GlyphPacker, TexCoords};
pub use texture::{AtlasSpace, FontTexture, GlyphInfo, TextureBackend, TextureHandle};
