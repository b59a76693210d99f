// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph Atlas keeps the glyphs served by a [`fontcover::GlyphCache`] in GPU
//! textures.
//!
//! [`TextureManager`] is the entry point. It resolves strings to
//! [`GlyphRegion`]s, rasterizing and packing glyphs it has not seen before,
//! and writes them to the GPU through a [`TextureBackend`] once per frame in
//! [`TextureManager::update_dynamic_textures`]. Glyph packaging can run on a
//! worker thread ([`ThreadedGlyphGenerator`]) or inline
//! ([`ImmediateGlyphGenerator`]).

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod atlas;
mod generator;
mod manager;

pub use atlas::{AtlasRect, FontTexture, TexCoords, TextureBackend, TextureHandle};
pub use generator::{
    GenerationListener, GlyphGenerationData, GlyphGenerator, ImmediateGlyphGenerator,
    ThreadedGlyphGenerator,
};
pub use manager::{AtlasConfig, GlyphRegion, TextureManager};
