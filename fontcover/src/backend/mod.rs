// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rasterizer backends.

#[cfg(feature = "swash")]
mod swash;

#[cfg(feature = "swash")]
pub use self::swash::SwashRasterizer;
