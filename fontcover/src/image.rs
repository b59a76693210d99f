// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pooled glyph image buffers.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use core::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use hashbrown::HashMap;

/// Free buffers kept per size class.
const MAX_FREE_PER_SIZE: usize = 32;

/// A pool of byte buffers keyed by exact size.
///
/// Glyph bitmaps come in a handful of recurring sizes, so released buffers
/// are kept and handed out again. Cloning the pool yields another handle to
/// the same storage.
#[derive(Clone, Default)]
pub struct BufferPool {
    free: Arc<Mutex<HashMap<usize, Vec<Vec<u8>>>>>,
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a zero-filled buffer of exactly `size` bytes from the pool.
    pub fn reserve(&self, size: usize) -> PooledBuffer {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&size)
            .and_then(Vec::pop);
        let data = match reused {
            Some(mut data) => {
                data.fill(0);
                data
            }
            None => alloc::vec![0; size],
        };
        PooledBuffer {
            data,
            pool: self.clone(),
        }
    }

    /// Number of released buffers currently waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    fn release(&self, data: Vec<u8>) {
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        let class = free.entry(data.len()).or_default();
        if class.len() < MAX_FREE_PER_SIZE {
            class.push(data);
        }
    }
}

impl Debug for BufferPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufferPool")
            .field("free", &self.free_count())
            .finish()
    }
}

/// A buffer borrowed from a [`BufferPool`].
///
/// The buffer has a single owner and goes back to its pool when dropped.
/// Cloning reserves a second buffer and copies the contents.
pub struct PooledBuffer {
    data: Vec<u8>,
    pool: BufferPool,
}

impl PooledBuffer {
    /// Returns the pool this buffer will be released to.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Clone for PooledBuffer {
    fn clone(&self) -> Self {
        let mut copy = self.pool.reserve(self.data.len());
        copy.copy_from_slice(&self.data);
        copy
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(core::mem::take(&mut self.data));
    }
}

impl Debug for PooledBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

/// The bitmap of a [`Glyph`](crate::Glyph).
///
/// Straight out of the rasterizer, an SDF glyph keeps the unscaled working
/// raster in `data` and its dimensions in `raster_rows` and `raster_pitch`,
/// while `width` and `height` already describe the final distance field.
/// Once packaged by [`GlyphCache::generate_glyph`](crate::GlyphCache::generate_glyph)
/// both raster fields are zero and `data` holds `width * height` upload bytes.
#[derive(Clone, Default, Debug)]
pub struct GlyphImage {
    /// Width of the final image.
    pub width: u32,
    /// Height of the final image.
    pub height: u32,
    /// Rows of the unpackaged working raster.
    pub raster_rows: u32,
    /// Bytes per row of the unpackaged working raster.
    pub raster_pitch: u32,
    /// Pixel data, `None` for glyphs without ink.
    pub data: Option<PooledBuffer>,
}

impl GlyphImage {
    /// Returns true if the image carries no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Returns the pixel data, or an empty slice for glyphs without ink.
    pub fn bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_return_to_pool() {
        let pool = BufferPool::new();
        let mut buffer = pool.reserve(64);
        buffer[3] = 7;
        assert_eq!(pool.free_count(), 0);
        drop(buffer);
        assert_eq!(pool.free_count(), 1);

        let reused = pool.reserve(64);
        assert_eq!(pool.free_count(), 0);
        assert!(reused.iter().all(|&b| b == 0));

        let other = pool.reserve(32);
        drop(other);
        drop(reused);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn clone_owns_separate_storage() {
        let pool = BufferPool::new();
        let mut original = pool.reserve(4);
        original.copy_from_slice(&[1, 2, 3, 4]);
        let mut copy = original.clone();
        copy[0] = 9;
        assert_eq!(&original[..], &[1, 2, 3, 4]);
        assert_eq!(&copy[..], &[9, 2, 3, 4]);
        drop(original);
        drop(copy);
        assert_eq!(pool.free_count(), 2);
    }
}
