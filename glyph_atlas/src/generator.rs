// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous packaging of rasterized glyphs.
//!
//! Turning a working raster into a distance field is the expensive part of
//! getting a glyph on screen. A [`GlyphGenerator`] takes that work off the
//! lookup path: textures schedule glyphs as they pack them and are called
//! back with the packaged bitmaps, which they keep until the next upload.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use fontcover::{Glyph, GlyphCache};

use crate::atlas::AtlasRect;

/// A glyph and the atlas rectangle reserved for it.
#[derive(Debug)]
pub struct GlyphGenerationData {
    /// Where the glyph goes in its texture.
    pub rect: AtlasRect,
    /// The glyph; rasterized when scheduled, packaged when handed back.
    pub glyph: Glyph,
}

/// Receives packaged glyphs.
pub trait GenerationListener: Send + Sync {
    /// Called with a batch of packaged glyphs, possibly from another thread.
    fn on_glyphs_generated(&self, glyphs: Vec<GlyphGenerationData>);
}

/// A service packaging glyphs for upload.
pub trait GlyphGenerator: Send + Sync {
    /// Queues `data` for packaging; the result is delivered to `listener`.
    fn schedule(&self, listener: Arc<dyn GenerationListener>, data: GlyphGenerationData);

    /// Returns true if no work is queued or running.
    fn is_suspended(&self) -> bool;

    /// Drops all queued work and waits for running work to finish. Nothing
    /// is delivered afterwards.
    fn finish_and_cancel_all(&self);
}

type Job = (Arc<dyn GenerationListener>, GlyphGenerationData);

#[derive(Default)]
struct Queue {
    jobs: VecDeque<Job>,
    busy: bool,
    cancelled: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    wake: Condvar,
    sdf_scale: u32,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Packages glyphs on a dedicated worker thread.
pub struct ThreadedGlyphGenerator {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadedGlyphGenerator {
    /// Starts the worker thread.
    pub fn new(sdf_scale: u32) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue::default()),
            wake: Condvar::new(),
            sdf_scale,
        });
        let worker = std::thread::Builder::new()
            .name("glyph-generator".into())
            .spawn({
                let shared = shared.clone();
                move || run_worker(&shared)
            })?;
        Ok(Self {
            shared,
            worker: Mutex::new(Some(worker)),
        })
    }
}

fn run_worker(shared: &Shared) {
    loop {
        let batch: Vec<Job> = {
            let mut queue = shared.lock();
            while queue.jobs.is_empty() && !queue.cancelled {
                queue = shared
                    .wake
                    .wait(queue)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if queue.cancelled {
                return;
            }
            queue.busy = true;
            queue.jobs.drain(..).collect()
        };
        log::trace!("packaging {} glyphs", batch.len());
        deliver(batch, shared.sdf_scale);
        shared.lock().busy = false;
    }
}

/// Packages every job and hands the results to their listeners, batching
/// consecutive jobs of the same listener.
fn deliver(batch: Vec<Job>, sdf_scale: u32) {
    let mut current: Option<Arc<dyn GenerationListener>> = None;
    let mut generated = Vec::new();
    for (listener, data) in batch {
        if current
            .as_ref()
            .is_some_and(|current| !Arc::ptr_eq(current, &listener))
        {
            if let Some(previous) = current.take() {
                previous.on_glyphs_generated(core::mem::take(&mut generated));
            }
        }
        generated.push(GlyphGenerationData {
            rect: data.rect,
            glyph: GlyphCache::generate_glyph(&data.glyph, sdf_scale),
        });
        current = Some(listener);
    }
    if let Some(listener) = current {
        listener.on_glyphs_generated(generated);
    }
}

impl GlyphGenerator for ThreadedGlyphGenerator {
    fn schedule(&self, listener: Arc<dyn GenerationListener>, data: GlyphGenerationData) {
        let mut queue = self.shared.lock();
        if queue.cancelled {
            log::trace!("generator cancelled, dropping glyph {:#x}", data.glyph.code);
            return;
        }
        queue.jobs.push_back((listener, data));
        drop(queue);
        self.shared.wake.notify_one();
    }

    fn is_suspended(&self) -> bool {
        let queue = self.shared.lock();
        queue.jobs.is_empty() && !queue.busy
    }

    fn finish_and_cancel_all(&self) {
        {
            let mut queue = self.shared.lock();
            queue.cancelled = true;
            queue.jobs.clear();
        }
        self.shared.wake.notify_all();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                log::warn!("glyph generator thread panicked");
            }
        }
        self.shared.lock().busy = false;
    }
}

impl Drop for ThreadedGlyphGenerator {
    fn drop(&mut self) {
        self.finish_and_cancel_all();
    }
}

impl Debug for ThreadedGlyphGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let queue = self.shared.lock();
        f.debug_struct("ThreadedGlyphGenerator")
            .field("queued", &queue.jobs.len())
            .field("busy", &queue.busy)
            .field("cancelled", &queue.cancelled)
            .finish()
    }
}

/// Packages glyphs inline, inside [`schedule`](GlyphGenerator::schedule).
///
/// Never has work in flight, so it always reports being suspended.
#[derive(Debug)]
pub struct ImmediateGlyphGenerator {
    sdf_scale: u32,
}

impl ImmediateGlyphGenerator {
    /// Creates a generator for glyphs rasterized with `sdf_scale`.
    pub fn new(sdf_scale: u32) -> Self {
        Self { sdf_scale }
    }
}

impl GlyphGenerator for ImmediateGlyphGenerator {
    fn schedule(&self, listener: Arc<dyn GenerationListener>, data: GlyphGenerationData) {
        deliver(alloc::vec![(listener, data)], self.sdf_scale);
    }

    fn is_suspended(&self) -> bool {
        true
    }

    fn finish_and_cancel_all(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontcover::testing::{SyntheticFont, SyntheticRasterizer};
    use fontcover::{GlyphCacheConfig, SDF_GLYPH_SIZE, UnicodeBlock};
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Collector {
        glyphs: Mutex<Vec<GlyphGenerationData>>,
    }

    impl GenerationListener for Collector {
        fn on_glyphs_generated(&self, glyphs: Vec<GlyphGenerationData>) {
            self.glyphs.lock().unwrap().extend(glyphs);
        }
    }

    fn cache() -> GlyphCache {
        GlyphCache::new(
            GlyphCacheConfig {
                blocks: alloc::vec![UnicodeBlock::new("Basic_Latin", 0x00, 0x7F)],
                fonts: alloc::vec![SyntheticFont::new("latin").with_range('A'..='z').to_source()],
                ..GlyphCacheConfig::default()
            },
            &SyntheticRasterizer,
        )
    }

    fn data(cache: &GlyphCache, c: char) -> GlyphGenerationData {
        GlyphGenerationData {
            rect: AtlasRect::default(),
            glyph: cache.glyph(c, SDF_GLYPH_SIZE),
        }
    }

    #[test]
    fn immediate_delivers_inline() {
        let cache = cache();
        let generator = ImmediateGlyphGenerator::new(cache.sdf_scale());
        let collector = Arc::new(Collector::default());
        generator.schedule(collector.clone(), data(&cache, 'a'));
        assert!(generator.is_suspended());
        let glyphs = collector.glyphs.lock().unwrap();
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].glyph.image.raster_rows, 0);
        assert!(glyphs[0].glyph.image.bytes().len().is_power_of_two());
    }

    #[test]
    fn threaded_delivers_and_goes_idle() {
        let cache = cache();
        let generator = ThreadedGlyphGenerator::new(cache.sdf_scale()).unwrap();
        let collector = Arc::new(Collector::default());
        for c in ['a', 'b', 'c'] {
            generator.schedule(collector.clone(), data(&cache, c));
        }
        let deadline = Instant::now() + Duration::from_secs(10);
        while !generator.is_suspended() || collector.glyphs.lock().unwrap().len() < 3 {
            assert!(Instant::now() < deadline, "generator did not finish");
            std::thread::sleep(Duration::from_millis(1));
        }
        let codes: Vec<u32> = collector
            .glyphs
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.glyph.code)
            .collect();
        assert_eq!(codes, ['a' as u32, 'b' as u32, 'c' as u32]);
    }

    #[test]
    fn cancelled_generator_drops_work() {
        let cache = cache();
        let generator = ThreadedGlyphGenerator::new(cache.sdf_scale()).unwrap();
        generator.finish_and_cancel_all();
        let collector = Arc::new(Collector::default());
        generator.schedule(collector.clone(), data(&cache, 'a'));
        assert!(generator.is_suspended());
        assert!(collector.glyphs.lock().unwrap().is_empty());
    }
}
