// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signed distance field generation from coverage bitmaps.
//!
//! The working raster is thresholded at half coverage and an exact Euclidean
//! distance transform is computed for both the inside and the outside of the
//! outline. The signed distance is then box filtered down to the final size
//! and encoded so that `0.5` lies on the outline, values above it are inside
//! and the encoded range spans [`SDF_BORDER`] pixels on either side.

use alloc::vec;
use alloc::vec::Vec;

use crate::glyph::SDF_BORDER;

/// Stand-in for "no feature pixel reachable" in the squared distance grid.
const FAR: f64 = 1e20;

/// A single channel image used to build a distance field.
#[derive(Clone, Debug)]
pub struct SdfImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl SdfImage {
    /// Wraps a coverage bitmap of `rows` rows of `pitch` bytes, surrounded by
    /// `border` empty pixels on every side.
    pub fn new(rows: u32, pitch: u32, bitmap: &[u8], border: u32) -> Self {
        let width = pitch + 2 * border;
        let height = rows + 2 * border;
        let mut data = vec![0.0; width as usize * height as usize];
        for (row, src) in bitmap
            .chunks_exact(pitch.max(1) as usize)
            .take(rows as usize)
            .enumerate()
        {
            let start = (row + border as usize) * width as usize + border as usize;
            for (dst, &value) in data[start..start + src.len()].iter_mut().zip(src) {
                *dst = f32::from(value) / 255.0;
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Width of the image.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the image.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Replaces the coverage with an encoded distance field, resampled by
    /// `scale`.
    pub fn generate_sdf(&mut self, scale: f32) {
        let (w, h) = (self.width as usize, self.height as usize);
        let outside = squared_distances(&self.data, w, h, |v| v >= 0.5);
        let inside = squared_distances(&self.data, w, h, |v| v < 0.5);
        let signed: Vec<f32> = outside
            .iter()
            .zip(&inside)
            .map(|(&out, &inn)| (out.sqrt() - inn.sqrt()) as f32)
            .collect();

        let out_width = scaled(self.width, scale);
        let out_height = scaled(self.height, scale);
        let step = 1.0 / scale;
        let mut result = Vec::with_capacity(out_width as usize * out_height as usize);
        for oy in 0..out_height {
            let (y0, y1) = source_span(oy, step, h);
            for ox in 0..out_width {
                let (x0, x1) = source_span(ox, step, w);
                let mut sum = 0.0;
                for y in y0..y1 {
                    sum += signed[y * w + x0..y * w + x1].iter().sum::<f32>();
                }
                let mean = sum / ((y1 - y0) * (x1 - x0)) as f32;
                let distance = mean * scale;
                result.push((0.5 - distance / (2 * SDF_BORDER) as f32).clamp(0.0, 1.0));
            }
        }
        self.width = out_width;
        self.height = out_height;
        self.data = result;
    }

    /// Writes the image as 8-bit values into the start of `out`.
    pub fn write_to(&self, out: &mut [u8]) {
        for (dst, &value) in out.iter_mut().zip(&self.data) {
            *dst = (value * 255.0).round() as u8;
        }
    }
}

fn scaled(size: u32, scale: f32) -> u32 {
    (size as f32 * scale).round() as u32
}

/// Source pixels covered by output pixel `index`, never empty.
fn source_span(index: u32, step: f32, limit: usize) -> (usize, usize) {
    let start = ((index as f32 * step) as usize).min(limit.saturating_sub(1));
    let end = (((index + 1) as f32 * step).ceil() as usize).clamp(start + 1, limit);
    (start, end)
}

/// Squared distance from every pixel to the nearest pixel accepted by `is_feature`.
fn squared_distances(
    data: &[f32],
    width: usize,
    height: usize,
    is_feature: impl Fn(f32) -> bool,
) -> Vec<f64> {
    let mut grid: Vec<f64> = data
        .iter()
        .map(|&v| if is_feature(v) { 0.0 } else { FAR })
        .collect();
    let len = width.max(height);
    let mut f = vec![0.0; len];
    let mut d = vec![0.0; len];
    let mut v = vec![0_usize; len];
    let mut z = vec![0.0; len + 1];

    for x in 0..width {
        for y in 0..height {
            f[y] = grid[y * width + x];
        }
        transform_1d(&f[..height], &mut d[..height], &mut v, &mut z);
        for y in 0..height {
            grid[y * width + x] = d[y];
        }
    }
    for y in 0..height {
        let row = &mut grid[y * width..(y + 1) * width];
        f[..width].copy_from_slice(row);
        transform_1d(&f[..width], &mut d[..width], &mut v, &mut z);
        row.copy_from_slice(&d[..width]);
    }
    grid
}

/// One dimensional squared distance transform (lower envelope of parabolas).
fn transform_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let intersection = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };
    let mut k = 0;
    v[0] = 0;
    z[0] = -FAR;
    z[1] = FAR;
    for q in 1..n {
        let mut s = intersection(q, v[k]);
        while k > 0 && s <= z[k] {
            k -= 1;
            s = intersection(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = FAR;
    }
    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}
