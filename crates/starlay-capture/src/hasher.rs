use std::fmt::Write;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};
use rustdct::{Dct2, DctPlanner, TransformType2And3};
use starlay_core::HashExtractor;
use starlay_types::HashKey;

/// Side of the grayscale thumbnail fed to the DCT
const THUMB_SIZE: u32 = 32;
/// Side of the low-frequency block kept from the DCT
const HASH_SIZE: usize = 8;
/// Coefficients below this are rounding noise of the transform
const NOISE_FLOOR: f64 = 1e-6;

/// 64-bit DCT perceptual hash, rendered as 16 lowercase hex chars.
///
/// Keys match `imagehash.phash`, so curated databases and color overrides
/// keep working: ITU-R 601 grayscale, Lanczos3 resize to 32x32, 2D DCT-II,
/// top-left 8x8 block thresholded against its median, bits packed MSB first
/// in row-major order.
pub struct PerceptualHasher {
    dct: Arc<dyn TransformType2And3<f64>>,
}

impl PerceptualHasher {
    pub fn new() -> Self {
        let mut planner = DctPlanner::new();
        let dct = planner.plan_dct2(THUMB_SIZE as usize);
        Self { dct }
    }

    fn thumbnail(image: &RgbaImage) -> GrayImage {
        let gray = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            let luma = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
            Luma([luma as u8])
        });

        if gray.dimensions() == (THUMB_SIZE, THUMB_SIZE) {
            gray
        } else {
            imageops::resize(&gray, THUMB_SIZE, THUMB_SIZE, FilterType::Lanczos3)
        }
    }

    /// Low-frequency 8x8 block of the 2D DCT, row-major
    fn low_frequencies(&self, thumb: &GrayImage) -> Vec<f64> {
        let size = THUMB_SIZE as usize;
        let mut grid: Vec<f64> = thumb.pixels().map(|p| p.0[0] as f64).collect();

        for row in grid.chunks_exact_mut(size) {
            self.dct.process_dct2(row);
        }

        let mut column = vec![0.0; size];
        for x in 0..HASH_SIZE {
            for (y, value) in column.iter_mut().enumerate() {
                *value = grid[y * size + x];
            }
            self.dct.process_dct2(&mut column);
            for (y, value) in column.iter().enumerate() {
                grid[y * size + x] = *value;
            }
        }

        (0..HASH_SIZE)
            .flat_map(|y| (0..HASH_SIZE).map(move |x| (y, x)))
            .map(|(y, x)| grid[y * size + x])
            .map(|v| if v.abs() < NOISE_FLOOR { 0.0 } else { v })
            .collect()
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl HashExtractor for PerceptualHasher {
    fn extract(&self, image: &RgbaImage) -> HashKey {
        let coefficients = self.low_frequencies(&Self::thumbnail(image));
        let threshold = median(&coefficients);

        let bits = coefficients
            .iter()
            .fold(0u64, |acc, &v| (acc << 1) | u64::from(v > threshold));

        let mut hex = String::with_capacity(16);
        let _ = write!(hex, "{bits:016x}");
        HashKey::new(hex)
    }
}
