// src/median.rs - Per-pixel median across a stack of pages

use image::RgbImage;
use rayon::prelude::*;

use crate::errors::{Result, WatermarkError};

/// Clamp a requested sample count to `[1, min(page_count, cap)]`
pub fn clamp_sample_count(requested: usize, page_count: usize, cap: usize) -> usize {
    let upper = page_count.min(cap).max(1);
    requested.clamp(1, upper)
}

/// Bucket a sample count so that large counts share cached results.
///
/// Counts up to 10 are kept as-is. Above 10 a count whose last digit is below 5
/// rounds up to the next `..5`, otherwise it rounds to the nearest multiple of 10
/// (11..=14 -> 15, 15..=24 -> 20 or 25, ...).
pub fn bucket_sample_count(count: usize) -> usize {
    if count <= 10 {
        count
    } else if count % 10 < 5 {
        (count / 10) * 10 + 5
    } else {
        ((count + 5) / 10) * 10
    }
}

/// Next requested count when a slider is nudged by one notch.
///
/// Above 10 the reachable counts are the multiples of 5 from 15 up, plus a
/// page-count clamp in between. Stepping down requests a value that buckets to
/// the largest reachable count below `current`, falling back to 10.
pub fn step_sample_count(current: usize, delta: i32) -> usize {
    match delta.signum() {
        1 => current + 1,
        -1 if current > 10 => {
            let below = (current - 1) / 5 * 5;
            if below <= 10 {
                10
            } else {
                below - 1
            }
        }
        -1 => current.saturating_sub(1),
        _ => current,
    }
}

/// Median of a small slice of channel values. Even lengths average the two middle
/// values and truncate.
fn median_of(values: &mut [u8]) -> u8 {
    values.sort_unstable();
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        ((values[n / 2 - 1] as u16 + values[n / 2] as u16) / 2) as u8
    }
}

/// Compute the per-pixel, per-channel median across the first `n` pages.
///
/// `n` is clamped to `[1, pages.len()]`; a single page is returned unchanged.
/// All sampled pages must share the dimensions of `pages[0]`.
pub fn median_image(pages: &[RgbImage], n: usize) -> Result<RgbImage> {
    let first = pages.first().ok_or(WatermarkError::EmptyPageSet)?;
    let n = n.clamp(1, pages.len());
    if n == 1 {
        return Ok(first.clone());
    }

    let (width, height) = first.dimensions();
    let sample = &pages[..n];
    if let Some(bad) = sample.iter().find(|p| p.dimensions() != (width, height)) {
        return Err(WatermarkError::Other(format!(
            "median sample pages must share dimensions: expected {}x{}, got {}x{}",
            width,
            height,
            bad.width(),
            bad.height()
        )));
    }

    let row_len = width as usize * 3;
    let mut data = vec![0u8; row_len * height as usize];

    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let offset = y * row_len;
            let mut values = vec![0u8; n];
            for (i, out) in row.iter_mut().enumerate() {
                for (slot, page) in values.iter_mut().zip(sample.iter()) {
                    *slot = page.as_raw()[offset + i];
                }
                *out = median_of(&mut values);
            }
        });

    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| WatermarkError::Other("median buffer size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_matches_slider_rounding() {
        assert_eq!(bucket_sample_count(1), 1);
        assert_eq!(bucket_sample_count(10), 10);
        assert_eq!(bucket_sample_count(11), 15);
        assert_eq!(bucket_sample_count(14), 15);
        assert_eq!(bucket_sample_count(15), 20);
        assert_eq!(bucket_sample_count(19), 20);
        assert_eq!(bucket_sample_count(23), 25);
        assert_eq!(bucket_sample_count(27), 30);
    }

    #[test]
    fn clamp_respects_page_count_and_cap() {
        assert_eq!(clamp_sample_count(0, 10, 50), 1);
        assert_eq!(clamp_sample_count(30, 10, 50), 10);
        assert_eq!(clamp_sample_count(80, 100, 50), 50);
        assert_eq!(clamp_sample_count(5, 0, 50), 1);
    }

    #[test]
    fn stepping_moves_between_buckets() {
        assert_eq!(bucket_sample_count(step_sample_count(10, 1)), 15);
        assert_eq!(bucket_sample_count(step_sample_count(20, -1)), 15);
        assert_eq!(bucket_sample_count(step_sample_count(15, -1)), 10);
        assert_eq!(step_sample_count(1, -1), 0);
    }

    #[test]
    fn stepping_down_from_a_clamped_count_skips_nothing() {
        assert_eq!(bucket_sample_count(step_sample_count(12, -1)), 10);
        assert_eq!(bucket_sample_count(step_sample_count(11, -1)), 10);
        assert_eq!(bucket_sample_count(step_sample_count(23, -1)), 20);
        assert_eq!(bucket_sample_count(step_sample_count(16, -1)), 15);
        assert_eq!(bucket_sample_count(step_sample_count(25, -1)), 20);
    }

    #[test]
    fn even_count_truncates_mean_of_middle_values() {
        assert_eq!(median_of(&mut [3, 4]), 3);
        assert_eq!(median_of(&mut [10, 0, 20, 30]), 15);
        assert_eq!(median_of(&mut [9, 1, 5]), 5);
    }
}
