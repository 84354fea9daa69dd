use ndarray::Array2;
use rayon::prelude::*;

use crate::frame::Frame;

/// Minimum pixel count (h*w) to justify row-level parallelism.
const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Bins used by Otsu's method.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Apply Gaussian blur to a frame using separable 1D convolution.
pub fn gaussian_blur(frame: &Frame, sigma: f32) -> Frame {
    if sigma <= 0.0 {
        return frame.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve(&frame.data, &kernel, Axis2::Rows);
    Frame::new(convolve(&row_pass, &kernel, Axis2::Cols))
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

#[derive(Clone, Copy, PartialEq)]
enum Axis2 {
    Rows,
    Cols,
}

fn convolve(data: &Array2<f32>, kernel: &[f32], axis: Axis2) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;

    let tap = |row: usize, col: usize, ki: usize| -> f32 {
        let offset = ki as isize - radius as isize;
        match axis {
            Axis2::Rows => {
                let src = (col as isize + offset).clamp(0, w as isize - 1) as usize;
                data[[row, src]]
            }
            Axis2::Cols => {
                let src = (row as isize + offset).clamp(0, h as isize - 1) as usize;
                data[[src, col]]
            }
        }
    };

    let compute_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                kernel
                    .iter()
                    .enumerate()
                    .map(|(ki, &kv)| tap(row, col, ki) * kv)
                    .sum()
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(compute_row).collect()
    } else {
        (0..h).map(compute_row).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

/// Binary threshold: pixels at or above `threshold` become 1.0, the rest
/// 0.0. `inverted` flips foreground and background.
pub fn threshold(frame: &Frame, threshold: f32, inverted: bool) -> Frame {
    let (below, above) = if inverted { (1.0, 0.0) } else { (0.0, 1.0) };
    Frame::new(
        frame
            .data
            .mapv(|v| if v >= threshold { above } else { below }),
    )
}

/// Otsu's method: the threshold that maximizes between-class variance.
pub fn otsu_threshold(frame: &Frame) -> f32 {
    let bins = OTSU_HISTOGRAM_BINS;
    let counts = histogram(frame, bins);

    let total = frame.data.len() as f64;
    let mut sum_all: f64 = 0.0;
    for (i, &count) in counts.iter().enumerate() {
        sum_all += i as f64 * count as f64;
    }

    let mut weight_bg: f64 = 0.0;
    let mut sum_bg: f64 = 0.0;
    let mut best_variance = 0.0_f64;
    let mut best_bin = 0usize;

    for (i, &count) in counts.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += i as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between_variance > best_variance {
            best_variance = between_variance;
            best_bin = i;
        }
    }

    (best_bin as f32 + 0.5) / bins as f32
}

/// Pixel-count histogram over [0, 1].
pub fn histogram(frame: &Frame, bins: usize) -> Vec<u64> {
    let mut counts = vec![0u64; bins];
    for &v in frame.data.iter() {
        let bin = ((v.clamp(0.0, 1.0) * (bins - 1) as f32) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    counts
}

/// Grayscale erosion: neighborhood minimum with an odd square kernel,
/// repeated `iterations` times.
pub fn erode(frame: &Frame, kernel: usize, iterations: usize) -> Frame {
    morphology(frame, kernel, iterations, true)
}

/// Grayscale dilation: neighborhood maximum with an odd square kernel,
/// repeated `iterations` times.
pub fn dilate(frame: &Frame, kernel: usize, iterations: usize) -> Frame {
    morphology(frame, kernel, iterations, false)
}

/// Morphological opening (erosion then dilation), removing small specks
/// while preserving larger regions.
pub fn opening(frame: &Frame, kernel: usize, iterations: usize) -> Frame {
    dilate(&erode(frame, kernel, iterations), kernel, iterations)
}

fn morphology(frame: &Frame, kernel: usize, iterations: usize, take_min: bool) -> Frame {
    let radius = (kernel.max(1) / 2) as isize;
    let mut data = frame.data.clone();
    for _ in 0..iterations {
        data = morph_pass(&data, radius, take_min);
    }
    Frame::new(data)
}

fn morph_pass(data: &Array2<f32>, radius: isize, take_min: bool) -> Array2<f32> {
    let (h, w) = data.dim();
    let mut result = Array2::<f32>::zeros((h, w));

    for row in 0..h {
        for col in 0..w {
            let mut extreme = data[[row, col]];
            for dr in -radius..=radius {
                for dc in -radius..=radius {
                    let nr = (row as isize + dr).clamp(0, h as isize - 1) as usize;
                    let nc = (col as isize + dc).clamp(0, w as isize - 1) as usize;
                    let v = data[[nr, nc]];
                    extreme = if take_min {
                        extreme.min(v)
                    } else {
                        extreme.max(v)
                    };
                }
            }
            result[[row, col]] = extreme;
        }
    }

    result
}

/// Linear stretch: maps [black_point, white_point] → [0.0, 1.0].
pub fn stretch_levels(frame: &Frame, black_point: f32, white_point: f32) -> Frame {
    let range = white_point - black_point;
    let range = if range.abs() < 1e-6 { 1.0 } else { range };
    Frame::new(
        frame
            .data
            .mapv(|v| ((v - black_point) / range).clamp(0.0, 1.0)),
    )
}
