//! Core utilities shared by the bitmap filters.
//!
//! This module provides:
//! - RGBA buffer validation
//! - Premultiplied float conversion (compositing and blurring happen there)
//! - The bounded Gaussian blur primitive and its large-radius approximation
//! - Nearest-neighbour and bilinear resampling

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};
use tracing::{debug, trace};

use crate::error::{FilterError, FilterResult};

/// Largest radius the blur primitive handles directly.
///
/// Larger radii are approximated by blurring a downscaled copy at this
/// radius and scaling the result back up.
pub const MAX_BLUR_RADIUS: f32 = 25.0;

/// Check that a buffer is `(height, width, 4)` RGBA.
///
/// # Returns
/// `(height, width)` of the buffer
pub fn ensure_rgba(image: &ArrayView3<u8>) -> FilterResult<(usize, usize)> {
    let (height, width, channels) = image.dim();
    if channels != 4 {
        return Err(FilterError::invalid(format!(
            "expected RGBA buffer with 4 channels, got {channels}"
        )));
    }
    Ok((height, width))
}

/// Convert a 0.0-1.0 value to a byte, rounding to nearest.
#[inline]
pub fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Read one straight-alpha pixel as premultiplied 0.0-1.0 floats.
#[inline]
pub fn premul_pixel(r: u8, g: u8, b: u8, a: u8) -> [f32; 4] {
    let af = a as f32 / 255.0;
    [
        r as f32 / 255.0 * af,
        g as f32 / 255.0 * af,
        b as f32 / 255.0 * af,
        af,
    ]
}

/// Turn a premultiplied float pixel back into straight-alpha bytes.
#[inline]
pub fn unpremul_pixel(p: [f32; 4]) -> [u8; 4] {
    let a = p[3].clamp(0.0, 1.0);
    let a8 = unit_to_u8(a);
    if a8 == 0 {
        return [0, 0, 0, 0];
    }
    [
        unit_to_u8(p[0] / a),
        unit_to_u8(p[1] / a),
        unit_to_u8(p[2] / a),
        a8,
    ]
}

/// Convert an RGBA u8 buffer to premultiplied f32 (0.0-1.0).
pub fn to_premul_f32(image: ArrayView3<u8>) -> Array3<f32> {
    let (height, width, _) = image.dim();
    let mut result = Array3::<f32>::zeros((height, width, 4));

    result
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let p = premul_pixel(
                    image[[y, x, 0]],
                    image[[y, x, 1]],
                    image[[y, x, 2]],
                    image[[y, x, 3]],
                );
                for c in 0..4 {
                    row[[x, c]] = p[c];
                }
            }
        });

    result
}

/// Convert a premultiplied f32 buffer back to straight-alpha RGBA u8.
pub fn from_premul_f32(image: &Array3<f32>) -> Array3<u8> {
    let (height, width, _) = image.dim();
    let mut result = Array3::<u8>::zeros((height, width, 4));

    result
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let p = unpremul_pixel([
                    image[[y, x, 0]],
                    image[[y, x, 1]],
                    image[[y, x, 2]],
                    image[[y, x, 3]],
                ]);
                for c in 0..4 {
                    row[[x, c]] = p[c];
                }
            }
        });

    result
}

/// Generate a normalised 1D Gaussian kernel for a blur radius.
///
/// The radius is mapped to `sigma = 0.4 * radius + 0.6` and the kernel spans
/// `ceil(radius)` taps on each side.
pub fn gaussian_kernel_1d(radius: f32) -> Vec<f32> {
    if radius <= 0.0 {
        return vec![1.0];
    }

    let sigma = 0.4 * radius + 0.6;
    let half = radius.ceil() as usize;
    let kernel_size = half * 2 + 1;

    let mut kernel: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Separable Gaussian blur over a premultiplied buffer, edges clamped.
///
/// All four channels are blurred, so the alpha silhouette spreads along with
/// the colour.
pub fn blur_premul(image: &Array3<f32>, radius: f32) -> Array3<f32> {
    let (height, width, channels) = image.dim();
    if radius <= 0.0 || height == 0 || width == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel_1d(radius);
    let half = kernel.len() / 2;

    let mut temp = Array3::<f32>::zeros((height, width, channels));
    let mut result = Array3::<f32>::zeros((height, width, channels));

    // Horizontal pass
    temp.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                for c in 0..channels {
                    let mut sum = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sx = (x as isize + ki as isize - half as isize)
                            .clamp(0, width as isize - 1) as usize;
                        sum += image[[y, sx, c]] * kv;
                    }
                    row[[x, c]] = sum;
                }
            }
        });

    // Vertical pass
    result
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                for c in 0..channels {
                    let mut sum = 0.0f32;
                    for (ki, &kv) in kernel.iter().enumerate() {
                        let sy = (y as isize + ki as isize - half as isize)
                            .clamp(0, height as isize - 1) as usize;
                        sum += temp[[sy, x, c]] * kv;
                    }
                    row[[x, c]] = sum;
                }
            }
        });

    result
}

/// Blur at any radius with bounded cost.
///
/// Radii up to [`MAX_BLUR_RADIUS`] go straight to [`blur_premul`]. Beyond
/// that the buffer is scaled by `MAX_BLUR_RADIUS / radius` (bilinear, each
/// axis at least one pixel), blurred at the cap, and scaled back up. This is
/// an approximation of a true large-radius blur.
pub fn bounded_blur_premul(image: &Array3<f32>, radius: f32) -> Array3<f32> {
    let (height, width, _) = image.dim();
    if radius <= MAX_BLUR_RADIUS || height == 0 || width == 0 {
        return blur_premul(image, radius);
    }

    let scale = MAX_BLUR_RADIUS / radius;
    let scaled_w = ((width as f32 * scale).round() as usize).max(1);
    let scaled_h = ((height as f32 * scale).round() as usize).max(1);
    debug!(
        radius,
        width, height, scaled_w, scaled_h, "Blur radius above cap, blurring downscaled copy"
    );

    let small = resize_bilinear_premul(image, scaled_w, scaled_h);
    let blurred = blur_premul(&small, MAX_BLUR_RADIUS);
    resize_bilinear_premul(&blurred, width, height)
}

/// Map a destination index to its nearest source index (pixel-centre sampling).
#[inline]
fn nearest_index(dst: usize, dst_len: usize, src_len: usize) -> usize {
    let s = ((dst as f64 + 0.5) * src_len as f64 / dst_len as f64).floor() as usize;
    s.min(src_len - 1)
}

/// Resize an RGBA buffer with nearest-neighbour sampling, no filtering.
pub fn resize_nearest(image: ArrayView3<u8>, new_w: usize, new_h: usize) -> Array3<u8> {
    let (height, width, channels) = image.dim();
    let mut result = Array3::<u8>::zeros((new_h, new_w, channels));
    if height == 0 || width == 0 {
        return result;
    }
    trace!(width, height, new_w, new_h, "resize_nearest");

    result
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            let sy = nearest_index(y, new_h, height);
            for x in 0..new_w {
                let sx = nearest_index(x, new_w, width);
                for c in 0..channels {
                    row[[x, c]] = image[[sy, sx, c]];
                }
            }
        });

    result
}

/// Source sample position and weights for bilinear resampling.
#[inline]
fn bilinear_taps(dst: usize, dst_len: usize, src_len: usize) -> (usize, usize, f32) {
    let pos = ((dst as f32 + 0.5) * src_len as f32 / dst_len as f32 - 0.5)
        .clamp(0.0, (src_len - 1) as f32);
    let i0 = pos.floor() as usize;
    let i1 = (i0 + 1).min(src_len - 1);
    (i0, i1, pos - i0 as f32)
}

/// Resize a premultiplied f32 buffer with bilinear filtering.
pub fn resize_bilinear_premul(image: &Array3<f32>, new_w: usize, new_h: usize) -> Array3<f32> {
    let (height, width, channels) = image.dim();
    if height == new_h && width == new_w {
        return image.clone();
    }
    let mut result = Array3::<f32>::zeros((new_h, new_w, channels));
    if height == 0 || width == 0 {
        return result;
    }
    trace!(width, height, new_w, new_h, "resize_bilinear");

    result
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            let (y0, y1, fy) = bilinear_taps(y, new_h, height);
            for x in 0..new_w {
                let (x0, x1, fx) = bilinear_taps(x, new_w, width);
                for c in 0..channels {
                    let top = image[[y0, x0, c]] * (1.0 - fx) + image[[y0, x1, c]] * fx;
                    let bottom = image[[y1, x0, c]] * (1.0 - fx) + image[[y1, x1, c]] * fx;
                    row[[x, c]] = top * (1.0 - fy) + bottom * fy;
                }
            }
        });

    result
}

/// Read one premultiplied pixel out of an f32 buffer.
#[inline]
pub fn pixel_at(image: &Array3<f32>, y: usize, x: usize) -> [f32; 4] {
    [
        image[[y, x, 0]],
        image[[y, x, 1]],
        image[[y, x, 2]],
        image[[y, x, 3]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn solid(h: usize, w: usize, px: [u8; 4]) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((h, w, 4));
        for y in 0..h {
            for x in 0..w {
                for c in 0..4 {
                    img[[y, x, c]] = px[c];
                }
            }
        }
        img
    }

    #[test]
    fn test_ensure_rgba_rejects_rgb() {
        let img = Array3::<u8>::zeros((2, 2, 3));
        assert!(matches!(
            ensure_rgba(&img.view()),
            Err(FilterError::InvalidArgument(_))
        ));
        let img = Array3::<u8>::zeros((2, 3, 4));
        assert_eq!(ensure_rgba(&img.view()), Ok((2, 3)));
    }

    #[test]
    fn test_kernel_normalised_and_sized() {
        let k = gaussian_kernel_1d(3.0);
        assert_eq!(k.len(), 7);
        assert_abs_diff_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert!(k[3] > k[2] && k[2] > k[1]);
        assert_eq!(gaussian_kernel_1d(0.0), vec![1.0]);
    }

    #[test]
    fn test_premul_roundtrip_opaque() {
        let img = solid(2, 2, [10, 200, 77, 255]);
        let back = from_premul_f32(&to_premul_f32(img.view()));
        assert_eq!(back, img);
    }

    #[test]
    fn test_transparent_pixels_unpremultiply_to_zero() {
        let img = solid(1, 1, [255, 255, 255, 0]);
        let back = from_premul_f32(&to_premul_f32(img.view()));
        assert_eq!(back[[0, 0, 0]], 0);
        assert_eq!(back[[0, 0, 3]], 0);
    }

    #[test]
    fn test_blur_preserves_uniform_image() {
        let img = solid(9, 9, [40, 80, 120, 255]);
        let blurred = from_premul_f32(&blur_premul(&to_premul_f32(img.view()), 4.0));
        assert_eq!(blurred, img);
    }

    #[test]
    fn test_blur_spreads_alpha() {
        let mut img = Array3::<u8>::zeros((9, 9, 4));
        img[[4, 4, 3]] = 255;
        let blurred = blur_premul(&to_premul_f32(img.view()), 2.0);
        assert!(blurred[[4, 4, 3]] < 1.0);
        assert!(blurred[[4, 5, 3]] > 0.0);
        assert!(blurred[[4, 3, 3]] > 0.0);
        assert_abs_diff_eq!(blurred[[4, 5, 3]], blurred[[4, 3, 3]], epsilon = 1e-6);
    }

    #[test]
    fn test_bounded_blur_below_cap_is_direct() {
        let mut img = Array3::<u8>::zeros((16, 16, 4));
        img[[8, 8, 3]] = 255;
        let premul = to_premul_f32(img.view());
        assert_eq!(bounded_blur_premul(&premul, 10.0), blur_premul(&premul, 10.0));
    }

    #[test]
    fn test_bounded_blur_above_cap_downscales() {
        let mut img = Array3::<u8>::zeros((40, 40, 4));
        img[[20, 20, 3]] = 255;
        let premul = to_premul_f32(img.view());

        let expected = {
            let small = resize_bilinear_premul(&premul, 20, 20);
            resize_bilinear_premul(&blur_premul(&small, MAX_BLUR_RADIUS), 40, 40)
        };
        assert_eq!(bounded_blur_premul(&premul, 50.0), expected);
    }

    #[test]
    fn test_nearest_half_then_double_makes_blocks() {
        let mut img = Array3::<u8>::zeros((4, 4, 4));
        for y in 0..4 {
            for x in 0..4 {
                img[[y, x, 0]] = (y * 4 + x) as u8;
                img[[y, x, 3]] = 255;
            }
        }
        let small = resize_nearest(img.view(), 2, 2);
        assert_eq!(small.dim(), (2, 2, 4));
        // Centre sampling picks source index 1 and 3
        assert_eq!(small[[0, 0, 0]], 5);
        assert_eq!(small[[1, 1, 0]], 15);

        let big = resize_nearest(small.view(), 4, 4);
        assert_eq!(big[[0, 0, 0]], big[[1, 1, 0]]);
        assert_eq!(big[[2, 2, 0]], big[[3, 3, 0]]);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut img = Array3::<f32>::zeros((1, 2, 4));
        img[[0, 1, 0]] = 1.0;
        let up = resize_bilinear_premul(&img, 4, 1);
        // Outer samples clamp, inner samples interpolate
        assert_abs_diff_eq!(up[[0, 0, 0]], 0.0);
        assert_abs_diff_eq!(up[[0, 1, 0]], 0.25);
        assert_abs_diff_eq!(up[[0, 2, 0]], 0.75);
        assert_abs_diff_eq!(up[[0, 3, 0]], 1.0);
    }
}
