//! Gaussian blur transformation.
//!
//! Uses separable 2-pass convolution in premultiplied space so transparent
//! pixels do not bleed colour into their neighbours. Radii above
//! [`MAX_BLUR_RADIUS`] are approximated on a downscaled copy.

use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::core::{bounded_blur_premul, ensure_rgba, from_premul_f32, to_premul_f32, MAX_BLUR_RADIUS};
use super::Transform;
use crate::error::FilterResult;
use crate::fingerprint::{fingerprint_identity, CacheKey, KeyEncoder};

/// Blurs the whole image, colour and alpha, by a radius in pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GaussianBlur {
    radius: f32,
}

impl GaussianBlur {
    /// Negative radii are treated as zero.
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether this blur takes the downscale approximation path.
    pub fn is_approximated(&self) -> bool {
        self.radius > MAX_BLUR_RADIUS
    }
}

impl CacheKey for GaussianBlur {
    const ID: &'static str = "bitmap_transforms.GaussianBlur";

    fn encode_fields(&self, enc: &mut KeyEncoder) {
        enc.f32(self.radius);
    }
}

fingerprint_identity!(GaussianBlur);

impl Transform for GaussianBlur {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        let (height, width) = ensure_rgba(&source)?;
        trace!(width, height, radius = self.radius, "gaussian_blur");

        if self.radius <= 0.0 {
            return Ok(source.to_owned());
        }

        let premul = to_premul_f32(source);
        Ok(from_premul_f32(&bounded_blur_premul(&premul, self.radius)))
    }
}
