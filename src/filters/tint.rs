//! Tint transformation.
//!
//! Draws the source unchanged, then composites a flat colour over every
//! pixel with a chosen [`BlendMode`]. The default `SrcIn` mode recolours the
//! image while keeping its silhouette.

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::blend::BlendMode;
use super::core::{ensure_rgba, premul_pixel, unpremul_pixel};
use super::Transform;
use crate::color::{self, Color, ColorResolver};
use crate::error::FilterResult;
use crate::fingerprint::{fingerprint_identity, CacheKey, KeyEncoder};

/// Tints the image with a colour and blend mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tint {
    mode: BlendMode,
    colour: Color,
}

impl Default for Tint {
    fn default() -> Self {
        Self {
            mode: BlendMode::SrcIn,
            colour: Color::HALF_BLACK,
        }
    }
}

impl Tint {
    /// Black at 50% opacity, `SrcIn`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: BlendMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the mode from its raw ordinal.
    pub fn mode_ordinal(self, ordinal: i32) -> FilterResult<Self> {
        Ok(self.mode(BlendMode::try_from(ordinal)?))
    }

    pub fn colour(mut self, colour: Color) -> Self {
        self.colour = colour;
        self
    }

    pub fn colour_res(mut self, id: u32, resolver: &dyn ColorResolver) -> FilterResult<Self> {
        self.colour = color::resolve(resolver, id)?;
        Ok(self)
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.mode
    }

    pub fn tint_colour(&self) -> Color {
        self.colour
    }
}

impl CacheKey for Tint {
    const ID: &'static str = "bitmap_transforms.Tint";

    fn encode_fields(&self, enc: &mut KeyEncoder) {
        enc.u32(self.colour.0).u8(self.mode.ordinal());
    }
}

fingerprint_identity!(Tint);

impl Transform for Tint {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        let (height, width) = ensure_rgba(&source)?;
        trace!(width, height, mode = ?self.mode, colour = self.colour.0, "tint");

        let tint = self.colour.to_premul_f32();
        let mode = self.mode;
        let mut result = Array3::<u8>::zeros((height, width, 4));

        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut row)| {
                for x in 0..width {
                    let dst = premul_pixel(
                        source[[y, x, 0]],
                        source[[y, x, 1]],
                        source[[y, x, 2]],
                        source[[y, x, 3]],
                    );
                    let out = unpremul_pixel(mode.apply(tint, dst));
                    for c in 0..4 {
                        row[[x, c]] = out[c];
                    }
                }
            });

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pixels() -> Array3<u8> {
        // One opaque grey pixel, one fully transparent pixel
        let mut img = Array3::<u8>::zeros((1, 2, 4));
        for c in 0..3 {
            img[[0, 0, c]] = 128;
        }
        img[[0, 0, 3]] = 255;
        img
    }

    #[test]
    fn test_default_src_in_recolours_silhouette() {
        let img = two_pixels();
        let out = Tint::new()
            .colour(Color::argb(255, 255, 0, 0))
            .transform(img.view())
            .unwrap();
        assert_eq!(out.slice(ndarray::s![0, 0, ..]).to_vec(), vec![255, 0, 0, 255]);
        assert_eq!(out.slice(ndarray::s![0, 1, ..]).to_vec(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_default_colour_is_half_black() {
        let img = two_pixels();
        let out = Tint::new().transform(img.view()).unwrap();
        assert_eq!(out[[0, 0, 0]], 0);
        assert_eq!(out[[0, 0, 3]], 128);
    }

    #[test]
    fn test_src_over_darkens() {
        let img = two_pixels();
        let out = Tint::new().mode(BlendMode::SrcOver).transform(img.view()).unwrap();
        // Half black over grey halves the grey, stays opaque
        assert_eq!(out[[0, 0, 0]], 64);
        assert_eq!(out[[0, 0, 3]], 255);
        // Transparent pixel takes the tint
        assert_eq!(out[[0, 1, 3]], 128);
    }

    #[test]
    fn test_dst_mode_is_identity() {
        let img = two_pixels();
        let out = Tint::new().mode(BlendMode::Dst).transform(img.view()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_invalid_mode_ordinal() {
        assert!(Tint::new().mode_ordinal(99).is_err());
        assert_eq!(
            Tint::new().mode_ordinal(14).unwrap().blend_mode(),
            BlendMode::Multiply
        );
    }

    #[test]
    fn test_mode_is_part_of_identity() {
        assert_ne!(Tint::new(), Tint::new().mode(BlendMode::Multiply));
        assert_eq!(Tint::new(), Tint::new().mode(BlendMode::SrcIn));
    }
}
