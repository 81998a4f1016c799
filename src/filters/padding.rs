//! Padding transformation.
//!
//! Adds a border inside the bitmap: the output keeps the source dimensions,
//! is filled with the padding colour, and the source is scaled down into the
//! remaining interior. Transparent padding is the usual way to make room for
//! a [`Shadow`](super::shadow::Shadow).

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::blend::BlendMode;
use super::core::{ensure_rgba, pixel_at, resize_bilinear_premul, to_premul_f32, unpremul_pixel};
use super::Transform;
use crate::color::{self, Color, ColorResolver};
use crate::error::FilterResult;
use crate::fingerprint::{fingerprint_identity, CacheKey, KeyEncoder};

/// Pads the image on each edge with a solid colour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Padding {
    left: u32,
    right: u32,
    top: u32,
    bottom: u32,
    colour: Color,
}

impl Padding {
    /// No padding, transparent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same width on all four edges. Negative widths become 0.
    pub fn uniform(padding: i32) -> Self {
        Self::new().edges(padding, padding, padding, padding)
    }

    /// Individual edge widths. Negative widths become 0.
    pub fn edges(mut self, left: i32, right: i32, top: i32, bottom: i32) -> Self {
        self.left = left.max(0) as u32;
        self.right = right.max(0) as u32;
        self.top = top.max(0) as u32;
        self.bottom = bottom.max(0) as u32;
        self
    }

    pub fn colour(mut self, colour: Color) -> Self {
        self.colour = colour;
        self
    }

    pub fn colour_res(mut self, id: u32, resolver: &dyn ColorResolver) -> FilterResult<Self> {
        self.colour = color::resolve(resolver, id)?;
        Ok(self)
    }

    /// `(left, right, top, bottom)`
    pub fn widths(&self) -> (u32, u32, u32, u32) {
        (self.left, self.right, self.top, self.bottom)
    }

    pub fn fill_colour(&self) -> Color {
        self.colour
    }
}

impl CacheKey for Padding {
    const ID: &'static str = "bitmap_transforms.Padding";

    fn encode_fields(&self, enc: &mut KeyEncoder) {
        enc.u32(self.left)
            .u32(self.right)
            .u32(self.top)
            .u32(self.bottom)
            .u32(self.colour.0);
    }
}

fingerprint_identity!(Padding);

impl Transform for Padding {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        let (height, width) = ensure_rgba(&source)?;
        let (left, top) = (self.left as usize, self.top as usize);
        let inner_w = width.saturating_sub(left + self.right as usize);
        let inner_h = height.saturating_sub(top + self.bottom as usize);
        trace!(width, height, inner_w, inner_h, colour = self.colour.0, "padding");

        let fill = self.colour.to_rgba();
        let mut result = Array3::<u8>::zeros((height, width, 4));
        for mut px in result.lanes_mut(Axis(2)) {
            for c in 0..4 {
                px[c] = fill[c];
            }
        }

        if inner_w == 0 || inner_h == 0 {
            debug!(width, height, "Padding leaves no interior, output is fill only");
            return Ok(result);
        }

        let fill_premul = self.colour.to_premul_f32();
        let scaled = resize_bilinear_premul(&to_premul_f32(source), inner_w, inner_h);

        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .skip(top)
            .take(inner_h)
            .for_each(|(y, mut row)| {
                for ix in 0..inner_w {
                    let src = pixel_at(&scaled, y - top, ix);
                    let out = unpremul_pixel(BlendMode::SrcOver.apply(src, fill_premul));
                    for c in 0..4 {
                        row[[left + ix, c]] = out[c];
                    }
                }
            });

        Ok(result)
    }
}
