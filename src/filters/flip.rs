//! Flip (mirror) transformation.
//!
//! Mirrors the image about its own centre axis:
//! - Horizontal: (x, y) -> (W - 1 - x, y)
//! - Vertical: (x, y) -> (x, H - 1 - y)
//! - Both: (x, y) -> (W - 1 - x, H - 1 - y)

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::core::ensure_rgba;
use super::Transform;
use crate::error::{FilterError, FilterResult};
use crate::fingerprint::{fingerprint_identity, CacheKey, KeyEncoder};

/// Axis (or axes) to mirror across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
    Both,
}

impl TryFrom<i32> for FlipDirection {
    type Error = FilterError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlipDirection::Horizontal),
            1 => Ok(FlipDirection::Vertical),
            2 => Ok(FlipDirection::Both),
            _ => Err(FilterError::invalid(format!("invalid flip direction {value}"))),
        }
    }
}

/// Mirrors the image in a fixed direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Flip {
    direction: FlipDirection,
}

impl Flip {
    pub fn new(direction: FlipDirection) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> FlipDirection {
        self.direction
    }

    /// Scale factors applied about the image centre, `(x, y)`.
    pub fn scales(&self) -> (f32, f32) {
        match self.direction {
            FlipDirection::Horizontal => (-1.0, 1.0),
            FlipDirection::Vertical => (1.0, -1.0),
            FlipDirection::Both => (-1.0, -1.0),
        }
    }
}

impl CacheKey for Flip {
    const ID: &'static str = "bitmap_transforms.Flip";

    fn encode_fields(&self, enc: &mut KeyEncoder) {
        let (x_scale, y_scale) = self.scales();
        enc.f32(x_scale).f32(y_scale);
    }
}

fingerprint_identity!(Flip);

impl Transform for Flip {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        let (height, width) = ensure_rgba(&source)?;
        let (x_scale, y_scale) = self.scales();
        trace!(width, height, x_scale, y_scale, "flip");

        let mirror_x = x_scale < 0.0;
        let mirror_y = y_scale < 0.0;
        let mut result = Array3::<u8>::zeros((height, width, 4));

        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut row)| {
                let sy = if mirror_y { height - 1 - y } else { y };
                for x in 0..width {
                    let sx = if mirror_x { width - 1 - x } else { x };
                    for c in 0..4 {
                        row[[x, c]] = source[[sy, sx, c]];
                    }
                }
            });

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(h: usize, w: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((h, w, 4));
        for y in 0..h {
            for x in 0..w {
                img[[y, x, 0]] = (x * 10) as u8;
                img[[y, x, 1]] = (y * 10) as u8;
                img[[y, x, 3]] = 255;
            }
        }
        img
    }

    #[test]
    fn test_flip_horizontal() {
        let img = gradient(2, 3);
        let out = Flip::new(FlipDirection::Horizontal).transform(img.view()).unwrap();
        assert_eq!(out[[0, 0, 0]], 20);
        assert_eq!(out[[0, 2, 0]], 0);
        assert_eq!(out[[1, 0, 1]], 10); // Rows untouched
    }

    #[test]
    fn test_flip_vertical() {
        let img = gradient(3, 2);
        let out = Flip::new(FlipDirection::Vertical).transform(img.view()).unwrap();
        assert_eq!(out[[0, 0, 1]], 20);
        assert_eq!(out[[2, 0, 1]], 0);
        assert_eq!(out[[0, 1, 0]], 10); // Columns untouched
    }

    #[test]
    fn test_flip_both_is_involution() {
        let img = gradient(5, 7);
        let flip = Flip::new(FlipDirection::Both);
        let once = flip.transform(img.view()).unwrap();
        assert_ne!(once, img);
        let twice = flip.transform(once.view()).unwrap();
        assert_eq!(twice, img);
    }

    #[test]
    fn test_flip_both_matches_reversed_axes() {
        let img = gradient(9, 13);
        let out = Flip::new(FlipDirection::Both).transform(img.view()).unwrap();
        assert_eq!(out, img.slice(ndarray::s![..;-1, ..;-1, ..]));
    }

    #[test]
    fn test_invalid_direction_ordinal() {
        assert_eq!(FlipDirection::try_from(2), Ok(FlipDirection::Both));
        assert!(matches!(
            FlipDirection::try_from(3),
            Err(FilterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_non_rgba() {
        let img = Array3::<u8>::zeros((2, 2, 3));
        assert!(Flip::new(FlipDirection::Both).transform(img.view()).is_err());
    }

    #[test]
    fn test_equality_follows_scales() {
        let h = Flip::new(FlipDirection::Horizontal);
        assert_eq!(h, Flip::new(FlipDirection::Horizontal));
        assert_ne!(h, Flip::new(FlipDirection::Vertical));
        assert_ne!(h.fingerprint(), Flip::new(FlipDirection::Both).fingerprint());
    }
}
