//! Mosaic (pixellation) transformation.
//!
//! Shrinks the image to a coarse grid with nearest-neighbour sampling and
//! blows it back up the same way, so every grid cell becomes a flat block.
//!
//! The grid is configured by exactly one of target width, target height or
//! downscale factor; whichever was set last wins. Without configuration the
//! factor is 1 and the transform returns a copy.

use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::core::{ensure_rgba, resize_nearest};
use super::Transform;
use crate::error::FilterResult;
use crate::fingerprint::{fingerprint_identity, CacheKey, KeyEncoder};

/// How the pixellated grid size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MosaicGrid {
    /// Grid columns; rows follow the aspect ratio.
    Width(u32),
    /// Grid rows; columns follow the aspect ratio.
    Height(u32),
    /// Divide both dimensions by this factor.
    Factor(f32),
}

/// Pixellates the image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mosaic {
    grid: MosaicGrid,
}

impl Default for Mosaic {
    fn default() -> Self {
        Self {
            grid: MosaicGrid::Factor(1.0),
        }
    }
}

impl Mosaic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks across. Values above the source width copy the image.
    pub fn by_width(mut self, width_pixels: u32) -> Self {
        self.grid = MosaicGrid::Width(width_pixels.max(1));
        self
    }

    /// Number of blocks down. Values above the source height copy the image.
    pub fn by_height(mut self, height_pixels: u32) -> Self {
        self.grid = MosaicGrid::Height(height_pixels.max(1));
        self
    }

    /// Downscale factor; 2 halves the grid in both directions. Factors at or
    /// below 1 copy the image.
    pub fn by_factor(mut self, factor: f32) -> Self {
        self.grid = MosaicGrid::Factor(factor.max(1.0));
        self
    }

    pub fn grid(&self) -> MosaicGrid {
        self.grid
    }

    /// Resolve the grid against a source size.
    ///
    /// # Returns
    /// `(columns, rows)`, each at least 1 and at most the source dimension
    pub fn resolve_grid(&self, width: usize, height: usize) -> (usize, usize) {
        let (w, h) = (width as f32, height as f32);
        let (cols, rows) = match self.grid {
            MosaicGrid::Width(target) => {
                let cols = (target as usize).min(width);
                let rows = (h / (w / cols.max(1) as f32).max(1.0)).round() as usize;
                (cols, rows)
            }
            MosaicGrid::Height(target) => {
                let rows = (target as usize).min(height);
                let cols = (w / (h / rows.max(1) as f32).max(1.0)).round() as usize;
                (cols, rows)
            }
            MosaicGrid::Factor(factor) => (
                (w / factor).round() as usize,
                (h / factor).round() as usize,
            ),
        };
        (cols.clamp(1, width.max(1)), rows.clamp(1, height.max(1)))
    }
}

impl CacheKey for Mosaic {
    const ID: &'static str = "bitmap_transforms.Mosaic";

    fn encode_fields(&self, enc: &mut KeyEncoder) {
        match self.grid {
            MosaicGrid::Width(px) => enc.u8(0).u32(px),
            MosaicGrid::Height(px) => enc.u8(1).u32(px),
            MosaicGrid::Factor(f) => enc.u8(2).f32(f),
        };
    }
}

fingerprint_identity!(Mosaic);

impl Transform for Mosaic {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        let (height, width) = ensure_rgba(&source)?;
        if height == 0 || width == 0 {
            return Ok(source.to_owned());
        }

        let (cols, rows) = self.resolve_grid(width, height);
        trace!(width, height, cols, rows, "mosaic");

        if cols == width && rows == height {
            debug!(width, height, "Mosaic grid matches source, copying");
            return Ok(source.to_owned());
        }

        let small = resize_nearest(source, cols, rows);
        Ok(resize_nearest(small.view(), width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(h: usize, w: usize) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((h, w, 4));
        for y in 0..h {
            for x in 0..w {
                img[[y, x, 0]] = ((x * 7 + y * 13) % 256) as u8;
                img[[y, x, 1]] = ((x * 3) % 256) as u8;
                img[[y, x, 3]] = 255;
            }
        }
        img
    }

    #[test]
    fn test_factor_two_on_100x50() {
        let img = checker(50, 100);
        let mosaic = Mosaic::new().by_factor(2.0);
        assert_eq!(mosaic.resolve_grid(100, 50), (50, 25));

        let out = mosaic.transform(img.view()).unwrap();
        assert_eq!(out.dim(), (50, 100, 4));

        let reference = resize_nearest(resize_nearest(img.view(), 50, 25).view(), 100, 50);
        assert_eq!(out, reference);

        // 2x2 blocks are flat
        for by in 0..25 {
            for bx in 0..50 {
                let px = out[[by * 2, bx * 2, 0]];
                assert_eq!(out[[by * 2 + 1, bx * 2 + 1, 0]], px);
                assert_eq!(out[[by * 2, bx * 2 + 1, 0]], px);
            }
        }
    }

    #[test]
    fn test_by_width_keeps_aspect() {
        assert_eq!(Mosaic::new().by_width(10).resolve_grid(100, 50), (10, 5));
        assert_eq!(Mosaic::new().by_height(5).resolve_grid(100, 50), (10, 5));
    }

    #[test]
    fn test_degenerate_settings_copy() {
        let img = checker(6, 8);
        for mosaic in [
            Mosaic::new(),
            Mosaic::new().by_factor(0.5),
            Mosaic::new().by_width(100),
            Mosaic::new().by_height(6),
        ] {
            assert_eq!(mosaic.transform(img.view()).unwrap(), img);
        }
    }

    #[test]
    fn test_last_setting_wins() {
        let a = Mosaic::new().by_width(10).by_factor(3.0);
        let b = Mosaic::new().by_factor(3.0);
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(Mosaic::new().by_width(4), Mosaic::new().by_height(4));
    }

    #[test]
    fn test_large_targets_keep_distinct_keys() {
        let keys = [
            Mosaic::new().fingerprint(),
            Mosaic::new().by_width(u32::MAX).fingerprint(),
            Mosaic::new().by_height(u32::MAX).fingerprint(),
            Mosaic::new().by_width(1).fingerprint(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_ne!(Mosaic::new().by_width(u32::MAX), Mosaic::new());
    }

    #[test]
    fn test_zero_targets_clamp_to_one() {
        let mosaic = Mosaic::new().by_width(0);
        assert_eq!(mosaic.grid(), MosaicGrid::Width(1));
        assert_eq!(mosaic.resolve_grid(4, 4), (1, 1));

        let img = checker(4, 4);
        let out = mosaic.transform(img.view()).unwrap();
        assert!(out.iter().step_by(4).all(|&r| r == out[[0, 0, 0]]));
    }
}
