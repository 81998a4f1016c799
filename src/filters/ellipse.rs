//! Ellipse crop transformation.
//!
//! Keeps the part of the image inside a centred circle or ellipse and fills
//! everything outside with a colour (transparent by default).
//!
//! 1. Resolve the diameters (absolute pixels or fractions of the source)
//! 2. Rasterise an anti-aliased ellipse mask, rotated about the image pivot
//! 3. Draw the source through the mask (source-in)
//! 4. Fill the uncovered area beneath with the fill colour (destination-over)

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

/// Subsamples per axis when computing mask coverage.
const COVERAGE_SAMPLES: usize = 4;

/// Crops the image to an ellipse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EllipseCrop {
    circle: bool,
    fraction: bool,
    x_diameter: f32,
    y_diameter: f32,
    angle: f32,
    colour: Color,
}

impl Default for EllipseCrop {
    /// An ellipse filling the whole image, unrotated, transparent outside.
    fn default() -> Self {
        Self {
            circle: false,
            fraction: true,
            x_diameter: 1.0,
            y_diameter: 1.0,
            angle: 0.0,
            colour: Color::TRANSPARENT,
        }
    }
}

impl EllipseCrop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Circle with an absolute diameter in pixels.
    pub fn circle_size(mut self, size: i32) -> Self {
        let d = size.max(0) as f32;
        self.set_diameters(true, false, d, d);
        self
    }

    /// Circle whose diameter is a fraction of the smaller source dimension.
    pub fn circle_size_fraction(mut self, fraction: f32) -> Self {
        let d = fraction.clamp(0.0, 1.0);
        self.set_diameters(true, true, d, d);
        self
    }

    /// Ellipse with absolute diameters in pixels.
    pub fn size(mut self, x: i32, y: i32) -> Self {
        self.set_diameters(false, false, x.max(0) as f32, y.max(0) as f32);
        self
    }

    /// Ellipse whose diameters are fractions of the source width and height.
    pub fn size_fraction(mut self, x: f32, y: f32) -> Self {
        self.set_diameters(false, true, x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
        self
    }

    /// Rotation in degrees, counter-clockwise. Ignored for circles.
    pub fn angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    /// Colour for the area outside the ellipse.
    pub fn colour(mut self, colour: Color) -> Self {
        self.colour = colour;
        self
    }

    pub fn colour_res(mut self, id: u32, resolver: &dyn ColorResolver) -> FilterResult<Self> {
        self.colour = color::resolve(resolver, id)?;
        Ok(self)
    }

    fn set_diameters(&mut self, circle: bool, fraction: bool, x: f32, y: f32) {
        self.circle = circle;
        self.fraction = fraction;
        self.x_diameter = x;
        self.y_diameter = y;
    }

    pub fn is_circle(&self) -> bool {
        self.circle
    }

    /// Rotation that actually applies; circles never rotate.
    pub fn effective_angle(&self) -> f32 {
        if self.circle {
            0.0
        } else {
            self.angle
        }
    }

    /// Diameters in pixels for a source of the given size.
    pub fn resolve_diameters(&self, width: usize, height: usize) -> (f32, f32) {
        if !self.fraction {
            return (self.x_diameter, self.y_diameter);
        }
        if self.circle {
            let d = width.min(height) as f32;
            (self.x_diameter * d, self.y_diameter * d)
        } else {
            (self.x_diameter * width as f32, self.y_diameter * height as f32)
        }
    }
}

impl CacheKey for EllipseCrop {
    const ID: &'static str = "bitmap_transforms.EllipseCrop";

    fn encode_fields(&self, enc: &mut KeyEncoder) {
        enc.f32(self.x_diameter)
            .f32(self.y_diameter)
            .f32(self.effective_angle())
            .u32(self.colour.0)
            .flag(self.circle)
            .flag(self.fraction);
    }
}

fingerprint_identity!(EllipseCrop);

/// Anti-aliased ellipse mask in device space.
struct EllipseMask {
    pivot: (f32, f32),
    centre: (f32, f32),
    radii: (f32, f32),
    cos: f32,
    sin: f32,
}

impl EllipseMask {
    fn new(width: usize, height: usize, diameters: (f32, f32), angle: f32) -> Self {
        let theta = angle.to_radians();
        Self {
            pivot: ((width / 2) as f32, (height / 2) as f32),
            centre: (width as f32 / 2.0, height as f32 / 2.0),
            radii: (diameters.0 / 2.0, diameters.1 / 2.0),
            cos: theta.cos(),
            sin: theta.sin(),
        }
    }

    /// Whether a device point falls in the ellipse once the frame is rotated
    /// back by the ellipse angle.
    #[inline]
    fn contains(&self, px: f32, py: f32) -> bool {
        let (dx, dy) = (px - self.pivot.0, py - self.pivot.1);
        let lx = self.pivot.0 + self.cos * dx - self.sin * dy;
        let ly = self.pivot.1 + self.sin * dx + self.cos * dy;
        let nx = (lx - self.centre.0) / self.radii.0;
        let ny = (ly - self.centre.1) / self.radii.1;
        nx * nx + ny * ny <= 1.0
    }

    /// Fraction of pixel `(x, y)` covered by the ellipse.
    fn coverage(&self, x: usize, y: usize) -> f32 {
        if self.radii.0 <= 0.0 || self.radii.1 <= 0.0 {
            return 0.0;
        }
        let step = 1.0 / COVERAGE_SAMPLES as f32;
        let mut hits = 0usize;
        for j in 0..COVERAGE_SAMPLES {
            let py = y as f32 + (j as f32 + 0.5) * step;
            for i in 0..COVERAGE_SAMPLES {
                let px = x as f32 + (i as f32 + 0.5) * step;
                if self.contains(px, py) {
                    hits += 1;
                }
            }
        }
        hits as f32 / (COVERAGE_SAMPLES * COVERAGE_SAMPLES) as f32
    }
}

impl Transform for EllipseCrop {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        let (height, width) = ensure_rgba(&source)?;
        let diameters = self.resolve_diameters(width, height);
        let angle = self.effective_angle();
        trace!(
            width,
            height,
            x_diameter = diameters.0,
            y_diameter = diameters.1,
            angle,
            "ellipse_crop"
        );

        let mask = EllipseMask::new(width, height, diameters, angle);
        let fill = self.colour.to_premul_f32();
        let mut result = Array3::<u8>::zeros((height, width, 4));

        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut row)| {
                for x in 0..width {
                    let m = mask.coverage(x, y);
                    let src = premul_pixel(
                        source[[y, x, 0]],
                        source[[y, x, 1]],
                        source[[y, x, 2]],
                        source[[y, x, 3]],
                    );
                    let cropped = BlendMode::SrcIn.apply(src, [m; 4]);
                    let out = unpremul_pixel(BlendMode::DstOver.apply(fill, cropped));
                    for c in 0..4 {
                        row[[x, c]] = out[c];
                    }
                }
            });

        Ok(result)
    }
}
