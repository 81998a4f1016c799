//! Drop shadow transformation.
//!
//! Creates a shadow effect by:
//! 1. Blurring a copy of the source, alpha included
//! 2. Colourising it with a source-in colour filter
//! 3. Offsetting it by the elevation along the shadow angle
//! 4. Compositing the source on top, unshifted
//!
//! The output has the source dimensions, so anything pushed past the edge is
//! clipped. Pad the source first by at least blur radius + elevation (see
//! [`Padding`](super::padding::Padding)) to keep the whole shadow.
//!
//! Angles are in degrees with 0 pointing east (right) and increasing
//! counter-clockwise, so 90 casts the shadow upwards.

use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::blend::BlendMode;
use super::core::{bounded_blur_premul, ensure_rgba, pixel_at, to_premul_f32, unpremul_pixel};
use super::Transform;
use crate::color::{self, Color, ColorResolver};
use crate::error::{FilterError, FilterResult};
use crate::fingerprint::{fingerprint_identity, CacheKey, KeyEncoder};

/// Compass direction for the shadow, in 45 degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl Direction {
    pub fn degrees(self) -> f32 {
        match self {
            Direction::East => 0.0,
            Direction::NorthEast => 45.0,
            Direction::North => 90.0,
            Direction::NorthWest => 135.0,
            Direction::West => 180.0,
            Direction::SouthWest => 225.0,
            Direction::South => 270.0,
            Direction::SouthEast => 315.0,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = FilterError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Direction::East,
            1 => Direction::NorthEast,
            2 => Direction::North,
            3 => Direction::NorthWest,
            4 => Direction::West,
            5 => Direction::SouthWest,
            6 => Direction::South,
            7 => Direction::SouthEast,
            _ => return Err(FilterError::invalid(format!("invalid direction {value}"))),
        })
    }
}

/// Draws a blurred, coloured, offset copy of the image beneath it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Shadow {
    blur_radius: f32,
    elevation: f32,
    angle: f32,
    colour: Color,
}

impl Default for Shadow {
    /// No blur, no elevation, east, black at 50% opacity.
    fn default() -> Self {
        Self {
            blur_radius: 0.0,
            elevation: 0.0,
            angle: 0.0,
            colour: Color::HALF_BLACK,
        }
    }
}

impl Shadow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blur_radius(mut self, radius: f32) -> Self {
        self.blur_radius = radius.max(0.0);
        self
    }

    /// Offset distance in pixels.
    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation.max(0.0);
        self
    }

    /// Shadow angle in degrees, 0 = east, counter-clockwise.
    pub fn angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    pub fn direction(self, direction: Direction) -> Self {
        self.angle(direction.degrees())
    }

    /// Set the angle from a raw compass ordinal (0 = east ... 7 = south-east).
    pub fn direction_ordinal(self, ordinal: i32) -> FilterResult<Self> {
        Ok(self.direction(Direction::try_from(ordinal)?))
    }

    pub fn colour(mut self, colour: Color) -> Self {
        self.colour = colour;
        self
    }

    pub fn colour_res(mut self, id: u32, resolver: &dyn ColorResolver) -> FilterResult<Self> {
        self.colour = color::resolve(resolver, id)?;
        Ok(self)
    }

    pub fn shadow_colour(&self) -> Color {
        self.colour
    }

    /// Whole-pixel shadow displacement `(dx, dy)` in image coordinates.
    pub fn offset(&self) -> (isize, isize) {
        let theta = self.angle.to_radians();
        let dx = self.elevation * theta.cos();
        let dy = -(self.elevation * theta.sin());
        (dx.round() as isize, dy.round() as isize)
    }
}

impl CacheKey for Shadow {
    const ID: &'static str = "bitmap_transforms.Shadow";

    fn encode_fields(&self, enc: &mut KeyEncoder) {
        enc.f32(self.blur_radius)
            .f32(self.elevation)
            .f32(self.angle)
            .u32(self.colour.0);
    }
}

fingerprint_identity!(Shadow);

impl Transform for Shadow {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        let (height, width) = ensure_rgba(&source)?;
        // Any offset past the buffer size already clips the whole shadow
        let (ox, oy) = self.offset();
        let ox = ox.clamp(-(width as isize), width as isize);
        let oy = oy.clamp(-(height as isize), height as isize);
        trace!(
            width,
            height,
            blur_radius = self.blur_radius,
            offset_x = ox,
            offset_y = oy,
            colour = self.colour.0,
            "shadow"
        );

        let premul = to_premul_f32(source);
        let silhouette = bounded_blur_premul(&premul, self.blur_radius);
        let shadow_colour = self.colour.to_premul_f32();

        let mut result = Array3::<u8>::zeros((height, width, 4));
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut row)| {
                let sy = y as isize - oy;
                for x in 0..width {
                    let sx = x as isize - ox;
                    let shadow = if sy >= 0 && sy < height as isize && sx >= 0 && sx < width as isize {
                        let blurred = pixel_at(&silhouette, sy as usize, sx as usize);
                        BlendMode::SrcIn.apply(shadow_colour, blurred)
                    } else {
                        [0.0; 4]
                    };
                    let out = unpremul_pixel(BlendMode::SrcOver.apply(pixel_at(&premul, y, x), shadow));
                    for c in 0..4 {
                        row[[x, c]] = out[c];
                    }
                }
            });

        Ok(result)
    }
}
