//! Packed ARGB colours and host colour-resource lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

/// 32-bit packed colour, laid out `0xAARRGGBB` with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    /// Opaque black.
    pub const BLACK: Color = Color(0xFF00_0000);
    /// Opaque white.
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    /// Black at 50% opacity; default for shadows and tints.
    pub const HALF_BLACK: Color = Color(0x8000_0000);

    /// Build a colour from its four 8-bit components.
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Straight RGBA bytes, the pixel layout used by buffers.
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    /// Premultiplied RGBA in 0.0-1.0.
    pub fn to_premul_f32(self) -> [f32; 4] {
        let a = self.alpha() as f32 / 255.0;
        [
            self.red() as f32 / 255.0 * a,
            self.green() as f32 / 255.0 * a,
            self.blue() as f32 / 255.0 * a,
            a,
        ]
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Color(value)
    }
}

/// Resolves host colour-resource identifiers to concrete colours.
///
/// Implemented by the hosting application; the filters only ever ask for a
/// single id at configuration time.
pub trait ColorResolver {
    fn resolve_colour(&self, id: u32) -> Option<Color>;
}

impl ColorResolver for HashMap<u32, Color> {
    fn resolve_colour(&self, id: u32) -> Option<Color> {
        self.get(&id).copied()
    }
}

impl<F> ColorResolver for F
where
    F: Fn(u32) -> Option<Color>,
{
    fn resolve_colour(&self, id: u32) -> Option<Color> {
        self(id)
    }
}

pub(crate) fn resolve(resolver: &dyn ColorResolver, id: u32) -> FilterResult<Color> {
    resolver
        .resolve_colour(id)
        .ok_or_else(|| FilterError::invalid(format!("unknown colour resource {id:#x}")))
}
