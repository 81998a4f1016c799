//! Porter-Duff compositing and separable blend modes.
//!
//! All math runs on premultiplied RGBA in 0.0-1.0. `src` is the layer being
//! drawn, `dst` is what is already on the canvas.
//!
//! | Mode | Alpha | Colour |
//! |------|-------|--------|
//! | Clear | 0 | 0 |
//! | Src | Sa | Sc |
//! | Dst | Da | Dc |
//! | SrcOver | Sa + Da(1-Sa) | Sc + Dc(1-Sa) |
//! | DstOver | Da + Sa(1-Da) | Dc + Sc(1-Da) |
//! | SrcIn | Sa·Da | Sc·Da |
//! | DstIn | Sa·Da | Dc·Sa |
//! | SrcOut | Sa(1-Da) | Sc(1-Da) |
//! | DstOut | Da(1-Sa) | Dc(1-Sa) |
//! | SrcAtop | Da | Sc·Da + Dc(1-Sa) |
//! | DstAtop | Sa | Dc·Sa + Sc(1-Da) |
//! | Xor | Sa + Da - 2Sa·Da | Sc(1-Da) + Dc(1-Sa) |
//! | Darken | Sa + Da - Sa·Da | Sc(1-Da) + Dc(1-Sa) + min(Sc, Dc) |
//! | Lighten | Sa + Da - Sa·Da | Sc(1-Da) + Dc(1-Sa) + max(Sc, Dc) |
//! | Multiply | Sa·Da | Sc·Dc |
//! | Screen | Sa + Da - Sa·Da | Sc + Dc - Sc·Dc |
//! | Add | min(1, Sa + Da) | min(1, Sc + Dc) |
//! | Overlay | Sa + Da - Sa·Da | see [`overlay`] |

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Compositing mode used when drawing one layer onto another.
///
/// Ordinals are stable and are what the cache fingerprint records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlendMode {
    Clear = 0,
    Src = 1,
    Dst = 2,
    SrcOver = 3,
    DstOver = 4,
    #[default]
    SrcIn = 5,
    DstIn = 6,
    SrcOut = 7,
    DstOut = 8,
    SrcAtop = 9,
    DstAtop = 10,
    Xor = 11,
    Darken = 12,
    Lighten = 13,
    Multiply = 14,
    Screen = 15,
    Add = 16,
    Overlay = 17,
}

impl BlendMode {
    pub const ALL: [BlendMode; 18] = [
        BlendMode::Clear,
        BlendMode::Src,
        BlendMode::Dst,
        BlendMode::SrcOver,
        BlendMode::DstOver,
        BlendMode::SrcIn,
        BlendMode::DstIn,
        BlendMode::SrcOut,
        BlendMode::DstOut,
        BlendMode::SrcAtop,
        BlendMode::DstAtop,
        BlendMode::Xor,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Add,
        BlendMode::Overlay,
    ];

    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Composite one premultiplied pixel onto another.
    #[inline]
    pub fn apply(self, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
        let (sa, da) = (src[3], dst[3]);
        let alpha = match self {
            BlendMode::Clear => 0.0,
            BlendMode::Src | BlendMode::DstAtop => sa,
            BlendMode::Dst | BlendMode::SrcAtop => da,
            BlendMode::SrcIn | BlendMode::DstIn | BlendMode::Multiply => sa * da,
            BlendMode::SrcOut => sa * (1.0 - da),
            BlendMode::DstOut => da * (1.0 - sa),
            BlendMode::Xor => sa + da - 2.0 * sa * da,
            BlendMode::Add => (sa + da).min(1.0),
            BlendMode::SrcOver
            | BlendMode::DstOver
            | BlendMode::Darken
            | BlendMode::Lighten
            | BlendMode::Screen
            | BlendMode::Overlay => sa + da - sa * da,
        };

        let mut out = [0.0f32; 4];
        for c in 0..3 {
            let (sc, dc) = (src[c], dst[c]);
            out[c] = match self {
                BlendMode::Clear => 0.0,
                BlendMode::Src => sc,
                BlendMode::Dst => dc,
                BlendMode::SrcOver => sc + dc * (1.0 - sa),
                BlendMode::DstOver => dc + sc * (1.0 - da),
                BlendMode::SrcIn => sc * da,
                BlendMode::DstIn => dc * sa,
                BlendMode::SrcOut => sc * (1.0 - da),
                BlendMode::DstOut => dc * (1.0 - sa),
                BlendMode::SrcAtop => sc * da + dc * (1.0 - sa),
                BlendMode::DstAtop => dc * sa + sc * (1.0 - da),
                BlendMode::Xor => sc * (1.0 - da) + dc * (1.0 - sa),
                BlendMode::Darken => sc * (1.0 - da) + dc * (1.0 - sa) + sc.min(dc),
                BlendMode::Lighten => sc * (1.0 - da) + dc * (1.0 - sa) + sc.max(dc),
                BlendMode::Multiply => sc * dc,
                BlendMode::Screen => sc + dc - sc * dc,
                BlendMode::Add => (sc + dc).min(1.0),
                BlendMode::Overlay => overlay(sc, sa, dc, da),
            };
        }
        out[3] = alpha;
        out
    }
}

/// Overlay on premultiplied channels: multiply where the destination is
/// dark, screen where it is light.
#[inline]
fn overlay(sc: f32, sa: f32, dc: f32, da: f32) -> f32 {
    let mixed = if 2.0 * dc <= da {
        2.0 * sc * dc
    } else {
        sa * da - 2.0 * (da - dc) * (sa - sc)
    };
    mixed + sc * (1.0 - da) + dc * (1.0 - sa)
}

impl TryFrom<i32> for BlendMode {
    type Error = FilterError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|i| BlendMode::ALL.get(i).copied())
            .ok_or_else(|| FilterError::invalid(format!("invalid blend mode {value}")))
    }
}
