//! Bitmap transformations.
//!
//! ## Buffer Format
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGBA8 | (H, W, 4) | u8 | Straight (non-premultiplied) alpha, 0-255 |
//!
//! Any other channel count is rejected with
//! [`FilterError::InvalidArgument`](crate::FilterError::InvalidArgument).
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Immutable configuration** - builders consume and return `Self`, the
//!   finished value is `Copy` and safe to share across threads
//! - **Pure** - the source is never modified, a new buffer of the same size
//!   is returned, identical inputs give byte-identical output
//! - **Premultiplied compositing** - blending and blurring happen on
//!   premultiplied floats so transparent pixels never bleed colour
//! - **Stable identity** - equality, hashing and the cache fingerprint all
//!   come from one canonical encoding
//!
//! ## Filters
//!
//! - **Geometry**: ellipse crop, flip, padding
//! - **Blur**: gaussian blur, drop shadow
//! - **Stylize**: mosaic, tint

use ndarray::{Array3, ArrayView3};
use serde::{Deserialize, Serialize};

use crate::error::FilterResult;
use crate::fingerprint::CacheKey;

pub mod blend;
pub mod core;
pub mod ellipse;
pub mod flip;
pub mod gaussian_blur;
pub mod mosaic;
pub mod padding;
pub mod shadow;
pub mod tint;

use ellipse::EllipseCrop;
use flip::Flip;
use gaussian_blur::GaussianBlur;
use mosaic::Mosaic;
use padding::Padding;
use shadow::Shadow;
use tint::Tint;

/// A bitmap-to-bitmap operation.
pub trait Transform {
    /// Produce a new RGBA buffer of the same dimensions from `source`.
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>>;
}

/// Any one of the available filters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterConfig {
    EllipseCrop(EllipseCrop),
    Flip(Flip),
    GaussianBlur(GaussianBlur),
    Mosaic(Mosaic),
    Padding(Padding),
    Shadow(Shadow),
    Tint(Tint),
}

impl FilterConfig {
    /// Cache fingerprint of the wrapped filter.
    pub fn fingerprint(&self) -> Vec<u8> {
        match self {
            FilterConfig::EllipseCrop(f) => f.fingerprint(),
            FilterConfig::Flip(f) => f.fingerprint(),
            FilterConfig::GaussianBlur(f) => f.fingerprint(),
            FilterConfig::Mosaic(f) => f.fingerprint(),
            FilterConfig::Padding(f) => f.fingerprint(),
            FilterConfig::Shadow(f) => f.fingerprint(),
            FilterConfig::Tint(f) => f.fingerprint(),
        }
    }

    /// Identifier of the wrapped filter type.
    pub fn id(&self) -> &'static str {
        match self {
            FilterConfig::EllipseCrop(_) => EllipseCrop::ID,
            FilterConfig::Flip(_) => Flip::ID,
            FilterConfig::GaussianBlur(_) => GaussianBlur::ID,
            FilterConfig::Mosaic(_) => Mosaic::ID,
            FilterConfig::Padding(_) => Padding::ID,
            FilterConfig::Shadow(_) => Shadow::ID,
            FilterConfig::Tint(_) => Tint::ID,
        }
    }
}

impl Transform for FilterConfig {
    fn transform(&self, source: ArrayView3<u8>) -> FilterResult<Array3<u8>> {
        match self {
            FilterConfig::EllipseCrop(f) => f.transform(source),
            FilterConfig::Flip(f) => f.transform(source),
            FilterConfig::GaussianBlur(f) => f.transform(source),
            FilterConfig::Mosaic(f) => f.transform(source),
            FilterConfig::Padding(f) => f.transform(source),
            FilterConfig::Shadow(f) => f.transform(source),
            FilterConfig::Tint(f) => f.transform(source),
        }
    }
}

impl PartialEq for FilterConfig {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint() == other.fingerprint()
    }
}

impl Eq for FilterConfig {}

impl std::hash::Hash for FilterConfig {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.fingerprint(), state);
    }
}

macro_rules! into_config {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for FilterConfig {
                fn from(filter: $variant) -> Self {
                    FilterConfig::$variant(filter)
                }
            }
        )*
    };
}

into_config!(EllipseCrop, Flip, GaussianBlur, Mosaic, Padding, Shadow, Tint);
