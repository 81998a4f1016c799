//! WebAssembly exports for the bitmap transforms.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images are
//! flat RGBA byte arrays (length = width * height * 4) and colours are ARGB
//! packed into a u32.

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::color::Color;
use crate::error::FilterError;
use crate::filters::ellipse::EllipseCrop;
use crate::filters::flip::{Flip, FlipDirection};
use crate::filters::gaussian_blur::GaussianBlur;
use crate::filters::mosaic::Mosaic;
use crate::filters::padding::Padding;
use crate::filters::shadow::Shadow;
use crate::filters::tint::Tint;
use crate::filters::Transform;

fn to_js_err(err: FilterError) -> JsError {
    JsError::new(&err.to_string())
}

fn run(data: &[u8], width: usize, height: usize, filter: &impl Transform) -> Result<Vec<u8>, JsError> {
    let input = Array3::from_shape_vec((height, width, 4), data.to_vec())
        .map_err(|_| JsError::new("data length must equal width * height * 4"))?;
    let result = filter.transform(input.view()).map_err(to_js_err)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Geometry
// ============================================================================

/// Crop to a centred ellipse given as fractions of the image size.
#[wasm_bindgen]
pub fn ellipse_crop_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    x_fraction: f32,
    y_fraction: f32,
    angle: f32,
    colour: u32,
) -> Result<Vec<u8>, JsError> {
    let crop = EllipseCrop::new()
        .size_fraction(x_fraction, y_fraction)
        .angle(angle)
        .colour(Color(colour));
    run(data, width, height, &crop)
}

/// Crop to a centred circle, diameter as a fraction of the smaller side.
#[wasm_bindgen]
pub fn circle_crop_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    fraction: f32,
    colour: u32,
) -> Result<Vec<u8>, JsError> {
    let crop = EllipseCrop::new()
        .circle_size_fraction(fraction)
        .colour(Color(colour));
    run(data, width, height, &crop)
}

/// Mirror the image. `direction`: 0 = horizontal, 1 = vertical, 2 = both.
#[wasm_bindgen]
pub fn flip_wasm(data: &[u8], width: usize, height: usize, direction: i32) -> Result<Vec<u8>, JsError> {
    let direction = FlipDirection::try_from(direction).map_err(to_js_err)?;
    run(data, width, height, &Flip::new(direction))
}

#[wasm_bindgen]
pub fn padding_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
    colour: u32,
) -> Result<Vec<u8>, JsError> {
    let padding = Padding::new()
        .edges(left, right, top, bottom)
        .colour(Color(colour));
    run(data, width, height, &padding)
}

// ============================================================================
// Blur
// ============================================================================

#[wasm_bindgen]
pub fn gaussian_blur_wasm(data: &[u8], width: usize, height: usize, radius: f32) -> Result<Vec<u8>, JsError> {
    run(data, width, height, &GaussianBlur::new(radius))
}

/// Drop shadow, angle in degrees with 0 = east, counter-clockwise.
#[wasm_bindgen]
pub fn shadow_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    blur_radius: f32,
    elevation: f32,
    angle: f32,
    colour: u32,
) -> Result<Vec<u8>, JsError> {
    let shadow = Shadow::new()
        .blur_radius(blur_radius)
        .elevation(elevation)
        .angle(angle)
        .colour(Color(colour));
    run(data, width, height, &shadow)
}

// ============================================================================
// Stylize
// ============================================================================

#[wasm_bindgen]
pub fn mosaic_wasm(data: &[u8], width: usize, height: usize, factor: f32) -> Result<Vec<u8>, JsError> {
    run(data, width, height, &Mosaic::new().by_factor(factor))
}

/// Tint with a colour and blend mode ordinal (5 = SrcIn).
#[wasm_bindgen]
pub fn tint_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    colour: u32,
    mode: i32,
) -> Result<Vec<u8>, JsError> {
    let tint = Tint::new()
        .mode_ordinal(mode)
        .map_err(to_js_err)?
        .colour(Color(colour));
    run(data, width, height, &tint)
}
