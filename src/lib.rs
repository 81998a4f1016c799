//! Bitmap Transforms
//!
//! Post-processing transformations for decoded RGBA bitmaps, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Every filter takes and returns straight-alpha RGBA8 arrays of shape
//! `(height, width, 4)`. Output always has the source dimensions.
//!
//! ## Filters
//! - [`EllipseCrop`]: keep a centred circle or ellipse, fill the rest
//! - [`Flip`]: mirror horizontally, vertically or both
//! - [`GaussianBlur`]: premultiplied Gaussian blur with a bounded kernel
//! - [`Mosaic`]: pixellate with a nearest-neighbour round trip
//! - [`Padding`]: border in a solid colour, source scaled into the interior
//! - [`Shadow`]: blurred, coloured, offset drop shadow
//! - [`Tint`]: flat colour composited with one of 18 blend modes
//!
//! ## Caching
//! Each filter exposes a byte fingerprint through [`CacheKey`]. Two filters
//! are equal, and hash equally, exactly when their fingerprints match, so a
//! host can key transformed bitmaps on `(source, fingerprint)`.

pub mod color;
pub mod error;
pub mod filters;
pub mod fingerprint;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use color::{Color, ColorResolver};
pub use error::{FilterError, FilterResult};
pub use filters::blend::BlendMode;
pub use filters::ellipse::EllipseCrop;
pub use filters::flip::{Flip, FlipDirection};
pub use filters::gaussian_blur::GaussianBlur;
pub use filters::mosaic::{Mosaic, MosaicGrid};
pub use filters::padding::Padding;
pub use filters::shadow::{Direction, Shadow};
pub use filters::tint::Tint;
pub use filters::{FilterConfig, Transform};
pub use fingerprint::CacheKey;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use pyo3::types::PyBytes;

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
    use crate::fingerprint::CacheKey;

    fn to_py_err(err: FilterError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    fn run<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        filter: &impl Transform,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = filter.transform(image.as_array()).map_err(to_py_err)?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Crop an RGBA u8 image to a centred ellipse.
    ///
    /// # Arguments
    /// * `image` - Input image (H, W, 4)
    /// * `x_diameter`, `y_diameter` - Diameters in pixels, or fractions when `fraction` is set
    /// * `circle` - Use `x_diameter` for both axes, fractions of the smaller side
    /// * `angle` - Counter-clockwise rotation in degrees
    /// * `colour` - ARGB fill outside the ellipse
    #[pyfunction]
    #[pyo3(signature = (image, x_diameter=1.0, y_diameter=1.0, fraction=true, circle=false, angle=0.0, colour=0))]
    pub fn ellipse_crop<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        x_diameter: f32,
        y_diameter: f32,
        fraction: bool,
        circle: bool,
        angle: f32,
        colour: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let crop = match (circle, fraction) {
            (true, true) => EllipseCrop::new().circle_size_fraction(x_diameter),
            (true, false) => EllipseCrop::new().circle_size(x_diameter.round() as i32),
            (false, true) => EllipseCrop::new().size_fraction(x_diameter, y_diameter),
            (false, false) => {
                EllipseCrop::new().size(x_diameter.round() as i32, y_diameter.round() as i32)
            }
        };
        run(py, image, &crop.angle(angle).colour(Color(colour)))
    }

    /// Mirror an RGBA u8 image.
    ///
    /// `direction`: 0 = horizontal, 1 = vertical, 2 = both.
    #[pyfunction]
    #[pyo3(signature = (image, direction=0))]
    pub fn flip<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        direction: i32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let direction = FlipDirection::try_from(direction).map_err(to_py_err)?;
        run(py, image, &Flip::new(direction))
    }

    /// Pad an RGBA u8 image, scaling the source into the interior.
    #[pyfunction]
    #[pyo3(signature = (image, left=0, right=0, top=0, bottom=0, colour=0))]
    pub fn padding<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        left: i32,
        right: i32,
        top: i32,
        bottom: i32,
        colour: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let padding = Padding::new()
            .edges(left, right, top, bottom)
            .colour(Color(colour));
        run(py, image, &padding)
    }

    // ========================================================================
    // Blur
    // ========================================================================

    /// Gaussian blur of an RGBA u8 image. Radii above 25 are approximated.
    #[pyfunction]
    pub fn gaussian_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        run(py, image, &GaussianBlur::new(radius))
    }

    /// Drop shadow beneath an RGBA u8 image, clipped to its bounds.
    ///
    /// # Arguments
    /// * `blur_radius` - Shadow softness
    /// * `elevation` - Offset distance in pixels
    /// * `angle` - Degrees, 0 = east, counter-clockwise
    /// * `colour` - ARGB shadow colour (default black at 50%)
    #[pyfunction]
    #[pyo3(signature = (image, blur_radius=0.0, elevation=0.0, angle=0.0, colour=0x8000_0000))]
    pub fn shadow<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        blur_radius: f32,
        elevation: f32,
        angle: f32,
        colour: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let shadow = Shadow::new()
            .blur_radius(blur_radius)
            .elevation(elevation)
            .angle(angle)
            .colour(Color(colour));
        run(py, image, &shadow)
    }

    // ========================================================================
    // Stylize
    // ========================================================================

    /// Pixellate an RGBA u8 image. Pass exactly one of the grid options;
    /// with none the image is copied.
    #[pyfunction]
    #[pyo3(signature = (image, width=None, height=None, factor=None))]
    pub fn mosaic<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        width: Option<u32>,
        height: Option<u32>,
        factor: Option<f32>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mosaic = match (width, height, factor) {
            (Some(w), None, None) => Mosaic::new().by_width(w),
            (None, Some(h), None) => Mosaic::new().by_height(h),
            (None, None, Some(f)) => Mosaic::new().by_factor(f),
            (None, None, None) => Mosaic::new(),
            _ => {
                return Err(PyValueError::new_err(
                    "mosaic takes only one of width, height, factor",
                ))
            }
        };
        run(py, image, &mosaic)
    }

    /// Tint an RGBA u8 image with a colour and blend mode ordinal
    /// (default 5 = SrcIn).
    #[pyfunction]
    #[pyo3(signature = (image, colour=0x8000_0000, mode=5))]
    pub fn tint<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        colour: u32,
        mode: i32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let tint = Tint::new()
            .mode_ordinal(mode)
            .map_err(to_py_err)?
            .colour(Color(colour));
        run(py, image, &tint)
    }

    // ========================================================================
    // Cache keys
    // ========================================================================

    /// Cache fingerprint of a shadow configuration.
    #[pyfunction]
    #[pyo3(signature = (blur_radius=0.0, elevation=0.0, angle=0.0, colour=0x8000_0000))]
    pub fn shadow_fingerprint<'py>(
        py: Python<'py>,
        blur_radius: f32,
        elevation: f32,
        angle: f32,
        colour: u32,
    ) -> Bound<'py, PyBytes> {
        let shadow = Shadow::new()
            .blur_radius(blur_radius)
            .elevation(elevation)
            .angle(angle)
            .colour(Color(colour));
        PyBytes::new(py, &shadow.fingerprint())
    }

    /// Cache fingerprint of a gaussian blur configuration.
    #[pyfunction]
    pub fn gaussian_blur_fingerprint<'py>(py: Python<'py>, radius: f32) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &GaussianBlur::new(radius).fingerprint())
    }

    /// Python module definition
    #[pymodule]
    pub fn bitmap_transforms(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Geometry
        m.add_function(wrap_pyfunction!(ellipse_crop, m)?)?;
        m.add_function(wrap_pyfunction!(flip, m)?)?;
        m.add_function(wrap_pyfunction!(padding, m)?)?;

        // Blur
        m.add_function(wrap_pyfunction!(gaussian_blur, m)?)?;
        m.add_function(wrap_pyfunction!(shadow, m)?)?;

        // Stylize
        m.add_function(wrap_pyfunction!(mosaic, m)?)?;
        m.add_function(wrap_pyfunction!(tint, m)?)?;

        // Cache keys
        m.add_function(wrap_pyfunction!(shadow_fingerprint, m)?)?;
        m.add_function(wrap_pyfunction!(gaussian_blur_fingerprint, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::bitmap_transforms;
