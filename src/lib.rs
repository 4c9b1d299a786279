//! ImageUtil Rust core
//!
//! RGBA to grayscale conversion that writes into caller-owned buffers,
//! exposed through a C ABI, Python bindings via PyO3 and WASM bindings
//! for JavaScript.
//!
//! ## Image Format
//! - **RGBA8**: (height, width, 4), row-major, `width * 4` bytes per row
//!
//! Output pixels are `(Y, Y, Y, A)` with `Y` the BT.601 luma of the input
//! pixel and `A` its alpha, copied unchanged.
//!
//! ## Result Codes
//! Every entry point that writes into a caller buffer reports one of the
//! stable [`ResultCode`] values. Panics never leave the crate.

pub mod error;
pub mod ffi;
pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{BufferRole, GrayscaleError, ResultCode};
pub use filters::grayscale::{
    convert, grayscale_rgba_u8, grayscale_weighted_par_u8, grayscale_weighted_u8, try_convert,
    try_convert_shaped, GrayscaleConverter, LumaWeights,
};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3, PyReadwriteArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::error::{GrayscaleError, ResultCode};
    use crate::ffi::{log_failure, report};
    use crate::filters::grayscale::{grayscale_weighted_u8, try_convert_shaped, LumaWeights};

    fn to_py_err(err: GrayscaleError) -> PyErr {
        log_failure(&err);
        PyValueError::new_err(err.to_string())
    }

    /// Convert RGBA u8 image to grayscale using BT.601 luma.
    ///
    /// Output is a new RGBA array with R=G=B=luma, alpha preserved.
    #[pyfunction]
    pub fn grayscale_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = grayscale_weighted_u8(image.as_array(), LumaWeights::bt601())
            .map_err(to_py_err)?;
        Ok(result.into_pyarray(py))
    }

    /// Convert image to grayscale with custom RGB channel weights.
    ///
    /// Weights are normalized automatically.
    #[pyfunction]
    #[pyo3(signature = (image, r_weight=0.299, g_weight=0.587, b_weight=0.114))]
    pub fn grayscale_weighted<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        r_weight: f32,
        g_weight: f32,
        b_weight: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let weights = LumaWeights::custom(r_weight, g_weight, b_weight);
        let result = grayscale_weighted_u8(image.as_array(), weights).map_err(to_py_err)?;
        Ok(result.into_pyarray(py))
    }

    /// Convert `image` into the caller-owned array `out` and return the
    /// integer result code.
    ///
    /// Both arrays must be C-contiguous (height, width, 4); a
    /// non-contiguous array counts as an invalid buffer.
    #[pyfunction]
    pub fn convert_into<'py>(
        image: PyReadonlyArray3<'py, u8>,
        mut out: PyReadwriteArray3<'py, u8>,
    ) -> i32 {
        let shape = image.as_array().dim();
        log::debug!("convert_into: shape {:?}", shape);

        let input = image.as_slice().ok();
        let output = out.as_slice_mut().ok();
        report(try_convert_shaped(input, shape, output, LumaWeights::bt601()))
    }

    /// ImageUtil Rust extension module
    #[pymodule]
    pub fn imageutil_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(grayscale_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(grayscale_weighted, m)?)?;
        m.add_function(wrap_pyfunction!(convert_into, m)?)?;

        // Result codes
        for code in ResultCode::ALL {
            m.add(code.name(), code.code())?;
        }

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::imageutil_rust;
