//! WebAssembly exports for the grayscale conversion.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Pixel data is
//! a flat RGBA byte array (length = width * height * 4), as found in
//! `ImageData.data`.

use wasm_bindgen::prelude::*;

use crate::error::{GrayscaleError, ResultCode};
use crate::ffi::{log_failure, report};
use crate::filters::grayscale::{required_len, GrayscaleConverter};

/// Convert RGBA u8 image to grayscale using BT.601 luma.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// Flat array of RGBA bytes with grayscale values, or an error string
#[wasm_bindgen]
pub fn grayscale_rgba_wasm(data: &[u8], width: i32, height: i32) -> Result<Vec<u8>, JsValue> {
    grayscale_rgba_vec(data, width, height).map_err(|err| {
        log_failure(&err);
        JsValue::from_str(&err.to_string())
    })
}

/// `data` is validated before the output is allocated, so bogus dimensions
/// never turn into a huge allocation.
fn grayscale_rgba_vec(data: &[u8], width: i32, height: i32) -> crate::error::Result<Vec<u8>> {
    let required = required_len(width, height)?;
    let too_short = || GrayscaleError::InputTooSmall { required, actual: data.len() };
    if u64::try_from(data.len()).map_or(false, |len| len < required) {
        return Err(too_short());
    }
    // required <= data.len(), so it fits
    let len = usize::try_from(required).map_err(|_| too_short())?;

    let mut output = vec![0u8; len];
    GrayscaleConverter::default().try_convert(Some(data), width, height, Some(&mut output))?;
    Ok(output)
}

/// Convert `data` into the caller-provided `output` and return the result code.
///
/// `output.length` is the output capacity.
#[wasm_bindgen]
pub fn convert_into_wasm(data: &[u8], width: i32, height: i32, output: &mut [u8]) -> i32 {
    log::debug!("convert_into_wasm: {}x{}, capacity {}", width, height, output.len());

    report(GrayscaleConverter::default().try_convert(Some(data), width, height, Some(output)))
}

/// Name of a result code, e.g. `"ERR_OUTPUT_TOO_SMALL"`.
#[wasm_bindgen]
pub fn result_code_name(code: i32) -> String {
    ResultCode::try_from(code)
        .unwrap_or(ResultCode::Unknown)
        .name()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_data_is_rejected_before_allocating() {
        let err = grayscale_rgba_vec(&[0u8; 4], i32::MAX, i32::MAX).unwrap_err();
        assert_eq!(
            err,
            GrayscaleError::InputTooSmall {
                required: i32::MAX as u64 * i32::MAX as u64 * 4,
                actual: 4
            }
        );
        assert_eq!(err.code(), ResultCode::NullBuffer);

        let err = grayscale_rgba_vec(&[0u8; 4], 30000, 30000).unwrap_err();
        assert_eq!(err.code(), ResultCode::NullBuffer);
    }

    #[test]
    fn test_vec_dimension_errors() {
        let err = grayscale_rgba_vec(&[0u8; 16], 0, 2).unwrap_err();
        assert_eq!(err.code(), ResultCode::InvalidDimensions);
    }

    #[test]
    fn test_vec_red() {
        let data = [255u8, 0, 0, 200].repeat(6);
        let output = grayscale_rgba_vec(&data, 3, 2).unwrap();

        assert_eq!(output.len(), 24);
        assert!(output.chunks_exact(4).all(|px| px == [76, 76, 76, 200]));
    }

    #[test]
    fn test_convert_into_codes() {
        let data = [255u8; 16];
        let mut output = [0u8; 16];

        assert_eq!(convert_into_wasm(&data, 2, 2, &mut output), 0);
        assert_eq!(output, [255u8; 16]);
        assert_eq!(convert_into_wasm(&data, 2, 2, &mut output[..15]), 3);
        assert_eq!(convert_into_wasm(&data, -1, 2, &mut output), 2);
        assert_eq!(convert_into_wasm(&data[..8], 2, 2, &mut output), 1);
    }

    #[test]
    fn test_result_code_name() {
        assert_eq!(result_code_name(0), "SUCCESS");
        assert_eq!(result_code_name(2), "ERR_INVALID_DIMENSIONS");
        assert_eq!(result_code_name(42), "ERR_UNKNOWN");
    }
}
