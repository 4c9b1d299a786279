//! C ABI for native callers.
//!
//! The symbols here are declared in `include/image_util.h`. A JNI or other
//! runtime bridge resolves its buffer handles to `(pointer, capacity)` and
//! hands the integer result straight back to its caller.

use std::ffi::{c_char, c_int, CStr};
use std::ptr::NonNull;
use std::slice;

use crate::error::{GrayscaleError, Result, ResultCode};
use crate::filters::grayscale::{check_buffers, check_capacity, GrayscaleConverter};

/// Convert an RGBA image to grayscale RGBA, preserving alpha.
///
/// Returns one of the `GRAYSCALE_*` codes (0 on success). The output is only
/// meaningful when 0 is returned.
///
/// # Safety
///
/// - `input` must be null or valid for reads of `width * height * 4` bytes.
/// - `output` must be null or valid for writes of `output_capacity` bytes.
/// - The two regions must not overlap.
/// - Both regions must stay valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn convert_to_grayscale(
    input: *const u8,
    width: c_int,
    height: c_int,
    output: *mut u8,
    output_capacity: usize,
) -> c_int {
    log::debug!(
        "convert_to_grayscale: {}x{}, output capacity {} bytes",
        width,
        height,
        output_capacity
    );

    report(unsafe { convert_raw(input, width, height, output, output_capacity) })
}

unsafe fn convert_raw(
    input: *const u8,
    width: c_int,
    height: c_int,
    output: *mut u8,
    output_capacity: usize,
) -> Result<()> {
    let (input, output) = check_buffers(NonNull::new(input.cast_mut()), NonNull::new(output))?;
    let len = check_capacity(width, height, output_capacity)?;

    // SAFETY: both pointers are non-null and the caller guarantees `len`
    // readable input bytes and `output_capacity >= len` writable bytes
    // that do not overlap the input.
    let (src, dst) = unsafe {
        (
            slice::from_raw_parts(input.as_ptr().cast_const(), len),
            slice::from_raw_parts_mut(output.as_ptr(), len),
        )
    };
    GrayscaleConverter::default().try_convert(Some(src), width, height, Some(dst))
}

/// Static, NUL-terminated name of a result code.
///
/// Unknown integers map to `"ERR_UNKNOWN"`. The returned pointer must not
/// be freed.
#[no_mangle]
pub extern "C" fn grayscale_result_name(code: c_int) -> *const c_char {
    result_name_cstr(code).as_ptr()
}

fn result_name_cstr(code: c_int) -> &'static CStr {
    match ResultCode::try_from(code).unwrap_or(ResultCode::Unknown) {
        ResultCode::Success => c"SUCCESS",
        ResultCode::NullBuffer => c"ERR_NULL_BUFFER",
        ResultCode::InvalidDimensions => c"ERR_INVALID_DIMENSIONS",
        ResultCode::OutputTooSmall => c"ERR_OUTPUT_TOO_SMALL",
        ResultCode::Exception => c"ERR_EXCEPTION",
        ResultCode::Unknown => c"ERR_UNKNOWN",
    }
}

pub(crate) fn log_failure(err: &GrayscaleError) {
    log::warn!("grayscale conversion failed with {}: {}", err.code(), err);
}

/// Collapse a conversion result into its integer code, logging failures.
pub(crate) fn report(result: Result<()>) -> c_int {
    match result {
        Ok(()) => ResultCode::Success.code(),
        Err(err) => {
            log_failure(&err);
            err.code().code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_red_through_abi() {
        let input = [255u8, 0, 0, 255].repeat(4);
        let mut output = vec![0u8; 16];

        let code = unsafe {
            convert_to_grayscale(input.as_ptr(), 2, 2, output.as_mut_ptr(), output.len())
        };
        assert_eq!(code, 0);
        for px in output.chunks_exact(4) {
            assert_eq!(px, [76, 76, 76, 255]);
        }
    }

    #[test]
    fn test_null_pointers() {
        let input = [0u8; 16];
        let mut output = [0xAAu8; 16];

        let code = unsafe { convert_to_grayscale(ptr::null(), 2, 2, output.as_mut_ptr(), 16) };
        assert_eq!(code, 1);
        let code = unsafe { convert_to_grayscale(input.as_ptr(), 2, 2, ptr::null_mut(), 16) };
        assert_eq!(code, 1);
        assert!(output.iter().all(|&v| v == 0xAA));
    }

    #[test]
    fn test_dimension_and_capacity_codes() {
        let input = [0u8; 16];
        let mut output = [0u8; 16];

        let code = unsafe { convert_to_grayscale(input.as_ptr(), -2, 2, output.as_mut_ptr(), 16) };
        assert_eq!(code, 2);
        let code = unsafe { convert_to_grayscale(input.as_ptr(), 2, 2, output.as_mut_ptr(), 15) };
        assert_eq!(code, 3);
        // Huge dimensions are rejected before any slice is formed
        let code = unsafe {
            convert_to_grayscale(input.as_ptr(), i32::MAX, i32::MAX, output.as_mut_ptr(), 16)
        };
        assert_eq!(code, 3);
    }

    #[test]
    fn test_larger_capacity_leaves_tail_untouched() {
        let input = [10u8, 20, 30, 40];
        let mut output = [0xAAu8; 8];

        let code = unsafe { convert_to_grayscale(input.as_ptr(), 1, 1, output.as_mut_ptr(), 8) };
        assert_eq!(code, 0);
        assert_eq!(output[3], 40);
        assert_eq!(&output[4..], &[0xAAu8; 4]);
    }

    #[test]
    fn test_result_names() {
        let name = |code| unsafe { CStr::from_ptr(grayscale_result_name(code)) };
        assert_eq!(name(0).to_str(), Ok("SUCCESS"));
        assert_eq!(name(3).to_str(), Ok("ERR_OUTPUT_TOO_SMALL"));
        assert_eq!(name(99).to_str(), Ok("ERR_UNKNOWN"));
        for code in ResultCode::ALL {
            assert_eq!(name(code.code()).to_str(), Ok(code.name()));
        }
    }
}
