//! Grayscale conversion filter.
//!
//! Converts RGBA8 pixels to R=G=B=luma with alpha passed through unchanged.
//! The default weighting is ITU-R BT.601 (0.299, 0.587, 0.114).
//!
//! ## Buffer Contract
//!
//! - Input and output are caller-owned, row-major RGBA with no row padding
//!   (`width * 4` bytes per row).
//! - Nothing here allocates on the [`GrayscaleConverter::convert`] path.
//! - Input and output must not overlap. This is not checked.
//!
//! ## Fixed Point
//!
//! Weights are kept in Q14 so that the per-pixel math is integer only:
//! `Y = (wr*R + wg*G + wb*B + 8192) >> 14`. With BT.601 this rounds to
//! nearest and matches the float formula to within one step.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use ndarray::{Array3, ArrayView3};
use rayon::prelude::*;

use crate::error::{BufferRole, GrayscaleError, Result, ResultCode};

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Fractional bits of the fixed point luma weights.
pub const LUMA_SHIFT: u32 = 14;
const LUMA_ONE: u32 = 1 << LUMA_SHIFT;
const LUMA_HALF: u32 = 1 << (LUMA_SHIFT - 1);

// ============================================================================
// Weights
// ============================================================================

/// RGB channel weights for the luma computation, normalized to sum to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LumaWeights {
    r: u32,
    g: u32,
    b: u32,
}

impl Default for LumaWeights {
    fn default() -> Self {
        Self::bt601()
    }
}

impl LumaWeights {
    /// ITU-R BT.601 luma (default): 0.299, 0.587, 0.114
    pub const fn bt601() -> Self {
        Self { r: 4899, g: 9617, b: 1868 }
    }

    /// ITU-R BT.709 luminosity: 0.2126, 0.7152, 0.0722
    pub const fn bt709() -> Self {
        Self { r: 3483, g: 11718, b: 1183 }
    }

    /// Simple average (R+G+B)/3
    pub const fn average() -> Self {
        Self { r: 5461, g: 5462, b: 5461 }
    }

    /// Create custom weights (normalized automatically).
    ///
    /// Negative or non-finite weights count as zero. If nothing is left,
    /// BT.601 is used.
    pub fn custom(r: f32, g: f32, b: f32) -> Self {
        let (r, g, b) = (non_negative(r), non_negative(g), non_negative(b));
        let sum = r + g + b;
        if !(sum > 0.0 && sum.is_finite()) {
            return Self::bt601();
        }

        let scale = LUMA_ONE as f32 / sum;
        let qr = (r * scale).round() as u32;
        let qb = (b * scale).round() as u32;
        // Green absorbs the rounding so the weights sum to exactly one.
        let qg = LUMA_ONE.saturating_sub(qr + qb);
        Self { r: qr, g: qg, b: qb }
    }

    /// Effective weights as floats.
    pub fn as_f32(&self) -> (f32, f32, f32) {
        let one = LUMA_ONE as f32;
        (self.r as f32 / one, self.g as f32 / one, self.b as f32 / one)
    }

    /// Luma of one pixel, rounded to nearest and clamped to 255.
    #[inline]
    pub fn luma(&self, r: u8, g: u8, b: u8) -> u8 {
        let acc = self.r * u32::from(r) + self.g * u32::from(g) + self.b * u32::from(b);
        ((acc + LUMA_HALF) >> LUMA_SHIFT).min(255) as u8
    }
}

fn non_negative(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Null check for both buffers, input first.
///
/// Generic so the same ordering serves slices and raw pointers.
pub fn check_buffers<I, O>(input: Option<I>, output: Option<O>) -> Result<(I, O)> {
    let input = input.ok_or(GrayscaleError::NullBuffer { role: BufferRole::Input })?;
    let output = output.ok_or(GrayscaleError::NullBuffer { role: BufferRole::Output })?;
    Ok((input, output))
}

/// Byte size of a `width x height` RGBA image, computed in 64 bits.
pub fn required_len(width: i32, height: i32) -> Result<u64> {
    if width <= 0 || height <= 0 {
        return Err(GrayscaleError::InvalidDimensions {
            width: i64::from(width),
            height: i64::from(height),
        });
    }
    Ok(width as u64 * height as u64 * BYTES_PER_PIXEL as u64)
}

/// Dimension and capacity checks. Returns the number of bytes to process.
pub fn check_capacity(width: i32, height: i32, capacity: usize) -> Result<usize> {
    let required = required_len(width, height)?;
    let too_small = || GrayscaleError::OutputTooSmall {
        required,
        capacity: u64::try_from(capacity).unwrap_or(u64::MAX),
    };

    if u64::try_from(capacity).map_or(false, |c| c < required) {
        return Err(too_small());
    }
    // capacity >= required, so this only fails where usize is narrower than u64
    usize::try_from(required).map_err(|_| too_small())
}

// ============================================================================
// Kernel
// ============================================================================

/// Convert RGBA pixels of `input` into `output`.
///
/// Processes `min(input.len(), output.len()) / 4` pixels; callers pass
/// equally sized slices.
pub fn grayscale_rgba_slice(input: &[u8], output: &mut [u8], weights: &LumaWeights) {
    let pixels = input
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(output.chunks_exact_mut(BYTES_PER_PIXEL));

    for (src, dst) in pixels {
        let y = weights.luma(src[0], src[1], src[2]);
        dst[0] = y;
        dst[1] = y;
        dst[2] = y;
        dst[3] = src[3];
    }
}

/// Run `f`, turning a panic into a fault error.
///
/// String payloads are recognized faults, anything else is unknown.
pub(crate) fn run_guarded<F: FnOnce()>(f: F) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(fault_from_panic)
}

fn fault_from_panic(payload: Box<dyn Any + Send>) -> GrayscaleError {
    if let Some(message) = payload.downcast_ref::<&str>() {
        GrayscaleError::Fault { message: (*message).to_string() }
    } else if let Some(message) = payload.downcast_ref::<String>() {
        GrayscaleError::Fault { message: message.clone() }
    } else {
        GrayscaleError::Unknown
    }
}

// ============================================================================
// Converter
// ============================================================================

/// Allocation-free RGBA to grayscale converter.
///
/// Stateless apart from its weights; a single instance may be shared across
/// threads as long as every call gets its own pair of buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrayscaleConverter {
    weights: LumaWeights,
}

impl GrayscaleConverter {
    pub const fn new(weights: LumaWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> LumaWeights {
        self.weights
    }

    /// Convert `input` into `output` and report the outcome as a result code.
    ///
    /// `None` stands for a null reference; `output.len()` is the output
    /// capacity. Only the first `width * height * 4` bytes of `output` are
    /// written, and only after every check passed. On any code other than
    /// [`ResultCode::Success`] the output contents are undefined.
    pub fn convert(
        &self,
        input: Option<&[u8]>,
        width: i32,
        height: i32,
        output: Option<&mut [u8]>,
    ) -> ResultCode {
        match self.try_convert(input, width, height, output) {
            Ok(()) => ResultCode::Success,
            Err(err) => err.code(),
        }
    }

    /// Same as [`convert`](Self::convert) with a typed error.
    ///
    /// Checks run in order: null buffers, dimensions, output capacity,
    /// input length.
    pub fn try_convert(
        &self,
        input: Option<&[u8]>,
        width: i32,
        height: i32,
        output: Option<&mut [u8]>,
    ) -> Result<()> {
        let (input, output) = check_buffers(input, output)?;
        let len = check_capacity(width, height, output.len())?;
        if input.len() < len {
            return Err(GrayscaleError::InputTooSmall {
                required: len as u64,
                actual: input.len(),
            });
        }

        let weights = self.weights;
        run_guarded(|| grayscale_rgba_slice(&input[..len], &mut output[..len], &weights))
    }
}

/// Convert with BT.601 weights. See [`GrayscaleConverter::convert`].
pub fn convert(
    input: Option<&[u8]>,
    width: i32,
    height: i32,
    output: Option<&mut [u8]>,
) -> ResultCode {
    GrayscaleConverter::default().convert(input, width, height, output)
}

/// Convert with BT.601 weights. See [`GrayscaleConverter::try_convert`].
pub fn try_convert(
    input: Option<&[u8]>,
    width: i32,
    height: i32,
    output: Option<&mut [u8]>,
) -> Result<()> {
    GrayscaleConverter::default().try_convert(input, width, height, output)
}

// ============================================================================
// Array API
// ============================================================================

fn array_dims(width: usize, height: usize, channels: usize) -> Result<(i32, i32)> {
    if channels != BYTES_PER_PIXEL {
        return Err(GrayscaleError::ChannelCount { channels });
    }
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(GrayscaleError::InvalidDimensions {
            width: i64::try_from(width).unwrap_or(i64::MAX),
            height: i64::try_from(height).unwrap_or(i64::MAX),
        }),
    }
}

/// A missing slice means the array could not be viewed as one contiguous
/// buffer, which counts as an invalid reference.
fn contiguous<T>(slice: Option<T>, role: BufferRole) -> Result<T> {
    slice.ok_or(GrayscaleError::NullBuffer { role })
}

/// Convert a flat (height, width, channels) buffer pair into `output`.
///
/// For callers that resolve their own array handles: `None` is an
/// unresolvable (null or non-contiguous) buffer. Buffers are checked before
/// the shape, then the usual dimension and capacity checks apply.
pub fn try_convert_shaped(
    input: Option<&[u8]>,
    shape: (usize, usize, usize),
    output: Option<&mut [u8]>,
    weights: LumaWeights,
) -> Result<()> {
    let (input, output) = check_buffers(input, output)?;
    let (height, width, channels) = shape;
    let (w, h) = array_dims(width, height, channels)?;
    GrayscaleConverter::new(weights).try_convert(Some(input), w, h, Some(output))
}

/// Convert RGBA u8 image to grayscale (BT.601 luma).
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, 4) with RGBA u8 values
///
/// # Returns
/// New array with grayscale values in RGB channels, alpha preserved
pub fn grayscale_rgba_u8(input: ArrayView3<u8>) -> Result<Array3<u8>> {
    grayscale_weighted_u8(input, LumaWeights::default())
}

/// Convert RGBA u8 image to grayscale with custom weights.
///
/// Views that are not in standard layout are copied first.
pub fn grayscale_weighted_u8(input: ArrayView3<u8>, weights: LumaWeights) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    let (w, h) = array_dims(width, height, channels)?;
    let input = input.as_standard_layout();
    let src = contiguous(input.as_slice(), BufferRole::Input)?;

    let mut output = Array3::<u8>::zeros((height, width, BYTES_PER_PIXEL));
    {
        let dst = contiguous(output.as_slice_mut(), BufferRole::Output)?;
        GrayscaleConverter::new(weights).try_convert(Some(src), w, h, Some(dst))?;
    }
    Ok(output)
}

/// Row-parallel variant of [`grayscale_weighted_u8`] using rayon.
pub fn grayscale_weighted_par_u8(input: ArrayView3<u8>, weights: LumaWeights) -> Result<Array3<u8>> {
    let (height, width, channels) = input.dim();
    let (w, h) = array_dims(width, height, channels)?;
    required_len(w, h)?;
    let input = input.as_standard_layout();
    let src = contiguous(input.as_slice(), BufferRole::Input)?;

    let mut output = Array3::<u8>::zeros((height, width, BYTES_PER_PIXEL));
    {
        let dst = contiguous(output.as_slice_mut(), BufferRole::Output)?;
        let row = width * BYTES_PER_PIXEL;
        run_guarded(|| {
            src.par_chunks(row)
                .zip(dst.par_chunks_mut(row))
                .for_each(|(s, d)| grayscale_rgba_slice(s, d, &weights));
        })?;
    }
    Ok(output)
}
