//! Result codes and errors for the grayscale conversion.
//!
//! `ResultCode` is the wire contract shared with native callers; its integer
//! values never change. `GrayscaleError` is the typed error used on the Rust
//! side and always collapses onto exactly one `ResultCode`.

use std::fmt;

use thiserror::Error;

/// Outcome of a conversion, as seen across the C ABI.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// Conversion completed; output fully written
    Success = 0,
    /// Input or output reference was null/invalid
    NullBuffer = 1,
    /// width <= 0 or height <= 0
    InvalidDimensions = 2,
    /// output capacity < width * height * 4
    OutputTooSmall = 3,
    /// A recognized runtime fault occurred during processing
    Exception = 4,
    /// An unrecognized fault occurred during processing
    Unknown = 5,
}

impl ResultCode {
    pub const ALL: [ResultCode; 6] = [
        ResultCode::Success,
        ResultCode::NullBuffer,
        ResultCode::InvalidDimensions,
        ResultCode::OutputTooSmall,
        ResultCode::Exception,
        ResultCode::Unknown,
    ];

    /// Integer value passed across the ABI.
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_success(self) -> bool {
        matches!(self, ResultCode::Success)
    }

    /// Identifier used in the C header and the binding constants.
    pub const fn name(self) -> &'static str {
        match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::NullBuffer => "ERR_NULL_BUFFER",
            ResultCode::InvalidDimensions => "ERR_INVALID_DIMENSIONS",
            ResultCode::OutputTooSmall => "ERR_OUTPUT_TOO_SMALL",
            ResultCode::Exception => "ERR_EXCEPTION",
            ResultCode::Unknown => "ERR_UNKNOWN",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        code.code()
    }
}

impl TryFrom<i32> for ResultCode {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        ResultCode::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(value)
    }
}

/// Which of the two caller buffers a check refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferRole {
    Input,
    Output,
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferRole::Input => f.write_str("input"),
            BufferRole::Output => f.write_str("output"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrayscaleError {
    #[error("{role} buffer is null")]
    NullBuffer { role: BufferRole },

    #[error("input buffer holds {actual} bytes, {required} required")]
    InputTooSmall { required: u64, actual: usize },

    #[error("invalid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("expected 4 RGBA channels, got {channels}")]
    ChannelCount { channels: usize },

    #[error("output buffer holds {capacity} bytes, {required} required")]
    OutputTooSmall { required: u64, capacity: u64 },

    #[error("fault during conversion: {message}")]
    Fault { message: String },

    #[error("unknown fault during conversion")]
    Unknown,
}

impl GrayscaleError {
    pub fn code(&self) -> ResultCode {
        match self {
            GrayscaleError::NullBuffer { .. } | GrayscaleError::InputTooSmall { .. } => {
                ResultCode::NullBuffer
            }
            GrayscaleError::InvalidDimensions { .. } | GrayscaleError::ChannelCount { .. } => {
                ResultCode::InvalidDimensions
            }
            GrayscaleError::OutputTooSmall { .. } => ResultCode::OutputTooSmall,
            GrayscaleError::Fault { .. } => ResultCode::Exception,
            GrayscaleError::Unknown => ResultCode::Unknown,
        }
    }
}

impl From<GrayscaleError> for ResultCode {
    fn from(err: GrayscaleError) -> Self {
        err.code()
    }
}

impl From<&GrayscaleError> for ResultCode {
    fn from(err: &GrayscaleError) -> Self {
        err.code()
    }
}

pub type Result<T> = std::result::Result<T, GrayscaleError>;
