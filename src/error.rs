use crate::header::EncodingMethod;
use thiserror::Error;

/// Broad failure categories, used to decide which failures the engine may
/// recover from by escalating to a more redundant strategy.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    Input,
    Format,
    Integrity,
    Capacity,
    MethodMismatch,
    EncodingMethodFailed,
    Codec,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    #[error("expected exactly {expected} bits, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid image dimensions {width}x{height}")]
    Dimension { width: u64, height: u64 },

    #[error("bit count {len} is not a multiple of the redundancy factor {factor}")]
    Alignment { len: usize, factor: usize },

    #[error("invalid input: {0}")]
    Input(String),

    #[error("internal consistency error: {0}")]
    Consistency(String),

    #[error("header must be exactly {expected} bits, got {actual}")]
    HeaderSize { expected: usize, actual: usize },

    #[error("invalid header: {}", .0.join("; "))]
    InvalidHeader(Vec<String>),

    #[error("Invalid magic signature: no valid steganography header found")]
    NoValidHeader,

    #[error("message validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("message too large for {method}: requires {required} bytes, {available} available")]
    Capacity {
        method: EncodingMethod,
        required: usize,
        available: usize,
    },

    #[error("pixel data exhausted: needed {needed} bits, {available} available")]
    PixelsExhausted { needed: usize, available: usize },

    #[error("message of {length} bytes does not fit in this image with any method (max {capacity})")]
    MessageTooLarge { length: usize, capacity: usize },

    #[error("header declares {found} but decoder is {expected}")]
    MethodMismatch {
        expected: EncodingMethod,
        found: EncodingMethod,
    },

    #[error("self-verification failed for {method}: {reason}")]
    EncodingMethodFailed {
        method: EncodingMethod,
        reason: String,
    },

    #[error("image codec error: {0}")]
    Codec(String),
}

impl StegoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StegoError::Length { .. }
            | StegoError::Dimension { .. }
            | StegoError::Alignment { .. }
            | StegoError::Input(_)
            | StegoError::Consistency(_) => ErrorKind::Input,
            StegoError::HeaderSize { .. }
            | StegoError::InvalidHeader(_)
            | StegoError::NoValidHeader => ErrorKind::Format,
            StegoError::Validation(_) => ErrorKind::Integrity,
            StegoError::Capacity { .. }
            | StegoError::PixelsExhausted { .. }
            | StegoError::MessageTooLarge { .. } => ErrorKind::Capacity,
            StegoError::MethodMismatch { .. } => ErrorKind::MethodMismatch,
            StegoError::EncodingMethodFailed { .. } => ErrorKind::EncodingMethodFailed,
            StegoError::Codec(_) => ErrorKind::Codec,
        }
    }

    /// Stable machine-readable code for callers that surface errors over an API.
    pub fn error_code(&self) -> &'static str {
        match self {
            StegoError::Length { .. } => "LENGTH_ERROR",
            StegoError::Dimension { .. } => "INVALID_DIMENSIONS",
            StegoError::Alignment { .. } => "ALIGNMENT_ERROR",
            StegoError::Input(_) => "INVALID_INPUT",
            StegoError::Consistency(_) => "CONSISTENCY_ERROR",
            StegoError::HeaderSize { .. } => "INVALID_HEADER_SIZE",
            StegoError::InvalidHeader(_) => "INVALID_HEADER",
            StegoError::NoValidHeader => "NO_VALID_HEADER",
            StegoError::Validation(_) => "INTEGRITY_ERROR",
            StegoError::Capacity { .. } | StegoError::PixelsExhausted { .. } => {
                "CAPACITY_EXCEEDED"
            }
            StegoError::MessageTooLarge { .. } => "MESSAGE_TOO_LARGE",
            StegoError::MethodMismatch { .. } => "METHOD_MISMATCH",
            StegoError::EncodingMethodFailed { .. } => "ENCODING_METHOD_FAILED",
            StegoError::Codec(_) => "IMAGE_PROCESSING_ERROR",
        }
    }

    /// Failures the orchestration engine answers by trying a more redundant strategy.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Capacity | ErrorKind::EncodingMethodFailed
        )
    }
}

impl From<image::ImageError> for StegoError {
    fn from(err: image::ImageError) -> Self {
        StegoError::Codec(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;
