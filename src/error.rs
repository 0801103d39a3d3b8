use alloc::string::String;
use enough::StopReason;

/// Errors from BMP decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BmpError {
    /// The input does not start with the "BM" magic bytes.
    #[error("not a bitmap: bad magic bytes")]
    NotABitmap,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Bit depth or compression combination this crate does not decode.
    #[error("unsupported bitmap variant: {0}")]
    Unsupported(String),

    /// A read would run past the end of the input bytes.
    #[error("truncated bitmap data")]
    TruncatedData,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for BmpError {
    fn from(r: StopReason) -> Self {
        BmpError::Cancelled(r)
    }
}
