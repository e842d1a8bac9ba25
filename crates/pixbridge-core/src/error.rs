//! Error types for buffer construction and the encode call.

use thiserror::Error;

/// Errors surfaced to the owner of an [`ImageBuffer`](crate::ImageBuffer).
///
/// None of these are retried internally. Construction errors are local to the
/// caller; call-time errors describe a single encode and leave the buffer
/// usable for the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The color-format tag is not one of the known formats.
    #[error("Unsupported color format tag: {0}")]
    UnsupportedFormat(u8),

    /// The buffer size overflows or cannot be allocated.
    #[error("Cannot allocate image buffer ({width}x{height}, {depth} bytes per pixel): {reason}")]
    AllocationError {
        width: u32,
        height: u32,
        depth: usize,
        reason: String,
    },

    /// A copy-out request is larger than the encoded region.
    #[error("Requested {requested} encoded bytes but the region holds only {capacity}")]
    OutOfRange { requested: usize, capacity: usize },

    /// The engine reported more bytes than the output region can hold.
    #[error("Engine returned {returned} bytes for an output region of {capacity}")]
    EngineContractViolation { returned: usize, capacity: usize },

    /// The engine could not encode the image.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_values() {
        let err = Error::OutOfRange {
            requested: 10,
            capacity: 4,
        };
        assert_eq!(
            err.to_string(),
            "Requested 10 encoded bytes but the region holds only 4"
        );

        let err = Error::UnsupportedFormat(42);
        assert!(err.to_string().contains("42"));
    }
}
