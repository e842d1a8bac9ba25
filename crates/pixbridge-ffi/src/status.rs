//! C-compatible status codes.

use pixbridge_core::Error;

/// Status returned by every handle function.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixbridgeStatus {
    /// Operation succeeded
    Ok = 0,
    /// Color format tag is not recognized
    UnsupportedFormat = 1,
    /// Buffer size overflows or cannot be allocated
    AllocationError = 2,
    /// Requested length exceeds the encoded region
    OutOfRange = 3,
    /// Engine reported more bytes than the output region holds
    EngineContractViolation = 4,
    /// Engine failed to encode the image
    EncodingFailed = 5,
    /// Null pointer provided for a required parameter
    NullPointer = 6,
}

impl From<&Error> for PixbridgeStatus {
    fn from(error: &Error) -> Self {
        match error {
            Error::UnsupportedFormat(_) => PixbridgeStatus::UnsupportedFormat,
            Error::AllocationError { .. } => PixbridgeStatus::AllocationError,
            Error::OutOfRange { .. } => PixbridgeStatus::OutOfRange,
            Error::EngineContractViolation { .. } => PixbridgeStatus::EngineContractViolation,
            Error::EncodingFailed(_) => PixbridgeStatus::EncodingFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            PixbridgeStatus::from(&Error::UnsupportedFormat(12)),
            PixbridgeStatus::UnsupportedFormat
        );
        assert_eq!(
            PixbridgeStatus::from(&Error::OutOfRange {
                requested: 2,
                capacity: 1
            }),
            PixbridgeStatus::OutOfRange
        );
        assert_eq!(
            PixbridgeStatus::from(&Error::EncodingFailed("x".into())),
            PixbridgeStatus::EncodingFailed
        );
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(PixbridgeStatus::Ok as u32, 0);
        assert_eq!(PixbridgeStatus::NullPointer as u32, 6);
    }
}
