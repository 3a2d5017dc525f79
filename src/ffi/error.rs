//! Status codes for the exported C ABI.

use crate::error::{ErrorCategory, PwqError};

/// C-compatible status codes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwqbStatus {
    /// Operation succeeded
    Ok = 0,
    /// Null pointer provided
    NullPointer = 1,
    /// Invalid or already-freed handle
    InvalidHandle = 2,
    /// Unknown option, wrong value type or value out of range
    InvalidOption = 3,
    /// Text could not cross the boundary (interior NUL, invalid UTF-8)
    Marshal = 4,
    /// Native allocation or library loading failed
    Allocation = 5,
    /// The password was rejected; see the native code
    QualityRejected = 6,
    /// Any other native failure; see the native code
    NativeFailure = 7,
    /// Output buffer too small
    BufferTooSmall = 8,
    /// A panic was caught at the boundary
    Panic = 9,
}

impl From<&PwqError> for PwqbStatus {
    fn from(e: &PwqError) -> Self {
        match e {
            PwqError::Allocation(_) => PwqbStatus::Allocation,
            PwqError::InvalidOption { .. } => PwqbStatus::InvalidOption,
            PwqError::Marshal(_) => PwqbStatus::Marshal,
            PwqError::Native { kind, .. } => match kind.category() {
                ErrorCategory::Quality => PwqbStatus::QualityRejected,
                ErrorCategory::Configuration | ErrorCategory::Internal => {
                    PwqbStatus::NativeFailure
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PwqbStatus::from(&PwqError::Allocation("oom".into())),
            PwqbStatus::Allocation
        );
        assert_eq!(
            PwqbStatus::from(&PwqError::Marshal("nul".into())),
            PwqbStatus::Marshal
        );
        assert_eq!(
            PwqbStatus::from(&PwqError::InvalidOption {
                name: "x".into(),
                reason: "unknown option".into()
            }),
            PwqbStatus::InvalidOption
        );
        let rejected = PwqError::Native {
            code: -14,
            kind: ErrorKind::MinLength,
            message: "The password is shorter than 8 characters".into(),
        };
        assert_eq!(PwqbStatus::from(&rejected), PwqbStatus::QualityRejected);
        let fatal = PwqError::Native {
            code: -1,
            kind: ErrorKind::FatalFailure,
            message: "Fatal failure".into(),
        };
        assert_eq!(PwqbStatus::from(&fatal), PwqbStatus::NativeFailure);
    }

    #[test]
    fn test_status_values_are_stable() {
        assert_eq!(PwqbStatus::Ok as i32, 0);
        assert_eq!(PwqbStatus::InvalidHandle as i32, 2);
        assert_eq!(PwqbStatus::Panic as i32, 9);
    }
}
