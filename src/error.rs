//! Error codes returned by libpwquality and the crate error type.
//!
//! Translation is table-driven: negative codes index `ERROR_TABLE` directly
//! (`-1` is row 0). Codes outside the table map to [`ErrorKind::Unrecognized`]
//! and keep their raw value and the library's own message.

use crate::api::NativeApi;
use crate::sys;
use libc::{c_int, c_void};
use thiserror::Error;

/// Named error kinds defined by libpwquality 1.4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FatalFailure,
    Integer,
    CfgFileOpen,
    CfgFileMalformed,
    UnknownSetting,
    NonIntSetting,
    NonStrSetting,
    MemAlloc,
    TooSimilar,
    MinDigits,
    MinUppers,
    MinLowers,
    MinOthers,
    MinLength,
    Palindrome,
    CaseChangesOnly,
    Rotated,
    MinClasses,
    MaxConsecutive,
    EmptyPassword,
    SamePassword,
    CracklibCheck,
    Rng,
    GenerationFailed,
    UserCheck,
    GecosCheck,
    MaxClassRepeat,
    BadWords,
    MaxSequence,
    /// Negative code the bound library version does not define
    Unrecognized,
}

/// Who is at fault for a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The password was rejected
    Quality,
    /// Library or option misuse
    Configuration,
    /// Allocation, RNG or other internal failure
    Internal,
}

struct ErrorEntry {
    code: c_int,
    kind: ErrorKind,
    symbol: &'static str,
    category: ErrorCategory,
}

macro_rules! error_table {
    ($($code:ident => $kind:ident, $category:ident;)*) => {
        [$(ErrorEntry {
            code: sys::$code,
            kind: ErrorKind::$kind,
            symbol: stringify!($code),
            category: ErrorCategory::$category,
        }),*]
    };
}

/// Row `i` describes code `-(i + 1)`
static ERROR_TABLE: [ErrorEntry; 29] = error_table! {
    PWQ_ERROR_FATAL_FAILURE => FatalFailure, Internal;
    PWQ_ERROR_INTEGER => Integer, Configuration;
    PWQ_ERROR_CFGFILE_OPEN => CfgFileOpen, Configuration;
    PWQ_ERROR_CFGFILE_MALFORMED => CfgFileMalformed, Configuration;
    PWQ_ERROR_UNKNOWN_SETTING => UnknownSetting, Configuration;
    PWQ_ERROR_NON_INT_SETTING => NonIntSetting, Configuration;
    PWQ_ERROR_NON_STR_SETTING => NonStrSetting, Configuration;
    PWQ_ERROR_MEM_ALLOC => MemAlloc, Internal;
    PWQ_ERROR_TOO_SIMILAR => TooSimilar, Quality;
    PWQ_ERROR_MIN_DIGITS => MinDigits, Quality;
    PWQ_ERROR_MIN_UPPERS => MinUppers, Quality;
    PWQ_ERROR_MIN_LOWERS => MinLowers, Quality;
    PWQ_ERROR_MIN_OTHERS => MinOthers, Quality;
    PWQ_ERROR_MIN_LENGTH => MinLength, Quality;
    PWQ_ERROR_PALINDROME => Palindrome, Quality;
    PWQ_ERROR_CASE_CHANGES_ONLY => CaseChangesOnly, Quality;
    PWQ_ERROR_ROTATED => Rotated, Quality;
    PWQ_ERROR_MIN_CLASSES => MinClasses, Quality;
    PWQ_ERROR_MAX_CONSECUTIVE => MaxConsecutive, Quality;
    PWQ_ERROR_EMPTY_PASSWORD => EmptyPassword, Quality;
    PWQ_ERROR_SAME_PASSWORD => SamePassword, Quality;
    PWQ_ERROR_CRACKLIB_CHECK => CracklibCheck, Quality;
    PWQ_ERROR_RNG => Rng, Internal;
    PWQ_ERROR_GENERATION_FAILED => GenerationFailed, Internal;
    PWQ_ERROR_USER_CHECK => UserCheck, Quality;
    PWQ_ERROR_GECOS_CHECK => GecosCheck, Quality;
    PWQ_ERROR_MAX_CLASS_REPEAT => MaxClassRepeat, Quality;
    PWQ_ERROR_BAD_WORDS => BadWords, Quality;
    PWQ_ERROR_MAX_SEQUENCE => MaxSequence, Quality;
};

impl ErrorKind {
    /// Translate a native return code.
    ///
    /// Returns `None` for success (`>= 0`), the named kind for codes the
    /// library defines, and `Unrecognized` for any other negative code.
    pub fn from_code(code: c_int) -> Option<Self> {
        if code >= 0 {
            return None;
        }
        let row = code
            .checked_neg()
            .and_then(|n| usize::try_from(n - 1).ok())
            .and_then(|index| ERROR_TABLE.get(index));
        Some(row.map_or(ErrorKind::Unrecognized, |entry| entry.kind))
    }

    fn entry(self) -> Option<&'static ErrorEntry> {
        ERROR_TABLE.iter().find(|entry| entry.kind == self)
    }

    /// Native code for this kind, `None` for `Unrecognized`
    pub fn code(self) -> Option<c_int> {
        self.entry().map(|entry| entry.code)
    }

    /// `PWQ_ERROR_*` symbol from `pwquality.h`
    pub fn symbol(self) -> &'static str {
        self.entry()
            .map_or("PWQ_ERROR_UNRECOGNIZED", |entry| entry.symbol)
    }

    pub fn category(self) -> ErrorCategory {
        self.entry()
            .map_or(ErrorCategory::Internal, |entry| entry.category)
    }
}

/// Errors surfaced by the safe wrapper
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PwqError {
    /// Native resource could not be created, library or symbol unavailable,
    /// or the library ran out of memory
    #[error("native allocation failed: {0}")]
    Allocation(String),

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("{message} ({}, code {code})", .kind.symbol())]
    Native {
        code: c_int,
        kind: ErrorKind,
        message: String,
    },

    #[error("marshal error: {0}")]
    Marshal(String),
}

pub type Result<T> = std::result::Result<T, PwqError>;

impl PwqError {
    pub(crate) fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PwqError::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Native error kind, if this error came back from a native call
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PwqError::Native { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Raw native return code, if any
    pub fn code(&self) -> Option<c_int> {
        match self {
            PwqError::Native { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the password itself was rejected
    pub fn is_quality_failure(&self) -> bool {
        self.kind()
            .is_some_and(|kind| kind.category() == ErrorCategory::Quality)
    }
}

/// Turn a native return code into a `Result`.
///
/// `auxerror` is handed to `pwquality_strerror`, which takes ownership of it,
/// so callers must pass the pointer exactly once and never reuse it.
pub(crate) fn translate(api: &NativeApi, rc: c_int, auxerror: *mut c_void) -> Result<c_int> {
    let Some(kind) = ErrorKind::from_code(rc) else {
        return Ok(rc);
    };
    let message = api.strerror(rc, auxerror);
    tracing::warn!(code = rc, symbol = kind.symbol(), %message, "libpwquality call failed");
    if kind == ErrorKind::MemAlloc {
        return Err(PwqError::Allocation(message));
    }
    Err(PwqError::Native {
        code: rc,
        kind,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows_match_codes() {
        for (index, entry) in ERROR_TABLE.iter().enumerate() {
            assert_eq!(entry.code, -(index as c_int) - 1, "row {} out of order", index);
            assert!(entry.symbol.starts_with("PWQ_ERROR_"));
        }
    }

    #[test]
    fn test_success_codes_are_not_errors() {
        assert_eq!(ErrorKind::from_code(sys::PWQ_ERROR_SUCCESS), None);
        assert_eq!(ErrorKind::from_code(1), None);
        assert_eq!(ErrorKind::from_code(100), None);
        assert_eq!(ErrorKind::from_code(c_int::MAX), None);
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(
            ErrorKind::from_code(sys::PWQ_ERROR_MIN_LENGTH),
            Some(ErrorKind::MinLength)
        );
        assert_eq!(
            ErrorKind::from_code(sys::PWQ_ERROR_SAME_PASSWORD),
            Some(ErrorKind::SamePassword)
        );
        assert_eq!(
            ErrorKind::from_code(sys::PWQ_ERROR_FATAL_FAILURE),
            Some(ErrorKind::FatalFailure)
        );
        assert_eq!(
            ErrorKind::from_code(sys::PWQ_ERROR_MAX_SEQUENCE),
            Some(ErrorKind::MaxSequence)
        );
    }

    #[test]
    fn test_every_kind_roundtrips_through_code() {
        for entry in ERROR_TABLE.iter() {
            let kind = ErrorKind::from_code(entry.code).unwrap();
            assert_eq!(kind.code(), Some(entry.code));
        }
    }

    #[test]
    fn test_unknown_codes_are_unrecognized() {
        assert_eq!(ErrorKind::from_code(-30), Some(ErrorKind::Unrecognized));
        assert_eq!(ErrorKind::from_code(-1000), Some(ErrorKind::Unrecognized));
        assert_eq!(
            ErrorKind::from_code(c_int::MIN),
            Some(ErrorKind::Unrecognized)
        );
        assert_eq!(ErrorKind::Unrecognized.code(), None);
        assert_eq!(ErrorKind::Unrecognized.symbol(), "PWQ_ERROR_UNRECOGNIZED");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(ErrorKind::MinLength.symbol(), "PWQ_ERROR_MIN_LENGTH");
        assert_eq!(ErrorKind::CracklibCheck.symbol(), "PWQ_ERROR_CRACKLIB_CHECK");
    }

    #[test]
    fn test_categories() {
        assert_eq!(ErrorKind::MinLength.category(), ErrorCategory::Quality);
        assert_eq!(ErrorKind::CracklibCheck.category(), ErrorCategory::Quality);
        assert_eq!(
            ErrorKind::UnknownSetting.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(ErrorKind::MemAlloc.category(), ErrorCategory::Internal);
        assert_eq!(ErrorKind::Rng.category(), ErrorCategory::Internal);
        assert_eq!(ErrorKind::Unrecognized.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_translate_success_and_failure() {
        let api = crate::api::fake::api();
        assert_eq!(translate(&api, 42, std::ptr::null_mut()), Ok(42));

        let err = translate(&api, sys::PWQ_ERROR_MAX_SEQUENCE, std::ptr::null_mut()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MaxSequence));
        assert_eq!(err.code(), Some(sys::PWQ_ERROR_MAX_SEQUENCE));

        let err = translate(&api, -77, std::ptr::null_mut()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unrecognized));
        assert_eq!(err.code(), Some(-77));
    }

    #[test]
    fn test_mem_alloc_translates_to_allocation() {
        let api = crate::api::fake::api();
        let err = translate(&api, sys::PWQ_ERROR_MEM_ALLOC, std::ptr::null_mut()).unwrap_err();
        assert!(matches!(err, PwqError::Allocation(ref msg) if !msg.is_empty()));
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_error_helpers() {
        let err = PwqError::Native {
            code: sys::PWQ_ERROR_PALINDROME,
            kind: ErrorKind::Palindrome,
            message: "The password is a palindrome".to_string(),
        };
        assert_eq!(err.kind(), Some(ErrorKind::Palindrome));
        assert_eq!(err.code(), Some(-15));
        assert!(err.is_quality_failure());
        assert_eq!(
            err.to_string(),
            "The password is a palindrome (PWQ_ERROR_PALINDROME, code -15)"
        );

        let err = PwqError::invalid_option("minlen", "below 6");
        assert_eq!(err.kind(), None);
        assert!(!err.is_quality_failure());
        assert_eq!(err.to_string(), "invalid option `minlen`: below 6");
    }
}
