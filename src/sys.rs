//! Raw declarations for libpwquality 1.4 (`pwquality.h`).
//!
//! One function-pointer type per native call. Both binding techniques resolve
//! into these types: the `link` feature takes them from the `extern` block
//! below, the dynamic loader resolves them by symbol name.

#![allow(non_camel_case_types)]

use libc::{c_char, c_int, c_void, size_t};

/// Opaque native settings object
#[repr(C)]
pub struct pwquality_settings_t {
    _private: [u8; 0],
}

pub const PWQ_SETTING_DIFF_OK: c_int = 1;
pub const PWQ_SETTING_MIN_LENGTH: c_int = 3;
pub const PWQ_SETTING_DIG_CREDIT: c_int = 4;
pub const PWQ_SETTING_UP_CREDIT: c_int = 5;
pub const PWQ_SETTING_LOW_CREDIT: c_int = 6;
pub const PWQ_SETTING_OTH_CREDIT: c_int = 7;
pub const PWQ_SETTING_MIN_CLASS: c_int = 8;
pub const PWQ_SETTING_MAX_REPEAT: c_int = 9;
pub const PWQ_SETTING_DICT_PATH: c_int = 10;
pub const PWQ_SETTING_MAX_CLASS_REPEAT: c_int = 11;
pub const PWQ_SETTING_GECOS_CHECK: c_int = 12;
pub const PWQ_SETTING_BAD_WORDS: c_int = 13;
pub const PWQ_SETTING_MAX_SEQUENCE: c_int = 14;
pub const PWQ_SETTING_DICT_CHECK: c_int = 15;
pub const PWQ_SETTING_USER_CHECK: c_int = 16;
pub const PWQ_SETTING_ENFORCING: c_int = 17;
pub const PWQ_SETTING_RETRY_TIMES: c_int = 18;
pub const PWQ_SETTING_ENFORCE_ROOT: c_int = 19;
pub const PWQ_SETTING_LOCAL_USERS: c_int = 20;
pub const PWQ_SETTING_USER_SUBSTR: c_int = 21;

pub const PWQ_MAX_ENTROPY_BITS: c_int = 256;
pub const PWQ_MIN_ENTROPY_BITS: c_int = 56;

pub const PWQ_MAX_ERROR_MESSAGE_LEN: usize = 256;

/// Shortest `minlen` the library accepts
pub const PWQ_BASE_MIN_LENGTH: c_int = 6;
pub const PWQ_NUM_CLASSES: c_int = 4;

pub const PWQ_ERROR_SUCCESS: c_int = 0;
pub const PWQ_ERROR_FATAL_FAILURE: c_int = -1;
pub const PWQ_ERROR_INTEGER: c_int = -2;
pub const PWQ_ERROR_CFGFILE_OPEN: c_int = -3;
pub const PWQ_ERROR_CFGFILE_MALFORMED: c_int = -4;
pub const PWQ_ERROR_UNKNOWN_SETTING: c_int = -5;
pub const PWQ_ERROR_NON_INT_SETTING: c_int = -6;
pub const PWQ_ERROR_NON_STR_SETTING: c_int = -7;
pub const PWQ_ERROR_MEM_ALLOC: c_int = -8;
pub const PWQ_ERROR_TOO_SIMILAR: c_int = -9;
pub const PWQ_ERROR_MIN_DIGITS: c_int = -10;
pub const PWQ_ERROR_MIN_UPPERS: c_int = -11;
pub const PWQ_ERROR_MIN_LOWERS: c_int = -12;
pub const PWQ_ERROR_MIN_OTHERS: c_int = -13;
pub const PWQ_ERROR_MIN_LENGTH: c_int = -14;
pub const PWQ_ERROR_PALINDROME: c_int = -15;
pub const PWQ_ERROR_CASE_CHANGES_ONLY: c_int = -16;
pub const PWQ_ERROR_ROTATED: c_int = -17;
pub const PWQ_ERROR_MIN_CLASSES: c_int = -18;
pub const PWQ_ERROR_MAX_CONSECUTIVE: c_int = -19;
pub const PWQ_ERROR_EMPTY_PASSWORD: c_int = -20;
pub const PWQ_ERROR_SAME_PASSWORD: c_int = -21;
pub const PWQ_ERROR_CRACKLIB_CHECK: c_int = -22;
pub const PWQ_ERROR_RNG: c_int = -23;
pub const PWQ_ERROR_GENERATION_FAILED: c_int = -24;
pub const PWQ_ERROR_USER_CHECK: c_int = -25;
pub const PWQ_ERROR_GECOS_CHECK: c_int = -26;
pub const PWQ_ERROR_MAX_CLASS_REPEAT: c_int = -27;
pub const PWQ_ERROR_BAD_WORDS: c_int = -28;
pub const PWQ_ERROR_MAX_SEQUENCE: c_int = -29;

pub type DefaultSettingsFn = unsafe extern "C" fn() -> *mut pwquality_settings_t;
pub type FreeSettingsFn = unsafe extern "C" fn(pwq: *mut pwquality_settings_t);
pub type ReadConfigFn = unsafe extern "C" fn(
    pwq: *mut pwquality_settings_t,
    cfgfile: *const c_char,
    auxerror: *mut *mut c_void,
) -> c_int;
pub type SetOptionFn =
    unsafe extern "C" fn(pwq: *mut pwquality_settings_t, option: *const c_char) -> c_int;
pub type SetIntValueFn =
    unsafe extern "C" fn(pwq: *mut pwquality_settings_t, setting: c_int, value: c_int) -> c_int;
pub type SetStrValueFn = unsafe extern "C" fn(
    pwq: *mut pwquality_settings_t,
    setting: c_int,
    value: *const c_char,
) -> c_int;
pub type GetIntValueFn = unsafe extern "C" fn(
    pwq: *mut pwquality_settings_t,
    setting: c_int,
    value: *mut c_int,
) -> c_int;
pub type GetStrValueFn = unsafe extern "C" fn(
    pwq: *mut pwquality_settings_t,
    setting: c_int,
    value: *mut *const c_char,
) -> c_int;
pub type GenerateFn = unsafe extern "C" fn(
    pwq: *mut pwquality_settings_t,
    entropy_bits: c_int,
    password: *mut *mut c_char,
) -> c_int;
pub type CheckFn = unsafe extern "C" fn(
    pwq: *mut pwquality_settings_t,
    password: *const c_char,
    oldpassword: *const c_char,
    user: *const c_char,
    auxerror: *mut *mut c_void,
) -> c_int;
/// Releases buffers the library hands over (`malloc`-allocated)
pub type FreeBufferFn = unsafe extern "C" fn(ptr: *mut c_void);
pub type StrerrorFn = unsafe extern "C" fn(
    buf: *mut c_char,
    len: size_t,
    errcode: c_int,
    auxerror: *mut c_void,
) -> *const c_char;

#[cfg(feature = "link")]
unsafe extern "C" {
    pub fn pwquality_default_settings() -> *mut pwquality_settings_t;
    pub fn pwquality_free_settings(pwq: *mut pwquality_settings_t);
    pub fn pwquality_read_config(
        pwq: *mut pwquality_settings_t,
        cfgfile: *const c_char,
        auxerror: *mut *mut c_void,
    ) -> c_int;
    pub fn pwquality_set_option(pwq: *mut pwquality_settings_t, option: *const c_char) -> c_int;
    pub fn pwquality_set_int_value(
        pwq: *mut pwquality_settings_t,
        setting: c_int,
        value: c_int,
    ) -> c_int;
    pub fn pwquality_set_str_value(
        pwq: *mut pwquality_settings_t,
        setting: c_int,
        value: *const c_char,
    ) -> c_int;
    pub fn pwquality_get_int_value(
        pwq: *mut pwquality_settings_t,
        setting: c_int,
        value: *mut c_int,
    ) -> c_int;
    pub fn pwquality_get_str_value(
        pwq: *mut pwquality_settings_t,
        setting: c_int,
        value: *mut *const c_char,
    ) -> c_int;
    pub fn pwquality_generate(
        pwq: *mut pwquality_settings_t,
        entropy_bits: c_int,
        password: *mut *mut c_char,
    ) -> c_int;
    pub fn pwquality_check(
        pwq: *mut pwquality_settings_t,
        password: *const c_char,
        oldpassword: *const c_char,
        user: *const c_char,
        auxerror: *mut *mut c_void,
    ) -> c_int;
    pub fn pwquality_strerror(
        buf: *mut c_char,
        len: size_t,
        errcode: c_int,
        auxerror: *mut c_void,
    ) -> *const c_char;
}
