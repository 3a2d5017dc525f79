#![no_main]

use libfuzzer_sys::fuzz_target;
use pwquality_bridge::ErrorKind;

fuzz_target!(|code: i32| {
    match ErrorKind::from_code(code) {
        None => assert!(code >= 0),
        Some(ErrorKind::Unrecognized) => {
            assert!(code < 0);
            assert_eq!(ErrorKind::Unrecognized.symbol(), "PWQ_ERROR_UNRECOGNIZED");
        }
        Some(kind) => {
            assert_eq!(kind.code(), Some(code));
            assert!(kind.symbol().starts_with("PWQ_ERROR_"));
        }
    }
});
