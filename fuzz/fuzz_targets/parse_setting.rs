#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pwquality_bridge::{OptionName, OptionValue, PwqError, ValueType, parse_setting};

#[derive(Arbitrary, Debug)]
struct SettingLine {
    /// Index into the option table, or a free-form name when out of range
    option: u8,
    free_name: String,
    separator: bool,
    leading_space: u8,
    value: String,
}

impl SettingLine {
    fn render(&self) -> String {
        let name = OptionName::all()
            .nth(self.option as usize)
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| self.free_name.clone());
        let pad = " ".repeat((self.leading_space % 4) as usize);
        if self.separator {
            format!("{pad}{name}{pad}={pad}{}", self.value)
        } else {
            format!("{pad}{name}")
        }
    }
}

fuzz_target!(|line: SettingLine| {
    let text = line.render();

    match parse_setting(&text) {
        Ok((option, value)) => {
            // Whatever parses must also pass validation and carry the right type
            assert_eq!(value.value_type(), option.value_type());
            assert!(option.validate(&value).is_ok());
            if let (ValueType::Int, OptionValue::Int(v)) = (option.value_type(), &value) {
                if let Some(range) = option.range() {
                    assert!(range.contains(v));
                }
            }
            // Re-rendering the parsed pair parses to the same pair
            let again = parse_setting(&format!("{}={}", option.name(), value));
            assert_eq!(again.ok(), Some((option, value)));
        }
        Err(PwqError::InvalidOption { .. }) => {}
        Err(other) => panic!("parse_setting returned {other:?} for {text:?}"),
    }
});
