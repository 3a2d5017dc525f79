//! The libpwquality option set.
//!
//! Every option the bound library version recognises is one row of
//! `OPTION_TABLE`: its configuration-file name, its `PWQ_SETTING_*` id, the
//! value type the native accessors expect and the range the wrapper accepts.
//! Ranges are chosen so that a value accepted here is stored unchanged by the
//! library (it silently clamps some settings, e.g. `minlen` below 6).

use crate::error::{PwqError, Result};
use crate::sys;
use libc::c_int;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Options defined by libpwquality 1.4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionName {
    DiffOk,
    MinLength,
    DigitCredit,
    UpperCredit,
    LowerCredit,
    OtherCredit,
    MinClass,
    MaxRepeat,
    MaxClassRepeat,
    MaxSequence,
    GecosCheck,
    DictCheck,
    UserCheck,
    UserSubstr,
    Enforcing,
    RetryTimes,
    EnforceForRoot,
    LocalUsersOnly,
    DictPath,
    BadWords,
}

/// Value type of an option as seen by the native accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Str,
}

/// Integer or string option value.
///
/// An empty string stands for an unset (NULL) native string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Int(i32),
    Str(String),
}

struct OptionSpec {
    option: OptionName,
    name: &'static str,
    setting: c_int,
    value_type: ValueType,
    range: RangeInclusive<i32>,
}

const ANY: RangeInclusive<i32> = i32::MIN..=i32::MAX;
const COUNT: RangeInclusive<i32> = 0..=i32::MAX;
const FLAG: RangeInclusive<i32> = 0..=1;

macro_rules! option_table {
    ($($option:ident, $name:literal, $setting:ident, $ty:ident, $range:expr;)*) => {
        [$(OptionSpec {
            option: OptionName::$option,
            name: $name,
            setting: sys::$setting,
            value_type: ValueType::$ty,
            range: $range,
        }),*]
    };
}

static OPTION_TABLE: [OptionSpec; 20] = option_table! {
    DiffOk, "difok", PWQ_SETTING_DIFF_OK, Int, COUNT;
    MinLength, "minlen", PWQ_SETTING_MIN_LENGTH, Int, sys::PWQ_BASE_MIN_LENGTH..=i32::MAX;
    DigitCredit, "dcredit", PWQ_SETTING_DIG_CREDIT, Int, ANY;
    UpperCredit, "ucredit", PWQ_SETTING_UP_CREDIT, Int, ANY;
    LowerCredit, "lcredit", PWQ_SETTING_LOW_CREDIT, Int, ANY;
    OtherCredit, "ocredit", PWQ_SETTING_OTH_CREDIT, Int, ANY;
    MinClass, "minclass", PWQ_SETTING_MIN_CLASS, Int, 0..=sys::PWQ_NUM_CLASSES;
    MaxRepeat, "maxrepeat", PWQ_SETTING_MAX_REPEAT, Int, COUNT;
    MaxClassRepeat, "maxclassrepeat", PWQ_SETTING_MAX_CLASS_REPEAT, Int, COUNT;
    MaxSequence, "maxsequence", PWQ_SETTING_MAX_SEQUENCE, Int, COUNT;
    GecosCheck, "gecoscheck", PWQ_SETTING_GECOS_CHECK, Int, FLAG;
    DictCheck, "dictcheck", PWQ_SETTING_DICT_CHECK, Int, FLAG;
    UserCheck, "usercheck", PWQ_SETTING_USER_CHECK, Int, FLAG;
    UserSubstr, "usersubstr", PWQ_SETTING_USER_SUBSTR, Int, COUNT;
    Enforcing, "enforcing", PWQ_SETTING_ENFORCING, Int, FLAG;
    RetryTimes, "retry", PWQ_SETTING_RETRY_TIMES, Int, 1..=i32::MAX;
    EnforceForRoot, "enforce_for_root", PWQ_SETTING_ENFORCE_ROOT, Int, FLAG;
    LocalUsersOnly, "local_users_only", PWQ_SETTING_LOCAL_USERS, Int, FLAG;
    DictPath, "dictpath", PWQ_SETTING_DICT_PATH, Str, ANY;
    BadWords, "badwords", PWQ_SETTING_BAD_WORDS, Str, ANY;
};

impl OptionName {
    fn spec(self) -> &'static OptionSpec {
        // Rows follow variant declaration order; the table test pins this down
        &OPTION_TABLE[self as usize]
    }

    /// Every option, in declaration order (not `PWQ_SETTING_*` id order)
    pub fn all() -> impl Iterator<Item = OptionName> {
        OPTION_TABLE.iter().map(|spec| spec.option)
    }

    /// Name as written in `pwquality.conf`
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Native `PWQ_SETTING_*` id
    pub fn setting(self) -> c_int {
        self.spec().setting
    }

    pub fn value_type(self) -> ValueType {
        self.spec().value_type
    }

    /// Accepted integer range, `None` for string options
    pub fn range(self) -> Option<RangeInclusive<i32>> {
        let spec = self.spec();
        match spec.value_type {
            ValueType::Int => Some(spec.range.clone()),
            ValueType::Str => None,
        }
    }

    /// Flags the native `name=value` parser only ever sets to 1, whatever
    /// value the line carries
    pub fn is_set_only(self) -> bool {
        matches!(self, OptionName::EnforceForRoot | OptionName::LocalUsersOnly)
    }

    /// On/off options that may be written without `=value`
    pub fn is_flag(self) -> bool {
        self.range() == Some(FLAG)
    }

    /// Check type and range of `value` for this option.
    pub fn validate(self, value: &OptionValue) -> Result<()> {
        match (self.value_type(), value) {
            (ValueType::Int, OptionValue::Int(v)) => {
                let range = &self.spec().range;
                if range.contains(v) {
                    Ok(())
                } else {
                    Err(PwqError::invalid_option(
                        self.name(),
                        format!(
                            "value {} outside {}..={}",
                            v,
                            range.start(),
                            range.end()
                        ),
                    ))
                }
            }
            (ValueType::Str, OptionValue::Str(_)) => Ok(()),
            (ValueType::Int, OptionValue::Str(s)) => Err(PwqError::invalid_option(
                self.name(),
                format!("expected an integer, got string {:?}", s),
            )),
            (ValueType::Str, OptionValue::Int(v)) => Err(PwqError::invalid_option(
                self.name(),
                format!("expected a string, got integer {}", v),
            )),
        }
    }
}

impl FromStr for OptionName {
    type Err = PwqError;

    fn from_str(name: &str) -> Result<Self> {
        OPTION_TABLE
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.option)
            .ok_or_else(|| PwqError::invalid_option(name, "unknown option"))
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl OptionValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            OptionValue::Int(_) => ValueType::Int,
            OptionValue::Str(_) => ValueType::Str,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            OptionValue::Int(v) => Some(*v),
            OptionValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Int(_) => None,
            OptionValue::Str(s) => Some(s),
        }
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v)
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Int(i32::from(v))
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

/// Parse a `name=value` line as accepted by `pwquality.conf`.
///
/// Whitespace around name and value is ignored. Flag options may omit
/// `=value`, which means `1`. The value is validated against the option's
/// type and range.
pub fn parse_setting(text: &str) -> Result<(OptionName, OptionValue)> {
    let (name, raw) = match text.split_once('=') {
        Some((name, raw)) => (name.trim(), Some(raw.trim())),
        None => (text.trim(), None),
    };
    let option: OptionName = name.parse()?;

    let value = match (option.value_type(), raw) {
        (ValueType::Int, Some(raw)) => raw.parse::<i32>().map(OptionValue::Int).map_err(|_| {
            PwqError::invalid_option(name, format!("{:?} is not an integer", raw))
        })?,
        (ValueType::Int, None) if option.is_flag() => OptionValue::Int(1),
        (ValueType::Str, Some(raw)) => OptionValue::Str(raw.to_string()),
        (_, None) => return Err(PwqError::invalid_option(name, "missing `=value`")),
    };

    option.validate(&value)?;
    Ok((option, value))
}
