//! Typed conversion out of untyped [`Value`]s.
//!
//! [`FromValue`] is the engine's sole type-extension point: implement it for
//! a type and [`Value::decode`] can produce it. Built-in implementations
//! cover the integer types, floats, `bool`, `String`, `Value` itself, and
//! `Vec<T>` for element-wise sequence decoding.
//!
//! Numeric grammar (no locale, no exponent notation):
//!
//! - integers: decimal digits with repeated leading signs (`--5` is 5;
//!   unsigned types accept only `+`), or a `0x`/`0c`/`0b` prefix for
//!   hex/octal/binary (lowercase prefix, no sign). Overflow is detected and
//!   fails the decode rather than wrapping.
//! - floats: optional repeated signs, integer digits, optional `.` followed
//!   by fraction digits. `".5"` parses; `"12."` and `"1e3"` do not.
//!
//! # Examples
//!
//! ```
//! use argtree_core::{parse_signed, parse_unsigned};
//!
//! assert_eq!(parse_unsigned::<u32>("0x1f").unwrap(), 31);
//! assert_eq!(parse_signed::<i32>("-5").unwrap(), -5);
//! assert!(parse_unsigned::<u32>("-5").is_err());
//! ```

use crate::error::{DecodeError, ValueKind};
use crate::value::Value;

/// Conversion from an untyped [`Value`] to a concrete type.
///
/// Implemented for the built-in targets below; user code may implement it
/// for its own types to extend [`Value::decode`].
pub trait FromValue: Sized {
    /// Decodes `value` into `Self`.
    fn from_value(value: &Value) -> Result<Self, DecodeError>;
}

fn scalar_text<'a>(value: &'a Value) -> Result<&'a str, DecodeError> {
    value.as_str().ok_or(DecodeError::KindMismatch {
        expected: ValueKind::Scalar,
        found: value.kind(),
    })
}

fn malformed(text: &str, target: &'static str) -> DecodeError {
    DecodeError::Malformed {
        text: text.to_string(),
        target,
    }
}

fn overflow(text: &str, target: &'static str) -> DecodeError {
    DecodeError::Overflow {
        text: text.to_string(),
        target,
    }
}

/// Parses a `0x`/`0c`/`0b` prefixed magnitude, or returns `None` when `text`
/// carries no radix prefix.
fn parse_prefixed(text: &str, target: &'static str) -> Option<Result<u128, DecodeError>> {
    let bytes = text.as_bytes();
    if bytes.len() <= 2 || bytes[0] != b'0' {
        return None;
    }
    let radix: u128 = match bytes[1] {
        b'b' => 2,
        b'c' => 8,
        b'x' => 16,
        _ => return None,
    };
    let mut acc: u128 = 0;
    for &b in &bytes[2..] {
        let digit = match b {
            b'0'..=b'9' => (b - b'0') as u128,
            b'a'..=b'f' => (b - b'a') as u128 + 10,
            b'A'..=b'F' => (b - b'A') as u128 + 10,
            _ => return Some(Err(malformed(text, target))),
        };
        if digit >= radix {
            return Some(Err(malformed(text, target)));
        }
        acc = match acc.checked_mul(radix).and_then(|a| a.checked_add(digit)) {
            Some(a) => a,
            None => return Some(Err(overflow(text, target))),
        };
    }
    Some(Ok(acc))
}

/// Decimal magnitude of `text[start..]`; every remaining byte must be a digit.
fn parse_decimal(text: &str, start: usize, target: &'static str) -> Result<u128, DecodeError> {
    let digits = &text.as_bytes()[start..];
    if digits.is_empty() {
        return Err(malformed(text, target));
    }
    let mut acc: u128 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(malformed(text, target));
        }
        acc = acc
            .checked_mul(10)
            .and_then(|a| a.checked_add((b - b'0') as u128))
            .ok_or_else(|| overflow(text, target))?;
    }
    Ok(acc)
}

/// Parses signed integer text: decimal with repeated leading signs, or a
/// radix-prefixed magnitude.
pub fn parse_signed<T: TryFrom<i128>>(text: &str) -> Result<T, DecodeError> {
    let target = std::any::type_name::<T>();
    if text.is_empty() {
        return Err(malformed(text, target));
    }
    let wide: i128 = if let Some(magnitude) = parse_prefixed(text, target) {
        i128::try_from(magnitude?).map_err(|_| overflow(text, target))?
    } else {
        let bytes = text.as_bytes();
        let mut negative = false;
        let mut start = 0;
        while start < bytes.len() && (bytes[start] == b'-' || bytes[start] == b'+') {
            if bytes[start] == b'-' {
                negative = !negative;
            }
            start += 1;
        }
        let magnitude = parse_decimal(text, start, target)?;
        if negative {
            let min_magnitude = i128::MAX as u128 + 1;
            if magnitude > min_magnitude {
                return Err(overflow(text, target));
            }
            if magnitude == min_magnitude {
                i128::MIN
            } else {
                -(magnitude as i128)
            }
        } else {
            i128::try_from(magnitude).map_err(|_| overflow(text, target))?
        }
    };
    T::try_from(wide).map_err(|_| overflow(text, target))
}

/// Parses unsigned integer text: decimal with optional repeated `+` signs,
/// or a radix-prefixed magnitude. A `-` sign fails.
pub fn parse_unsigned<T: TryFrom<u128>>(text: &str) -> Result<T, DecodeError> {
    let target = std::any::type_name::<T>();
    if text.is_empty() {
        return Err(malformed(text, target));
    }
    let wide: u128 = if let Some(magnitude) = parse_prefixed(text, target) {
        magnitude?
    } else {
        let bytes = text.as_bytes();
        let mut start = 0;
        while start < bytes.len() && bytes[start] == b'+' {
            start += 1;
        }
        parse_decimal(text, start, target)?
    };
    T::try_from(wide).map_err(|_| overflow(text, target))
}

/// Parses floating-point text: optional repeated signs, integer digits,
/// optional `.` fraction. No exponent notation.
pub fn parse_float(text: &str) -> Result<f64, DecodeError> {
    const TARGET: &str = "f64";
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err(malformed(text, TARGET));
    }
    let mut sign = 1.0;
    let mut i = 0;
    while i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        if bytes[i] == b'-' {
            sign = -sign;
        }
        i += 1;
    }
    if i == bytes.len() {
        return Err(malformed(text, TARGET));
    }
    let mut num = 0.0f64;
    let mut saw_digit = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        num = num * 10.0 + (bytes[i] - b'0') as f64;
        saw_digit = true;
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        if i == bytes.len() {
            return Err(malformed(text, TARGET));
        }
        let mut place = 0.1f64;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            num += place * (bytes[i] - b'0') as f64;
            place *= 0.1;
            saw_digit = true;
            i += 1;
        }
    }
    if i != bytes.len() || !saw_digit {
        return Err(malformed(text, TARGET));
    }
    Ok(sign * num)
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        scalar_text(value).map(str::to_string)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match scalar_text(value)? {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(malformed(other, "bool")),
        }
    }
}

macro_rules! impl_from_value_signed {
    ($($ty:ty),* $(,)?) => {$(
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, DecodeError> {
                parse_signed(scalar_text(value)?)
            }
        }
    )*};
}

macro_rules! impl_from_value_unsigned {
    ($($ty:ty),* $(,)?) => {$(
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, DecodeError> {
                parse_unsigned(scalar_text(value)?)
            }
        }
    )*};
}

impl_from_value_signed!(i8, i16, i32, i64, i128, isize);
impl_from_value_unsigned!(u8, u16, u32, u64, u128, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        parse_float(scalar_text(value)?)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        parse_float(scalar_text(value)?).map(|v| v as f32)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let items = value.as_slice().ok_or(DecodeError::KindMismatch {
            expected: ValueKind::Sequence,
            found: value.kind(),
        })?;
        items.iter().map(T::from_value).collect()
    }
}
