//! Coercion rules for record values.
//!
//! Record values are loosely typed. Condition literals compare with coercive
//! equality (a number equals its string form) and display formatting turns
//! values into text the same way everywhere, so both live here.

use itertools::Itertools;
use serde_json::{Number, Value};

/// Text form used for value map keys and unit concatenation.
///
/// An absent value renders as `undefined`, `null` as `null`, arrays as their
/// comma-joined elements and objects as `[object Object]`.
pub fn to_text(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(v) => value_text(v),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => value_text(other),
            })
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) => float_text(f),
        None => n.to_string(),
    }
}

fn float_text(f: f64) -> String {
    if f == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let text = if f > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        let sign = if f < 0.0 { "-" } else { "" };
        format!("{sign}{}", shortest_decimal(f.abs()))
    }
}

/// Shortest round-trip digits of a positive finite float, laid out like
/// `Number.prototype.toString`: plain notation for decimal exponents in `[-6, 21)`,
/// `d.ddde±x` outside of it.
fn shortest_decimal(f: f64) -> String {
    let scientific = format!("{f:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return f.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent + 1;

    if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let (first, rest) = digits.split_at(1);
        let exp_sign = if n - 1 < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{first}e{exp_sign}{}", (n - 1).abs())
        } else {
            format!("{first}.{rest}e{exp_sign}{}", (n - 1).abs())
        }
    }
}

/// Absent, `null` and the empty string are empty. `0`, `false`, `[]` and `{}` are not.
pub fn is_empty(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
        || matches!(value, Some(Value::String(s)) if s.is_empty())
}

/// True only for the number 1 (integer or float).
pub fn is_one(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Number(n)) if n.as_f64() == Some(1.0))
}

/// Arrays and objects are not primitive; everything else, including absent, is.
pub fn is_primitive(value: Option<&Value>) -> bool {
    !matches!(value, Some(Value::Array(_)) | Some(Value::Object(_)))
}

/// Coercive equality between a record value and a condition literal.
///
/// | record \ literal     | rule                                                    |
/// |----------------------|---------------------------------------------------------|
/// | absent / null        | equal iff literal is null                               |
/// | number vs string     | string parsed as a number                               |
/// | bool vs anything     | bool becomes 1 or 0, then compared again                |
/// | container vs scalar  | container becomes its text form, then compared again    |
/// | container vs container | structural equality                                   |
pub fn loose_eq(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(actual) => values_loose_eq(actual, expected),
    }
}

fn values_loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_)) => to_number(a) == to_number(b),
        (Value::Bool(x), other) => values_loose_eq(&Value::from(u8::from(*x)), other),
        (other, Value::Bool(y)) => values_loose_eq(other, &Value::from(u8::from(*y))),
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => a == b,
        (Value::Array(_) | Value::Object(_), scalar) => {
            values_loose_eq(&Value::String(value_text(a)), scalar)
        }
        (scalar, container) => values_loose_eq(scalar, &Value::String(value_text(container))),
    }
}

fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => string_to_number(s),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => string_to_number(&value_text(value)),
    }
}

/// `0x`, `0o` and `0b` literals (unsigned, any case); NaN when the digits
/// don't fit the radix.
fn radix_number(s: &str) -> Option<f64> {
    let prefix = s.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(f64::NAN);
    }
    Some(digits.chars().fold(0.0, |acc, c| {
        acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
    }))
}

/// Numeric reading of a string: surrounding whitespace ignored, empty is 0,
/// anything unparseable is NaN.
fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(value) = radix_number(trimmed) {
        return value;
    }
    // f64::from_str also accepts "inf" and "nan"
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
