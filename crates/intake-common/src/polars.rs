//! Polars AnyValue utility functions.
//!
//! Submission tables arrive with inferred dtypes, so the same logical column can
//! be `Int64` in one upload and `String` in the next. Every check reads cells
//! through these helpers instead of matching on dtypes itself.

use std::str::FromStr;

use polars::prelude::AnyValue;

/// Display form of a cell: empty for null, floats without trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use intake_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("Lab A")), "Lab A");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        other => match as_integer(&other) {
            Some(v) => v.to_string(),
            None => other.to_string(),
        },
    }
}

/// True for nulls, empty strings, and whitespace-only strings.
///
/// A float `NaN` also counts as missing: spreadsheet loaders emit it for blank
/// numeric cells.
pub fn is_missing_value(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::Float64(v) => v.is_nan(),
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use intake_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(100.0), "100");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Numeric value of a cell, parsing strings; `None` for null, non-numeric, or NaN.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let parsed = match value {
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::String(s) => parse_trimmed::<f64>(s),
        AnyValue::StringOwned(s) => parse_trimmed::<f64>(&s),
        other => as_integer(&other).map(|v| v as f64),
    };
    parsed.filter(|v| !v.is_nan())
}

/// Integer value of a cell. Finite floats are truncated.
pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Float32(v) if v.is_finite() => Some(v as i64),
        AnyValue::Float64(v) if v.is_finite() => Some(v as i64),
        AnyValue::String(s) => parse_trimmed::<i64>(s),
        AnyValue::StringOwned(s) => parse_trimmed::<i64>(&s),
        other => as_integer(&other),
    }
}

/// Parse a trimmed string; `None` when blank or malformed.
pub fn parse_trimmed<T: FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

fn as_integer(value: &AnyValue<'_>) -> Option<i64> {
    match *value {
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        _ => None,
    }
}
