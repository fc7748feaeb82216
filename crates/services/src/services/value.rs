//! Checks a raw fill value against the datatype declared by its field.

use chrono::{DateTime, Utc};
use db::models::field::DataType;
use thiserror::Error;

use super::date::parse_date;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Value must be numeric.")]
    NotNumeric,
    #[error("Value must be a boolean ('true' or 'false').")]
    NotBoolean,
    #[error("Invalid date format.")]
    InvalidDate,
}

/// A fill value read as its field's datatype
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
}

pub fn validate_value(datatype: DataType, raw: &str) -> Result<TypedValue, ValueError> {
    match datatype {
        DataType::String => Ok(TypedValue::Text(raw.to_string())),
        DataType::Number => parse_number(raw)
            .map(TypedValue::Number)
            .ok_or(ValueError::NotNumeric),
        DataType::Boolean => match raw {
            "true" => Ok(TypedValue::Boolean(true)),
            "false" => Ok(TypedValue::Boolean(false)),
            _ => Err(ValueError::NotBoolean),
        },
        DataType::Date => parse_date(raw)
            .map(TypedValue::Date)
            .ok_or(ValueError::InvalidDate),
    }
}

/// Numeric conversion with the leniency browsers apply to form input:
/// surrounding whitespace is ignored, blank text is zero, and hex/octal/binary
/// literals and signed `Infinity` are numbers. NaN is never produced.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let has_prefix = s
            .get(..2)
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
        if has_prefix {
            return parse_radix(&s[2..], radix);
        }
    }

    let unsigned = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    if unsigned == "Infinity" {
        return Some(if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    // f64::from_str also takes "inf" and "nan", which must stay invalid.
    let decimal_chars = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal_chars {
        return None;
    }
    s.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Whitespace as browsers trim it: Unicode spaces and line breaks plus the
/// byte-order mark, but not NEL.
pub fn is_js_whitespace(c: char) -> bool {
    c == '\u{FEFF}' || (c.is_whitespace() && c != '\u{85}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_accepts_anything() {
        assert_eq!(
            validate_value(DataType::String, "anything at all"),
            Ok(TypedValue::Text("anything at all".to_string()))
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_number("123"), Some(123.0));
        assert_eq!(parse_number(" -4.5 "), Some(-4.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("0x1A"), Some(26.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("0o17"), Some(15.0));
        assert_eq!(parse_number("   "), Some(0.0));
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_non_numbers() {
        for raw in ["abc", "12abc", "NaN", "inf", "infinity", "1_000", "0x", "0xZZ", "-0x1", "1e", "."] {
            assert_eq!(parse_number(raw), None, "{raw:?} should be rejected");
        }
        assert_eq!(
            validate_value(DataType::Number, "abc"),
            Err(ValueError::NotNumeric)
        );
    }

    #[test]
    fn test_booleans_are_exact() {
        assert_eq!(
            validate_value(DataType::Boolean, "true"),
            Ok(TypedValue::Boolean(true))
        );
        assert_eq!(
            validate_value(DataType::Boolean, "false"),
            Ok(TypedValue::Boolean(false))
        );
        for raw in ["TRUE", "1", "yes", " true", "abc"] {
            assert_eq!(
                validate_value(DataType::Boolean, raw),
                Err(ValueError::NotBoolean)
            );
        }
    }

    #[test]
    fn test_dates() {
        for raw in ["2025", "2025-05", "2025-05-07T10:30Z", "May 7, 2025", "05/07/2025", "2025/05/07"] {
            assert!(
                matches!(validate_value(DataType::Date, raw), Ok(TypedValue::Date(_))),
                "{raw:?} should be a date"
            );
        }
        assert_eq!(
            validate_value(DataType::Date, "not-a-date"),
            Err(ValueError::InvalidDate)
        );
    }

    #[test]
    fn test_number_whitespace() {
        assert_eq!(parse_number("\u{FEFF}12"), Some(12.0));
        assert_eq!(parse_number("\u{00A0}7\u{2028}"), Some(7.0));
        assert_eq!(parse_number("\u{85}1"), None);
        assert_eq!(
            validate_value(DataType::Number, "\u{FEFF}12\n"),
            Ok(TypedValue::Number(12.0))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ValueError::NotNumeric.to_string(), "Value must be numeric.");
        assert_eq!(ValueError::InvalidDate.to_string(), "Invalid date format.");
    }
}
