//! Attribute coercion.
//!
//! Attributes are always strings. Coercion turns one into the value the wrapped component
//! sees, or `None` when there is no usable value and the component default should apply.

use serde_json::{Number, Value};

use crate::schema::PropKind;

/// Largest magnitude below which integral numbers are stored as integers.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Coerce a raw attribute value according to its declared kind.
///
/// Absent input is always `None`. Failures never raise; they degrade to `None`.
pub fn coerce(kind: PropKind, raw: Option<&str>) -> Option<Value> {
    let raw = raw?;

    let value = match kind {
        PropKind::Text => Some(Value::String(raw.to_owned())),
        PropKind::Number => parse_number(raw),
        PropKind::Boolean => Some(Value::Bool(parse_boolean(raw))),
        PropKind::Json => serde_json::from_str(raw).ok(),
    };

    if value.is_none() {
        tracing::trace!(kind = %kind, raw, "attribute has no usable value");
    }

    value
}

/// `""` and any casing of `"true"` are true; every other string is false.
fn parse_boolean(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("true")
}

fn parse_number(raw: &str) -> Option<Value> {
    let n: f64 = raw.trim().parse().ok()?;
    if !n.is_finite() {
        return None;
    }

    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::from(n as i64));
    }

    Number::from_f64(n).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_is_no_value_for_every_kind() {
        for kind in [
            PropKind::Text,
            PropKind::Number,
            PropKind::Boolean,
            PropKind::Json,
        ] {
            assert_eq!(coerce(kind, None), None, "{kind}");
        }
    }

    #[test]
    fn text_is_verbatim() {
        assert_eq!(coerce(PropKind::Text, Some("Ada")), Some(json!("Ada")));
        assert_eq!(coerce(PropKind::Text, Some("")), Some(json!("")));
        assert_eq!(coerce(PropKind::Text, Some("  x ")), Some(json!("  x ")));
    }

    #[test]
    fn numbers_round_trip() {
        for raw in ["0", "5", "-12", "3.25", "1e3", "  42 ", "-0.5", "+7"] {
            let expected: f64 = raw.trim().parse().unwrap();
            let value = coerce(PropKind::Number, Some(raw)).unwrap();
            assert_eq!(value.as_f64(), Some(expected), "{raw}");
        }
    }

    #[test]
    fn integral_numbers_are_integers() {
        assert_eq!(coerce(PropKind::Number, Some("15")), Some(json!(15)));
        assert_eq!(coerce(PropKind::Number, Some("2.0")), Some(json!(2)));
    }

    #[test]
    fn non_numeric_is_no_value() {
        for raw in ["", "   ", "abc", "12px", "NaN", "Infinity", "-inf", "1e999", "0x10"] {
            assert_eq!(coerce(PropKind::Number, Some(raw)), None, "{raw}");
        }
    }

    #[test]
    fn boolean_is_permissive() {
        assert_eq!(coerce(PropKind::Boolean, Some("")), Some(json!(true)));
        assert_eq!(coerce(PropKind::Boolean, Some("true")), Some(json!(true)));
        assert_eq!(coerce(PropKind::Boolean, Some("TrUe")), Some(json!(true)));
        assert_eq!(coerce(PropKind::Boolean, Some("false")), Some(json!(false)));
        assert_eq!(coerce(PropKind::Boolean, Some("yes")), Some(json!(false)));
        assert_eq!(coerce(PropKind::Boolean, Some("1")), Some(json!(false)));
    }

    #[test]
    fn json_parses_literals() {
        assert_eq!(
            coerce(PropKind::Json, Some(r#"{"items": [1, 2]}"#)),
            Some(json!({"items": [1, 2]}))
        );
        assert_eq!(coerce(PropKind::Json, Some("[]")), Some(json!([])));
        assert_eq!(coerce(PropKind::Json, Some("null")), Some(Value::Null));
    }

    #[test]
    fn invalid_json_is_no_value() {
        assert_eq!(coerce(PropKind::Json, Some(r#"{"open": "unterminated"#)), None);
        assert_eq!(coerce(PropKind::Json, Some("{")), None);
        assert_eq!(coerce(PropKind::Json, Some("")), None);
    }
}
