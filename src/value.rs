use std::{cmp::Ordering, collections::BTreeMap, fmt, str::FromStr};

use rust_decimal::{Decimal, prelude::FromPrimitive};

/// A decoded JSON value as seen by conditions and the query engine.
///
/// Integers and floats are kept apart so that documents round-trip without
/// losing precision, but both classify as [`Kind::Number`]. Object keys are
/// ordered, which keeps wildcard results and previews deterministic.
///
/// # Examples
///
/// ```
/// use cond_probe::{Kind, Value};
///
/// let doc: Value = serde_json::json!({"amount": "-3998.50", "count": 2}).into();
/// assert_eq!(doc.kind(), Kind::Object);
/// assert!(Value::Integer(2).strict_eq(&Value::Float(2.0)));
/// assert!(!Value::String("2".into()).strict_eq(&Value::Integer(2)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys, sorted
    Object(BTreeMap<String, Value>),
}

/// The closed set of value kinds every downstream decision switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// Arrays and objects are the only kinds that can have children.
    pub fn is_container(self) -> bool {
        matches!(self, Kind::Array | Kind::Object)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Classify the value. Total: every value has exactly one kind.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) | Value::Float(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Equality in kind and value. Integers and floats compare numerically;
    /// no other coercion happens, so `"5"` never equals `5`.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                self.numeric_cmp(other) == Some(Ordering::Equal)
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.strict_eq(vb))
            }
            _ => self == other,
        }
    }

    /// Order two numbers. `None` unless both values are of kind number.
    pub fn numeric_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => mixed_cmp(*a, *b),
            (Value::Float(a), Value::Integer(b)) => mixed_cmp(*b, *a).map(Ordering::reverse),
            _ => None,
        }
    }

    /// Parse a numeric literal the way conditions and filters write them.
    ///
    /// Integers that fit in `i64` stay integers; everything else that reads
    /// as a finite decimal or scientific number becomes a float.
    pub fn parse_number(text: &str) -> Option<Value> {
        if !is_numeric_text(text) {
            return None;
        }
        if let Ok(n) = text.parse::<i64>() {
            return Some(Value::Integer(n));
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
    }
}

/// True for strings such as `"-3998.50"` or `"1e3"` that would parse as a number.
pub fn looks_numeric(s: &str) -> bool {
    let s = s.trim();
    if !is_numeric_text(s) {
        return false;
    }
    Decimal::from_str(s).is_ok()
        || Decimal::from_scientific(s).is_ok()
        || s.parse::<f64>().is_ok_and(f64::is_finite)
}

fn is_numeric_text(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

fn mixed_cmp(a: i64, b: f64) -> Option<Ordering> {
    if let Some(ad) = Decimal::from_i64(a)
        && let Some(bd) = Decimal::from_f64(b)
    {
        return Some(ad.cmp(&bd));
    }
    (a as f64).partial_cmp(&b)
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Into::into).collect()),
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter().map(|(k, v)| (k.clone(), v.into())).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::Float(1.5).kind(), Kind::Number);
        assert_eq!(Value::Integer(1).kind(), Kind::Number);
        assert_eq!(Value::Array(vec![]).kind(), Kind::Array);
        assert!(Kind::Object.is_container());
        assert!(!Kind::String.is_container());
    }

    #[test]
    fn test_mixed_numeric_equality() {
        assert!(Value::Integer(5).strict_eq(&Value::Float(5.0)));
        assert!(!Value::Integer(5).strict_eq(&Value::Float(5.1)));
        assert_eq!(
            Value::Integer(-4000).numeric_cmp(&Value::Float(-3998.5)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("-3998.50"));
        assert!(looks_numeric("1e3"));
        assert!(looks_numeric(" 42 "));
        assert!(!looks_numeric("CO-G1-CO18"));
        assert!(!looks_numeric("inf"));
        assert!(!looks_numeric("NaN"));
        assert!(!looks_numeric("-"));
        assert!(!looks_numeric(""));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(Value::parse_number("0"), Some(Value::Integer(0)));
        assert_eq!(Value::parse_number("-3.5"), Some(Value::Float(-3.5)));
        assert_eq!(Value::parse_number("infinity"), None);
        assert_eq!(Value::parse_number("12abc"), None);
    }
}
