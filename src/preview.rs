//! Bounded, human-readable rendering of values for reports.
//!
//! Every limit comes from an explicit [`PreviewOptions`] passed at the call
//! site. Rendering is total and deterministic: object keys come out in sorted
//! order and recursion stops at `max_depth`.

use crate::value::Value;

/// Limits for [`preview`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Characters of a string shown before truncating
    pub max_string_len: usize,
    /// Key names of an object shown
    pub max_keys: usize,
    /// Elements of an array shown
    pub max_array_items: usize,
    /// Array nesting rendered before elements collapse to their kind
    pub max_depth: usize,
}

impl PreviewOptions {
    /// Limits used for clause values in reports.
    pub const STANDARD: PreviewOptions = PreviewOptions {
        max_string_len: 160,
        max_keys: 20,
        max_array_items: 5,
        max_depth: 2,
    };
}

/// Render `value` within the given limits.
///
/// # Examples
///
/// ```
/// use cond_probe::preview::{preview, PreviewOptions};
/// use cond_probe::Value;
///
/// let opts = PreviewOptions { max_string_len: 3, max_keys: 1, max_array_items: 2, max_depth: 0 };
/// assert_eq!(preview(&Value::String("abcdef".into()), &opts), "\"abc\"... (+3 chars)");
///
/// let arr: Value = serde_json::json!([1, {"a": 1}, 3]).into();
/// assert_eq!(preview(&arr, &opts), "[number, object, ... (+1 items)]");
///
/// let obj: Value = serde_json::json!({"b": 1, "a": 2}).into();
/// assert_eq!(preview(&obj, &opts), "{a, ... (+1 keys)}");
/// ```
pub fn preview(value: &Value, options: &PreviewOptions) -> String {
    render(value, options, options.max_depth)
}

fn render(value: &Value, options: &PreviewOptions, depth: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::String(s) => render_string(s, options.max_string_len),
        Value::Array(arr) => {
            let mut items: Vec<String> = arr
                .iter()
                .take(options.max_array_items)
                .map(|item| {
                    if depth == 0 {
                        item.kind().to_string()
                    } else {
                        render(item, options, depth - 1)
                    }
                })
                .collect();
            if arr.len() > options.max_array_items {
                items.push(format!("... (+{} items)", arr.len() - options.max_array_items));
            }
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let mut keys: Vec<String> = map
                .keys()
                .take(options.max_keys)
                .map(|k| escape_string(k))
                .collect();
            if map.len() > options.max_keys {
                keys.push(format!("... (+{} keys)", map.len() - options.max_keys));
            }
            format!("{{{}}}", keys.join(", "))
        }
    }
}

fn render_string(s: &str, max_len: usize) -> String {
    let total = s.chars().count();
    if total <= max_len {
        return format!("\"{}\"", escape_string(s));
    }
    let shown: String = s.chars().take(max_len).collect();
    format!("\"{}\"... (+{} chars)", escape_string(&shown), total - max_len)
}

fn escape_string(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec!['\\', 't'],
            c if c.is_control() => format!("\\u{:04x}", c as u32).chars().collect(),
            c => vec![c],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_string_is_truncated() {
        let s = "a".repeat(300);
        let out = preview(&Value::String(s), &PreviewOptions::STANDARD);
        assert_eq!(out, format!("\"{}\"... (+140 chars)", "a".repeat(160)));
    }

    #[test]
    fn test_string_at_limit_is_whole() {
        let s = "é".repeat(160);
        assert_eq!(preview(&Value::String(s.clone()), &PreviewOptions::STANDARD), format!("\"{}\"", s));
    }

    #[test]
    fn test_nested_arrays_stop_at_depth() {
        let v: Value = serde_json::json!([[[[1]]]]).into();
        let opts = PreviewOptions {
            max_depth: 1,
            ..PreviewOptions::STANDARD
        };
        assert_eq!(preview(&v, &opts), "[[array]]");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(preview(&Value::Null, &PreviewOptions::STANDARD), "null");
        assert_eq!(preview(&Value::Float(-3998.5), &PreviewOptions::STANDARD), "-3998.5");
        assert_eq!(preview(&Value::String("a\"b".into()), &PreviewOptions::STANDARD), "\"a\\\"b\"");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(preview(&Value::Array(vec![]), &PreviewOptions::STANDARD), "[]");
        assert_eq!(preview(&Value::from(serde_json::json!({})), &PreviewOptions::STANDARD), "{}");
    }
}
