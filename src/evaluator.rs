use std::cmp::Ordering;

use tracing::trace;

use crate::{
    ast::{Anchor, CompareOp, FilterExpr, Operand, PathQuery, Segment, Selector},
    parser::{self, QueryError},
    value::Value,
};

/// The ordered values a query resolves to. Order and duplicates are exactly
/// as the engine produced them.
pub type NodeSet = Vec<Value>;

/// A path-query engine: resolves a query string against a document.
///
/// Implementations must raise [`QueryError`] for malformed queries rather than
/// returning an empty set, so that "bad query" and "no data" stay distinguishable.
pub trait QueryEngine {
    fn evaluate(&self, query: &str, document: &Value) -> Result<NodeSet, QueryError>;
}

/// The built-in JSONPath engine.
///
/// Supports `$`/`@` anchors, `.name`, `['name']`, `[n]` (negative from the
/// end), `[start:end:step]`, `*`, `..` descent, selector lists and
/// `[?(...)]` filters with comparisons, `&&`, `||`, `!`, existence tests and
/// `empty true|false`.
///
/// # Examples
///
/// ```
/// use cond_probe::{JsonPathEngine, QueryEngine, Value};
///
/// let doc: Value = serde_json::json!({"lines": [{"amount": 5}, {"amount": -2}]}).into();
/// let nodes = JsonPathEngine.evaluate("$.lines[?(@.amount < 0)].amount", &doc).unwrap();
/// assert_eq!(nodes, vec![Value::Integer(-2)]);
/// assert!(JsonPathEngine.evaluate("$.lines[", &doc).is_err());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPathEngine;

impl QueryEngine for JsonPathEngine {
    fn evaluate(&self, query: &str, document: &Value) -> Result<NodeSet, QueryError> {
        let parsed = parser::parse(query)?;
        let nodes = select(&parsed, document, document);
        trace!(query, matched = nodes.len(), "query evaluated");
        Ok(nodes.into_iter().cloned().collect())
    }
}

/// Resolve a parsed query. `current` is what `@` refers to.
fn select<'a>(query: &PathQuery, root: &'a Value, current: &'a Value) -> Vec<&'a Value> {
    let start = match query.anchor {
        Anchor::Root => root,
        Anchor::Current => current,
    };

    let mut nodes = vec![start];
    for segment in &query.segments {
        let mut next = Vec::new();
        for node in nodes {
            match segment {
                Segment::Child(selectors) => {
                    for selector in selectors {
                        apply_selector(selector, node, root, &mut next);
                    }
                }
                Segment::Descendant(selectors) => {
                    let mut visited = Vec::new();
                    collect_descendants(node, &mut visited);
                    for visited_node in visited {
                        for selector in selectors {
                            apply_selector(selector, visited_node, root, &mut next);
                        }
                    }
                }
            }
        }
        nodes = next;
    }
    nodes
}

/// The node itself, then every descendant in document order.
fn collect_descendants<'a>(node: &'a Value, out: &mut Vec<&'a Value>) {
    out.push(node);
    for child in children(node) {
        collect_descendants(child, out);
    }
}

fn children(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

fn apply_selector<'a>(selector: &Selector, node: &'a Value, root: &'a Value, out: &mut Vec<&'a Value>) {
    match (selector, node) {
        (Selector::Name(name), Value::Object(map)) => out.extend(map.get(name)),
        (Selector::Index(idx), Value::Array(arr)) => {
            if let Some(i) = normalize_index(*idx, arr.len()) {
                out.push(&arr[i]);
            }
        }
        (Selector::Wildcard, _) => out.extend(children(node)),
        (Selector::Slice { start, end, step }, Value::Array(arr)) => {
            for i in slice_indices(arr.len(), *start, *end, *step) {
                out.push(&arr[i]);
            }
        }
        (Selector::Filter(expr), _) => {
            for child in children(node) {
                if test_filter(expr, root, child) {
                    out.push(child);
                }
            }
        }
        _ => {}
    }
}

fn normalize_index(idx: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if idx < 0 { len + idx } else { idx };
    (0..len).contains(&i).then_some(i as usize)
}

fn slice_indices(len: usize, start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<usize> {
    let len = len as i64;
    let step = step.unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }
    let clamp = |i: i64, lo: i64, hi: i64| {
        let i = if i < 0 { len.saturating_add(i) } else { i };
        i.clamp(lo, hi)
    };

    let mut indices = Vec::new();
    if step > 0 {
        let lower = clamp(start.unwrap_or(0), 0, len);
        let upper = clamp(end.unwrap_or(len), 0, len);
        let mut i = lower;
        while i < upper {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else {
        let upper = clamp(start.unwrap_or(len - 1), -1, len - 1);
        let lower = end.map_or(-1, |e| clamp(e, -1, len - 1));
        let mut i = upper;
        while i > lower {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }
    indices
}

fn test_filter(expr: &FilterExpr, root: &Value, current: &Value) -> bool {
    match expr {
        FilterExpr::Or(left, right) => {
            test_filter(left, root, current) || test_filter(right, root, current)
        }
        FilterExpr::And(left, right) => {
            test_filter(left, root, current) && test_filter(right, root, current)
        }
        FilterExpr::Not(inner) => !test_filter(inner, root, current),
        FilterExpr::Exists(query) => !select(query, root, current).is_empty(),
        FilterExpr::Compare { op, left, right } => {
            let left = resolve_operand(left, root, current);
            let right = resolve_operand(right, root, current);
            compare(*op, left, right)
        }
        FilterExpr::Empty {
            operand,
            want_empty,
        } => match resolve_operand(operand, root, current) {
            Some(Value::String(s)) => s.is_empty() == *want_empty,
            Some(Value::Array(arr)) => arr.is_empty() == *want_empty,
            Some(Value::Object(map)) => map.is_empty() == *want_empty,
            _ => false,
        },
    }
}

/// A query operand yields a value only when it selects exactly one node.
fn resolve_operand<'a>(operand: &'a Operand, root: &'a Value, current: &'a Value) -> Option<&'a Value> {
    match operand {
        Operand::Literal(value) => Some(value),
        Operand::Query(query) => {
            let nodes = select(query, root, current);
            match nodes.as_slice() {
                [single] => Some(*single),
                _ => None,
            }
        }
    }
}

fn compare(op: CompareOp, left: Option<&Value>, right: Option<&Value>) -> bool {
    let (left, right) = match (left, right) {
        (Some(l), Some(r)) => (l, r),
        (None, None) => return matches!(op, CompareOp::Equal | CompareOp::LessEqual | CompareOp::GreaterEqual),
        _ => return op == CompareOp::NotEqual,
    };

    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.numeric_cmp(right),
    };

    match op {
        CompareOp::Equal => left.strict_eq(right),
        CompareOp::NotEqual => !left.strict_eq(right),
        CompareOp::LessThan => ordering == Some(Ordering::Less),
        CompareOp::GreaterThan => ordering == Some(Ordering::Greater),
        CompareOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        CompareOp::GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
    }
}
