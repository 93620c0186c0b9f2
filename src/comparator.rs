use std::cmp::Ordering;

use crate::{
    ast::{CompareOp, Literal},
    value::Value,
};

/// True if any value in `nodes` satisfies `<value> <op> <literal>`.
///
/// The test is existential for every operator, `!=` included: with several
/// nodes, `!=` holds as soon as one of them differs. Ordering operators only
/// match number against number; a string such as `"-3998.50"` never orders
/// against `0`.
///
/// # Examples
///
/// ```
/// use cond_probe::comparator::compare_any;
/// use cond_probe::{CompareOp, Literal, Value};
///
/// let nodes = vec![Value::Integer(1), Value::Integer(2)];
/// assert!(compare_any(&nodes, CompareOp::NotEqual, &Literal::Number(Value::Integer(1))));
/// assert!(!compare_any(&[Value::String("-3".into())], CompareOp::LessThan, &Literal::Number(Value::Integer(0))));
/// ```
pub fn compare_any(nodes: &[Value], op: CompareOp, literal: &Literal) -> bool {
    let right = literal.to_value();
    nodes.iter().any(|v| compare_one(v, op, &right))
}

/// Apply one comparison to one value.
pub fn compare_one(left: &Value, op: CompareOp, right: &Value) -> bool {
    match op {
        CompareOp::Equal => left.strict_eq(right),
        CompareOp::NotEqual => !left.strict_eq(right),
        _ => match left.numeric_cmp(right) {
            Some(ordering) => ordering_matches(op, ordering),
            None => false,
        },
    }
}

fn ordering_matches(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::LessThan => ordering == Ordering::Less,
        CompareOp::LessEqual => ordering != Ordering::Greater,
        CompareOp::GreaterThan => ordering == Ordering::Greater,
        CompareOp::GreaterEqual => ordering != Ordering::Less,
        CompareOp::Equal => ordering == Ordering::Equal,
        CompareOp::NotEqual => ordering != Ordering::Equal,
    }
}

/// An emptiness clause holds when "no nodes" agrees with `want_empty`.
pub fn emptiness_holds(nodes: &[Value], want_empty: bool) -> bool {
    nodes.is_empty() == want_empty
}
