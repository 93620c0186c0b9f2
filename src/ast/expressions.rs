use crate::{
    ast::{CompareOp, PathQuery},
    value::Value,
};

/// Boolean expression inside a filter selector.
///
/// # Example
/// ```text
/// $.items[?(@.price > 10 && @.tags empty false)]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `left || right`
    Or(Box<FilterExpr>, Box<FilterExpr>),

    /// `left && right`
    And(Box<FilterExpr>, Box<FilterExpr>),

    /// `!expr`
    Not(Box<FilterExpr>),

    /// `left <op> right`
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },

    /// A bare query: true when it selects at least one node
    Exists(PathQuery),

    /// `operand empty true|false`
    Empty { operand: Operand, want_empty: bool },
}

/// A value position in a filter comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal value
    Literal(Value),

    /// Relative (`@...`) or absolute (`$...`) query
    Query(PathQuery),
}
