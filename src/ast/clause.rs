use std::fmt;

use crate::{ast::CompareOp, value::Value};

/// One atomic condition clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `<path> empty true|false`
    ///
    /// # Example
    /// ```text
    /// @.attachments empty false
    /// ```
    Emptiness { path: String, want_empty: bool },

    /// `<path> <op> <literal>`
    ///
    /// # Example
    /// ```text
    /// @.documentid == 'CO-G1-CO18'
    /// ```
    Comparison {
        path: String,
        op: CompareOp,
        literal: Literal,
    },
}

impl Clause {
    /// The path the clause resolves against the document.
    pub fn path(&self) -> &str {
        match self {
            Clause::Emptiness { path, .. } | Clause::Comparison { path, .. } => path,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Emptiness { path, want_empty } => write!(f, "{} empty {}", path, want_empty),
            Clause::Comparison { path, op, literal } => write!(f, "{} {} {}", path, op, literal),
        }
    }
}

/// Right-hand operand of a comparison clause, typed once at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `'text'` or `"text"`, quotes stripped
    Quoted(String),

    /// The keyword `null`, any case
    Null,

    /// A numeric literal
    Number(Value),

    /// Anything else, compared as a string
    Bare(String),
}

impl Literal {
    /// The value the literal compares against.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Quoted(s) | Literal::Bare(s) => Value::String(s.clone()),
            Literal::Null => Value::Null,
            Literal::Number(n) => n.clone(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Literal::Quoted(_) => "quoted string",
            Literal::Null => "null",
            Literal::Number(_) => "number",
            Literal::Bare(_) => "bare string",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Quoted(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Literal::Null => f.write_str("null"),
            Literal::Number(Value::Integer(n)) => write!(f, "{}", n),
            Literal::Number(Value::Float(n)) => write!(f, "{}", n),
            Literal::Number(other) => write!(f, "{:?}", other),
            Literal::Bare(s) => f.write_str(s),
        }
    }
}
