use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{Clause, CompareOp, Literal},
    splitter::{self, OR},
    value::Value,
};

static EMPTINESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(.+?)\s+empty\s+(true|false)\s*$").expect("emptiness pattern is valid")
});

// Two-character operators come first so `<=` is never read as `<` then `=...`.
static OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"==|!=|<=|>=|<|>").expect("operator pattern is valid"));

/// A clause that fits neither clause form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClauseError {
    #[error("malformed clause '{0}': expected '<path> empty true|false' or '<path> <op> <literal>'")]
    Malformed(String),

    #[error("malformed clause '{0}': '||' inside parentheses is not supported, write it as separate groups")]
    NestedOr(String),
}

/// Classify one clause string.
///
/// The emptiness form is tried first; `empty`, `true` and `false` match in any
/// case. Otherwise the first comparison operator outside brackets and quotes
/// splits the clause into path and literal.
///
/// # Examples
///
/// ```
/// use cond_probe::classifier::parse_clause;
/// use cond_probe::{Clause, CompareOp, Literal};
///
/// assert_eq!(
///     parse_clause("@.lines EMPTY False").unwrap(),
///     Clause::Emptiness { path: "@.lines".to_string(), want_empty: false }
/// );
/// assert_eq!(
///     parse_clause("@.documentid == 'CO-G1-CO18'").unwrap(),
///     Clause::Comparison {
///         path: "@.documentid".to_string(),
///         op: CompareOp::Equal,
///         literal: Literal::Quoted("CO-G1-CO18".to_string()),
///     }
/// );
/// assert!(parse_clause("@.flag").is_err());
/// ```
pub fn parse_clause(text: &str) -> Result<Clause, ClauseError> {
    let text = text.trim();

    if splitter::is_fully_parenthesized(text) {
        let inner = splitter::unwrap_condition(text);
        if splitter::split(inner, OR).len() > 1 {
            return Err(ClauseError::NestedOr(text.to_string()));
        }
        return parse_clause(inner);
    }

    if let Some(caps) = EMPTINESS.captures(text) {
        return Ok(Clause::Emptiness {
            path: caps[1].trim().to_string(),
            want_empty: caps[2].eq_ignore_ascii_case("true"),
        });
    }

    let top_level = splitter::top_level_offsets(text);
    let found = OPERATOR
        .find_iter(text)
        .find(|m| top_level.binary_search(&m.start()).is_ok());

    if let Some(m) = found
        && let Some(op) = CompareOp::from_symbol(m.as_str())
    {
        let path = text[..m.start()].trim();
        let right = text[m.end()..].trim();
        if !path.is_empty() && !right.is_empty() {
            return Ok(Clause::Comparison {
                path: path.to_string(),
                op,
                literal: parse_literal(right),
            });
        }
    }

    Err(ClauseError::Malformed(text.to_string()))
}

/// Type a right-hand operand: quoted string, then `null`, then number, then bare string.
pub fn parse_literal(text: &str) -> Literal {
    let text = text.trim();

    if let Some(inner) = strip_quotes(text) {
        return Literal::Quoted(unescape(inner));
    }
    if text.eq_ignore_ascii_case("null") {
        return Literal::Null;
    }
    if let Some(number) = Value::parse_number(text) {
        return Literal::Number(number);
    }
    Literal::Bare(text.to_string())
}

fn strip_quotes(text: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        text.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .filter(|_| text.len() >= 2)
    })
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('\'' | '"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(text: &str) -> (String, CompareOp, Literal) {
        match parse_clause(text).unwrap() {
            Clause::Comparison { path, op, literal } => (path, op, literal),
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_two_character_operators_win() {
        assert_eq!(comparison("@.a<=5").1, CompareOp::LessEqual);
        assert_eq!(comparison("@.a >= 5").1, CompareOp::GreaterEqual);
        assert_eq!(comparison("@.a<5").1, CompareOp::LessThan);
        assert_eq!(comparison("@.a != 5").1, CompareOp::NotEqual);
    }

    #[test]
    fn test_operator_inside_filter_is_skipped() {
        let (path, op, literal) = comparison("@.lines[?(@.amount < 0)].sku == 'X'");
        assert_eq!(path, "@.lines[?(@.amount < 0)].sku");
        assert_eq!(op, CompareOp::Equal);
        assert_eq!(literal, Literal::Quoted("X".to_string()));
    }

    #[test]
    fn test_literal_typing_order() {
        assert_eq!(parse_literal("'42'"), Literal::Quoted("42".to_string()));
        assert_eq!(parse_literal("\"a'b\""), Literal::Quoted("a'b".to_string()));
        assert_eq!(parse_literal("NULL"), Literal::Null);
        assert_eq!(parse_literal("-3998.50"), Literal::Number(Value::Float(-3998.5)));
        assert_eq!(parse_literal("0"), Literal::Number(Value::Integer(0)));
        assert_eq!(parse_literal("true"), Literal::Bare("true".to_string()));
        assert_eq!(parse_literal("'"), Literal::Bare("'".to_string()));
    }

    #[test]
    fn test_escaped_quote_in_literal() {
        assert_eq!(parse_literal(r"'it\'s'"), Literal::Quoted("it's".to_string()));
    }

    #[test]
    fn test_emptiness_is_case_insensitive() {
        assert_eq!(
            parse_clause("@.tags Empty TRUE").unwrap(),
            Clause::Emptiness {
                path: "@.tags".to_string(),
                want_empty: true
            }
        );
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(parse_clause("@.a =="), Err(ClauseError::Malformed(_))));
        assert!(matches!(parse_clause("== 5"), Err(ClauseError::Malformed(_))));
        assert!(matches!(parse_clause("@.a empty maybe"), Err(ClauseError::Malformed(_))));
        assert!(matches!(parse_clause("(@.a == 1)"), Ok(Clause::Comparison { .. })));
        assert!(matches!(
            parse_clause("(@.a == 1 || @.b == 2)"),
            Err(ClauseError::NestedOr(_))
        ));
    }
}
