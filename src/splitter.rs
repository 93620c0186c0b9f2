//! Splits a condition into OR-groups of AND-clauses.
//!
//! The scanner keeps its state (paren depth, bracket depth, open quote) in a
//! local [`ScanState`], so a connective only separates when it appears outside
//! every parenthesis, bracket and quoted string.
//!
//! Unterminated quotes and unbalanced brackets are not errors: scanning runs to
//! the end of the input, and everything after an unterminated quote counts as
//! quoted.

use tracing::trace;

/// The OR connective
pub const OR: &str = "||";

/// The AND connective
pub const AND: &str = "&&";

#[derive(Debug, Default, Clone, Copy)]
struct ScanState {
    parens: i32,
    brackets: i32,
    quote: Option<char>,
    escaped: bool,
}

impl ScanState {
    /// Feed one character.
    fn step(&mut self, ch: char) {
        if let Some(q) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == q {
                self.quote = None;
            }
            return;
        }

        match ch {
            '\'' | '"' => self.quote = Some(ch),
            '(' => self.parens += 1,
            ')' => self.parens -= 1,
            '[' => self.brackets += 1,
            ']' => self.brackets -= 1,
            _ => {}
        }
    }

    fn at_top_level(&self) -> bool {
        self.quote.is_none() && self.parens == 0 && self.brackets == 0
    }
}

/// Split `expr` on `operator` wherever it appears at the top level.
///
/// Segments are trimmed and empty segments dropped.
///
/// # Examples
///
/// ```
/// use cond_probe::splitter::{split, AND};
///
/// assert_eq!(split("a && (b && c)", AND), vec!["a", "(b && c)"]);
/// assert_eq!(split("@.x == '&&'", AND), vec!["@.x == '&&'"]);
/// assert_eq!(split(" && a &&  ", AND), vec!["a"]);
/// ```
pub fn split(expr: &str, operator: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut state = ScanState::default();
    let mut segment_start = 0;
    let mut skip_until = 0;

    for (i, ch) in expr.char_indices() {
        if i < skip_until {
            continue;
        }
        if state.at_top_level() && expr[i..].starts_with(operator) {
            parts.push(&expr[segment_start..i]);
            segment_start = i + operator.len();
            skip_until = segment_start;
            continue;
        }
        state.step(ch);
    }
    parts.push(&expr[segment_start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Byte offsets of the characters of `expr` that sit outside every
/// parenthesis, bracket and quoted string.
pub(crate) fn top_level_offsets(expr: &str) -> Vec<usize> {
    let mut state = ScanState::default();
    let mut offsets = Vec::new();
    for (i, ch) in expr.char_indices() {
        if state.at_top_level() {
            offsets.push(i);
        }
        state.step(ch);
    }
    offsets
}

/// True when `s` is `( ... )` and the first parenthesis closes at the very end.
pub fn is_fully_parenthesized(s: &str) -> bool {
    let s = s.trim();
    if !s.starts_with('(') || !s.ends_with(')') {
        return false;
    }

    let mut state = ScanState::default();
    let last = s.len() - 1;
    for (i, ch) in s.char_indices() {
        state.step(ch);
        if state.quote.is_none() && state.parens == 0 {
            return i == last;
        }
    }
    false
}

/// Strip the optional wrappers a condition may be written in:
/// `$[?( … )]`, `[?( … )]` and `( … )`.
///
/// # Examples
///
/// ```
/// use cond_probe::splitter::unwrap_condition;
///
/// assert_eq!(unwrap_condition("$[?(@.a == 1)]"), "@.a == 1");
/// assert_eq!(unwrap_condition("((@.a == 1))"), "@.a == 1");
/// assert_eq!(unwrap_condition("(@.a == 1) || (@.b == 2)"), "(@.a == 1) || (@.b == 2)");
/// ```
pub fn unwrap_condition(expr: &str) -> &str {
    let mut s = expr.trim();

    for prefix in ["$[?", "[?"] {
        if let Some(inner) = s.strip_prefix(prefix).and_then(|rest| rest.strip_suffix(']'))
            && is_fully_parenthesized(inner)
        {
            s = inner.trim();
            break;
        }
    }

    while is_fully_parenthesized(s) {
        s = s[1..s.len() - 1].trim();
    }
    s
}

/// Unwrap and split a whole condition into groups of clause strings.
///
/// A clause that is itself a parenthesised AND-list, such as `(b && c)`, is
/// flattened into its group. A parenthesised clause containing `||` is kept
/// whole so the classifier can reject it.
///
/// # Examples
///
/// ```
/// use cond_probe::splitter::split_groups;
///
/// assert_eq!(
///     split_groups("$[?(@.a == 1 && (@.b == 2 && @.c == 3) || @.d empty true)]"),
///     vec![
///         vec!["@.a == 1", "@.b == 2", "@.c == 3"],
///         vec!["@.d empty true"],
///     ]
/// );
/// ```
pub fn split_groups(expr: &str) -> Vec<Vec<String>> {
    let body = unwrap_condition(expr);
    let groups: Vec<Vec<String>> = split(body, OR)
        .iter()
        .map(|group| {
            let mut clauses = Vec::new();
            for clause in split(group, AND) {
                flatten_clause(clause, &mut clauses);
            }
            clauses
        })
        .filter(|clauses| !clauses.is_empty())
        .collect();

    trace!(expr, groups = groups.len(), "condition split");
    groups
}

fn flatten_clause(clause: String, out: &mut Vec<String>) {
    if !is_fully_parenthesized(&clause) {
        out.push(clause);
        return;
    }

    let inner = unwrap_condition(&clause);
    if split(inner, OR).len() > 1 {
        out.push(clause);
        return;
    }
    for part in split(inner, AND) {
        flatten_clause(part, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_parens_are_not_split() {
        assert_eq!(split("a && (b && c)", AND), vec!["a", "(b && c)"]);
    }

    #[test]
    fn test_quoted_operator_is_not_a_separator() {
        assert_eq!(split("@.x == '&&'", AND), vec!["@.x == '&&'"]);
        assert_eq!(split(r#"@.x == "a || b" || @.y == 1"#, OR), vec![r#"@.x == "a || b""#, "@.y == 1"]);
    }

    #[test]
    fn test_escaped_quote_stays_quoted() {
        assert_eq!(split(r"@.x == 'it\'s && so' && @.y == 1", AND), vec![r"@.x == 'it\'s && so'", "@.y == 1"]);
    }

    #[test]
    fn test_brackets_hide_operator() {
        assert_eq!(
            split("@.items[?(@.a == 1 && @.b == 2)] empty false && @.c == 3", AND),
            vec!["@.items[?(@.a == 1 && @.b == 2)] empty false", "@.c == 3"]
        );
    }

    #[test]
    fn test_unterminated_quote_swallows_the_rest() {
        assert_eq!(split("@.x == 'abc && @.y == 1", AND), vec!["@.x == 'abc && @.y == 1"]);
    }

    #[test]
    fn test_unbalanced_bracket_swallows_the_rest() {
        assert_eq!(split("@.x[0 && @.y == 1", AND), vec!["@.x[0 && @.y == 1"]);
    }

    #[test]
    fn test_or_inside_parens_is_kept_whole() {
        assert_eq!(
            split_groups("(@.a == 1 || @.b == 2) && @.c == 3"),
            vec![vec!["(@.a == 1 || @.b == 2)", "@.c == 3"]]
        );
    }

    #[test]
    fn test_wrapper_must_enclose_the_whole_condition() {
        let expr = "$[?(@.a == 1)] || $[?(@.b == 2)]";
        assert_eq!(unwrap_condition(expr), expr);
        assert_eq!(unwrap_condition("[?(@.a == 1) && (@.b == 2)]"), "[?(@.a == 1) && (@.b == 2)]");
        assert_eq!(unwrap_condition("$[?((@.a == 1) && (@.b == 2))]"), "(@.a == 1) && (@.b == 2)");
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        assert_eq!(split_groups("|| @.a == 1 ||"), vec![vec!["@.a == 1"]]);
        assert!(split_groups("  ").is_empty());
        assert!(split_groups("$[?()]").is_empty());
    }

    #[test]
    fn test_fully_parenthesized() {
        assert!(is_fully_parenthesized("(a && (b))"));
        assert!(!is_fully_parenthesized("(a) && (b)"));
        assert!(!is_fully_parenthesized("(a == ')'"));
    }
}
