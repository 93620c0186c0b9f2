//! Evaluates a whole condition and explains the outcome.
//!
//! Every clause of every group is evaluated, even after its group is already
//! decided, so the report is as complete as possible. A false clause gets a
//! diagnostic walk of its path and, where a common type trap applies, a
//! remediation suggestion.

use thiserror::Error;
use tracing::debug;

use crate::{
    adapter::{ErrorPolicy, EngineFailure, QueryAdapter, anchor_warning},
    ast::{Clause, CompareOp, Literal},
    classifier::{ClauseError, parse_clause},
    comparator::{compare_any, compare_one, emptiness_holds},
    diagnostics::{DiagnosticStep, FilterSplit, diagnose, split_filter},
    evaluator::{JsonPathEngine, NodeSet, QueryEngine},
    preview::{PreviewOptions, preview},
    splitter::split_groups,
    value::{Kind, Value, looks_numeric},
};

/// Limits applied while building a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// Rendering limits for every previewed value
    pub preview: PreviewOptions,
    /// Values of a clause's node set shown in the report
    pub max_nodes: usize,
    /// Values sampled per diagnostic step
    pub sample_size: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            preview: PreviewOptions::STANDARD,
            max_nodes: 5,
            sample_size: 3,
        }
    }
}

/// Errors that abort a whole evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The engine rejected a clause path while evaluating it directly
    #[error(transparent)]
    Query(#[from] EngineFailure),
}

/// The explained outcome of a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub condition: String,
    pub groups: Vec<GroupReport>,
    /// Advisory messages that did not change the outcome
    pub warnings: Vec<String>,
    /// True when at least one group holds
    pub result: bool,
}

/// One `&&`-joined group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport {
    pub clauses: Vec<ClauseReport>,
    /// True when every clause holds
    pub result: bool,
}

/// One clause and everything learned about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseReport {
    /// The clause as written
    pub text: String,
    pub clause: Result<Clause, ClauseError>,
    pub result: bool,
    /// Size of the node set the path resolved to
    pub node_count: usize,
    /// Previews of the first `max_nodes` values
    pub values: Vec<String>,
    pub diagnostics: Vec<DiagnosticStep>,
    /// Set when the path ends in a filter and the base was diagnosed instead
    pub filter: Option<FilterSplit>,
    /// Observations about the filter, when there is one
    pub notes: Vec<String>,
    pub suggestions: Vec<String>,
}

impl ClauseReport {
    fn malformed(text: &str, error: ClauseError) -> Self {
        ClauseReport {
            text: text.to_string(),
            clause: Err(error),
            result: false,
            node_count: 0,
            values: Vec::new(),
            diagnostics: Vec::new(),
            filter: None,
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// Combine clause outcomes: each group is the AND of its clauses, the whole
/// condition the OR of its groups.
///
/// # Examples
///
/// ```
/// use cond_probe::report::decide;
///
/// let (groups, overall) = decide(&[vec![true, false], vec![true, true]]);
/// assert_eq!(groups, vec![false, true]);
/// assert!(overall);
/// ```
pub fn decide(truths: &[Vec<bool>]) -> (Vec<bool>, bool) {
    let groups: Vec<bool> = truths.iter().map(|clauses| clauses.iter().all(|&t| t)).collect();
    let overall = groups.iter().any(|&g| g);
    (groups, overall)
}

/// Builds [`Report`]s with one engine and one configuration.
pub struct Reporter<'e> {
    adapter: QueryAdapter<'e>,
    config: ReportConfig,
}

impl<'e> Reporter<'e> {
    pub fn new(engine: &'e dyn QueryEngine, config: ReportConfig) -> Self {
        Reporter {
            adapter: QueryAdapter::new(engine),
            config,
        }
    }

    /// Evaluate `condition` against `document`.
    ///
    /// Returns an error only when the engine rejects a clause path during
    /// direct evaluation; malformed clauses are reported per clause.
    ///
    /// # Examples
    ///
    /// ```
    /// use cond_probe::{JsonPathEngine, ReportConfig, Reporter, Value};
    ///
    /// let doc: Value = serde_json::json!({"documentid": "CO-G1-CO18"}).into();
    /// let reporter = Reporter::new(&JsonPathEngine, ReportConfig::default());
    /// let report = reporter.evaluate("documentid == 'CO-G1-CO18'", &doc).unwrap();
    /// assert!(report.result);
    /// ```
    pub fn evaluate(&self, condition: &str, document: &Value) -> Result<Report, EvalError> {
        let mut warnings = Vec::new();
        let mut groups = Vec::new();

        for clause_texts in split_groups(condition) {
            let mut clauses = Vec::with_capacity(clause_texts.len());
            for text in &clause_texts {
                let report = self.evaluate_clause(text, document)?;
                if let Ok(clause) = &report.clause
                    && let Some(warning) = anchor_warning(clause.path())
                    && !warnings.contains(&warning)
                {
                    warnings.push(warning);
                }
                clauses.push(report);
            }
            groups.push(clauses);
        }

        if groups.is_empty() {
            warnings.push("the condition contains no clauses".to_string());
        }

        let truths: Vec<Vec<bool>> = groups
            .iter()
            .map(|clauses| clauses.iter().map(|c| c.result).collect())
            .collect();
        let (group_results, result) = decide(&truths);

        let groups = groups
            .into_iter()
            .zip(group_results)
            .map(|(clauses, result)| GroupReport { clauses, result })
            .collect();

        debug!(condition, result, "condition evaluated");
        Ok(Report {
            condition: condition.to_string(),
            groups,
            warnings,
            result,
        })
    }

    fn evaluate_clause(&self, text: &str, document: &Value) -> Result<ClauseReport, EvalError> {
        let clause = match parse_clause(text) {
            Ok(clause) => clause,
            Err(e) => {
                debug!(clause = text, error = %e, "malformed clause");
                return Ok(ClauseReport::malformed(text, e));
            }
        };

        let nodes = self.adapter.evaluate(clause.path(), document, ErrorPolicy::Fatal)?;
        let result = match &clause {
            Clause::Emptiness { want_empty, .. } => emptiness_holds(&nodes, *want_empty),
            Clause::Comparison { op, literal, .. } => compare_any(&nodes, *op, literal),
        };
        debug!(clause = text, result, matched = nodes.len(), "clause evaluated");

        let values = nodes
            .iter()
            .take(self.config.max_nodes)
            .map(|v| preview(v, &self.config.preview))
            .collect();

        let mut report = ClauseReport {
            text: text.to_string(),
            clause: Ok(clause.clone()),
            result,
            node_count: nodes.len(),
            values,
            diagnostics: Vec::new(),
            filter: None,
            notes: Vec::new(),
            suggestions: Vec::new(),
        };

        if !result {
            let filter = split_filter(clause.path());
            let walk_path = filter.as_ref().map_or(clause.path(), |f| f.base.as_str());
            report.diagnostics = diagnose(&self.adapter, walk_path, document, &self.config);
            report.suggestions = suggest(&clause, &nodes);
            if let Some(split) = &filter {
                self.explain_filter(split, document, &mut report);
            }
            report.filter = filter;
        }

        Ok(report)
    }

    /// Count what the trailing filter had to choose from, and look for type
    /// traps in its own clauses.
    fn explain_filter(&self, split: &FilterSplit, document: &Value, report: &mut ClauseReport) {
        let Ok(bases) = self.adapter.evaluate(&split.base, document, ErrorPolicy::Diagnosable) else {
            return;
        };
        let candidates: Vec<&Value> = bases.iter().flat_map(children).collect();
        report.notes.push(format!(
            "filter [?({})] kept {} of {} candidate{}",
            split.predicate,
            report.node_count,
            candidates.len(),
            if candidates.len() == 1 { "" } else { "s" }
        ));

        for group in split_groups(&split.predicate) {
            for text in group {
                let Ok(inner) = parse_clause(&text) else {
                    continue;
                };
                let mut values = NodeSet::new();
                for candidate in &candidates {
                    if let Ok(nodes) = self.adapter.evaluate(inner.path(), candidate, ErrorPolicy::Diagnosable) {
                        values.extend(nodes);
                    }
                }
                for suggestion in suggest(&inner, &values) {
                    let suggestion = format!("in filter: {}", suggestion);
                    if !report.suggestions.contains(&suggestion) {
                        report.suggestions.push(suggestion);
                    }
                }
            }
        }
    }
}

fn children(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

/// Evaluate with the built-in engine and default limits.
pub fn evaluate(condition: &str, document: &Value) -> Result<Report, EvalError> {
    Reporter::new(&JsonPathEngine, ReportConfig::default()).evaluate(condition, document)
}

const MAX_EXAMPLES: usize = 3;

/// Remediation hints for a clause that came out false.
fn suggest(clause: &Clause, nodes: &[Value]) -> Vec<String> {
    let mut out = Vec::new();

    match clause {
        Clause::Comparison { path, op, literal } if op.is_ordering() => {
            let Literal::Number(right) = literal else {
                out.push(format!(
                    "'{}' only matches numbers, but the right-hand side {} is a {}",
                    op,
                    literal,
                    literal.describe()
                ));
                return out;
            };
            let numeric_match = nodes.iter().any(|v| compare_one(v, *op, right));
            let examples = numeric_strings(nodes);
            if !numeric_match && !examples.is_empty() {
                out.push(format!(
                    "{} holds numeric-looking strings ({}); '{}' never compares a string with a number. \
                     Store these values as numbers in the document",
                    path,
                    quote_all(&examples),
                    op
                ));
            }
        }
        Clause::Comparison { path, op, literal } => {
            let equality_word = if *op == CompareOp::Equal { "match" } else { "differ" };
            match literal {
                Literal::Number(n) => {
                    let same_number = nodes.iter().filter_map(Value::as_str).find(|s| {
                        Value::parse_number(s.trim()).is_some_and(|parsed| parsed.strict_eq(n))
                    });
                    if let Some(text) = same_number {
                        out.push(format!(
                            "{} holds the string \"{}\" but the literal is the number {}; quote it to {} on text: {} {} {}",
                            path,
                            text,
                            literal,
                            equality_word,
                            path,
                            op,
                            Literal::Quoted(text.to_string())
                        ));
                    }
                }
                Literal::Quoted(s) if looks_numeric(s) => {
                    if nodes.iter().any(|v| v.kind() == Kind::Number) {
                        out.push(format!(
                            "{} holds numbers but '{}' is a quoted string; drop the quotes to compare numerically: {} {} {}",
                            path, s, path, op, s
                        ));
                    }
                }
                Literal::Bare(word)
                    if (word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false"))
                        && nodes.iter().any(|v| v.kind() == Kind::Boolean) =>
                {
                    out.push(format!(
                        "{} holds booleans, but the bare word {} is compared as the string \"{}\"; \
                         boolean literals are not part of the condition language",
                        path, word, word
                    ));
                }
                Literal::Null if nodes.is_empty() => {
                    out.push(format!(
                        "{} matched nothing; a missing key is not null. Use '{} empty true' to test for absence",
                        path, path
                    ));
                }
                _ => {}
            }
        }
        Clause::Emptiness {
            path,
            want_empty: true,
        } if !nodes.is_empty() => {
            if nodes.iter().all(|v| matches!(v, Value::Array(a) if a.is_empty())) {
                out.push(format!(
                    "'empty' tests whether {} matches any node, and it matched an empty array; \
                     use '{}[*] empty true' to test the array's contents",
                    path, path
                ));
            } else if nodes.iter().all(is_hollow) {
                out.push(format!(
                    "'empty' tests whether {} matches any node, not whether its value is empty",
                    path
                ));
            }
        }
        Clause::Emptiness { .. } => {}
    }

    out
}

fn is_hollow(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(m) => m.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

fn numeric_strings(nodes: &[Value]) -> Vec<&str> {
    nodes
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| looks_numeric(s))
        .take(MAX_EXAMPLES)
        .collect()
}

fn quote_all(values: &[&str]) -> String {
    values
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(text: &str) -> Clause {
        parse_clause(text).unwrap()
    }

    #[test]
    fn test_decide() {
        assert_eq!(decide(&[vec![true, false], vec![true, true]]), (vec![false, true], true));
        assert_eq!(decide(&[vec![false]]), (vec![false], false));
        assert_eq!(decide(&[]), (vec![], false));
    }

    #[test]
    fn test_numeric_string_suggestion() {
        let nodes = vec![Value::String("-3998.50".into())];
        let hints = suggest(&clause("@.amount < 0"), &nodes);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("\"-3998.50\""));
        assert!(hints[0].contains("'<'"));
    }

    #[test]
    fn test_no_suggestion_when_a_number_matched() {
        let nodes = vec![Value::String("-5".into()), Value::Integer(-1)];
        assert!(suggest(&clause("@.amount < 0"), &nodes).is_empty());
    }

    #[test]
    fn test_ordering_against_string_literal() {
        let hints = suggest(&clause("@.amount < '0'"), &[Value::Integer(-1)]);
        assert!(hints[0].contains("quoted string"));
    }

    #[test]
    fn test_quote_hints() {
        let hints = suggest(&clause("@.id == 5"), &[Value::String("5".into())]);
        assert!(hints[0].contains("@.id == '5'"), "{}", hints[0]);

        let hints = suggest(&clause("@.id == '5'"), &[Value::Integer(5)]);
        assert!(hints[0].contains("@.id == 5"), "{}", hints[0]);
    }

    #[test]
    fn test_quote_hint_keeps_the_stored_text() {
        let hints = suggest(&clause("@.amount == -3998.50"), &[Value::String("-3998.50".into())]);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].contains("the string \"-3998.50\""), "{}", hints[0]);
        assert!(hints[0].ends_with("@.amount == '-3998.50'"), "{}", hints[0]);
    }

    #[test]
    fn test_boolean_bare_word_hint() {
        let hints = suggest(&clause("@.active == true"), &[Value::Boolean(true)]);
        assert!(hints[0].contains("bare word true"));
    }

    #[test]
    fn test_missing_is_not_null_hint() {
        let hints = suggest(&clause("@.closed == null"), &[]);
        assert!(hints[0].contains("@.closed empty true"));
    }

    #[test]
    fn test_empty_array_hint() {
        let hints = suggest(&clause("@.tags empty true"), &[Value::Array(vec![])]);
        assert!(hints[0].contains("@.tags[*] empty true"));
    }
}
