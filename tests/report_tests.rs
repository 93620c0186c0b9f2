use cond_probe::{
    EngineFailure, EvalError, JsonPathEngine, NodeSet, QueryEngine, QueryError, ReportConfig, Reporter, StepStatus,
    Value,
    output::{render_text, to_json},
    report::evaluate,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn doc(value: serde_json::Value) -> Value {
    Value::from(value)
}

fn truths(condition: &str, document: &Value) -> Vec<Vec<bool>> {
    evaluate(condition, document)
        .unwrap()
        .groups
        .iter()
        .map(|g| g.clauses.iter().map(|c| c.result).collect())
        .collect()
}

#[test]
fn test_or_of_ands_decision() {
    let document = doc(json!({"a": 1, "b": 0, "c": 3, "d": 4}));
    let report = evaluate("@.a == 1 && @.b == 2 || @.c == 3 && @.d == 4", &document).unwrap();

    assert_eq!(truths("@.a == 1 && @.b == 2 || @.c == 3 && @.d == 4", &document), vec![
        vec![true, false],
        vec![true, true]
    ]);
    let groups: Vec<bool> = report.groups.iter().map(|g| g.result).collect();
    assert_eq!(groups, vec![false, true]);
    assert!(report.result);
}

#[test]
fn test_every_clause_is_evaluated_after_a_group_fails() {
    let document = doc(json!({"a": 2, "b": 2}));
    assert_eq!(truths("@.a == 1 && @.b == 2", &document), vec![vec![false, true]]);
}

#[test]
fn test_numeric_string_is_explained() {
    let document = doc(json!({"amount": "-3998.50", "lines": [{"sku": "A1"}]}));
    let report = evaluate("$[?(@.amount < 0 && @.lines empty false)]", &document).unwrap();

    assert!(!report.result);
    let amount = &report.groups[0].clauses[0];
    assert!(!amount.result);
    assert_eq!(amount.values, vec!["\"-3998.50\""]);
    assert_eq!(amount.suggestions.len(), 1);
    assert!(amount.suggestions[0].contains("\"-3998.50\""), "{}", amount.suggestions[0]);

    let lines = &report.groups[0].clauses[1];
    assert!(lines.result);
    assert!(lines.diagnostics.is_empty());
}

#[test]
fn test_exact_match_on_bare_path() {
    let document = doc(json!({"documentid": "CO-G1-CO18"}));
    assert!(evaluate("documentid == 'CO-G1-CO18'", &document).unwrap().result);
    assert!(evaluate("@.documentid == \"CO-G1-CO18\"", &document).unwrap().result);
    assert!(!evaluate("@.documentid == 'co-g1-co18'", &document).unwrap().result);
}

#[test]
fn test_emptiness_clauses() {
    let document = doc(json!({"lines": [], "tags": ["x"]}));
    assert_eq!(truths("@.missing empty true && @.tags empty false", &document), vec![vec![true, true]]);

    let report = evaluate("@.lines empty true", &document).unwrap();
    let clause = &report.groups[0].clauses[0];
    assert!(!clause.result);
    assert!(clause.suggestions[0].contains("@.lines[*] empty true"), "{}", clause.suggestions[0]);
}

#[test]
fn test_stop_diagnostic_on_scalar() {
    let document = doc(json!({"a": {"b": 5}}));
    let report = evaluate("@.a.b.c == 1", &document).unwrap();
    let steps = &report.groups[0].clauses[0].diagnostics;

    let statuses: Vec<StepStatus> = steps.iter().map(|s| s.status).collect();
    assert_eq!(statuses, vec![StepStatus::Ok, StepStatus::Ok, StepStatus::Stop]);
    assert_eq!(steps[2].detail, "b resolved to number, cannot have child c");
}

#[test]
fn test_missing_key_diagnostic() {
    let document = doc(json!({"customer": {"name": "Ada", "city": "Oslo"}}));
    let report = evaluate("@.customer.Name == 'Ada'", &document).unwrap();
    let steps = &report.groups[0].clauses[0].diagnostics;

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].status, StepStatus::Missing);
    assert_eq!(steps[1].path, "@.customer.Name");
    assert_eq!(
        steps[1].detail,
        "no key 'Name'; available keys: city, name (did you mean 'name'?)"
    );
}

#[test]
fn test_engine_error_in_direct_evaluation_is_fatal() {
    let document = doc(json!({"a": [1]}));
    let err = evaluate("@.b == 1 || @.a[?(@ =)] == 1", &document).unwrap_err();
    let EvalError::Query(failure) = err;
    assert!(matches!(failure, EngineFailure::Fatal { .. }));
    assert_eq!(failure.query(), "$.a[?(@ =)]");
}

#[test]
fn test_malformed_clause_does_not_abort_siblings() {
    let document = doc(json!({"a": 1}));
    let report = evaluate("@.flag && @.a == 1 || @.a == 1", &document).unwrap();

    let first = &report.groups[0].clauses[0];
    assert!(first.clause.is_err());
    assert!(!first.result);
    assert!(report.groups[0].clauses[1].result);
    assert!(!report.groups[0].result);
    assert!(report.result);
}

#[test]
fn test_filter_note_and_inner_suggestion() {
    let document = doc(json!({"lines": [{"amount": "-5"}, {"amount": 3}]}));
    let report = evaluate("@.lines[?(@.amount < 0)] empty false", &document).unwrap();
    let clause = &report.groups[0].clauses[0];

    assert!(!clause.result);
    assert_eq!(clause.filter.as_ref().map(|f| f.base.as_str()), Some("@.lines"));
    assert_eq!(clause.notes, vec!["filter [?(@.amount < 0)] kept 0 of 2 candidates"]);
    assert_eq!(clause.diagnostics[0].status, StepStatus::Ok);
    assert!(
        clause.suggestions.iter().any(|s| s.starts_with("in filter: ") && s.contains("\"-5\"")),
        "{:?}",
        clause.suggestions
    );
}

#[test]
fn test_root_anchor_warns_but_evaluates() {
    let document = doc(json!({"a": 1}));
    let report = evaluate("$.a == 1 && $.a != 2", &document).unwrap();
    assert!(report.result);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("'$.a'"));
}

#[test]
fn test_empty_condition() {
    let report = evaluate("  ", &doc(json!({}))).unwrap();
    assert!(!report.result);
    assert!(report.groups.is_empty());
    assert_eq!(report.warnings, vec!["the condition contains no clauses"]);
}

#[test]
fn test_report_is_deterministic() {
    let document = doc(json!({"b": [3, 1, 2], "a": {"z": null, "y": "text"}}));
    let condition = "@.a.y == 'x' || @.b[*] > 5 && @.a.q empty false";
    let first = evaluate(condition, &document).unwrap();
    for _ in 0..5 {
        assert_eq!(evaluate(condition, &document).unwrap(), first);
    }
    assert_eq!(render_text(&first), render_text(&evaluate(condition, &document).unwrap()));
}

#[test]
fn test_limits_come_from_config() {
    let document = doc(json!({"xs": [1, 2, 3, 4], "s": "a".repeat(300)}));
    let config = ReportConfig {
        max_nodes: 2,
        ..ReportConfig::default()
    };
    let reporter = Reporter::new(&JsonPathEngine, config);

    let report = reporter.evaluate("@.xs[*] == 99", &document).unwrap();
    let clause = &report.groups[0].clauses[0];
    assert_eq!(clause.node_count, 4);
    assert_eq!(clause.values, vec!["1", "2"]);

    let report = reporter.evaluate("@.s == 'b'", &document).unwrap();
    assert!(report.groups[0].clauses[0].values[0].ends_with("... (+140 chars)"));
}

struct BrokenEngine;

impl QueryEngine for BrokenEngine {
    fn evaluate(&self, _query: &str, _document: &Value) -> Result<NodeSet, QueryError> {
        Err(QueryError::new("engine offline", 0))
    }
}

#[test]
fn test_any_engine_can_be_plugged_in() {
    let reporter = Reporter::new(&BrokenEngine, ReportConfig::default());
    let err = reporter.evaluate("@.a == 1", &doc(json!({}))).unwrap_err();
    assert!(err.to_string().contains("engine offline"), "{}", err);
}

#[test]
fn test_rendered_output() {
    let document = doc(json!({"a": {"b": 5}}));
    let report = evaluate("@.a.b.c == 1", &document).unwrap();

    let text = render_text(&report);
    assert!(text.starts_with("Condition: @.a.b.c == 1\n"));
    assert!(text.contains("Group 1: FALSE"));
    assert!(text.contains("  [FALSE] @.a.b.c == 1"));
    assert!(text.contains("STOP"));
    assert!(text.ends_with("RESULT: FALSE\n"));

    let json = to_json(&report);
    assert_eq!(json["result"], false);
    assert_eq!(json["groups"][0]["clauses"][0]["diagnostics"][2]["status"], "STOP");
}

#[test]
fn test_huge_slice_step_in_a_clause() {
    let document = doc(json!({"a": [1, 2, 3]}));
    let report = evaluate("@.a[1::9223372036854775807] empty false", &document).unwrap();
    assert!(report.result);
    assert_eq!(report.groups[0].clauses[0].values, vec!["2"]);
}

#[test]
fn test_deep_nesting_in_a_clause_is_fatal() {
    let clause = format!("@.a[?({}@.b)] empty true", "!".repeat(200_000));
    let err = evaluate(&clause, &doc(json!({"a": [{"b": 1}]}))).unwrap_err();
    let EvalError::Query(failure) = err;
    assert!(matches!(failure, EngineFailure::Fatal { .. }));
    assert_eq!(failure.engine_error().message, "filter nested too deeply");
}

#[test]
fn test_quote_hint_rewrite_holds() {
    let document = doc(json!({"amount": "-3998.50"}));
    let report = evaluate("@.amount == -3998.50", &document).unwrap();
    let clause = &report.groups[0].clauses[0];
    assert!(!clause.result);
    assert_eq!(clause.suggestions.len(), 1);

    let rewrite = clause.suggestions[0].rsplit("on text: ").next().unwrap();
    assert_eq!(rewrite, "@.amount == '-3998.50'");
    assert!(evaluate(rewrite, &document).unwrap().result);
}

#[test]
fn test_rendered_values_line_counts_hidden_nodes() {
    let config = ReportConfig {
        max_nodes: 2,
        ..ReportConfig::default()
    };
    let report = Reporter::new(&JsonPathEngine, config)
        .evaluate("@.xs[*] == 99", &doc(json!({"xs": [1, 2, 3, 4]})))
        .unwrap();
    assert!(render_text(&report).contains("      values (4): 1, 2, ... (+2 more)\n"));
}
