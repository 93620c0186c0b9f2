//! Text and JSON renderings of a [`Report`].
//!
//! # Examples
//!
//! ```
//! use cond_probe::{output::{render_text, to_json}, report::evaluate, Value};
//!
//! let doc: Value = serde_json::json!({"a": {"b": 5}}).into();
//! let report = evaluate("@.a.b.c == 1", &doc).unwrap();
//!
//! let text = render_text(&report);
//! assert!(text.contains("STOP"));
//! assert!(text.ends_with("RESULT: FALSE\n"));
//!
//! let json = to_json(&report);
//! assert_eq!(json["result"], false);
//! ```

use std::fmt;

use serde_json::{Value as Json, json};

use crate::{
    diagnostics::DiagnosticStep,
    report::{ClauseReport, Report},
};

fn verdict(result: bool) -> &'static str {
    if result { "TRUE" } else { "FALSE" }
}

/// Render the report as indented text, one line per finding.
pub fn render_text(report: &Report) -> String {
    TextReport(report).to_string()
}

/// [`Display`](fmt::Display) adapter behind [`render_text`].
pub struct TextReport<'a>(pub &'a Report);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Condition: {}", report.condition)?;
        for warning in &report.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }

        for (i, group) in report.groups.iter().enumerate() {
            writeln!(f, "Group {}: {}", i + 1, verdict(group.result))?;
            for clause in &group.clauses {
                write_clause(f, clause)?;
            }
        }

        writeln!(f, "RESULT: {}", verdict(report.result))
    }
}

fn write_clause(f: &mut fmt::Formatter<'_>, clause: &ClauseReport) -> fmt::Result {
    let error = clause.clause.as_ref().err();
    let tag = if error.is_some() { "ERROR" } else { verdict(clause.result) };
    writeln!(f, "  [{:<5}] {}", tag, clause.text)?;

    if let Some(e) = error {
        return writeln!(f, "      error: {}", e);
    }

    if clause.values.is_empty() {
        writeln!(f, "      values: none")?;
    } else {
        write!(f, "      values ({}): {}", clause.node_count, clause.values.join(", "))?;
        if clause.node_count > clause.values.len() {
            write!(f, ", ... (+{} more)", clause.node_count - clause.values.len())?;
        }
        writeln!(f)?;
    }

    if !clause.diagnostics.is_empty() {
        match &clause.filter {
            Some(split) => writeln!(f, "      diagnostics (base {}):", split.base)?,
            None => writeln!(f, "      diagnostics:")?,
        }
        for step in &clause.diagnostics {
            writeln!(f, "        {:<7} {}  {}", step.status, step.path, step.detail)?;
        }
    }
    for note in &clause.notes {
        writeln!(f, "      note: {}", note)?;
    }
    for suggestion in &clause.suggestions {
        writeln!(f, "      suggestion: {}", suggestion)?;
    }
    Ok(())
}

/// Build a JSON document mirroring the report structure.
pub fn to_json(report: &Report) -> Json {
    json!({
        "condition": report.condition,
        "result": report.result,
        "warnings": report.warnings,
        "groups": report.groups.iter().map(|group| json!({
            "result": group.result,
            "clauses": group.clauses.iter().map(clause_json).collect::<Vec<_>>(),
        })).collect::<Vec<_>>(),
    })
}

fn clause_json(clause: &ClauseReport) -> Json {
    match &clause.clause {
        Err(e) => json!({
            "text": clause.text,
            "result": false,
            "error": e.to_string(),
        }),
        Ok(parsed) => json!({
            "text": clause.text,
            "parsed": parsed.to_string(),
            "result": clause.result,
            "node_count": clause.node_count,
            "values": clause.values,
            "diagnostics": clause.diagnostics.iter().map(step_json).collect::<Vec<_>>(),
            "filter": clause.filter.as_ref().map(|f| json!({"base": f.base, "predicate": f.predicate})),
            "notes": clause.notes,
            "suggestions": clause.suggestions,
        }),
    }
}

fn step_json(step: &DiagnosticStep) -> Json {
    json!({
        "path": step.path,
        "status": step.status.as_str(),
        "detail": step.detail,
        "node_count": step.node_count,
        "kinds": step.kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
    })
}
