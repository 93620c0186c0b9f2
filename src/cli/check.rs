//! Evaluate a condition against JSON input

use std::{fs, path::PathBuf};

use tracing::info;

use super::CliError;
use crate::{
    JsonPathEngine, Report, ReportConfig, Reporter, Value, classifier::parse_clause, splitter::split_groups,
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The condition to evaluate
    pub condition: String,
    /// JSON document given inline
    pub input: Option<String>,
    /// JSON document read from a file
    pub file: Option<PathBuf>,
    /// Limits for previews and diagnostics
    pub config: ReportConfig,
}

/// Result of a check operation
#[derive(Debug)]
pub struct CheckOutcome {
    pub report: Report,
}

impl CheckOutcome {
    /// Process exit code: 0 when the condition holds, 1 when it does not.
    pub fn exit_code(&self) -> i32 {
        if self.report.result { 0 } else { 1 }
    }
}

/// Decode the document from `--input` or `--file`.
pub fn load_document(input: Option<&str>, file: Option<&PathBuf>) -> Result<Value, CliError> {
    let text = match (input, file) {
        (Some(_), Some(_)) => return Err(CliError::ConflictingInput),
        (Some(s), None) => s.to_string(),
        (None, Some(path)) => fs::read_to_string(path).map_err(|source| CliError::File {
            path: path.clone(),
            source,
        })?,
        (None, None) => return Err(CliError::NoInput),
    };

    let json: serde_json::Value = serde_json::from_str(&text)?;
    Ok(Value::from(json))
}

/// Execute a check: load the document and build the report.
pub fn execute_check(options: &CheckOptions) -> Result<CheckOutcome, CliError> {
    let document = load_document(options.input.as_deref(), options.file.as_ref())?;
    let reporter = Reporter::new(&JsonPathEngine, options.config);
    let report = reporter.evaluate(&options.condition, &document)?;
    info!(result = report.result, groups = report.groups.len(), "check finished");
    Ok(CheckOutcome { report })
}

/// Show how a condition splits into groups and clauses, without a document.
pub fn describe_split(condition: &str) -> String {
    let mut out = String::new();
    let groups = split_groups(condition);
    if groups.is_empty() {
        out.push_str("(no clauses)\n");
    }
    for (i, group) in groups.iter().enumerate() {
        out.push_str(&format!("Group {}:\n", i + 1));
        for text in group {
            match parse_clause(text) {
                Ok(clause) => {
                    let kind = match &clause {
                        crate::Clause::Emptiness { .. } => "emptiness".to_string(),
                        crate::Clause::Comparison { literal, .. } => {
                            format!("comparison, {} literal", literal.describe())
                        }
                    };
                    out.push_str(&format!("  {}  ({})\n", clause, kind));
                }
                Err(e) => out.push_str(&format!("  {}  (error: {})\n", text, e)),
            }
        }
    }
    out
}
