//! Localizes why a path resolves to nothing.
//!
//! The path is cut into segments and re-evaluated one prefix at a time. The
//! walk stops at the first prefix that errors, matches nothing, or lands on a
//! scalar while segments remain. It never backtracks or retries.

use std::fmt;

use tracing::debug;

use crate::{
    adapter::{ErrorPolicy, QueryAdapter, split_anchor},
    evaluator::NodeSet,
    preview::preview,
    report::ReportConfig,
    splitter,
    value::{Kind, Value},
};

/// Outcome of one step of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The prefix matched at least one node
    Ok,
    /// The prefix matched nothing
    Missing,
    /// The prefix matched a scalar but more segments follow
    Stop,
    /// The engine rejected the prefix
    Error,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Ok => "OK",
            StepStatus::Missing => "MISSING",
            StepStatus::Stop => "STOP",
            StepStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One segment-level result.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticStep {
    /// The prefix evaluated, shown with the clause's own anchor
    pub path: String,
    pub status: StepStatus,
    pub detail: String,
    /// Nodes matched by the prefix (zero unless `Ok`/`Stop`)
    pub node_count: usize,
    /// Kinds of the sampled nodes
    pub kinds: Vec<Kind>,
}

impl DiagnosticStep {
    fn new(path: &str, status: StepStatus, detail: String) -> Self {
        DiagnosticStep {
            path: path.to_string(),
            status,
            detail,
            node_count: 0,
            kinds: Vec::new(),
        }
    }
}

/// A piece of a path as written: `.name`, `..name`, `.*` or `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Source text, appended verbatim when rebuilding prefixes
    pub text: String,
    /// Short name used in messages (`c` for `.c`, `[0]` for `[0]`)
    pub label: String,
}

impl PathSegment {
    /// Member name for `.name` segments.
    fn member_name(&self) -> Option<&str> {
        self.text
            .strip_prefix('.')
            .filter(|name| !name.starts_with('.') && *name != "*")
    }
}

/// Cut the part of a path after its anchor into segments.
///
/// Brackets are matched with quote awareness, so `['a.b']` and
/// `[?(@.x == ']')]` stay single segments.
///
/// # Examples
///
/// ```
/// use cond_probe::diagnostics::segment_path;
///
/// let labels: Vec<String> = segment_path(".lines[0]['unit price']..sku")
///     .into_iter()
///     .map(|s| s.label)
///     .collect();
/// assert_eq!(labels, vec!["lines", "[0]", "['unit price']", "..sku"]);
/// ```
pub fn segment_path(rest: &str) -> Vec<PathSegment> {
    let chars: Vec<char> = rest.chars().collect();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let start = i;
        let label;
        if chars[i] == '.' && chars.get(i + 1) == Some(&'.') {
            i += 2;
            i = if chars.get(i) == Some(&'[') {
                bracket_end(&chars, i)
            } else {
                name_end(&chars, i)
            };
            label = chars[start..i].iter().collect::<String>();
        } else if chars[i] == '.' {
            i = name_end(&chars, i + 1);
            label = chars[start + 1..i].iter().collect::<String>();
        } else if chars[i] == '[' {
            i = bracket_end(&chars, i);
            label = chars[start..i].iter().collect::<String>();
        } else {
            // Not a valid segment start; take it as written and let the engine judge it
            i = name_end(&chars, i + 1);
            label = chars[start..i].iter().collect::<String>();
        }
        segments.push(PathSegment {
            text: chars[start..i].iter().collect(),
            label,
        });
    }
    segments
}

fn name_end(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
        i += 1;
    }
    i
}

/// Index just past the `]` matching the `[` at `open`, or the end of input.
fn bracket_end(chars: &[char], open: usize) -> usize {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut i = open;
    while i < chars.len() {
        let ch = chars[i];
        i += 1;
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    i
}

/// Walk `path` prefix by prefix and report where resolution breaks down.
///
/// Engine errors become [`StepStatus::Error`] steps; they never propagate.
///
/// # Examples
///
/// ```
/// use cond_probe::{diagnostics::{diagnose, StepStatus}, JsonPathEngine, QueryAdapter, ReportConfig, Value};
///
/// let doc: Value = serde_json::json!({"a": {"b": 5}}).into();
/// let adapter = QueryAdapter::new(&JsonPathEngine);
/// let steps = diagnose(&adapter, "@.a.b.c", &doc, &ReportConfig::default());
///
/// let statuses: Vec<_> = steps.iter().map(|s| (s.path.as_str(), s.status)).collect();
/// assert_eq!(statuses, vec![
///     ("@.a", StepStatus::Ok),
///     ("@.a.b", StepStatus::Ok),
///     ("@.a.b", StepStatus::Stop),
/// ]);
/// assert_eq!(steps[2].detail, "b resolved to number, cannot have child c");
/// ```
pub fn diagnose(adapter: &QueryAdapter<'_>, path: &str, document: &Value, config: &ReportConfig) -> Vec<DiagnosticStep> {
    let (anchor, rest) = split_anchor(path);
    let segments = segment_path(&rest);
    let mut steps = Vec::new();

    if segments.is_empty() {
        let shown = anchor.symbol();
        match adapter.evaluate_query("$", document, ErrorPolicy::Diagnosable) {
            Ok(nodes) => steps.push(ok_step(shown, &nodes, config)),
            Err(e) => steps.push(DiagnosticStep::new(shown, StepStatus::Error, e.engine_error().to_string())),
        }
        return steps;
    }

    let mut prefix = String::new();
    let mut parent: Option<NodeSet> = None;

    for (i, segment) in segments.iter().enumerate() {
        prefix.push_str(&segment.text);
        let shown = format!("{}{}", anchor.symbol(), prefix);
        let query = format!("${}", prefix);

        let nodes = match adapter.evaluate_query(&query, document, ErrorPolicy::Diagnosable) {
            Ok(nodes) => nodes,
            Err(e) => {
                steps.push(DiagnosticStep::new(&shown, StepStatus::Error, e.engine_error().to_string()));
                break;
            }
        };

        if nodes.is_empty() {
            let parent_value = parent.as_ref().and_then(|p| p.first()).unwrap_or(document);
            steps.push(DiagnosticStep::new(
                &shown,
                StepStatus::Missing,
                missing_detail(segment, parent_value, config),
            ));
            break;
        }

        steps.push(ok_step(&shown, &nodes, config));

        if let Some(next) = segments.get(i + 1) {
            let kind = nodes[0].kind();
            if !kind.is_container() {
                let mut stop = DiagnosticStep::new(
                    &shown,
                    StepStatus::Stop,
                    format!("{} resolved to {}, cannot have child {}", segment.label, kind, next.label),
                );
                stop.node_count = nodes.len();
                stop.kinds = vec![kind];
                steps.push(stop);
                break;
            }
        }
        parent = Some(nodes);
    }

    debug!(path, steps = steps.len(), last = ?steps.last().map(|s| s.status), "diagnosed");
    steps
}

fn ok_step(shown: &str, nodes: &[Value], config: &ReportConfig) -> DiagnosticStep {
    let sample = &nodes[..nodes.len().min(config.sample_size)];
    let kinds: Vec<Kind> = sample.iter().map(Value::kind).collect();
    let previews: Vec<String> = sample.iter().map(|v| preview(v, &config.preview)).collect();

    let mut detail = format!(
        "{} node{}: {}",
        nodes.len(),
        if nodes.len() == 1 { "" } else { "s" },
        previews.join(", ")
    );
    if nodes.len() > sample.len() {
        detail.push_str(&format!(", ... (+{} more)", nodes.len() - sample.len()));
    }

    DiagnosticStep {
        path: shown.to_string(),
        status: StepStatus::Ok,
        detail,
        node_count: nodes.len(),
        kinds,
    }
}

fn missing_detail(segment: &PathSegment, parent: &Value, config: &ReportConfig) -> String {
    match (segment.member_name(), parent) {
        (Some(name), Value::Object(map)) => {
            let mut detail = format!("no key '{}'", name);
            if map.is_empty() {
                detail.push_str("; the object is empty");
                return detail;
            }
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            let shown: Vec<&str> = keys.iter().take(config.preview.max_keys).copied().collect();
            detail.push_str(&format!("; available keys: {}", shown.join(", ")));
            if keys.len() > shown.len() {
                detail.push_str(&format!(", ... (+{} keys)", keys.len() - shown.len()));
            }
            if let Some(near) = keys.iter().find(|k| k.eq_ignore_ascii_case(name) || k.trim() == name) {
                detail.push_str(&format!(" (did you mean '{}'?)", near));
            }
            detail
        }
        (Some(name), Value::Array(arr)) => format!(
            "no key '{}': the parent is an array of {} item{}; use an index or [*]",
            name,
            arr.len(),
            if arr.len() == 1 { "" } else { "s" }
        ),
        (_, Value::Array(arr)) => format!(
            "{} matched nothing in an array of {} item{}",
            segment.label,
            arr.len(),
            if arr.len() == 1 { "" } else { "s" }
        ),
        _ => format!("{} matched nothing", segment.label),
    }
}

/// A path of the shape `base[?(predicate)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSplit {
    pub base: String,
    pub predicate: String,
}

/// Split a trailing filter selector off a path. Single level: a filter inside
/// the base is left alone.
///
/// # Examples
///
/// ```
/// use cond_probe::diagnostics::split_filter;
///
/// let split = split_filter("@.lines[?(@.amount < 0)]").unwrap();
/// assert_eq!(split.base, "@.lines");
/// assert_eq!(split.predicate, "@.amount < 0");
/// assert!(split_filter("@.lines[0]").is_none());
/// ```
pub fn split_filter(path: &str) -> Option<FilterSplit> {
    let path = path.trim();
    if !path.ends_with(")]") {
        return None;
    }

    let open = splitter::top_level_offsets(path)
        .into_iter()
        .filter(|&i| path[i..].starts_with('['))
        .last()?;

    let predicate = path[open..].strip_prefix("[?(")?.strip_suffix(")]")?.trim();
    let base = path[..open].trim();
    if base.is_empty() || predicate.is_empty() {
        return None;
    }

    Some(FilterSplit {
        base: base.to_string(),
        predicate: predicate.to_string(),
    })
}
