//! Bridges clause paths to a [`QueryEngine`].
//!
//! Clause paths are written relative to the record under test (`@.amount`, or
//! just `amount`); the engine only knows the document root (`$`). The adapter
//! rewrites the anchor, and reports engine failures tagged with the policy the
//! caller asked for.

use thiserror::Error;
use tracing::debug;

use crate::{
    evaluator::{NodeSet, QueryEngine},
    parser::QueryError,
    value::Value,
};

/// How a path in a clause is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathAnchor {
    /// `@...`, the current record
    Record,
    /// `$...`, the document root
    Root,
    /// No anchor, such as `documentid` or `lines[0]`; treated as `@.`
    Implicit,
}

impl PathAnchor {
    /// The anchor symbol paths are displayed with.
    pub fn symbol(self) -> &'static str {
        match self {
            PathAnchor::Root => "$",
            PathAnchor::Record | PathAnchor::Implicit => "@",
        }
    }
}

/// Separate a clause path into its anchor and the segments that follow.
///
/// The returned rest always starts with `.`, `[` or is empty.
///
/// # Examples
///
/// ```
/// use cond_probe::adapter::{split_anchor, PathAnchor};
///
/// assert_eq!(split_anchor("@.a.b"), (PathAnchor::Record, ".a.b".to_string()));
/// assert_eq!(split_anchor("$['a']"), (PathAnchor::Root, "['a']".to_string()));
/// assert_eq!(split_anchor("documentid"), (PathAnchor::Implicit, ".documentid".to_string()));
/// ```
pub fn split_anchor(path: &str) -> (PathAnchor, String) {
    let path = path.trim();
    if let Some(rest) = path.strip_prefix('@') {
        (PathAnchor::Record, rest.to_string())
    } else if let Some(rest) = path.strip_prefix('$') {
        (PathAnchor::Root, rest.to_string())
    } else if path.starts_with(['.', '[']) || path.is_empty() {
        (PathAnchor::Implicit, path.to_string())
    } else {
        (PathAnchor::Implicit, format!(".{}", path))
    }
}

/// Rewrite a clause path into the engine's root-relative syntax.
pub fn to_root_relative(path: &str) -> String {
    let (_, rest) = split_anchor(path);
    format!("${}", rest)
}

/// Advisory warning for a clause path anchored at the document root.
///
/// The path is still evaluated; conditions are meant to be record-relative and
/// mixing the two anchors tends to produce confusing results.
pub fn anchor_warning(path: &str) -> Option<String> {
    match split_anchor(path).0 {
        PathAnchor::Root => Some(format!(
            "'{}' uses the root anchor '$' inside a condition; conditions are evaluated against the record, use '@' instead",
            path.trim()
        )),
        _ => None,
    }
}

/// What the caller wants done with an engine error at this call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the evaluation
    Fatal,
    /// Turn the error into a diagnostic
    Diagnosable,
}

/// An engine error, tagged with the policy of the call that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineFailure {
    #[error("query '{query}' failed: {source}")]
    Fatal {
        query: String,
        #[source]
        source: QueryError,
    },

    #[error("query '{query}' failed: {source}")]
    Diagnosable {
        query: String,
        #[source]
        source: QueryError,
    },
}

impl EngineFailure {
    fn new(policy: ErrorPolicy, query: String, source: QueryError) -> Self {
        match policy {
            ErrorPolicy::Fatal => EngineFailure::Fatal { query, source },
            ErrorPolicy::Diagnosable => EngineFailure::Diagnosable { query, source },
        }
    }

    /// The engine's own error, unmodified.
    pub fn engine_error(&self) -> &QueryError {
        match self {
            EngineFailure::Fatal { source, .. } | EngineFailure::Diagnosable { source, .. } => source,
        }
    }

    pub fn query(&self) -> &str {
        match self {
            EngineFailure::Fatal { query, .. } | EngineFailure::Diagnosable { query, .. } => query,
        }
    }
}

/// Evaluates clause paths through an engine.
pub struct QueryAdapter<'e> {
    engine: &'e dyn QueryEngine,
}

impl<'e> QueryAdapter<'e> {
    pub fn new(engine: &'e dyn QueryEngine) -> Self {
        QueryAdapter { engine }
    }

    /// Resolve a clause path against the document.
    pub fn evaluate(&self, path: &str, document: &Value, policy: ErrorPolicy) -> Result<NodeSet, EngineFailure> {
        self.evaluate_query(&to_root_relative(path), document, policy)
    }

    /// Resolve an already root-relative query.
    pub fn evaluate_query(&self, query: &str, document: &Value, policy: ErrorPolicy) -> Result<NodeSet, EngineFailure> {
        match self.engine.evaluate(query, document) {
            Ok(nodes) => {
                debug!(query, matched = nodes.len(), "resolved");
                Ok(nodes)
            }
            Err(e) => {
                debug!(query, error = %e, ?policy, "engine error");
                Err(EngineFailure::new(policy, query.to_string(), e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::JsonPathEngine;

    #[test]
    fn test_rewrites_record_anchor() {
        assert_eq!(to_root_relative("@.a[0].b"), "$.a[0].b");
        assert_eq!(to_root_relative("@"), "$");
        assert_eq!(to_root_relative("$.a"), "$.a");
        assert_eq!(to_root_relative("lines[0]"), "$.lines[0]");
        assert_eq!(to_root_relative("[0]"), "$[0]");
    }

    #[test]
    fn test_root_anchor_warns_but_evaluates() {
        assert!(anchor_warning("$.a").is_some());
        assert!(anchor_warning("@.a").is_none());
        assert!(anchor_warning("a").is_none());

        let doc: Value = serde_json::json!({"a": 1}).into();
        let adapter = QueryAdapter::new(&JsonPathEngine);
        let nodes = adapter.evaluate("$.a", &doc, ErrorPolicy::Fatal).unwrap();
        assert_eq!(nodes, vec![Value::Integer(1)]);
    }

    #[test]
    fn test_policy_tags_the_failure() {
        let doc = Value::Null;
        let adapter = QueryAdapter::new(&JsonPathEngine);
        let fatal = adapter.evaluate("@.a[", &doc, ErrorPolicy::Fatal).unwrap_err();
        assert!(matches!(fatal, EngineFailure::Fatal { .. }));
        assert_eq!(fatal.query(), "$.a[");

        let soft = adapter.evaluate("@.a[", &doc, ErrorPolicy::Diagnosable).unwrap_err();
        assert!(matches!(soft, EngineFailure::Diagnosable { .. }));
        assert_eq!(soft.engine_error(), fatal.engine_error());
    }
}
