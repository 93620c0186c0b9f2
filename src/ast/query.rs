use crate::ast::FilterExpr;

/// Which node a query starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `$`, the document root
    Root,
    /// `@`, the node currently under test in a filter
    Current,
}

/// A parsed path query such as `$.items[?(@.price > 10)].name`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathQuery {
    pub anchor: Anchor,

    /// Segments applied left to right
    pub segments: Vec<Segment>,
}

impl PathQuery {
    /// True when the query can select at most one node: only single
    /// name or index selectors, no descendants.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|s| match s {
            Segment::Child(selectors) => {
                selectors.len() == 1
                    && matches!(selectors[0], Selector::Name(_) | Selector::Index(_))
            }
            Segment::Descendant(_) => false,
        })
    }
}

/// One step of a path query.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `.name`, `.*` or `[...]`: applies the selectors to each child
    Child(Vec<Selector>),

    /// `..name`, `..*` or `..[...]`: applies the selectors to every descendant
    Descendant(Vec<Selector>),
}

/// A selector inside a segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Object member by name
    ///
    /// # Examples
    /// - `.documentid` → `Name("documentid")`
    /// - `['line items']` → `Name("line items")`
    Name(String),

    /// Array element by index, negative counts from the end
    Index(i64),

    /// `*`: every member or element
    Wildcard,

    /// `[start:end:step]`
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },

    /// `[?(...)]`: children for which the expression holds
    Filter(Box<FilterExpr>),
}
