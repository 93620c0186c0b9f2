/// Lexical tokens of the path-query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// -1.5e3
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -1
    /// ```
    Integer(i64),

    /// String literal enclosed in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// 'CO-G1-CO18'
    /// "item #1"
    /// ```
    String(String),

    /// Boolean values
    Boolean(bool),

    /// Null value
    Null,

    /// Member name in dot notation
    ///
    /// Starts with a letter or underscore; may contain letters, digits,
    /// underscores and hyphens.
    ///
    /// # Examples
    /// ```text
    /// documentid
    /// line_items
    /// x-request-id
    /// ```
    Identifier(String),

    // Anchors
    /// Document root
    ///
    /// # Examples
    /// ```text
    /// $
    /// $.store.book
    /// ```
    Dollar,

    /// Current node, used inside filters
    ///
    /// # Examples
    /// ```text
    /// $.items[?(@.price > 10)]
    /// ```
    At,

    // Segments
    /// Child member access
    Dot,

    /// Descendant access
    ///
    /// # Examples
    /// ```text
    /// $..price
    /// ```
    DotDot,

    /// Wildcard selector
    Star,

    /// Filter selector marker
    ///
    /// # Examples
    /// ```text
    /// [?(@.active == true)]
    /// [?@.tags empty false]
    /// ```
    Question,

    /// `empty` keyword in filter tests
    Empty,

    // Comparison
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Logical
    /// Logical AND (`&&`)
    AndAnd,

    /// Logical OR (`||`)
    OrOr,

    /// Logical NOT (`!`)
    Not,

    // Delimiters
    /// Left bracket for selectors
    LBracket,

    /// Right bracket
    RBracket,

    /// Left parenthesis for filters or grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating selectors
    Comma,

    /// Colon in slices
    Colon,

    /// End of input
    Eof,
}
