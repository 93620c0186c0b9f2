//! # Abstract syntax
//!
//! Two small languages meet in this crate:
//!
//! - **Conditions**: `||`-separated groups of `&&`-separated clauses, each
//!   clause either `<path> empty <bool>` or `<path> <op> <literal>`
//!   ([clause]).
//! - **Path queries**: the JSONPath dialect the built-in engine evaluates
//!   ([tokens], [query], [expressions]).
//!
//! [operators] holds the comparison operators both sides share.
//!
//! ## Examples
//!
//! ```text
//! $[?(@.documentid == 'CO-G1-CO18' && @.lines empty false)]
//! @.amount < 0 || @.status == 'VOID'
//! $.lines[?(@.amount < 0)].sku
//! ```
pub mod clause;
pub mod expressions;
pub mod operators;
pub mod query;
pub mod tokens;

pub use clause::{Clause, Literal};
pub use expressions::{FilterExpr, Operand};
pub use operators::CompareOp;
pub use query::{Anchor, PathQuery, Segment, Selector};
pub use tokens::Token;
