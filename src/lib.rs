pub mod adapter;
pub mod ast;
pub mod classifier;
pub mod cli;
pub mod comparator;
pub mod diagnostics;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod preview;
pub mod report;
pub mod splitter;
pub mod value;

pub use adapter::{EngineFailure, ErrorPolicy, QueryAdapter};
pub use ast::{Clause, CompareOp, Literal, PathQuery, Token};
pub use classifier::{ClauseError, parse_clause};
pub use diagnostics::{DiagnosticStep, StepStatus};
pub use evaluator::{JsonPathEngine, NodeSet, QueryEngine};
pub use lexer::Lexer;
pub use parser::{Parser, QueryError};
pub use preview::PreviewOptions;
pub use report::{ClauseReport, EvalError, GroupReport, Report, ReportConfig, Reporter};
pub use value::{Kind, Value};
