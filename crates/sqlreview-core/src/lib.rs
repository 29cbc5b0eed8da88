//! sqlreview-core: SQL review library
//!
//! This library tokenizes SQL text, splits it into statements, extracts
//! structural facts such as primary keys from CREATE TABLE statements, and
//! runs pluggable review rules over them.

pub mod advice;
pub mod analyzer;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod rule;
pub mod schema;
pub mod statement;
pub mod tokenizer;

pub use advice::{Advice, AdviceKind};
pub use analyzer::{Analyzer, CreateTableAnalyzer, StatementFacts};
pub use dialect::SqlDialect;
pub use engine::{ReviewEngine, ReviewOutcome};
pub use error::{ReviewError, Severity, Span};
pub use rule::{builtin_registry, ReviewContext, Rule, RuleInfo, RuleRegistry};
pub use schema::{ColumnDef, ConstraintDef, ConstraintKind, QualifiedName, TableDefinition};
pub use statement::{segment, split_statements, StatementSpan};
pub use tokenizer::{tokenize, Keyword, Token, TokenKind};
