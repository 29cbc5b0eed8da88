//! Error types and source locations

use miette::SourceSpan;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset from start of source
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, counted in characters)
    pub column: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            length,
            line,
            column,
        }
    }

    /// Create a span that only carries line and column information
    pub fn with_location(line: usize, column: usize) -> Self {
        Self {
            offset: 0,
            length: 0,
            line,
            column,
        }
    }

    /// Byte offset one past the last byte covered by this span
    pub fn end_offset(&self) -> usize {
        self.offset + self.length
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.offset.into(), span.length)
    }
}

/// Severity level of a rule and of the advice it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!(
                "Unknown severity level: '{}'. Expected error, warning or info.",
                s
            )),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Errors surfaced by the review core
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum ReviewError {
    /// A rule with the same id is already registered for the dialect
    #[error("rule '{rule_id}' is already registered for {dialect}")]
    #[diagnostic(code(sqlreview::duplicate_rule))]
    DuplicateRule { dialect: String, rule_id: String },

    #[error("unterminated block comment starting at line {line}, column {column}")]
    #[diagnostic(code(sqlreview::unterminated_comment))]
    UnterminatedComment { line: usize, column: usize },

    #[error("unterminated quoted literal starting at line {line}, column {column}")]
    #[diagnostic(code(sqlreview::unterminated_literal))]
    UnterminatedLiteral { line: usize, column: usize },

    #[error("unbalanced parentheses at line {line}, column {column}")]
    #[diagnostic(code(sqlreview::unbalanced_parens))]
    UnbalancedParens { line: usize, column: usize },

    #[error("rule '{rule_id}' failed: {cause}")]
    #[diagnostic(code(sqlreview::rule_execution_failed))]
    RuleExecutionFailed {
        rule_id: String,
        #[source]
        cause: Box<ReviewError>,
    },

    #[error("unknown dialect: '{0}'")]
    #[diagnostic(
        code(sqlreview::unknown_dialect),
        help("supported dialects: postgresql, mysql")
    )]
    UnknownDialect(String),

    #[error("unknown rule '{rule_id}' for {dialect}")]
    #[diagnostic(code(sqlreview::unknown_rule))]
    UnknownRule { dialect: String, rule_id: String },

    /// A rule hit a state it cannot handle
    #[error("internal error: {0}")]
    #[diagnostic(code(sqlreview::internal))]
    Internal(String),
}

impl ReviewError {
    /// Source position of a syntax error
    pub fn position(&self) -> Option<Span> {
        match self {
            ReviewError::UnterminatedComment { line, column }
            | ReviewError::UnterminatedLiteral { line, column }
            | ReviewError::UnbalancedParens { line, column } => {
                Some(Span::with_location(*line, *column))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("info".parse::<Severity>().unwrap(), Severity::Info);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_syntax_error_position() {
        let err = ReviewError::UnbalancedParens { line: 3, column: 7 };
        let pos = err.position().unwrap();
        assert_eq!((pos.line, pos.column), (3, 7));

        let err = ReviewError::UnknownDialect("oracle".to_string());
        assert!(err.position().is_none());
    }

    #[test]
    fn test_rule_failure_message_includes_cause() {
        let err = ReviewError::RuleExecutionFailed {
            rule_id: "table.require-pk".to_string(),
            cause: Box::new(ReviewError::Internal("boom".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "rule 'table.require-pk' failed: internal error: boom"
        );
    }
}
