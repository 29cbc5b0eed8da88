//! SQL dialect support

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ReviewError;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    PostgreSQL,
    MySQL,
}

/// How a quote character is interpreted by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Opens a string literal
    String,
    /// Opens a quoted identifier
    Identifier,
}

impl SqlDialect {
    /// All dialects, in a stable order
    pub const ALL: [SqlDialect; 2] = [SqlDialect::PostgreSQL, SqlDialect::MySQL];

    /// Meaning of `"` in this dialect
    pub fn double_quote(&self) -> QuoteStyle {
        match self {
            SqlDialect::PostgreSQL => QuoteStyle::Identifier,
            // MySQL treats "..." as a string unless ANSI_QUOTES is enabled
            SqlDialect::MySQL => QuoteStyle::String,
        }
    }

    /// Whether `#` starts a line comment
    pub fn hash_comments(&self) -> bool {
        matches!(self, SqlDialect::MySQL)
    }

    /// Whether `$tag$ ... $tag$` bodies are string literals
    pub fn dollar_quoted_strings(&self) -> bool {
        matches!(self, SqlDialect::PostgreSQL)
    }

    /// Whether `/* ... */` comments nest
    pub fn nested_block_comments(&self) -> bool {
        matches!(self, SqlDialect::PostgreSQL)
    }
}

impl FromStr for SqlDialect {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSQL),
            "mysql" | "mysql8" => Ok(SqlDialect::MySQL),
            _ => Err(ReviewError::UnknownDialect(s.to_string())),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::PostgreSQL => write!(f, "postgresql"),
            SqlDialect::MySQL => write!(f, "mysql"),
        }
    }
}
