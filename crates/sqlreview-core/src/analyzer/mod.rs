//! Structural analysis - runs the tokenize, segment, analyze pipeline

mod create_table;

use crate::dialect::SqlDialect;
use crate::error::ReviewError;
use crate::schema::TableDefinition;
use crate::statement::split_statements;

pub use create_table::CreateTableAnalyzer;

/// Facts extracted from one SQL text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementFacts {
    /// Number of well-formed statements
    pub statement_count: usize,
    /// CREATE TABLE statements, in source order
    pub tables: Vec<TableDefinition>,
    /// Lexical and nesting errors; the affected statements are skipped
    pub syntax_errors: Vec<ReviewError>,
}

/// SQL Analyzer - extracts structural facts from SQL text
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    dialect: SqlDialect,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Analyze SQL text. Malformed statements are recorded and skipped.
    pub fn analyze(&self, sql: &str) -> StatementFacts {
        let create_table = CreateTableAnalyzer::new(self.dialect);
        let mut facts = StatementFacts::default();

        for statement in split_statements(sql, self.dialect) {
            match statement {
                Ok(span) => {
                    facts.statement_count += 1;
                    if let Some(table) = create_table.analyze(&span) {
                        facts.tables.push(table);
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed statement");
                    facts.syntax_errors.push(e);
                }
            }
        }

        facts
    }
}
