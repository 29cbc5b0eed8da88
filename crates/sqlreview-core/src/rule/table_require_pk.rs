//! Rule: every created table declares a primary key

use crate::advice::{Advice, AdviceKind};
use crate::error::{ReviewError, Severity};
use crate::rule::{ReviewContext, Rule};

pub const TABLE_REQUIRE_PK: &str = "table.require-pk";

/// Reports each CREATE TABLE that declares neither a column-level nor a
/// table-level PRIMARY KEY. AUTO_INCREMENT alone does not count.
#[derive(Debug, Clone)]
pub struct TableRequiresPrimaryKey {
    severity: Severity,
}

impl TableRequiresPrimaryKey {
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    pub fn with_severity(severity: Severity) -> Self {
        Self { severity }
    }
}

impl Default for TableRequiresPrimaryKey {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TableRequiresPrimaryKey {
    fn id(&self) -> &str {
        TABLE_REQUIRE_PK
    }

    fn name(&self) -> &str {
        "Table requires primary key"
    }

    fn description(&self) -> &str {
        "Every table should have a primary key to guarantee row uniqueness and replication consistency"
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &ReviewContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let advice = ctx
            .facts()
            .tables
            .iter()
            .filter(|table| !table.has_primary_key)
            .map(|table| {
                Advice::new(
                    AdviceKind::TableNoPrimaryKey,
                    self.severity,
                    TABLE_REQUIRE_PK,
                    format!("Table `{}` requires PRIMARY KEY", table.name),
                )
                .with_position(table.position)
                .with_help("add a PRIMARY KEY column attribute or table constraint")
            })
            .collect();
        Ok(advice)
    }
}
