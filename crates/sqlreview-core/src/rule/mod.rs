//! Review rules
//!
//! A rule inspects a [`ReviewContext`] and returns advice. Rules are
//! registered per dialect in a [`RuleRegistry`] and executed by the
//! [`ReviewEngine`](crate::engine::ReviewEngine).
//!
//! # Implementing a rule
//!
//! ```
//! use sqlreview_core::rule::{ReviewContext, Rule};
//! use sqlreview_core::{Advice, ReviewError, Severity};
//!
//! struct NoEmptyScript;
//!
//! impl Rule for NoEmptyScript {
//!     fn id(&self) -> &str {
//!         "script.not-empty"
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Script must not be empty"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Reports scripts without any statement"
//!     }
//!
//!     fn severity(&self) -> Severity {
//!         Severity::Info
//!     }
//!
//!     fn check(&self, ctx: &ReviewContext<'_>) -> Result<Vec<Advice>, ReviewError> {
//!         Ok(Vec::new())
//!     }
//! }
//! ```

mod registry;
mod table_require_pk;

use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::advice::Advice;
use crate::analyzer::{Analyzer, StatementFacts};
use crate::dialect::SqlDialect;
use crate::error::{ReviewError, Severity};

pub use registry::{builtin_registry, builtin_rules, RuleRegistry};
pub use table_require_pk::{TableRequiresPrimaryKey, TABLE_REQUIRE_PK};

/// A review rule
pub trait Rule: Send + Sync {
    /// Identifier, unique within a dialect
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Severity of the advice this rule produces
    fn severity(&self) -> Severity;

    /// Check the context. An `Err` is reported as a failure of this rule
    /// only; other rules still run.
    fn check(&self, ctx: &ReviewContext<'_>) -> Result<Vec<Advice>, ReviewError>;

    fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            severity: self.severity(),
        }
    }
}

/// Metadata describing a registered rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
}

/// Input of one review call.
///
/// Structural facts are computed on first use and shared by every rule of
/// the call.
#[derive(Debug)]
pub struct ReviewContext<'a> {
    sql: &'a str,
    dialect: SqlDialect,
    requested_rules: Vec<String>,
    facts: OnceLock<StatementFacts>,
}

impl<'a> ReviewContext<'a> {
    pub fn new(sql: &'a str, dialect: SqlDialect) -> Self {
        Self {
            sql,
            dialect,
            requested_rules: Vec::new(),
            facts: OnceLock::new(),
        }
    }

    /// Restrict the review to these rule ids. Empty means all rules.
    pub fn with_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Use facts computed elsewhere instead of analyzing the SQL again
    pub fn with_facts(mut self, facts: StatementFacts) -> Self {
        self.facts = OnceLock::from(facts);
        self
    }

    pub fn sql(&self) -> &'a str {
        self.sql
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn requested_rules(&self) -> &[String] {
        &self.requested_rules
    }

    /// Structural facts of the SQL text
    pub fn facts(&self) -> &StatementFacts {
        self.facts
            .get_or_init(|| Analyzer::with_dialect(self.dialect).analyze(self.sql))
    }

    /// Facts, if some rule already asked for them
    pub(crate) fn computed_facts(&self) -> Option<&StatementFacts> {
        self.facts.get()
    }
}

/// Wraps a rule and reports its advice at a different severity
pub struct SeverityOverride {
    inner: Arc<dyn Rule>,
    severity: Severity,
}

impl SeverityOverride {
    pub fn new(inner: Arc<dyn Rule>, severity: Severity) -> Self {
        Self { inner, severity }
    }
}

impl Rule for SeverityOverride {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &ReviewContext<'_>) -> Result<Vec<Advice>, ReviewError> {
        let mut advice = self.inner.check(ctx)?;
        for item in &mut advice {
            item.severity = self.severity;
        }
        Ok(advice)
    }
}
