//! Review engine - runs registered rules against a review context

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::advice::{Advice, AdviceKind};
use crate::dialect::SqlDialect;
use crate::error::{ReviewError, Severity};
use crate::rule::{ReviewContext, Rule, RuleInfo, RuleRegistry};

/// Rule id attached to advice about malformed statements
pub const SYNTAX_RULE_ID: &str = "syntax";

/// Result of one review call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewOutcome {
    /// Advice of all successful rules, in rule execution order, followed by
    /// syntax errors
    pub advice: Vec<Advice>,
    /// `RuleExecutionFailed` for each rule that returned an error
    pub failures: Vec<ReviewError>,
    /// Unknown dialects and rule ids that were skipped
    pub skipped: Vec<ReviewError>,
}

impl ReviewOutcome {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Whether any advice is an error or any rule failed
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0 || !self.failures.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.advice.is_empty() && self.failures.is_empty() && self.skipped.is_empty()
    }

    fn count(&self, severity: Severity) -> usize {
        self.advice.iter().filter(|a| a.severity == severity).count()
    }
}

/// Executes rules from a registry.
///
/// Checks take a read lock on the registry, so any number of reviews can run
/// concurrently while registration waits for them to finish.
#[derive(Debug, Default)]
pub struct ReviewEngine {
    registry: RwLock<RuleRegistry>,
}

impl ReviewEngine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Register a rule after construction
    pub fn register(
        &self,
        dialect: SqlDialect,
        rule: impl Rule + 'static,
    ) -> Result<(), ReviewError> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(dialect, rule)
    }

    /// Rules registered for a dialect, in execution order
    pub fn list_rules(&self, dialect: SqlDialect) -> Vec<RuleInfo> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .list_rules(dialect)
            .into_iter()
            .map(|rule| rule.info())
            .collect()
    }

    /// Review the context with the requested rules, or all rules of its
    /// dialect when none are requested.
    ///
    /// A failing rule does not stop the others; its error is collected in
    /// [`ReviewOutcome::failures`].
    pub fn check(&self, ctx: &ReviewContext<'_>) -> ReviewOutcome {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let dialect = ctx.dialect();
        let mut outcome = ReviewOutcome::default();

        if !registry.has_dialect(dialect) {
            tracing::warn!(%dialect, "no rules registered for dialect");
            outcome
                .skipped
                .push(ReviewError::UnknownDialect(dialect.to_string()));
            return outcome;
        }

        let rules = if ctx.requested_rules().is_empty() {
            registry.list_rules(dialect)
        } else {
            let mut seen = HashSet::new();
            let mut rules = Vec::new();
            for rule_id in ctx.requested_rules() {
                if !seen.insert(rule_id.as_str()) {
                    continue;
                }
                match registry.get(dialect, rule_id) {
                    Some(rule) => rules.push(rule),
                    None => {
                        tracing::warn!(%dialect, rule = %rule_id, "skipping unknown rule");
                        outcome.skipped.push(ReviewError::UnknownRule {
                            dialect: dialect.to_string(),
                            rule_id: rule_id.clone(),
                        });
                    }
                }
            }
            rules
        };

        for rule in rules {
            tracing::debug!(rule = rule.id(), "running rule");
            match rule.check(ctx) {
                Ok(advice) => outcome.advice.extend(advice),
                Err(cause) => {
                    tracing::warn!(rule = rule.id(), error = %cause, "rule failed");
                    outcome.failures.push(ReviewError::RuleExecutionFailed {
                        rule_id: rule.id().to_string(),
                        cause: Box::new(cause),
                    });
                }
            }
        }

        if let Some(facts) = ctx.computed_facts() {
            outcome
                .advice
                .extend(facts.syntax_errors.iter().map(syntax_advice));
        }

        outcome
    }
}

fn syntax_advice(error: &ReviewError) -> Advice {
    let advice = Advice::new(
        AdviceKind::ParseError,
        Severity::Error,
        SYNTAX_RULE_ID,
        error.to_string(),
    )
    .with_help("the statement was skipped by every rule");
    match error.position() {
        Some(position) => advice.with_position(position),
        None => advice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{TableRequiresPrimaryKey, TABLE_REQUIRE_PK};

    struct Failing;

    impl Rule for Failing {
        fn id(&self) -> &str {
            "always.fails"
        }

        fn name(&self) -> &str {
            "Always fails"
        }

        fn description(&self) -> &str {
            "Test rule"
        }

        fn severity(&self) -> Severity {
            Severity::Warning
        }

        fn check(&self, _ctx: &ReviewContext<'_>) -> Result<Vec<Advice>, ReviewError> {
            Err(ReviewError::Internal("unexpected token".to_string()))
        }
    }

    fn engine() -> ReviewEngine {
        let mut registry = RuleRegistry::new();
        registry
            .register(SqlDialect::MySQL, TableRequiresPrimaryKey::new())
            .unwrap();
        ReviewEngine::new(registry)
    }

    #[test]
    fn test_check_all_rules() {
        let ctx = ReviewContext::new("CREATE TABLE t (id INT)", SqlDialect::MySQL);
        let outcome = engine().check(&ctx);
        assert_eq!(outcome.advice.len(), 1);
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.has_errors());
    }

    #[test]
    fn test_unknown_dialect_is_skipped() {
        let ctx = ReviewContext::new("CREATE TABLE t (id INT)", SqlDialect::PostgreSQL);
        let outcome = engine().check(&ctx);
        assert!(outcome.advice.is_empty());
        assert_eq!(
            outcome.skipped,
            vec![ReviewError::UnknownDialect("postgresql".to_string())]
        );
    }

    #[test]
    fn test_unknown_rule_is_skipped() {
        let ctx = ReviewContext::new("CREATE TABLE t (id INT)", SqlDialect::MySQL)
            .with_rules(["naming.table", TABLE_REQUIRE_PK, TABLE_REQUIRE_PK]);
        let outcome = engine().check(&ctx);
        assert_eq!(outcome.advice.len(), 1);
        assert_eq!(
            outcome.skipped,
            vec![ReviewError::UnknownRule {
                dialect: "mysql".to_string(),
                rule_id: "naming.table".to_string(),
            }]
        );
    }

    #[test]
    fn test_failing_rule_is_isolated() {
        let engine = engine();
        engine.register(SqlDialect::MySQL, Failing).unwrap();
        let ctx = ReviewContext::new("CREATE TABLE t (id INT)", SqlDialect::MySQL);
        let outcome = engine.check(&ctx);
        assert_eq!(outcome.advice.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            &outcome.failures[0],
            ReviewError::RuleExecutionFailed { rule_id, .. } if rule_id == "always.fails"
        ));
    }

    #[test]
    fn test_syntax_errors_reported_once() {
        let ctx = ReviewContext::new(
            "CREATE TABLE a (id INT));\nCREATE TABLE b (id INT PRIMARY KEY);",
            SqlDialect::MySQL,
        );
        let outcome = engine().check(&ctx);
        assert_eq!(outcome.advice.len(), 1);
        let advice = &outcome.advice[0];
        assert_eq!(advice.kind, AdviceKind::ParseError);
        assert_eq!(advice.rule_id, SYNTAX_RULE_ID);
        assert_eq!(advice.position.map(|p| (p.line, p.column)), Some((1, 24)));
    }

    #[test]
    fn test_list_rules_in_registration_order() {
        let engine = engine();
        engine.register(SqlDialect::MySQL, Failing).unwrap();
        let ids: Vec<_> = engine
            .list_rules(SqlDialect::MySQL)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![TABLE_REQUIRE_PK, "always.fails"]);
    }
}
