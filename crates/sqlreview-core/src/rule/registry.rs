//! Rule registry - rules keyed by dialect and rule id

use std::sync::Arc;

use indexmap::IndexMap;

use crate::dialect::SqlDialect;
use crate::error::ReviewError;
use crate::rule::{Rule, TableRequiresPrimaryKey};

/// Rules keyed by dialect, then by rule id.
///
/// Iteration follows registration order.
#[derive(Default)]
pub struct RuleRegistry {
    rules: IndexMap<SqlDialect, IndexMap<String, Arc<dyn Rule>>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for a dialect. Fails if the id is already taken.
    pub fn register(
        &mut self,
        dialect: SqlDialect,
        rule: impl Rule + 'static,
    ) -> Result<(), ReviewError> {
        self.register_shared(dialect, Arc::new(rule))
    }

    /// Register a rule instance that may be shared between dialects
    pub fn register_shared(
        &mut self,
        dialect: SqlDialect,
        rule: Arc<dyn Rule>,
    ) -> Result<(), ReviewError> {
        let rules = self.rules.entry(dialect).or_default();
        if rules.contains_key(rule.id()) {
            return Err(ReviewError::DuplicateRule {
                dialect: dialect.to_string(),
                rule_id: rule.id().to_string(),
            });
        }
        tracing::debug!(%dialect, rule = rule.id(), "registered rule");
        rules.insert(rule.id().to_string(), rule);
        Ok(())
    }

    pub fn get(&self, dialect: SqlDialect, rule_id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(&dialect).and_then(|rules| rules.get(rule_id))
    }

    /// Rules of a dialect in registration order
    pub fn list_rules(&self, dialect: SqlDialect) -> Vec<&Arc<dyn Rule>> {
        self.rules
            .get(&dialect)
            .map(|rules| rules.values().collect())
            .unwrap_or_default()
    }

    pub fn has_dialect(&self, dialect: SqlDialect) -> bool {
        self.rules.get(&dialect).is_some_and(|rules| !rules.is_empty())
    }

    /// Total number of (dialect, rule) registrations
    pub fn len(&self) -> usize {
        self.rules.values().map(|rules| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (dialect, rules) in &self.rules {
            map.entry(dialect, &rules.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

/// Built-in rules with their default severities
pub fn builtin_rules() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(TableRequiresPrimaryKey::new())]
}

/// Registry with every built-in rule registered for every dialect
pub fn builtin_registry() -> Result<RuleRegistry, ReviewError> {
    let mut registry = RuleRegistry::new();
    for rule in builtin_rules() {
        for dialect in SqlDialect::ALL {
            registry.register_shared(dialect, Arc::clone(&rule))?;
        }
    }
    Ok(registry)
}
