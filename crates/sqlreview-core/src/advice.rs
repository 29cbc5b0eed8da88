//! Advice - findings reported by review rules

use serde::{Deserialize, Serialize};

use crate::error::{Severity, Span};

/// Types of advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdviceKind {
    /// 201: Statement could not be tokenized or segmented
    ParseError,
    /// 801: Table has no primary key
    TableNoPrimaryKey,
}

impl AdviceKind {
    pub fn code(&self) -> i32 {
        match self {
            AdviceKind::ParseError => 201,
            AdviceKind::TableNoPrimaryKey => 801,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdviceKind::ParseError => "parse-error",
            AdviceKind::TableNoPrimaryKey => "table-no-primary-key",
        }
    }

    /// Default title used when a rule does not supply one
    pub fn title(&self) -> &'static str {
        match self {
            AdviceKind::ParseError => "Statement syntax error",
            AdviceKind::TableNoPrimaryKey => "Table requires primary key",
        }
    }
}

/// One finding of a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub severity: Severity,
    pub kind: AdviceKind,
    pub code: i32,
    pub title: String,
    pub message: String,
    pub rule_id: String,
    pub position: Option<Span>,
    pub help: Option<String>,
}

impl Advice {
    pub fn new(
        kind: AdviceKind,
        severity: Severity,
        rule_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            code: kind.code(),
            title: kind.title().to_string(),
            message: message.into(),
            rule_id: rule_id.into(),
            position: None,
            help: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_position(mut self, position: Span) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fills_code_and_title() {
        let advice = Advice::new(
            AdviceKind::TableNoPrimaryKey,
            Severity::Error,
            "table.require-pk",
            "Table `t` requires PRIMARY KEY",
        );
        assert_eq!(advice.code, 801);
        assert_eq!(advice.title, "Table requires primary key");
        assert!(advice.position.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let advice = Advice::new(AdviceKind::ParseError, Severity::Warning, "syntax", "bad")
            .with_title("Syntax")
            .with_position(Span::with_location(2, 4))
            .with_help("fix it");
        assert_eq!(advice.title, "Syntax");
        assert_eq!(advice.position.map(|p| p.line), Some(2));
        assert_eq!(advice.help.as_deref(), Some("fix it"));
    }
}
