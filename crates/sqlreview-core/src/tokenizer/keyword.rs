//! Reserved words recognized by the tokenizer

/// Reserved words the structural analysis cares about.
///
/// Matching is case-insensitive. Any other word is an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Create,
    Table,
    Temporary,
    Primary,
    Key,
    AutoIncrement,
    If,
    Not,
    Exists,
    Constraint,
    Unique,
    Index,
    Foreign,
    References,
    Check,
}

impl Keyword {
    pub const ALL: [Keyword; 15] = [
        Keyword::Create,
        Keyword::Table,
        Keyword::Temporary,
        Keyword::Primary,
        Keyword::Key,
        Keyword::AutoIncrement,
        Keyword::If,
        Keyword::Not,
        Keyword::Exists,
        Keyword::Constraint,
        Keyword::Unique,
        Keyword::Index,
        Keyword::Foreign,
        Keyword::References,
        Keyword::Check,
    ];

    /// Look up a bare word
    pub fn lookup(word: &str) -> Option<Keyword> {
        Self::ALL
            .iter()
            .copied()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(word))
    }

    /// Canonical upper-case spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::Temporary => "TEMPORARY",
            Keyword::Primary => "PRIMARY",
            Keyword::Key => "KEY",
            Keyword::AutoIncrement => "AUTO_INCREMENT",
            Keyword::If => "IF",
            Keyword::Not => "NOT",
            Keyword::Exists => "EXISTS",
            Keyword::Constraint => "CONSTRAINT",
            Keyword::Unique => "UNIQUE",
            Keyword::Index => "INDEX",
            Keyword::Foreign => "FOREIGN",
            Keyword::References => "REFERENCES",
            Keyword::Check => "CHECK",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Keyword::lookup("create"), Some(Keyword::Create));
        assert_eq!(Keyword::lookup("Primary"), Some(Keyword::Primary));
        assert_eq!(Keyword::lookup("auto_increment"), Some(Keyword::AutoIncrement));
    }

    #[test]
    fn test_lookup_rejects_substrings() {
        assert_eq!(Keyword::lookup("primary_config"), None);
        assert_eq!(Keyword::lookup("keys"), None);
        assert_eq!(Keyword::lookup("tables"), None);
    }
}
