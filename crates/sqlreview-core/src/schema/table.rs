//! Structural facts extracted from CREATE TABLE statements

use serde::{Deserialize, Serialize};

use crate::error::Span;

/// Qualified name (schema.table or just table)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.{}", schema, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Table declared by a CREATE TABLE statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Name with identifier quoting removed
    pub name: QualifiedName,
    /// Name as spelled in the source, quotes included
    pub raw_name: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<ConstraintDef>,
    pub has_primary_key: bool,
    pub temporary: bool,
    pub if_not_exists: bool,
    /// Location of the table name
    pub position: Span,
}

impl TableDefinition {
    pub fn new(name: QualifiedName, raw_name: impl Into<String>, position: Span) -> Self {
        Self {
            name,
            raw_name: raw_name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            has_primary_key: false,
            temporary: false,
            if_not_exists: false,
            position,
        }
    }

    /// Get all column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns making up the primary key, table-level constraint first
    pub fn primary_key_columns(&self) -> Vec<&str> {
        if let Some(pk) = self
            .constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::PrimaryKey)
        {
            return pk.columns.iter().map(|c| c.as_str()).collect();
        }
        self.columns
            .iter()
            .filter(|c| c.is_primary_key_inline)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// Type word following the column name, as written
    pub data_type: Option<String>,
    pub is_primary_key_inline: bool,
    pub is_auto_increment: bool,
    pub position: Span,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, position: Span) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            is_primary_key_inline: false,
            is_auto_increment: false,
            position,
        }
    }
}

/// Kind of a table-level constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Other,
}

/// Table-level constraint or index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDef {
    pub kind: ConstraintKind,
    /// Name given with `CONSTRAINT <name>`
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_display() {
        assert_eq!(QualifiedName::new("users").to_string(), "users");
        assert_eq!(
            QualifiedName::with_schema("app", "users").to_string(),
            "app.users"
        );
    }

    #[test]
    fn test_primary_key_columns_prefers_constraint() {
        let mut table = TableDefinition::new(QualifiedName::new("t"), "t", Span::default());
        let mut id = ColumnDef::new("id", Span::default());
        id.is_primary_key_inline = true;
        table.columns.push(id);
        assert_eq!(table.primary_key_columns(), vec!["id"]);

        table.constraints.push(ConstraintDef {
            kind: ConstraintKind::PrimaryKey,
            name: None,
            columns: vec!["a".to_string(), "b".to_string()],
        });
        assert_eq!(table.primary_key_columns(), vec!["a", "b"]);
    }
}
