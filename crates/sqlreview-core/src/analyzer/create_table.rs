//! CREATE TABLE analysis over a statement's tokens

use crate::dialect::SqlDialect;
use crate::error::Span;
use crate::schema::{ColumnDef, ConstraintDef, ConstraintKind, QualifiedName, TableDefinition};
use crate::statement::StatementSpan;
use crate::tokenizer::{Keyword, Token, TokenKind};

/// Recognizes `CREATE [TEMPORARY] TABLE [IF NOT EXISTS] name ( elements )`
/// and classifies each element.
///
/// Only tokens take part in matching, so keywords inside comments, string
/// literals and quoted identifiers are never seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateTableAnalyzer {
    dialect: SqlDialect,
}

/// One comma-separated entry of the element list
enum Element {
    Column(ColumnDef),
    Constraint(ConstraintDef),
}

impl CreateTableAnalyzer {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    /// Analyze a statement. Returns `None` unless it is a CREATE TABLE
    /// with an element list.
    pub fn analyze(&self, span: &StatementSpan<'_>) -> Option<TableDefinition> {
        let tokens = span.tokens.as_slice();
        let mut pos = 0;

        if !tokens.first()?.is_keyword(Keyword::Create) {
            return None;
        }
        pos += 1;

        let temporary = eat_keyword(tokens, &mut pos, Keyword::Temporary);
        if !eat_keyword(tokens, &mut pos, Keyword::Table) {
            return None;
        }

        let if_not_exists = tokens[pos..].len() >= 3
            && tokens[pos].is_keyword(Keyword::If)
            && tokens[pos + 1].is_keyword(Keyword::Not)
            && tokens[pos + 2].is_keyword(Keyword::Exists);
        if if_not_exists {
            pos += 3;
        }

        let (name, raw_name, position) = parse_table_name(tokens, &mut pos)?;

        // CREATE TABLE ... AS SELECT / LIKE carry no element list
        if !tokens.get(pos)?.is_punct('(') {
            tracing::debug!(table = %name, "CREATE TABLE without element list");
            return None;
        }
        let close = matching_paren(tokens, pos)?;

        let mut table = TableDefinition::new(name, raw_name, position);
        table.temporary = temporary;
        table.if_not_exists = if_not_exists;

        for element in split_top_level(&tokens[pos + 1..close]) {
            match self.classify(element) {
                Some(Element::Column(column)) => {
                    table.has_primary_key |= column.is_primary_key_inline;
                    table.columns.push(column);
                }
                Some(Element::Constraint(constraint)) => {
                    table.has_primary_key |= constraint.kind == ConstraintKind::PrimaryKey;
                    table.constraints.push(constraint);
                }
                None => {}
            }
        }

        tracing::debug!(
            table = %table.name,
            columns = table.columns.len(),
            constraints = table.constraints.len(),
            has_primary_key = table.has_primary_key,
            "analyzed CREATE TABLE"
        );
        Some(table)
    }

    fn classify(&self, element: &[Token<'_>]) -> Option<Element> {
        let first = element.first()?;

        let mut rest = element;
        let mut constraint_name = None;
        if first.is_keyword(Keyword::Constraint) {
            rest = &rest[1..];
            if let Some(name) = rest.first() {
                if name.is_name() && !starts_constraint_body(name) {
                    constraint_name = Some(name.unquoted().into_owned());
                    rest = &rest[1..];
                }
            }
        }

        let kind = match rest.first().map(|t| t.kind) {
            Some(TokenKind::Keyword(Keyword::Primary)) => Some(ConstraintKind::PrimaryKey),
            Some(TokenKind::Keyword(Keyword::Unique)) => Some(ConstraintKind::Unique),
            Some(TokenKind::Keyword(Keyword::Foreign)) => Some(ConstraintKind::ForeignKey),
            Some(TokenKind::Keyword(Keyword::Check)) => Some(ConstraintKind::Other),
            Some(TokenKind::Keyword(Keyword::Index | Keyword::Key))
                if self.dialect == SqlDialect::MySQL =>
            {
                Some(ConstraintKind::Other)
            }
            Some(TokenKind::Identifier)
                if self.dialect == SqlDialect::MySQL && is_mysql_special_index(rest) =>
            {
                Some(ConstraintKind::Other)
            }
            _ if first.is_keyword(Keyword::Constraint) => Some(ConstraintKind::Other),
            _ => None,
        };

        if let Some(kind) = kind {
            return Some(Element::Constraint(ConstraintDef {
                kind,
                name: constraint_name,
                columns: column_list(rest),
            }));
        }

        self.column(element).map(Element::Column)
    }

    fn column(&self, element: &[Token<'_>]) -> Option<ColumnDef> {
        let name = element.first().filter(|t| t.is_name())?;
        let mut column = ColumnDef::new(name.unquoted(), name.span);

        column.data_type = element
            .get(1)
            .filter(|t| matches!(t.kind, TokenKind::Identifier))
            .map(|t| t.text.to_string());

        let attributes = &element[1..];
        column.is_primary_key_inline = attributes
            .windows(2)
            .any(|w| w[0].is_keyword(Keyword::Primary) && w[1].is_keyword(Keyword::Key));
        if !column.is_primary_key_inline && self.dialect == SqlDialect::MySQL {
            // MySQL accepts a bare KEY column attribute as PRIMARY KEY
            column.is_primary_key_inline = attributes.iter().enumerate().any(|(i, t)| {
                t.is_keyword(Keyword::Key)
                    && (i == 0 || !attributes[i - 1].is_keyword(Keyword::Unique))
            });
        }
        column.is_auto_increment = attributes
            .iter()
            .any(|t| t.is_keyword(Keyword::AutoIncrement));

        Some(column)
    }
}

fn eat_keyword(tokens: &[Token<'_>], pos: &mut usize, keyword: Keyword) -> bool {
    if tokens.get(*pos).is_some_and(|t| t.is_keyword(keyword)) {
        *pos += 1;
        true
    } else {
        false
    }
}

/// Parse `name` or `schema.name`
fn parse_table_name(
    tokens: &[Token<'_>],
    pos: &mut usize,
) -> Option<(QualifiedName, String, Span)> {
    let first = tokens.get(*pos).filter(|t| t.is_name())?;
    *pos += 1;

    let second = match (tokens.get(*pos), tokens.get(*pos + 1)) {
        (Some(dot), Some(name)) if dot.is_punct('.') && name.is_name() => Some(name),
        _ => None,
    };

    match second {
        Some(second) => {
            *pos += 2;
            let name = QualifiedName::with_schema(first.unquoted(), second.unquoted());
            let raw = format!("{}.{}", first.text, second.text);
            Some((name, raw, first.span))
        }
        None => Some((
            QualifiedName::new(first.unquoted()),
            first.text.to_string(),
            first.span,
        )),
    }
}

/// Index of the `)` closing the `(` at `open`
fn matching_paren(tokens: &[Token<'_>], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::Punctuation('(') => depth += 1,
            TokenKind::Punctuation(')') => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside parentheses
fn split_top_level<'t, 'a>(tokens: &'t [Token<'a>]) -> Vec<&'t [Token<'a>]> {
    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Punctuation('(') => depth += 1,
            TokenKind::Punctuation(')') => depth = depth.saturating_sub(1),
            TokenKind::Punctuation(',') if depth == 0 => {
                if i > start {
                    elements.push(&tokens[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        elements.push(&tokens[start..]);
    }

    elements
}

fn starts_constraint_body(token: &Token<'_>) -> bool {
    matches!(
        token.kind,
        TokenKind::Keyword(
            Keyword::Primary | Keyword::Unique | Keyword::Foreign | Keyword::Check
        )
    )
}

/// `FULLTEXT [INDEX|KEY]` and `SPATIAL [INDEX|KEY]` index definitions
fn is_mysql_special_index(element: &[Token<'_>]) -> bool {
    let Some(first) = element.first() else {
        return false;
    };
    let special = first.text.eq_ignore_ascii_case("FULLTEXT")
        || first.text.eq_ignore_ascii_case("SPATIAL");
    special
        && element.get(1).is_some_and(|t| {
            t.is_keyword(Keyword::Index) || t.is_keyword(Keyword::Key) || t.is_punct('(')
        })
}

/// Names listed in the first parenthesized group of a constraint
fn column_list(element: &[Token<'_>]) -> Vec<String> {
    let Some(open) = element.iter().position(|t| t.is_punct('(')) else {
        return Vec::new();
    };

    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut expecting_name = true;
    for token in &element[open + 1..] {
        match token.kind {
            TokenKind::Punctuation('(') => depth += 1,
            TokenKind::Punctuation(')') if depth == 0 => break,
            TokenKind::Punctuation(')') => depth -= 1,
            TokenKind::Punctuation(',') if depth == 0 => expecting_name = true,
            _ if depth == 0 && expecting_name && token.is_name() => {
                columns.push(token.unquoted().into_owned());
                expecting_name = false;
            }
            _ => {}
        }
    }
    columns
}
