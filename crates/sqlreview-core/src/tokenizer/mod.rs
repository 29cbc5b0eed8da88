//! SQL tokenizer - splits source text into classified lexical units
//!
//! Classification is purely lexical. Words inside comments, string literals
//! and quoted identifiers never become keywords, which is what lets the
//! structural analysis ignore text that merely looks like SQL.

mod keyword;

use std::borrow::Cow;
use std::iter::FusedIterator;

use crate::dialect::{QuoteStyle, SqlDialect};
use crate::error::{ReviewError, Span};

pub use keyword::Keyword;

/// Kind of a lexical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    QuotedIdentifier,
    StringLiteral,
    NumberLiteral,
    LineComment,
    BlockComment,
    Punctuation(char),
    Whitespace,
    EndOfInput,
}

/// A lexical unit borrowing its text from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punctuation(ch)
    }

    /// Whitespace and comments, which carry no structure
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Whether this token can name a table or column
    pub fn is_name(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::QuotedIdentifier | TokenKind::Keyword(_)
        )
    }

    /// Token text with identifier quoting removed
    ///
    /// Doubled closing quotes inside a quoted identifier collapse to one.
    pub fn unquoted(&self) -> Cow<'a, str> {
        if self.kind != TokenKind::QuotedIdentifier || self.text.len() < 2 {
            return Cow::Borrowed(self.text);
        }
        let quote = &self.text[..1];
        let inner = &self.text[1..self.text.len() - 1];
        let doubled = quote.repeat(2);
        if inner.contains(&doubled) {
            Cow::Owned(inner.replace(&doubled, quote))
        } else {
            Cow::Borrowed(inner)
        }
    }
}

/// Tokenize `sql` for the given dialect
pub fn tokenize(sql: &str, dialect: SqlDialect) -> Tokenizer<'_> {
    Tokenizer::new(sql, dialect)
}

/// Lazy tokenizer over a borrowed source string.
///
/// Yields every token including whitespace and comments, then a single
/// `EndOfInput` token. A lexical error ends the stream.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    dialect: SqlDialect,
    pos: usize,
    line: usize,
    column: usize,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, dialect: SqlDialect) -> Self {
        Self {
            source,
            dialect,
            pos: 0,
            line: 1,
            column: 1,
            done: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    fn scan(&mut self, ch: char, line: usize, column: usize) -> Result<TokenKind, ReviewError> {
        match ch {
            c if c.is_whitespace() => {
                self.bump_while(char::is_whitespace);
                Ok(TokenKind::Whitespace)
            }
            '-' if self.peek_second() == Some('-') => Ok(self.line_comment()),
            '#' if self.dialect.hash_comments() => Ok(self.line_comment()),
            '/' if self.peek_second() == Some('*') => self.block_comment(line, column),
            '\'' => self.quoted('\'', TokenKind::StringLiteral, true, line, column),
            '"' => {
                let kind = match self.dialect.double_quote() {
                    QuoteStyle::String => TokenKind::StringLiteral,
                    QuoteStyle::Identifier => TokenKind::QuotedIdentifier,
                };
                self.quoted('"', kind, true, line, column)
            }
            '`' => self.quoted('`', TokenKind::QuotedIdentifier, false, line, column),
            '$' if self.dialect.dollar_quoted_strings() => match self.dollar_tag() {
                Some(tag) => self.dollar_quoted(tag, line, column),
                None => {
                    self.bump();
                    Ok(TokenKind::Punctuation('$'))
                }
            },
            c if c.is_alphabetic() || c == '_' => {
                let start = self.pos;
                self.bump_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
                let word = &self.source[start..self.pos];
                Ok(Keyword::lookup(word).map_or(TokenKind::Identifier, TokenKind::Keyword))
            }
            c if c.is_ascii_digit() => {
                self.number();
                Ok(TokenKind::NumberLiteral)
            }
            c => {
                self.bump();
                Ok(TokenKind::Punctuation(c))
            }
        }
    }

    fn line_comment(&mut self) -> TokenKind {
        self.bump_while(|c| c != '\n');
        TokenKind::LineComment
    }

    fn block_comment(&mut self, line: usize, column: usize) -> Result<TokenKind, ReviewError> {
        self.bump();
        self.bump();
        let nested = self.dialect.nested_block_comments();
        let mut depth = 1usize;
        loop {
            match self.bump() {
                None => return Err(ReviewError::UnterminatedComment { line, column }),
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return Ok(TokenKind::BlockComment);
                    }
                }
                Some('/') if nested && self.peek() == Some('*') => {
                    self.bump();
                    depth += 1;
                }
                Some(_) => {}
            }
        }
    }

    fn quoted(
        &mut self,
        quote: char,
        kind: TokenKind,
        backslash_escapes: bool,
        line: usize,
        column: usize,
    ) -> Result<TokenKind, ReviewError> {
        self.bump();
        loop {
            match self.bump() {
                None => return Err(ReviewError::UnterminatedLiteral { line, column }),
                Some('\\') if backslash_escapes => {
                    if self.bump().is_none() {
                        return Err(ReviewError::UnterminatedLiteral { line, column });
                    }
                }
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.bump();
                    } else {
                        return Ok(kind);
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Length in bytes of a `$tag$` opener at the current position
    fn dollar_tag(&self) -> Option<usize> {
        let rest = &self.source[self.pos..];
        let mut chars = rest.char_indices().skip(1);
        match chars.next() {
            Some((i, '$')) => return Some(i + 1),
            Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }
        for (i, c) in chars {
            if c == '$' {
                return Some(i + 1);
            }
            if !(c.is_ascii_alphanumeric() || c == '_') {
                return None;
            }
        }
        None
    }

    fn dollar_quoted(
        &mut self,
        tag_len: usize,
        line: usize,
        column: usize,
    ) -> Result<TokenKind, ReviewError> {
        let tag = &self.source[self.pos..self.pos + tag_len];
        let body_start = self.pos + tag_len;
        let close = self.source[body_start..]
            .find(tag)
            .ok_or(ReviewError::UnterminatedLiteral { line, column })?;
        let end = body_start + close + tag_len;
        while self.pos < end {
            self.bump();
        }
        Ok(TokenKind::StringLiteral)
    }

    fn number(&mut self) {
        self.bump_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let rest = &self.source[self.pos + 1..];
            let digits = rest.strip_prefix(|c| c == '+' || c == '-').unwrap_or(rest);
            if digits.starts_with(|c: char| c.is_ascii_digit()) {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                self.bump_while(|c| c.is_ascii_digit());
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, ReviewError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let start = self.pos;
        let (line, column) = (self.line, self.column);

        let Some(ch) = self.peek() else {
            self.done = true;
            return Some(Ok(Token {
                kind: TokenKind::EndOfInput,
                text: "",
                span: Span::new(start, 0, line, column),
            }));
        };

        match self.scan(ch, line, column) {
            Ok(kind) => Some(Ok(Token {
                kind,
                text: &self.source[start..self.pos],
                span: Span::new(start, self.pos - start, line, column),
            })),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Tokenizer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str, dialect: SqlDialect) -> Vec<TokenKind> {
        tokenize(sql, dialect)
            .map(|t| t.unwrap())
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let kinds = kinds("create TABLE primary_config", SqlDialect::MySQL);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_line_comment_excludes_newline() {
        let tokens: Vec<_> = tokenize("a -- PRIMARY KEY\nb", SqlDialect::PostgreSQL)
            .map(|t| t.unwrap())
            .collect();
        let comment = tokens
            .iter()
            .find(|t| t.kind == TokenKind::LineComment)
            .unwrap();
        assert_eq!(comment.text, "-- PRIMARY KEY");
        assert!(!tokens.iter().any(|t| t.is_keyword(Keyword::Primary)));
    }

    #[test]
    fn test_hash_comment_depends_on_dialect() {
        assert_eq!(
            kinds("# note", SqlDialect::MySQL),
            vec![TokenKind::LineComment, TokenKind::EndOfInput]
        );
        assert_eq!(
            kinds("# note", SqlDialect::PostgreSQL)[0],
            TokenKind::Punctuation('#')
        );
    }

    #[test]
    fn test_block_comment() {
        let kinds = kinds("/* CREATE TABLE x */ y", SqlDialect::MySQL);
        assert_eq!(
            kinds,
            vec![
                TokenKind::BlockComment,
                TokenKind::Identifier,
                TokenKind::EndOfInput
            ]
        );
    }

    #[test]
    fn test_block_comments_nest_in_postgres() {
        let sql = "/* a /* b */ PRIMARY KEY */ x";
        assert_eq!(
            kinds(sql, SqlDialect::PostgreSQL),
            vec![
                TokenKind::BlockComment,
                TokenKind::Identifier,
                TokenKind::EndOfInput
            ]
        );
        // MySQL closes the comment at the first `*/`
        assert!(kinds(sql, SqlDialect::MySQL).contains(&TokenKind::Keyword(Keyword::Primary)));

        let result: Result<Vec<_>, _> =
            tokenize("/* a /* b */ still open", SqlDialect::PostgreSQL).collect();
        assert_eq!(
            result.unwrap_err(),
            ReviewError::UnterminatedComment { line: 1, column: 1 }
        );
    }

    #[test]
    fn test_non_ascii_identifiers() {
        let tokens: Vec<_> = tokenize("CREATE TABLE café (编号 INT, a$b INT)", SqlDialect::MySQL)
            .map(|t| t.unwrap())
            .filter(|t| t.kind == TokenKind::Identifier)
            .collect();
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["café", "编号", "INT", "a$b", "INT"]);
        // Columns count characters, offsets count bytes
        assert_eq!(tokens[1].span.column, 20);
        assert_eq!(tokens[1].span.length, "编号".len());
    }

    #[test]
    fn test_unterminated_block_comment() {
        let result: Result<Vec<_>, _> = tokenize("a\n  /* open", SqlDialect::MySQL).collect();
        assert_eq!(
            result.unwrap_err(),
            ReviewError::UnterminatedComment { line: 2, column: 3 }
        );
    }

    #[test]
    fn test_string_literal_hides_keywords() {
        let tokens: Vec<_> = tokenize("'Add PRIMARY KEY'", SqlDialect::MySQL)
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "'Add PRIMARY KEY'");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_string_escapes() {
        let tokens: Vec<_> = tokenize(r"'it''s' 'a\'b' x", SqlDialect::MySQL)
            .map(|t| t.unwrap())
            .filter(|t| t.kind != TokenKind::Whitespace)
            .collect();
        assert_eq!(tokens[0].text, "'it''s'");
        assert_eq!(tokens[1].text, r"'a\'b'");
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_unterminated_string() {
        let result: Result<Vec<_>, _> = tokenize("SELECT 'abc", SqlDialect::MySQL).collect();
        assert_eq!(
            result.unwrap_err(),
            ReviewError::UnterminatedLiteral { line: 1, column: 8 }
        );
    }

    #[test]
    fn test_double_quote_per_dialect() {
        assert_eq!(
            kinds("\"id\"", SqlDialect::PostgreSQL)[0],
            TokenKind::QuotedIdentifier
        );
        assert_eq!(kinds("\"id\"", SqlDialect::MySQL)[0], TokenKind::StringLiteral);
    }

    #[test]
    fn test_backtick_identifier() {
        let tokens: Vec<_> = tokenize("`primary`", SqlDialect::MySQL)
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::QuotedIdentifier);
        assert_eq!(tokens[0].unquoted(), "primary");
    }

    #[test]
    fn test_unquoted_collapses_doubled_quotes() {
        let tokens: Vec<_> = tokenize("\"a\"\"b\"", SqlDialect::PostgreSQL)
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(tokens[0].unquoted(), "a\"b");
    }

    #[test]
    fn test_dollar_quoted_string() {
        let tokens: Vec<_> = tokenize("$body$ a; PRIMARY KEY $body$ x", SqlDialect::PostgreSQL)
            .map(|t| t.unwrap())
            .filter(|t| t.kind != TokenKind::Whitespace)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "$body$ a; PRIMARY KEY $body$");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_unterminated_dollar_quote() {
        let result: Result<Vec<_>, _> = tokenize("$$ open", SqlDialect::PostgreSQL).collect();
        assert!(matches!(
            result,
            Err(ReviewError::UnterminatedLiteral { line: 1, column: 1 })
        ));
    }

    #[test]
    fn test_numbers() {
        let tokens: Vec<_> = tokenize("10 2.5 1e10 3.", SqlDialect::MySQL)
            .map(|t| t.unwrap())
            .filter(|t| t.kind != TokenKind::Whitespace)
            .collect();
        assert_eq!(tokens[0].text, "10");
        assert_eq!(tokens[1].text, "2.5");
        assert_eq!(tokens[2].text, "1e10");
        assert_eq!(tokens[3].text, "3");
        assert_eq!(tokens[4].kind, TokenKind::Punctuation('.'));
    }

    #[test]
    fn test_positions() {
        let tokens: Vec<_> = tokenize("CREATE TABLE\n  users", SqlDialect::MySQL)
            .map(|t| t.unwrap())
            .filter(|t| t.kind == TokenKind::Identifier)
            .collect();
        let span = tokens[0].span;
        assert_eq!((span.line, span.column), (2, 3));
        assert_eq!(span.offset, 15);
        assert_eq!(span.end_offset(), 20);
    }

    #[test]
    fn test_end_of_input_is_last_and_fused() {
        let mut tokenizer = tokenize("", SqlDialect::MySQL);
        assert_eq!(tokenizer.next().unwrap().unwrap().kind, TokenKind::EndOfInput);
        assert!(tokenizer.next().is_none());
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_restartable() {
        let sql = "CREATE TABLE t (id INT); -- done";
        let first: Vec<_> = tokenize(sql, SqlDialect::MySQL).collect();
        let second: Vec<_> = tokenize(sql, SqlDialect::MySQL).collect();
        assert_eq!(first, second);
    }
}
