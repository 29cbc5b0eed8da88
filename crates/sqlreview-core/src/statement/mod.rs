//! Statement segmentation - groups tokens into top-level statements

use std::iter::FusedIterator;

use crate::dialect::SqlDialect;
use crate::error::{ReviewError, Span};
use crate::tokenizer::{tokenize, Token, TokenKind, Tokenizer};

/// Tokens of one top-level statement.
///
/// Whitespace, comments and the terminating semicolon are not included.
/// Parenthesis depth is zero at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSpan<'a> {
    pub tokens: Vec<Token<'a>>,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl<'a> StatementSpan<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        let start_offset = tokens.first().map_or(0, |t| t.span.offset);
        let end_offset = tokens.last().map_or(0, |t| t.span.end_offset());
        Self {
            tokens,
            start_offset,
            end_offset,
        }
    }

    /// Location of the first token
    pub fn start(&self) -> Option<Span> {
        self.tokens.first().map(|t| t.span)
    }

    /// Source text covered by this statement
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start_offset..self.end_offset]
    }
}

/// Split `sql` into statements
pub fn split_statements(sql: &str, dialect: SqlDialect) -> Segmenter<'_, Tokenizer<'_>> {
    segment(tokenize(sql, dialect))
}

/// Segment a token stream into statements
pub fn segment<'a, I>(tokens: I) -> Segmenter<'a, I::IntoIter>
where
    I: IntoIterator<Item = Result<Token<'a>, ReviewError>>,
{
    Segmenter {
        tokens: tokens.into_iter(),
        recovering: false,
        finished: false,
    }
}

/// Iterator over the statements of a token stream.
///
/// A `;` ends a statement only at parenthesis depth zero. After an
/// unbalanced parenthesis the error is yielded and scanning resumes after
/// the next top-level `;`. A lexical error ends the stream.
pub struct Segmenter<'a, I>
where
    I: Iterator<Item = Result<Token<'a>, ReviewError>>,
{
    tokens: I,
    recovering: bool,
    finished: bool,
}

impl<'a, I> Segmenter<'a, I>
where
    I: Iterator<Item = Result<Token<'a>, ReviewError>>,
{
    fn next_token(&mut self) -> Option<Result<Token<'a>, ReviewError>> {
        loop {
            match self.tokens.next() {
                Some(Ok(token)) if token.is_trivia() => continue,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                other => return other,
            }
        }
    }

    /// Skip the rest of a malformed statement.
    ///
    /// Returns a lexical error hit while skipping, if any.
    fn skip_statement(&mut self) -> Option<ReviewError> {
        let mut depth = 0usize;
        while let Some(token) = self.next_token() {
            let token = match token {
                Ok(token) => token,
                Err(e) => return Some(e),
            };
            match token.kind {
                TokenKind::Punctuation('(') => depth += 1,
                TokenKind::Punctuation(')') => depth = depth.saturating_sub(1),
                TokenKind::Punctuation(';') if depth == 0 => break,
                TokenKind::EndOfInput => {
                    self.finished = true;
                    break;
                }
                _ => {}
            }
        }
        self.recovering = false;
        None
    }
}

impl<'a, I> Iterator for Segmenter<'a, I>
where
    I: Iterator<Item = Result<Token<'a>, ReviewError>>,
{
    type Item = Result<StatementSpan<'a>, ReviewError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.recovering {
            if let Some(e) = self.skip_statement() {
                return Some(Err(e));
            }
        }
        if self.finished {
            return None;
        }

        let mut tokens: Vec<Token<'a>> = Vec::new();
        // Positions of currently open parentheses
        let mut open: Vec<Span> = Vec::new();

        loop {
            let token = match self.next_token() {
                Some(Ok(token)) => token,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.finished = true;
                    break;
                }
            };

            match token.kind {
                TokenKind::EndOfInput => {
                    self.finished = true;
                    if let Some(paren) = open.last() {
                        return Some(Err(ReviewError::UnbalancedParens {
                            line: paren.line,
                            column: paren.column,
                        }));
                    }
                    break;
                }
                TokenKind::Punctuation('(') => open.push(token.span),
                TokenKind::Punctuation(')') => {
                    if open.pop().is_none() {
                        self.recovering = true;
                        return Some(Err(ReviewError::UnbalancedParens {
                            line: token.span.line,
                            column: token.span.column,
                        }));
                    }
                }
                TokenKind::Punctuation(';') if open.is_empty() => {
                    if tokens.is_empty() {
                        continue;
                    }
                    break;
                }
                _ => {}
            }
            tokens.push(token);
        }

        if tokens.is_empty() {
            None
        } else {
            Some(Ok(StatementSpan::new(tokens)))
        }
    }
}

impl<'a, I> FusedIterator for Segmenter<'a, I> where
    I: Iterator<Item = Result<Token<'a>, ReviewError>>
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(sql: &str, dialect: SqlDialect) -> Vec<&str> {
        split_statements(sql, dialect)
            .map(|s| s.unwrap().text(sql))
            .collect()
    }

    #[test]
    fn test_semicolon_inside_string_does_not_split() {
        let sql = "CREATE TABLE t (id INT, note VARCHAR(10) DEFAULT 'a;b'); CREATE TABLE u (id INT PRIMARY KEY);";
        assert_eq!(
            texts(sql, SqlDialect::MySQL),
            vec![
                "CREATE TABLE t (id INT, note VARCHAR(10) DEFAULT 'a;b')",
                "CREATE TABLE u (id INT PRIMARY KEY)",
            ]
        );
    }

    #[test]
    fn test_semicolon_inside_parens_does_not_split() {
        let sql = "CREATE TABLE t (a INT; b INT); SELECT 1";
        assert_eq!(
            texts(sql, SqlDialect::PostgreSQL),
            vec!["CREATE TABLE t (a INT; b INT)", "SELECT 1"]
        );
    }

    #[test]
    fn test_semicolon_inside_comment_does_not_split() {
        let sql = "SELECT 1 -- a; b\n/* ; */ FROM t; SELECT 2";
        let statements: Vec<_> = split_statements(sql, SqlDialect::PostgreSQL)
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(statements.len(), 2);
        let texts: Vec<_> = statements[0].tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["SELECT", "1", "FROM", "t"]);
    }

    #[test]
    fn test_trailing_statement_without_semicolon() {
        assert_eq!(texts("SELECT 1; SELECT 2", SqlDialect::MySQL), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn test_empty_statements_are_skipped() {
        assert_eq!(texts(";; SELECT 1;;  ;", SqlDialect::MySQL), vec!["SELECT 1"]);
        assert!(texts("  -- only a comment\n", SqlDialect::MySQL).is_empty());
    }

    #[test]
    fn test_unbalanced_close_paren_recovers() {
        let sql = "SELECT (1)); CREATE TABLE t (id INT)";
        let results: Vec<_> = split_statements(sql, SqlDialect::MySQL).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            Err(ReviewError::UnbalancedParens { line: 1, column: 11 })
        );
        assert_eq!(
            results[1].as_ref().unwrap().text(sql),
            "CREATE TABLE t (id INT)"
        );
    }

    #[test]
    fn test_unclosed_paren_at_end() {
        let results: Vec<_> = split_statements("SELECT 1; CREATE TABLE t (id INT", SqlDialect::MySQL).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(ReviewError::UnbalancedParens { line: 1, column: 26 })
        );
    }

    #[test]
    fn test_lexical_error_ends_stream() {
        let results: Vec<_> =
            split_statements("SELECT 1; SELECT 'oops; SELECT 3", SqlDialect::MySQL).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(ReviewError::UnterminatedLiteral { line: 1, column: 18 })
        );
    }

    #[test]
    fn test_span_offsets() {
        let sql = "  SELECT 1 ;";
        let statements: Vec<_> = split_statements(sql, SqlDialect::MySQL)
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(statements[0].start_offset, 2);
        assert_eq!(statements[0].end_offset, 10);
        assert_eq!(statements[0].start().unwrap().column, 3);
    }
}
