//! Tolk parser - lexer plus resilient recursive descent.
//!
//! [`parse`] turns source text into a [`tolk_ir::SyntaxTree`]. Parsing never
//! fails as a whole: malformed items and statements are recorded as
//! [`ParseError`]s, covered by `ERROR` nodes, and skipped.

mod cursor;
mod error;
mod grammar;
mod lexer;
mod raw_token;

use std::sync::Arc;

use tolk_ir::{Child, FileId, NodeId, NodeKind, Span, SyntaxTree, TreeBuilder};

use crate::cursor::Cursor;
pub use crate::error::ParseError;
pub use crate::lexer::{lex, Token, TokenKind};

/// Result of parsing one file.
#[derive(Debug)]
pub struct ParseOutput {
    pub tree: Arc<SyntaxTree>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a whole source file.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse(file: FileId, source: &str) -> ParseOutput {
    let tokens = lex(source);
    let mut parser = Parser::new(file, source, &tokens);
    let root = parser.parse_source_file();
    let Parser {
        builder, errors, ..
    } = parser;
    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "parse errors");
    }
    ParseOutput {
        tree: Arc::new(builder.finish(root)),
        errors,
    }
}

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Saved parser state for speculative parsing.
#[derive(Copy, Clone)]
pub(crate) struct Snapshot {
    pos: usize,
    nodes: usize,
    errors: usize,
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    cursor: Cursor<'a>,
    builder: TreeBuilder,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(file: FileId, source: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            source,
            cursor: Cursor::new(tokens),
            builder: TreeBuilder::new(file, source),
            errors: Vec::new(),
        }
    }

    // Token access

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.cursor.check(kind)
    }

    /// Current token is an identifier spelled `word`.
    pub(crate) fn check_word(&self, word: &str) -> bool {
        self.cursor.check_contextual(self.source, word)
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> PResult<Span> {
        if self.check(kind) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.error_expected(kind.describe()))
        }
    }

    pub(crate) fn error_expected(&self, expected: &'static str) -> ParseError {
        let token = self.cursor.current();
        if token.kind == TokenKind::Error {
            ParseError::UnknownToken { span: token.span }
        } else {
            ParseError::UnexpectedToken {
                expected,
                found: token.kind,
                span: token.span,
            }
        }
    }

    // Node construction

    /// Start offset of the current token.
    #[inline]
    pub(crate) fn start(&self) -> u32 {
        self.cursor.current_span().start
    }

    /// Push a node spanning from `start` to the end of the last consumed
    /// token.
    pub(crate) fn finish(
        &mut self,
        kind: NodeKind,
        start: u32,
        children: impl IntoIterator<Item = Child>,
    ) -> NodeId {
        let end = self.cursor.previous_span().end.max(start);
        self.builder.push(kind, Span::new(start, end), children)
    }

    /// Consume the current token as a leaf node.
    pub(crate) fn leaf(&mut self, kind: NodeKind) -> NodeId {
        let token = self.cursor.advance();
        self.builder.push(kind, token.span, [])
    }

    /// Consume an identifier token as a leaf of the given kind.
    pub(crate) fn expect_name(&mut self, kind: NodeKind) -> PResult<NodeId> {
        if self.check(TokenKind::Ident) {
            Ok(self.leaf(kind))
        } else {
            Err(self.error_expected("identifier"))
        }
    }

    // Speculation

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.cursor.position(),
            nodes: self.builder.len(),
            errors: self.errors.len(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.cursor.set_position(snapshot.pos);
        self.builder.truncate(snapshot.nodes);
        self.errors.truncate(snapshot.errors);
    }

    /// Run `f`; on failure, or when `accept` rejects the following token,
    /// roll back and return `None`.
    pub(crate) fn try_parse<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
        accept: impl FnOnce(&Self) -> bool,
    ) -> Option<T> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(value) if accept(self) => Some(value),
            _ => {
                self.restore(snapshot);
                None
            }
        }
    }

    // Recovery

    /// Record `error`, discard nodes built since `snapshot`, skip tokens
    /// until `stop` matches at brace depth zero, and cover the skipped range
    /// with an `ERROR` node.
    pub(crate) fn recover(
        &mut self,
        error: ParseError,
        snapshot: Snapshot,
        start: u32,
        stop: impl Fn(TokenKind) -> bool,
    ) -> NodeId {
        self.errors.push(error);
        self.builder.truncate(snapshot.nodes);
        let mut depth = 0usize;
        let mut consumed = self.cursor.position() > snapshot.pos;
        loop {
            let kind = self.current_kind();
            if kind == TokenKind::Eof {
                break;
            }
            if depth == 0 && consumed && stop(kind) {
                break;
            }
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.cursor.advance();
            consumed = true;
        }
        if !consumed && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        self.finish(NodeKind::Error, start, [])
    }
}

#[cfg(test)]
mod tests;
