//! Token cursor for navigating the token stream.

use tolk_ir::Span;

use crate::{Token, TokenKind};

/// Position in a token list. The last token is always `Eof`, and the
/// cursor never moves past it.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Roll back to a position returned by [`Self::position`].
    #[inline]
    pub(crate) fn set_position(&mut self, pos: usize) {
        debug_assert!(pos < self.tokens.len(), "cursor position out of bounds");
        self.pos = pos;
    }

    #[inline]
    fn token_at(&self, pos: usize) -> Token {
        match self.tokens.get(pos) {
            Some(token) => *token,
            None => Token {
                kind: TokenKind::Eof,
                span: self.tokens.last().map_or(Span::DUMMY, |token| token.span),
            },
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.token_at(self.pos)
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the last consumed token, or an empty span at the current
    /// token when nothing was consumed yet.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.token_at(self.pos - 1).span
        } else {
            Span::point(self.current_span().start)
        }
    }

    #[inline]
    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.token_at(self.pos + offset).kind
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Current token is an identifier with exactly this text.
    pub(crate) fn check_contextual(&self, source: &str, word: &str) -> bool {
        self.check(TokenKind::Ident) && source.get(self.current_span().to_range()) == Some(word)
    }

    /// Tokens at `pos` and `pos + 1` touch with no whitespace between.
    fn adjacent(&self, offset: usize) -> bool {
        self.token_at(self.pos + offset).span.end == self.token_at(self.pos + offset + 1).span.start
    }

    /// `>` immediately followed by `>`.
    pub(crate) fn is_shift_right(&self) -> bool {
        self.check(TokenKind::Gt) && self.peek_kind(1) == TokenKind::Gt && self.adjacent(0)
    }

    /// `>` immediately followed by `=`.
    pub(crate) fn is_greater_equal(&self) -> bool {
        self.check(TokenKind::Gt) && self.peek_kind(1) == TokenKind::Eq && self.adjacent(0)
    }

    /// `>>` immediately followed by `=`.
    pub(crate) fn is_shift_right_assign(&self) -> bool {
        self.is_shift_right() && self.peek_kind(2) == TokenKind::Eq && self.adjacent(1)
    }

    /// Consume `count` adjacent tokens forming one operator; returns the
    /// combined span.
    pub(crate) fn consume_compound(&mut self, count: usize) -> Span {
        let start = self.current_span();
        let mut end = start;
        for _ in 0..count {
            end = self.advance().span;
        }
        start.merge(end)
    }

    /// Consume the current token. Never moves past `Eof`.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }
}
