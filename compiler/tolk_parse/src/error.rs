//! Parse errors.
//!
//! The parser never stops at the first error: every error is recorded,
//! the offending range becomes an `ERROR` node, and parsing resumes at the
//! next statement or item boundary.

use thiserror::Error;
use tolk_ir::Span;

use crate::TokenKind;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        span: Span,
    },
    #[error("unknown character sequence")]
    UnknownToken { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } | ParseError::UnknownToken { span } => *span,
        }
    }
}
