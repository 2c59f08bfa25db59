//! Token stream for the parser.
//!
//! Comments are dropped, unknown characters become [`TokenKind::Error`]
//! tokens (the parser reports them), and the stream always ends with
//! [`TokenKind::Eof`].

use std::fmt;

use logos::Logos;
use tolk_ir::Span;

use crate::raw_token::RawToken;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Import,
    Fun,
    Struct,
    Enum,
    Type,
    Const,
    Global,
    Val,
    Var,
    Return,
    If,
    Else,
    While,
    Do,
    Repeat,
    Try,
    Catch,
    Throw,
    Assert,
    Break,
    Continue,
    Match,
    True,
    False,
    Null,
    As,
    Is,
    Lazy,
    Underscore,
    Ident,
    Number,
    String,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Lt,
    Gt,
    LtEq,
    Spaceship,
    Shl,
    ShlAssign,
    EqEq,
    NotEq,
    Eq,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    Question,
    QuestionQuestion,
    Colon,
    Semi,
    Comma,
    Dot,
    Arrow,
    FatArrow,
    At,
    /// Character sequence the lexer does not recognize.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable description used in parse errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Import => "`import`",
            TokenKind::Fun => "`fun`",
            TokenKind::Struct => "`struct`",
            TokenKind::Enum => "`enum`",
            TokenKind::Type => "`type`",
            TokenKind::Const => "`const`",
            TokenKind::Global => "`global`",
            TokenKind::Val => "`val`",
            TokenKind::Var => "`var`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::Do => "`do`",
            TokenKind::Repeat => "`repeat`",
            TokenKind::Try => "`try`",
            TokenKind::Catch => "`catch`",
            TokenKind::Throw => "`throw`",
            TokenKind::Assert => "`assert`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::Match => "`match`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::As => "`as`",
            TokenKind::Is => "`is`",
            TokenKind::Lazy => "`lazy`",
            TokenKind::Underscore => "`_`",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Spaceship => "`<=>`",
            TokenKind::Shl => "`<<`",
            TokenKind::ShlAssign => "`<<=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Eq => "`=`",
            TokenKind::PlusAssign => "`+=`",
            TokenKind::MinusAssign => "`-=`",
            TokenKind::StarAssign => "`*=`",
            TokenKind::SlashAssign => "`/=`",
            TokenKind::PercentAssign => "`%=`",
            TokenKind::AmpAssign => "`&=`",
            TokenKind::PipeAssign => "`|=`",
            TokenKind::CaretAssign => "`^=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::Tilde => "`~`",
            TokenKind::Bang => "`!`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Question => "`?`",
            TokenKind::QuestionQuestion => "`??`",
            TokenKind::Colon => "`:`",
            TokenKind::Semi => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Arrow => "`->`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::At => "`@`",
            TokenKind::Error => "unknown character",
            TokenKind::Eof => "end of file",
        }
    }

    /// Tokens that begin a top-level item; used for error recovery.
    pub fn starts_item(self) -> bool {
        matches!(
            self,
            TokenKind::Import
                | TokenKind::Fun
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Type
                | TokenKind::Const
                | TokenKind::Global
                | TokenKind::At
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            // Filtered out by `lex` before conversion.
            RawToken::LineComment | RawToken::BlockComment => TokenKind::Error,
            RawToken::Import => TokenKind::Import,
            RawToken::Fun => TokenKind::Fun,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Enum => TokenKind::Enum,
            RawToken::Type => TokenKind::Type,
            RawToken::Const => TokenKind::Const,
            RawToken::Global => TokenKind::Global,
            RawToken::Val => TokenKind::Val,
            RawToken::Var => TokenKind::Var,
            RawToken::Return => TokenKind::Return,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::While => TokenKind::While,
            RawToken::Do => TokenKind::Do,
            RawToken::Repeat => TokenKind::Repeat,
            RawToken::Try => TokenKind::Try,
            RawToken::Catch => TokenKind::Catch,
            RawToken::Throw => TokenKind::Throw,
            RawToken::Assert => TokenKind::Assert,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Match => TokenKind::Match,
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,
            RawToken::Null => TokenKind::Null,
            RawToken::As => TokenKind::As,
            RawToken::Is => TokenKind::Is,
            RawToken::Lazy => TokenKind::Lazy,
            RawToken::Underscore => TokenKind::Underscore,
            RawToken::Ident => TokenKind::Ident,
            RawToken::Number => TokenKind::Number,
            RawToken::String => TokenKind::String,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Spaceship => TokenKind::Spaceship,
            RawToken::Shl => TokenKind::Shl,
            RawToken::ShlAssign => TokenKind::ShlAssign,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Eq => TokenKind::Eq,
            RawToken::PlusAssign => TokenKind::PlusAssign,
            RawToken::MinusAssign => TokenKind::MinusAssign,
            RawToken::StarAssign => TokenKind::StarAssign,
            RawToken::SlashAssign => TokenKind::SlashAssign,
            RawToken::PercentAssign => TokenKind::PercentAssign,
            RawToken::AmpAssign => TokenKind::AmpAssign,
            RawToken::PipeAssign => TokenKind::PipeAssign,
            RawToken::CaretAssign => TokenKind::CaretAssign,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Bang => TokenKind::Bang,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Question => TokenKind::Question,
            RawToken::QuestionQuestion => TokenKind::QuestionQuestion,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::FatArrow => TokenKind::FatArrow,
            RawToken::At => TokenKind::At,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lex `source` into tokens, ending with an `Eof` token.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let kind = match result {
            Ok(RawToken::LineComment | RawToken::BlockComment) => continue,
            Ok(raw) => TokenKind::from(raw),
            Err(()) => TokenKind::Error,
        };
        tokens.push(Token { kind, span });
    }
    let end = Span::point(u32::try_from(source.len()).unwrap_or(u32::MAX));
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: end,
    });
    tokens
}
