use std::fmt;
use std::ops::Range;

use log::trace;
use logos::{Lexer, Logos};

use crate::error::{KeymapError, KeymapResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LexError;

/// Kinds of token accepted by the keymap language.
///
/// Keywords and identifiers only match whole words: a run of word characters
/// mixing letters and digits (`abc123`, `12ab`, `def1`) is rejected instead
/// of being split into two tokens.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n\f\x0B\x00]+")]
pub enum TokenKind {
    #[token("def")]
    Def,
    #[token("end")]
    End,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", identifier)]
    Identifier,
    #[regex(r"[0-9][a-zA-Z0-9_]*", integer)]
    Integer,
    #[token("(")]
    LeftParen,
    #[token(",")]
    Comma,
    #[token(")")]
    RightParen,
}

fn identifier(lex: &mut Lexer<TokenKind>) -> bool {
    !lex.slice().bytes().any(|b| b.is_ascii_digit())
}

fn integer(lex: &mut Lexer<TokenKind>) -> bool {
    lex.slice().bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Def => "def",
            TokenKind::End => "end",
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::LeftParen => "`(`",
            TokenKind::Comma => "`,`",
            TokenKind::RightParen => "`)`",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range of the token in the source.
    pub span: Range<usize>,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
}

/// Tracks line and column while the lexer moves forward through the source.
struct Position<'s> {
    source: &'s str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'s> Position<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn advance_to(&mut self, offset: usize) -> (usize, usize) {
        for ch in self.source[self.offset..offset].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = offset;
        (self.line, self.column)
    }
}

/// Splits `source` into tokens. Fails on the first piece of text that no
/// token pattern accepts; nothing is returned in that case.
pub fn tokenize(source: &str) -> KeymapResult<Vec<Token>> {
    let mut lexer = TokenKind::lexer(source);
    let mut position = Position::new(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = position.advance_to(span.start);
        match result {
            Ok(kind) => {
                trace!("token {kind} {:?} at {line}:{column}", lexer.slice());
                tokens.push(Token {
                    kind,
                    text: lexer.slice().to_string(),
                    span,
                    line,
                    column,
                });
            }
            Err(LexError) => {
                return Err(KeymapError::UnrecognizedToken {
                    text: lexer.slice().to_string(),
                    line,
                    column,
                });
            }
        }
    }

    Ok(tokens)
}
