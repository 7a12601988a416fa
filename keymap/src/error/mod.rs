use std::path::PathBuf;

use thiserror::Error;

use crate::lexer::TokenKind;

pub type KeymapResult<T> = Result<T, KeymapError>;

#[derive(Error, Debug)]
pub enum KeymapError {
    #[error("Unrecognized token `{text}` at {line}:{column}")]
    UnrecognizedToken {
        text: String,
        line: usize,
        column: usize,
    },

    #[error("Expected token type {expected}, but got {found} at {line}:{column}")]
    UnexpectedTokenKind {
        expected: Expected,
        found: TokenKind,
        line: usize,
        column: usize,
    },

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: Expected },

    #[error("Integer literal out of range: {0}")]
    IntegerOutOfRange(String),

    #[error("Malformed keymap: {0}")]
    MalformedTreeShape(String),

    #[error("Unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the parser was looking for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Kind(TokenKind),
    Expression,
    EndOfInput,
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Kind(kind) => write!(f, "{kind}"),
            Expected::Expression => f.write_str("expression"),
            Expected::EndOfInput => f.write_str("end of input"),
        }
    }
}

impl From<TokenKind> for Expected {
    fn from(kind: TokenKind) -> Self {
        Expected::Kind(kind)
    }
}

/// Helper macro to create a `KeymapError::MalformedTreeShape`
#[macro_export]
macro_rules! malformed {
    ( $($arg:tt)* ) => {
        $crate::error::KeymapError::MalformedTreeShape(format!($($arg)*))
    };
}
