use log::debug;

use crate::ast::Node;
use crate::error::{Expected, KeymapError, KeymapResult};
use crate::lexer::{Token, TokenKind, tokenize};

/// Recursive-descent parser over an already tokenized source.
///
/// The token slice is never modified; `pos` is the only state and only
/// moves forward.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Whether every token has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn lookahead(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    /// Tests the kind of the token `offset` places ahead. Running past the
    /// end of input is an error.
    pub fn peek(&self, kind: TokenKind, offset: usize) -> KeymapResult<bool> {
        self.lookahead(offset)
            .map(|token| token.kind == kind)
            .ok_or(KeymapError::UnexpectedEndOfInput {
                expected: kind.into(),
            })
    }

    /// Like [`Parser::peek`], but end of input simply does not match.
    pub fn check(&self, kind: TokenKind, offset: usize) -> bool {
        self.lookahead(offset).is_some_and(|token| token.kind == kind)
    }

    /// Takes the next token, which must be of `kind`.
    pub fn consume(&mut self, kind: TokenKind) -> KeymapResult<&'t Token> {
        let token = self
            .lookahead(0)
            .ok_or(KeymapError::UnexpectedEndOfInput {
                expected: kind.into(),
            })?;

        if token.kind != kind {
            return Err(unexpected(kind.into(), token));
        }

        self.pos += 1;
        Ok(token)
    }

    // expr = integer | call | var_ref
    pub fn parse_expr(&mut self) -> KeymapResult<Node> {
        let Some(token) = self.lookahead(0) else {
            return Err(KeymapError::UnexpectedEndOfInput {
                expected: Expected::Expression,
            });
        };

        match token.kind {
            TokenKind::Integer => self.parse_integer(),
            TokenKind::Identifier if self.check(TokenKind::LeftParen, 1) => self.parse_call(),
            _ => self.parse_var_ref(),
        }
    }

    fn parse_integer(&mut self) -> KeymapResult<Node> {
        let token = self.consume(TokenKind::Integer)?;
        let value = token
            .text
            .parse::<i64>()
            .map_err(|_| KeymapError::IntegerOutOfRange(token.text.clone()))?;
        Ok(Node::Integer(value))
    }

    // call = identifier "(" arg_list? ")"
    fn parse_call(&mut self) -> KeymapResult<Node> {
        let callee = self.consume(TokenKind::Identifier)?.text.clone();
        let args = self.parse_args()?;
        Ok(Node::Call { callee, args })
    }

    fn parse_var_ref(&mut self) -> KeymapResult<Node> {
        let name = self.consume(TokenKind::Identifier)?.text.clone();
        Ok(Node::VarRef(name))
    }

    // arg_list = expr ("," expr)*
    fn parse_args(&mut self) -> KeymapResult<Vec<Node>> {
        let mut args = Vec::new();
        self.consume(TokenKind::LeftParen)?;

        if !self.peek(TokenKind::RightParen, 0)? {
            args.push(self.parse_expr()?);
            while self.check(TokenKind::Comma, 0) {
                self.consume(TokenKind::Comma)?;
                args.push(self.parse_expr()?);
            }
        }

        self.consume(TokenKind::RightParen)?;
        Ok(args)
    }

    // definition = "def" identifier "(" param_list? ")" expr "end"
    pub fn parse_definition(&mut self) -> KeymapResult<Node> {
        self.consume(TokenKind::Def)?;
        let name = self.consume(TokenKind::Identifier)?.text.clone();
        let params = self.parse_params()?;
        let body = self.parse_expr()?;
        self.consume(TokenKind::End)?;

        Ok(Node::Definition {
            name,
            params,
            body: Box::new(body),
        })
    }

    // param_list = identifier ("," identifier)*
    fn parse_params(&mut self) -> KeymapResult<Vec<String>> {
        let mut params = Vec::new();
        self.consume(TokenKind::LeftParen)?;

        if self.check(TokenKind::Identifier, 0) {
            params.push(self.consume(TokenKind::Identifier)?.text.clone());
            while self.check(TokenKind::Comma, 0) {
                self.consume(TokenKind::Comma)?;
                params.push(self.consume(TokenKind::Identifier)?.text.clone());
            }
        }

        self.consume(TokenKind::RightParen)?;
        Ok(params)
    }

    /// Fails if any token is left over.
    pub fn expect_end(&self) -> KeymapResult<()> {
        match self.lookahead(0) {
            None => Ok(()),
            Some(token) => Err(unexpected(Expected::EndOfInput, token)),
        }
    }
}

fn unexpected(expected: Expected, token: &Token) -> KeymapError {
    KeymapError::UnexpectedTokenKind {
        expected,
        found: token.kind,
        line: token.line,
        column: token.column,
    }
}

/// Parses one expression from the start of `tokens`. Anything after it is
/// ignored.
pub fn parse(tokens: &[Token]) -> KeymapResult<Node> {
    let mut parser = Parser::new(tokens);
    let node = parser.parse_expr()?;
    if let Some(rest) = parser.lookahead(0) {
        debug!(
            "ignoring {} tokens after the expression, from {}:{}",
            tokens.len() - parser.pos,
            rest.line,
            rest.column
        );
    }
    debug!("parsed {} tokens", parser.pos);
    Ok(node)
}

/// Parses exactly one `def ... end` form from `tokens`.
pub fn parse_definition(tokens: &[Token]) -> KeymapResult<Node> {
    let mut parser = Parser::new(tokens);
    let node = parser.parse_definition()?;
    parser.expect_end()?;
    Ok(node)
}

/// Tokenizes and parses `source` as one expression.
pub fn parse_source(source: &str) -> KeymapResult<Node> {
    let tokens = tokenize(source)?;
    parse(&tokens)
}
