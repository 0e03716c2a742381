//! Recursive-descent parser for card queries.
//!
//! # Grammar
//!
//! ```text
//! Expression := Or
//! Or         := And ( 'OR' And )*
//! And        := Not ( Not )*              -- adjacency is an implicit AND
//! Not        := '-' Not | Term
//! Term       := '(' Expression ')' | Field | Quoted | Word
//! ```
//!
//! `OR` binds loosest, `-` tightest. Chains are left-associative binary
//! nodes; `-` nests to the right, so `--x` is a double negation.
//!
//! Every later pass walks the tree recursively, so the parser bounds its
//! shape: at most [`MAX_DEPTH`] nested `(` and `-`, and at most
//! [`MAX_TERMS`] terms per query.

use crate::ast::{FieldTerm, Node};
use crate::error::ParseError;
use crate::tokenizer::{tokenize, Token, TokenKind};

/// Deepest allowed nesting of parentheses and negations.
pub const MAX_DEPTH: usize = 128;

/// Most terms (fields, words, quoted strings) a query may contain.
pub const MAX_TERMS: usize = 1024;

/// Parse a complete query string into an AST.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(input)?;
    parse_tokens(&tokens, input.len())
}

/// Parse an already tokenized query. `input_len` positions end-of-input
/// errors.
pub fn parse_tokens(tokens: &[Token], input_len: usize) -> Result<Node, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        input_len,
        depth: 0,
        terms: 0,
    };
    let node = parser.parse_or()?;
    match parser.peek() {
        None => Ok(node),
        Some(token) if token.kind == TokenKind::RParen => Err(ParseError::new(
            token.span.start,
            "unmatched closing parenthesis",
        )),
        Some(token) => Err(ParseError::new(
            token.span.start,
            format!("unexpected trailing token '{}'", token.text),
        )),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    input_len: usize,
    depth: usize,
    terms: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn end_error(&self, message: &str) -> ParseError {
        ParseError::new(self.input_len, message)
    }

    fn descend(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new(token.span.start, "query nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn count_term(&mut self, token: &Token) -> Result<(), ParseError> {
        self.terms += 1;
        if self.terms > MAX_TERMS {
            return Err(ParseError::new(token.span.start, "query has too many terms"));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_and()?;
        while self.peek_kind() == Some(TokenKind::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            node = Node::or(node, right);
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_not()?;
        while self.starts_operand() {
            let right = self.parse_not()?;
            node = Node::and(node, right);
        }
        Ok(node)
    }

    fn starts_operand(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::Not
                    | TokenKind::LParen
                    | TokenKind::Field
                    | TokenKind::Quoted
                    | TokenKind::Word
            )
        )
    }

    fn parse_not(&mut self) -> Result<Node, ParseError> {
        if let Some(token) = self.peek().filter(|t| t.kind == TokenKind::Not) {
            self.pos += 1;
            if self.peek().is_none() {
                return Err(self.end_error("'-' must be followed by a term"));
            }
            self.descend(token)?;
            let operand = self.parse_not()?;
            self.depth -= 1;
            return Ok(Node::not(operand));
        }
        self.parse_term()
    }

    fn parse_term(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.next() else {
            return Err(self.end_error("expected a term"));
        };
        match token.kind {
            TokenKind::LParen => {
                self.descend(token)?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.next() {
                    Some(close) if close.kind == TokenKind::RParen => Ok(inner),
                    _ => Err(ParseError::new(
                        token.span.start,
                        "unmatched opening parenthesis",
                    )),
                }
            }
            TokenKind::Field => {
                self.count_term(token)?;
                FieldTerm::parse(&token.text, token.span.start).map(Node::Field)
            }
            TokenKind::Quoted | TokenKind::Word => {
                self.count_term(token)?;
                Ok(Node::PlainText(token.text.clone()))
            }
            TokenKind::RParen => Err(ParseError::new(
                token.span.start,
                "unmatched closing parenthesis",
            )),
            TokenKind::Or => Err(ParseError::new(
                token.span.start,
                "OR must be between two terms",
            )),
            TokenKind::Not => Err(ParseError::new(token.span.start, "unexpected '-'")),
        }
    }
}
