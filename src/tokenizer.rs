//! Tokenizer for card queries.
//!
//! Splits a raw query into a flat token stream. The field-term pattern
//! ([`field_term`]) lives here and is reused by the parser when it splits a
//! field token into name, operator and value, so recognition and splitting
//! can never disagree.
//!
//! ```text
//! t:creature -c>=:rg (o:"draw a card" OR kw:flying)
//! ─────┬──── ┬──┬─── ┬───────┬────── ─┬ ────┬──── ┬
//!      │     │  │    │       │        │     │     └── RParen
//!      │     │  │    │       │        │     └── Field
//!      │     │  │    │       │        └── Or
//!      │     │  │    │       └── Field (quoted value)
//!      │     │  │    └── LParen
//!      │     │  └── Field
//!      │     └── Not
//!      └── Field
//! ```

use std::fmt;
use std::ops::Range;

use nom::{
    branch::alt,
    bytes::complete::{is_not, take, take_while, take_while1},
    character::complete::char,
    combinator::{eof, map, opt, value},
    multi::many0,
    sequence::{pair, preceded},
    IResult,
};

use crate::error::ParseError;

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<field><op>:<value>` term, text is the raw source slice.
    Field,
    /// Double-quoted string, text is the unescaped content.
    Quoted,
    /// Any other run of non-space, non-paren characters.
    Word,
    /// The keyword `OR`.
    Or,
    /// A leading `-`.
    Not,
    LParen,
    RParen,
}

/// A token with its byte span in the source query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Range<usize>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TokenKind::Field => "Field",
            TokenKind::Quoted => "Quoted",
            TokenKind::Word => "Word",
            TokenKind::Or => "Or",
            TokenKind::Not => "Not",
            TokenKind::LParen => "LParen",
            TokenKind::RParen => "RParen",
        };
        write!(
            f,
            "{kind}({:?}) @ {}..{}",
            self.text, self.span.start, self.span.end
        )
    }
}

/// The pieces of a field term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParts<'a> {
    pub name: &'a str,
    /// Operator characters exactly as written, possibly empty.
    pub op: &'a str,
    /// Unescaped value.
    pub value: String,
}

fn is_field_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

/// Parse a field term: `name[op]:value`.
pub fn field_term(input: &str) -> IResult<&str, FieldParts<'_>> {
    let (rest, name) = take_while1(is_field_char)(input)?;
    let (rest, op) = take_while(is_operator_char)(rest)?;
    let (rest, _) = char(':')(rest)?;
    let (rest, value) = field_value(rest)?;
    Ok((rest, FieldParts { name, op, value }))
}

fn field_value(input: &str) -> IResult<&str, String> {
    if input.starts_with('"') {
        return quoted(input);
    }
    let (rest, raw) = take_while(is_word_char)(input)?;
    Ok((rest, raw.to_string()))
}

/// Parse a double-quoted string. Backslash escapes the next character and a
/// missing closing quote runs to the end of input.
pub fn quoted(input: &str) -> IResult<&str, String> {
    let (rest, _) = char('"')(input)?;
    let (rest, value) = map(many0(quoted_fragment), |parts: Vec<&str>| parts.concat())(rest)?;
    let (rest, _) = opt(char('"'))(rest)?;
    Ok((rest, value))
}

fn quoted_fragment(input: &str) -> IResult<&str, &str> {
    alt((
        is_not("\"\\"),
        preceded(char('\\'), take(1usize)),
        // a lone trailing backslash is dropped
        value("", pair(char('\\'), eof)),
    ))(input)
}

/// Split a query into tokens.
///
/// Fails only when the query is empty or whitespace.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(0, "query is empty"));
    }
    let tokens = Lexer::new(input).run();
    tracing::trace!(count = tokens.len(), ?tokens, "tokenized query");
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
                continue;
            }
            match ch {
                '"' => self.lex_quoted(),
                '(' => self.lex_single(TokenKind::LParen, ch),
                ')' => self.lex_single(TokenKind::RParen, ch),
                '-' if self.dash_negates() => self.lex_single(TokenKind::Not, ch),
                _ => self.lex_word_like(),
            }
        }
        self.tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Move to where `remaining` starts and return the span covered.
    fn advance_to(&mut self, remaining: &str) -> Range<usize> {
        let start = self.pos;
        self.pos = self.input.len() - remaining.len();
        start..self.pos
    }

    // `-` negates at the start of input, after whitespace or `(`, or right
    // after another negating `-`. Anywhere else it is part of a word.
    fn dash_negates(&self) -> bool {
        match self.input[..self.pos].chars().next_back() {
            None => true,
            Some(prev) if prev.is_whitespace() || prev == '(' => true,
            Some('-') => self
                .tokens
                .last()
                .is_some_and(|t| t.kind == TokenKind::Not && t.span.end == self.pos),
            Some(_) => false,
        }
    }

    fn lex_single(&mut self, kind: TokenKind, ch: char) {
        let start = self.pos;
        self.pos += ch.len_utf8();
        self.tokens.push(Token::new(kind, ch, start..self.pos));
    }

    fn lex_quoted(&mut self) {
        match quoted(self.rest()) {
            Ok((remaining, value)) => {
                let span = self.advance_to(remaining);
                self.tokens.push(Token::new(TokenKind::Quoted, value, span));
            }
            Err(_) => self.lex_word_like(),
        }
    }

    fn lex_word_like(&mut self) {
        let rest = self.rest();
        if let Ok((remaining, _)) = field_term(rest) {
            let span = self.advance_to(remaining);
            let raw = &self.input[span.clone()];
            self.tokens.push(Token::new(TokenKind::Field, raw, span));
            return;
        }

        let len = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
        let word = &rest[..len];
        let kind = if word.eq_ignore_ascii_case("or") {
            TokenKind::Or
        } else {
            TokenKind::Word
        };
        let span = self.advance_to(&rest[len..]);
        self.tokens.push(Token::new(kind, word, span));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_field_terms() {
        assert_eq!(kinds("t:creature k:haste"), vec![TokenKind::Field, TokenKind::Field]);
        assert_eq!(texts("t:creature k:haste"), vec!["t:creature", "k:haste"]);
    }

    #[test]
    fn test_field_with_quoted_value() {
        let tokens = tokenize(r#"o:"draw a card" n:bolt"#).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Field);
        assert_eq!(tokens[0].text, r#"o:"draw a card""#);
        assert_eq!(tokens[0].span, 0..15);
        assert_eq!(tokens[1].span, 16..22);
    }

    #[test]
    fn test_quoted_string_escapes() {
        let tokens = tokenize(r#""say \"hi\"  now""#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Quoted);
        assert_eq!(tokens[0].text, r#"say "hi"  now"#);
    }

    #[test]
    fn test_empty_quoted_string() {
        let tokens = tokenize(r#""" a"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Quoted);
        assert_eq!(tokens[0].text, "");
        assert_eq!(tokens[0].span, 0..2);
        assert_eq!(tokens[1].text, "a");
    }

    #[test]
    fn test_trailing_backslash_in_open_quote() {
        let tokens = tokenize(r#""abc\"#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "abc");
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let tokens = tokenize(r#"a "open ended"#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Quoted);
        assert_eq!(tokens[1].text, "open ended");
    }

    #[test]
    fn test_negation_positions() {
        assert_eq!(kinds("-t:creature"), vec![TokenKind::Not, TokenKind::Field]);
        assert_eq!(kinds("a -b"), vec![TokenKind::Word, TokenKind::Not, TokenKind::Word]);
        assert_eq!(
            kinds("(-x)"),
            vec![TokenKind::LParen, TokenKind::Not, TokenKind::Word, TokenKind::RParen]
        );
        assert_eq!(texts("well-known"), vec!["well-known"]);
        assert_eq!(texts("o:-1/-1"), vec!["o:-1/-1"]);
    }

    #[test]
    fn test_double_dash_is_double_negation() {
        assert_eq!(kinds("--x"), vec![TokenKind::Not, TokenKind::Not, TokenKind::Word]);
        assert_eq!(kinds("- -x"), vec![TokenKind::Not, TokenKind::Not, TokenKind::Word]);
    }

    #[test]
    fn test_dash_after_close_paren_is_literal() {
        assert_eq!(texts("(a)-b"), vec!["(", "a", ")", "-b"]);
    }

    #[test]
    fn test_or_keyword() {
        assert_eq!(kinds("a OR b"), vec![TokenKind::Word, TokenKind::Or, TokenKind::Word]);
        assert_eq!(kinds("a or b"), vec![TokenKind::Word, TokenKind::Or, TokenKind::Word]);
        assert_eq!(kinds("order"), vec![TokenKind::Word]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(texts("cmc>=:3 c!=:rg c<=:esper"), vec!["cmc>=:3", "c!=:rg", "c<=:esper"]);
    }

    #[test]
    fn test_operator_without_colon_is_a_word() {
        assert_eq!(kinds("cmc>=3"), vec![TokenKind::Word]);
        assert_eq!(kinds("x=y power>=3"), vec![TokenKind::Word, TokenKind::Word]);
        assert_eq!(texts("x=y"), vec!["x=y"]);
    }

    #[test]
    fn test_bang_word_is_not_a_field() {
        assert_eq!(kinds("wow!"), vec![TokenKind::Word]);
    }

    #[test]
    fn test_parens_split_words() {
        assert_eq!(texts("(a OR b)c"), vec!["(", "a", "OR", "b", ")", "c"]);
        assert_eq!(texts("t:elf)"), vec!["t:elf", ")"]);
    }

    #[test]
    fn test_empty_value() {
        let (rest, parts) = field_term("c>=: x").unwrap();
        assert_eq!(rest, " x");
        assert_eq!(parts.op, ">=");
        assert_eq!(parts.value, "");
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("a  bc").unwrap();
        assert_eq!(tokens[0].span, 0..1);
        assert_eq!(tokens[1].span, 3..5);
    }

    #[test]
    fn test_field_term_parts() {
        let (rest, parts) = field_term("cmc<=:4 rest").unwrap();
        assert_eq!(rest, " rest");
        assert_eq!(parts.name, "cmc");
        assert_eq!(parts.op, "<=");
        assert_eq!(parts.value, "4");

        let (rest, parts) = field_term(r#"color_identity:"w u""#).unwrap();
        assert_eq!(rest, "");
        assert_eq!(parts.name, "color_identity");
        assert_eq!(parts.op, "");
        assert_eq!(parts.value, "w u");
    }

    #[test]
    fn test_empty_query_fails() {
        assert_eq!(tokenize("").unwrap_err().message, "query is empty");
        assert!(tokenize("   \t ").is_err());
    }
}
