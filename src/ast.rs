//! Query AST.
//!
//! A parsed query is a binary tree of [`Node`]s. Nodes are immutable once the
//! parser returns them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::tokenizer;

/// One node of a parsed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
    Field(FieldTerm),
    PlainText(String),
}

impl Node {
    pub fn and(left: Node, right: Node) -> Self {
        Node::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::Or(Box::new(left), Box::new(right))
    }

    pub fn not(operand: Node) -> Self {
        Node::Not(Box::new(operand))
    }

    pub fn field(name: &str, op: &str, value: &str) -> Self {
        Node::Field(FieldTerm {
            name: name.to_string(),
            op: op.to_string(),
            value: value.to_string(),
        })
    }

    pub fn text(value: &str) -> Self {
        Node::PlainText(value.to_string())
    }
}

/// A `field[op]:value` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTerm {
    /// Field name as written (aliases are resolved later).
    pub name: String,
    /// Operator characters as written; empty means the field's default.
    pub op: String,
    pub value: String,
}

impl FieldTerm {
    /// Split the raw text of a field token.
    ///
    /// Uses the same pattern the tokenizer recognised the token with, and
    /// requires it to consume the whole text.
    pub fn parse(raw: &str, position: usize) -> Result<Self, ParseError> {
        match tokenizer::field_term(raw) {
            Ok(("", parts)) => Ok(FieldTerm {
                name: parts.name.to_string(),
                op: parts.op.to_string(),
                value: parts.value,
            }),
            Ok((rest, _)) => Err(ParseError::new(
                position + raw.len() - rest.len(),
                format!("malformed field term '{raw}': unexpected '{rest}'"),
            )),
            Err(_) => Err(ParseError::new(
                position,
                format!("malformed field term '{raw}'"),
            )),
        }
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

impl fmt::Display for FieldTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}:", self.name, self.op)?;
        if needs_quotes(&self.value) {
            write_quoted(f, &self.value)
        } else {
            f.write_str(&self.value)
        }
    }
}

/// Canonical, fully parenthesised query text.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::And(l, r) => write!(f, "({l} AND {r})"),
            Node::Or(l, r) => write!(f, "({l} OR {r})"),
            Node::Not(inner) => write!(f, "-{inner}"),
            Node::Field(term) => write!(f, "{term}"),
            Node::PlainText(text) => {
                let ambiguous = text.starts_with('-')
                    || text.contains(':')
                    || text.eq_ignore_ascii_case("or");
                if needs_quotes(text) || ambiguous {
                    write_quoted(f, text)
                } else {
                    f.write_str(text)
                }
            }
        }
    }
}
