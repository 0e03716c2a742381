//! Compiled predicates.
//!
//! [`compile`] lowers an AST into a [`Predicate`], a pure test over a
//! [`Card`]. Field terms the resolver does not understand compile to `None`
//! ("no opinion"), which is the identity element of both `AND` and `OR`:
//!
//! | left      | right     | AND / OR result |
//! |-----------|-----------|-----------------|
//! | `None`    | `None`    | `None`          |
//! | `Some(p)` | `None`    | `Some(p)`       |
//! | `None`    | `Some(q)` | `Some(q)`       |
//! | `Some(p)` | `Some(q)` | `Some(p ∧/∨ q)` |
//!
//! Negating no opinion is still no opinion. Only at the top of a query does
//! no opinion turn into [`Predicate::Never`] (see [`compile_query`]), so a
//! query made purely of unknown fields returns nothing rather than
//! everything.

use std::fmt;

use crate::ast::Node;
use crate::card::{Card, ColorAttr, Legality, TextAttr};
use crate::colors::ColorSet;
use crate::resolver;

/// Numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn holds<T: Ord>(self, left: T, right: T) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
        }
    }

    /// SQL spelling of the operator.
    pub fn sql(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

/// Relation between a card's color set and a target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetRelation {
    /// At least one color in common.
    Intersects,
    Equal,
    Subset,
    Superset,
    ProperSubset,
    ProperSuperset,
}

impl SetRelation {
    pub fn holds(self, card: &ColorSet, target: &ColorSet) -> bool {
        match self {
            SetRelation::Intersects => card.intersects(target),
            SetRelation::Equal => card == target,
            SetRelation::Subset => card.is_subset(target),
            SetRelation::Superset => card.is_superset(target),
            SetRelation::ProperSubset => card.is_subset(target) && card != target,
            SetRelation::ProperSuperset => card.is_superset(target) && card != target,
        }
    }
}

/// A single resolved test against one card attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Test {
    /// Case-insensitive substring of a text attribute. `needle` is lowercase.
    Contains { attr: TextAttr, needle: String },
    /// Free text: substring of the name or the oracle text.
    PlainText(String),
    ManaValue { op: Comparison, value: i64 },
    Parity(Parity),
    Colors {
        attr: ColorAttr,
        relation: SetRelation,
        target: ColorSet,
    },
    Colorless(ColorAttr),
    Multicolor(ColorAttr),
    /// Exact keyword, compared case-insensitively. Stored lowercase.
    Keyword(String),
    Legality {
        format: &'static str,
        status: Legality,
    },
}

fn contains_folded(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

impl Test {
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            Test::Contains { attr, needle } => contains_folded(card.text(*attr), needle),
            Test::PlainText(needle) => {
                contains_folded(Some(&card.name), needle)
                    || contains_folded(card.oracle_text.as_deref(), needle)
            }
            Test::ManaValue { op, value } => card
                .mana_value
                .is_some_and(|mv| op.holds(i64::from(mv), *value)),
            Test::Parity(parity) => card.mana_value.is_some_and(|mv| match parity {
                Parity::Even => mv % 2 == 0,
                Parity::Odd => mv % 2 == 1,
            }),
            Test::Colors {
                attr,
                relation,
                target,
            } => relation.holds(card.color_set(*attr), target),
            Test::Colorless(attr) => card.color_set(*attr).is_empty(),
            Test::Multicolor(attr) => card.color_set(*attr).len() > 1,
            Test::Keyword(keyword) => card.keywords.iter().any(|k| k.to_lowercase() == *keyword),
            Test::Legality { format, status } => card.legality(format) == Some(*status),
        }
    }
}

/// A compiled query: a pure function from card to bool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches nothing.
    Never,
    Test(Test),
    Not(Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn matches(&self, card: &Card) -> bool {
        match self {
            Predicate::Never => false,
            Predicate::Test(test) => test.matches(card),
            Predicate::Not(inner) => !inner.matches(card),
            Predicate::And(l, r) => l.matches(card) && r.matches(card),
            Predicate::Or(l, r) => l.matches(card) || r.matches(card),
        }
    }

    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }
}

impl From<Test> for Predicate {
    fn from(test: Test) -> Self {
        Predicate::Test(test)
    }
}

/// Lower an AST node. `None` means no opinion.
pub fn compile(node: &Node) -> Option<Predicate> {
    match node {
        Node::And(l, r) => match (compile(l), compile(r)) {
            (Some(l), Some(r)) => Some(Predicate::and(l, r)),
            (l, None) => l,
            (None, r) => r,
        },
        Node::Or(l, r) => match (compile(l), compile(r)) {
            (Some(l), Some(r)) => Some(Predicate::or(l, r)),
            (l, None) => l,
            (None, r) => r,
        },
        Node::Not(inner) => compile(inner).map(Predicate::negate),
        Node::Field(term) => resolver::resolve(term),
        Node::PlainText(text) => Some(Test::PlainText(text.to_lowercase()).into()),
    }
}

/// Lower a whole query. A query with no opinion at all matches nothing.
pub fn compile_query(root: &Node) -> Predicate {
    match compile(root) {
        Some(predicate) => predicate,
        None => {
            tracing::debug!(query = %root, "query has no recognised terms; matching nothing");
            Predicate::Never
        }
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Test::Contains { attr, needle } => write!(f, "{attr:?} contains {needle:?}"),
            Test::PlainText(needle) => write!(f, "Name|OracleText contains {needle:?}"),
            Test::ManaValue { op, value } => write!(f, "ManaValue {} {value}", op.sql()),
            Test::Parity(parity) => write!(f, "ManaValue is {parity:?}"),
            Test::Colors {
                attr,
                relation,
                target,
            } => write!(f, "{attr:?} {relation:?} {{{target}}}"),
            Test::Colorless(attr) => write!(f, "{attr:?} is colorless"),
            Test::Multicolor(attr) => write!(f, "{attr:?} is multicolor"),
            Test::Keyword(keyword) => write!(f, "Keywords has {keyword:?}"),
            Test::Legality { format, status } => write!(f, "{format} is {status}"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Never => f.write_str("NEVER"),
            Predicate::Test(test) => write!(f, "[{test}]"),
            Predicate::Not(inner) => write!(f, "NOT {inner}"),
            Predicate::And(l, r) => write!(f, "({l} AND {r})"),
            Predicate::Or(l, r) => write!(f, "({l} OR {r})"),
        }
    }
}
