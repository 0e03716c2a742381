//! # cardql — card search queries
//!
//! Compiles compact, field-prefixed card queries into predicates and runs
//! them over a card corpus.
//!
//! ## Quick Example
//!
//! ```rust
//! use cardql::prelude::*;
//!
//! let corpus = vec![
//!     Card::new("1", "Goblin Guide").with_type("Creature — Goblin").with_colors("R"),
//!     Card::new("2", "Dimir Charm").with_type("Instant").with_colors("UB"),
//! ];
//!
//! let hits = search("ci:esper -t:creature", 10, &corpus)?;
//! assert_eq!(hits[0].name, "Dimir Charm");
//! # Ok::<(), cardql::error::QueryError>(())
//! ```
//!
//! ## Syntax
//!
//! | Form             | Meaning                                   |
//! |------------------|-------------------------------------------|
//! | `word`           | name or oracle text contains `word`       |
//! | `"two words"`    | name or oracle text contains the phrase   |
//! | `field:value`    | field filter (`t:elf`, `c:rg`, `k:haste`) |
//! | `field<op>:value`| comparison (`cmc>=:3`, `c<=:esper`)       |
//! | `a b`            | both                                      |
//! | `a OR b`         | either                                    |
//! | `-a`             | not                                       |
//! | `( … )`          | grouping                                  |
//!
//! Pipeline: [`tokenizer`] → [`parser`] → [`predicate`] (with [`resolver`]
//! and [`colors`]) → [`engine`]. [`transpiler`] turns a predicate into SQL
//! for stores that filter on their side.

pub mod ast;
pub mod card;
pub mod colors;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod predicate;
pub mod resolver;
pub mod tokenizer;
pub mod transpiler;

pub use engine::search;

pub mod prelude {
    pub use crate::ast::{FieldTerm, Node};
    pub use crate::card::{Card, Legality};
    pub use crate::colors::{parse_color_set, ColorSet};
    pub use crate::engine::{search, Catalogue, CardQuery};
    pub use crate::error::*;
    pub use crate::parser::parse;
    pub use crate::predicate::{compile, compile_query, Predicate};
    pub use crate::transpiler::{SqlQuery, ToSql};
}

/// Parse a query string into an AST.
///
/// # Example
///
/// ```
/// use cardql::ast::Node;
///
/// let ast = cardql::parse("t:goblin OR t:elf").unwrap();
/// assert!(matches!(ast, Node::Or(_, _)));
/// ```
pub fn parse(input: &str) -> Result<ast::Node, error::ParseError> {
    parser::parse(input)
}
