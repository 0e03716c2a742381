//! Search execution.
//!
//! [`search`] is the one-shot entry point: tokenize, parse, compile, filter,
//! truncate. [`Catalogue`] holds a corpus and hands out [`CardQuery`]
//! builders for repeated searches against it.
//!
//! Every call builds its own tokens, AST and predicate and only reads the
//! corpus, so a `Catalogue` can be shared across threads freely.

use std::fs;
use std::path::Path;

use crate::card::Card;
use crate::error::{LoadError, QueryResult};
use crate::parser;
use crate::predicate::{compile_query, Predicate};
use crate::transpiler::{select_sql, SqlQuery};

/// Compile a query string to a predicate.
pub fn compile_str(query: &str) -> QueryResult<Predicate> {
    let ast = parser::parse(query)?;
    let predicate = compile_query(&ast);
    tracing::trace!(%ast, %predicate, "compiled query");
    Ok(predicate)
}

/// Filter `corpus` by `query`, keeping corpus order, returning at most
/// `limit` cards.
///
/// # Example
///
/// ```
/// use cardql::card::Card;
/// use cardql::search;
///
/// let corpus = vec![
///     Card::new("1", "Raging Goblin").with_type("Creature").with_keyword("Haste"),
///     Card::new("2", "Opt").with_type("Instant").with_colors("U"),
/// ];
/// let hits = search("t:creature k:haste", 10, &corpus).unwrap();
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].name, "Raging Goblin");
/// ```
pub fn search<'a>(query: &str, limit: usize, corpus: &'a [Card]) -> QueryResult<Vec<&'a Card>> {
    let predicate = compile_str(query)?;
    let hits: Vec<&Card> = corpus
        .iter()
        .filter(|card| predicate.matches(card))
        .take(limit)
        .collect();
    tracing::debug!(query, limit, corpus = corpus.len(), returned = hits.len(), "search complete");
    Ok(hits)
}

/// An in-memory card corpus.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    cards: Vec<Card>,
}

impl Catalogue {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Load a JSON array of cards.
    ///
    /// Color letters are upper-cased. A letter outside WUBRG is an error; a
    /// color identity that does not cover the colors is only logged.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let catalogue = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), cards = catalogue.len(), "loaded corpus");
        Ok(catalogue)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        let mut cards: Vec<Card> = serde_json::from_str(raw)?;
        for card in &mut cards {
            normalize(card)?;
        }
        Ok(Self::new(cards))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Start a query against this catalogue.
    pub fn query<'a>(&'a self, query: &str) -> CardQuery<'a> {
        CardQuery {
            catalogue: self,
            query: query.to_string(),
            limit: None,
        }
    }
}

fn normalize(card: &mut Card) -> Result<(), LoadError> {
    card.colors = card.colors.normalized();
    card.color_identity = card.color_identity.normalized();

    for set in [&card.colors, &card.color_identity] {
        if let Some(color) = set.non_canonical().next() {
            return Err(LoadError::InvalidColor {
                card: card.name.clone(),
                color,
            });
        }
    }
    if !card.color_identity.is_superset(&card.colors) {
        tracing::warn!(
            card = %card.name,
            colors = %card.colors,
            identity = %card.color_identity,
            "color identity does not cover colors"
        );
    }
    Ok(())
}

/// A query against a [`Catalogue`].
///
/// ```
/// use cardql::card::Card;
/// use cardql::engine::Catalogue;
///
/// let catalogue = Catalogue::new(vec![
///     Card::new("1", "Llanowar Elves").with_type("Creature — Elf Druid").with_colors("G"),
///     Card::new("2", "Elvish Mystic").with_type("Creature — Elf Druid").with_colors("G"),
/// ]);
/// let first = catalogue.query("t:elf").limit(1).fetch_all().unwrap();
/// assert_eq!(first.len(), 1);
/// assert_eq!(catalogue.query("t:elf").count().unwrap(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CardQuery<'a> {
    catalogue: &'a Catalogue,
    query: String,
    limit: Option<usize>,
}

impl<'a> CardQuery<'a> {
    /// Cap the number of returned cards.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The compiled predicate, without running it.
    pub fn predicate(&self) -> QueryResult<Predicate> {
        compile_str(&self.query)
    }

    /// The equivalent SQL for a `cards` table.
    pub fn sql(&self) -> QueryResult<SqlQuery> {
        Ok(select_sql(&self.predicate()?, self.limit))
    }

    /// Matching cards in corpus order, truncated to the limit.
    pub fn fetch_all(&self) -> QueryResult<Vec<&'a Card>> {
        search(
            &self.query,
            self.limit.unwrap_or(usize::MAX),
            self.catalogue.cards(),
        )
    }

    /// Number of matching cards, ignoring the limit.
    pub fn count(&self) -> QueryResult<usize> {
        let predicate = self.predicate()?;
        Ok(self
            .catalogue
            .cards()
            .iter()
            .filter(|card| predicate.matches(card))
            .count())
    }
}
