//! Card records the query engine filters.
//!
//! A [`Card`] is one rules-text identity: name, cost, type line, oracle text,
//! colors, keywords and per-format legality. The engine only reads cards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::colors::ColorSet;

/// Legality of a card in one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Legality {
    Legal,
    NotLegal,
    Restricted,
    Banned,
}

impl Legality {
    pub fn as_str(self) -> &'static str {
        match self {
            Legality::Legal => "legal",
            Legality::NotLegal => "not_legal",
            Legality::Restricted => "restricted",
            Legality::Banned => "banned",
        }
    }
}

impl fmt::Display for Legality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which text attribute of a card a test reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAttr {
    Name,
    TypeLine,
    OracleText,
    ManaCost,
}

/// Which color attribute of a card a test reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorAttr {
    Colors,
    ColorIdentity,
}

/// A card record.
///
/// ## Example
///
/// ```
/// use cardql::card::Card;
///
/// let bolt = Card::new("bolt", "Lightning Bolt")
///     .with_type("Instant")
///     .with_mana_cost("{R}", 1)
///     .with_colors("R");
///
/// assert_eq!(bolt.mana_value, Some(1));
/// assert!(bolt.colors.contains('R'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default, alias = "cmc", deserialize_with = "de_mana_value")]
    pub mana_value: Option<u32>,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: ColorSet,
    #[serde(default)]
    pub color_identity: ColorSet,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub legalities: BTreeMap<String, Legality>,
}

impl Card {
    /// A colorless card with no cost, text, keywords or legalities.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mana_cost: None,
            mana_value: None,
            type_line: String::new(),
            oracle_text: None,
            colors: ColorSet::new(),
            color_identity: ColorSet::new(),
            keywords: Vec::new(),
            legalities: BTreeMap::new(),
        }
    }

    pub fn with_type(mut self, type_line: impl Into<String>) -> Self {
        self.type_line = type_line.into();
        self
    }

    pub fn with_mana_cost(mut self, cost: impl Into<String>, mana_value: u32) -> Self {
        self.mana_cost = Some(cost.into());
        self.mana_value = Some(mana_value);
        self
    }

    pub fn with_mana_value(mut self, mana_value: u32) -> Self {
        self.mana_value = Some(mana_value);
        self
    }

    pub fn with_oracle(mut self, text: impl Into<String>) -> Self {
        self.oracle_text = Some(text.into());
        self
    }

    /// Set colors; the color identity grows to include them.
    pub fn with_colors(mut self, letters: &str) -> Self {
        self.colors = ColorSet::from_letters(letters);
        for c in self.colors.iter() {
            self.color_identity.insert(c);
        }
        self
    }

    /// Set color identity; existing colors are kept in it.
    pub fn with_identity(mut self, letters: &str) -> Self {
        self.color_identity = ColorSet::from_letters(letters);
        for c in self.colors.iter() {
            self.color_identity.insert(c);
        }
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn with_legality(mut self, format: impl Into<String>, legality: Legality) -> Self {
        self.legalities.insert(format.into(), legality);
        self
    }

    /// Text attribute, `None` when the card has none.
    pub fn text(&self, attr: TextAttr) -> Option<&str> {
        match attr {
            TextAttr::Name => Some(&self.name),
            TextAttr::TypeLine => Some(&self.type_line),
            TextAttr::OracleText => self.oracle_text.as_deref(),
            TextAttr::ManaCost => self.mana_cost.as_deref(),
        }
    }

    pub fn color_set(&self, attr: ColorAttr) -> &ColorSet {
        match attr {
            ColorAttr::Colors => &self.colors,
            ColorAttr::ColorIdentity => &self.color_identity,
        }
    }

    pub fn legality(&self, format: &str) -> Option<Legality> {
        self.legalities.get(format).copied()
    }
}

/// Accepts integers and integral floats (`3` or `3.0`).
fn de_mana_value<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if raw < 0.0 || raw.fract() != 0.0 || raw > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!("invalid mana value: {raw}")));
    }
    Ok(Some(raw as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_identity_superset() {
        let card = Card::new("1", "Watery Grave Walker")
            .with_colors("U")
            .with_identity("B");
        assert_eq!(card.color_identity, ColorSet::from_letters("UB"));
        assert!(card.color_identity.is_superset(&card.colors));
    }

    #[test]
    fn test_deserialize_record() {
        let json = r#"{
            "id": "abc",
            "name": "Counterspell",
            "mana_cost": "{U}{U}",
            "cmc": 2.0,
            "type_line": "Instant",
            "oracle_text": "Counter target spell.",
            "colors": ["U"],
            "color_identity": ["U"],
            "keywords": [],
            "legalities": {"modern": "not_legal", "legacy": "legal"}
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.mana_value, Some(2));
        assert_eq!(card.legality("legacy"), Some(Legality::Legal));
        assert_eq!(card.legality("modern"), Some(Legality::NotLegal));
        assert_eq!(card.legality("vintage"), None);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let card: Card = serde_json::from_str(r#"{"id": "x", "name": "Island"}"#).unwrap();
        assert_eq!(card.mana_value, None);
        assert!(card.colors.is_empty());
        assert_eq!(card.text(TextAttr::OracleText), None);
    }

    #[test]
    fn test_fractional_mana_value_rejected() {
        let err = serde_json::from_str::<Card>(r#"{"id": "x", "name": "Half", "cmc": 0.5}"#);
        assert!(err.is_err());
    }
}
