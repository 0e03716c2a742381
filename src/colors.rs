//! Color vocabulary.
//!
//! Maps color names and named multi-color combinations onto canonical
//! [`ColorSet`]s. Two pseudo-colors exist only in queries: `C` (colorless)
//! and `M` (multicolor). They are never members of a card's color set.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker for "has no colors".
pub const COLORLESS: char = 'C';
/// Marker for "has more than one color".
pub const MULTICOLOR: char = 'M';
/// The five canonical color letters, in display order.
pub const WUBRG: [char; 5] = ['W', 'U', 'B', 'R', 'G'];

/// Which family a named color expression belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorGroup {
    Mono,
    Guild,
    Shard,
    Wedge,
    FourColor,
    College,
    Pseudo,
}

impl fmt::Display for ColorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColorGroup::Mono => "color",
            ColorGroup::Guild => "guild",
            ColorGroup::Shard => "shard",
            ColorGroup::Wedge => "wedge",
            ColorGroup::FourColor => "four-color",
            ColorGroup::College => "college",
            ColorGroup::Pseudo => "pseudo",
        };
        f.write_str(label)
    }
}

/// Every color name the query language understands.
pub const NAMED_COLORS: &[(&str, &str, ColorGroup)] = &[
    ("white", "W", ColorGroup::Mono),
    ("blue", "U", ColorGroup::Mono),
    ("black", "B", ColorGroup::Mono),
    ("red", "R", ColorGroup::Mono),
    ("green", "G", ColorGroup::Mono),
    ("azorius", "WU", ColorGroup::Guild),
    ("dimir", "UB", ColorGroup::Guild),
    ("rakdos", "BR", ColorGroup::Guild),
    ("gruul", "RG", ColorGroup::Guild),
    ("selesnya", "GW", ColorGroup::Guild),
    ("orzhov", "WB", ColorGroup::Guild),
    ("izzet", "UR", ColorGroup::Guild),
    ("golgari", "BG", ColorGroup::Guild),
    ("boros", "RW", ColorGroup::Guild),
    ("simic", "GU", ColorGroup::Guild),
    ("bant", "GWU", ColorGroup::Shard),
    ("esper", "WUB", ColorGroup::Shard),
    ("grixis", "UBR", ColorGroup::Shard),
    ("jund", "BRG", ColorGroup::Shard),
    ("naya", "RGW", ColorGroup::Shard),
    ("abzan", "WBG", ColorGroup::Wedge),
    ("jeskai", "URW", ColorGroup::Wedge),
    ("sultai", "BGU", ColorGroup::Wedge),
    ("mardu", "RWB", ColorGroup::Wedge),
    ("temur", "GUR", ColorGroup::Wedge),
    ("chaos", "UBRG", ColorGroup::FourColor),
    ("glint", "UBRG", ColorGroup::FourColor),
    ("aggression", "WBRG", ColorGroup::FourColor),
    ("dune", "WBRG", ColorGroup::FourColor),
    ("altruism", "WURG", ColorGroup::FourColor),
    ("ink", "WURG", ColorGroup::FourColor),
    ("growth", "WUBG", ColorGroup::FourColor),
    ("witch", "WUBG", ColorGroup::FourColor),
    ("artifice", "WUBR", ColorGroup::FourColor),
    ("yore", "WUBR", ColorGroup::FourColor),
    ("silverquill", "WB", ColorGroup::College),
    ("prismari", "UR", ColorGroup::College),
    ("witherbloom", "BG", ColorGroup::College),
    ("lorehold", "RW", ColorGroup::College),
    ("quandrix", "GU", ColorGroup::College),
    ("colorless", "C", ColorGroup::Pseudo),
    ("multicolor", "M", ColorGroup::Pseudo),
];

/// A de-duplicated, order-independent set of color letters.
///
/// Iteration order is the sorted order of the letters, which is what
/// deterministic comparisons and SQL parameters use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSet(BTreeSet<char>);

impl ColorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a run of letters, upper-casing each one.
    ///
    /// ```
    /// use cardql::colors::ColorSet;
    /// assert_eq!(ColorSet::from_letters("ubu"), ColorSet::from_letters("BU"));
    /// ```
    pub fn from_letters(letters: &str) -> Self {
        letters
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(upper)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, color: char) -> bool {
        self.0.contains(&color)
    }

    pub fn insert(&mut self, color: char) -> bool {
        self.0.insert(color)
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    pub fn is_subset(&self, other: &ColorSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &ColorSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// True when the two sets share at least one color.
    pub fn intersects(&self, other: &ColorSet) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    /// True when this is exactly the colorless marker `{C}`.
    pub fn is_colorless_marker(&self) -> bool {
        self.len() == 1 && self.contains(COLORLESS)
    }

    /// True when this is exactly the multicolor marker `{M}`.
    pub fn is_multicolor_marker(&self) -> bool {
        self.len() == 1 && self.contains(MULTICOLOR)
    }

    /// The same set with the `C` and `M` markers removed.
    pub fn without_markers(&self) -> ColorSet {
        self.iter()
            .filter(|&c| c != COLORLESS && c != MULTICOLOR)
            .collect()
    }

    /// The same set with every letter upper-cased.
    pub fn normalized(&self) -> ColorSet {
        self.iter().map(upper).collect()
    }

    /// Letters that are not one of the five canonical colors.
    pub fn non_canonical(&self) -> impl Iterator<Item = char> + '_ {
        self.iter().filter(|c| !WUBRG.contains(c))
    }

    /// Letters as strings, in sorted order.
    pub fn to_letter_vec(&self) -> Vec<String> {
        self.iter().map(String::from).collect()
    }
}

impl FromIterator<char> for ColorSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ColorSet {
    /// WUBRG order first, then anything else in sorted order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in WUBRG.iter().filter(|c| self.contains(**c)) {
            write!(f, "{c}")?;
        }
        for c in self.non_canonical() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

fn upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Look up a color or combination name, case-insensitively.
pub fn named_colors(name: &str) -> Option<&'static str> {
    NAMED_COLORS
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, letters, _)| *letters)
}

/// Resolve a color expression to the set of letters it denotes.
///
/// The whole expression is tried as a name first (`esper`, `Colorless`), and
/// only then split into single letters (`wub`). Unknown letters are kept,
/// upper-cased.
///
/// ```
/// use cardql::colors::{parse_color_set, ColorSet};
/// assert_eq!(parse_color_set("Esper"), ColorSet::from_letters("WUB"));
/// assert_eq!(parse_color_set("rg"), ColorSet::from_letters("GR"));
/// ```
pub fn parse_color_set(value: &str) -> ColorSet {
    let value = value.trim();
    match named_colors(value) {
        Some(letters) => ColorSet::from_letters(letters),
        None => ColorSet::from_letters(value),
    }
}
