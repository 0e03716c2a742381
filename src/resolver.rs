//! Field resolution.
//!
//! Maps a [`FieldTerm`] onto a [`Predicate`] over one card attribute. Every
//! alias resolves to a single [`Field`] variant; the exhaustive match in
//! [`resolve`] is where per-field operator rules live.
//!
//! Anything unrecognised (field name, operator, numeric value, format name)
//! resolves to `None` so a partly misspelled query still runs.
//!
//! | Field          | Aliases                                  |
//! |----------------|------------------------------------------|
//! | name           | `n`, `name`                              |
//! | type           | `t`, `type`                              |
//! | oracle text    | `o`, `oracle`                            |
//! | colors         | `c`, `color`, `colors`                   |
//! | color identity | `ci`, `id`, `identity`, `color_identity` |
//! | mana value     | `cmc`, `mv`, `manavalue`                 |
//! | mana cost      | `m`, `mana`                              |
//! | keyword        | `k`, `kw`, `keyword`                     |
//! | legal in       | `f`, `format`                            |
//! | banned in      | `banned`                                 |
//! | restricted in  | `restricted`                             |

use crate::ast::FieldTerm;
use crate::card::{Card, ColorAttr, Legality, TextAttr};
use crate::colors::parse_color_set;
use crate::predicate::{Comparison, Parity, Predicate, SetRelation, Test};

/// Canonical searchable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Type,
    Oracle,
    Colors,
    ColorIdentity,
    ManaValue,
    ManaCost,
    Keyword,
    FormatLegal,
    FormatBanned,
    FormatRestricted,
}

/// Alias → field lookup table.
pub const FIELD_ALIASES: &[(&str, Field)] = &[
    ("n", Field::Name),
    ("name", Field::Name),
    ("t", Field::Type),
    ("type", Field::Type),
    ("o", Field::Oracle),
    ("oracle", Field::Oracle),
    ("c", Field::Colors),
    ("color", Field::Colors),
    ("colors", Field::Colors),
    ("ci", Field::ColorIdentity),
    ("id", Field::ColorIdentity),
    ("identity", Field::ColorIdentity),
    ("color_identity", Field::ColorIdentity),
    ("cmc", Field::ManaValue),
    ("mv", Field::ManaValue),
    ("manavalue", Field::ManaValue),
    ("m", Field::ManaCost),
    ("mana", Field::ManaCost),
    ("k", Field::Keyword),
    ("kw", Field::Keyword),
    ("keyword", Field::Keyword),
    ("f", Field::FormatLegal),
    ("format", Field::FormatLegal),
    ("banned", Field::FormatBanned),
    ("restricted", Field::FormatRestricted),
];

/// Format names a legality lookup may use.
pub const FORMATS: &[&str] = &[
    "standard",
    "future",
    "historic",
    "timeless",
    "gladiator",
    "pioneer",
    "explorer",
    "modern",
    "legacy",
    "pauper",
    "vintage",
    "penny",
    "commander",
    "oathbreaker",
    "standardbrawl",
    "brawl",
    "alchemy",
    "paupercommander",
    "duel",
    "oldschool",
    "premodern",
    "predh",
];

impl Field {
    /// Look up a field by any of its aliases, case-insensitively.
    pub fn from_alias(name: &str) -> Option<Field> {
        FIELD_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, field)| *field)
    }

    /// All aliases of this field, in table order.
    pub fn aliases(self) -> impl Iterator<Item = &'static str> {
        FIELD_ALIASES
            .iter()
            .filter(move |(_, field)| *field == self)
            .map(|(alias, _)| *alias)
    }
}

/// A comparison operator as written in a field term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// No operator: the field's default test.
    Default,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    /// Parse the operator characters of a term. `!` is a synonym of `!=`.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        let op = match symbol {
            "" => Operator::Default,
            "=" => Operator::Eq,
            "!=" | "!" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            _ => return None,
        };
        Some(op)
    }

    fn comparison(self) -> Comparison {
        match self {
            Operator::Default | Operator::Eq => Comparison::Eq,
            Operator::Ne => Comparison::Ne,
            Operator::Lt => Comparison::Lt,
            Operator::Le => Comparison::Le,
            Operator::Gt => Comparison::Gt,
            Operator::Ge => Comparison::Ge,
        }
    }
}

/// Return the allow-listed spelling of a format name.
pub fn canonical_format(name: &str) -> Option<&'static str> {
    FORMATS
        .iter()
        .find(|format| format.eq_ignore_ascii_case(name.trim()))
        .copied()
}

/// Resolve a field term to a predicate, or `None` for no opinion.
pub fn resolve(term: &FieldTerm) -> Option<Predicate> {
    let Some(field) = Field::from_alias(&term.name) else {
        tracing::debug!(field = %term.name, "unknown field ignored");
        return None;
    };
    let Some(op) = Operator::from_symbol(&term.op) else {
        tracing::debug!(field = %term.name, op = %term.op, "unknown operator ignored");
        return None;
    };

    let value = term.value.as_str();
    let resolved = match field {
        Field::Name => contains(TextAttr::Name, op, value),
        Field::Type => contains(TextAttr::TypeLine, op, value),
        Field::Oracle => contains(TextAttr::OracleText, op, value),
        Field::ManaCost => contains(TextAttr::ManaCost, op, value),
        Field::ManaValue => mana_value(op, value),
        Field::Colors => colors(ColorAttr::Colors, op, value),
        Field::ColorIdentity => colors(ColorAttr::ColorIdentity, op, value),
        Field::Keyword => equality(op, Test::Keyword(value.trim().to_lowercase())),
        Field::FormatLegal => legality(op, value, Legality::Legal),
        Field::FormatBanned => legality(op, value, Legality::Banned),
        Field::FormatRestricted => legality(op, value, Legality::Restricted),
    };

    if resolved.is_none() {
        tracing::debug!(term = %term, "field term has no opinion");
    }
    resolved
}

/// Evaluate one field term against one card. `None` means no opinion.
pub fn resolve_field(term: &FieldTerm, card: &Card) -> Option<bool> {
    resolve(term).map(|predicate| predicate.matches(card))
}

/// Fields without an ordering only support "is" and "is not".
fn equality(op: Operator, test: Test) -> Option<Predicate> {
    match op {
        Operator::Default | Operator::Eq => Some(test.into()),
        Operator::Ne => Some(Predicate::negate(test.into())),
        Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => None,
    }
}

fn contains(attr: TextAttr, op: Operator, value: &str) -> Option<Predicate> {
    equality(
        op,
        Test::Contains {
            attr,
            needle: value.to_lowercase(),
        },
    )
}

fn mana_value(op: Operator, value: &str) -> Option<Predicate> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("even") {
        return Some(Test::Parity(Parity::Even).into());
    }
    if value.eq_ignore_ascii_case("odd") {
        return Some(Test::Parity(Parity::Odd).into());
    }
    let value: i64 = value.parse().ok()?;
    Some(
        Test::ManaValue {
            op: op.comparison(),
            value,
        }
        .into(),
    )
}

fn colors(attr: ColorAttr, op: Operator, value: &str) -> Option<Predicate> {
    let target = parse_color_set(value);

    if target.is_colorless_marker() {
        return Some(marker(op, Test::Colorless(attr)));
    }
    if target.is_multicolor_marker() {
        return Some(marker(op, Test::Multicolor(attr)));
    }

    let target = target.without_markers();
    let (relation, negated) = match op {
        Operator::Default => (SetRelation::Intersects, false),
        Operator::Eq => (SetRelation::Equal, false),
        Operator::Ne => (SetRelation::Equal, true),
        Operator::Le => (SetRelation::Subset, false),
        Operator::Ge => (SetRelation::Superset, false),
        Operator::Lt => (SetRelation::ProperSubset, false),
        Operator::Gt => (SetRelation::ProperSuperset, false),
    };
    let test: Predicate = Test::Colors {
        attr,
        relation,
        target,
    }
    .into();
    Some(if negated { Predicate::negate(test) } else { test })
}

// `C` and `M` are properties of the card's set, not members of it.
fn marker(op: Operator, test: Test) -> Predicate {
    match op {
        Operator::Ne => Predicate::negate(test.into()),
        _ => test.into(),
    }
}

fn legality(op: Operator, value: &str, status: Legality) -> Option<Predicate> {
    let Some(format) = canonical_format(value) else {
        tracing::debug!(format = %value, "format not in allow-list");
        return None;
    };
    equality(op, Test::Legality { format, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::parser::parse;

    fn term(query: &str) -> FieldTerm {
        match parse(query).unwrap() {
            Node::Field(term) => term,
            other => panic!("expected field, got {other:?}"),
        }
    }

    fn check(query: &str, card: &Card) -> Option<bool> {
        resolve_field(&term(query), card)
    }

    fn azorius_angel() -> Card {
        Card::new("a", "Lyra Dawnbringer")
            .with_type("Legendary Creature — Angel")
            .with_mana_cost("{3}{W}{W}", 5)
            .with_colors("W")
            .with_identity("WU")
            .with_keyword("Flying")
            .with_keyword("Lifelink")
            .with_oracle("Flying, first strike, lifelink")
            .with_legality("modern", Legality::Legal)
            .with_legality("standard", Legality::NotLegal)
            .with_legality("vintage", Legality::Restricted)
            .with_legality("pauper", Legality::Banned)
    }

    #[test]
    fn test_every_alias_resolves() {
        for (alias, field) in FIELD_ALIASES {
            assert_eq!(Field::from_alias(alias), Some(*field));
            assert_eq!(Field::from_alias(&alias.to_uppercase()), Some(*field));
        }
        assert_eq!(Field::from_alias("zzz"), None);
        assert_eq!(
            Field::ColorIdentity.aliases().collect::<Vec<_>>(),
            vec!["ci", "id", "identity", "color_identity"]
        );
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::from_symbol(""), Some(Operator::Default));
        assert_eq!(Operator::from_symbol("!"), Some(Operator::Ne));
        assert_eq!(Operator::from_symbol("!="), Some(Operator::Ne));
        assert_eq!(Operator::from_symbol("=<"), None);
        assert_eq!(Operator::from_symbol("<>"), None);
    }

    #[test]
    fn test_text_fields() {
        let card = azorius_angel();
        assert_eq!(check("n:lyra", &card), Some(true));
        assert_eq!(check("name:DAWN", &card), Some(true));
        assert_eq!(check("t:angel", &card), Some(true));
        assert_eq!(check("type:demon", &card), Some(false));
        assert_eq!(check(r#"o:"first strike""#, &card), Some(true));
        assert_eq!(check("oracle:deathtouch", &card), Some(false));
        assert_eq!(check("t!=:angel", &card), Some(false));
        assert_eq!(check("t>:angel", &card), None);
    }

    #[test]
    fn test_missing_oracle_text_never_contains() {
        let card = Card::new("v", "Vanilla");
        assert_eq!(check("o:anything", &card), Some(false));
        assert_eq!(check("m:{g}", &card), Some(false));
    }

    #[test]
    fn test_mana_cost_substring() {
        let card = azorius_angel();
        assert_eq!(check("m:{w}{w}", &card), Some(true));
        assert_eq!(check("mana:{3}", &card), Some(true));
        assert_eq!(check("m:{u}", &card), Some(false));
    }

    #[test]
    fn test_mana_value_comparisons() {
        let card = azorius_angel();
        assert_eq!(check("cmc:5", &card), Some(true));
        assert_eq!(check("cmc=:5", &card), Some(true));
        assert_eq!(check("mv>=:5", &card), Some(true));
        assert_eq!(check("mv>:5", &card), Some(false));
        assert_eq!(check("manavalue<:6", &card), Some(true));
        assert_eq!(check("cmc<=:4", &card), Some(false));
        assert_eq!(check("cmc!=:5", &card), Some(false));
        assert_eq!(check("cmc!:4", &card), Some(true));
    }

    #[test]
    fn test_mana_value_parity_ignores_operator() {
        let card = azorius_angel();
        assert_eq!(check("cmc:odd", &card), Some(true));
        assert_eq!(check("cmc:EVEN", &card), Some(false));
        assert_eq!(check("cmc>=:even", &card), Some(false));
    }

    #[test]
    fn test_mana_value_not_a_number() {
        assert_eq!(check("cmc:five", &azorius_angel()), None);
    }

    #[test]
    fn test_absent_mana_value() {
        let land = Card::new("l", "Island").with_type("Basic Land — Island");
        assert_eq!(check("cmc:0", &land), Some(false));
        assert_eq!(check("cmc:even", &land), Some(false));
        assert_eq!(check("cmc:odd", &land), Some(false));
    }

    #[test]
    fn test_color_operators() {
        let card = azorius_angel();
        assert_eq!(check("c:w", &card), Some(true));
        assert_eq!(check("c:wu", &card), Some(true));
        assert_eq!(check("c:u", &card), Some(false));
        assert_eq!(check("c=:w", &card), Some(true));
        assert_eq!(check("c=:wu", &card), Some(false));
        assert_eq!(check("c!=:wu", &card), Some(true));
        assert_eq!(check("c!:w", &card), Some(false));
        assert_eq!(check("c<=:azorius", &card), Some(true));
        assert_eq!(check("c<:w", &card), Some(false));
        assert_eq!(check("c<:azorius", &card), Some(true));
        assert_eq!(check("c>=:w", &card), Some(true));
        assert_eq!(check("c>=:wu", &card), Some(false));
        assert_eq!(check("c>:white", &card), Some(false));
    }

    #[test]
    fn test_color_identity_uses_identity() {
        let card = azorius_angel();
        assert_eq!(check("ci=:azorius", &card), Some(true));
        assert_eq!(check("id:u", &card), Some(true));
        assert_eq!(check("identity>=:wu", &card), Some(true));
        assert_eq!(check("color_identity<=:esper", &card), Some(true));
        assert_eq!(check("ci<=:w", &card), Some(false));
    }

    #[test]
    fn test_colorless_and_multicolor_markers() {
        let artifact = Card::new("s", "Sol Ring").with_type("Artifact");
        let angel = azorius_angel();

        assert_eq!(check("c:colorless", &artifact), Some(true));
        assert_eq!(check("c:c", &angel), Some(false));
        assert_eq!(check("c!=:c", &angel), Some(true));
        assert_eq!(check("c:m", &angel), Some(false));
        assert_eq!(check("ci:multicolor", &angel), Some(true));
        assert_eq!(check("ci:m", &artifact), Some(false));
    }

    #[test]
    fn test_empty_color_set_subset_of_anything() {
        let artifact = Card::new("s", "Sol Ring");
        assert_eq!(check("c<=:r", &artifact), Some(true));
        assert_eq!(check("c<=:esper", &artifact), Some(true));
        assert_eq!(check("c>=:", &azorius_angel()), Some(true));
        assert_eq!(check("c>=:", &artifact), Some(true));
    }

    #[test]
    fn test_keywords_exact_match() {
        let card = azorius_angel();
        assert_eq!(check("k:flying", &card), Some(true));
        assert_eq!(check("kw:LIFELINK", &card), Some(true));
        assert_eq!(check("keyword:fly", &card), Some(false));
        assert_eq!(check("k!=:flying", &card), Some(false));
    }

    #[test]
    fn test_format_legality() {
        let card = azorius_angel();
        assert_eq!(check("f:modern", &card), Some(true));
        assert_eq!(check("format:Standard", &card), Some(false));
        assert_eq!(check("f:legacy", &card), Some(false));
        assert_eq!(check("banned:pauper", &card), Some(true));
        assert_eq!(check("banned:modern", &card), Some(false));
        assert_eq!(check("restricted:vintage", &card), Some(true));
        assert_eq!(check("f!=:modern", &card), Some(false));
    }

    #[test]
    fn test_unknown_format_has_no_opinion() {
        let card = azorius_angel();
        assert_eq!(check("f:modern'--", &card), None);
        assert_eq!(check("banned:notaformat", &card), None);
        assert_eq!(canonical_format("MODERN"), Some("modern"));
    }

    #[test]
    fn test_unknown_field_has_no_opinion() {
        assert_eq!(check("zzz:foo", &azorius_angel()), None);
        assert_eq!(check("power>=:3", &azorius_angel()), None);
    }
}
