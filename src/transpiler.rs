//! SQL push-down for compiled predicates.
//!
//! Lowers a [`Predicate`] into a parameterised PostgreSQL `WHERE` clause so a
//! storage layer can filter without loading every card. The target table is:
//!
//! ```text
//! cards(id text, name text, mana_cost text, mana_value integer,
//!       type_line text, oracle_text text,
//!       colors text[], color_identity text[], keywords text[],
//!       legalities jsonb)
//! ```
//!
//! User-supplied values are always bound as `$n` parameters. The only
//! literals written into the SQL are column names, format names from the
//! allow-list and legality statuses.

use std::fmt;

use crate::card::{ColorAttr, TextAttr};
use crate::predicate::{Parity, Predicate, SetRelation, Test};

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    TextArray(Vec<String>),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Int(n) => write!(f, "{n}"),
            SqlParam::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            SqlParam::TextArray(items) => write!(f, "{{{}}}", items.join(",")),
        }
    }
}

/// SQL text plus its positional parameters (`$1` is `params[0]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Trait for converting compiled predicates to SQL.
pub trait ToSql {
    /// Write this node as a boolean SQL expression, binding values into
    /// `params`.
    fn write_sql(&self, params: &mut Vec<SqlParam>) -> String;

    /// Convert this node to a standalone boolean expression.
    fn to_sql(&self) -> SqlQuery {
        let mut params = Vec::new();
        let sql = self.write_sql(&mut params);
        SqlQuery { sql, params }
    }
}

/// Build `SELECT * FROM cards WHERE … LIMIT n`.
pub fn select_sql(predicate: &Predicate, limit: Option<usize>) -> SqlQuery {
    let SqlQuery { sql: clause, params } = predicate.to_sql();
    let mut sql = format!("SELECT * FROM cards WHERE {clause}");
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {n}"));
    }
    SqlQuery { sql, params }
}

fn bind(params: &mut Vec<SqlParam>, param: SqlParam) -> String {
    params.push(param);
    format!("${}", params.len())
}

/// `%needle%` with LIKE metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn text_column(attr: TextAttr) -> &'static str {
    match attr {
        TextAttr::Name => "name",
        TextAttr::TypeLine => "type_line",
        TextAttr::OracleText => "oracle_text",
        TextAttr::ManaCost => "mana_cost",
    }
}

fn color_column(attr: ColorAttr) -> &'static str {
    match attr {
        ColorAttr::Colors => "colors",
        ColorAttr::ColorIdentity => "color_identity",
    }
}

impl ToSql for Predicate {
    fn write_sql(&self, params: &mut Vec<SqlParam>) -> String {
        match self {
            Predicate::Never => "FALSE".to_string(),
            Predicate::Test(test) => test.write_sql(params),
            Predicate::Not(inner) => format!("NOT ({})", inner.write_sql(params)),
            Predicate::And(l, r) => {
                let l = l.write_sql(params);
                let r = r.write_sql(params);
                format!("({l} AND {r})")
            }
            Predicate::Or(l, r) => {
                let l = l.write_sql(params);
                let r = r.write_sql(params);
                format!("({l} OR {r})")
            }
        }
    }
}

// Tests that can hit NULL columns are wrapped in COALESCE(…, FALSE) so that
// NOT (…) matches exactly what in-process evaluation matches.
impl ToSql for Test {
    fn write_sql(&self, params: &mut Vec<SqlParam>) -> String {
        match self {
            Test::Contains { attr, needle } => {
                let p = bind(params, SqlParam::Text(like_pattern(needle)));
                format!("COALESCE({} ILIKE {p}, FALSE)", text_column(*attr))
            }
            Test::PlainText(needle) => {
                let p = bind(params, SqlParam::Text(like_pattern(needle)));
                format!(
                    "(COALESCE(name ILIKE {p}, FALSE) OR COALESCE(oracle_text ILIKE {p}, FALSE))"
                )
            }
            Test::ManaValue { op, value } => {
                let p = bind(params, SqlParam::Int(*value));
                format!("COALESCE(mana_value {} {p}, FALSE)", op.sql())
            }
            Test::Parity(parity) => {
                let remainder = match parity {
                    Parity::Even => 0,
                    Parity::Odd => 1,
                };
                format!("COALESCE(mana_value % 2 = {remainder}, FALSE)")
            }
            Test::Colors {
                attr,
                relation,
                target,
            } => {
                let col = color_column(*attr);
                let p = bind(params, SqlParam::TextArray(target.to_letter_vec()));
                match relation {
                    SetRelation::Intersects => format!("{col} && {p}::text[]"),
                    SetRelation::Equal => {
                        format!("({col} @> {p}::text[] AND {col} <@ {p}::text[])")
                    }
                    SetRelation::Subset => format!("{col} <@ {p}::text[]"),
                    SetRelation::Superset => format!("{col} @> {p}::text[]"),
                    SetRelation::ProperSubset => {
                        format!("({col} <@ {p}::text[] AND NOT {col} @> {p}::text[])")
                    }
                    SetRelation::ProperSuperset => {
                        format!("({col} @> {p}::text[] AND NOT {col} <@ {p}::text[])")
                    }
                }
            }
            Test::Colorless(attr) => format!("cardinality({}) = 0", color_column(*attr)),
            Test::Multicolor(attr) => format!("cardinality({}) > 1", color_column(*attr)),
            Test::Keyword(keyword) => {
                let p = bind(params, SqlParam::Text(keyword.clone()));
                format!("EXISTS (SELECT 1 FROM unnest(keywords) _kw WHERE lower(_kw) = {p})")
            }
            Test::Legality { format, status } => {
                format!(
                    "COALESCE(legalities ->> '{format}' = '{}', FALSE)",
                    status.as_str()
                )
            }
        }
    }
}
