use std::io::Write;
use std::path::PathBuf;

use cardql::config::{Config, OutputFormat, DEFAULT_LIMIT};
use cardql::engine::Catalogue;
use cardql::error::LoadError;
use pretty_assertions::assert_eq;
use tempfile::{tempdir, NamedTempFile};

const CORPUS: &str = r#"[
    {
        "id": "bolt",
        "name": "Lightning Bolt",
        "mana_cost": "{R}",
        "cmc": 1.0,
        "type_line": "Instant",
        "oracle_text": "Lightning Bolt deals 3 damage to any target.",
        "colors": ["R"],
        "color_identity": ["R"],
        "legalities": {"modern": "legal", "standard": "not_legal"}
    },
    {
        "id": "charm",
        "name": "Dimir Charm",
        "mana_value": 2,
        "type_line": "Instant",
        "colors": ["u", "b"],
        "color_identity": ["U", "B"]
    },
    {
        "id": "grave",
        "name": "Watery Grave",
        "type_line": "Land — Island Swamp",
        "color_identity": ["U", "B"]
    }
]"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_from_file() {
    let file = write_temp(
        r#"
[search]
limit = 3

[corpus]
path = "cards.json"

[output]
format = "json"
color = false
"#,
    );

    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(config.search.limit, 3);
    assert_eq!(config.corpus.path, Some(PathBuf::from("cards.json")));
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(!config.output.color);
}

#[test]
fn test_config_missing_sections_use_defaults() {
    let file = write_temp("[output]\ncolor = false\n");
    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(config.search.limit, DEFAULT_LIMIT);
    assert_eq!(config.corpus.path, None);
    assert_eq!(config.output.format, OutputFormat::Table);
}

#[test]
fn test_config_bad_format_value() {
    let file = write_temp("[output]\nformat = \"yaml\"\n");
    let err = Config::from_path(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Toml(_)));
}

#[test]
fn test_config_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let err = Config::from_path(&path).unwrap_err();
    match err {
        LoadError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_corpus_from_file() {
    let file = write_temp(CORPUS);
    let catalogue = Catalogue::from_json_file(file.path()).unwrap();
    assert_eq!(catalogue.len(), 3);

    let bolt = &catalogue.cards()[0];
    assert_eq!(bolt.mana_value, Some(1));

    let ids = |query: &str| -> Vec<String> {
        catalogue
            .query(query)
            .fetch_all()
            .unwrap()
            .into_iter()
            .map(|card| card.id.clone())
            .collect()
    };
    assert_eq!(ids("c=:ub"), vec!["charm"]);
    assert_eq!(ids("ci:dimir"), vec!["charm", "grave"]);
    assert_eq!(ids("f:modern"), vec!["bolt"]);
    assert!(ids("f:standard").is_empty());
    assert_eq!(ids("cmc:even"), vec!["charm"]);
    assert_eq!(ids("o:damage"), vec!["bolt"]);
}

#[test]
fn test_corpus_rejects_fractional_mana_value() {
    let file = write_temp(r#"[{"id": "x", "name": "Little Girl", "cmc": 0.5}]"#);
    let err = Catalogue::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
}

#[test]
fn test_corpus_rejects_invalid_json() {
    let file = write_temp("{ not json");
    assert!(matches!(
        Catalogue::from_json_file(file.path()).unwrap_err(),
        LoadError::Json(_)
    ));
}

#[test]
fn test_corpus_missing_file() {
    let dir = tempdir().unwrap();
    let err = Catalogue::from_json_file(dir.path().join("cards.json")).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
}
