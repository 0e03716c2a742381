//! cardql — card search from the command line
//!
//! # Usage
//!
//! ```bash
//! # Search a corpus
//! cardql "t:creature k:haste" --corpus cards.json
//!
//! # A single word that is also a command name
//! cardql search explain --corpus cards.json
//!
//! # Show how a query is understood
//! cardql explain "ci<=:esper -t:land"
//!
//! # Reference tables
//! cardql fields
//! cardql colors
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use tracing_subscriber::EnvFilter;

use cardql::card::Card;
use cardql::colors::{parse_color_set, NAMED_COLORS};
use cardql::config::{self, Config};
use cardql::engine::Catalogue;
use cardql::error::{ParseError, QueryError};
use cardql::predicate::compile_query;
use cardql::resolver::{Field, FIELD_ALIASES};
use cardql::tokenizer::tokenize;
use cardql::transpiler::select_sql;

#[derive(Parser)]
#[command(name = "cardql")]
#[command(version)]
#[command(about = "Search a card corpus with compact field queries", long_about = None)]
#[command(after_help = "EXAMPLES:
    cardql 't:creature k:haste' --corpus cards.json
    cardql '(t:elf OR t:goblin) cmc<=:2' --limit 5
    cardql explain 'ci:esper -t:land'
    cardql search colors")]
struct Cli {
    /// The query to run. Use `cardql search <QUERY>` when it is a command name
    query: Option<String>,

    /// Card corpus (JSON array)
    #[arg(short, long, env = "CARDQL_CORPUS", global = true)]
    corpus: Option<PathBuf>,

    /// Maximum number of results
    #[arg(short, long, env = "CARDQL_LIMIT", global = true)]
    limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    format: Option<Format>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

impl From<config::OutputFormat> for Format {
    fn from(format: config::OutputFormat) -> Self {
        match format {
            config::OutputFormat::Table => Format::Table,
            config::OutputFormat::Json => Format::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query, including one spelled like a command name
    Search {
        /// The query to run
        query: String,
    },
    /// Show the tokens, syntax tree, predicate and SQL for a query
    Explain {
        /// The query to explain
        query: String,
    },
    /// Show the field reference
    Fields,
    /// Show the named color combinations
    Colors,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load().context("failed to load config")?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    match &cli.command {
        Some(Commands::Search { query }) => execute_query(query, cli, &config)?,
        Some(Commands::Explain { query }) => explain_query(query),
        Some(Commands::Fields) => show_fields(),
        Some(Commands::Colors) => show_colors(),
        None => match &cli.query {
            Some(query) => execute_query(query, cli, &config)?,
            None => {
                println!("{}", "cardql: card search queries".cyan().bold());
                println!();
                println!("Usage: cardql <QUERY> [OPTIONS]");
                println!();
                println!("Try: cardql --help");
            }
        },
    }
    Ok(())
}

fn execute_query(query: &str, cli: &Cli, config: &Config) -> Result<()> {
    let Some(path) = cli.corpus.clone().or_else(|| config.corpus.path.clone()) else {
        bail!("no corpus given. Use --corpus, set CARDQL_CORPUS or add a corpus path to cardql.toml");
    };
    let limit = cli.limit.unwrap_or(config.search.limit);
    let format = cli.format.unwrap_or_else(|| config.output.format.into());

    if cli.verbose {
        eprintln!("{} {}", "Query:".dimmed(), query.yellow());
        eprintln!("{} {}", "Corpus:".dimmed(), path.display());
    }

    let catalogue = Catalogue::from_json_file(&path)
        .with_context(|| format!("failed to load corpus {}", path.display()))?;
    let hits = catalogue
        .query(query)
        .limit(limit)
        .fetch_all()
        .inspect_err(|QueryError::Parse(e)| show_caret(query, e))?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
        Format::Table => print_table(&hits),
    }
    Ok(())
}

fn print_table(cards: &[&Card]) {
    if cards.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    let headers = ["name", "cost", "mv", "type", "colors"];
    let rows: Vec<[String; 5]> = cards
        .iter()
        .map(|card| {
            [
                card.name.clone(),
                card.mana_cost.clone().unwrap_or_default(),
                card.mana_value.map(|mv| mv.to_string()).unwrap_or_default(),
                card.type_line.clone(),
                card.colors.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(h, width)| format!("{h:width$}"))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:width$}"))
            .collect();
        println!("{}", cells.join(" │ "));
    }

    println!();
    println!("{} card(s) returned", cards.len().to_string().cyan());
}

fn show_caret(query: &str, error: &ParseError) {
    let column = query
        .char_indices()
        .take_while(|(i, _)| *i < error.position)
        .count();
    eprintln!("  {}", query.yellow());
    eprintln!("  {}{}", " ".repeat(column), "^".red().bold());
}

fn explain_query(query: &str) {
    println!("{}", "Query Explanation".cyan().bold());
    println!();
    println!("{} {}", "Query:".dimmed(), query.yellow());
    println!();

    let tokens = match tokenize(query) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{} {}", "Parse Error:".red().bold(), e);
            show_caret(query, &e);
            return;
        }
    };
    println!("{}", "Tokens:".green().bold());
    for token in &tokens {
        println!(
            "  {:>3}..{:<3} {}",
            token.span.start.to_string().dimmed(),
            token.span.end.to_string().dimmed(),
            token.to_string().white()
        );
    }
    println!();

    match cardql::parse(query) {
        Ok(ast) => {
            let predicate = compile_query(&ast);
            let sql = select_sql(&predicate, None);

            println!("{}", "Syntax Tree:".green().bold());
            println!("  {}", ast.to_string().white());
            println!();
            println!("{}", "Predicate:".green().bold());
            println!("  {}", predicate.to_string().white());
            println!();
            println!("{}", "Generated SQL:".green().bold());
            println!("  {}", sql.sql.white());
            if !sql.params.is_empty() {
                println!();
                println!("{}", "Bindings:".cyan());
                for (i, param) in sql.params.iter().enumerate() {
                    println!("  ${} = {}", i + 1, param.to_string().yellow());
                }
            }
        }
        Err(e) => {
            eprintln!("{} {}", "Parse Error:".red().bold(), e);
            show_caret(query, &e);
        }
    }
}

fn operators(field: Field) -> &'static str {
    match field {
        Field::Colors | Field::ColorIdentity => ": = != ! < <= > >=",
        Field::ManaValue => ": = != ! < <= > >=  (number, even, odd)",
        _ => ": = != !",
    }
}

fn show_fields() {
    println!("{}", "Field Reference".cyan().bold());
    println!();

    let mut fields: Vec<Field> = Vec::new();
    for (_, field) in FIELD_ALIASES {
        if !fields.contains(field) {
            fields.push(*field);
        }
    }

    println!(
        "{:18} {:36} {}",
        "Field".white().bold(),
        "Aliases".white().bold(),
        "Operators".white().bold()
    );
    println!("{}", "─".repeat(80).dimmed());

    for field in fields {
        let aliases: Vec<&str> = field.aliases().collect();
        println!(
            "{:18} {:36} {}",
            format!("{field:?}").cyan().bold(),
            aliases.join(", ").yellow(),
            operators(field).dimmed()
        );
    }
}

fn show_colors() {
    println!("{}", "Named Colors".cyan().bold());
    println!();

    println!(
        "{:14} {:12} {}",
        "Name".white().bold(),
        "Group".white().bold(),
        "Colors".white().bold()
    );
    println!("{}", "─".repeat(40).dimmed());

    for (name, _, group) in NAMED_COLORS {
        println!(
            "{:14} {:12} {}",
            name.cyan(),
            group.to_string().yellow(),
            parse_color_set(name).to_string().white()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_query() {
        let cli = Cli::try_parse_from(["cardql", "t:elf c:g"]).unwrap();
        assert_eq!(cli.query.as_deref(), Some("t:elf c:g"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_search_subcommand_takes_command_names() {
        for word in ["explain", "fields", "colors", "search"] {
            let cli = Cli::try_parse_from(["cardql", "search", word, "--limit", "3"]).unwrap();
            match cli.command {
                Some(Commands::Search { query }) => assert_eq!(query, word),
                _ => panic!("expected a search for {word:?}"),
            }
            assert_eq!(cli.limit, Some(3));
        }
    }

    #[test]
    fn test_command_names_still_dispatch() {
        let cli = Cli::try_parse_from(["cardql", "explain", "t:elf"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Explain { query }) if query == "t:elf"));
        let cli = Cli::try_parse_from(["cardql", "fields"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Fields)));
    }
}
