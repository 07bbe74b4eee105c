//! Command-line arguments.

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use gestion_lib::api::Resource;
use gestion_lib::grid::Density;
use gestion_lib::grid::Filter;
use gestion_lib::grid::FilterOperator;
use gestion_lib::grid::GroupBy;
use gestion_lib::grid::SortConfig;
use gestion_lib::model::Value;

#[derive(Debug, Parser)]
#[command(name = "gestion", version, about = "Back-office data grid")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show rows through the grid
    View(ViewArgs),
    /// Write the grid's rows as CSV or JSON
    Export(ExportArgs),
    /// Manage stored grid preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),
    /// Print notifications as they arrive
    Listen(ListenArgs),
}

/// Where rows come from.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// JSON file holding an array of objects (or a `{ "data": [...] }` envelope)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// REST collection, e.g. `factures`
    #[arg(long)]
    pub resource: Option<String>,
}

impl SourceArgs {
    pub fn resource(&self) -> Option<Resource> {
        self.resource.as_deref().and_then(|r| r.parse().ok())
    }
}

/// Grid state shared by `view` and `export`.
#[derive(Debug, Args)]
pub struct GridArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Preference key; restores and saves the grid's state under this id
    #[arg(long)]
    pub grid: Option<String>,

    /// Visible columns in order, comma separated
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Free-text search over visible columns
    #[arg(short, long)]
    pub search: Option<String>,

    /// Structured filter `key:operator:value` (repeatable)
    ///
    /// Operators: equals, contains, startsWith, endsWith, greaterThan,
    /// lessThan, between (`low,high`), in (`a,b,c`). Quote a value to
    /// compare it as text: `cp:equals:"69001"`.
    #[arg(short, long = "filter", value_parser = parse_filter)]
    pub filters: Vec<Filter>,

    /// Sort column, `key` or `key:desc`
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortConfig>,

    /// Group column, or `none`
    #[arg(long, value_parser = parse_group)]
    pub group: Option<GroupBy>,

    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Row spacing: compact, normal or comfortable
    #[arg(long)]
    pub density: Option<Density>,

    /// Ask the server for one page at a time (with --resource)
    #[arg(long)]
    pub server_paging: bool,

    /// Store the resulting state under --grid
    #[arg(long, requires = "grid")]
    pub save: bool,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Show every group's rows without expanding them
    #[arg(long)]
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    /// Every filtered, sorted row
    All,
    /// The current page only
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DelimiterArg {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Output file; standard output if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    #[arg(long, value_enum, default_value_t = Scope::All)]
    pub scope: Scope,

    #[arg(long, value_enum, default_value_t = DelimiterArg::Comma)]
    pub delimiter: DelimiterArg,

    /// Leave out the header line
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// List grids with stored preferences
    List,
    /// Print a grid's stored preferences
    Show { grid: String },
    /// Delete a grid's stored preferences
    Reset { grid: String },
    /// Store the API token used when GESTION_TOKEN is unset
    SetToken { token: String },
}

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// WebSocket URL; defaults to GESTION_WS_URL
    #[arg(long)]
    pub url: Option<String>,

    /// Message to send once connected (repeatable)
    #[arg(long)]
    pub send: Vec<String>,

    /// Reconnect attempts before giving up
    #[arg(long, default_value_t = 5)]
    pub max_attempts: u32,
}

/// Reads a literal: integer, float, boolean, `null`, else text.
///
/// Double quotes force text (`"69001"`), and so do leading zeros (`007`),
/// so codes stored as strings can still be matched exactly.
pub fn parse_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::String(inner.to_string());
    }
    if has_leading_zero(trimmed) {
        return Value::String(trimmed.to_string());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>()
        && f.is_finite()
    {
        return Value::Float(f);
    }
    match trimmed {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(raw.to_string()),
    }
}

/// `007` or `-01`, but not `0` or `0.5`.
fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s).as_bytes();
    digits.len() > 1 && digits[0] == b'0' && digits[1].is_ascii_digit()
}

pub fn parse_filter(raw: &str) -> Result<Filter, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(key), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected key:operator:value, got '{}'", raw));
    };
    if key.is_empty() {
        return Err("filter key is empty".into());
    }
    let operator: FilterOperator = op.parse()?;
    Ok(match operator {
        FilterOperator::Between => {
            let Some((low, high)) = value.split_once(',') else {
                return Err(format!("between expects 'low,high', got '{}'", value));
            };
            Filter::between(key, parse_value(low), parse_value(high))
        }
        FilterOperator::In => Filter::one_of(key, value.split(',').map(parse_value)),
        other => Filter::new(key, other, parse_value(value)),
    })
}

pub fn parse_sort(raw: &str) -> Result<SortConfig, String> {
    match raw.rsplit_once(':') {
        Some((key, "desc")) => Ok(SortConfig::desc(key)),
        Some((key, "asc")) => Ok(SortConfig::asc(key)),
        Some((_, dir)) => Err(format!("unknown sort direction '{}'", dir)),
        None if raw.is_empty() => Err("sort key is empty".into()),
        None => Ok(SortConfig::asc(raw)),
    }
}

pub fn parse_group(raw: &str) -> Result<GroupBy, String> {
    Ok(GroupBy::parse(raw))
}

#[cfg(test)]
mod tests {
    use gestion_lib::model::Row;

    use super::*;

    #[test]
    fn test_parse_value_literals() {
        assert_eq!(parse_value("42"), Value::Int(42));
        assert_eq!(parse_value("4.5"), Value::Float(4.5));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("Lyon"), Value::String("Lyon".into()));
        assert_eq!(parse_value("NaN"), Value::String("NaN".into()));
        assert_eq!(parse_value("0"), Value::Int(0));
        assert_eq!(parse_value("0.5"), Value::Float(0.5));
    }

    #[test]
    fn test_parse_value_keeps_codes_as_text() {
        assert_eq!(parse_value("\"69001\""), Value::String("69001".into()));
        assert_eq!(parse_value("007"), Value::String("007".into()));
        assert_eq!(parse_value("-01"), Value::String("-01".into()));
        assert_eq!(parse_value("\"\""), Value::String(String::new()));

        let f = parse_filter("cp:equals:\"69001\"").unwrap();
        assert!(f.matches(&Row::new(1).set("cp", "69001")));
        assert!(!f.matches(&Row::new(2).set("cp", 69001)));

        let f = parse_filter("numero:in:007,\"12\"").unwrap();
        assert_eq!(f, Filter::one_of("numero", ["007", "12"]));
    }

    #[test]
    fn test_parse_filter_forms() {
        let f = parse_filter("statut:equals:payée").unwrap();
        assert_eq!(f, Filter::equals("statut", "payée"));

        let f = parse_filter("montant:between:100,500").unwrap();
        assert_eq!(f, Filter::between("montant", 100, 500));

        let f = parse_filter("ville:in:Lyon,Paris").unwrap();
        assert_eq!(f, Filter::one_of("ville", ["Lyon", "Paris"]));

        let f = parse_filter("url:contains:http://x").unwrap();
        assert_eq!(f, Filter::contains("url", "http://x"));

        assert!(parse_filter("statut:equals").is_err());
        assert!(parse_filter("statut:like:x").is_err());
        assert!(parse_filter("montant:between:100").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("date").unwrap(), SortConfig::asc("date"));
        assert_eq!(parse_sort("date:desc").unwrap(), SortConfig::desc("date"));
        assert!(parse_sort("date:sideways").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "gestion", "view", "--file", "f.json", "--columns", "nom,ville", "-f",
            "ville:equals:Lyon", "--sort", "nom:desc", "--page-size", "25",
        ])
        .unwrap();
        let Command::View(args) = cli.command else {
            panic!("expected view");
        };
        assert_eq!(args.grid.columns, ["nom", "ville"]);
        assert_eq!(args.grid.filters.len(), 1);
        assert_eq!(args.grid.page_size, Some(25));

        assert!(Cli::try_parse_from(["gestion", "view"]).is_err());
        assert!(
            Cli::try_parse_from(["gestion", "view", "--file", "a", "--resource", "clients"]).is_err()
        );
    }
}
