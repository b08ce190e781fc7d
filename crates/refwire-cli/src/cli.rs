//! CLI argument definitions for refwire.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the query server in front of the synthetic provider |
//! | `reference` | Point-in-time values per ticker and field |
//! | `historical` | Date-indexed series between two dates |
//! | `fields-info` | Catalog entries for named fields |
//! | `fields` | Free-text field search |
//! | `fields-by-category` | Field search grouped by category |
//! | `version` | Deployment marker of a running server |
//!
//! # Examples
//!
//! ```bash
//! refwire serve --port 5555 --version-file ./version
//!
//! refwire reference --tickers "SPX Index" "SX5E Index" --fields PX_LAST NAME --pretty
//!
//! refwire historical --tickers "SPX Index" --fields PX_LAST \
//!     --start 2012-01-01 --end 2014-01-01 --extra periodicitySelection=WEEKLY
//! ```

use clap::{Args, Parser, Subcommand};
use refwire_core::parse_request_date;
use refwire_server::ServeConfig;
use time::Date;

#[derive(Debug, Parser)]
#[command(
    name = "refwire",
    author,
    version,
    about = "Reference and historical market-data query service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the query server.
    Serve(ServeConfig),
    /// Fetch point-in-time field values.
    Reference(ReferenceArgs),
    /// Fetch historical series.
    Historical(HistoricalArgs),
    /// Describe named fields.
    FieldsInfo(FieldsInfoArgs),
    /// Search the field catalog.
    Fields(SearchArgs),
    /// Search the field catalog, grouped by category.
    FieldsByCategory(SearchArgs),
    /// Print the server's deployment marker.
    Version(ConnectArgs),
}

impl Command {
    /// Connection options of query commands; `None` for `serve`.
    pub fn connect(&self) -> Option<&ConnectArgs> {
        match self {
            Self::Serve(_) => None,
            Self::Reference(args) => Some(&args.connect),
            Self::Historical(args) => Some(&args.connect),
            Self::FieldsInfo(args) => Some(&args.connect),
            Self::Fields(args) | Self::FieldsByCategory(args) => Some(&args.connect),
            Self::Version(connect) => Some(connect),
        }
    }
}

/// Where to send a query and how to print the reply.
#[derive(Debug, Clone, Args)]
pub struct ConnectArgs {
    #[arg(long, env = "REFWIRE_SERVER_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "REFWIRE_SERVER_PORT", default_value_t = 5555)]
    pub port: u16,

    /// Transport timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct ReferenceArgs {
    #[arg(long, required = true, num_args = 1..)]
    pub tickers: Vec<String>,

    #[arg(long, required = true, num_args = 1..)]
    pub fields: Vec<String>,

    /// Extra provider parameter as KEY=VALUE (repeatable).
    #[arg(long = "extra", value_name = "KEY=VALUE")]
    pub extras: Vec<String>,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Debug, Args)]
pub struct HistoricalArgs {
    #[arg(long, required = true, num_args = 1..)]
    pub tickers: Vec<String>,

    #[arg(long, required = true, num_args = 1..)]
    pub fields: Vec<String>,

    /// First date, YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    pub start: Date,

    /// Last date, YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    pub end: Date,

    /// Extra provider parameter as KEY=VALUE (repeatable).
    #[arg(long = "extra", value_name = "KEY=VALUE")]
    pub extras: Vec<String>,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Debug, Args)]
pub struct FieldsInfoArgs {
    #[arg(long, required = true, num_args = 1..)]
    pub fields: Vec<String>,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to look for in field mnemonics and descriptions.
    pub search_spec: String,

    #[command(flatten)]
    pub connect: ConnectArgs,
}

fn parse_date(raw: &str) -> Result<Date, String> {
    parse_request_date(raw).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn historical_dates_are_parsed() {
        let cli = Cli::try_parse_from([
            "refwire",
            "historical",
            "--tickers",
            "SPX Index",
            "--fields",
            "PX_LAST",
            "--start",
            "2012-01-01",
            "--end",
            "2014-01-01",
        ])
        .expect("valid arguments");

        let Command::Historical(args) = cli.command else {
            panic!("expected historical command");
        };
        assert_eq!(args.start.year(), 2012);
        assert_eq!(args.connect.port, 5555);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let result = Cli::try_parse_from([
            "refwire",
            "historical",
            "--tickers",
            "SPX Index",
            "--fields",
            "PX_LAST",
            "--start",
            "2012/01/01",
            "--end",
            "2014-01-01",
        ]);
        assert!(result.is_err());
    }
}
