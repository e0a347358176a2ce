//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// eventdeck - external and manual events in one listing
#[derive(Debug, Parser)]
#[command(name = "eventdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EVENTDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Manual events file (overrides the configuration)
    #[arg(long, env = "EVENTDECK_MANUAL_EVENTS")]
    pub manual_events: Option<PathBuf>,

    /// External event API endpoint (overrides the configuration)
    #[arg(long, env = "EVENTDECK_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show a page of the combined upcoming events list
    List {
        /// Page number, starting at 1
        #[arg(long, short, default_value = "1")]
        page: usize,

        /// External category filter (can be repeated)
        #[arg(long = "category", action = clap::ArgAction::Append)]
        categories: Vec<String>,
    },

    /// Search external and manual events
    Search {
        /// Free text
        #[arg(long, short)]
        q: Option<String>,

        /// First date, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,

        /// Last date, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        /// Page number, starting at 1
        #[arg(long, short, default_value = "1")]
        page: usize,
    },

    /// Show one manual event with all of its dates
    Show {
        /// Manual event id
        id: String,
    },

    /// Build a highlight block from manual events
    Highlight {
        /// First start date
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last end date
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Begin today regardless of --start
        #[arg(long)]
        starts_today: bool,

        /// Manual event category id (can be repeated)
        #[arg(long = "category", action = clap::ArgAction::Append)]
        categories: Vec<u64>,

        /// Free text
        #[arg(long, short)]
        q: Option<String>,

        /// Number of events in the block
        #[arg(long, default_value = "10")]
        count: usize,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search() {
        let cli = Cli::try_parse_from([
            "eventdeck", "search", "--q", "jazz", "--start", "2025-02-10", "--page", "2",
        ])
        .unwrap();
        match cli.command {
            Command::Search { q, start, end, page } => {
                assert_eq!(q.as_deref(), Some("jazz"));
                assert_eq!(start.as_deref(), Some("2025-02-10"));
                assert_eq!(end, None);
                assert_eq!(page, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_list_with_categories() {
        let cli = Cli::try_parse_from([
            "eventdeck", "--debug", "list", "--category", "music", "--category", "kids",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Command::List { page, categories } => {
                assert_eq!(page, 1);
                assert_eq!(categories, vec!["music", "kids"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn highlight_dates_are_typed() {
        assert!(
            Cli::try_parse_from(["eventdeck", "highlight", "--start", "tomorrow"]).is_err()
        );
        let cli =
            Cli::try_parse_from(["eventdeck", "highlight", "--start", "2025-03-01"]).unwrap();
        match cli.command {
            Command::Highlight { start, count, .. } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 1));
                assert_eq!(count, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn command_is_required() {
        assert!(Cli::try_parse_from(["eventdeck"]).is_err());
    }
}
