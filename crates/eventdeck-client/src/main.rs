//! eventdeck CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use eventdeck_client::cli::{Cli, Command, ConfigAction};
use eventdeck_client::commands::events::{Runtime, external_source, load_manual_events, print_json};
use eventdeck_client::config::ClientConfig;
use eventdeck_client::error::ClientResult;
use eventdeck_core::{TracingConfig, TracingOutputFormat, init_tracing};
use eventdeck_server::{HighlightLayout, SearchInput};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn tracing_config(cli: &Cli, config: &ClientConfig) -> TracingConfig {
    let tracing = if cli.debug || config.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::default()
    };
    if cli.json_logs {
        tracing.with_format(TracingOutputFormat::Json)
    } else {
        tracing
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    init_tracing(tracing_config(&cli, &config))?;

    if let Command::Config { ref action } = cli.command {
        return match action {
            ConfigAction::Dump => eventdeck_client::commands::config::dump(&config),
            ConfigAction::Validate => eventdeck_client::commands::config::validate(
                &config,
                cli.manual_events
                    .as_deref()
                    .or(config.manual_events_path.as_deref()),
            ),
            ConfigAction::Path => eventdeck_client::commands::config::path(),
        };
    }

    let manual = load_manual_events(cli.manual_events.as_deref(), &config)?;
    let source = external_source(cli.base_url.as_deref(), &config)?;
    let runtime = Runtime::new(&config, source, manual)?;

    match cli.command {
        Command::List { page, categories } => print_json(&runtime.list(page, categories).await),
        Command::Search { q, start, end, page } => {
            let input = SearchInput {
                text: q,
                start_date: start,
                end_date: end,
            };
            print_json(&runtime.search(input, page).await)
        }
        Command::Show { id } => print_json(&runtime.show(&id)?),
        Command::Highlight {
            start,
            end,
            starts_today,
            categories,
            q,
            count,
        } => {
            let mut layout = HighlightLayout::default()
                .with_dates(start, end)
                .with_category_ids(categories)
                .with_count(count);
            layout.starts_today = starts_today;
            layout.text = q;
            print_json(&runtime.highlight(&layout).await)
        }
        Command::Config { .. } => Ok(()),
    }
}
