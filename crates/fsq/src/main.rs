//! fsq
//!
//! Command-line faceted search client. Loads a client configuration, applies
//! the intents given on the command line one after another, and prints every
//! notified snapshot to stdout as a JSON line.

mod cli;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use helios_faceted_search::store::SearchState;
use helios_faceted_search::{SearchClient, SearchClientConfig, SearchHandlers, Settlement};
use tracing::{info, warn};

use cli::Args;

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("helios_faceted_search={},fsq={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(args: &Args) -> anyhow::Result<SearchClientConfig> {
    let mut config = SearchClientConfig::read_json_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if let Some(rows) = args.rows {
        config.rows = rows;
    }
    if args.pending {
        config.notify_on_fetch_start = true;
    }

    config.validate()?;
    Ok(config)
}

/// Writes one snapshot as a single JSON line and flushes.
fn write_snapshot<W: Write>(out: &mut W, state: &SearchState) -> anyhow::Result<()> {
    let line = serde_json::to_string(state).context("serializing snapshot")?;
    writeln!(out, "{}", line).context("writing snapshot")?;
    out.flush().context("flushing snapshot")?;
    Ok(())
}

fn print_snapshot(state: &SearchState, _handlers: &SearchHandlers) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = write_snapshot(&mut stdout, state) {
        warn!(error = %format!("{e:#}"), "failed to print snapshot");
    }
}

fn report(step: &str, settlement: Settlement) {
    match settlement {
        Settlement::Applied => info!(step, "request settled"),
        Settlement::Failed => warn!(step, "request failed"),
        Settlement::Superseded | Settlement::Cancelled => {
            warn!(step, settlement = ?settlement, "request did not settle")
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = load_config(&args)?;
    info!(url = %config.url, rows = config.rows, "Starting fsq");

    let client = SearchClient::with_http(config, print_snapshot)?;

    report("initialize", client.initialize().settled().await);

    for intent in args.field_intents() {
        let ticket = client.set_search_field_value(&intent.field, intent.value.clone())?;
        report(&intent.field, ticket.settled().await);
    }

    if let Some(sort) = &args.sort {
        let ticket = client.set_sort(&sort.field, sort.direction)?;
        report("sort", ticket.settled().await);
    }

    // last, since every other intent resets the page
    if let Some(page) = args.page {
        let ticket = client.set_current_page(page)?;
        report("page", ticket.settled().await);
    }

    let state = client.state();
    if state.results.is_error() {
        anyhow::bail!("last request failed");
    }
    Ok(())
}
