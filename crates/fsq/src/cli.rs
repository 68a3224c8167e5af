//! Command-line arguments for `fsq`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FSQ_CONFIG` | | Client configuration file (JSON) |
//! | `FSQ_URL` | | Overrides the select endpoint from the file |
//! | `FSQ_LOG_LEVEL` | info | Log level |

use std::path::PathBuf;

use clap::Parser;
use helios_faceted_search::types::{FieldValue, SortDirection};

/// Runs faceted queries against a Solr select endpoint and prints each
/// settled snapshot as a JSON line.
#[derive(Debug, Clone, Parser)]
#[command(name = "fsq")]
#[command(about = "Faceted search query client for Solr")]
pub struct Args {
    /// Client configuration file.
    #[arg(short, long, env = "FSQ_CONFIG")]
    pub config: PathBuf,

    /// Select endpoint, overriding the configuration file.
    #[arg(long, env = "FSQ_URL")]
    pub url: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "FSQ_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Rows per page, overriding the configuration file.
    #[arg(long)]
    pub rows: Option<u32>,

    /// Page to show (0-based).
    #[arg(long)]
    pub page: Option<i64>,

    /// Text filter, as `field=value`. Repeatable.
    #[arg(long = "text", value_parser = parse_text)]
    pub text: Vec<FieldIntent>,

    /// Facet selection, as `field=v1,v2`. Repeatable.
    #[arg(long = "select", value_parser = parse_select)]
    pub select: Vec<FieldIntent>,

    /// Range selection, as `field=low..high`. Repeatable.
    #[arg(long = "range", value_parser = parse_range)]
    pub range: Vec<FieldIntent>,

    /// Sort, as `field:asc` or `field:desc`.
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortIntent>,

    /// Also print the pending snapshot when each request is issued.
    #[arg(long)]
    pub pending: bool,
}

impl Args {
    /// Field intents in the order they are applied.
    pub fn field_intents(&self) -> impl Iterator<Item = &FieldIntent> {
        self.text.iter().chain(&self.select).chain(&self.range)
    }
}

/// A value to set on a search field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIntent {
    pub field: String,
    pub value: FieldValue,
}

/// A sort to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct SortIntent {
    pub field: String,
    pub direction: SortDirection,
}

fn split_assignment(arg: &str) -> Result<(&str, &str), String> {
    match arg.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field, value)),
        _ => Err(format!("expected field=value, got '{}'", arg)),
    }
}

fn parse_text(arg: &str) -> Result<FieldIntent, String> {
    let (field, value) = split_assignment(arg)?;
    Ok(FieldIntent {
        field: field.to_string(),
        value: FieldValue::text(value),
    })
}

fn parse_select(arg: &str) -> Result<FieldIntent, String> {
    let (field, values) = split_assignment(arg)?;
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty());
    Ok(FieldIntent {
        field: field.to_string(),
        value: FieldValue::list(values),
    })
}

fn parse_range(arg: &str) -> Result<FieldIntent, String> {
    let (field, bounds) = split_assignment(arg)?;
    let (low, high) = bounds
        .split_once("..")
        .ok_or_else(|| format!("expected low..high, got '{}'", bounds))?;
    let low: f64 = low
        .trim()
        .parse()
        .map_err(|e| format!("invalid lower bound '{}': {}", low, e))?;
    let high: f64 = high
        .trim()
        .parse()
        .map_err(|e| format!("invalid upper bound '{}': {}", high, e))?;
    Ok(FieldIntent {
        field: field.to_string(),
        value: FieldValue::range(low, high),
    })
}

fn parse_sort(arg: &str) -> Result<SortIntent, String> {
    let (field, direction) = arg
        .rsplit_once(':')
        .ok_or_else(|| format!("expected field:asc|desc, got '{}'", arg))?;
    let direction = direction.parse::<SortDirection>().map_err(|e| e.to_string())?;
    Ok(SortIntent {
        field: field.to_string(),
        direction,
    })
}
