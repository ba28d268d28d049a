//! `tempex` CLI: list and check occurrences of temporal expressions.
//!
//! Patterns are read as JSON option maps (the serialized form of
//! `temporal-expr`) from a file or stdin.
//!
//! ## Usage
//!
//! ```sh
//! # Next 5 occurrences of "last day of every other month"
//! echo '{"type":"Day of Month","start":"2021-01-01","frequency":2,"day_of_month":-1}' \
//!   | tempex next -n 5
//!
//! # Occurrences after a given date
//! tempex next -i pattern.json --from 2021-06-15
//!
//! # Membership checks
//! tempex includes -i pattern.json 2021-01-31 2021-02-28
//!
//! # Validate a raw option map nested under a key
//! tempex validate -i request.json --prefix options.recurrence_pattern
//!
//! # Print the validation rules
//! tempex rules
//! ```
//!
//! Set `RUST_LOG=debug` to see iteration diagnostics on stderr.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::process;
use temporal_expr::{options, validation, TemporalExpression};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tempex",
    version,
    about = "Temporal expression (recurring date pattern) CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the next occurrences of a pattern
    Next {
        /// Pattern JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Print occurrences after this date instead of from the start
        #[arg(long)]
        from: Option<String>,
        /// Maximum number of occurrences to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
    /// Check whether dates belong to a pattern
    Includes {
        /// Pattern JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Dates to check (ISO 8601)
        #[arg(required = true)]
        dates: Vec<String>,
    },
    /// Validate a raw option map before construction
    Validate {
        /// JSON document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Dot path of the option map inside the document
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Print the validation rules as JSON
    Rules {
        /// Dot path to root the rule paths under
        #[arg(long)]
        prefix: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Next {
            input,
            from,
            count,
        } => {
            let mut pattern = load_pattern(input.as_deref())?;
            if let Some(from) = from {
                pattern.seek(parse_date_arg(&pattern, &from)?);
            }
            for date in pattern.occurrences().take(count) {
                println!("{}", date);
            }
        }
        Commands::Includes { input, dates } => {
            let pattern = load_pattern(input.as_deref())?;
            for raw in &dates {
                let date = parse_date_arg(&pattern, raw)?;
                println!("{}\t{}", date, pattern.includes(date));
            }
        }
        Commands::Validate { input, prefix } => {
            let json = read_input(input.as_deref())?;
            let document: serde_json::Value =
                serde_json::from_str(&json).context("Failed to parse input as JSON")?;
            match validation::validate(&document, prefix.as_deref()) {
                Ok(()) => println!("ok"),
                Err(violations) => {
                    for violation in &violations {
                        println!("{}", violation);
                    }
                    process::exit(1);
                }
            }
        }
        Commands::Rules { prefix } => {
            let rules = validation::validation_rules(prefix.as_deref());
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }

    Ok(())
}

/// Read and construct a pattern; unknown pattern types are an error here.
fn load_pattern(path: Option<&str>) -> Result<TemporalExpression> {
    let json = read_input(path)?;
    let pattern = TemporalExpression::from_json(&json)
        .context("Failed to read pattern")?
        .context("Unknown or missing pattern type")?;
    tracing::debug!(pattern = %pattern.pattern_type(), start = %pattern.start(), "loaded pattern");
    Ok(pattern)
}

fn parse_date_arg(pattern: &TemporalExpression, raw: &str) -> Result<NaiveDate> {
    options::parse_date(raw, pattern.timezone())
        .with_context(|| format!("Invalid date argument: {}", raw))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
