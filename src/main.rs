use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use competitor_registry::{config::DEFAULT_CSV_PATH, CsvStore, Error, NewCompetitor, Record};

/// View and append competitors in the registry file
#[derive(Parser)]
#[command(name = "registry", version)]
struct Cli {
    /// Path to the competitors CSV file
    #[arg(long, short, env = "REGISTRY_CSV_PATH", default_value = DEFAULT_CSV_PATH)]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every competitor
    List {
        /// Print the same JSON array the API returns
        #[arg(long)]
        json: bool,
    },
    /// Append a new competitor
    Add {
        #[arg(long)]
        company: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        status: String,
    },
    /// Create the file with its header line if it is missing
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = CsvStore::new(cli.file);
    let mut out = io::stdout().lock();

    run(&store, cli.command, &mut out)
}

fn run(store: &CsvStore, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::List { json } => run_list(store, json, out),
        Command::Add {
            company,
            date,
            status,
        } => run_add(store, company, date, status, out),
        Command::Init => run_init(store, out),
    }
}

fn run_list(store: &CsvStore, json: bool, out: &mut impl Write) -> Result<()> {
    let records = match store.read_all() {
        Ok(records) => records,
        Err(Error::NotFound { path }) => {
            bail!("Competitors file not found. ({})", path.display())
        }
        Err(e) => return Err(e).context("Error reading competitors file."),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
    } else {
        print_table(&records, out)?;
    }

    Ok(())
}

fn run_add(
    store: &CsvStore,
    company: String,
    date: String,
    status: String,
    out: &mut impl Write,
) -> Result<()> {
    let competitor = store
        .create(NewCompetitor {
            company_name: Some(company),
            registration_date: Some(date),
            status: Some(status),
        })
        .context("Error saving new competitor.")?;

    writeln!(
        out,
        "✓ Added {} ({})",
        competitor.company_name, competitor.reg_number
    )?;
    Ok(())
}

fn run_init(store: &CsvStore, out: &mut impl Write) -> Result<()> {
    if store.init()? {
        writeln!(out, "✓ Created {}", store.path().display())?;
    } else {
        writeln!(out, "✓ {} already exists", store.path().display())?;
    }
    Ok(())
}

/// Left-aligned columns sized to the widest value, header from the first record
fn print_table(records: &[Record], out: &mut impl Write) -> io::Result<()> {
    let Some(first) = records.first() else {
        return writeln!(out, "No competitors yet.");
    };

    let headers: Vec<&str> = first.fields().iter().map(|(k, _)| k.as_str()).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for record in records {
        for (i, (_, value)) in record.fields().iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(value.chars().count());
            }
        }
    }

    let row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "{}", row(headers.clone()))?;
    writeln!(
        out,
        "{}",
        "━".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1))
    )?;
    for record in records {
        writeln!(
            out,
            "{}",
            row(record.fields().iter().map(|(_, v)| v.as_str()).collect())
        )?;
    }
    writeln!(out, "\n{} competitor(s)", records.len())
}
