//! CloseLab CLI: thin wrapper around the runner operations.
//!
//! Commands:
//! - `changes`: raw rows → extended records with price deltas
//! - `sort`: extended records ranked by date, then percent change
//! - `stats`: per-symbol average return, std deviation, Sharpe ratio
//! - `month`: extract one month of extended records
//! - `top-k`: largest absolute moves under a memory ceiling
//! - `run`: every step in order, writing conventional file names
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); reports go to stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use closelab_runner::{
    compute_changes, compute_symbol_statistics, extract_month, run_pipeline,
    sort_by_date_and_change, top_k_by_absolute_change, ChangeOptions, HeaderPolicy, Month,
    PipelineConfig, PipelinePaths,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "closelab",
    about = "CloseLab CLI: daily closing-price analytics"
)]
struct Cli {
    /// Path to a TOML config file. Command-line flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderArg {
    Absent,
    Present,
}

impl From<HeaderArg> for HeaderPolicy {
    fn from(h: HeaderArg) -> Self {
        match h {
            HeaderArg::Absent => HeaderPolicy::Absent,
            HeaderArg::Present => HeaderPolicy::Present,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-record price change and percent change.
    Changes {
        /// Raw `date,symbol,closingPrice` file.
        #[arg(long)]
        input: PathBuf,

        /// Extended-record output file.
        #[arg(long)]
        output: PathBuf,

        /// Whether the raw file starts with a header row.
        #[arg(long, value_enum)]
        header: Option<HeaderArg>,
    },
    /// Rank extended records by date (newest first), then percent change.
    Sort {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },
    /// Per-symbol risk statistics.
    Stats {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Also print the statistics as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Extract one month (YYYY-MM) of extended records.
    Month {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Month to keep, e.g. 2020-06.
        #[arg(long)]
        month: String,
    },
    /// Report the K largest absolute price moves.
    TopK {
        /// Extended-record file, e.g. a month subset.
        #[arg(long)]
        input: PathBuf,

        /// Number of records to report. Defaults to 10.
        #[arg(long)]
        k: Option<usize>,

        /// Approximate memory ceiling in bytes. Defaults to 10 MiB.
        #[arg(long)]
        memory_ceiling: Option<usize>,

        /// Fixed per-record size estimate in bytes; 0 disables the ceiling.
        #[arg(long)]
        record_size: Option<usize>,

        /// Print the selection as JSON instead of the text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run every step and write conventional file names to an output directory.
    Run {
        /// Raw `date,symbol,closingPrice` file.
        #[arg(long)]
        input: PathBuf,

        /// Output directory. Defaults to the current directory.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[arg(long, value_enum)]
        header: Option<HeaderArg>,

        /// Run top-K on this month only (YYYY-MM).
        #[arg(long)]
        month: Option<String>,

        #[arg(long)]
        k: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Changes {
            input,
            output,
            header,
        } => {
            if let Some(h) = header {
                config.raw_input.header = h.into();
            }
            let opts = ChangeOptions {
                header: config.raw_input.header,
            };
            let summary = compute_changes(&input, &output, &opts)?;
            println!(
                "{} records, {} symbols → {}",
                summary.records,
                summary.symbols,
                output.display()
            );
            Ok(())
        }
        Commands::Sort { input, output } => {
            let n = sort_by_date_and_change(&input, &output)?;
            println!("{n} records sorted → {}", output.display());
            Ok(())
        }
        Commands::Stats {
            input,
            output,
            json,
        } => {
            let stats = compute_symbol_statistics(&input, &output)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{} symbols → {}", stats.len(), output.display());
            }
            Ok(())
        }
        Commands::Month {
            input,
            output,
            month,
        } => {
            let rows = extract_month(&input, &output, &month)?;
            println!("{rows} rows in {month} → {}", output.display());
            Ok(())
        }
        Commands::TopK {
            input,
            k,
            memory_ceiling,
            record_size,
            json,
        } => {
            if let Some(k) = k {
                config.top_k.k = k;
            }
            if let Some(bytes) = memory_ceiling {
                config.top_k.memory_ceiling_bytes = bytes;
            }
            if let Some(bytes) = record_size {
                config.top_k.record_size_bytes = bytes;
            }
            run_top_k(&input, &config, json)
        }
        Commands::Run {
            input,
            output_dir,
            header,
            month,
            k,
        } => {
            if let Some(h) = header {
                config.raw_input.header = h.into();
            }
            if let Some(m) = month {
                config.month.filter = Some(Month::parse(&m).map_err(|bad| {
                    anyhow::anyhow!("invalid month '{bad}' (expected YYYY-MM)")
                })?);
            }
            if let Some(k) = k {
                config.top_k.k = k;
            }
            run_all(&input, &output_dir, &config)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn run_top_k(input: &Path, config: &PipelineConfig, json: bool) -> Result<()> {
    let budget = config.top_k.budget();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        // The text report is still produced; discard it and print JSON instead.
        let selection = top_k_by_absolute_change(input, config.top_k.k, &budget, &mut io::sink())?;
        serde_json::to_writer_pretty(&mut out, &selection)?;
        writeln!(out)?;
    } else {
        top_k_by_absolute_change(input, config.top_k.k, &budget, &mut out)?;
    }
    Ok(())
}

fn run_all(input: &Path, output_dir: &Path, config: &PipelineConfig) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let paths = PipelinePaths::in_dir(input, output_dir, config.month.filter.as_ref());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_pipeline(config, &paths, &mut out)?;

    info!(
        records = summary.changes.records,
        symbols = summary.changes.symbols,
        sorted = summary.sorted,
        month_rows = ?summary.month_rows,
        top_k_partial = summary.top_k.limit_reached,
        output_dir = %output_dir.display(),
        "pipeline complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn top_k_flags_parse() {
        let cli = Cli::try_parse_from([
            "closelab",
            "top-k",
            "--input",
            "2020-06.csv",
            "--k",
            "5",
            "--memory-ceiling",
            "1024",
        ])
        .unwrap();
        match cli.command {
            Commands::TopK {
                k, memory_ceiling, ..
            } => {
                assert_eq!(k, Some(5));
                assert_eq!(memory_ceiling, Some(1024));
            }
            _ => panic!("expected top-k"),
        }
    }

    #[test]
    fn header_flag_maps_to_policy() {
        let cli = Cli::try_parse_from([
            "closelab", "changes", "--input", "a.csv", "--output", "b.csv", "--header", "present",
        ])
        .unwrap();
        match cli.command {
            Commands::Changes { header, .. } => {
                assert_eq!(HeaderPolicy::from(header.unwrap()), HeaderPolicy::Present);
            }
            _ => panic!("expected changes"),
        }
    }

    #[test]
    fn missing_config_is_reported() {
        let err = load_config(Some(Path::new("/nonexistent/closelab.toml"))).unwrap_err();
        assert!(err.to_string().contains("closelab.toml"));
    }
}
