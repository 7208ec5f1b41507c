//! Econ Indicators CLI: fetch, series, and config commands.
//!
//! Commands:
//! - `fetch`: download every configured FRED series and write the merged CSV
//! - `series`: list the configured series in output order
//! - `init-config`: write the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use econ_core::data::LogProgress;
use econ_core::SeriesDescriptor;
use econ_runner::{run_pipeline, EmptyPolicy, PipelineConfig, PipelineError, RunSummary};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "econ-indicators",
    about = "Collect FRED economic indicators into one date-aligned CSV"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence when set).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all configured series and write economic_indicators.csv.
    Fetch {
        /// Path to a TOML config file. Defaults to the built-in catalog.
        #[arg(long)]
        config: Option<PathBuf>,

        /// FRED API key. Overrides FRED_API_KEY and the config file.
        #[arg(long)]
        api_key: Option<String>,

        /// Output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Maximum concurrent fetches.
        #[arg(long)]
        workers: Option<usize>,

        /// Series to fetch as ID=NAME, replacing the configured list.
        #[arg(long = "series", value_name = "ID=NAME")]
        series: Vec<String>,

        /// Write per-series CSV files while fetching (removed after the merge).
        #[arg(long, default_value_t = false)]
        write_series_files: bool,

        /// Exit with an error instead of writing an empty file when no series returns data.
        #[arg(long, default_value_t = false)]
        fail_on_empty: bool,

        /// Print the run summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the configured series.
    Series {
        /// Path to a TOML config file. Defaults to the built-in catalog.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration as TOML.
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = "econ-indicators.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Fetch {
            config,
            api_key,
            output_dir,
            workers,
            series,
            write_series_files,
            fail_on_empty,
            json,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            cfg.apply_env();
            cfg.override_api_key(api_key);
            if let Some(dir) = output_dir {
                cfg.output_dir = dir;
            }
            if let Some(n) = workers {
                cfg.max_workers = n;
            }
            if !series.is_empty() {
                cfg.series = parse_series_args(&series)?;
            }
            if write_series_files {
                cfg.write_series_files = true;
            }
            if fail_on_empty {
                cfg.empty_policy = EmptyPolicy::Fail;
            }
            run_fetch(&cfg, json)
        }
        Commands::Series { config } => run_series(config.as_deref()),
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn parse_series_args(args: &[String]) -> Result<Vec<SeriesDescriptor>> {
    args.iter()
        .map(|a| match SeriesDescriptor::parse_pair(a) {
            Some(s) => Ok(s),
            None => bail!("invalid --series '{a}', expected ID=NAME"),
        })
        .collect()
}

fn run_fetch(cfg: &PipelineConfig, json: bool) -> Result<()> {
    let summary = match run_pipeline(cfg, &LogProgress) {
        Ok(summary) => summary,
        Err(PipelineError::NoData { failed, empty }) => {
            bail!("no series returned data ({failed} failed, {empty} empty); nothing written")
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn run_series(config: Option<&Path>) -> Result<()> {
    let cfg = load_config(config)?;
    cfg.validate()?;

    println!("{:<16} Name", "ID");
    println!("{}", "-".repeat(60));
    for s in &cfg.series {
        println!("{:<16} {}", s.id, s.name);
    }
    println!();
    println!("{} series", cfg.series.len());
    Ok(())
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    let text = PipelineConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Collection Result ===");
    println!("Output:     {}", summary.output_path.display());
    println!("Rows:       {}", summary.row_count);
    match (summary.first_date, summary.last_date) {
        (Some(first), Some(last)) => println!("Period:     {first} to {last}"),
        _ => println!("Period:     (empty)"),
    }
    println!("Columns:    {}", summary.columns.len());
    println!("Succeeded:  {}", summary.succeeded.len());
    println!("BLAKE3:     {}", summary.output_hash);
    for name in &summary.empty {
        println!("EMPTY:  {name}");
    }
    for (name, err) in &summary.failed {
        println!("FAILED: {name}: {err}");
    }
    println!();
}
