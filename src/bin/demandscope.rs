use anyhow::Context;
use clap::{Parser, Subcommand};
use demandscope::booth_url;
use demandscope::config::{AppConfig, DEFAULT_CONFIG_PATH};
use demandscope::pipeline::{Pipeline, RunOutcome};
use demandscope::serve;
use demandscope::snapshot::DirSnapshotStore;
use demandscope::source::SheetExport;
use serde_json::json;
use std::num::NonZeroUsize;
use std::path::PathBuf;

const PROCESSED_PREFIX: &str = "processed_data";
const METRICS_PREFIX: &str = "demand_metrics";

#[derive(Parser, Debug)]
#[command(name = "demandscope", version, about = "Survey-driven demand metrics for Booth items")]
struct Cli {
    /// Config file (JSON); missing file means defaults
    #[arg(long = "config", global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the snapshot data directory
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. info, debug, demandscope=trace)
    #[arg(long = "log-level", global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a spreadsheet export, aggregate it and publish both snapshots
    Run {
        /// Spreadsheet export (`-` for stdin); falls back to `input` in config
        #[arg(long = "input", short = 'i')]
        input: Option<PathBuf>,
        /// Keep only the newest N snapshots per store
        #[arg(long = "keep")]
        keep: Option<NonZeroUsize>,
        /// Metrics to echo in the run summary
        #[arg(long = "preview", default_value_t = 5)]
        preview: usize,
    },
    /// Print the latest demand metrics as the read API would serve them
    Show {
        #[arg(long = "top")]
        top: Option<usize>,
    },
    /// Print the identifiers extracted from each URL
    Extract {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    demandscope::logging::init(&cli.log_level);

    let mut cfg = AppConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir.clone() {
        cfg.data_dir = dir;
    }

    match cli.command {
        Command::Run { input, keep, preview } => run(&cfg, input, keep, preview),
        Command::Show { top } => show(&cfg, top),
        Command::Extract { urls } => extract(&urls),
    }
}

fn run(cfg: &AppConfig, input: Option<PathBuf>, keep: Option<NonZeroUsize>, preview: usize) -> anyhow::Result<()> {
    let input = input
        .or_else(|| cfg.input.clone())
        .context("no input: pass --input or set `input` in the config")?;
    let columns = cfg
        .column_map()
        .map_err(|(label, e)| anyhow::anyhow!("column {label:?}: {e}"))?;

    let source = SheetExport::from_path(&input);
    let processed = DirSnapshotStore::new(cfg.processed_dir(), PROCESSED_PREFIX);
    let dashboard = DirSnapshotStore::new(cfg.dashboard_dir(), METRICS_PREFIX);

    let pipeline = Pipeline { preview, ..Pipeline::new(columns) };
    let outcome = pipeline.run(&source, &processed, &dashboard)?;

    let keep = keep.map(NonZeroUsize::get).or(cfg.keep_snapshots);
    if let (RunOutcome::Published { .. }, Some(n)) = (&outcome, keep) {
        processed.prune(n).context("pruning processed snapshots")?;
        dashboard.prune(n).context("pruning demand metric snapshots")?;
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn show(cfg: &AppConfig, top: Option<usize>) -> anyhow::Result<()> {
    let dashboard = DirSnapshotStore::new(cfg.dashboard_dir(), METRICS_PREFIX);
    let resp = serve::metrics_response(&dashboard, top)
        .context("reading demand metrics snapshot")?;
    if resp.status != 200 {
        tracing::info!(status = resp.status, "no published metrics");
    }
    println!("{}", serde_json::to_string_pretty(&resp.body)?);
    Ok(())
}

fn extract(urls: &[String]) -> anyhow::Result<()> {
    let out: Vec<_> = urls
        .iter()
        .map(|u| {
            let (ids, rule) = booth_url::extract_with_rule(u);
            json!({ "url": u, "shop_id": ids.shop_id, "item_id": ids.item_id, "rule": rule })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
