//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use walkdir::WalkDir;

use serving_bench_core::{RunController, RunSummary};

use crate::factory::DefaultRunFactory;

/// Load-generation benchmark for OpenAI-compatible serving endpoints
#[derive(Parser, Debug)]
#[command(name = "serving-bench")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "folder"])))]
pub struct Cli {
    /// Benchmark a single JSON config file
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Run every JSON config found under a directory
    #[arg(short = 'F', long, value_name = "DIR")]
    pub folder: Option<PathBuf>,

    /// Repeat the single config indefinitely
    #[arg(short = 'I', long, requires = "file", conflicts_with = "folder")]
    pub inf: bool,

    /// Directory result files are written into
    #[arg(short = 'o', long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Run the benchmark based on the parsed arguments
    pub async fn run(&self) -> Result<()> {
        let factory = Arc::new(DefaultRunFactory::new(&self.output_dir));
        let controller = RunController::new(factory);

        if let Some(file) = &self.file {
            if self.inf {
                controller.run_forever(file).await?;
            } else {
                let summary = controller.run_one(file).await?;
                print_summary(&summary);
            }
        } else if let Some(folder) = &self.folder {
            let configs = discover_configs(folder)?;
            if configs.is_empty() {
                anyhow::bail!("no .json config files found under {}", folder.display());
            }
            tracing::info!(count = configs.len(), folder = %folder.display(), "discovered config files");

            let succeeded = controller.run_configs(&configs).await?;
            tracing::info!(succeeded, total = configs.len(), "all configs processed");
        } else {
            anyhow::bail!("either --file or --folder must be given");
        }

        Ok(())
    }
}

/// Collect every `.json` file under `folder`, recursively, in sorted order
pub fn discover_configs(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut configs = Vec::new();
    for entry in WalkDir::new(folder) {
        let entry = entry.with_context(|| format!("failed to walk {}", folder.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("json")
        {
            configs.push(entry.path().to_path_buf());
        }
    }
    configs.sort();
    Ok(configs)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "=".repeat(60));
    println!("   Benchmark Results");
    println!("{}", "=".repeat(60));
    println!("  Requests:                     {}", summary.request_count);
    println!("  Completed:                    {}", summary.completed);
    println!("  Elapsed:                      {:.2} s", summary.elapsed_secs);
    println!(
        "  Throughput (requests/s):      {:.4}",
        summary.request_throughput
    );
    println!(
        "  Throughput (tokens/s):        {:.4}",
        summary.token_throughput
    );
    println!("  Avg latency:                  {:.4} s", summary.avg_latency);
    println!(
        "  Avg per-token latency:        {:.6} s",
        summary.avg_per_token_latency
    );
    println!(
        "  Avg per-output-token latency: {:.6} s",
        summary.avg_per_output_token_latency
    );
    println!(
        "  Latency p50/p90/p99:          {:.4} / {:.4} / {:.4} s",
        summary.latency_percentiles.p50,
        summary.latency_percentiles.p90,
        summary.latency_percentiles.p99
    );
    println!("{}", "=".repeat(60));
    println!();
}
