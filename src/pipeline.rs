//! The full pipeline behind `brands run`.
//!
//! Steps run in order and each opens and closes its own connection:
//!
//! 1. transform (optional import, normalize, verify)
//! 2. seed (insert boundary cases, write the workbook)
//! 3. stats
//! 4. export (to a file, see [`Config::pipeline_export_path`])

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::{export, seed, stats, transform};

pub async fn run_pipeline(config: &Config, input: Option<&Path>) -> Result<()> {
    step(1, "transform");
    transform::run_transform(config, input).await?;

    step(2, "seed");
    seed::run_seed(config, true).await?;

    step(3, "stats");
    stats::run_stats(config).await?;

    step(4, "export");
    export::run_export(config, Some(&config.pipeline_export_path())).await?;

    println!();
    println!("pipeline complete");
    Ok(())
}

fn step(n: u32, name: &str) {
    println!();
    println!("[{}/4] {}", n, name);
    println!("{}", "-".repeat(40));
}
