// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod stages;
pub mod tasks;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_for_root;
use crate::graph::{BuildHost, TaskHost, run_step};
use crate::tasks::BuildContext;

/// High-level entry point used by `main.rs`.
///
/// Loads the project configuration from the working directory, turns the
/// invocation into a plan and runs it. One-shot plans fail when any task
/// reported failures; a serving plan only returns at shutdown.
pub async fn run(args: CliArgs) -> Result<()> {
    let root = std::env::current_dir().context("resolving working directory")?;
    let config = load_for_root(&root)?;
    debug!(?config, "configuration loaded");

    let step = args.step();
    let serves = step.serves();
    info!(?step, "running plan");

    let host: Arc<dyn TaskHost> = Arc::new(BuildHost::new(BuildContext::on_disk(root, config)));
    let reports = run_step(host, step).await?;

    let failed: Vec<String> = reports
        .iter()
        .filter(|r| !r.is_success())
        .map(|r| r.task.to_string())
        .collect();
    if !failed.is_empty() && !serves {
        bail!("tasks reported failures: {}", failed.join(", "));
    }
    Ok(())
}
