//! # nexus-uploader CLI Interface (Module)
//!
//! This module implements the CLI interface for nexus-uploader: argument parsing, settings
//! resolution, the async entrypoint, and the user-visible report.
//!
//! All mirroring logic (scan, filter, version limit, probe, upload) lives in the
//! [`nexus-uploader-core`] crate. This module is strictly CLI glue.
//!
//! ## How To Use
//! - For command-line users: run the installed `nexus-uploader` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a parsed [`Cli`].
//!
//! ## Exit status
//! [`run`] returns `Err` on a configuration error and whenever the report contains a
//! failed or cancelled file, so the binary exits non-zero in those cases.
//!
//! [`nexus-uploader-core`]: ../../nexus_uploader_core/
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use nexus_uploader_core::synchronise::{synchronise, SynchroniseReport};
use tokio_util::sync::CancellationToken;

use crate::load_config::{load_config, resolve};
use crate::upload::NexusClient;

/// CLI for nexus-uploader: mirror local M2 repositories to a Nexus server.
#[derive(Parser, Debug)]
#[clap(
    name = "nexus-uploader",
    version,
    about = "Upload artifacts from local M2 repositories to a Nexus repository"
)]
pub struct Cli {
    /// Local repository roots, e.g. ~/.m2/repository
    #[clap(value_name = "REPODIRS")]
    pub repodirs: Vec<PathBuf>,

    /// Nexus base URL, e.g. https://nexus.example.com
    #[clap(long)]
    pub repo_url: Option<String>,

    /// Repository id on the server, e.g. releases
    #[clap(long)]
    pub repo_id: Option<String>,

    /// Basic auth credentials; falls back to the NEXUS_AUTH environment variable
    #[clap(long, value_name = "USER:PASS")]
    pub auth: Option<String>,

    /// Only upload artifacts whose artifactId matches this regex
    #[clap(long = "include-artifact", visible_alias = "ia", value_name = "REGEX")]
    pub include_artifact: Option<String>,

    /// Only upload artifacts whose groupId matches this regex
    #[clap(long = "include-group", visible_alias = "ig", value_name = "REGEX")]
    pub include_group: Option<String>,

    /// Only upload versions matching this regex
    #[clap(long = "include-version", visible_alias = "iv", value_name = "REGEX")]
    pub include_version: Option<String>,

    /// Upload without checking whether the file already exists
    #[clap(short = 'F', long)]
    pub force_upload: bool,

    /// Only upload the newest K versions of each artifact (0 means all)
    #[clap(short = 'l', long, value_name = "K")]
    pub limit: Option<usize>,

    /// Number of files checked or uploaded at the same time
    #[clap(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Per-request HTTP timeout in seconds
    #[clap(long)]
    pub timeout_secs: Option<u64>,

    /// Optional YAML settings file; command line flags take precedence
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Also write the report as JSON to this path
    #[clap(long)]
    pub report_json: Option<PathBuf>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let file_settings = match &cli.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let settings = resolve(&cli, file_settings)?;
    let client = NexusClient::new(settings.config.target.credentials.clone(), settings.timeout)
        .context("Failed to construct HTTP client")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, letting in-flight files finish");
            on_interrupt.cancel();
        }
    });

    let result = synchronise(&settings.config, &client, &cancel).await;
    signal_task.abort();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Synchronisation failed");
            return Err(e.into());
        }
    };

    println!("Synchronise complete.\nReport:\n{report}");
    if let Some(path) = &settings.report_json {
        write_report(path, &report).await?;
    }

    if report.is_success() {
        tracing::info!("Synchronisation complete");
        Ok(())
    } else {
        let counts = report.counts();
        anyhow::bail!(
            "{} file(s) failed and {} cancelled",
            counts.failed,
            counts.cancelled
        )
    }
}

async fn write_report(path: &Path, report: &SynchroniseReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote JSON report");
    Ok(())
}
