//! `load_config` module: loads the optional YAML settings file and merges it with the command line into a [`SynchroniseConfig`].
//!
//! This module is the only place where untrusted YAML is parsed and mapped to strongly-typed core structs.
//!
//! # Responsibilities
//! - Parse a user-supplied settings file into [`FileSettings`] (every key optional)
//! - Merge settings with the parsed [`Cli`]; a flag given on the command line always wins
//! - Fall back to the `NEXUS_AUTH` environment variable for credentials
//! - Expand a leading `~` in repository roots
//!
//! Validation of patterns, URL and roots happens in the core before any work starts.
//!
//! # Errors
//! All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use nexus_uploader_core::config::SynchroniseConfig;
use nexus_uploader_core::contract::{Credentials, RemoteTarget};
use nexus_uploader_core::error::ConfigError;
use nexus_uploader_core::filter::FilterPatterns;
use serde::Deserialize;
use tracing::{error, info};

use crate::cli::Cli;
use crate::upload::DEFAULT_TIMEOUT;

pub const AUTH_ENV: &str = "NEXUS_AUTH";

/// Settings file schema. Keys mirror the long command line flags.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub repodirs: Vec<PathBuf>,
    pub repo_url: Option<String>,
    pub repo_id: Option<String>,
    pub auth: Option<String>,
    pub include_artifact: Option<String>,
    pub include_group: Option<String>,
    pub include_version: Option<String>,
    pub force_upload: Option<bool>,
    pub limit: Option<usize>,
    pub concurrency: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Everything `run` needs after merging flags, file and environment.
#[derive(Debug)]
pub struct Settings {
    pub config: SynchroniseConfig,
    pub timeout: Duration,
    pub report_json: Option<PathBuf>,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileSettings> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading settings from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read settings file");
            return Err(anyhow::anyhow!(
                "Failed to read settings file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    match serde_yaml::from_str::<Option<FileSettings>>(&content) {
        Ok(settings) => {
            info!(config_path = ?path_ref, "Parsed settings YAML successfully");
            Ok(settings.unwrap_or_default())
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse settings YAML");
            Err(anyhow::anyhow!("Failed to parse settings YAML: {e}"))
        }
    }
}

/// Merges the command line over the settings file.
pub fn resolve(cli: &Cli, file: Option<FileSettings>) -> Result<Settings> {
    let file = file.unwrap_or_default();

    let roots: Vec<PathBuf> = if cli.repodirs.is_empty() {
        file.repodirs
    } else {
        cli.repodirs.clone()
    };
    let roots = roots.iter().map(|p| expand_home(p)).collect();

    let repo_url = cli
        .repo_url
        .clone()
        .or(file.repo_url)
        .ok_or(ConfigError::Missing("--repo-url"))?;
    let repo_id = cli
        .repo_id
        .clone()
        .or(file.repo_id)
        .ok_or(ConfigError::Missing("--repo-id"))?;

    let raw_auth = cli
        .auth
        .clone()
        .or(file.auth)
        .or_else(|| env::var(AUTH_ENV).ok().filter(|v| !v.is_empty()));
    let credentials = raw_auth
        .as_deref()
        .map(Credentials::parse)
        .transpose()
        .context("Failed to read --auth")?;
    if credentials.is_none() {
        info!("No credentials configured, requests are sent anonymously");
    }

    let target = RemoteTarget::new(repo_url, repo_id, credentials)?;
    let mut config = SynchroniseConfig::new(roots, target);
    config.filters = FilterPatterns {
        artifact: cli.include_artifact.clone().or(file.include_artifact),
        group: cli.include_group.clone().or(file.include_group),
        version: cli.include_version.clone().or(file.include_version),
    };
    config.force_upload = cli.force_upload || file.force_upload.unwrap_or(false);
    config.limit = cli.limit.or(file.limit);
    if let Some(concurrency) = cli.concurrency.or(file.concurrency) {
        config.concurrency = concurrency;
    }

    let timeout = cli
        .timeout_secs
        .or(file.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    Ok(Settings {
        config,
        timeout,
        report_json: cli.report_json.clone(),
    })
}

/// Expands a leading `~` to `$HOME`; other paths are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
