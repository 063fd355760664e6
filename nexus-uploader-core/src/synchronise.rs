//! High-level pipeline: orchestrates scan → filter → select → classify → check → upload.
//!
//! This module provides the top-level orchestration for "synchronising" one or
//! more local M2 repositories with a remote Nexus repository. It:
//!   - Scans every configured root for version directories ([`crate::scan`])
//!   - Drops coordinates rejected by the include patterns ([`crate::filter`])
//!   - Merges all roots and keeps the newest K versions per artifact ([`crate::select`])
//!   - Lists the artifact files of every version directory ([`crate::classify`])
//!   - Probes and uploads the surviving files through a bounded worker pool
//!     ([`crate::checker`], [`crate::uploader`])
//!   - Aggregates one outcome per file into a [`SynchroniseReport`]
//!
//! # Responsibilities
//! - Fail fast on configuration problems: patterns, target and roots are
//!   validated before the first directory is read
//! - Isolate everything else: an unreadable subtree or a failed request only
//!   affects the files involved, and every file still reaches a terminal outcome
//! - Honour cancellation: once the token fires no new file is started, files
//!   already in flight finish, and untouched files are reported as cancelled
//!
//! # Error Handling
//! Only [`ConfigError`] is returned as `Err`. Scan errors and per-file failures
//! are collected in the report; callers decide the process exit status with
//! [`SynchroniseReport::is_success`].
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Supporting types: [`SynchroniseReport`], [`FileReport`], [`OutcomeCounts`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::checker::{check_presence, CheckDecision};
use crate::classify::classify_version_dir;
use crate::config::SynchroniseConfig;
use crate::contract::{
    ArtifactCoordinate, ArtifactFile, RemoteTarget, ScannedVersion, Transport, UploadOutcome,
};
use crate::error::{ConfigError, ScanError};
use crate::retry::RetryPolicy;
use crate::scan::RepoScanner;
use crate::select::{merge_coordinates, select_versions, Selection, VersionSources};
use crate::uploader::upload_file;

/// Outcome of a single artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub coordinate: ArtifactCoordinate,
    pub file_name: String,
    pub local_path: PathBuf,
    pub remote_path: String,
    pub size_bytes: u64,
    pub outcome: UploadOutcome,
}

impl FileReport {
    fn new(file: &ArtifactFile, outcome: UploadOutcome) -> Self {
        Self {
            coordinate: file.coordinate.clone(),
            file_name: file.file_name.clone(),
            local_path: file.absolute_path.clone(),
            remote_path: file.remote_path(),
            size_bytes: file.size_bytes,
            outcome,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub uploaded: usize,
    pub skipped_existing: usize,
    pub skipped_filtered: usize,
    pub skipped_by_limit: usize,
    pub cancelled: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct SynchroniseReport {
    pub files: Vec<FileReport>,
    pub scan_errors: Vec<ScanError>,
    /// The cancellation token fired before the batch completed.
    pub cancelled: bool,
}

impl SynchroniseReport {
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for file in &self.files {
            match file.outcome {
                UploadOutcome::Uploaded => counts.uploaded += 1,
                UploadOutcome::SkippedExisting => counts.skipped_existing += 1,
                UploadOutcome::SkippedFiltered => counts.skipped_filtered += 1,
                UploadOutcome::SkippedByLimit => counts.skipped_by_limit += 1,
                UploadOutcome::Cancelled => counts.cancelled += 1,
                UploadOutcome::Failed(_) => counts.failed += 1,
            }
        }
        counts
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_failed())
    }

    /// True when every attempted file was uploaded or legitimately skipped.
    pub fn is_success(&self) -> bool {
        let counts = self.counts();
        counts.failed == 0 && counts.cancelled == 0
    }
}

impl fmt::Display for SynchroniseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            write!(
                f,
                "  [{}] {} {}",
                file.outcome.label(),
                file.coordinate,
                file.file_name
            )?;
            if let UploadOutcome::Failed(reason) = &file.outcome {
                write!(f, ": {reason}")?;
            }
            writeln!(f)?;
        }
        for err in &self.scan_errors {
            writeln!(f, "  [scan error] {err}")?;
        }
        let c = self.counts();
        write!(
            f,
            "{} uploaded, {} already present, {} filtered, {} over limit, {} cancelled, {} failed",
            c.uploaded, c.skipped_existing, c.skipped_filtered, c.skipped_by_limit, c.cancelled, c.failed
        )
    }
}

/// Entrypoint: mirror every root in `config` to its remote target.
pub async fn synchronise<T>(
    config: &SynchroniseConfig,
    transport: &T,
    cancel: &CancellationToken,
) -> Result<SynchroniseReport, ConfigError>
where
    T: Transport + ?Sized,
{
    info!("[SYNC] Starting synchronisation pipeline");
    let filter = config.validate()?;
    config.trace_loaded();

    let mut report = SynchroniseReport::default();
    let mut candidates: Vec<ScannedVersion> = Vec::new();
    let mut filtered: Vec<ScannedVersion> = Vec::new();

    for root in &config.roots {
        info!(root = %root.display(), "[SYNC] Scanning repository root");
        for item in RepoScanner::new(root) {
            match item {
                Ok(version) if filter.matches(&version.coordinate) => candidates.push(version),
                Ok(version) => {
                    debug!(coordinate = %version.coordinate, "[SYNC] Excluded by include patterns");
                    filtered.push(version);
                }
                Err(e) => report.scan_errors.push(e),
            }
        }
    }

    let Selection { kept, pruned } = select_versions(merge_coordinates(candidates), config.limit);
    let filtered = merge_coordinates(filtered);
    info!(
        kept = kept.len(),
        pruned = pruned.len(),
        filtered = filtered.len(),
        "[SYNC] Selected versions"
    );

    record_skipped(&mut report, &filtered, UploadOutcome::SkippedFiltered);
    record_skipped(&mut report, &pruned, UploadOutcome::SkippedByLimit);

    let batch: Vec<ArtifactFile> = classify_all(&mut report, &kept)
        .into_iter()
        .flatten()
        .collect();
    let total = batch.len();
    info!(
        files = total,
        repo_id = %config.target.repo_id,
        repo_url = %config.target.repo_url,
        "[SYNC] Uploading content"
    );

    let target = &config.target;
    let retry = &config.retry;
    let force_upload = config.force_upload;
    let outcomes: Vec<FileReport> = stream::iter(batch.into_iter().enumerate())
        .map(move |(index, file)| async move {
            let outcome = process_file(
                transport,
                target,
                &file,
                retry,
                force_upload,
                cancel,
                (index + 1, total),
            )
            .await;
            FileReport::new(&file, outcome)
        })
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    report.files.extend(outcomes);
    report.files.sort_by(|a, b| {
        a.coordinate
            .cmp(&b.coordinate)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    report.cancelled = cancel.is_cancelled();

    let counts = report.counts();
    info!(
        uploaded = counts.uploaded,
        skipped_existing = counts.skipped_existing,
        skipped_filtered = counts.skipped_filtered,
        skipped_by_limit = counts.skipped_by_limit,
        cancelled = counts.cancelled,
        failed = counts.failed,
        scan_errors = report.scan_errors.len(),
        "[SYNC] Synchronisation finished"
    );
    Ok(report)
}

/// Lists the files of every version, merged across the directories it was
/// found in. A file present under several roots is taken from the earliest
/// one; unreadable directories become scan errors.
fn classify_all(
    report: &mut SynchroniseReport,
    versions: &[VersionSources],
) -> Vec<Vec<ArtifactFile>> {
    versions
        .iter()
        .map(|sources| {
            let mut merged: BTreeMap<String, ArtifactFile> = BTreeMap::new();
            for version in sources.directories() {
                match classify_version_dir(version) {
                    Ok(files) => {
                        for file in files {
                            merged.entry(file.remote_path()).or_insert(file);
                        }
                    }
                    Err(e) => {
                        warn!(coordinate = %version.coordinate, error = %e, "[SYNC] Failed to list artifact files");
                        report.scan_errors.push(e);
                    }
                }
            }
            merged.into_values().collect()
        })
        .collect()
}

fn record_skipped(report: &mut SynchroniseReport, versions: &[VersionSources], outcome: UploadOutcome) {
    for files in classify_all(report, versions) {
        report
            .files
            .extend(files.iter().map(|file| FileReport::new(file, outcome.clone())));
    }
}

async fn process_file<T>(
    transport: &T,
    target: &RemoteTarget,
    file: &ArtifactFile,
    retry: &RetryPolicy,
    force_upload: bool,
    cancel: &CancellationToken,
    (current, total): (usize, usize),
) -> UploadOutcome
where
    T: Transport + ?Sized,
{
    if cancel.is_cancelled() {
        debug!(path = %file.remote_path(), "[SYNC] Run cancelled, not starting file");
        return UploadOutcome::Cancelled;
    }
    info!("Processing: {} {}, {}/{}", file.coordinate, file.file_name, current, total);

    if !force_upload {
        if let CheckDecision::Done(outcome) = check_presence(transport, target, file, retry).await {
            return outcome;
        }
    }
    upload_file(transport, target, file, retry).await
}
