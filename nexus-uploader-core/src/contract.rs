//! # contract: data model and the remote transport interface
//!
//! This module defines the types every pipeline stage passes along
//! (coordinates, scanned version directories, classified files, outcomes)
//! and the single trait ([`Transport`]) through which the existence checker
//! and the upload executor talk to the remote repository manager.
//!
//! ## Interface & Extensibility
//! - Implement [`Transport`] to talk to a new kind of server (the CLI crate
//!   ships a `reqwest` implementation for Nexus 3).
//! - Transports only move bytes and report raw outcomes. Deciding what a
//!   status code *means* for a run lives in [`crate::checker`] and
//!   [`crate::uploader`] so every transport classifies responses identically.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can drive the whole
//!   pipeline without a server. The generated `MockTransport` is exported
//!   when the `test-export-mocks` feature is enabled (default).

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

use crate::error::ConfigError;

/// The `(groupId, artifactId, version)` triple identifying one version directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ArtifactCoordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// groupId as nested path segments (`com.acme` -> `com/acme`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// Key used to group versions of the same artifact.
    pub fn artifact_key(&self) -> (String, String) {
        (self.group_id.clone(), self.artifact_id.clone())
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A version directory discovered by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedVersion {
    pub coordinate: ArtifactCoordinate,
    pub directory: PathBuf,
    pub mod_time: SystemTime,
    /// The repository root this directory was found under.
    pub root: PathBuf,
}

/// One file of an artifact version: the main payload, its pom, or a classified variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFile {
    pub coordinate: ArtifactCoordinate,
    pub classifier: Option<String>,
    pub extension: String,
    pub file_name: String,
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
    pub mod_time: SystemTime,
}

impl ArtifactFile {
    pub fn is_main(&self) -> bool {
        self.classifier.is_none()
    }

    /// Path below the repository root on the server.
    pub fn remote_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.coordinate.group_path(),
            self.coordinate.artifact_id,
            self.coordinate.version,
            self.file_name
        )
    }
}

/// Static basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parses `username:password`. The password may itself contain `:`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.split_once(':') {
            Some((user, pass)) if !user.is_empty() => Ok(Self::new(user, pass)),
            Some(_) => Err(ConfigError::InvalidCredentials(
                "username must not be empty".into(),
            )),
            None => Err(ConfigError::InvalidCredentials(
                "expected the form username:password".into(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The server and repository every file is mirrored to.
#[derive(Debug, Clone)]
pub struct RemoteTarget {
    pub repo_url: String,
    pub repo_id: String,
    pub credentials: Option<Credentials>,
}

impl RemoteTarget {
    pub fn new(
        repo_url: impl Into<String>,
        repo_id: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Result<Self, ConfigError> {
        let target = Self {
            repo_url: repo_url.into(),
            repo_id: repo_id.into(),
            credentials,
        };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repo_url.trim().is_empty() {
            return Err(ConfigError::Missing("repo url"));
        }
        if self.repo_id.trim().is_empty() {
            return Err(ConfigError::Missing("repo id"));
        }
        let parsed = url::Url::parse(&self.repo_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.repo_url.clone(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl {
                url: self.repo_url.clone(),
                reason: format!("unsupported scheme `{other}`"),
            }),
        }
    }

    /// `{repoUrl}/repository/{repoId}/{groupPath}/{artifactId}/{version}/{filename}`
    pub fn artifact_url(&self, file: &ArtifactFile) -> String {
        format!(
            "{}/repository/{}/{}",
            self.repo_url.trim_end_matches('/'),
            self.repo_id,
            file.remote_path()
        )
    }
}

/// Result of a presence probe that reached a conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Exists,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportError {
    #[error("authentication rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("server rejected request (HTTP {status})")]
    Rejected { status: u16 },

    #[error("transport failure: {message}")]
    Transport { message: String, transient: bool },
}

impl TransportError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Transport { transient, .. } => *transient,
            TransportError::Rejected { status } => matches!(status, 429 | 502 | 503 | 504),
            TransportError::Unauthorized { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "stage", content = "error", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("existence check failed: {0}")]
    Check(TransportError),

    #[error("upload failed: {0}")]
    Upload(TransportError),

    #[error("could not read local file: {0}")]
    LocalRead(String),
}

/// Terminal state of one artifact file in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded,
    SkippedExisting,
    SkippedFiltered,
    SkippedByLimit,
    /// Never submitted because the run was interrupted first.
    Cancelled,
    Failed(FailureReason),
}

impl UploadOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, UploadOutcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            UploadOutcome::Uploaded => "uploaded",
            UploadOutcome::SkippedExisting => "skipped (exists)",
            UploadOutcome::SkippedFiltered => "skipped (filtered)",
            UploadOutcome::SkippedByLimit => "skipped (limit)",
            UploadOutcome::Cancelled => "cancelled",
            UploadOutcome::Failed(_) => "failed",
        }
    }
}

/// Minimal network capability used by the checker and the upload executor.
///
/// Implementations map raw responses onto [`Presence`] / [`TransportError`]
/// (see [`crate::checker::classify_probe_status`] and
/// [`crate::uploader::classify_upload_status`]) and must be safe to call
/// concurrently from many workers.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Asks the server whether `url` already exists.
    async fn probe(&self, url: &str) -> Result<Presence, TransportError>;

    /// Stores `body` at `url`. Retries pass the same buffer again.
    async fn upload(&self, url: &str, body: Bytes) -> Result<(), TransportError>;
}
