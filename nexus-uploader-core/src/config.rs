use std::path::PathBuf;

use tracing::{debug, info};

use crate::contract::RemoteTarget;
use crate::error::ConfigError;
use crate::filter::{CoordinateFilter, FilterPatterns};
use crate::retry::RetryPolicy;

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Everything one mirroring run needs.
#[derive(Debug, Clone)]
pub struct SynchroniseConfig {
    pub roots: Vec<PathBuf>,
    pub filters: FilterPatterns,
    pub target: RemoteTarget,
    pub force_upload: bool,
    /// Newest K versions per artifact; `None` or `Some(0)` keeps all.
    pub limit: Option<usize>,
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl SynchroniseConfig {
    pub fn new(roots: Vec<PathBuf>, target: RemoteTarget) -> Self {
        Self {
            roots,
            filters: FilterPatterns::default(),
            target,
            force_upload: false,
            limit: None,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }

    /// Checks every setting and compiles the filters. Touches nothing but root metadata.
    pub fn validate(&self) -> Result<CoordinateFilter, ConfigError> {
        let filter = CoordinateFilter::new(&self.filters)?;
        self.target.validate()?;
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.roots.is_empty() {
            return Err(ConfigError::NoRoots);
        }
        for root in &self.roots {
            if !root.is_dir() {
                return Err(ConfigError::InvalidRoot(root.clone()));
            }
        }
        Ok(filter)
    }

    pub fn trace_loaded(&self) {
        info!(
            roots = self.roots.len(),
            repo_url = %self.target.repo_url,
            repo_id = %self.target.repo_id,
            force_upload = self.force_upload,
            limit = ?self.limit,
            concurrency = self.concurrency,
            "Loaded SynchroniseConfig"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}
