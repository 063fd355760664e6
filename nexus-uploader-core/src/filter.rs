//! Coordinate Filter: three independent include patterns, combined with AND.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::contract::ArtifactCoordinate;
use crate::error::ConfigError;

/// Raw include patterns as supplied by the user. `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPatterns {
    pub artifact: Option<String>,
    pub group: Option<String>,
    pub version: Option<String>,
}

/// Compiled form of [`FilterPatterns`].
#[derive(Debug, Clone, Default)]
pub struct CoordinateFilter {
    artifact: Option<Regex>,
    group: Option<Regex>,
    version: Option<Regex>,
}

fn compile(field: &'static str, pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|source| ConfigError::InvalidPattern {
                field,
                pattern: p.to_string(),
                source,
            })
        })
        .transpose()
}

fn search(pattern: &Option<Regex>, value: &str) -> bool {
    pattern.as_ref().map_or(true, |re| re.is_match(value))
}

impl CoordinateFilter {
    pub fn new(patterns: &FilterPatterns) -> Result<Self, ConfigError> {
        Ok(Self {
            artifact: compile("artifact", patterns.artifact.as_deref())?,
            group: compile("group", patterns.group.as_deref())?,
            version: compile("version", patterns.version.as_deref())?,
        })
    }

    /// Unanchored search on each field; all three must match.
    pub fn matches(&self, coordinate: &ArtifactCoordinate) -> bool {
        search(&self.group, &coordinate.group_id)
            && search(&self.artifact, &coordinate.artifact_id)
            && search(&self.version, &coordinate.version)
    }
}
