//! Version Selector: keeps the newest K versions of each `(groupId, artifactId)`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::contract::{ArtifactCoordinate, ScannedVersion};

/// One coordinate and every directory it was found in, in root order.
///
/// The first directory decides the version's age for the limit; files are
/// later merged from all of them with the earliest root winning per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSources {
    pub primary: ScannedVersion,
    pub duplicates: Vec<ScannedVersion>,
}

impl VersionSources {
    fn new(primary: ScannedVersion) -> Self {
        Self {
            primary,
            duplicates: Vec::new(),
        }
    }

    pub fn coordinate(&self) -> &ArtifactCoordinate {
        &self.primary.coordinate
    }

    /// Every directory holding this version, earliest root first.
    pub fn directories(&self) -> impl Iterator<Item = &ScannedVersion> {
        std::iter::once(&self.primary).chain(self.duplicates.iter())
    }
}

/// Versions that survive the limit, and the ones it pruned.
#[derive(Debug, Default)]
pub struct Selection {
    pub kept: Vec<VersionSources>,
    pub pruned: Vec<VersionSources>,
}

/// Newest first: modification time descending, then version string descending.
pub fn newest_first(a: &ScannedVersion, b: &ScannedVersion) -> Ordering {
    b.mod_time
        .cmp(&a.mod_time)
        .then_with(|| b.coordinate.version.cmp(&a.coordinate.version))
}

/// Folds repeated coordinates into one entry per coordinate.
///
/// Roots are scanned in the order given, so an earlier root's directory
/// becomes the primary one.
pub fn merge_coordinates(versions: Vec<ScannedVersion>) -> Vec<VersionSources> {
    let mut index: HashMap<ArtifactCoordinate, usize> = HashMap::with_capacity(versions.len());
    let mut merged: Vec<VersionSources> = Vec::with_capacity(versions.len());
    for version in versions {
        match index.get(&version.coordinate) {
            Some(&at) => {
                debug!(
                    coordinate = %version.coordinate,
                    dir = %version.directory.display(),
                    "Coordinate also found under another root, merging files"
                );
                merged[at].duplicates.push(version);
            }
            None => {
                index.insert(version.coordinate.clone(), merged.len());
                merged.push(VersionSources::new(version));
            }
        }
    }
    merged
}

/// Groups versions by artifact and applies `limit`. `None` or `Some(0)` is unlimited.
pub fn select_versions(versions: Vec<VersionSources>, limit: Option<usize>) -> Selection {
    let mut groups: BTreeMap<(String, String), Vec<VersionSources>> = BTreeMap::new();
    for version in versions {
        groups
            .entry(version.coordinate().artifact_key())
            .or_default()
            .push(version);
    }

    let limit = limit.filter(|k| *k > 0);
    let mut selection = Selection::default();
    for (_, mut group) in groups {
        group.sort_by(|a, b| newest_first(&a.primary, &b.primary));
        if let Some(k) = limit {
            if group.len() > k {
                let discarded = group.split_off(k);
                for version in &discarded {
                    info!(coordinate = %version.coordinate(), limit = k, "Discard: {} due to version limits", version.coordinate());
                }
                selection.pruned.extend(discarded);
            }
        }
        selection.kept.extend(group);
    }
    selection
}
