//! Repo Scanner: lazily discovers version directories below a repository root.
//!
//! The two deepest directory levels are always `artifactId/version`; every
//! directory above them is a groupId segment. A directory is reported as a
//! version directory only when it holds at least one file named after its
//! own coordinate, so artifact and group directories are never mistaken for
//! versions no matter how deep the groupId goes.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::has_artifact_file;
use crate::contract::{ArtifactCoordinate, ScannedVersion};
use crate::error::ScanError;

/// group (>= 1 segment) + artifactId + version
const MIN_VERSION_DEPTH: usize = 3;

/// Derives a coordinate from a version directory path relative to the root.
///
/// Returns `None` when the path is too shallow or has a non UTF-8 segment.
pub fn coordinate_from_relative(relative: &Path) -> Option<ArtifactCoordinate> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => segments.push(part.to_str()?),
            _ => return None,
        }
    }
    if segments.len() < MIN_VERSION_DEPTH {
        return None;
    }
    let version = segments.pop()?;
    let artifact_id = segments.pop()?;
    Some(ArtifactCoordinate::new(
        segments.join("."),
        artifact_id,
        version,
    ))
}

/// Iterator over the version directories of one repository root.
///
/// Yields `Err` for each subtree that could not be read and keeps going with
/// its siblings.
pub struct RepoScanner {
    root: PathBuf,
    walker: walkdir::FilterEntry<walkdir::IntoIter, fn(&walkdir::DirEntry) -> bool>,
}

fn is_directory(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
}

impl RepoScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_directory as fn(&walkdir::DirEntry) -> bool);
        Self { root, walker }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn inspect_dir(&self, dir: &Path) -> Result<Option<ScannedVersion>, ScanError> {
        let Ok(relative) = dir.strip_prefix(&self.root) else {
            return Ok(None);
        };
        let Some(coordinate) = coordinate_from_relative(relative) else {
            return Ok(None);
        };
        if !has_artifact_file(dir, &coordinate.artifact_id, &coordinate.version)? {
            return Ok(None);
        }
        let mod_time = dir
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| ScanError::io(dir, &e))?;
        debug!(%coordinate, dir = %dir.display(), "Found version directory");
        Ok(Some(ScannedVersion {
            coordinate,
            directory: dir.to_path_buf(),
            mod_time,
            root: self.root.clone(),
        }))
    }
}

impl Iterator for RepoScanner {
    type Item = Result<ScannedVersion, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let err = ScanError::walk(&self.root, e);
                    warn!(path = %err.path.display(), error = %err.message, "Error walking directory");
                    return Some(Err(err));
                }
            };
            if entry.depth() < MIN_VERSION_DEPTH {
                continue;
            }
            match self.inspect_dir(entry.path()) {
                Ok(Some(version)) => {
                    // Version directories hold files only.
                    self.walker.skip_current_dir();
                    return Some(Ok(version));
                }
                Ok(None) => continue,
                Err(err) => {
                    // The walker would report the same unreadable directory again.
                    self.walker.skip_current_dir();
                    warn!(path = %err.path.display(), error = %err.message, "Error reading version directory");
                    return Some(Err(err));
                }
            }
        }
    }
}
