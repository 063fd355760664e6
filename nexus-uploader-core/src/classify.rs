//! File Classifier: turns the files of one version directory into [`ArtifactFile`]s.
//!
//! A file belongs to `artifactId:version` when its name starts with
//! `artifactId-version` and continues with either `.ext` (main payload, pom,
//! ...) or `-classifier.ext`. Everything else in the directory is ignored.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::contract::{ArtifactFile, ScannedVersion};
use crate::error::ScanError;

/// Suffixes of files a local repository keeps next to artifacts but which are
/// never uploaded as primary content.
const METADATA_SUFFIXES: &[&str] = &[
    ".md5",
    ".sha1",
    ".sha256",
    ".sha512",
    ".asc",
    ".lastUpdated",
];

const COMPOUND_EXTENSIONS: &[&str] = &["tar.gz", "tar.bz2", "tar.xz"];

/// Classifier and extension parsed from an artifact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    pub classifier: Option<String>,
    pub extension: String,
}

/// True for checksum, signature and resolver bookkeeping files.
pub fn is_metadata_file(file_name: &str) -> bool {
    file_name.starts_with("maven-metadata")
        || file_name == "_remote.repositories"
        || file_name == "resolver-status.properties"
        || METADATA_SUFFIXES
            .iter()
            .any(|suffix| file_name.ends_with(suffix))
}

/// Parses `artifactId-version[-classifier].extension`.
///
/// Returns `None` when the name does not belong to the given artifact version,
/// or when the classifier or extension would be empty.
pub fn parse_artifact_filename(
    artifact_id: &str,
    version: &str,
    file_name: &str,
) -> Option<ParsedFileName> {
    if is_metadata_file(file_name) {
        return None;
    }
    let rest = file_name
        .strip_prefix(artifact_id)?
        .strip_prefix('-')?
        .strip_prefix(version)?;

    let (stem, extension) = split_extension(rest)?;
    if extension.is_empty() {
        return None;
    }
    let classifier = if stem.is_empty() {
        None
    } else {
        let classifier = stem.strip_prefix('-')?;
        if classifier.is_empty() {
            return None;
        }
        Some(classifier.to_string())
    };
    Some(ParsedFileName {
        classifier,
        extension: extension.to_string(),
    })
}

/// Splits at the last `.`, keeping known compound extensions whole.
fn split_extension(name: &str) -> Option<(&str, &str)> {
    for extension in COMPOUND_EXTENSIONS {
        if let Some(stem) = name
            .strip_suffix(extension)
            .and_then(|rest| rest.strip_suffix('.'))
        {
            return Some((stem, *extension));
        }
    }
    name.rsplit_once('.')
}

/// True when `dir` holds at least one file belonging to `artifact_id:version`.
pub(crate) fn has_artifact_file(
    dir: &Path,
    artifact_id: &str,
    version: &str,
) -> Result<bool, ScanError> {
    let entries = fs::read_dir(dir).map_err(|e| ScanError::io(dir, &e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ScanError::io(dir, &e))?;
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if parse_artifact_filename(artifact_id, version, name).is_some() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Lists every artifact file of a scanned version directory, sorted by file name.
pub fn classify_version_dir(version: &ScannedVersion) -> Result<Vec<ArtifactFile>, ScanError> {
    let dir = &version.directory;
    let coordinate = &version.coordinate;
    let entries = fs::read_dir(dir).map_err(|e| ScanError::io(dir, &e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ScanError::io(dir, &e))?;
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = %path.display(), "Skipping file with a non UTF-8 name");
            continue;
        };
        let Some(parsed) =
            parse_artifact_filename(&coordinate.artifact_id, &coordinate.version, &name)
        else {
            debug!(file = %name, %coordinate, "Ignoring file that does not belong to artifact");
            continue;
        };
        let metadata = entry.metadata().map_err(|e| ScanError::io(&path, &e))?;
        if !metadata.is_file() {
            continue;
        }
        let mod_time = metadata.modified().map_err(|e| ScanError::io(&path, &e))?;

        files.push(ArtifactFile {
            coordinate: coordinate.clone(),
            classifier: parsed.classifier,
            extension: parsed.extension,
            file_name: name,
            absolute_path: path,
            size_bytes: metadata.len(),
            mod_time,
        });
    }
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}
