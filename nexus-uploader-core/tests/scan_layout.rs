use std::fs;
use std::path::{Path, PathBuf};

use nexus_uploader_core::classify::classify_version_dir;
use nexus_uploader_core::contract::{ArtifactCoordinate, ScannedVersion};
use nexus_uploader_core::scan::RepoScanner;
use tempfile::tempdir;

fn write_version(root: &Path, group: &str, artifact: &str, version: &str, files: &[&str]) -> PathBuf {
    let dir = root
        .join(group.replace('.', "/"))
        .join(artifact)
        .join(version);
    fs::create_dir_all(&dir).expect("create version dir");
    for name in files {
        fs::write(dir.join(name), format!("content of {name}")).expect("write artifact file");
    }
    dir
}

fn scan_ok(root: &Path) -> Vec<ScannedVersion> {
    RepoScanner::new(root)
        .map(|item| item.expect("scan should not report errors"))
        .collect()
}

#[test]
fn scanner_reports_one_coordinate_per_version_directory_at_any_depth() {
    let repo = tempdir().unwrap();
    write_version(repo.path(), "junit", "junit", "4.13", &["junit-4.13.jar", "junit-4.13.pom"]);
    write_version(
        repo.path(),
        "com.example.foo",
        "bar",
        "1.2.3",
        &["bar-1.2.3.jar", "bar-1.2.3-sources.jar", "bar-1.2.3.jar.sha1"],
    );
    write_version(
        repo.path(),
        "org.apache.maven.plugins",
        "maven-jar-plugin",
        "3.3.0",
        &["maven-jar-plugin-3.3.0.pom"],
    );

    let coordinates: Vec<ArtifactCoordinate> =
        scan_ok(repo.path()).into_iter().map(|v| v.coordinate).collect();

    assert_eq!(
        coordinates,
        vec![
            ArtifactCoordinate::new("com.example.foo", "bar", "1.2.3"),
            ArtifactCoordinate::new("junit", "junit", "4.13"),
            ArtifactCoordinate::new("org.apache.maven.plugins", "maven-jar-plugin", "3.3.0"),
        ],
        "Each version directory should yield exactly one coordinate"
    );
}

#[test]
fn version_directories_without_artifact_files_are_skipped() {
    let repo = tempdir().unwrap();
    write_version(
        repo.path(),
        "com.acme",
        "widget",
        "1.0.0",
        &["maven-metadata-local.xml", "_remote.repositories", "notes.txt", "widget-1.0.0.jar.md5"],
    );
    write_version(repo.path(), "com.acme", "widget", "1.1.0", &["widget-1.1.0.jar"]);

    let found = scan_ok(repo.path());
    assert_eq!(found.len(), 1, "Only the directory with a real artifact counts");
    assert_eq!(found[0].coordinate.version, "1.1.0");
}

#[test]
fn scanned_version_records_directory_and_root() {
    let repo = tempdir().unwrap();
    let dir = write_version(repo.path(), "com.acme", "widget", "1.0.0", &["widget-1.0.0.pom"]);

    let found = scan_ok(repo.path());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].directory, dir);
    assert_eq!(found[0].root, repo.path());
}

#[test]
fn classifier_lists_main_pom_and_classified_variants_only() {
    let repo = tempdir().unwrap();
    write_version(
        repo.path(),
        "com.acme",
        "widget",
        "1.0.0",
        &[
            "widget-1.0.0.jar",
            "widget-1.0.0.pom",
            "widget-1.0.0-sources.jar",
            "widget-1.0.0-javadoc.jar",
            "widget-1.0.0.jar.sha1",
            "widget-1.0.0.pom.asc",
            "maven-metadata.xml",
            "stray.jar",
        ],
    );
    let version = scan_ok(repo.path()).pop().expect("one version directory");

    let files = classify_version_dir(&version).expect("classification should succeed");
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "widget-1.0.0-javadoc.jar",
            "widget-1.0.0-sources.jar",
            "widget-1.0.0.jar",
            "widget-1.0.0.pom",
        ]
    );

    let sources = files.iter().find(|f| f.file_name == "widget-1.0.0-sources.jar").unwrap();
    assert_eq!(sources.classifier.as_deref(), Some("sources"));
    assert_eq!(sources.extension, "jar");
    assert_eq!(sources.remote_path(), "com/acme/widget/1.0.0/widget-1.0.0-sources.jar");
    assert_eq!(sources.size_bytes, "content of widget-1.0.0-sources.jar".len() as u64);

    let main: Vec<&str> = files
        .iter()
        .filter(|f| f.is_main())
        .map(|f| f.extension.as_str())
        .collect();
    assert_eq!(main, vec!["jar", "pom"]);
}

#[cfg(unix)]
#[test]
fn unreadable_subtree_is_reported_and_siblings_are_still_scanned() {
    use std::os::unix::fs::PermissionsExt;

    let repo = tempdir().unwrap();
    write_version(repo.path(), "com.acme", "widget", "1.0.0", &["widget-1.0.0.jar"]);
    write_version(repo.path(), "org.locked", "secret", "1.0", &["secret-1.0.jar"]);
    let locked = repo.path().join("org/locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users read through mode 000; nothing to assert then.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (found, errors): (Vec<_>, Vec<_>) = RepoScanner::new(repo.path()).partition(Result::is_ok);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let found: Vec<ScannedVersion> = found.into_iter().map(Result::unwrap).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].coordinate, ArtifactCoordinate::new("com.acme", "widget", "1.0.0"));
    assert_eq!(errors.len(), 1, "The locked subtree should be reported once");
    let err = errors.into_iter().next().unwrap().unwrap_err();
    assert_eq!(err.path, locked);
}

#[cfg(unix)]
#[test]
fn unreadable_version_directory_is_reported_once() {
    use std::os::unix::fs::PermissionsExt;

    let repo = tempdir().unwrap();
    write_version(repo.path(), "com.acme", "widget", "1.0.0", &["widget-1.0.0.jar"]);
    let locked = write_version(repo.path(), "com.acme", "widget", "2.0.0", &["widget-2.0.0.jar"]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (found, errors): (Vec<_>, Vec<_>) = RepoScanner::new(repo.path()).partition(Result::is_ok);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(found.len(), 1);
    let errors: Vec<_> = errors.into_iter().map(Result::unwrap_err).collect();
    assert_eq!(errors.len(), 1, "Expected a single error, got {errors:?}");
    assert_eq!(errors[0].path, locked);
}
