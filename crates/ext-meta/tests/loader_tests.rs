//! Integration tests for the info file loader

use ext_meta::{Error, ExtensionType, InfoLoader};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_info(root: &Path, rel_dir: &str, name: &str, body: &str) {
    let dir = root.join(rel_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{name}.info.toml")), body).unwrap();
}

#[test]
fn test_loads_nested_info_files_sorted() {
    let temp = TempDir::new().unwrap();
    write_info(temp.path(), "help", "help", "name = \"help\"\n");
    write_info(
        temp.path(),
        "config",
        "config",
        "name = \"config\"\ndependencies = [\"help\"]\n",
    );
    write_info(
        temp.path(),
        "profiles/standard",
        "standard",
        "name = \"standard\"\ntype = \"profile\"\ninstall = [\"help\"]\n",
    );

    let loaded = InfoLoader::new().load_dir(temp.path()).unwrap();

    let names: Vec<&str> = loaded.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["config", "help", "standard"]);
    assert_eq!(loaded["config"].info.dependencies, vec!["help"]);
    assert_eq!(loaded["standard"].info.kind, ExtensionType::Profile);
    assert_eq!(loaded["help"].dir(), temp.path().join("help"));
}

#[test]
fn test_ignores_unrelated_files() {
    let temp = TempDir::new().unwrap();
    write_info(temp.path(), "help", "help", "name = \"help\"\n");
    fs::write(temp.path().join("help").join("README.md"), "# Help").unwrap();
    fs::write(temp.path().join("notes.toml"), "x = 1").unwrap();

    let loaded = InfoLoader::new().load_dir(temp.path()).unwrap();
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_broken_info_file_is_skipped() {
    let temp = TempDir::new().unwrap();
    write_info(temp.path(), "help", "help", "name = \"help\"\n");
    write_info(temp.path(), "broken", "broken", "name = [\n");
    write_info(temp.path(), "renamed", "renamed", "name = \"other\"\n");

    let loaded = InfoLoader::new().load_dir(temp.path()).unwrap();
    assert_eq!(loaded.keys().collect::<Vec<_>>(), vec!["help"]);
}

#[test]
fn test_name_must_match_file_name() {
    let temp = TempDir::new().unwrap();
    write_info(temp.path(), "x", "renamed", "name = \"other\"\n");

    let err = InfoLoader::new()
        .load_file(&temp.path().join("x").join("renamed.info.toml"))
        .unwrap_err();
    assert!(
        matches!(err, Error::NameMismatch { ref declared, ref expected, .. } if declared == "other" && expected == "renamed")
    );
}

#[test]
fn test_duplicate_names_rejected() {
    let temp = TempDir::new().unwrap();
    write_info(temp.path(), "a", "help", "name = \"help\"\n");
    write_info(temp.path(), "b", "help", "name = \"help\"\n");

    let err = InfoLoader::new().load_dir(temp.path()).unwrap_err();
    assert!(matches!(err, Error::DuplicateExtension { ref name, .. } if name == "help"));
}
