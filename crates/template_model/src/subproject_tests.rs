use super::*;
use std::fs;
use tempfile::TempDir;
use vcs_driver::GitDriver;

#[test]
fn missing_answers_file_is_treated_as_empty() {
    let dir = TempDir::new().unwrap();
    let subproject = Subproject::load(dir.path(), None);
    assert!(subproject.raw_answers().is_empty());
    assert!(subproject.last_answers().is_empty());
    assert!(subproject.template().is_none());
}

#[test]
fn last_answers_keeps_src_path_and_commit_but_drops_other_private_keys() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(DEFAULT_ANSWERS_RELPATH),
        "_src_path: /templates/foo\n_commit: v1.2.3\n_scaffold_version: \"0.1.0\"\nname: Alice\n",
    )
    .unwrap();
    let subproject = Subproject::load(dir.path(), None);
    let last = subproject.last_answers();

    assert_eq!(last.get("_src_path").and_then(|v| v.as_str()), Some("/templates/foo"));
    assert_eq!(last.get("_commit").and_then(|v| v.as_str()), Some("v1.2.3"));
    assert_eq!(last.get("name").and_then(|v| v.as_str()), Some("Alice"));
    assert!(!last.contains_key("_scaffold_version"));
}

#[test]
fn template_is_synthesized_only_when_both_src_path_and_commit_present() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(DEFAULT_ANSWERS_RELPATH),
        "_src_path: /templates/foo\n",
    )
    .unwrap();
    let subproject = Subproject::load(dir.path(), None);
    assert!(subproject.template().is_none());
}

#[test]
fn template_is_synthesized_from_recorded_src_path_and_commit() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(DEFAULT_ANSWERS_RELPATH),
        "_src_path: /templates/foo\n_commit: v1.2.3\n",
    )
    .unwrap();
    let subproject = Subproject::load(dir.path(), None);
    let template = subproject.template().unwrap();
    assert_eq!(template.url(), "/templates/foo");
    assert_eq!(template.git_ref(), Some("v1.2.3"));
}

#[test]
fn non_vcs_directory_is_never_dirty() {
    let dir = TempDir::new().unwrap();
    let subproject = Subproject::load(dir.path(), None);
    assert!(!subproject.is_dirty(&GitDriver::new()));
}
