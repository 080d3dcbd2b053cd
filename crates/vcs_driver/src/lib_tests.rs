use super::*;
use std::fs;

fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let driver = GitDriver::new();
    driver.init(dir.path()).unwrap();
    fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    driver.add(dir.path(), ".").unwrap();
    driver
        .commit(dir.path(), "initial commit", true, false)
        .unwrap();
    dir
}

#[test]
fn init_creates_a_repo_root() {
    let driver = GitDriver::new();
    let dir = TempDir::new().unwrap();
    driver.init(dir.path()).unwrap();
    assert!(driver.is_repo_root(dir.path()));
}

#[test]
fn non_repo_path_is_not_a_repo_root() {
    let driver = GitDriver::new();
    let dir = TempDir::new().unwrap();
    assert!(!driver.is_repo_root(dir.path()));
}

#[test]
fn clean_repo_after_commit_is_not_dirty() {
    let driver = GitDriver::new();
    let dir = init_repo();
    assert!(!driver.is_dirty(dir.path()).unwrap());
}

#[test]
fn untracked_file_marks_repo_dirty() {
    let driver = GitDriver::new();
    let dir = init_repo();
    fs::write(dir.path().join("new-file.txt"), "content").unwrap();
    assert!(driver.is_dirty(dir.path()).unwrap());
}

#[test]
fn describe_returns_a_commit_oid_fallback() {
    let driver = GitDriver::new();
    let dir = init_repo();
    let description = driver.describe(dir.path()).unwrap();
    assert!(!description.is_empty());
}

#[test]
fn commit_with_no_changes_and_no_allow_empty_tolerates_failure() {
    let driver = GitDriver::new();
    let dir = init_repo();
    // nothing changed since initial commit; allow_empty=false should fail,
    // but tolerate_failure=true should swallow it instead of propagating.
    let result = driver.commit(dir.path(), "dumb commit", false, true);
    assert!(result.is_ok());
}

#[test]
fn https_and_ssh_urls_are_recognized_as_git_locators() {
    let driver = GitDriver::new();
    assert_eq!(
        driver.normalize_locator("https://example.com/org/repo.git"),
        Some("https://example.com/org/repo.git".to_string())
    );
    assert_eq!(
        driver.normalize_locator("git@example.com:org/repo.git"),
        Some("git@example.com:org/repo.git".to_string())
    );
    assert_eq!(
        driver.normalize_locator("git+https://example.com/org/repo"),
        Some("https://example.com/org/repo".to_string())
    );
}

#[test]
fn plain_filesystem_paths_are_not_git_locators() {
    let driver = GitDriver::new();
    assert_eq!(driver.normalize_locator("/srv/templates/my-template"), None);
    assert_eq!(driver.normalize_locator("../relative/template"), None);
}

#[test]
fn diff_tree_and_apply_round_trip() {
    let driver = GitDriver::new();
    let dir = init_repo();
    let old_oid = driver.describe(dir.path()).unwrap();

    fs::write(dir.path().join("README.md"), "hello\nworld\n").unwrap();
    driver.add(dir.path(), ".").unwrap();
    driver
        .commit(dir.path(), "add a line", true, false)
        .unwrap();
    let new_oid = driver.describe(dir.path()).unwrap();

    let patch = driver
        .diff_tree(dir.path(), &old_oid, &new_oid, -1)
        .unwrap();
    assert!(patch.contains("README.md"));

    // Reset the working tree back to the old content, then re-apply the
    // captured diff to make sure `apply` actually mutates the tree.
    fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    driver.add(dir.path(), ".").unwrap();
    driver
        .commit(dir.path(), "revert", true, false)
        .unwrap();

    driver.apply(dir.path(), &patch, true, &[]).unwrap();
    let content = fs::read_to_string(dir.path().join("README.md")).unwrap();
    assert_eq!(content, "hello\nworld\n");
}
