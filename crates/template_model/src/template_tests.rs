use super::*;
use std::fs;
use tempfile::TempDir;
use vcs_driver::GitDriver;

fn write_config(dir: &TempDir, contents: &str) {
    fs::write(dir.path().join("copier.yml"), contents).unwrap();
}

#[test]
fn resolves_a_local_directory_without_vcs() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "project_name:\n  type: str\n  default: world\nsecret_token:\n  secret: true\n",
    );
    let template = Template::new(dir.path().to_string_lossy().to_string(), None);
    let resolved = template.resolve(&GitDriver::new()).unwrap();

    assert_eq!(resolved.vcs, Vcs::None);
    assert!(resolved.commit.is_none());
    assert_eq!(resolved.templates_suffix, ".jinja");
    assert!(resolved
        .default_answers
        .iter()
        .any(|(k, v)| k == "project_name" && v.as_str() == Some("world")));
    assert!(resolved.secret_questions.contains("secret_token"));
}

#[test]
fn resolution_is_memoized_across_calls() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "name:\n  type: str\n");
    let template = Template::new(dir.path().to_string_lossy().to_string(), None);
    let driver = GitDriver::new();
    let first = template.resolve(&driver).unwrap().local_path.clone();
    let second = template.resolve(&driver).unwrap().local_path.clone();
    assert_eq!(first, second);
}

#[test]
fn missing_config_document_resolves_to_an_empty_one() {
    let dir = TempDir::new().unwrap();
    let template = Template::new(dir.path().to_string_lossy().to_string(), None);
    let resolved = template.resolve(&GitDriver::new()).unwrap();
    assert!(resolved.config.questions.is_empty());
}

#[test]
fn unmet_min_version_fails_construction() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "_min_copier_version: \"999.0.0\"\n");
    let template = Template::new(dir.path().to_string_lossy().to_string(), None);
    let err = template.resolve(&GitDriver::new()).unwrap_err();
    assert!(matches!(err, Error::MinVersionUnmet { .. }));
}

#[test]
fn nonexistent_path_is_template_not_found() {
    let template = Template::new("/no/such/path/anywhere".to_string(), None);
    let err = template.resolve(&GitDriver::new()).unwrap_err();
    assert!(matches!(err, Error::TemplateNotFound { .. }));
}
