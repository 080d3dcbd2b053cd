use super::*;
use std::collections::HashSet;
use answers_map::AnswersMap;
use serde_json::json;
use tempfile::TempDir;

fn context() -> RenderContext {
    let mut user = std::collections::HashMap::new();
    user.insert("name".to_string(), json!("Alice"));
    user.insert("folder".to_string(), json!(""));
    let answers = AnswersMap::builder().user(user).build();
    RenderContext::new(&answers, &HashSet::new(), &[], json!({}))
}

fn renderer<'a>(template_root: &Path, context: &'a RenderContext) -> Renderer<'a> {
    Renderer::new(template_root, &[], &EnvOps::default(), ".jinja", context).unwrap()
}

#[test]
fn render_string_substitutes_a_variable() {
    let dir = TempDir::new().unwrap();
    let ctx = context();
    let renderer = renderer(dir.path(), &ctx);
    let result = renderer.render_string("Hello {{ name }}").unwrap();
    assert_eq!(result, "Hello Alice");
}

#[test]
fn render_path_strips_the_templates_suffix() {
    let dir = TempDir::new().unwrap();
    let ctx = context();
    let renderer = renderer(dir.path(), &ctx);
    let rendered = renderer
        .render_path(Path::new("{{ name }}.txt.jinja"))
        .unwrap()
        .unwrap();
    assert_eq!(rendered, PathBuf::from("Alice.txt"));
}

#[test]
fn render_path_with_empty_segment_is_skipped() {
    let dir = TempDir::new().unwrap();
    let ctx = context();
    let renderer = renderer(dir.path(), &ctx);
    let rendered = renderer.render_path(Path::new("{{ folder }}/x.txt")).unwrap();
    assert!(rendered.is_none());
}

#[test]
fn render_file_writes_rendered_contents_to_destination() {
    let template_dir = TempDir::new().unwrap();
    let dest_dir = TempDir::new().unwrap();
    fs::write(template_dir.path().join("name.txt.jinja"), "Hello {{ name }}").unwrap();

    let ctx = context();
    let renderer = renderer(template_dir.path(), &ctx);
    let policy = PathPolicy::new(dest_dir.path(), &[], &[], &[]).unwrap();

    let entry = renderer
        .render_file(
            &template_dir.path().join("name.txt.jinja"),
            dest_dir.path(),
            &policy,
            false,
            false,
            |_| true,
        )
        .unwrap()
        .unwrap();

    assert_eq!(entry.relpath, PathBuf::from("name.txt"));
    let written = fs::read_to_string(dest_dir.path().join("name.txt")).unwrap();
    assert_eq!(written, "Hello Alice");
}

#[test]
fn render_file_copies_non_template_content_verbatim() {
    let template_dir = TempDir::new().unwrap();
    let dest_dir = TempDir::new().unwrap();
    fs::write(template_dir.path().join("logo.png"), b"\x89PNG raw bytes").unwrap();

    let ctx = context();
    let renderer = renderer(template_dir.path(), &ctx);
    let policy = PathPolicy::new(dest_dir.path(), &[], &[], &[]).unwrap();

    renderer
        .render_file(
            &template_dir.path().join("logo.png"),
            dest_dir.path(),
            &policy,
            false,
            false,
            |_| true,
        )
        .unwrap();

    let written = fs::read(dest_dir.path().join("logo.png")).unwrap();
    assert_eq!(written, b"\x89PNG raw bytes");
}

#[test]
fn render_folder_walks_nested_directories() {
    let template_dir = TempDir::new().unwrap();
    let dest_dir = TempDir::new().unwrap();
    fs::create_dir(template_dir.path().join("sub")).unwrap();
    fs::write(
        template_dir.path().join("sub").join("greeting.txt.jinja"),
        "Hi {{ name }}",
    )
    .unwrap();

    let ctx = context();
    let renderer = renderer(template_dir.path(), &ctx);
    let policy = PathPolicy::new(dest_dir.path(), &[], &[], &[]).unwrap();

    let (entries, outcome) =
        renderer.render_folder(template_dir.path(), dest_dir.path(), &policy, false, false, |_| true);
    outcome.unwrap();

    assert!(entries.iter().any(|e| e.relpath == PathBuf::from("sub/greeting.txt")));
    let written = fs::read_to_string(dest_dir.path().join("sub").join("greeting.txt")).unwrap();
    assert_eq!(written, "Hi Alice");
}

#[test]
fn pretend_mode_reports_without_writing() {
    let template_dir = TempDir::new().unwrap();
    let dest_dir = TempDir::new().unwrap();
    fs::write(template_dir.path().join("name.txt.jinja"), "Hello {{ name }}").unwrap();

    let ctx = context();
    let renderer = renderer(template_dir.path(), &ctx);
    let policy = PathPolicy::new(dest_dir.path(), &[], &[], &[]).unwrap();

    let entry = renderer
        .render_file(
            &template_dir.path().join("name.txt.jinja"),
            dest_dir.path(),
            &policy,
            false,
            true,
            |_| true,
        )
        .unwrap();

    assert!(entry.is_some());
    assert!(!dest_dir.path().join("name.txt").exists());
}

#[test]
fn to_nice_yaml_filter_renders_structured_data() {
    let dir = TempDir::new().unwrap();
    let mut user = std::collections::HashMap::new();
    user.insert("items".to_string(), json!(["a", "b"]));
    let answers = AnswersMap::builder().user(user).build();
    let ctx = RenderContext::new(&answers, &HashSet::new(), &[], json!({}));
    let renderer = renderer(dir.path(), &ctx);
    let result = renderer.render_string("{{ items | to_nice_yaml }}").unwrap();
    assert!(result.contains('a'));
    assert!(result.contains('b'));
}
