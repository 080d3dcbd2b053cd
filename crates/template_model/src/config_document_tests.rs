use super::*;

const DOC: &str = r#"
_min_copier_version: "1.2.0"
_exclude:
  - "*.bak"
_tasks:
  - task: "echo hi"
project_name:
  type: str
  help: "Name of the project"
  default: "my-project"
use_docker:
  type: bool
  default: false
  when: "{{ project_name != 'skip' }}"
"#;

#[test]
fn underscore_keys_go_to_config_data_others_become_questions() {
    let doc = TemplateConfigDocument::parse(DOC).unwrap();
    assert_eq!(doc.min_version().as_deref(), Some("1.2.0"));
    assert_eq!(doc.exclude(), vec!["*.bak".to_string()]);
    assert_eq!(doc.questions.len(), 2);
    assert_eq!(doc.questions[0].var_name, "project_name");
    assert_eq!(doc.questions[1].var_name, "use_docker");
}

#[test]
fn question_fields_are_read_from_its_mapping() {
    let doc = TemplateConfigDocument::parse(DOC).unwrap();
    let project_name = &doc.questions[0];
    assert_eq!(project_name.kind.as_deref(), Some("str"));
    assert_eq!(project_name.help.as_deref(), Some("Name of the project"));
    assert!(!project_name.secret);

    let use_docker = &doc.questions[1];
    assert!(use_docker.when.is_some());
}

#[test]
fn missing_exclude_falls_back_to_default_exclude() {
    let doc = TemplateConfigDocument::parse("project_name: {type: str}").unwrap();
    assert_eq!(doc.exclude(), default_exclude());
}

#[test]
fn tasks_are_parsed_from_shell_strings() {
    let doc = TemplateConfigDocument::parse(DOC).unwrap();
    let tasks = doc.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task, TaskCommand::Shell("echo hi".to_string()));
}

#[test]
fn empty_document_has_no_questions_and_default_exclude() {
    let doc = TemplateConfigDocument::empty();
    assert!(doc.questions.is_empty());
    assert_eq!(doc.exclude(), default_exclude());
}

#[test]
fn non_mapping_document_is_rejected() {
    let result = TemplateConfigDocument::parse("- just\n- a\n- list\n");
    assert!(result.is_err());
}
