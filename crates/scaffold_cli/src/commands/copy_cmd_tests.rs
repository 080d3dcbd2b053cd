use super::*;
use clap::Parser;

#[derive(Parser)]
struct Harness {
    #[command(flatten)]
    args: CopyArgs,
}

fn parse(argv: &[&str]) -> CopyArgs {
    Harness::parse_from(argv).args
}

#[test]
fn parses_src_and_defaults_destination_to_current_directory() {
    let args = parse(&["scaffold", "./template"]);
    assert_eq!(args.src_path, "./template");
    assert_eq!(args.dst_path, PathBuf::from("."));
}

#[test]
fn parses_repeated_data_flags() {
    let args = parse(&["scaffold", "./template", "-d", "name=Alice", "-d", "count=3"]);
    assert_eq!(args.data.len(), 2);
    assert_eq!(args.data[0], ("name".to_string(), Value::String("Alice".to_string())));
    assert_eq!(args.data[1], ("count".to_string(), Value::from(3)));
}

#[test]
fn force_and_pretend_flags_default_to_false() {
    let args = parse(&["scaffold", "./template"]);
    assert!(!args.force);
    assert!(!args.pretend);
}

#[test]
fn answers_file_defaults_to_none_until_resolved_at_execute_time() {
    let args = parse(&["scaffold", "./template"]);
    assert!(args.answers_file.is_none());
}
