use super::*;
use clap::Parser;

#[derive(Parser)]
struct Harness {
    #[command(flatten)]
    args: UpdateArgs,
}

fn parse(argv: &[&str]) -> UpdateArgs {
    Harness::parse_from(argv).args
}

#[test]
fn dst_path_defaults_to_current_directory() {
    let args = parse(&["scaffold"]);
    assert_eq!(args.dst_path, PathBuf::from("."));
}

#[test]
fn parses_an_explicit_destination_and_vcs_ref() {
    let args = parse(&["scaffold", "./project", "--vcs-ref", "v2.0.0"]);
    assert_eq!(args.dst_path, PathBuf::from("./project"));
    assert_eq!(args.vcs_ref, Some("v2.0.0".to_string()));
}

#[test]
fn repeated_exclude_flags_accumulate() {
    let args = parse(&["scaffold", "--exclude", "*.lock", "--exclude", "dist/*"]);
    assert_eq!(args.exclude, vec!["*.lock".to_string(), "dist/*".to_string()]);
}
