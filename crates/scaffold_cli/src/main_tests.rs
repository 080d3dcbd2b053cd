use super::*;

#[test]
fn copy_subcommand_requires_a_source() {
    let result = Cli::try_parse_from(["scaffold", "copy"]);
    assert!(result.is_err());
}

#[test]
fn copy_subcommand_parses_with_a_source() {
    let cli = Cli::try_parse_from(["scaffold", "copy", "./template"]).unwrap();
    assert!(matches!(cli.command, Commands::Copy(_)));
}

#[test]
fn update_subcommand_parses_without_arguments() {
    let cli = Cli::try_parse_from(["scaffold", "update"]).unwrap();
    assert!(matches!(cli.command, Commands::Update(_)));
}
