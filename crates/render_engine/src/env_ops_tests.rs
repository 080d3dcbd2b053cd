use super::*;

#[test]
fn defaults_match_standard_jinja_delimiters() {
    let ops = EnvOps::default();
    assert_eq!(ops.variable_start, "{{");
    assert_eq!(ops.variable_end, "}}");
    assert!(ops.trim_blocks);
    assert!(ops.lstrip_blocks);
    assert!(ops.keep_trailing_newline);
}

#[test]
fn strict_undefined_is_the_default_behavior() {
    let ops = EnvOps::default();
    assert_eq!(ops.undefined_behavior(), UndefinedBehavior::Strict);
}

#[test]
fn custom_delimiters_build_a_valid_syntax_config() {
    let mut ops = EnvOps::default();
    ops.variable_start = "[[".to_string();
    ops.variable_end = "]]".to_string();
    assert!(ops.syntax_config().is_ok());
}
