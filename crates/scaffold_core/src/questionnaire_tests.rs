use super::*;

fn question(kind: &str) -> QuestionDescriptor {
    QuestionDescriptor {
        var_name: "value".to_string(),
        kind: Some(kind.to_string()),
        ..Default::default()
    }
}

#[test]
fn coerce_parses_bool_like_strings() {
    let q = question("bool");
    assert_eq!(coerce(&q, "yes"), Value::Bool(true));
    assert_eq!(coerce(&q, "no"), Value::Bool(false));
}

#[test]
fn coerce_parses_integers() {
    let q = question("int");
    assert_eq!(coerce(&q, "42"), Value::from(42));
}

#[test]
fn coerce_falls_back_to_string_on_bad_integer() {
    let q = question("int");
    assert_eq!(coerce(&q, "not a number"), Value::String("not a number".to_string()));
}

#[test]
fn coerce_defaults_to_string_for_unrecognized_kinds() {
    let q = question("str");
    assert_eq!(coerce(&q, "hello"), Value::String("hello".to_string()));
}

#[test]
fn display_default_is_empty_for_null_and_empty_string() {
    assert_eq!(display_default(&Value::Null), "");
    assert_eq!(display_default(&Value::String(String::new())), "");
    assert_eq!(display_default(&Value::String("x".to_string())), " [\"x\"]");
}
