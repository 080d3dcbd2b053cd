use super::*;

#[test]
fn std_out_flush_failed_has_a_fixed_message() {
    let err = Error::StdOutFlushFailed;
    assert_eq!(err.to_string(), "failed to flush the std out buffer");
}

#[test]
fn scaffold_errors_are_wrapped_transparently() {
    let err = Error::from(scaffold_core::Error::TemplateNotFound);
    assert!(err.to_string().contains("no template"));
}
