use super::*;

#[test]
fn min_version_unmet_message_names_both_versions() {
    let err = Error::MinVersionUnmet {
        required: "2.0.0".to_string(),
        actual: "1.0.0".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("2.0.0"));
    assert!(message.contains("1.0.0"));
}
