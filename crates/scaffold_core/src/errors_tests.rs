use super::*;

#[test]
fn destination_dirty_message_names_the_path() {
    let err = Error::DestinationDirty {
        path: "/dest".to_string(),
    };
    assert!(err.to_string().contains("/dest"));
}

#[test]
fn downgrade_refused_message_names_both_versions() {
    let err = Error::DowngradeRefused {
        old: "2.0.0".to_string(),
        new: "1.0.0".to_string(),
    };
    let message = err.to_string();
    assert!(message.contains("2.0.0"));
    assert!(message.contains("1.0.0"));
}
