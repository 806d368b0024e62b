use super::*;

#[test]
fn test_format_version() {
    assert_eq!(format_version(None), "No migrations.");
    assert_eq!(format_version(Some(VersionState::Clean { version: 4 })), "4");
    assert_eq!(
        format_version(Some(VersionState::Dirty { version: 4 })),
        "4 (dirty)"
    );
}

#[test]
fn test_version_report_json() {
    let report = VersionReport::from(Some(VersionState::Dirty { version: 2 }));
    assert_eq!(
        serde_json::to_string(&report).unwrap(),
        r#"{"version":2,"dirty":true}"#
    );

    let empty = VersionReport::from(None);
    assert_eq!(
        serde_json::to_string(&empty).unwrap(),
        r#"{"version":null,"dirty":false}"#
    );
}
