use sitework_util::errors::SiteworkError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = SiteworkError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_validation_error_display() {
    let err = SiteworkError::validation("duration must not be negative");
    assert_eq!(
        err.to_string(),
        "Validation failed: duration must not be negative"
    );
}

#[test]
fn test_not_found_display() {
    let err = SiteworkError::not_found("phase-9");
    assert_eq!(err.to_string(), "Unit not found: phase-9");
}

#[test]
fn test_data_integrity_display_names_unit() {
    let err = SiteworkError::DataIntegrity {
        unit: "task-3".to_string(),
        message: "revisited during cascade".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Data integrity error at unit task-3: revisited during cascade"
    );
}

#[test]
fn test_persistence_error_keeps_progress() {
    let err = SiteworkError::Persistence {
        unit: "b".to_string(),
        message: "connection reset".to_string(),
        applied: vec!["a".to_string()],
        remaining: vec!["b".to_string(), "c".to_string()],
    };
    assert_eq!(err.to_string(), "Failed to persist unit b: connection reset");
    match err {
        SiteworkError::Persistence {
            applied, remaining, ..
        } => {
            assert_eq!(applied, vec!["a"]);
            assert_eq!(remaining, vec!["b", "c"]);
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_config_error_display() {
    let err = SiteworkError::Config {
        message: "bad toml".to_string(),
    };
    assert_eq!(err.to_string(), "Config error: bad toml");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: SiteworkError = io_err.into();
    assert!(matches!(err, SiteworkError::Io(_)));
}
