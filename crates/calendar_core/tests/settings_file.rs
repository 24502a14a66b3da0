use calendar_core::{Settings, SettingsError, SETTINGS_FILE_NAME};

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let settings = Settings::load(dir.path().join(SETTINGS_FILE_NAME)).unwrap();

    assert_eq!(settings, Settings::default());
    assert!(settings.notifications_enabled);
}

#[test]
fn save_then_load_preserves_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join(SETTINGS_FILE_NAME);
    let settings = Settings {
        notifications_enabled: false,
        look_ahead_minutes: 15,
        check_interval_secs: 30,
        log_level: Some("warn".to_string()),
    };

    settings.save(&path).unwrap();

    assert_eq!(Settings::load(&path).unwrap(), settings);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn corrupt_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    std::fs::write(&path, "{ not json").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Parse(_)));
}

#[test]
fn zero_window_in_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    std::fs::write(&path, r#"{"look_ahead_minutes": 0}"#).unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Invalid(_)));
}
