//! Tests for reading and writing the connection config file.

use std::fs;

use hubapi::{ConnectionConfig, Credential, HubError};

#[test]
fn test_token_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".restconfig.json");

    let mut config = ConnectionConfig::with_api_token("https://hub.example.com", "abc123");
    config.insecure = true;
    config.save(&path).unwrap();

    let loaded = ConnectionConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["baseurl"], "https://hub.example.com");
    assert_eq!(raw["api_token"], "abc123");
    assert_eq!(raw["insecure"], true);
    assert!(raw.get("username").is_none());
}

#[test]
fn test_password_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hub.json");

    let config = ConnectionConfig::with_password("https://hub.example.com", "sysadmin", "blackduck");
    config.save(&path).unwrap();

    let loaded = ConnectionConfig::load(&path).unwrap();
    assert_eq!(
        loaded.credential,
        Credential::Password {
            username: "sysadmin".to_string(),
            password: "blackduck".to_string(),
        }
    );
    assert!(!loaded.insecure);
}

#[test]
fn test_load_ignores_unknown_keys_and_trims_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".restconfig.json");
    fs::write(
        &path,
        r#"{"baseurl": "https://hub.example.com/", "api_token": "t", "timeout": 15, "debug": true}"#,
    )
    .unwrap();

    let config = ConnectionConfig::load(&path).unwrap();
    assert_eq!(config.baseurl, "https://hub.example.com");
    assert!(config.debug);
}

#[test]
fn test_load_rejects_missing_baseurl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".restconfig.json");
    fs::write(&path, r#"{"api_token": "t"}"#).unwrap();

    let err = ConnectionConfig::load(&path).unwrap_err();
    assert!(matches!(err, HubError::ConfigMissing(_)));
}

#[test]
fn test_save_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".restconfig.json");

    ConnectionConfig::with_password("https://old.example.com", "u", "p")
        .save(&path)
        .unwrap();
    ConnectionConfig::with_api_token("https://new.example.com", "t")
        .save(&path)
        .unwrap();

    let loaded = ConnectionConfig::load(&path).unwrap();
    assert_eq!(loaded.baseurl, "https://new.example.com");
    assert_eq!(loaded.credential.mode(), "api-token");
}

#[cfg(unix)]
#[test]
fn test_saved_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".restconfig.json");
    ConnectionConfig::with_api_token("https://hub.example.com", "secret")
        .save(&path)
        .unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
