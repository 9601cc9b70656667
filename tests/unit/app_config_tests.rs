/*!
 * Tests for application configuration functionality
 */

use std::collections::HashMap;

use captionkit::app_config::{Config, LogLevel};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.default_language, "en");
    assert!(config.cache.enabled);
    assert_eq!(config.cache.default_ttl_secs, 3600);
    assert_eq!(config.cache.max_keys, 1000);
    assert_eq!(config.cache.check_period_secs, 600);
    assert!(!config.cache.fingerprint_search_keys);
    assert_eq!(config.client.timeout_secs, 30);
    assert!(config.client.api_key.is_empty());
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.default_language = "xyz1".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.default_language = "jp".to_string();
    assert!(config.validate().is_ok());

    let mut config = Config::default();
    config.cache.default_ttl_secs = 0;
    assert!(config.validate().is_err());
    config.cache.enabled = false;
    assert!(config.validate().is_ok());

    let mut config = Config::default();
    config.client.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.client.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrDefault_withMissingFile_shouldReturnDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let config = Config::load_or_default(dir.path().join("missing.json")).unwrap();
    assert_eq!(config.default_language, "en");
}

#[test]
fn test_loadOrDefault_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "captionkit.json",
        r#"{ "default_language": "ja", "cache": { "max_keys": 5 }, "log_level": "debug" }"#,
    )
    .unwrap();

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config.default_language, "ja");
    assert_eq!(config.cache.max_keys, 5);
    assert_eq!(config.cache.default_ttl_secs, 3600);
    assert!(config.cache.enabled);
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_loadOrDefault_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "broken.json", "{ not json").unwrap();
    let error = Config::load_or_default(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to parse config file"));
}

#[test]
fn test_applyOverrides_withEnvironmentValues_shouldOverrideFile() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("CACHE_ENABLED", "false"),
        ("CACHE_DEFAULT_TTL", "120"),
        ("CACHE_MAX_KEYS", "50"),
        ("YOUTUBE_API_KEY", "secret"),
    ]);

    let mut config = Config::default();
    config.apply_overrides(|key| env.get(key).map(|v| v.to_string())).unwrap();

    assert!(!config.cache.enabled);
    assert_eq!(config.cache.default_ttl_secs, 120);
    assert_eq!(config.cache.max_keys, 50);
    assert_eq!(config.client.api_key, "secret");
}

#[test]
fn test_applyOverrides_withNoValues_shouldKeepConfig() {
    let mut config = Config::default();
    config.apply_overrides(|_| None).unwrap();
    assert!(config.cache.enabled);
    assert_eq!(config.cache.max_keys, 1000);
}

#[test]
fn test_applyOverrides_withNonNumericTtl_shouldFail() {
    let mut config = Config::default();
    let result = config.apply_overrides(|key| (key == "CACHE_DEFAULT_TTL").then(|| "soon".to_string()));
    assert!(result.is_err());
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
